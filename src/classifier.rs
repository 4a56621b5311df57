use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("request to classification service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classification service returned a non-JSON body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(String),
}

/// Body of `/api/predict`. Every field is optional; the service answers
/// `{"category": ..}` on success and `{"error": ..}` for an empty description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictResponse {
    pub category: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl PredictResponse {
    /// Lenient decode: any JSON value is accepted. Only non-empty string
    /// fields of an object count as present.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            category: field("category"),
            message: field("message"),
            error: field("error"),
        }
    }

    /// `category`, then `message`.
    pub fn label(&self) -> Option<&str> {
        self.category.as_deref().or(self.message.as_deref())
    }
}

#[derive(Deserialize)]
struct GreetResponse {
    message: String,
}

#[derive(Clone)]
pub struct ClassifierClient {
    client: Client,
    base_url: String,
}

impl ClassifierClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Transport-level timeout; the view itself never times out.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClassifierError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ClassifierError> {
        let url = format!("{}{}", self.base_url, path);
        reqwest::Url::parse(&url).map_err(|e| ClassifierError::InvalidBaseUrl(format!("{url}: {e}")))
    }

    /// `GET /api/predict?desc=<description>`. The HTTP status is not checked;
    /// whatever JSON comes back is decoded leniently.
    pub async fn predict(&self, description: &str) -> Result<PredictResponse, ClassifierError> {
        let url = self.endpoint("/api/predict")?;

        let response = self
            .client
            .get(url)
            .query(&[("desc", description)])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "prediction response received");

        let value: Value = serde_json::from_slice(&body)?;
        let prediction = PredictResponse::from_value(&value);

        if let Some(error) = &prediction.error {
            warn!(%status, error = %error, "classification service reported an error");
        }

        Ok(prediction)
    }

    pub async fn greet(&self, name: &str) -> Result<String, ClassifierError> {
        let url = self.endpoint("/api/greet")?;

        let response = self
            .client
            .get(url)
            .query(&[("name", name)])
            .send()
            .await?;

        let body = response.bytes().await?;
        let greeting: GreetResponse = serde_json::from_slice(&body)?;
        Ok(greeting.message)
    }
}
