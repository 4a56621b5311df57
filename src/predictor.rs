//! State holder for the predictor view.
//!
//! Three fields drive everything the user sees: the description being typed,
//! whether a classification request is outstanding, and the last settled
//! result. All mutation goes through [`PredictorView::set_input`],
//! [`PredictorView::submit`] and [`PredictorView::resolve`].

use crate::classifier::{ClassifierError, PredictResponse};

pub const NO_CATEGORY: &str = "No category found";
pub const CONNECTION_ERROR: &str = "Error connecting to server.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
    Settled,
}

/// A request the view has committed to. The caller performs the I/O and
/// feeds the outcome back through [`PredictorView::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub request_id: u64,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct PredictorView {
    input: String,
    pending: bool,
    result: Option<String>,
    last_request_id: u64,
}

impl PredictorView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn last_request_id(&self) -> u64 {
        self.last_request_id
    }

    pub fn phase(&self) -> Phase {
        if self.pending {
            Phase::Pending
        } else if self.result.is_some() {
            Phase::Settled
        } else {
            Phase::Idle
        }
    }

    /// Whitespace-only input is ignored without touching any state.
    /// The untrimmed input is what gets sent.
    pub fn submit(&mut self) -> Option<Dispatch> {
        if self.input.trim().is_empty() {
            return None;
        }

        self.pending = true;
        self.result = None;
        self.last_request_id += 1;

        Some(Dispatch {
            request_id: self.last_request_id,
            description: self.input.clone(),
        })
    }

    /// Settle the outstanding request. Both arms end with `pending == false`.
    pub fn resolve(&mut self, outcome: Result<PredictResponse, ClassifierError>) {
        let text = match outcome {
            Ok(response) => response.label().unwrap_or(NO_CATEGORY).to_string(),
            Err(_) => CONNECTION_ERROR.to_string(),
        };

        self.result = Some(text);
        self.pending = false;
    }
}
