use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod classifier;
mod config;
mod handler;
mod predictor;
mod tui;
mod ui;

use app::App;
use classifier::ClassifierClient;
use config::Config;
use predictor::PredictorView;

#[derive(Parser)]
#[command(name = "predict")]
#[command(about = "Predict a product category from a free-text description")]
struct Cli {
    /// Base URL of the classification service
    #[arg(long, global = true, env = "PREDICT_BACKEND_URL")]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive predictor (default)
    Tui,
    /// Classify one description and print the result
    Predict {
        /// Product or issue description
        description: String,
    },
    /// Check the service is reachable
    Greet {
        #[arg(short, long, default_value = "World")]
        name: String,
    },
    /// Save the backend URL to the config file
    SetBackend {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    init_logging(matches!(command, Commands::Tui))?;

    if let Commands::SetBackend { url } = &command {
        reqwest::Url::parse(url).with_context(|| format!("invalid backend url: {url}"))?;
        let path = Config::save_backend_url(url)?;
        println!("Backend set to {} ({})", url, path.display());
        return Ok(());
    }

    let config = Config::load().context("failed to read config file")?;
    let base_url = config.backend_url(cli.backend_url.as_deref());
    let classifier = match config.request_timeout() {
        Some(timeout) => ClassifierClient::with_timeout(&base_url, timeout)?,
        None => ClassifierClient::new(&base_url),
    };
    info!(backend = %classifier.base_url(), "classification service configured");

    match command {
        Commands::Tui => run_tui(classifier).await,
        Commands::Predict { description } => predict_once(&classifier, description).await,
        Commands::Greet { name } => {
            let message = classifier
                .greet(&name)
                .await
                .with_context(|| format!("could not reach {}", classifier.base_url()))?;
            println!("{message}");
            Ok(())
        }
        Commands::SetBackend { .. } => Ok(()),
    }
}

/// The TUI owns stderr, so interactive sessions log to a file.
fn init_logging(to_file: bool) -> Result<()> {
    if to_file {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let log_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?
            .join("product-predict");
        std::fs::create_dir_all(&log_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("predict.log"))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

async fn run_tui(classifier: ClassifierClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run_loop(&mut terminal, classifier).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, classifier: ClassifierClient) -> Result<()> {
    let mut app = App::new(classifier);
    let mut events = tui::EventHandler::new();
    let tx = events.sender();

    terminal.draw(|frame| ui::render(&mut app, frame))?;

    while !app.should_quit {
        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(&mut app, event, &tx);
        terminal.draw(|frame| ui::render(&mut app, frame))?;
    }

    Ok(())
}

async fn predict_once(classifier: &ClassifierClient, description: String) -> Result<()> {
    let mut view = PredictorView::new();
    view.set_input(description);

    let Some(dispatch) = view.submit() else {
        eprintln!("Nothing to predict: the description is empty");
        return Ok(());
    };

    let outcome = classifier.predict(&dispatch.description).await;
    if let Err(e) = &outcome {
        tracing::warn!(error = %e, "prediction failed");
    }
    view.resolve(outcome);

    if let Some(result) = view.result() {
        println!("Predicted Category: {result}");
    }
    Ok(())
}
