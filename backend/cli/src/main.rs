mod api;
mod catalog_cmd;
mod config_cmd;
mod output;
mod sessions;
mod speak_cmd;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use vozform_config::{config_dir, config_file_path, load_and_prepare, PreparedConfig, VozformConfig};
use vozform_forms::WebhookFormSink;
use vozform_tts::WebhookTts;

use api::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "vozform")]
#[command(about = "VozForm: a speaking keyboard and a contact-form builder")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.vozform/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send text to the TTS webhook and save the returned audio
    Speak {
        text: String,
        /// Where to write the audio
        #[arg(short, long, default_value = "vozform-speech.mp3")]
        out: PathBuf,
    },
    /// List the predefined form fields and icons
    Catalog,
    /// Print the effective configuration
    Config {
        /// Write a config file with every default instead
        #[arg(long)]
        init: bool,
        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));

    if let Commands::Config { init: true, force } = cli.command {
        return config_cmd::init(&path, force).await;
    }

    let PreparedConfig { config, warnings } = load_and_prepare(&path)
        .await
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    logging::init_logger(config.log_dir(), config.log_level());
    for warning in &warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }

    match cli.command {
        Commands::Serve { port } => run_server(config, port).await,
        Commands::Speak { text, out } => speak_cmd::run(&config, &text, out).await,
        Commands::Catalog => {
            catalog_cmd::run();
            Ok(())
        }
        Commands::Config { .. } => config_cmd::show(&config),
    }
}

async fn run_server(config: VozformConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.port());
    let timeout = Duration::from_secs(config.timeout_secs());
    info!(
        port,
        bind = %config.bind(),
        tts = %config.tts_webhook(),
        forms = %config.forms_webhook(),
        "Starting VozForm API"
    );

    let tts = WebhookTts::with_timeout(config.tts_webhook(), timeout)?;
    let forms = WebhookFormSink::with_timeout(config.forms_webhook(), timeout)?;
    let addr = format!("{}:{}", config.bind(), port);
    let state = Arc::new(AppState::new(config, Arc::new(tts), Arc::new(forms)));

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let dropped = sweeper.cleanup().await;
            if dropped > 0 {
                info!(dropped, "Dropped idle sessions");
            }
        }
    });

    let app = api::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
