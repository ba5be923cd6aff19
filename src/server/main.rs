use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use easyocr::{api, common::init_logger_exe};
use easyocr_core::image2text::vision::{DEFAULT_DOCUMENT_PROMPT, DEFAULT_MODEL, DEFAULT_TEXT_PROMPT, DEFAULT_URL};
use easyocr_core::image2text::VisionConfig;
use easyocr_core::process::OcrService;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(version, about = "HTTP relay that sends images to a vision model for OCR", long_about = None)]
struct Cli {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    #[arg(long, env = "OPENAI_API_URL", default_value = DEFAULT_URL)]
    api_url: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "OCR_TEXT_PROMPT", default_value = DEFAULT_TEXT_PROMPT, hide_default_value = true)]
    text_prompt: String,

    #[arg(long, env = "OCR_DOCUMENT_PROMPT", default_value = DEFAULT_DOCUMENT_PROMPT, hide_default_value = true)]
    document_prompt: String,

    #[arg(long, env = "OCR_CONNECT_TIMEOUT_SECS", default_value_t = 30)]
    connect_timeout_secs: u64,

    #[arg(long, env = "OCR_READ_TIMEOUT_SECS", default_value_t = 60)]
    read_timeout_secs: u64,

    #[arg(long, env = "OCR_MAX_BODY_BYTES", default_value_t = api::DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
}

impl Cli {
    fn vision_config(&self) -> VisionConfig {
        VisionConfig {
            url: self.api_url.clone(),
            api_key: Some(self.api_key.clone()),
            model: self.model.clone(),
            text_prompt: self.text_prompt.clone(),
            document_prompt: self.document_prompt.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger_exe();
    let cli = Cli::parse();

    let config = cli.vision_config();
    log::info!("Starting server with {:?}", config);
    let service = Arc::new(OcrService::new(config).context("invalid vision configuration")?);
    let app = api::router(service, cli.max_body_bytes);

    log::info!("Attempting to bind to {}:{}", cli.host, cli.port);
    let listener = TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", cli.host, cli.port))?;
    log::info!("Successfully bound to http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
    log::warn!("Ctrl-C received, stopping...");
}
