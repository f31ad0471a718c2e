use std::{net::SocketAddr, sync::Arc};

use gemini_core::{GeminiClient, SpeechSource};
use tokio::net::TcpListener;
use tracing::{info, warn};

use tts_server::{build_router, config::ServerConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting Gemini TTS server...");

    let config = ServerConfig::from_env();

    let source: Option<Arc<dyn SpeechSource>> = match config.gemini_config() {
        Some(gemini) => {
            info!("Using model {} at {}", gemini.model, gemini.base_url);
            Some(Arc::new(GeminiClient::new(gemini)))
        }
        None => {
            warn!("GEMINI_API_KEY not set, generation requests will fail until it is configured");
            None
        }
    };

    info!(
        "Server configuration loaded: port={}, request_timeout={}s, default_voice={}",
        config.port, config.request_timeout_secs, config.default_voice
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let app = build_router(AppState::new(config, source));

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
