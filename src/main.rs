use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tagboard::cache::CacheStore;
use tagboard::config::Config;
use tagboard::gemini::GeminiClient;
use tagboard::server::{self, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tagboard=info")),
        )
        .init();

    Config::load_env_file();
    let config = Config::load(Path::new("config.toml"))?;
    let api_key = Config::gemini_api_key()?;

    let cache = CacheStore::new(config.cache.dir.clone());
    cache.init()?;

    let classifier = Arc::new(GeminiClient::new(&config.gemini, api_key)?);

    tracing::info!(
        bind = %config.server.bind_addr,
        target = %config.analysis.target_folder.display(),
        allowed_keys = config.analysis.allowed_keys.len(),
        "starting tagboard"
    );

    let bind_addr = config.server.bind_addr.clone();
    let state = AppState::new(config, cache, classifier);
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    axum::serve(listener, app).await.context("server error")
}
