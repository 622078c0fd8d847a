use anyhow::Context;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cafe_catalog::{app, config::Config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cafe catalog ({})", config.app.environment);
    if config.uses_dev_secret() {
        warn!("SECRET_KEY not set, using development key");
    }

    // Подключение к БД и миграции
    let state = AppState::new(config.clone())
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialise database")?;
    info!("Database ready at {}", config.database.url);

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .context("HOST/PORT do not form a valid socket address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app(state).into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
