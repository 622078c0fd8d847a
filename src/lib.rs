pub mod config;
pub mod controllers;
pub mod csrf;
pub mod database;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod views;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Shared state для всего приложения, передается в хендлеры через State
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub csrf: csrf::CsrfGuard,
}

impl AppState {
    pub async fn new(config: config::Config) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        db.run_migrations().await?;

        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: config::Config, db: database::Database) -> Arc<Self> {
        let csrf = csrf::CsrfGuard::new(
            config.security.secret_key.clone(),
            config.security.csrf_ttl_seconds,
        );
        Arc::new(Self { db, config, csrf })
    }
}

/// Full application router with all routes and the HTTP trace layer.
pub fn app(state: Arc<AppState>) -> Router {
    controllers::routes(state.config.features.legacy_get_delete)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
