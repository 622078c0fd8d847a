pub mod cafes;

use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(legacy_get_delete: bool) -> Router<Arc<crate::AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(cafes::routes(legacy_get_delete))
}
