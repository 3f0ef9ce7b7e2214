pub mod error;
pub mod notifications;
pub mod stickers;
pub mod users;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(users::routes())
        .merge(stickers::routes())
        .merge(notifications::routes())
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
