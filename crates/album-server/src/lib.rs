//! Album Server - Axum HTTP layer over the sticker album services.

pub mod config;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::create_router;
pub use state::AppState;
