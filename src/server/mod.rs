mod app_state;
mod errors;
mod handlers;

use axum::routing::{get, post};
use axum::Router;

pub use app_state::AppState;
pub use errors::ServerError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/updated", post(handlers::updated))
        .with_state(state)
}
