pub mod categories;

use axum::routing::{get, put};
use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/:id",
            put(categories::update).delete(categories::delete),
        )
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
