pub mod handlers;

use crate::app::ClaimService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub claims: Arc<ClaimService>,
}

impl AppState {
    pub fn new(claims: ClaimService) -> Self {
        Self {
            claims: Arc::new(claims),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/imprimir", post(handlers::imprimir))
        .route("/validar", post(handlers::validar))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
