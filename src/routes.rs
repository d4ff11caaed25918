// src/routes.rs

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

// Monta o router principal
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::health::health))
        .route("/api/leads", post(handlers::leads::create_lead))
        .route("/api/leads/count", get(handlers::leads::count_leads))
        .fallback(handlers::health::not_found)
        .with_state(app_state)
}
