// src/handlers/health.rs

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "OK")]
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    // Segundos desde que o estado foi montado
    #[schema(example = 3600.5)]
    pub uptime: f64,
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Servidor no ar", body = HealthResponse)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
        uptime: app_state.started_at.elapsed().as_secs_f64(),
    })
}

// Qualquer rota desconhecida
pub async fn not_found(locale: Locale) -> ApiError {
    ApiError::not_found(&locale)
}
