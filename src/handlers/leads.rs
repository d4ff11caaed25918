// src/handlers/leads.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::{
        error::{ApiError, AppError, ErrorBody},
        messages,
    },
    config::AppState,
    middleware::{client_ip::ClientIp, i18n::Locale},
    models::lead::{CreateLeadPayload, Lead},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadCreatedResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Lead cadastrada com sucesso!")]
    pub message: String,
    #[schema(example = 42)]
    pub lead_id: i64,
    pub data: Lead,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadCountResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = 128)]
    pub count: i64,
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead cadastrada", body = LeadCreatedResponse),
        (status = 400, description = "Dados inválidos", body = ErrorBody),
        (status = 409, description = "E-mail já cadastrado", body = ErrorBody),
        (status = 500, description = "Erro interno", body = ErrorBody)
    ),
    params(
        ("Accept-Language" = Option<String>, Header, description = "pt (padrão) ou en")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    ClientIp(ip_address): ClientIp,
    payload: Result<Json<CreateLeadPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("Corpo rejeitado: {}", rejection.body_text());
        AppError::InvalidPayload(rejection.body_text()).to_api_error(&locale)
    })?;

    let new_lead = payload
        .into_new_lead(ip_address)
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let lead = app_state
        .lead_service
        .register_lead(new_lead)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    let body = LeadCreatedResponse {
        success: true,
        message: messages::text(&locale, "lead_created").to_string(),
        lead_id: lead.id,
        data: lead,
    };

    Ok((StatusCode::CREATED, Json(body)))
}

// GET /api/leads/count
#[utoipa::path(
    get,
    path = "/api/leads/count",
    tag = "Leads",
    responses(
        (status = 200, description = "Total de leads", body = LeadCountResponse),
        (status = 500, description = "Erro ao contar", body = ErrorBody)
    )
)]
pub async fn count_leads(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let count = app_state.lead_service.count_leads().await.map_err(|app_err| {
        let mut api_error = app_err.to_api_error(&locale);
        api_error.message = messages::text(&locale, "count_failed").to_string();
        api_error
    })?;

    Ok((StatusCode::OK, Json(LeadCountResponse { success: true, count })))
}
