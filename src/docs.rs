// src/docs.rs

use utoipa::OpenApi;
use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::count_leads,

        // --- Health ---
        handlers::health::health,
    ),
    components(
        schemas(
            // --- Leads ---
            models::lead::Lead,
            models::lead::CreateLeadPayload,
            handlers::leads::LeadCreatedResponse,
            handlers::leads::LeadCountResponse,

            // --- Erros ---
            common::error::ErrorBody,
            common::error::FieldError,

            // --- Health ---
            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "Leads", description = "Cadastro na lista de espera"),
        (name = "Health", description = "Verificação de disponibilidade")
    )
)]
pub struct ApiDoc;
