// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::common::messages;
use crate::middleware::i18n::Locale;
use crate::models::lead::FIELD_ORDER;

// Erros internos da aplicação.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidPayload(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de migração: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro HTTP no Supabase: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Supabase respondeu {status}: {body}")]
    SupabaseError { status: u16, body: String },

    #[error("Tempo esgotado ao acessar o armazenamento ({0})")]
    StorageTimeout(&'static str),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

// Um erro de campo, como o cliente recebe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "name")]
    pub field: String,
    #[schema(example = "Nome deve ter entre 2 e 100 caracteres")]
    pub message: String,
}

// O erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = false)]
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl AppError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::EmailAlreadyExists)
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        match self {
            AppError::ValidationError(errors) => ApiError {
                status: StatusCode::BAD_REQUEST,
                message: messages::text(locale, "invalid_data").to_string(),
                errors: Some(field_errors(errors, locale)),
            },
            AppError::InvalidPayload(_) => ApiError {
                status: StatusCode::BAD_REQUEST,
                message: messages::text(locale, "invalid_body").to_string(),
                errors: None,
            },
            AppError::EmailAlreadyExists => ApiError {
                status: StatusCode::CONFLICT,
                message: messages::text(locale, "email_exists").to_string(),
                errors: None,
            },
            // Todo o resto vira 500. O detalhe fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::internal(locale)
            }
        }
    }
}

impl ApiError {
    pub fn internal(locale: &Locale) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: messages::text(locale, "internal").to_string(),
            errors: None,
        }
    }

    pub fn not_found(locale: &Locale) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: messages::text(locale, "not_found").to_string(),
            errors: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.message,
            errors: self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}

// Achata o ValidationErrors do `validator` em [{field, message}], na ordem dos
// campos do formulário.
fn field_errors(errors: &validator::ValidationErrors, locale: &Locale) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    let mut list = Vec::new();

    for field in FIELD_ORDER {
        for (name, field_errors) in by_field.iter() {
            if *name != field {
                continue;
            }
            for error in field_errors.iter() {
                let code = error.message.as_deref().unwrap_or(&error.code);
                list.push(FieldError {
                    field: field.to_string(),
                    message: messages::text(locale, code).to_string(),
                });
            }
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::CreateLeadPayload;

    fn invalid_payload_errors() -> validator::ValidationErrors {
        CreateLeadPayload {
            name: "M1".into(),
            email: "nope".into(),
            phone: "123".into(),
        }
        .into_new_lead("unknown".into())
        .unwrap_err()
    }

    #[test]
    fn validation_errors_are_listed_in_form_order() {
        let api_error = AppError::from(invalid_payload_errors()).to_api_error(&Locale::default());

        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        let fields: Vec<String> = api_error
            .errors
            .unwrap()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["name", "email", "phone"]);
    }

    #[test]
    fn conflict_maps_to_409() {
        let api_error = AppError::EmailAlreadyExists.to_api_error(&Locale::default());
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert!(api_error.errors.is_none());
    }

    #[test]
    fn storage_failures_hide_details() {
        let api_error = AppError::StorageTimeout("insert").to_api_error(&Locale("en".into()));
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api_error.message.contains("insert"));
    }
}
