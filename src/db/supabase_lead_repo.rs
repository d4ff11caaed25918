// src/db/supabase_lead_repo.rs

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::{
    common::error::AppError,
    db::lead_repo::LeadRepository,
    models::lead::{Lead, NewLead},
};

const LEADS_TABLE: &str = "leads";
// Código do Postgres para unique_violation, repassado pelo PostgREST
const UNIQUE_VIOLATION: &str = "23505";

// Repositório de leads no Supabase, falando direto com o PostgREST.
#[derive(Clone)]
pub struct SupabaseLeadRepository {
    client: Client,
    table_url: String,
    api_key: String,
}

impl SupabaseLeadRepository {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        let table_url = format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), LEADS_TABLE);

        tracing::info!("✅ Cliente Supabase configurado para {}", base_url);

        Ok(Self {
            client,
            table_url,
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

// Corpo de erro do PostgREST: {"code", "message", "details", "hint"}
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
}

fn is_unique_violation(body: &str) -> bool {
    serde_json::from_str::<PostgrestError>(body)
        .ok()
        .and_then(|error| error.code)
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

// Converte respostas de erro do PostgREST em AppError
async fn check(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::CONFLICT || is_unique_violation(&body) {
        return Err(AppError::EmailAlreadyExists);
    }

    Err(AppError::SupabaseError {
        status: status.as_u16(),
        body,
    })
}

// "0-0/42" ou "*/42" -> 42
fn parse_content_range(value: &str) -> Option<i64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl LeadRepository for SupabaseLeadRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>, AppError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*".to_string()), ("email", format!("eq.{email}"))])
            .send()
            .await?;

        let leads: Vec<Lead> = check(response).await?.json().await?;
        Ok(leads.into_iter().next())
    }

    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let body = json!([{
            "name": lead.name,
            "email": lead.email,
            "phone": lead.phone,
            "ip_address": lead.ip_address,
            "created_at": Utc::now(),
        }]);

        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let mut created: Vec<Lead> = check(response).await?.json().await?;
        created.pop().ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("Supabase não devolveu a lead inserida"))
        })
    }

    async fn count(&self) -> Result<i64, AppError> {
        let response = self
            .request(reqwest::Method::HEAD)
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let response = check(response).await?;
        response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| {
                AppError::InternalServerError(anyhow::anyhow!(
                    "Supabase não devolveu Content-Range na contagem"
                ))
            })
    }

    async fn close(&self) {
        // O reqwest não mantém nada que precise ser encerrado explicitamente.
        tracing::info!("Cliente Supabase liberado");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http;

    fn response(status: u16, body: &str) -> Response {
        Response::from(
            http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn conflict_status_maps_to_email_already_exists() {
        let err = check(response(409, "")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn unique_violation_code_maps_to_email_already_exists() {
        let body = r#"{"code":"23505","details":"Key (email)=(maria@test.com) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"leads_email_key\""}"#;

        let err = check(response(400, body)).await.unwrap_err();

        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn other_failures_keep_status_and_body() {
        // O número aparece no texto, mas o código do erro é outro.
        let body = r#"{"code":"42501","message":"permission denied for table leads 23505"}"#;

        let err = check(response(401, body)).await.unwrap_err();

        match err {
            AppError::SupabaseError { status, body: text } => {
                assert_eq!(status, 401);
                assert!(text.contains("42501"));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
        assert!(!check(response(503, "upstream down")).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn success_passes_through() {
        let ok = check(response(201, "[]")).await.unwrap();
        assert_eq!(ok.status(), StatusCode::CREATED);
    }

    #[test]
    fn decodes_postgrest_rows() {
        let body = r#"[{
            "id": 7,
            "name": "Maria Silva",
            "email": "maria@test.com",
            "phone": "(11) 98888-7777",
            "created_at": "2025-10-20T12:34:56.789012+00:00",
            "ip_address": "203.0.113.7"
        }]"#;

        let leads: Vec<Lead> = serde_json::from_str(body).unwrap();

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, 7);
        assert_eq!(leads[0].ip_address, "203.0.113.7");
        assert_eq!(
            leads[0].created_at.to_rfc3339(),
            "2025-10-20T12:34:56.789012+00:00"
        );
    }

    #[test]
    fn parses_content_range_totals() {
        assert_eq!(parse_content_range("0-0/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
    }

    #[test]
    fn builds_table_url_without_double_slash() {
        let repo = SupabaseLeadRepository::new(
            "https://example.supabase.co/",
            "anon",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(repo.table_url, "https://example.supabase.co/rest/v1/leads");
    }
}
