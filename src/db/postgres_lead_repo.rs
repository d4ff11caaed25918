// src/db/postgres_lead_repo.rs

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::{
    common::error::AppError,
    db::lead_repo::{map_insert_error, LeadRepository},
    models::lead::{Lead, NewLead},
};

// Repositório de leads no Postgres (servidor de produção)
#[derive(Clone)]
pub struct PgLeadRepository {
    pool: PgPool,
}

impl PgLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Conecta e roda as migrações do Postgres
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        tracing::info!("✅ Conexão com o Postgres estabelecida com sucesso!");

        sqlx::migrate!("./migrations/postgres").run(&pool).await?;
        tracing::info!("✅ Migrações do Postgres executadas com sucesso!");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, name, email, phone, created_at, ip_address
            FROM leads
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        // created_at vem do DEFAULT NOW() da tabela
        sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (name, email, phone, ip_address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, created_at, ip_address
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.ip_address)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Conexão com o Postgres encerrada");
    }
}
