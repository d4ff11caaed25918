// src/db/sqlite_lead_repo.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::{str::FromStr, time::Duration};

use crate::{
    common::error::AppError,
    db::lead_repo::{map_insert_error, LeadRepository},
    models::lead::{Lead, NewLead},
};

// Repositório de leads em arquivo SQLite (modo de desenvolvimento)
#[derive(Clone)]
pub struct SqliteLeadRepository {
    pool: SqlitePool,
}

impl SqliteLeadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Abre (ou cria) o arquivo e roda as migrações
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Um banco em memória só existe dentro de uma conexão, então a pool
        // precisa ficar com uma conexão só e nunca reciclá-la.
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        tracing::info!("✅ SQLite conectado com sucesso ({})", database_url);

        sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
        tracing::info!("✅ Migrações do SQLite executadas com sucesso!");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl LeadRepository for SqliteLeadRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            "SELECT id, name, email, phone, created_at, ip_address FROM leads WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (name, email, phone, created_at, ip_address)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, email, phone, created_at, ip_address
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(Utc::now())
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
        tracing::info!("Conexão com o SQLite encerrada");
    }
}
