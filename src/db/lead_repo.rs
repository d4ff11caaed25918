// src/db/lead_repo.rs

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    common::error::AppError,
    models::lead::{Lead, NewLead},
};

/// Acesso à tabela `leads`, independente do backend.
///
/// A coluna `email` tem restrição UNIQUE em todos os backends: um `insert`
/// que viola essa restrição precisa devolver `AppError::EmailAlreadyExists`,
/// nunca um erro genérico.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Busca uma lead pelo e-mail já normalizado.
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>, AppError>;

    /// Insere a lead. O backend define `id` e `created_at`.
    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError>;

    /// Total de leads cadastradas.
    async fn count(&self) -> Result<i64, AppError>;

    /// Fecha o handle do armazenamento no shutdown.
    async fn close(&self);
}

// Violação de UNIQUE vinda do banco vira o mesmo conflito da checagem prévia.
pub(crate) fn map_insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::EmailAlreadyExists;
        }
    }
    e.into()
}
