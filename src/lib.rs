//! Backend da lista de espera: valida, deduplica por e-mail e grava leads
//! em Postgres, SQLite ou Supabase.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
