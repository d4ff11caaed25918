// src/config.rs

use anyhow::{bail, Context};
use std::{env, str::FromStr, sync::Arc, time::{Duration, Instant}};

use crate::{
    db::{LeadRepository, PgLeadRepository, SqliteLeadRepository, SupabaseLeadRepository},
    services::{
        lead_service::LeadService,
        mail_service::{DisabledMailer, MailService, Mailer, SmtpMailer},
    },
};

const DEFAULT_DATABASE_URL: &str = "postgresql://localhost:5432/glowmuse_leads";

// Onde as leads ficam guardadas. Era um servidor diferente para cada um;
// aqui é só uma escolha de configuração.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { url: String },
    Sqlite { url: String },
    Supabase { url: String, api_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub max_connections: u32,
    pub storage_timeout: Duration,
    pub smtp: Option<SmtpSettings>,
    pub admin_email: Option<String>,
    pub mail_timeout: Duration,
}

impl Settings {
    // Lê o .env (se existir) e depois as variáveis de ambiente
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let storage = match get("LEAD_STORE").map(|v| v.to_lowercase()).as_deref() {
            Some("supabase") => StorageBackend::Supabase {
                url: get("SUPABASE_URL").context("SUPABASE_URL deve ser definida")?,
                api_key: get("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY deve ser definida")?,
            },
            Some("sqlite") => StorageBackend::Sqlite {
                url: get("DATABASE_URL").unwrap_or_else(|| "sqlite://glowmuse_leads.db".to_string()),
            },
            Some("postgres") => StorageBackend::Postgres {
                url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
            Some(other) => bail!("LEAD_STORE inválido: {other} (use postgres, sqlite ou supabase)"),
            // Sem LEAD_STORE, o esquema da DATABASE_URL decide
            None => {
                let url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
                if url.starts_with("sqlite:") {
                    StorageBackend::Sqlite { url }
                } else {
                    StorageBackend::Postgres { url }
                }
            }
        };

        // E-mail é opcional: sem credenciais o servidor roda sem notificações
        let smtp = match (get("EMAIL_USER"), get("EMAIL_PASS")) {
            (Some(user), Some(password)) => Some(SmtpSettings {
                host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                user,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 3000)?,
            storage,
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            storage_timeout: Duration::from_secs(parse_or(&get, "STORAGE_TIMEOUT_SECS", 5)?),
            smtp,
            admin_email: get("ADMIN_EMAIL"),
            mail_timeout: Duration::from_secs(parse_or(&get, "MAIL_TIMEOUT_SECS", 10)?),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: {raw}")),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub lead_service: LeadService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(lead_service: LeadService) -> Self {
        Self {
            lead_service,
            started_at: Instant::now(),
        }
    }

    // Abre o armazenamento escolhido e monta o gráfico de dependências
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let repo = connect_storage(settings).await?;

        let mailer: Arc<dyn Mailer> = match &settings.smtp {
            Some(smtp) => {
                let mailer = SmtpMailer::new(&smtp.host, &smtp.user, &smtp.password)
                    .context("Falha ao configurar o SMTP")?;
                tracing::info!("✅ E-mail configurado ({})", smtp.host);
                Arc::new(mailer)
            }
            None => {
                tracing::warn!("⚠️  E-mail não configurado - rodando sem notificações");
                Arc::new(DisabledMailer)
            }
        };

        let mail = MailService::new(mailer, settings.admin_email.clone(), settings.mail_timeout);
        let lead_service = LeadService::new(repo, mail, settings.storage_timeout);

        Ok(Self::new(lead_service))
    }
}

pub async fn connect_storage(settings: &Settings) -> anyhow::Result<Arc<dyn LeadRepository>> {
    let repo: Arc<dyn LeadRepository> = match &settings.storage {
        StorageBackend::Postgres { url } => Arc::new(
            PgLeadRepository::connect(url, settings.max_connections, settings.storage_timeout)
                .await
                .context("Falha ao conectar ao Postgres")?,
        ),
        StorageBackend::Sqlite { url } => Arc::new(
            SqliteLeadRepository::connect(url, settings.max_connections, settings.storage_timeout)
                .await
                .context("Falha ao abrir o SQLite")?,
        ),
        StorageBackend::Supabase { url, api_key } => Arc::new(
            SupabaseLeadRepository::new(url, api_key, settings.storage_timeout)
                .context("Falha ao configurar o cliente Supabase")?,
        ),
    };

    Ok(repo)
}
