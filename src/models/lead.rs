// src/models/lead.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

// Letras (incluindo acentos latinos) e espaços.
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\x{00C0}-\x{00FF}\s]+$").expect("regex de nome inválida")
});

// (11) 99999-9999 ou (11) 9999-9999
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\d{2}\)\s\d{4,5}-\d{4}$").expect("regex de telefone inválida")
});

/// Ordem em que os erros de campo são devolvidos ao cliente.
pub const FIELD_ORDER: [&str; 3] = ["name", "email", "phone"];

// Representa uma lead vinda do banco de dados (ou do Supabase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[schema(example = 42)]
    pub id: i64,
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "maria@test.com")]
    pub email: String,
    #[schema(example = "(11) 98888-7777")]
    pub phone: String,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "ip_address")]
    #[schema(example = "203.0.113.7")]
    pub ip_address: String,
}

// Dados prontos para o INSERT: já validados e normalizados.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ip_address: String,
}

// Corpo do POST /api/leads. Campo ausente ou `null` vira "" e cai na
// validação do próprio campo, em vez de rejeitar o corpo inteiro.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLeadPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        length(min = 2, max = 100, message = "name_length"),
        regex(path = *NAME_REGEX, message = "name_chars")
    )]
    #[schema(example = "Maria Silva")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "validate_email_address"))]
    #[schema(example = "Maria@Test.com")]
    pub email: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(regex(path = *PHONE_REGEX, message = "invalid_phone"))]
    #[schema(example = "(11) 98888-7777")]
    pub phone: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Sintaxe do `validator` e, além disso, domínio com TLD ("x@localhost" não passa).
fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    let has_tld = email
        .rsplit_once('@')
        .and_then(|(_, domain)| domain.rsplit_once('.'))
        .is_some_and(|(host, tld)| {
            !host.is_empty()
                && ((tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic))
                    || tld.starts_with("xn--"))
        });

    if email.validate_email() && has_tld {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

/// Chave de unicidade: e-mail sem espaços nas pontas e em minúsculas.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl CreateLeadPayload {
    /// Normaliza os campos antes da validação. O telefone precisa chegar já
    /// formatado pelo cliente, então não é tocado.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            phone: self.phone,
        }
    }

    /// Normaliza, valida todos os campos de uma vez e devolve o registro
    /// pronto para o repositório.
    pub fn into_new_lead(self, ip_address: String) -> Result<NewLead, ValidationErrors> {
        let payload = self.normalized();
        payload.validate()?;

        Ok(NewLead {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            ip_address,
        })
    }
}
