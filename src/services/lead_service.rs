// src/services/lead_service.rs

use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    common::error::AppError,
    db::LeadRepository,
    models::lead::{normalize_email, Lead, NewLead},
    services::mail_service::MailService,
};

#[derive(Clone)]
pub struct LeadService {
    repo: Arc<dyn LeadRepository>,
    mail: MailService,
    storage_timeout: Duration,
}

impl LeadService {
    pub fn new(repo: Arc<dyn LeadRepository>, mail: MailService, storage_timeout: Duration) -> Self {
        Self {
            repo,
            mail,
            storage_timeout,
        }
    }

    // Toda chamada ao armazenamento tem prazo.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::time::timeout(self.storage_timeout, call)
            .await
            .map_err(|_| AppError::StorageTimeout(operation))?
    }

    /// Cadastra uma lead já validada.
    ///
    /// 1. normaliza o e-mail (idempotente, então é seguro repetir aqui);
    /// 2. se o e-mail já existe, devolve `EmailAlreadyExists` sem escrever nada;
    /// 3. insere. Se outra requisição inseriu o mesmo e-mail entre os passos 2
    ///    e 3, a restrição UNIQUE do banco dispara e o repositório devolve o
    ///    mesmo `EmailAlreadyExists`.
    ///
    /// Depois de gravada, os e-mails saem em uma task separada.
    pub async fn register_lead(&self, mut lead: NewLead) -> Result<Lead, AppError> {
        lead.email = normalize_email(&lead.email);

        let existing = self
            .bounded("find_by_email", self.repo.find_by_email(&lead.email))
            .await?;
        if existing.is_some() {
            tracing::info!("E-mail já cadastrado: {}", lead.email);
            return Err(AppError::EmailAlreadyExists);
        }

        let stored = self
            .bounded("insert", self.repo.insert(&lead))
            .await
            .inspect_err(|e| {
                if e.is_conflict() {
                    tracing::warn!("Cadastro simultâneo barrado pela restrição UNIQUE: {}", lead.email);
                }
            })?;

        tracing::info!("✅ Lead {} cadastrada ({})", stored.id, stored.email);

        self.mail.notify_new_lead(&stored);

        Ok(stored)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Lead>, AppError> {
        let email = normalize_email(email);
        self.bounded("find_by_email", self.repo.find_by_email(&email)).await
    }

    pub async fn count_leads(&self) -> Result<i64, AppError> {
        self.bounded("count", self.repo.count()).await
    }

    pub async fn shutdown(&self) {
        self.repo.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::lead_repo::MockLeadRepository,
        services::mail_service::{MockMailer, OutgoingMail},
    };
    use async_trait::async_trait;
    use chrono::Utc;

    fn new_lead(email: &str) -> NewLead {
        NewLead {
            name: "Maria Silva".into(),
            email: email.into(),
            phone: "(11) 98888-7777".into(),
            ip_address: "127.0.0.1".into(),
        }
    }

    fn stored(lead: &NewLead) -> Lead {
        Lead {
            id: 7,
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            created_at: Utc::now(),
            ip_address: lead.ip_address.clone(),
        }
    }

    fn silent_mail() -> MailService {
        let mut mailer = MockMailer::new();
        mailer.expect_send().returning(|_: OutgoingMail| Ok(()));
        MailService::new(Arc::new(mailer), None, Duration::from_secs(1))
    }

    fn service(repo: MockLeadRepository) -> LeadService {
        LeadService::new(Arc::new(repo), silent_mail(), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn stores_lead_with_normalized_email() {
        let mut repo = MockLeadRepository::new();
        repo.expect_find_by_email()
            .withf(|email| email == "maria@test.com")
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .withf(|lead| lead.email == "maria@test.com")
            .times(1)
            .returning(|lead| Ok(stored(lead)));

        let lead = service(repo)
            .register_lead(new_lead("  Maria@Test.com "))
            .await
            .unwrap();

        assert_eq!(lead.email, "maria@test.com");
        assert_eq!(lead.id, 7);
    }

    #[tokio::test]
    async fn existing_email_is_a_conflict_without_insert() {
        let mut repo = MockLeadRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(stored(&new_lead(email)))));
        repo.expect_insert().never();

        let err = service(repo)
            .register_lead(new_lead("maria@test.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn unique_violation_on_insert_is_a_conflict() {
        // Duas requisições passaram pela checagem ao mesmo tempo
        let mut repo = MockLeadRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_insert()
            .returning(|_| Err(AppError::EmailAlreadyExists));

        let err = service(repo)
            .register_lead(new_lead("maria@test.com"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let mut repo = MockLeadRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_insert()
            .returning(|_| Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut)));

        let err = service(repo)
            .register_lead(new_lead("maria@test.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn mail_failure_does_not_fail_registration() {
        let mut repo = MockLeadRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_insert().returning(|lead| Ok(stored(lead)));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .returning(|_| Err(crate::services::mail_service::MailError::Timeout));
        let mail = MailService::new(Arc::new(mailer), None, Duration::from_secs(1));

        let service = LeadService::new(Arc::new(repo), mail, Duration::from_secs(1));

        assert!(service.register_lead(new_lead("maria@test.com")).await.is_ok());
    }

    // Repositório que nunca responde, para exercitar o timeout.
    struct HangingRepository;

    #[async_trait]
    impl LeadRepository for HangingRepository {
        async fn find_by_email(&self, _email: &str) -> Result<Option<Lead>, AppError> {
            std::future::pending().await
        }

        async fn insert(&self, _lead: &NewLead) -> Result<Lead, AppError> {
            std::future::pending().await
        }

        async fn count(&self) -> Result<i64, AppError> {
            std::future::pending().await
        }

        async fn close(&self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn slow_storage_times_out() {
        let service = LeadService::new(
            Arc::new(HangingRepository),
            silent_mail(),
            Duration::from_secs(5),
        );

        let err = service
            .register_lead(new_lead("maria@test.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageTimeout("find_by_email")));

        let err = service.count_leads().await.unwrap_err();
        assert!(matches!(err, AppError::StorageTimeout("count")));
    }
}
