// src/services/mail_service.rs

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
#[cfg(test)]
use mockall::automock;
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::models::lead::Lead;

// Falhas de envio. Nunca chegam ao cliente: só vão para o log.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Endereço de e-mail inválido: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Falha ao montar a mensagem: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("Falha no SMTP: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Tempo esgotado ao enviar e-mail")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

// Envio real via SMTP (Gmail por padrão)
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, user: &str, password: &str) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        Ok(Self {
            transport,
            from: user.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to.parse()?)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

// Usado quando EMAIL_USER/EMAIL_PASS não estão configurados
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::debug!("E-mail não configurado, envio ignorado: {}", mail.subject);
        Ok(())
    }
}

// Monta e dispara os e-mails de uma lead recém-cadastrada.
#[derive(Clone)]
pub struct MailService {
    mailer: Arc<dyn Mailer>,
    admin_email: Option<String>,
    timeout: Duration,
}

impl MailService {
    pub fn new(mailer: Arc<dyn Mailer>, admin_email: Option<String>, timeout: Duration) -> Self {
        Self {
            mailer,
            admin_email,
            timeout,
        }
    }

    /// Dispara o envio em uma task separada. Não retorna nada ao chamador:
    /// falhas são apenas registradas no log, sem nova tentativa.
    pub fn notify_new_lead(&self, lead: &Lead) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        let lead = lead.clone();

        tokio::spawn(async move {
            service.deliver(welcome_mail(&lead)).await;
            if let Some(admin) = &service.admin_email {
                service.deliver(admin_mail(admin, &lead)).await;
            }
        })
    }

    async fn deliver(&self, mail: OutgoingMail) {
        let to = mail.to.clone();
        let result = match tokio::time::timeout(self.timeout, self.mailer.send(mail)).await {
            Ok(result) => result,
            Err(_) => Err(MailError::Timeout),
        };

        match result {
            Ok(()) => tracing::info!("📧 E-mail enviado para {}", to),
            Err(e) => tracing::error!("Erro ao enviar e-mail para {}: {}", to, e),
        }
    }
}

pub fn welcome_mail(lead: &Lead) -> OutgoingMail {
    OutgoingMail {
        to: lead.email.clone(),
        subject: "Bem-vinda à lista de espera da GlowMuse! 🎉".to_string(),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="padding: 30px; background: #faf3ef;">
    <h2 style="color: #5a1e2e;">Olá, {name}!</h2>
    <p>Obrigada por entrar na lista de espera da GlowMuse.</p>
    <p>Você será uma das primeiras a saber do nosso lançamento.</p>
  </div>
</div>"#,
            name = escape_html(&lead.name),
        ),
    }
}

pub fn admin_mail(admin: &str, lead: &Lead) -> OutgoingMail {
    OutgoingMail {
        to: admin.to_string(),
        subject: format!("Nova lead cadastrada: {}", lead.name),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="padding: 30px; background: #faf3ef;">
    <h3 style="color: #5a1e2e;">Nova lead cadastrada na GlowMuse</h3>
    <p><strong>Nome:</strong> {name}</p>
    <p><strong>E-mail:</strong> {email}</p>
    <p><strong>Telefone:</strong> {phone}</p>
    <p><strong>Data:</strong> {date}</p>
    <p><strong>IP:</strong> {ip}</p>
  </div>
</div>"#,
            name = escape_html(&lead.name),
            email = escape_html(&lead.email),
            phone = escape_html(&lead.phone),
            date = lead.created_at.format("%d/%m/%Y %H:%M:%S UTC"),
            ip = escape_html(&lead.ip_address),
        ),
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead() -> Lead {
        Lead {
            id: 1,
            name: "Maria Silva".into(),
            email: "maria@test.com".into(),
            phone: "(11) 98888-7777".into(),
            created_at: Utc::now(),
            ip_address: "127.0.0.1".into(),
        }
    }

    #[test]
    fn admin_mail_lists_lead_details() {
        let mail = admin_mail("admin@glowmuse.com.br", &lead());

        assert_eq!(mail.to, "admin@glowmuse.com.br");
        assert_eq!(mail.subject, "Nova lead cadastrada: Maria Silva");
        assert!(mail.html.contains("(11) 98888-7777"));
        assert!(mail.html.contains("127.0.0.1"));
    }

    #[test]
    fn escapes_markup_in_lead_fields() {
        assert_eq!(
            escape_html(r#"<b>"Ana" & 'Zé'</b>"#),
            "&lt;b&gt;&quot;Ana&quot; &amp; &#39;Zé&#39;&lt;/b&gt;"
        );
    }

    #[tokio::test]
    async fn sends_welcome_and_admin_mail() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|mail| mail.to == "maria@test.com")
            .times(1)
            .returning(|_| Ok(()));
        mailer
            .expect_send()
            .withf(|mail| mail.to == "admin@glowmuse.com.br")
            .times(1)
            .returning(|_| Ok(()));

        let service = MailService::new(
            Arc::new(mailer),
            Some("admin@glowmuse.com.br".into()),
            Duration::from_secs(1),
        );

        service.notify_new_lead(&lead()).await.unwrap();
    }

    #[tokio::test]
    async fn failed_delivery_does_not_stop_admin_notification() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(2)
            .returning(|_| Err(MailError::Timeout));

        let service = MailService::new(
            Arc::new(mailer),
            Some("admin@glowmuse.com.br".into()),
            Duration::from_secs(1),
        );

        // A task termina normalmente mesmo com as duas falhas
        service.notify_new_lead(&lead()).await.unwrap();
    }
}
