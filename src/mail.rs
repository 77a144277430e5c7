use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::MailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(host: &str, username: &str, password: &str, from: &str) -> anyhow::Result<Self> {
        let creds = Credentials::new(username.to_string(), password.to_string());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(creds)
            .build();
        Ok(Self {
            transport,
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.transport.send(email).await?;
        info!(%to, %subject, "mail sent");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(%to, %subject, %body, "smtp not configured; mail logged only");
        Ok(())
    }
}

pub fn from_config(config: &MailConfig) -> anyhow::Result<Box<dyn Mailer>> {
    Ok(match &config.smtp {
        Some(smtp) => Box::new(SmtpMailer::new(
            &smtp.host,
            &smtp.username,
            &smtp.password,
            &config.from,
        )?),
        None => Box::new(LogMailer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_accepts_anything() {
        LogMailer
            .send("someone@example.com", "Password Reset", "link")
            .await
            .unwrap();
    }

    #[test]
    fn unconfigured_smtp_falls_back_to_log_mailer() {
        let config = MailConfig {
            smtp: None,
            from: "no-reply@pantry.local".into(),
            app_base_url: "http://localhost:8080".into(),
            reset_token_ttl_minutes: 60,
        };
        assert!(from_config(&config).is_ok());
    }
}
