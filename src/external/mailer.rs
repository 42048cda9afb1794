use crate::config::MailerConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

/// Delivers sign-in links. Swappable so tests can capture the link.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_magic_link(&self, to: &str, link: &str) -> AppResult<()>;
}

pub type SharedMailer = Arc<dyn MailSender>;

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
}

#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    config: MailerConfig,
}

impl HttpMailer {
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty() && !self.config.api_url.is_empty()
    }
}

#[async_trait]
impl MailSender for HttpMailer {
    async fn send_magic_link(&self, to: &str, link: &str) -> AppResult<()> {
        if !self.is_configured() {
            // development mode
            log::warn!("Mailer not configured, sign-in link for {to}: {link}");
            return Ok(());
        }

        let body = SendMailRequest {
            from: &self.config.from_address,
            to,
            subject: "Your sign-in link",
            text: format!(
                "Use the link below to sign in. It expires shortly and works once.\n\n{link}\n"
            ),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Sign-in link sent to {to}");
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Sign-in link to {to} failed: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "Mail sending failed: {error_text}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_mailer_logs_instead_of_sending() {
        let mailer = HttpMailer::new(MailerConfig::default());
        assert!(!mailer.is_configured());
        mailer
            .send_magic_link("ada@example.org", "http://localhost/verify?token=abc")
            .await
            .unwrap();
    }
}
