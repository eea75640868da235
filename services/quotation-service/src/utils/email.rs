use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use serde_json::json;

use crate::config::EmailSettings;
use crate::error::AppError;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

// Email siap kirim, body sudah dirender jadi HTML
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Transport pengiriman email transaksional (quotation, reminder)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError>;
}

/// Kirim email lewat HTTP API Resend
pub struct ResendEmailSender {
    client: reqwest::Client,
    api_key: String,
    from: String,
    endpoint: String,
}

impl ResendEmailSender {
    pub fn new(client: reqwest::Client, api_key: String, from_email: &str, from_name: &str) -> Self {
        Self {
            client,
            api_key,
            from: format!("{} <{}>", from_name, from_email),
            endpoint: RESEND_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        tracing::debug!("Sending email to {} via Resend", email.to);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [email.to],
                "subject": email.subject,
                "html": email.html,
                "text": plain_text_fallback(&email.html),
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Resend request to {} failed: {}", email.to, e);
                AppError::email(format!("Failed to reach email provider: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Resend rejected email to {}: {} {}", email.to, status, body);
            return Err(AppError::email(format!("Email provider menolak request ({})", status)));
        }

        tracing::info!("Email sent to {} via Resend", email.to);
        Ok(())
    }
}

/// Kirim email lewat SMTP dengan STARTTLS
pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from_email: &str,
        from_name: &str,
    ) -> Result<Self, AppError> {
        let from = format!("{} <{}>", from_name, from_email)
            .parse::<Mailbox>()
            .map_err(|e| AppError::email(format!("Invalid from address: {}", e)))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::email(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(Credentials::new(username, password))
            .port(port)
            .timeout(Some(Duration::from_secs(30)))
            .build();

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::email(format!("Invalid to address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(plain_text_fallback(&email.html)))
                    .singlepart(SinglePart::html(email.html.clone())),
            )
            .map_err(|e| AppError::email(format!("Failed to build email: {}", e)))?;

        tracing::debug!("Sending email to {} via SMTP", email.to);

        self.mailer
            .send(message)
            .await
            .map_err(|e| AppError::email(format!("Failed to send email: {}", e)))?;

        tracing::info!("Email sent to {} via SMTP", email.to);
        Ok(())
    }
}

/// Pilih transport email sesuai konfigurasi provider
pub fn build_email_sender(
    settings: &EmailSettings,
    http_client: reqwest::Client,
) -> Result<Arc<dyn EmailSender>, AppError> {
    match settings {
        EmailSettings::Resend {
            api_key,
            from_email,
            from_name,
        } => Ok(Arc::new(ResendEmailSender::new(
            http_client,
            api_key.clone(),
            from_email,
            from_name,
        ))),
        EmailSettings::Smtp {
            host,
            port,
            username,
            password,
            from_email,
            from_name,
        } => Ok(Arc::new(SmtpEmailSender::new(
            host,
            *port,
            username.clone(),
            password.clone(),
            from_email,
            from_name,
        )?)),
    }
}

// Versi plain text dari body HTML untuk client email yang tidak render HTML
pub fn plain_text_fallback(html: &str) -> String {
    let spaced = html
        .replace("<br>", "\n")
        .replace("</p>", "\n\n")
        .replace("</h1>", "\n")
        .replace("</h2>", "\n")
        .replace("</tr>", "\n")
        .replace("</td>", " ");

    let mut text = String::with_capacity(spaced.len());
    let mut in_tag = false;
    for c in spaced.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.lines()
        .map(|line| decode_entities(line.trim()))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// Kebalikan dari sanitize_html, &amp; terakhir supaya tidak decode dua kali
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_fallback_strips_tags() {
        let html = "<html><body><h1>Quotation Q-1A2B3C4D</h1><p>Halo <strong>Dana</strong>,</p><p>Total: 500.00</p></body></html>";
        let text = plain_text_fallback(html);

        assert_eq!(text, "Quotation Q-1A2B3C4D\nHalo Dana,\nTotal: 500.00");
    }

    #[test]
    fn test_plain_text_fallback_decodes_entities() {
        let html = format!("<p>{}</p>", shared::utils::validation::sanitize_html("PT Hijau & \"Co\" <Ltd> O'Neil"));
        let text = plain_text_fallback(&html);
        assert_eq!(text, "PT Hijau & \"Co\" <Ltd> O'Neil");

        assert_eq!(plain_text_fallback("<p>&amp;lt;</p>"), "&lt;");
    }

    #[tokio::test]
    async fn test_resend_transport_failure_is_email_error() {
        let sender = ResendEmailSender::new(
            reqwest::Client::new(),
            "re_test".to_string(),
            "sales@bioplast.example",
            "BioPlast",
        )
        .with_endpoint("http://127.0.0.1:9/emails");

        let result = sender
            .send(OutgoingEmail {
                to: "procurement@greenharvest.example".to_string(),
                subject: "Quotation".to_string(),
                html: "<p>Halo</p>".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::EmailError(_))));
    }

    #[test]
    fn test_smtp_sender_rejects_invalid_from_address() {
        let result = SmtpEmailSender::new(
            "smtp.example.com",
            587,
            "user".to_string(),
            "secret".to_string(),
            "not an address",
            "BioPlast",
        );
        assert!(matches!(result, Err(AppError::EmailError(_))));
    }
}
