// hackhub-service/src/services/email_service.rs
use crate::config::EmailConfig;
use crate::models::{EmailKind, OutgoingEmail, TeamEmailRequest};
use crate::utils::is_valid_email;
use async_trait::async_trait;
use derive_more::Display;
use log::{info, warn};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Display, PartialEq)]
pub enum EmailError {
    #[display(fmt = "Invalid recipient email: {}", _0)]
    InvalidRecipient(String),
    #[display(fmt = "Failed to send email: {}", _0)]
    SendFailed(String),
    #[display(fmt = "Email provider rejected the message ({}): {}", status, body)]
    Rejected { status: u16, body: String },
}

impl std::error::Error for EmailError {}

/// Transactional email provider. Returns the provider's response payload.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, EmailError>;
}

// Resend HTTP API
pub struct ResendSender {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl ResendSender {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, EmailError> {
        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))
    }
}

// Used when no provider key is configured
pub struct LogOnlySender;

#[async_trait]
impl EmailSender for LogOnlySender {
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, EmailError> {
        let id = format!("logged-{}", uuid::Uuid::new_v4());
        info!("📧 [log-only] {} -> {:?}: {}", email.from, email.to, email.subject);
        Ok(json!({ "id": id, "logged": true }))
    }
}

pub fn create_sender(config: &EmailConfig) -> Arc<dyn EmailSender> {
    match &config.api_key {
        Some(key) => Arc::new(ResendSender::new(key.clone(), config.api_url.clone())),
        None => {
            warn!("⚠️ RESEND_API_KEY not set, emails will only be logged");
            Arc::new(LogOnlySender)
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Subject and HTML body for a request.
pub fn render(request: &TeamEmailRequest) -> (String, String) {
    let name = escape_html(&request.recipient_name);
    let team = escape_html(&request.team_name);
    let hackathon = escape_html(&request.hackathon_name);

    let (subject, heading, body) = match request.kind() {
        EmailKind::TeamInvitation => (
            format!("You've been invited to join {}", request.team_name),
            "You're invited!".to_string(),
            format!(
                "<p>Hi {},</p><p>You have been invited to join <strong>{}</strong> for <strong>{}</strong>. \
                 Sign in to accept or decline the invitation.</p>",
                name, team, hackathon
            ),
        ),
        EmailKind::ApplicationApproved => (
            format!("{} has been accepted to {}", request.team_name, request.hackathon_name),
            "Congratulations! 🎉".to_string(),
            format!(
                "<p>Hi {},</p><p>Your team <strong>{}</strong> has been accepted to <strong>{}</strong>. \
                 We can't wait to see what you build.</p>",
                name, team, hackathon
            ),
        ),
        EmailKind::ApplicationRejected => (
            format!("Update on your application to {}", request.hackathon_name),
            "Application update".to_string(),
            format!(
                "<p>Hi {},</p><p>Unfortunately your team <strong>{}</strong> was not accepted to \
                 <strong>{}</strong> this time. Thank you for applying.</p>",
                name, team, hackathon
            ),
        ),
        EmailKind::MemberRemoved => {
            let reason = match request.removal_reason.as_deref().map(str::trim) {
                Some(reason) if !reason.is_empty() => {
                    format!("<p><strong>Reason:</strong> {}</p>", escape_html(reason))
                }
                _ => String::new(),
            };
            (
                format!("You have been removed from {}", request.team_name),
                "Team membership update".to_string(),
                format!(
                    "<p>Hi {},</p><p>You are no longer a member of <strong>{}</strong> for \
                     <strong>{}</strong>.</p>{}",
                    name, team, hackathon, reason
                ),
            )
        }
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #333; background: #f5f5f5; margin: 0; }}
        .card {{ max-width: 560px; margin: 40px auto; background: white; border-radius: 8px; padding: 32px; }}
        h1 {{ font-size: 22px; margin-top: 0; }}
        .footer {{ margin-top: 24px; color: #888; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="card">
        <h1>{}</h1>
        {}
        <div class="footer">Sent by HackHub</div>
    </div>
</body>
</html>"#,
        heading, body
    );

    (subject, html)
}

pub fn compose(from: &str, request: &TeamEmailRequest) -> Result<OutgoingEmail, EmailError> {
    let to = request.recipient_email.trim();
    if !is_valid_email(to) {
        return Err(EmailError::InvalidRecipient(request.recipient_email.clone()));
    }

    let (subject, html) = render(request);
    Ok(OutgoingEmail {
        from: from.to_string(),
        to: vec![to.to_string()],
        subject,
        html,
    })
}

pub async fn send_team_email(
    sender: &dyn EmailSender,
    from: &str,
    request: &TeamEmailRequest,
) -> Result<Value, EmailError> {
    let email = compose(from, request)?;
    let payload = sender.send(&email).await?;
    info!("📧 Sent {:?} email to {}", request.kind(), request.recipient_email);
    Ok(payload)
}

// Membership events never fail because an email could not be sent
pub async fn send_best_effort(sender: &dyn EmailSender, from: &str, request: &TeamEmailRequest) {
    if let Err(e) = send_team_email(sender, from, request).await {
        warn!("⚠️ Could not email {}: {}", request.recipient_email, e);
    }
}
