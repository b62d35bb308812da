//! Email notification delivery via SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport to send plain-text
//! notification emails for marketplace events. Configuration is loaded from
//! environment variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`]
//! returns `None` and the mailer runs in disabled mode, where every send
//! reports [`DeliveryOutcome::Skipped`]. A disabled mailer is a valid,
//! expected runtime mode, not an error.

use std::time::Duration;

use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::bus::MarketEvent;

// ---------------------------------------------------------------------------
// Error / outcome
// ---------------------------------------------------------------------------

/// Error type for email delivery failures. Internal to the mailer; callers
/// only ever see a [`DeliveryOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Result of a single delivery attempt. Never surfaced as an `Err`: the
/// triggering operation has already committed and must not observe
/// notification failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport accepted the message.
    Sent,
    /// Nothing was attempted (mail disabled, recipient missing, ...).
    Skipped(&'static str),
    /// The attempt ran and failed; the reason is for the log only.
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "Keyfront <noreply@keyfront.app>";

/// Default SMTP send timeout in seconds. Bounds how long a slow or
/// unreachable relay can stall the background task.
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// Per-send transport timeout in seconds.
    pub send_timeout_secs: u64,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and every send should be skipped.
    ///
    /// | Variable            | Required | Default                        |
    /// |---------------------|----------|--------------------------------|
    /// | `SMTP_HOST`         | yes      | —                              |
    /// | `SMTP_PORT`         | no       | `587`                          |
    /// | `SMTP_FROM`         | no       | `Keyfront <noreply@keyfront.app>` |
    /// | `SMTP_USER`         | no       | —                              |
    /// | `SMTP_PASSWORD`     | no       | —                              |
    /// | `SMTP_TIMEOUT_SECS` | no       | `10`                           |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            send_timeout_secs: std::env::var("SMTP_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_SEND_TIMEOUT_SECS),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Customer-facing copy for each request status. Statuses without a
/// dedicated message fall back to a generic line.
fn status_message(status: &str) -> &'static str {
    match status {
        "contacted" => "A realtor has reviewed your request and will contact you shortly.",
        "booked" => "Your viewing has been booked! The realtor will confirm the details.",
        "closed" => "Thank you for using Keyfront. We hope you found your perfect property!",
        _ => "Your request is being processed.",
    }
}

struct SmtpChannel {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

/// Sends notification emails for marketplace events.
///
/// The SMTP client is constructed once, at boot, from an optional
/// [`EmailConfig`]; there is no lazy global state.
pub struct Mailer {
    channel: Option<SmtpChannel>,
}

impl Mailer {
    /// Build a mailer from the environment. Without `SMTP_HOST` the mailer
    /// is disabled and all sends are skipped.
    pub fn from_env() -> Self {
        Self::new(EmailConfig::from_env())
    }

    /// Build a mailer from an explicit, optional configuration.
    pub fn new(config: Option<EmailConfig>) -> Self {
        let channel = config.and_then(|config| {
            let builder =
                match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host) {
                    Ok(builder) => builder,
                    Err(e) => {
                        tracing::error!(host = %config.smtp_host, error = %e,
                            "Invalid SMTP relay configuration, email delivery disabled");
                        return None;
                    }
                };

            let mut builder = builder
                .port(config.smtp_port)
                .timeout(Some(Duration::from_secs(config.send_timeout_secs)));

            if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
                builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
            }

            let transport = builder.build();
            Some(SmtpChannel { config, transport })
        });

        Self { channel }
    }

    /// A mailer that skips every send. Used when mail is not configured
    /// and by tests.
    pub fn disabled() -> Self {
        Self { channel: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.channel.is_some()
    }

    /// Email the assigned realtor about a freshly created viewing request.
    ///
    /// `event` must carry the serialized request row as its payload.
    pub async fn notify_new_request(&self, event: &MarketEvent, to: &str) -> DeliveryOutcome {
        let request = &event.payload;
        let customer_name = text_field(request, "customer_name").unwrap_or("Unknown");
        let subject = format!("New Viewing Request: {customer_name}");

        let mut body = String::from("You have received a new viewing request.\n\n");
        body.push_str(&format!("Customer: {customer_name}\n"));
        body.push_str(&format!(
            "Phone: {}\n",
            text_field(request, "customer_phone").unwrap_or("Not provided")
        ));
        body.push_str(&format!(
            "Email: {}\n",
            text_field(request, "customer_email").unwrap_or("Not provided")
        ));
        body.push_str(&format!(
            "Type: {}\n",
            text_field(request, "request_type").unwrap_or("contact")
        ));
        body.push_str(&format!(
            "Listing: {}\n",
            text_field(request, "listing_id").unwrap_or("General inquiry")
        ));
        if let Some(date) = text_field(request, "preferred_date") {
            body.push_str(&format!("Preferred date: {date}\n"));
        }
        if let Some(time) = text_field(request, "preferred_time") {
            body.push_str(&format!("Preferred time: {time}\n"));
        }
        if let Some(notes) = text_field(request, "notes") {
            body.push_str(&format!("Notes: {notes}\n"));
        }
        body.push_str("\nLog in to your Keyfront portal to respond to this request.\n");

        self.send(to, &subject, body).await
    }

    /// Email the customer after their request's status changed.
    ///
    /// The body is selected by the request's status, with a generic
    /// fallback for statuses that have no dedicated copy.
    pub async fn notify_status_change(&self, event: &MarketEvent, to: &str) -> DeliveryOutcome {
        let request = &event.payload;
        let request_id = text_field(request, "request_id").unwrap_or("unknown");
        let status = text_field(request, "status").unwrap_or("unknown");

        let subject = format!("Viewing Request Update - {request_id}");
        let body = format!(
            "Your viewing request status has been updated to: {status}\n\n{}\n",
            status_message(status)
        );

        self.send(to, &subject, body).await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> DeliveryOutcome {
        let Some(channel) = &self.channel else {
            return DeliveryOutcome::Skipped("mail transport not configured");
        };

        match build_and_send(channel, to, subject, body).await {
            Ok(()) => {
                tracing::info!(to, subject, "Notification email sent");
                DeliveryOutcome::Sent
            }
            Err(e) => DeliveryOutcome::Failed(e.to_string()),
        }
    }
}

async fn build_and_send(
    channel: &SmtpChannel,
    to: &str,
    subject: &str,
    body: String,
) -> Result<(), EmailError> {
    let email = Message::builder()
        .from(channel.config.from_address.parse()?)
        .to(to.parse()?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| EmailError::Build(e.to_string()))?;

    channel.transport.send(email).await?;
    Ok(())
}

/// Read a non-null string field out of an event payload.
fn text_field<'a>(payload: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(|v| v.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{MarketEvent, REQUEST_CREATED, REQUEST_UPDATED};

    fn request_event(event_type: &str) -> MarketEvent {
        MarketEvent::new(event_type, "A1")
            .with_realtor("R100")
            .with_payload(serde_json::json!({
                "request_id": "REQ-test",
                "customer_name": "Jane Doe",
                "customer_phone": "8765551234",
                "request_type": "walk_in",
                "status": "booked",
            }))
    }

    #[tokio::test]
    async fn disabled_mailer_skips_new_request_notification() {
        let mailer = Mailer::disabled();
        let outcome = mailer
            .notify_new_request(&request_event(REQUEST_CREATED), "agent@example.com")
            .await;
        assert_eq!(
            outcome,
            DeliveryOutcome::Skipped("mail transport not configured")
        );
    }

    #[tokio::test]
    async fn disabled_mailer_skips_status_notification() {
        let mailer = Mailer::disabled();
        let outcome = mailer
            .notify_status_change(&request_event(REQUEST_UPDATED), "customer@example.com")
            .await;
        assert!(!outcome.is_sent());
        assert!(matches!(outcome, DeliveryOutcome::Skipped(_)));
    }

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn mailer_without_config_is_disabled() {
        assert!(!Mailer::new(None).is_enabled());
    }

    #[test]
    fn status_messages_cover_known_statuses_with_fallback() {
        assert!(status_message("contacted").contains("contact you"));
        assert!(status_message("booked").contains("booked"));
        assert!(status_message("closed").contains("Thank you"));
        assert_eq!(status_message("new"), "Your request is being processed.");
        assert_eq!(
            status_message("no_show"),
            "Your request is being processed."
        );
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
