use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info};

use newsroom_core::config::MailSettings;
use newsroom_core::{NewsroomError, Result};

use super::message::EmailMessage;

/// Mail delivery backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Production backend: SMTP relay via lettre, STARTTLS with optional
/// credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
            .map_err(|e| {
                NewsroomError::Mail(format!("invalid SMTP relay '{}': {e}", settings.smtp_host))
            })?
            .port(settings.smtp_port);

        if let (Some(username), Some(password)) =
            (&settings.smtp_username, &settings.smtp_password)
        {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = message.to_lettre()?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NewsroomError::Mail(format!("SMTP send failed: {e}")))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Development backend: writes the message to the log instead of the wire.
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            subject = %message.subject,
            to = ?message.to,
            "Console mail backend: message not delivered"
        );
        debug!(body = %message.body, "Console mail body");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Test backend: an in-process outbox, so tests can assert on what would
/// have been sent.
#[derive(Default, Clone)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox.lock().expect("outbox lock poisoned").clone()
    }

    pub fn sent_count(&self) -> usize {
        self.outbox.lock().expect("outbox lock poisoned").len()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.outbox
            .lock()
            .expect("outbox lock poisoned")
            .push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Pick the backend named in settings.
pub fn mailer_from_settings(settings: &MailSettings) -> Result<Arc<dyn Mailer>> {
    match settings.backend.as_str() {
        "smtp" => Ok(Arc::new(SmtpMailer::new(settings)?)),
        "console" => Ok(Arc::new(ConsoleMailer)),
        "memory" => Ok(Arc::new(MemoryMailer::new())),
        other => Err(NewsroomError::Validation(format!(
            "unknown mail backend '{other}'"
        ))),
    }
}
