use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::NotificationConfig;
use crate::error::Error;

use super::{Alert, Notifier};

/// Sends alerts as plain-text email over implicit TLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl SmtpNotifier {
    /// Returns `Ok(None)` when any of sender, password or recipient is unset.
    pub fn from_config(config: &NotificationConfig) -> Result<Option<SmtpNotifier>, Error> {
        let (sender, password, recipient) = match config.credentials() {
            Some(credentials) => credentials,
            None => return Ok(None),
        };

        let sender: Mailbox = sender
            .parse()
            .map_err(|err| Error::FailedToSendNotification(format!("sender: {}", err)))?;
        let recipient: Mailbox = recipient
            .parse()
            .map_err(|err| Error::FailedToSendNotification(format!("recipient: {}", err)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|err| Error::FailedToSendNotification(err.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                sender.email.to_string(),
                password.to_string(),
            ))
            .build();

        Ok(Some(SmtpNotifier {
            transport,
            sender,
            recipient,
        }))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[tracing::instrument(skip(self))]
    async fn send(&self, alert: &Alert) -> Result<(), Error> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(alert.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body.clone())
            .map_err(|err| Error::FailedToSendNotification(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| Error::FailedToSendNotification(err.to_string()))?;

        info!("alert email sent to {}", self.recipient);

        Ok(())
    }
}
