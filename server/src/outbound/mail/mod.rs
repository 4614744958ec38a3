//! Mailer adapters for the fixed-notification collaborator.
//!
//! `SmtpMailer` delivers over SMTP; `ConsoleMailer` logs the notification
//! and is the default when no SMTP transport is configured.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::domain::ports::{FixedNotification, Mailer, MailerError};

const SUBJECT: &str = "[snagtrack] Your issue has been fixed";

fn notification_body(notification: &FixedNotification) -> String {
    format!(
        "You asked to be emailed when an issue on snagtrack was fixed:\n\
         \n\
         Issue name: {}\n\
         Description: {}\n\
         \n\
         -------\n\
         \n\
         {}\n\
         \n\
         -------\n\
         \n\
         Thanks for using snagtrack. A very simple issue tracker.\n",
        notification.issue_name,
        notification.description,
        notification.fixed_description.as_deref().unwrap_or(""),
    )
}

/// SMTP-backed implementation of the mailer port.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from an SMTP URL and a sender mailbox.
    pub fn from_url(smtp_url: &str, from: &str) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(smtp_url)
            .map_err(|err| MailerError::transport(err.to_string()))?
            .build();
        let from = from
            .parse::<Mailbox>()
            .map_err(|err| MailerError::invalid_address(err.to_string()))?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_fixed_notification(
        &self,
        notification: &FixedNotification,
    ) -> Result<(), MailerError> {
        let to = notification
            .to
            .parse::<Mailbox>()
            .map_err(|err| MailerError::invalid_address(err.to_string()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(notification_body(notification))
            .map_err(|err| MailerError::transport(err.to_string()))?;
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|err| MailerError::transport(err.to_string()))
    }
}

/// Development mailer that records the notification in the log stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a new console mailer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send_fixed_notification(
        &self,
        notification: &FixedNotification,
    ) -> Result<(), MailerError> {
        info!(
            to = %notification.to,
            issue = %notification.issue_name,
            "fixed notification (console delivery)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(fixed_description: Option<&str>) -> FixedNotification {
        FixedNotification {
            to: "dev@example.org".to_owned(),
            issue_name: "Crash".to_owned(),
            description: "it crashes".to_owned(),
            fixed_description: fixed_description.map(str::to_owned),
        }
    }

    #[test]
    fn body_includes_issue_fields() {
        let body = notification_body(&notification(Some("patched in abc123")));
        assert!(body.contains("Issue name: Crash"));
        assert!(body.contains("Description: it crashes"));
        assert!(body.contains("patched in abc123"));
    }

    #[tokio::test]
    async fn console_mailer_always_succeeds() {
        let mailer = ConsoleMailer::new();
        mailer
            .send_fixed_notification(&notification(None))
            .await
            .expect("console delivery succeeds");
    }
}
