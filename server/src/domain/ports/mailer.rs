//! Port for the fixed-notification email collaborator.
//!
//! Delivery is best-effort: a failed send is logged by the caller and never
//! rolls back the state change that triggered it.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mailer adapters.
    pub enum MailerError {
        /// The recipient address was rejected by the transport.
        InvalidAddress { message: String } => "invalid recipient address: {message}",
        /// The underlying transport failed.
        Transport { message: String } => "mail transport failed: {message}",
    }
}

/// Notification payload describing a fixed issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedNotification {
    /// Recipient address taken from the issue.
    pub to: String,
    /// Issue display name.
    pub issue_name: String,
    /// Free-text issue description.
    pub description: String,
    /// Optional summary of the fix.
    pub fixed_description: Option<String>,
}

/// Port for sending fixed-issue notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a notification that an issue was marked fixed.
    async fn send_fixed_notification(
        &self,
        notification: &FixedNotification,
    ) -> Result<(), MailerError>;
}

/// Fixture implementation for tests that do not observe notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailer;

#[async_trait]
impl Mailer for FixtureMailer {
    async fn send_fixed_notification(
        &self,
        _notification: &FixedNotification,
    ) -> Result<(), MailerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_send_succeeds() {
        let mailer = FixtureMailer;
        let notification = FixedNotification {
            to: "dev@example.org".to_owned(),
            issue_name: "Crash".to_owned(),
            description: "it crashes".to_owned(),
            fixed_description: None,
        };
        mailer
            .send_fixed_notification(&notification)
            .await
            .expect("fixture send succeeds");
    }
}
