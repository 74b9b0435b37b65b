use crate::models::{MatchNotification, NotificationTarget};
use thiserror::Error;

/// Errors that can occur when handing off a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification transport unavailable: {0}")]
    Transport(String),

    #[error("Invalid notification target: {0}")]
    InvalidTarget(String),
}

/// Outbound hook for "new matches" notifications
pub trait MatchNotifier: Send + Sync {
    fn notify(&self, notification: &MatchNotification) -> Result<(), NotifyError>;
}

/// Notifier that records the payload in the log instead of delivering it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl MatchNotifier for LogNotifier {
    fn notify(&self, notification: &MatchNotification) -> Result<(), NotifyError> {
        let (kind, address) = match &notification.target {
            NotificationTarget::Token(token) => ("token", token.as_str()),
            NotificationTarget::Topic(topic) => ("topic", topic.as_str()),
        };

        if address.is_empty() {
            return Err(NotifyError::InvalidTarget(format!("empty {}", kind)));
        }

        tracing::info!(
            user_id = %notification.user_id,
            target = kind,
            "{}: {}",
            notification.title,
            notification.body
        );

        Ok(())
    }
}
