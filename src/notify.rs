use async_trait::async_trait;
use serde::Serialize;
use ulid::Ulid;

use crate::config::NotifierConfig;

#[derive(Debug)]
pub enum NotifyError {
    Transport(String),
    Rejected(u16),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyError::Transport(e) => write!(f, "notification transport error: {e}"),
            NotifyError::Rejected(status) => {
                write!(f, "notification service returned {status}")
            }
        }
    }
}

impl std::error::Error for NotifyError {}

/// Fire-and-forget message delivery to a user. Delivery failure is never a
/// correctness event for callers; they log it and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, uid: Ulid, message: &str) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct NotifyBody<'a> {
    message: &'a str,
    uid: Ulid,
}

/// Posts to the notification service's inbox endpoint.
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
    timeout: std::time::Duration,
}

impl HttpNotifier {
    pub fn new(config: &NotifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, uid: Ulid, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(format!("{}/api/notifications", self.base_url))
            .timeout(self.timeout)
            .json(&NotifyBody { message, uid })
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Drops every notification. For embedders with no delivery service wired.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _uid: Ulid, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
