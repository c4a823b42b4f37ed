use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;
use thiserror::Error;

use crate::models::{Couple, Member};
use crate::services::templates::render_match;

/// Errors that can occur when talking to the messaging service
#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("API response: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Everything the matching run needs from a chat service
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Members of the configured channel who may be matched
    ///
    /// Deactivated accounts, bots and members flagged with a skip status
    /// are left out.
    async fn fetch_active_members(&self) -> Result<Vec<Member>, MessengerError>;

    /// Post a message to the configured channel
    async fn send(&self, text: &str) -> Result<(), MessengerError>;

    /// Announce a pair using `template`
    async fn announce_match(&self, couple: &Couple, template: &str) -> Result<(), MessengerError> {
        self.send(&render_match(template, couple)).await
    }

    /// Tell a member nobody was left to pair them with
    async fn announce_alone(&self, member: &str) -> Result<(), MessengerError> {
        self.send(&format!("sorry <@{}> you're alone. Next time :-)", member))
            .await
    }
}

/// Messenger double that keeps everything in memory
///
/// Returns a fixed roster and records every message sent.
#[derive(Debug, Default)]
pub struct InMemoryMessenger {
    members: Vec<Member>,
    sent: Mutex<Vec<String>>,
    fail_fetch: bool,
    fail_send_after: Option<usize>,
}

impl InMemoryMessenger {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    /// Make every roster fetch fail
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Accept `count` messages, then fail every following send
    pub fn failing_send_after(mut self, count: usize) -> Self {
        self.fail_send_after = Some(count);
        self
    }

    /// Messages sent so far, oldest first
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Messenger for InMemoryMessenger {
    async fn fetch_active_members(&self) -> Result<Vec<Member>, MessengerError> {
        if self.fail_fetch {
            return Err(MessengerError::Http {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "roster unavailable".to_string(),
            });
        }
        Ok(self.members.clone())
    }

    async fn send(&self, text: &str) -> Result<(), MessengerError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| MessengerError::ApiError("message log poisoned".to_string()))?;

        if self.fail_send_after.is_some_and(|limit| sent.len() >= limit) {
            return Err(MessengerError::ApiError("send rejected".to_string()));
        }
        sent.push(text.to_string());
        Ok(())
    }
}
