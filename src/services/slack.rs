use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::models::Member;
use crate::services::messenger::{Messenger, MessengerError};

/// Page size requested from paginated Slack endpoints
const PAGE_LIMIT: u32 = 200;

/// Built-in Slack user that shows up in every channel
const SLACKBOT_ID: &str = "USLACKBOT";

/// Slack connection details
#[derive(Debug, Clone)]
pub struct SlackOptions {
    pub api_base: String,
    pub token: String,
    /// URL messages are posted to (incoming webhook or `chat.postMessage`)
    pub hook: String,
    pub channel: String,
    pub username: String,
    pub icon_emoji: String,
    /// Members whose status emoji is listed here are never matched
    pub skip_status_emojis: Vec<String>,
}

/// Slack Web API client
///
/// Handles all communication with Slack:
/// - Listing channel members
/// - Filtering out deactivated, bot and opted-out accounts
/// - Posting announcements
pub struct SlackClient {
    options: SlackOptions,
    client: Client,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

/// Both `conversations.members` and `users.list` page through `members`
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    members: Vec<T>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SlackUser {
    id: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    profile: SlackProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SlackProfile {
    #[serde(default)]
    status_emoji: String,
}

impl SlackClient {
    /// Create a new Slack client
    pub fn new(options: SlackOptions) -> Result<Self, MessengerError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self { options, client })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.options.api_base.trim_end_matches('/'), method)
    }

    /// Collect every page of a cursor-paginated `members` listing
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, MessengerError> {
        let mut items = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut url = format!("{}?limit={}", self.endpoint(method), PAGE_LIMIT);
            for (key, value) in params {
                url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
            }
            if !cursor.is_empty() {
                url.push_str(&format!("&cursor={}", urlencoding::encode(&cursor)));
            }

            tracing::debug!("Fetching {}", url);

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.options.token)
                .send()
                .await?;
            let json = read_checked(response).await?;

            let page: Page<T> = serde_json::from_value(json).map_err(|e| {
                MessengerError::InvalidResponse(format!("Failed to parse {} page: {}", method, e))
            })?;
            items.extend(page.members);

            cursor = page.response_metadata.next_cursor;
            if cursor.is_empty() {
                return Ok(items);
            }
        }
    }

    fn is_eligible(&self, user: &SlackUser) -> bool {
        if user.deleted || user.is_bot || user.id == SLACKBOT_ID {
            return false;
        }
        !self
            .options
            .skip_status_emojis
            .iter()
            .any(|emoji| emoji == &user.profile.status_emoji)
    }
}

#[async_trait]
impl Messenger for SlackClient {
    async fn fetch_active_members(&self) -> Result<Vec<Member>, MessengerError> {
        let channel_members: Vec<String> = self
            .get_all_pages("conversations.members", &[("channel", self.options.channel.as_str())])
            .await?;
        let users: Vec<SlackUser> = self.get_all_pages("users.list", &[]).await?;

        let directory: HashMap<&str, &SlackUser> =
            users.iter().map(|user| (user.id.as_str(), user)).collect();

        let members: Vec<Member> = channel_members
            .into_iter()
            .filter(|id| match directory.get(id.as_str()) {
                Some(user) => {
                    let eligible = self.is_eligible(user);
                    if !eligible {
                        tracing::debug!("{} skipped (deactivated, bot or opted out)", id);
                    }
                    eligible
                }
                // Unknown to users.list: keep, nothing says they should be skipped
                None => id != SLACKBOT_ID,
            })
            .collect();

        tracing::info!(
            "Fetched {} active members from channel {}",
            members.len(),
            self.options.channel
        );
        Ok(members)
    }

    async fn send(&self, text: &str) -> Result<(), MessengerError> {
        let payload = json!({
            "username": self.options.username,
            "icon_emoji": self.options.icon_emoji,
            "channel": self.options.channel,
            "text": text,
        });

        let response = self
            .client
            .post(&self.options.hook)
            .bearer_auth(&self.options.token)
            .json(&payload)
            .send()
            .await?;
        read_checked(response).await?;

        tracing::debug!("Sent message: {}", text);
        Ok(())
    }
}

/// Read a response body and apply [`check_response`]
async fn read_checked(response: Response) -> Result<Value, MessengerError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;

    check_response(status, content_type.as_deref(), &body)
}

/// Validate a Slack response
///
/// Webhooks answer `ok` as plain text, the Web API answers JSON with an
/// `ok` flag. A successful webhook reply yields an empty JSON object.
pub fn check_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
) -> Result<Value, MessengerError> {
    if status == StatusCode::BAD_REQUEST {
        return Err(MessengerError::BadRequest(body.to_string()));
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(MessengerError::Unauthorized(body.to_string()));
    }
    if !status.is_success() {
        return Err(MessengerError::Http {
            status,
            body: body.to_string(),
        });
    }

    let is_json = content_type.is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json {
        return if body.trim() == "ok" {
            Ok(Value::Object(Map::new()))
        } else {
            Err(MessengerError::ApiError(body.to_string()))
        };
    }

    let json: Value = serde_json::from_str(body)
        .map_err(|e| MessengerError::InvalidResponse(format!("Bad JSON body: {}", e)))?;

    match json.get("ok").and_then(Value::as_bool) {
        Some(true) => Ok(json),
        _ => Err(MessengerError::ApiError(json.to_string())),
    }
}
