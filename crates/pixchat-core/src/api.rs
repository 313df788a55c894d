use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::future::Future;

use crate::error::{ChatError, Result};
use crate::request::AskRequest;
use crate::state::{Identity, ImageRef, Message};

/// Address used when neither the config file nor the environment names one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Success body of `POST /chat-bot/ask`.
///
/// Newer servers send `text`, older ones `response`. Everything except the
/// reply text is optional and defaulted when turned into a [`Message`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ImageRef>>,
    #[serde(default)]
    pub has_images: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub response_time_ms: Option<u64>,
}

fn deserialize_millis<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    // Zero, negative and non-finite timings are treated as not reported
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|ms| ms.is_finite())
        .map(f64::round)
        .filter(|ms| *ms >= 1.0)
        .map(|ms| ms as u64))
}

impl AskResponse {
    /// Turn the body into an assistant message, failing only when no reply text exists
    pub fn into_message(self) -> Result<Message> {
        let content = match (self.text, self.response) {
            (Some(text), _) if !text.is_empty() => text,
            (_, Some(response)) => response,
            (Some(text), None) => text,
            (None, None) => {
                return Err(ChatError::Malformed(
                    "response has neither `text` nor `response`".to_string(),
                ))
            }
        };

        let images = self
            .images
            .unwrap_or_default()
            .into_iter()
            .filter(|image| !image.url.is_empty())
            .collect();

        Ok(Message::assistant(
            content,
            images,
            self.has_images.unwrap_or(false),
            self.response_time_ms,
        ))
    }
}

/// Something that can answer an [`AskRequest`]
pub trait Assistant {
    fn ask(&self, request: &AskRequest) -> impl Future<Output = Result<AskResponse>> + Send;
}

/// HTTP client for the assistant and user directory endpoints
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
}

impl AssistantClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse> {
        let url = format!("{}/chat-bot/ask", self.base_url);
        tracing::debug!(
            history = request.chat_history.len(),
            user_id = ?request.user_id,
            "sending question"
        );

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, "assistant request failed");
            return Err(ChatError::Service {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let ask_response: AskResponse = serde_json::from_slice(&body)?;
        tracing::debug!(
            images = ask_response.images.as_ref().map_or(0, Vec::len),
            response_time_ms = ?ask_response.response_time_ms,
            "assistant replied"
        );
        Ok(ask_response)
    }

    pub async fn list_users(&self) -> Result<Vec<Identity>> {
        let url = format!("{}/users/", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ChatError::Service {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        let users: Vec<Identity> = serde_json::from_slice(&body)?;
        Ok(users)
    }
}

impl Assistant for AssistantClient {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse> {
        AssistantClient::ask(self, request).await
    }
}
