//! OpenAI Assistants Provider - Implementation of AssistantProvider for the
//! OpenAI Assistants API (v2).
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIAssistantsConfig::new(api_key)
//!     .with_base_url("https://api.openai.com/v1")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = OpenAIAssistantsProvider::new(config)?;
//! ```
//!
//! # Retries
//!
//! None. Every call is sent once; the poller's status-check loop is the only
//! place a remote call repeats.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::domain::assistant::{JobHandle, MessageContent, MessageRole, RunStatus, ThreadMessage};
use crate::domain::foundation::{AssistantId, RunId, ThreadId};
use crate::ports::{Assistant, AssistantProvider, AssistantSpec, ProviderError, Run, Thread};

/// Beta header required by the Assistants API.
const ASSISTANTS_BETA: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Page size for message listing; only the newest assistant message is read.
const MESSAGE_PAGE_SIZE: &str = "20";

/// Configuration for the OpenAI Assistants provider.
#[derive(Debug)]
pub struct OpenAIAssistantsConfig {
    /// API key for authentication.
    api_key: SecretString,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAIAssistantsConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI Assistants API provider implementation.
pub struct OpenAIAssistantsProvider {
    config: OpenAIAssistantsConfig,
    base_url: Url,
    client: Client,
}

impl OpenAIAssistantsProvider {
    /// Creates a provider with the given configuration.
    ///
    /// # Errors
    ///
    /// `ProviderError::InvalidRequest` for an unusable base URL, or
    /// `ProviderError::Network` if the HTTP client cannot be built.
    pub fn new(config: OpenAIAssistantsConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::InvalidRequest(format!("base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidRequest(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Builds an endpoint URL; every segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header(ASSISTANTS_BETA.0, ASSISTANTS_BETA.1)
    }

    /// Sends a request and maps transport failures.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ProviderError> {
        self.authorized(builder).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    timeout_secs: self.config.timeout.as_secs() as u32,
                }
            } else if e.is_connect() {
                ProviderError::network(format!("Connection failed: {}", e))
            } else {
                ProviderError::network(e.to_string())
            }
        })
    }

    /// POSTs a JSON body once and decodes the response.
    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(url).json(body)).await?;
        Self::decode(response).await
    }

    /// GETs a JSON resource once.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let response = self.send(self.client.get(url)).await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let response = Self::handle_response_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("Failed to parse response: {}", e)))
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let retry_after_header = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(ProviderError::AuthenticationFailed),
            404 => Err(ProviderError::NotFound(Self::error_message(&error_body))),
            429 => {
                let retry_after =
                    retry_after_header.unwrap_or_else(|| Self::parse_retry_after(&error_body));
                Err(ProviderError::rate_limited(retry_after))
            }
            400 | 422 => Err(ProviderError::InvalidRequest(Self::error_message(
                &error_body,
            ))),
            500..=599 => Err(ProviderError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(ProviderError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Extracts `error.message` from an API error body.
    fn error_message(error_body: &str) -> String {
        serde_json::from_str::<ApiErrorBody>(error_body)
            .map(|body| body.error.message)
            .unwrap_or_else(|_| error_body.to_string())
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        let message = Self::error_message(error_body);
        if let Some(idx) = message.find("try again in ") {
            let rest = &message[idx + 13..];
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            if let Ok(secs) = digits.parse::<u32>() {
                return secs;
            }
        }
        30 // Default retry after
    }

    fn parse_id<T, E: std::fmt::Display>(
        id: String,
        make: impl FnOnce(String) -> Result<T, E>,
    ) -> Result<T, ProviderError> {
        make(id).map_err(|e| ProviderError::parse(e.to_string()))
    }
}

#[async_trait]
impl AssistantProvider for OpenAIAssistantsProvider {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant, ProviderError> {
        let body = CreateAssistantBody {
            name: &spec.name,
            model: &spec.model,
            instructions: &spec.instructions,
            tools: spec.tools.iter().map(|kind| ToolBody { kind }).collect(),
        };
        let object: AssistantObject = self.post_json(self.endpoint(&["assistants"]), &body).await?;
        object.into_domain()
    }

    async fn create_thread(&self) -> Result<Thread, ProviderError> {
        let object: ThreadObject = self
            .post_json(self.endpoint(&["threads"]), &serde_json::json!({}))
            .await?;
        Ok(Thread {
            id: Self::parse_id(object.id, ThreadId::new)?,
            created_at: object.created_at,
        })
    }

    async fn submit_message(&self, thread_id: &ThreadId, text: &str) -> Result<(), ProviderError> {
        let body = CreateMessageBody {
            role: "user",
            content: text,
        };
        let _: MessageObject = self
            .post_json(
                self.endpoint(&["threads", thread_id.as_str(), "messages"]),
                &body,
            )
            .await?;
        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
        instructions: Option<&str>,
    ) -> Result<Run, ProviderError> {
        let body = CreateRunBody {
            assistant_id: assistant_id.as_str(),
            instructions,
        };
        let object: RunObject = self
            .post_json(self.endpoint(&["threads", thread_id.as_str(), "runs"]), &body)
            .await?;

        Ok(Run {
            id: Self::parse_id(object.id, RunId::new)?,
            thread_id: Self::parse_id(object.thread_id, ThreadId::new)?,
            assistant_id: Self::parse_id(object.assistant_id, AssistantId::new)?,
            status: object.status,
        })
    }

    async fn get_run_status(&self, handle: &JobHandle) -> Result<RunStatus, ProviderError> {
        let url = self.endpoint(&[
            "threads",
            handle.thread_id.as_str(),
            "runs",
            handle.run_id.as_str(),
        ]);
        let object: RunStatusObject = self.get_json(url).await?;
        Ok(object.status)
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, ProviderError> {
        let mut url = self.endpoint(&["threads", thread_id.as_str(), "messages"]);
        url.query_pairs_mut()
            .append_pair("order", "desc")
            .append_pair("limit", MESSAGE_PAGE_SIZE);

        let list: MessageList = self.get_json(url).await?;
        Ok(list.data.into_iter().map(MessageObject::into_domain).collect())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct CreateAssistantBody<'a> {
    name: &'a str,
    model: &'a str,
    instructions: &'a str,
    tools: Vec<ToolBody<'a>>,
}

#[derive(Debug, Serialize)]
struct ToolBody<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateMessageBody<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunBody<'a> {
    assistant_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AssistantObject {
    id: String,
    name: Option<String>,
    model: String,
    instructions: Option<String>,
    #[serde(default)]
    tools: Vec<ToolObject>,
    #[serde(default)]
    created_at: i64,
}

impl AssistantObject {
    fn into_domain(self) -> Result<Assistant, ProviderError> {
        Ok(Assistant {
            id: OpenAIAssistantsProvider::parse_id(self.id, AssistantId::new)?,
            name: self.name,
            model: self.model,
            instructions: self.instructions,
            tools: self.tools.into_iter().map(|t| t.kind).collect(),
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ToolObject {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
    #[serde(default)]
    created_at: i64,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    thread_id: String,
    assistant_id: String,
    status: RunStatus,
}

#[derive(Debug, Deserialize)]
struct RunStatusObject {
    status: RunStatus,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    id: String,
    role: MessageRole,
    #[serde(default)]
    content: Vec<ContentPart>,
    #[serde(default)]
    created_at: i64,
}

impl MessageObject {
    fn into_domain(self) -> ThreadMessage {
        let content = self
            .content
            .into_iter()
            .map(|part| match part {
                ContentPart::Text { text } => MessageContent::Text { value: text.value },
                ContentPart::ImageFile { image_file } => MessageContent::ImageFile {
                    file_id: image_file.file_id,
                },
                ContentPart::Other => MessageContent::Unsupported,
            })
            .collect();

        ThreadMessage {
            id: self.id,
            role: self.role,
            content,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: TextPart },
    ImageFile { image_file: ImageFilePart },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ImageFilePart {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
