use std::fmt;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{ChatModel, ChatPrompt, ImageModel};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Structure for the OpenAI Chat API request
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Structure for the OpenAI Chat API response
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// Connection and model settings for [`OpenAiClient`].
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    /// `None` lets the API pick its default image model.
    pub image_model: Option<String>,
    pub image_size: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: None,
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
        }
    }
}

impl OpenAiConfig {
    /// An empty key is not fatal: requests go out unauthenticated and the API rejects them.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &if self.has_api_key() { "<redacted>" } else { "<unset>" })
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("image_model", &self.image_model)
            .field("image_size", &self.image_size)
            .finish()
    }
}

/// Client for the chat-completions and image-generations endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            // The error body carries the API's own explanation (bad key, policy rejection, ...)
            let text = response.text().await.unwrap_or_default();
            bail!("{url} returned {status}: {}", text.trim());
        }

        response
            .json::<R>()
            .await
            .with_context(|| format!("malformed response from {url}"))
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: [
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let response: ChatResponse = self.post_json("chat/completions", &request).await?;

        // An empty completion is handed back as-is; callers decide what an empty reply means.
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl ImageModel for OpenAiClient {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let request = ImageGenerationRequest {
            model: self.config.image_model.as_deref(),
            prompt,
            n: 1,
            size: &self.config.image_size,
        };

        let response: ImageGenerationResponse =
            self.post_json("images/generations", &request).await?;

        response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| anyhow!("image generation returned no URL"))
    }
}
