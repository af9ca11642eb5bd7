//! Clients for OpenAI-compatible text and image generation APIs.
//!
//! The server talks to remote models only through [`ChatModel`] and
//! [`ImageModel`], so tests and alternative providers can stand in for
//! [`OpenAiClient`].

use anyhow::Result;
use async_trait::async_trait;

mod openai;

pub use openai::{OpenAiClient, OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_SIZE};

/// A single-turn conversation: one system instruction and one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Text-generation backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Request one completion and return its text.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String>;
}

/// Image-generation backend.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Generate exactly one image for `prompt` and return a URL it can be fetched from.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}
