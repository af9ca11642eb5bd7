use std::sync::Arc;

use llm_core::{ChatModel, ImageModel, OpenAiClient};

use crate::config::ServerConfig;
use crate::metrics::AppMetrics;

/// Shared handler state. The model clients are stateless and shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<dyn ChatModel>,
    pub images: Arc<dyn ImageModel>,
    pub metrics: AppMetrics,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(chat: Arc<dyn ChatModel>, images: Arc<dyn ImageModel>, config: ServerConfig) -> Self {
        Self {
            chat,
            images,
            metrics: AppMetrics::new(),
            config,
        }
    }

    /// One OpenAI client serves both the chat and image stages.
    pub fn with_openai(config: ServerConfig) -> Self {
        let client = Arc::new(OpenAiClient::new(config.openai.clone()));
        Self::new(client.clone(), client, config)
    }
}
