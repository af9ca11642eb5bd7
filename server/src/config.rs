// Configuration for the server, read from the environment

use std::{str::FromStr, time::Duration};

use llm_core::{OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_SIZE};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub rate_limit_per_minute: u32,
    /// Upper bound on each individual call to a remote model.
    pub llm_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub openai: OpenAiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            rate_limit_per_minute: 60,
            llm_timeout_secs: 120,
            request_timeout_secs: 600,
            cors_allowed_origins: None,
            openai: OpenAiConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let openai = OpenAiConfig {
            api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            base_url: non_empty("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            chat_model: non_empty("LLM_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            image_model: non_empty("IMAGE_MODEL"),
            image_size: non_empty("IMAGE_SIZE").unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
        };

        Self {
            port: parse_or(lookup("PORT"), defaults.port),
            rate_limit_per_minute: parse_or(lookup("RATE_LIMIT_PER_MINUTE"), defaults.rate_limit_per_minute),
            llm_timeout_secs: parse_or(lookup("LLM_TIMEOUT_SECS"), defaults.llm_timeout_secs),
            request_timeout_secs: parse_or(lookup("REQUEST_TIMEOUT_SECS"), defaults.request_timeout_secs),
            cors_allowed_origins,
            openai,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
