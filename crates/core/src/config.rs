use crate::error::QaError;
use crate::models::{ChainOptions, EmbeddingsOptions, LanguageModelOptions, VectorStoreOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDINGS_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TOP_K: usize = 4;

/// Connection settings for the OpenAI-compatible embeddings and chat endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub embeddings_model: String,
    pub chat_model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            embeddings_model: DEFAULT_EMBEDDINGS_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.7,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: env_value("OPENAI_API_BASE").unwrap_or(defaults.api_base),
            api_key: env_value("OPENAI_API_KEY"),
            embeddings_model: env_value("DOCQA_EMBEDDINGS_MODEL")
                .unwrap_or(defaults.embeddings_model),
            chat_model: env_value("DOCQA_CHAT_MODEL").unwrap_or(defaults.chat_model),
            ..defaults
        }
    }

    /// `api_base` with exactly one trailing slash, so relative joins keep the
    /// version segment.
    pub fn endpoint(&self, relative: &str) -> Result<url::Url, QaError> {
        let trimmed = self.api_base.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(QaError::Config("api base url is empty".to_string()));
        }
        let base = url::Url::parse(&format!("{trimmed}/"))?;
        Ok(base.join(relative)?)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let value = value.trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaOptions {
    pub embeddings: EmbeddingsOptions,
    pub chain: ChainOptions,
    pub vector_store: VectorStoreOptions,
    pub language_model: LanguageModelOptions,
    pub top_k: usize,
    pub index_path: Option<PathBuf>,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self {
            embeddings: EmbeddingsOptions::Default,
            chain: ChainOptions::Default,
            vector_store: VectorStoreOptions::Default,
            language_model: LanguageModelOptions::Default,
            top_k: DEFAULT_TOP_K,
            index_path: None,
        }
    }
}
