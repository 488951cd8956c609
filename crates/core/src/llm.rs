use crate::config::{ProviderConfig, DEFAULT_CHAT_MODEL};
use crate::error::QaError;
use crate::http::{build_client, post_json};
use crate::models::LanguageModelOptions;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, QaError>;
}

pub fn language_model_for(
    option: LanguageModelOptions,
    config: &ProviderConfig,
) -> Result<ChatCompletionsModel, QaError> {
    let mut config = config.clone();
    match option {
        LanguageModelOptions::Gpt35Turbo => config.chat_model = DEFAULT_CHAT_MODEL.to_string(),
        LanguageModelOptions::Default => {}
    }
    ChatCompletionsModel::new(config)
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsModel {
    config: ProviderConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsModel {
    pub fn new(config: ProviderConfig) -> Result<Self, QaError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.chat_model
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    async fn complete(&self, prompt: &str) -> Result<String, QaError> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let response: ChatResponse =
            post_json(&self.client, &self.config, "chat/completions", &request).await?;
        first_choice_text(response)
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, QaError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| QaError::provider("chat/completions", "response contained no answer"))
}
