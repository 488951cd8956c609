use crate::config::ProviderConfig;
use crate::error::QaError;
use crate::http::{build_client, post_json};
use crate::models::EmbeddingsOptions;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 128;

#[async_trait]
pub trait EmbeddingsProvider: Send + Sync {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, QaError>;

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QaError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_text(text).await?);
        }
        Ok(vectors)
    }
}

/// `Default` and `ChatGptCompatible` both resolve to the OpenAI-compatible
/// endpoint; `Offline` embeds locally.
pub fn embeddings_for(
    option: EmbeddingsOptions,
    config: &ProviderConfig,
) -> Result<Arc<dyn EmbeddingsProvider>, QaError> {
    match option {
        EmbeddingsOptions::ChatGptCompatible | EmbeddingsOptions::Default => {
            Ok(Arc::new(OpenAiEmbeddings::new(config.clone())?))
        }
        EmbeddingsOptions::Offline => Ok(Arc::new(HashedTokenEmbeddings::default())),
    }
}

pub struct OpenAiEmbeddings {
    config: ProviderConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    pub fn new(config: ProviderConfig) -> Result<Self, QaError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl EmbeddingsProvider for OpenAiEmbeddings {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, QaError> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| QaError::provider("embeddings", "response contained no vectors"))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QaError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.config.embeddings_model,
            input: texts,
        };
        let response: EmbeddingResponse =
            post_json(&self.client, &self.config, "embeddings", &request).await?;

        vectors_in_input_order(response, texts.len())
    }
}

fn vectors_in_input_order(
    mut response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, QaError> {
    if response.data.len() != expected {
        return Err(QaError::provider(
            "embeddings",
            format!(
                "expected {expected} vectors, received {}",
                response.data.len()
            ),
        ));
    }

    response.data.sort_by_key(|item| item.index);
    Ok(response
        .data
        .into_iter()
        .map(|item| item.embedding)
        .collect())
}

/// Offline embeddings built by feature hashing, no network calls.
///
/// Text is split into lowercase alphanumeric words; punctuation and case never
/// change the vector. Each word contributes itself plus the trigrams of
/// `<word>`, so "grew" and "grow" still share `<gr`. Features land in a
/// signed bucket picked from their SHA-256 digest.
#[derive(Debug, Clone, Copy)]
pub struct HashedTokenEmbeddings {
    dimensions: usize,
}

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

impl Default for HashedTokenEmbeddings {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSIONS)
    }
}

impl HashedTokenEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];

        for word in words(text) {
            self.add_feature(&mut vector, &word, WORD_WEIGHT);

            let marked = format!("<{word}>").chars().collect::<Vec<_>>();
            if marked.len() > 3 {
                for window in marked.windows(3) {
                    let trigram = window.iter().collect::<String>();
                    self.add_feature(&mut vector, &trigram, TRIGRAM_WEIGHT);
                }
            }
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vector.iter_mut().for_each(|value| *value /= magnitude);
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);

        let bucket = (u64::from_le_bytes(head) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingsProvider for HashedTokenEmbeddings {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, QaError> {
        Ok(self.embed(text))
    }
}
