use crate::config::DEFAULT_TOP_K;
use crate::embeddings::EmbeddingsProvider;
use crate::error::QaError;
use crate::models::{ContentUnit, InputFile, InputFileKind, RetrievedUnit};
use crate::traits::{Retriever, VectorStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedUnit {
    pub id: String,
    pub unit: ContentUnit,
    pub embedding: Vec<f32>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    entries: Vec<IndexedUnit>,
}

/// In-process embedding index with optional JSON persistence.
///
/// Entries live behind an `Arc` that is replaced on every insert, so each
/// retriever keeps the snapshot it was created from.
pub struct LocalVectorStore {
    embeddings: Arc<dyn EmbeddingsProvider>,
    entries: Arc<Vec<IndexedUnit>>,
    top_k: usize,
    persist_path: Option<PathBuf>,
}

impl LocalVectorStore {
    pub fn new(embeddings: Arc<dyn EmbeddingsProvider>) -> Self {
        Self {
            embeddings,
            entries: Arc::new(Vec::new()),
            top_k: DEFAULT_TOP_K,
            persist_path: None,
        }
    }

    /// Opens the index stored at `path`, starting empty when the file is absent.
    pub fn open(path: impl Into<PathBuf>, embeddings: Arc<dyn EmbeddingsProvider>) -> Result<Self, QaError> {
        let path = path.into();
        let entries = if path.exists() {
            let bytes = fs::read(&path)?;
            let persisted: PersistedIndex = serde_json::from_slice(&bytes)?;
            if persisted.version != INDEX_FORMAT_VERSION {
                return Err(QaError::Config(format!(
                    "index {} has format version {}, expected {}",
                    path.display(),
                    persisted.version,
                    INDEX_FORMAT_VERSION
                )));
            }
            persisted.entries
        } else {
            Vec::new()
        };

        info!(path = %path.display(), units = entries.len(), "opened local index");
        Ok(Self {
            embeddings,
            entries: Arc::new(entries),
            top_k: DEFAULT_TOP_K,
            persist_path: Some(path),
        })
    }

    /// Sets how many units each retriever returns. Zero is rejected.
    pub fn with_top_k(mut self, top_k: usize) -> Result<Self, QaError> {
        if top_k == 0 {
            return Err(QaError::Config("top_k must be at least 1".to_string()));
        }
        self.top_k = top_k;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexedUnit] {
        &self.entries
    }

    async fn persist(path: &Path, entries: &[IndexedUnit]) -> Result<(), QaError> {
        #[derive(Serialize)]
        struct PersistedRef<'a> {
            version: u32,
            entries: &'a [IndexedUnit],
        }

        let bytes = serde_json::to_vec(&PersistedRef {
            version: INDEX_FORMAT_VERSION,
            entries,
        })?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, path).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn add_document(&mut self, input_file: &InputFile) -> Result<(), QaError> {
        match input_file.kind() {
            InputFileKind::Text | InputFileKind::Pdf => {}
            InputFileKind::Unknown => {
                error!(path = %input_file.path(), "unexpected input file type");
                return Err(QaError::UnsupportedType(input_file.path().to_string()));
            }
        }

        let units = input_file.content_units();
        let texts = units.iter().map(|unit| unit.text.clone()).collect::<Vec<_>>();
        let vectors = self.embeddings.embed_documents(&texts).await?;

        if vectors.len() != units.len() {
            return Err(QaError::provider(
                "embeddings",
                format!(
                    "embedding count {} doesn't match unit count {}",
                    vectors.len(),
                    units.len()
                ),
            ));
        }

        let added_at = Utc::now();
        let mut next = Vec::with_capacity(self.entries.len() + units.len());
        next.extend(self.entries.iter().cloned());
        next.extend(units.into_iter().zip(vectors).map(|(unit, embedding)| IndexedUnit {
            id: unit_id(&unit),
            unit,
            embedding,
            added_at,
        }));

        if let Some(path) = &self.persist_path {
            Self::persist(path, &next).await?;
        }

        self.entries = Arc::new(next);
        info!(
            name = %input_file.name(),
            units = input_file.pages().len(),
            total = self.entries.len(),
            "added document to local index"
        );
        Ok(())
    }

    fn as_retriever(&self) -> Result<Arc<dyn Retriever>, QaError> {
        Ok(Arc::new(LocalRetriever {
            entries: Arc::clone(&self.entries),
            embeddings: Arc::clone(&self.embeddings),
            top_k: self.top_k,
        }))
    }
}

pub struct LocalRetriever {
    entries: Arc<Vec<IndexedUnit>>,
    embeddings: Arc<dyn EmbeddingsProvider>,
    top_k: usize,
}

#[async_trait]
impl Retriever for LocalRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedUnit>, QaError> {
        let query_vector = self.embeddings.embed_text(query).await?;

        let mut scored = Vec::with_capacity(self.entries.len());
        for entry in self.entries.iter() {
            if entry.embedding.len() != query_vector.len() {
                return Err(QaError::Config(format!(
                    "query vector dim {} is not {}",
                    query_vector.len(),
                    entry.embedding.len()
                )));
            }
            scored.push((cosine_similarity(&query_vector, &entry.embedding), entry));
        }

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|left, right| right.0.total_cmp(&left.0));

        Ok(scored
            .into_iter()
            .take(self.top_k)
            .map(|(score, entry)| RetrievedUnit {
                id: entry.id.clone(),
                score,
                unit: entry.unit.clone(),
            })
            .collect())
    }
}

fn unit_id(unit: &ContentUnit) -> String {
    let mut hasher = Sha256::new();
    hasher.update(unit.metadata.title.as_bytes());
    hasher.update(unit.metadata.page_number.to_le_bytes());
    hasher.update(unit.text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot = left.iter().zip(right).map(|(a, b)| a * b).sum::<f32>();
    let left_norm = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f32>().sqrt();

    if left_norm == 0.0 || right_norm == 0.0 {
        0.0
    } else {
        dot / (left_norm * right_norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashedTokenEmbeddings;
    use tempfile::tempdir;

    fn store() -> LocalVectorStore {
        LocalVectorStore::new(Arc::new(HashedTokenEmbeddings::default()))
    }

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|text| text.to_string()).collect()
    }

    #[tokio::test]
    async fn pages_become_numbered_units() -> Result<(), QaError> {
        let mut store = store();
        let file = InputFile::pdf("deck.pdf", "/data/deck.pdf", pages(&["p0", "p1", "p2"]));

        store.add_document(&file).await?;

        assert_eq!(store.len(), 3);
        for (index, entry) in store.entries().iter().enumerate() {
            assert_eq!(entry.unit.metadata.title, "deck.pdf");
            assert_eq!(entry.unit.metadata.page_number, index as u32 + 1);
            assert_eq!(entry.embedding.len(), 128);
        }
        Ok(())
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected_without_changes() {
        let mut store = store();
        let file = InputFile::with_kind(
            InputFileKind::Unknown,
            "blob.bin",
            "/data/blob.bin",
            pages(&["bytes"]),
        );

        let result = store.add_document(&file).await;
        assert!(matches!(result, Err(QaError::UnsupportedType(path)) if path == "/data/blob.bin"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn retrievers_keep_their_snapshot() -> Result<(), QaError> {
        let mut store = store();
        let before = store.as_retriever()?;

        store
            .add_document(&InputFile::text("a.txt", "a.txt", pages(&["Bumble revenue grew 20%."])))
            .await?;
        let after = store.as_retriever()?;

        assert!(before.retrieve("revenue").await?.is_empty());
        assert_eq!(after.retrieve("revenue").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn most_similar_unit_ranks_first() -> Result<(), QaError> {
        let mut store = store().with_top_k(2)?;
        let file = InputFile::text(
            "notes.txt",
            "notes.txt",
            pages(&[
                "Headcount stayed flat in March.",
                "Bumble revenue grew 20% year over year.",
                "Weather in Austin was sunny all week.",
            ]),
        );
        store.add_document(&file).await?;

        let hits = store.as_retriever()?.retrieve("How much did revenue grow?").await?;
        assert_eq!(hits.len(), 2);
        assert!(hits[0].unit.text.contains("Bumble revenue grew 20%"));
        assert!(hits[0].score >= hits[1].score);
        Ok(())
    }

    #[test]
    fn zero_top_k_is_rejected() {
        assert!(matches!(store().with_top_k(0), Err(QaError::Config(_))));
        assert!(store().with_top_k(1).is_ok());
    }

    #[tokio::test]
    async fn persisted_index_reopens_with_same_units() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("index").join("units.json");
        let embedder: Arc<dyn EmbeddingsProvider> = Arc::new(HashedTokenEmbeddings::default());

        let mut store = LocalVectorStore::open(&path, Arc::clone(&embedder))?;
        assert!(store.is_empty());
        store
            .add_document(&InputFile::text("a.txt", "a.txt", pages(&["one.", "two."])))
            .await?;

        let reopened = LocalVectorStore::open(&path, embedder)?;
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.entries()[0].id, store.entries()[0].id);
        assert_eq!(reopened.entries()[1].unit.metadata.page_number, 2);
        Ok(())
    }

    #[test]
    fn unit_ids_are_deterministic_and_distinct() {
        let unit = |page: u32, text: &str| ContentUnit {
            text: text.to_string(),
            metadata: crate::models::UnitMetadata {
                title: "a.txt".to_string(),
                page_number: page,
            },
        };

        assert_eq!(unit_id(&unit(1, "same")), unit_id(&unit(1, "same")));
        assert_ne!(unit_id(&unit(1, "same")), unit_id(&unit(2, "same")));
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
