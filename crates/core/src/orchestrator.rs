use crate::chain::{chain_for, RetrievalQaChain};
use crate::config::{ProviderConfig, QaOptions};
use crate::embeddings::{embeddings_for, EmbeddingsProvider};
use crate::error::QaError;
use crate::llm::{language_model_for, LanguageModel};
use crate::models::{Answer, ChainOptions, InputFile, RetrievedUnit, VectorStoreOptions};
use crate::stores::LocalVectorStore;
use crate::traits::VectorStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

struct ModelState {
    vector_store: Box<dyn VectorStore>,
    chain: RetrievalQaChain,
}

/// Owns the vector store and the retrieval chain bound to it.
///
/// Both live under one lock: `add_document` inserts and rebinds the chain's
/// retriever as a single write, and `ask` works on the chain that was current
/// when it started.
pub struct QuestionAnswerModel {
    state: RwLock<ModelState>,
}

pub fn vector_store_for(
    option: VectorStoreOptions,
    embeddings: Arc<dyn EmbeddingsProvider>,
    options: &QaOptions,
) -> Result<Box<dyn VectorStore>, QaError> {
    match option {
        VectorStoreOptions::LocalIndex | VectorStoreOptions::Default => {
            let store = match &options.index_path {
                Some(path) => LocalVectorStore::open(path, embeddings)?,
                None => LocalVectorStore::new(embeddings),
            };
            Ok(Box::new(store.with_top_k(options.top_k)?))
        }
    }
}

impl QuestionAnswerModel {
    pub fn new(options: &QaOptions, config: &ProviderConfig) -> Result<Self, QaError> {
        let embeddings = embeddings_for(options.embeddings, config)?;
        let vector_store = vector_store_for(options.vector_store, embeddings, options)?;
        let language_model: Arc<dyn LanguageModel> =
            Arc::new(language_model_for(options.language_model, config)?);

        Self::from_parts(vector_store, language_model, options.chain)
    }

    /// Builds a model from already constructed components.
    pub fn from_parts(
        vector_store: Box<dyn VectorStore>,
        language_model: Arc<dyn LanguageModel>,
        chain: ChainOptions,
    ) -> Result<Self, QaError> {
        let retriever = vector_store.as_retriever()?;
        let chain = chain_for(chain, language_model, retriever);

        Ok(Self {
            state: RwLock::new(ModelState {
                vector_store,
                chain,
            }),
        })
    }

    pub async fn add_document(&self, input_file: &InputFile) -> Result<(), QaError> {
        let mut state = self.state.write().await;
        state.vector_store.add_document(input_file).await?;
        let retriever = state.vector_store.as_retriever()?;
        state.chain.set_retriever(retriever);
        Ok(())
    }

    pub async fn ask(&self, question: &str) -> Result<String, QaError> {
        Ok(self.ask_with_sources(question).await?.answer)
    }

    pub async fn ask_with_sources(&self, question: &str) -> Result<Answer, QaError> {
        info!(question = %question, "model received question");
        let chain = self.current_chain().await;
        let output = chain.invoke(question).await?;
        info!(answer = %output.result, sources = output.source_units.len(), "model returned answer");

        Ok(Answer {
            question: question.to_string(),
            answer: output.result,
            sources: output.source_units,
        })
    }

    /// Units the chain would place in the prompt for `question`.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedUnit>, QaError> {
        let retriever = self.current_chain().await.retriever();
        retriever.retrieve(question).await
    }

    async fn current_chain(&self) -> RetrievalQaChain {
        self.state.read().await.chain.clone()
    }
}
