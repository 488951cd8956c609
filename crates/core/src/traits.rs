use crate::error::QaError;
use crate::models::{InputFile, RetrievedUnit};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for embedded content units.
///
/// Backends override both methods; the defaults report
/// [`QaError::NotImplemented`].
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn add_document(&mut self, _input_file: &InputFile) -> Result<(), QaError> {
        Err(QaError::NotImplemented("add_document"))
    }

    /// A query handle over the store's contents at call time.
    fn as_retriever(&self) -> Result<Arc<dyn Retriever>, QaError> {
        Err(QaError::NotImplemented("as_retriever"))
    }
}

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedUnit>, QaError>;
}
