pub mod chain;
pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod error;
mod http;
pub mod llm;
pub mod loaders;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod stores;
pub mod traits;

pub use chain::{build_prompt, chain_for, ChainOutput, RetrievalQaChain};
pub use chunking::{chunk_text, split_sentences, ChunkingConfig, DEFAULT_MAX_CHUNK_LENGTH};
pub use config::{ProviderConfig, QaOptions, DEFAULT_TOP_K};
pub use embeddings::{
    embeddings_for, EmbeddingsProvider, HashedTokenEmbeddings, OpenAiEmbeddings,
    DEFAULT_EMBEDDING_DIMENSIONS,
};
pub use error::{IngestError, QaError};
pub use llm::{language_model_for, ChatCompletionsModel, LanguageModel};
pub use loaders::{Loader, PdfLoader, TextLoader};
pub use models::{
    Answer, ChainOptions, ContentUnit, EmbeddingsOptions, InputFile, InputFileKind,
    LanguageModelOptions, RetrievedUnit, UnitMetadata, VectorStoreOptions,
};
pub use orchestrator::{vector_store_for, QuestionAnswerModel};
pub use parser::{list_files, FileParser, SupportedFormat};
pub use stores::{IndexedUnit, LocalRetriever, LocalVectorStore};
pub use traits::{Retriever, VectorStore};
