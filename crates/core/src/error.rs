use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("document has no content: {0}")]
    EmptyDocument(String),

    #[error("text file is not valid UTF-8: {0}")]
    InvalidEncoding(String),
}

#[derive(Debug, Error)]
pub enum QaError {
    #[error("unsupported input file type: {0}")]
    UnsupportedType(String),

    #[error("provider {provider} failed: {details}")]
    Provider { provider: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("index persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("{0} is not implemented for this vector store")]
    NotImplemented(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl QaError {
    pub fn provider(provider: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            details: details.into(),
        }
    }

    /// True when the caller supplied something unusable, false when a
    /// provider or the local index failed.
    pub fn is_bad_input(&self) -> bool {
        match self {
            Self::UnsupportedType(_) => true,
            Self::Ingest(inner) => matches!(
                inner,
                IngestError::NotFound(_)
                    | IngestError::UnsupportedFormat(_)
                    | IngestError::EmptyDocument(_)
                    | IngestError::MissingFileName(_)
                    | IngestError::PdfParse(_)
                    | IngestError::InvalidEncoding(_)
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_input_is_separated_from_provider_failures() {
        assert!(QaError::UnsupportedType("x.bin".to_string()).is_bad_input());
        assert!(QaError::from(IngestError::UnsupportedFormat("x.xyz".to_string())).is_bad_input());
        assert!(QaError::from(IngestError::NotFound("gone.txt".to_string())).is_bad_input());
        assert!(QaError::from(IngestError::InvalidEncoding("latin1.txt".to_string())).is_bad_input());
        assert!(!QaError::provider("openai", "429 Too Many Requests").is_bad_input());
        let disk = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!QaError::from(IngestError::Io(disk)).is_bad_input());
        assert!(!QaError::NotImplemented("as_retriever").is_bad_input());
    }
}
