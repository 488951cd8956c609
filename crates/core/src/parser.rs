use crate::chunking::ChunkingConfig;
use crate::error::IngestError;
use crate::loaders::{Loader, PdfLoader, TextLoader};
use crate::models::InputFile;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFormat {
    Text,
    Pdf,
}

impl SupportedFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str())?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else if ext.eq_ignore_ascii_case("txt") {
            Some(Self::Text)
        } else {
            None
        }
    }
}

/// Picks a loader by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileParser {
    text: TextLoader,
    pdf: PdfLoader,
}

impl FileParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_chunk_length(max_chars: usize) -> Self {
        Self {
            text: TextLoader::new(ChunkingConfig { max_chars }),
            pdf: PdfLoader,
        }
    }

    pub fn parse_file(&self, path: &Path) -> Result<InputFile, IngestError> {
        match SupportedFormat::from_path(path) {
            Some(SupportedFormat::Pdf) => self.pdf.load_single_file(path),
            Some(SupportedFormat::Text) => self.text.load_single_file(path),
            None => Err(IngestError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Parses every file directly inside `dir`, sorted by file name.
    ///
    /// Subdirectories are skipped. The first file that fails aborts the batch.
    pub fn parse_directory(&self, dir: &Path) -> Result<Vec<InputFile>, IngestError> {
        let files = list_files(dir)?;
        let parsed = files
            .iter()
            .map(|path| self.parse_file(path))
            .collect::<Result<Vec<_>, _>>()?;

        info!(directory = %dir.display(), files = parsed.len(), "parsed directory");
        Ok(parsed)
    }

    /// Parses a single file, or every file in a directory.
    pub fn parse_path(&self, path: &Path) -> Result<Vec<InputFile>, IngestError> {
        if path.is_dir() {
            self.parse_directory(path)
        } else {
            Ok(vec![self.parse_file(path)?])
        }
    }
}

pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::NotFound(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|error| IngestError::Io(error.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
