use crate::chunking::{chunk_with_config, ChunkingConfig};
use crate::error::IngestError;
use crate::models::InputFile;
use lopdf::Document;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Produces an [`InputFile`] from a path on disk.
pub trait Loader {
    fn load_single_file(&self, path: &Path) -> Result<InputFile, IngestError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader {
    pub chunking: ChunkingConfig,
}

impl TextLoader {
    pub fn new(chunking: ChunkingConfig) -> Self {
        Self { chunking }
    }
}

impl Loader for TextLoader {
    fn load_single_file(&self, path: &Path) -> Result<InputFile, IngestError> {
        let name = ensure_readable(path)?;
        let text = fs::read_to_string(path).map_err(|error| match error.kind() {
            ErrorKind::InvalidData => IngestError::InvalidEncoding(path.display().to_string()),
            _ => IngestError::Io(error),
        })?;
        let pages = chunk_with_config(&text, self.chunking);

        if pages.is_empty() {
            return Err(IngestError::EmptyDocument(path.display().to_string()));
        }

        info!(name = %name, chunks = pages.len(), "read text input file");
        Ok(InputFile::text(name, path.to_string_lossy(), pages))
    }
}

/// One page string per physical page. Pages without extractable text stay in
/// place as empty strings so page numbers line up with the source.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl Loader for PdfLoader {
    fn load_single_file(&self, path: &Path) -> Result<InputFile, IngestError> {
        let name = ensure_readable(path)?;
        let document =
            Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = match document.extract_text(&[page_no]) {
                Ok(text) => text,
                Err(error) => {
                    warn!(name = %name, page = page_no, %error, "page has no extractable text");
                    String::new()
                }
            };
            pages.push(text);
        }

        if pages.is_empty() {
            return Err(IngestError::PdfParse(format!(
                "pdf has no pages: {}",
                path.display()
            )));
        }

        info!(name = %name, pages = pages.len(), "read pdf input file");
        Ok(InputFile::pdf(name, path.to_string_lossy(), pages))
    }
}

fn ensure_readable(path: &Path) -> Result<String, IngestError> {
    if !path.is_file() {
        return Err(IngestError::NotFound(path.display().to_string()));
    }
    file_name(path)
}

pub(crate) fn file_name(path: &Path) -> Result<String, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))
}


#[cfg(test)]
mod tests {
    use super::test_pdf::write_pdf;
    use super::*;
    use crate::models::InputFileKind;
    use tempfile::tempdir;

    #[test]
    fn text_loader_chunks_file_contents() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        fs::write(&path, "First sentence here. Second sentence here. Third one.")?;

        let loader = TextLoader::new(ChunkingConfig { max_chars: 25 });
        let file = loader.load_single_file(&path)?;

        assert_eq!(file.kind(), InputFileKind::Text);
        assert_eq!(file.name(), "notes.txt");
        assert_eq!(file.path(), path.to_string_lossy());
        assert_eq!(
            file.pages(),
            &["First sentence here.", "Second sentence here.", "Third one."]
        );
        Ok(())
    }

    #[test]
    fn text_loader_reports_missing_file() {
        let result = TextLoader::default().load_single_file(Path::new("/nonexistent/missing.txt"));
        assert!(matches!(result, Err(IngestError::NotFound(_))));
    }

    #[test]
    fn text_loader_rejects_empty_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.txt");
        fs::write(&path, "  \n")?;

        let result = TextLoader::default().load_single_file(&path);
        assert!(matches!(result, Err(IngestError::EmptyDocument(_))));
        Ok(())
    }

    #[test]
    fn text_loader_rejects_non_utf8_bytes() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"Caf\xe9 revenue grew.")?;

        let error = match TextLoader::default().load_single_file(&path) {
            Err(error) => error,
            Ok(file) => panic!("expected an encoding error, got {file:?}"),
        };
        assert!(matches!(&error, IngestError::InvalidEncoding(reported) if reported.ends_with("latin1.txt")));
        assert!(crate::error::QaError::from(error).is_bad_input());
        Ok(())
    }

    #[test]
    fn pdf_loader_keeps_one_entry_per_page() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("report.pdf");
        write_pdf(&path, &[Some("Revenue grew"), None, Some("Costs fell")])?;

        let file = PdfLoader.load_single_file(&path)?;

        assert_eq!(file.kind(), InputFileKind::Pdf);
        assert_eq!(file.name(), "report.pdf");
        assert_eq!(file.pages().len(), 3);
        assert!(file.pages()[0].contains("Revenue grew"));
        assert!(file.pages()[1].trim().is_empty());
        assert!(file.pages()[2].contains("Costs fell"));
        Ok(())
    }

    #[test]
    fn pdf_loader_reports_missing_file() {
        let result = PdfLoader.load_single_file(Path::new("/nonexistent/missing.pdf"));
        assert!(matches!(result, Err(IngestError::NotFound(_))));
    }

    #[test]
    fn pdf_loader_rejects_garbage() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\n%broken")?;

        let result = PdfLoader.load_single_file(&path);
        assert!(matches!(result, Err(IngestError::PdfParse(_))));
        Ok(())
    }
}
