use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 5_000;

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHUNK_LENGTH,
        }
    }
}

/// Sentences in source order, using Unicode sentence boundaries.
///
/// Segments without letters or digits (separator rows, symbol lines) are kept;
/// only whitespace between sentences is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split_sentence_bounds()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// Groups whole sentences into chunks of at most `max_chunk_length` characters.
///
/// A sentence is never split. One that is longer than the limit on its own
/// becomes a single oversized chunk.
pub fn chunk_text(text: &str, max_chunk_length: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();

        // `current_len` includes the trailing separator, so the closed chunk
        // is exactly `current_len - 1 + sentence_len` characters.
        if !current.is_empty() && current_len + sentence_len > max_chunk_length {
            chunks.push(current.trim_end().to_string());
            current.clear();
            current_len = 0;
        }

        current.push_str(sentence);
        current.push(' ');
        current_len += sentence_len + 1;
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim_end().to_string());
    }

    chunks
}

pub fn chunk_with_config(text: &str, config: ChunkingConfig) -> Vec<String> {
    chunk_text(text, config.max_chars)
}
