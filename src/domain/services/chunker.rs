use tracing::debug;

/// Literal sentence boundary. Abbreviations and decimals are not special-cased.
pub const SENTENCE_DELIMITER: &str = ". ";

pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 500;

/// Greedily packs sentences into chunks of at most `max_length` characters.
///
/// A sentence joins the running buffer while `buffer + sentence < max_length`
/// (the delimiter is not counted against the threshold). A sentence that is
/// longer than `max_length` on its own becomes a single oversized chunk;
/// content is never truncated. Joining the returned chunks with a single
/// space reproduces the input.
pub fn chunk_text(text: &str, max_length: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if text.trim().is_empty() {
        return chunks;
    }

    let sentences: Vec<&str> = text.split(SENTENCE_DELIMITER).collect();
    let last = sentences.len() - 1;

    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for (i, sentence) in sentences.iter().enumerate() {
        let sentence_len = sentence.chars().count();
        if buffer_len + sentence_len >= max_length {
            flush(&mut chunks, &buffer);
            buffer.clear();
            buffer_len = 0;
        }

        buffer.push_str(sentence);
        buffer_len += sentence_len;
        if i != last {
            buffer.push_str(SENTENCE_DELIMITER);
            buffer_len += SENTENCE_DELIMITER.len();
        }
    }
    flush(&mut chunks, &buffer);

    debug!(
        "Split {} sentences into {} chunks (max length {})",
        sentences.len(),
        chunks.len(),
        max_length
    );
    chunks
}

fn flush(chunks: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
