use super::model::TextChunk;

/// Split text into consecutive chunks of `chunk_size` whitespace-delimited
/// words. The last chunk may be shorter. Boundaries ignore sentences.
pub fn split_into_word_chunks(text: &str, chunk_size: usize) -> Vec<TextChunk> {
    if chunk_size == 0 {
        return Vec::new();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, words)| TextChunk {
            index,
            text: words.join(" "),
        })
        .collect()
}
