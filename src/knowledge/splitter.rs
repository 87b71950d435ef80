/// Splits text on a separator and packs the pieces into overlapping chunks.
///
/// Pieces are joined back with the separator until adding the next one would
/// exceed `chunk_size` characters. The following chunk then starts with the
/// trailing pieces of the previous one, at most `chunk_overlap` characters
/// worth. A single piece longer than `chunk_size` becomes its own chunk.
#[derive(Debug, Clone)]
pub struct CharacterTextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            separator: "\n\n".to_string(),
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let splits: Vec<&str> = text.split(self.separator.as_str()).filter(|s| !s.is_empty()).collect();
        self.merge_splits(&splits)
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let sep_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut current: Vec<(&str, usize)> = Vec::new();
        let mut total = 0usize;

        for split in splits {
            let len = split.chars().count();
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        size = total,
                        limit = self.chunk_size,
                        "created a chunk larger than the configured size"
                    );
                }

                if !current.is_empty() {
                    self.push_chunk(&mut chunks, &current);

                    while total > self.chunk_overlap
                        || (total > 0
                            && total + len + if current.is_empty() { 0 } else { sep_len }
                                > self.chunk_size)
                    {
                        let (_, first_len) = current.remove(0);
                        total -= first_len + if current.is_empty() { 0 } else { sep_len };
                    }
                }
            }

            let joiner = if current.is_empty() { 0 } else { sep_len };
            current.push((split, len));
            total += len + joiner;
        }

        self.push_chunk(&mut chunks, &current);
        chunks
    }

    fn push_chunk(&self, chunks: &mut Vec<String>, pieces: &[(&str, usize)]) {
        let joined = pieces
            .iter()
            .map(|(piece, _)| *piece)
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = CharacterTextSplitter::new(1_000, 100);
        assert_eq!(splitter.split_text("alpha\n\nbeta"), vec!["alpha\n\nbeta"]);
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let splitter = CharacterTextSplitter::new(7, 3).with_separator(" ");
        let chunks = splitter.split_text("foo bar baz 123");
        assert_eq!(chunks, vec!["foo bar", "bar baz", "baz 123"]);
    }

    #[test]
    fn test_no_overlap() {
        let splitter = CharacterTextSplitter::new(7, 0).with_separator(" ");
        let chunks = splitter.split_text("foo bar baz 123");
        assert_eq!(chunks, vec!["foo bar", "baz 123"]);
    }

    #[test]
    fn test_oversized_piece_stands_alone() {
        let splitter = CharacterTextSplitter::new(5, 0).with_separator(" ");
        let chunks = splitter.split_text("a verylongword b");
        assert_eq!(chunks, vec!["a", "verylongword", "b"]);
    }

    #[test]
    fn test_empty_pieces_dropped() {
        let splitter = CharacterTextSplitter::new(100, 10);
        assert!(splitter.split_text("\n\n\n\n").is_empty());
    }
}
