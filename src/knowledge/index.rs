//! Chunk store with term-frequency retrieval, persisted as JSON.

use crate::utils::error::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

pub const INDEX_FILE: &str = "chunks.json";

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+(?:[/&'][a-z0-9]+)*").expect("token pattern is valid"));

const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from",
    "how", "i", "in", "is", "it", "its", "me", "of", "on", "or", "so", "tell", "that", "the",
    "their", "there", "this", "to", "was", "what", "when", "where", "which", "who", "why", "will",
    "with", "you",
];

/// Lowercase word tokens with stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkIndex {
    pub chunks: Vec<Chunk>,
    #[serde(skip)]
    doc_freq: HashMap<String, usize>,
}

impl ChunkIndex {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        let mut index = Self {
            chunks,
            doc_freq: HashMap::new(),
        };
        index.compute_doc_freq();
        index
    }

    fn compute_doc_freq(&mut self) {
        self.doc_freq.clear();
        for chunk in &self.chunks {
            let unique: HashSet<String> = tokenize(&chunk.text).into_iter().collect();
            for term in unique {
                *self.doc_freq.entry(term).or_insert(0) += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.chunks.len() as f64;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }

    /// Score arbitrary text against the query terms using this index's statistics
    pub fn score_text(&self, query_terms: &[String], text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let mut tf: HashMap<&str, usize> = HashMap::new();
        for token in &tokens {
            *tf.entry(token.as_str()).or_insert(0) += 1;
        }

        let unique: HashSet<&String> = query_terms.iter().collect();
        unique
            .into_iter()
            .map(|term| {
                let count = tf.get(term.as_str()).copied().unwrap_or(0) as f64;
                count * self.idf(term)
            })
            .sum::<f64>()
            / (tokens.len() as f64).sqrt()
    }

    /// Best `k` chunks with a positive score, highest first
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredChunk<'_>> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredChunk<'_>> = self
            .chunks
            .iter()
            .map(|chunk| ScoredChunk {
                chunk,
                score: self.score_text(&terms, &chunk.text),
            })
            .filter(|s| s.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        scored
    }

    pub fn load(dir: &Path) -> AppResult<Option<Self>> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let mut index: ChunkIndex = serde_json::from_str(&content)
            .map_err(|e| AppError::Knowledge(format!("Failed to parse {}: {}", path.display(), e)))?;
        index.compute_doc_freq();
        Ok(Some(index))
    }

    pub fn save(&self, dir: &Path) -> AppResult<()> {
        std::fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Knowledge(format!("Failed to serialize index: {}", e)))?;
        std::fs::write(dir.join(INDEX_FILE), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            source: "test.txt".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_tokenize_keeps_ratio_and_index_names() {
        assert_eq!(
            tokenize("What is the P/E ratio of the S&P 500?"),
            vec!["p/e", "ratio", "s&p", "500"]
        );
    }

    #[test]
    fn test_search_ranks_matching_chunk_first() {
        let index = ChunkIndex::new(vec![
            chunk("Dividend: a share of profits paid to shareholders."),
            chunk("Bear Market: prices fall 20% from a high."),
            chunk("Bull Market: prices rise 20% from a low."),
        ]);

        let hits = index.search("what is a bear market", 3);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].chunk.text.starts_with("Bear Market"));
    }

    #[test]
    fn test_search_without_overlap_is_empty() {
        let index = ChunkIndex::new(vec![chunk("Dividend: profits paid out.")]);
        assert!(index.search("quantum chromodynamics", 3).is_empty());
        assert!(index.search("what is the", 3).is_empty());
    }

    #[test]
    fn test_search_respects_k() {
        let index = ChunkIndex::new(vec![
            chunk("stock one"),
            chunk("stock two"),
            chunk("stock three"),
            chunk("stock four"),
        ]);
        assert_eq!(index.search("stock", 3).len(), 3);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ChunkIndex::load(dir.path()).unwrap().is_none());

        let index = ChunkIndex::new(vec![chunk("Dividend: profits paid out.")]);
        index.save(dir.path()).unwrap();

        let loaded = ChunkIndex::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.chunks, index.chunks);
        assert_eq!(loaded.search("dividend", 1).len(), 1);
    }
}
