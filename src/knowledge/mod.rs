//! Local knowledge base answering general market questions.
//!
//! Documents from the docs directory are split into chunks, indexed and
//! persisted. Queries retrieve the best chunks; with a chat model configured
//! the chunks are handed to it as context, otherwise the best matching
//! paragraph is returned as-is.

pub mod glossary;
pub mod index;
pub mod splitter;

pub use index::{Chunk, ChunkIndex};
pub use splitter::CharacterTextSplitter;

use crate::config::KnowledgeConfig;
use crate::llm::ChatModel;
use crate::utils::error::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

pub const NO_INFORMATION: &str = "I'm sorry, I don't have information on that topic.";
pub const LOOKUP_FAILED: &str = "I'm sorry, I cannot find information on that.";

const SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the user's question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// A loaded source document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: String,
    pub text: String,
}

/// Read `.txt` and `.md` files from `dir`, skipping anything unreadable
pub fn load_documents(dir: &Path) -> Vec<Document> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            tracing::warn!(dir = %dir.display(), "knowledge directory does not exist, no documents loaded");
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "md" => match std::fs::read_to_string(&path) {
                Ok(text) => documents.push(Document {
                    source: file_name,
                    text,
                }),
                Err(e) => tracing::warn!(file = %file_name, error = %e, "skipped document"),
            },
            "pdf" => tracing::warn!(file = %file_name, "skipped document: PDF text extraction is not supported"),
            _ => {}
        }
    }

    documents
}

/// Chunk documents; the bundled glossary stands in when there are none
pub fn build_index(documents: &[Document], config: &KnowledgeConfig) -> ChunkIndex {
    let splitter = CharacterTextSplitter::new(config.chunk_size, config.chunk_overlap);

    let bundled;
    let documents = if documents.is_empty() {
        tracing::info!("no knowledge documents found, using the bundled glossary");
        bundled = vec![Document {
            source: glossary::GLOSSARY_SOURCE.to_string(),
            text: glossary::GLOSSARY_TEXT.to_string(),
        }];
        &bundled
    } else {
        documents
    };

    let chunks = documents
        .iter()
        .flat_map(|doc| {
            splitter.split_text(&doc.text).into_iter().map(|text| Chunk {
                source: doc.source.clone(),
                text,
            })
        })
        .collect();

    ChunkIndex::new(chunks)
}

pub struct KnowledgeBase {
    index: ChunkIndex,
    llm: Option<Arc<dyn ChatModel>>,
    top_k: usize,
}

impl KnowledgeBase {
    pub fn new(index: ChunkIndex, top_k: usize) -> Self {
        Self {
            index,
            llm: None,
            top_k,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn ChatModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Load the persisted index, building and saving it first when missing or empty
    pub fn open(config: &KnowledgeConfig) -> AppResult<Self> {
        match ChunkIndex::load(&config.index_dir) {
            Ok(Some(index)) if !index.is_empty() => {
                tracing::debug!(chunks = index.len(), "loaded knowledge index");
                return Ok(Self::new(index, config.top_k));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "knowledge index unreadable, rebuilding"),
        }
        Self::rebuild(config)
    }

    /// Rebuild the index from the docs directory and persist it
    pub fn rebuild(config: &KnowledgeConfig) -> AppResult<Self> {
        let documents = load_documents(&config.docs_dir);
        let index = build_index(&documents, config);
        if index.is_empty() {
            return Err(AppError::Knowledge(
                "No knowledge chunks could be built".to_string(),
            ));
        }
        index.save(&config.index_dir)?;
        tracing::info!(documents = documents.len(), chunks = index.len(), "built knowledge index");
        Ok(Self::new(index, config.top_k))
    }

    pub fn index(&self) -> &ChunkIndex {
        &self.index
    }

    /// Answer from the knowledge base; never fails, degrades to an apology
    pub async fn answer_query(&self, query: &str) -> String {
        let hits = self.index.search(query, self.top_k);
        if hits.is_empty() {
            return NO_INFORMATION.to_string();
        }

        let Some(llm) = &self.llm else {
            return self.best_paragraph(query, &hits);
        };

        let context = hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let system = format!("{}\n\n{}", SYSTEM_PROMPT, context);

        match llm.complete(&system, query).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => NO_INFORMATION.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "knowledge answer failed");
                LOOKUP_FAILED.to_string()
            }
        }
    }

    fn best_paragraph(&self, query: &str, hits: &[index::ScoredChunk<'_>]) -> String {
        let terms = index::tokenize(query);
        hits.iter()
            .flat_map(|hit| hit.chunk.text.split("\n\n"))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| (self.index.score_text(&terms, p), p))
            .filter(|(score, _)| *score > 0.0)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p.to_string())
            .unwrap_or_else(|| NO_INFORMATION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;

    struct CannedModel(AppResult<String>);

    #[async_trait]
    impl ChatModel for CannedModel {
        async fn complete(&self, system: &str, _user: &str) -> AppResult<String> {
            assert!(system.contains("context"));
            self.0.clone()
        }
    }

    fn config_in(dir: &Path) -> KnowledgeConfig {
        KnowledgeConfig {
            docs_dir: dir.join("docs"),
            index_dir: dir.join("index"),
            ..Config::default().knowledge
        }
    }

    fn glossary_kb() -> KnowledgeBase {
        let config = Config::default().knowledge;
        KnowledgeBase::new(build_index(&[], &config), config.top_k)
    }

    #[test]
    fn test_load_documents_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("b.MD"), "beta").unwrap();
        std::fs::write(dir.path().join("c.pdf"), "%PDF").unwrap();
        std::fs::write(dir.path().join("d.csv"), "x,y").unwrap();

        let docs = load_documents(dir.path());
        let sources: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["a.txt", "b.MD"]);
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_documents(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn test_open_builds_then_reuses_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::create_dir_all(&config.docs_dir).unwrap();
        std::fs::write(config.docs_dir.join("notes.txt"), "Margin: borrowed money used to buy stock.").unwrap();

        let kb = KnowledgeBase::open(&config).unwrap();
        assert_eq!(kb.index().len(), 1);
        assert!(config.index_dir.join(index::INDEX_FILE).exists());

        std::fs::write(config.docs_dir.join("more.txt"), "Short selling: betting on a fall.").unwrap();
        assert_eq!(KnowledgeBase::open(&config).unwrap().index().len(), 1);
        assert_eq!(KnowledgeBase::rebuild(&config).unwrap().index().len(), 2);
    }

    #[tokio::test]
    async fn test_extractive_answer_picks_definition() {
        let answer = glossary_kb().answer_query("What is a dividend?").await;
        assert!(answer.starts_with("Dividend:"), "got {}", answer);
    }

    #[tokio::test]
    async fn test_bear_market_question() {
        let answer = glossary_kb().answer_query("explain a bear market").await;
        assert!(answer.starts_with("Bear Market:"), "got {}", answer);
    }

    #[tokio::test]
    async fn test_unknown_topic() {
        let answer = glossary_kb().answer_query("zebra migration").await;
        assert_eq!(answer, NO_INFORMATION);
    }

    #[tokio::test]
    async fn test_llm_answer_and_failures() {
        let kb = glossary_kb().with_llm(Arc::new(CannedModel(Ok(" Spread your bets. ".to_string()))));
        assert_eq!(kb.answer_query("what is diversification").await, "Spread your bets.");

        let kb = glossary_kb().with_llm(Arc::new(CannedModel(Ok("   ".to_string()))));
        assert_eq!(kb.answer_query("what is diversification").await, NO_INFORMATION);

        let kb = glossary_kb().with_llm(Arc::new(CannedModel(Err(AppError::Network("down".to_string())))));
        assert_eq!(kb.answer_query("what is diversification").await, LOOKUP_FAILED);
    }
}
