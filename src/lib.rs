//! stockchat - a terminal stock market assistant
//!
//! This library wires market data tools, a lexical knowledge base and
//! keyword routing into per-user chat sessions backed by SQLite.

pub mod agents;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod knowledge;
pub mod llm;
pub mod market;
pub mod router;
pub mod session;
pub mod storage;
pub mod utils;

// Re-export core types and traits for easier use
pub use crate::core::{
    data::{ChatMessage, RegistrationForm, RegistrationIssue, Role},
    traits::{ChatStore, UserStore},
};
pub use router::Router;
pub use session::ChatSession;

use agents::{EarningsAgent, KnowledgeAgent, MarketSummaryAgent, NewsAgent, StockPriceAgent};
use knowledge::KnowledgeBase;
use llm::{ChatModel, OpenAiClient};
use market::newsapi::NewsApiClient;
use market::yahoo::YahooClient;
use market::MarketTools;
use std::sync::Arc;
use storage::{Database, SqliteChatStore, SqliteUserStore};
use utils::error::AppResult;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A session over the SQLite stores
pub type SqliteSession = ChatSession<SqliteUserStore, SqliteChatStore>;

/// Main library interface for chatting: every service built once from the configuration
pub struct StockChat {
    config: config::Config,
    tools: Arc<MarketTools>,
    knowledge: Arc<KnowledgeBase>,
    router: Arc<Router>,
}

/// Market lookups only; touches neither the knowledge index nor the database
pub fn market_tools(config: &config::Config) -> AppResult<MarketTools> {
    let yahoo = YahooClient::new(config.market.clone())?;
    let tools = MarketTools::new(
        Arc::new(yahoo),
        config.market.indices.clone(),
        config.market.news_limit,
    );
    match config.newsapi_key() {
        Some(key) => Ok(tools.with_news_fallback(Arc::new(NewsApiClient::new(&config.news_api, key)?))),
        None => {
            tracing::debug!("no NewsAPI key, keyword news search disabled");
            Ok(tools)
        }
    }
}

impl StockChat {
    pub fn new(config: config::Config) -> AppResult<Self> {
        let tools = Arc::new(market_tools(&config)?);

        let mut knowledge = KnowledgeBase::open(&config.knowledge)?;
        match config.openai_key() {
            Some(key) => {
                let llm: Arc<dyn ChatModel> = Arc::new(OpenAiClient::new(config.llm.clone(), key)?);
                knowledge = knowledge.with_llm(llm);
            }
            None => tracing::debug!("no OpenAI key, knowledge answers are extractive"),
        }
        let knowledge = Arc::new(knowledge);

        let router = Arc::new(Router::new(
            Arc::new(StockPriceAgent::new(tools.clone())),
            Arc::new(NewsAgent::new(tools.clone())),
            Arc::new(EarningsAgent::new(tools.clone())),
            Arc::new(MarketSummaryAgent::new(tools.clone())),
            Arc::new(KnowledgeAgent::new(knowledge.clone())),
        ));

        Ok(Self {
            config,
            tools,
            knowledge,
            router,
        })
    }

    pub fn config(&self) -> &config::Config {
        &self.config
    }

    pub fn tools(&self) -> &MarketTools {
        &self.tools
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }

    /// Open the account and history stores and start a logged-out session
    pub fn session(&self) -> AppResult<SqliteSession> {
        let (users, chats) = Database::new(self.config.general.database.clone()).open_stores()?;
        Ok(ChatSession::new(
            users,
            chats,
            self.router(),
            self.config.general.history_limit,
        ))
    }
}
