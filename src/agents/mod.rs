//! Single-purpose answerers the router dispatches to.

use crate::knowledge::KnowledgeBase;
use crate::market::MarketTools;
use crate::utils::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &'static str;

    /// Answer for a ticker, company name or free-form query
    async fn run(&self, input: &str) -> AppResult<String>;
}

pub struct StockPriceAgent {
    tools: Arc<MarketTools>,
}

impl StockPriceAgent {
    pub fn new(tools: Arc<MarketTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for StockPriceAgent {
    fn name(&self) -> &'static str {
        "stock_price"
    }

    async fn run(&self, input: &str) -> AppResult<String> {
        let symbol = self.tools.resolve_symbol(input).await;
        Ok(self.tools.get_stock_price(&symbol).await)
    }
}

pub struct NewsAgent {
    tools: Arc<MarketTools>,
}

impl NewsAgent {
    pub fn new(tools: Arc<MarketTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for NewsAgent {
    fn name(&self) -> &'static str {
        "news"
    }

    async fn run(&self, input: &str) -> AppResult<String> {
        let limit = self.tools.news_limit();
        Ok(self.tools.get_recent_news(input.trim(), limit).await)
    }
}

pub struct EarningsAgent {
    tools: Arc<MarketTools>,
}

impl EarningsAgent {
    pub fn new(tools: Arc<MarketTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for EarningsAgent {
    fn name(&self) -> &'static str {
        "earnings"
    }

    async fn run(&self, input: &str) -> AppResult<String> {
        let symbol = self.tools.resolve_symbol(input).await;
        Ok(self.tools.get_financial_statements(&symbol).await)
    }
}

pub struct MarketSummaryAgent {
    tools: Arc<MarketTools>,
}

impl MarketSummaryAgent {
    pub fn new(tools: Arc<MarketTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Agent for MarketSummaryAgent {
    fn name(&self) -> &'static str {
        "market_summary"
    }

    // The summary covers the configured indices whatever was asked.
    async fn run(&self, _input: &str) -> AppResult<String> {
        Ok(self.tools.get_market_summary().await)
    }
}

pub struct KnowledgeAgent {
    knowledge: Arc<KnowledgeBase>,
}

impl KnowledgeAgent {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }
}

#[async_trait]
impl Agent for KnowledgeAgent {
    fn name(&self) -> &'static str {
        "knowledge"
    }

    async fn run(&self, input: &str) -> AppResult<String> {
        Ok(self.knowledge.answer_query(input).await)
    }
}
