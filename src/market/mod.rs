pub mod newsapi;
pub mod tools;
pub mod yahoo;

pub use tools::MarketTools;

use crate::utils::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub const USER_AGENT: &str = concat!("stockchat/", env!("CARGO_PKG_VERSION"));

/// Recent trading data for one symbol
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    pub last_price: Option<f64>,
    /// Reported previous close; for multi-day charts this predates the window
    pub previous_close: Option<f64>,
    /// Daily closes, oldest first
    pub closes: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFinancials {
    pub short_name: Option<String>,
    pub total_revenue: Option<f64>,
    pub net_income_to_common: Option<f64>,
    pub net_income: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub title: String,
    pub source: String,
    pub published: Option<DateTime<Utc>>,
}

impl Headline {
    pub fn date(&self) -> String {
        self.published
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Quote, fundamentals and headline source
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn chart(&self, symbol: &str) -> AppResult<Chart>;
    async fn financials(&self, symbol: &str) -> AppResult<CompanyFinancials>;
    async fn news(&self, symbol: &str, limit: usize) -> AppResult<Vec<Headline>>;
    /// Best ticker for a company name, if an obvious one exists
    async fn lookup_symbol(&self, name: &str) -> AppResult<Option<String>>;
}

/// Keyword headline search used when the primary source has nothing
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Headline>>;
}
