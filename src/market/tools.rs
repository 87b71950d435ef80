//! Market lookups rendered as the sentences the chat agents reply with.
//!
//! Data failures never surface as errors here: they are logged and turned
//! into "not available" style answers.

use super::{Chart, Headline, MarketData, NewsSearch};
use crate::config::IndexConfig;
use crate::utils::format::{format_large_money, format_signed_percent, format_thousands};
use std::sync::Arc;

pub struct MarketTools {
    data: Arc<dyn MarketData>,
    news_fallback: Option<Arc<dyn NewsSearch>>,
    indices: Vec<IndexConfig>,
    news_limit: usize,
}

/// Last price and the prior session's close
///
/// The second to last daily close is the prior session whenever the chart has
/// two; `previous_close` only stands in for shorter charts.
fn price_and_previous(chart: &Chart) -> (Option<f64>, Option<f64>) {
    match chart.closes.as_slice() {
        [.., prev, last] => (chart.last_price.or(Some(*last)), Some(*prev)),
        [only] => (
            chart.last_price.or(Some(*only)),
            chart.previous_close.or(Some(*only)),
        ),
        [] => (chart.last_price, chart.previous_close),
    }
}

/// `AAPL`, `BRK.B`, `^GSPC`: no spaces and no lowercase letters
fn looks_like_symbol(input: &str) -> bool {
    !input.is_empty()
        && input.chars().any(|c| c.is_ascii_uppercase())
        && input
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '^' | '='))
}

fn percent_change(last: f64, prev: f64) -> Option<f64> {
    (prev != 0.0).then(|| (last - prev) / prev * 100.0)
}

fn format_headlines(subject: &str, rows: &[Headline]) -> String {
    let lines: Vec<String> = rows
        .iter()
        .map(|h| format!("- {} ({}, {})", h.title, h.source, h.date()))
        .collect();
    format!("Recent news for {}:\n{}", subject, lines.join("\n"))
}

impl MarketTools {
    pub fn new(data: Arc<dyn MarketData>, indices: Vec<IndexConfig>, news_limit: usize) -> Self {
        Self {
            data,
            news_fallback: None,
            indices,
            news_limit,
        }
    }

    pub fn with_news_fallback(mut self, news: Arc<dyn NewsSearch>) -> Self {
        self.news_fallback = Some(news);
        self
    }

    pub fn news_limit(&self) -> usize {
        self.news_limit
    }

    /// Ticker-looking input is used as-is; anything else goes through symbol search
    pub async fn resolve_symbol(&self, input: &str) -> String {
        let input = input.trim();
        if looks_like_symbol(input) {
            return input.to_string();
        }

        match self.data.lookup_symbol(input).await {
            Ok(Some(symbol)) => {
                tracing::debug!(input, %symbol, "resolved company name");
                symbol
            }
            Ok(None) => input.to_string(),
            Err(e) => {
                tracing::debug!(input, error = %e, "symbol lookup failed");
                input.to_string()
            }
        }
    }

    /// Current price with the daily change, e.g. `The current price of AAPL is $190.50 (+1.33%).`
    pub async fn get_stock_price(&self, ticker: &str) -> String {
        let (price, prev) = match self.data.chart(ticker).await {
            Ok(chart) => price_and_previous(&chart),
            Err(e) => {
                tracing::warn!(ticker, error = %e, "price lookup failed");
                (None, None)
            }
        };

        let Some(price) = price else {
            return format!("Price data for {} is not available.", ticker);
        };

        let pct = match prev.and_then(|p| percent_change(price, p)) {
            // A flat day shows no sign.
            Some(change) if change > 0.0 => format!(" ({})", format_signed_percent(change)),
            Some(change) => format!(" ({:.2}%)", change),
            None => String::new(),
        };

        format!(
            "The current price of {} is ${}{}.",
            ticker,
            format_thousands(price, 2),
            pct
        )
    }

    /// Revenue and net income summary
    pub async fn get_financial_statements(&self, ticker: &str) -> String {
        let financials = match self.data.financials(ticker).await {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(ticker, error = %e, "financials lookup failed");
                return format!("Financial information for {} is not available.", ticker);
            }
        };

        let name = financials.short_name.as_deref().unwrap_or(ticker);
        // A zero figure means unreported, so the next source is tried
        let income = [financials.net_income_to_common, financials.net_income]
            .into_iter()
            .flatten()
            .find(|value| *value != 0.0);

        format!(
            "{} latest financials – Revenue: {}, Net income: {} (last annual/TTM).",
            name,
            format_large_money(financials.total_revenue),
            format_large_money(income)
        )
    }

    /// Headlines for a ticker or company name
    ///
    /// Tries the query as a ticker, then the ticker a symbol search suggests,
    /// then the keyword news search if one is configured.
    pub async fn get_recent_news(&self, query: &str, limit: usize) -> String {
        let mut attempts = vec![query.to_string()];
        let mut looked_up = false;

        while let Some(attempt) = attempts.pop() {
            if !attempt.is_empty() {
                match self.data.news(&attempt, limit).await {
                    Ok(rows) if !rows.is_empty() => return format_headlines(&attempt, &rows),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(symbol = %attempt, error = %e, "news lookup failed"),
                }
            }

            if !looked_up {
                looked_up = true;
                match self.data.lookup_symbol(query).await {
                    Ok(Some(symbol)) if symbol != query => attempts.push(symbol),
                    Ok(_) => {}
                    Err(e) => tracing::debug!(query, error = %e, "symbol lookup failed"),
                }
            }
        }

        if let Some(fallback) = &self.news_fallback {
            match fallback.search(query, limit).await {
                Ok(rows) if !rows.is_empty() => return format_headlines(query, &rows),
                Ok(_) => {}
                Err(e) => tracing::warn!(query, error = %e, "news search failed"),
            }
        }

        format!("No recent news found for {}.", query)
    }

    /// Snapshot of the configured indices with an overall sentiment
    pub async fn get_market_summary(&self) -> String {
        let mut ups = 0usize;
        let mut downs = 0usize;
        let mut parts = Vec::with_capacity(self.indices.len());

        for index in &self.indices {
            let closes = match self.data.chart(&index.symbol).await {
                Ok(chart) => chart.closes,
                Err(e) => {
                    tracing::warn!(symbol = %index.symbol, error = %e, "index lookup failed");
                    Vec::new()
                }
            };

            let (Some(prev), Some(last)) = (closes.first(), closes.last()) else {
                parts.push(format!("{}: N/A", index.name));
                continue;
            };

            let change = percent_change(*last, *prev).unwrap_or(0.0);
            if change < 0.0 {
                downs += 1;
            } else {
                ups += 1;
            }

            parts.push(format!(
                "{}: {} ({})",
                index.name,
                format_thousands(*last, 0),
                format_signed_percent(change)
            ));
        }

        let sentiment = if ups > downs {
            "positive"
        } else if downs > ups {
            "negative"
        } else {
            "mixed"
        };

        format!(
            "Market Summary – {}. Overall sentiment: {}.",
            parts.join("; "),
            sentiment
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::market::CompanyFinancials;
    use crate::utils::error::{AppError, AppResult};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::HashMap;

    /// In-memory market data keyed by symbol
    #[derive(Default)]
    pub(crate) struct FakeMarket {
        pub charts: HashMap<String, Chart>,
        pub financials: HashMap<String, CompanyFinancials>,
        pub news: HashMap<String, Vec<Headline>>,
        pub symbols: HashMap<String, String>,
    }

    #[async_trait]
    impl MarketData for FakeMarket {
        async fn chart(&self, symbol: &str) -> AppResult<Chart> {
            self.charts
                .get(symbol)
                .cloned()
                .ok_or_else(|| AppError::Market(format!("no chart for {}", symbol)))
        }

        async fn financials(&self, symbol: &str) -> AppResult<CompanyFinancials> {
            self.financials
                .get(symbol)
                .cloned()
                .ok_or_else(|| AppError::Market(format!("no financials for {}", symbol)))
        }

        async fn news(&self, symbol: &str, limit: usize) -> AppResult<Vec<Headline>> {
            Ok(self
                .news
                .get(symbol)
                .map(|rows| rows.iter().take(limit).cloned().collect())
                .unwrap_or_default())
        }

        async fn lookup_symbol(&self, name: &str) -> AppResult<Option<String>> {
            Ok(self.symbols.get(name).cloned())
        }
    }

    struct FakeNewsSearch(Vec<Headline>);

    #[async_trait]
    impl NewsSearch for FakeNewsSearch {
        async fn search(&self, _query: &str, limit: usize) -> AppResult<Vec<Headline>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    pub(crate) fn headline(title: &str, source: &str, ts: i64) -> Headline {
        Headline {
            title: title.to_string(),
            source: source.to_string(),
            published: DateTime::from_timestamp(ts, 0),
        }
    }

    fn tools(market: FakeMarket) -> MarketTools {
        let config = Config::default();
        MarketTools::new(Arc::new(market), config.market.indices, config.market.news_limit)
    }

    #[tokio::test]
    async fn test_price_with_positive_change() {
        let mut market = FakeMarket::default();
        market.charts.insert(
            "AAPL".to_string(),
            Chart {
                last_price: Some(1234.5),
                previous_close: Some(1210.0),
                closes: vec![],
            },
        );
        assert_eq!(
            tools(market).get_stock_price("AAPL").await,
            "The current price of AAPL is $1,234.50 (+2.02%)."
        );
    }

    #[tokio::test]
    async fn test_daily_change_uses_prior_session_close() {
        let mut market = FakeMarket::default();
        market.charts.insert(
            "AAPL".to_string(),
            Chart {
                last_price: Some(190.5),
                previous_close: Some(185.0),
                closes: vec![188.0, 190.5],
            },
        );
        assert_eq!(
            tools(market).get_stock_price("AAPL").await,
            "The current price of AAPL is $190.50 (+1.33%)."
        );
    }

    #[tokio::test]
    async fn test_single_close_compares_with_previous_close() {
        let mut market = FakeMarket::default();
        market.charts.insert(
            "MSFT".to_string(),
            Chart {
                last_price: Some(420.0),
                previous_close: Some(400.0),
                closes: vec![420.0],
            },
        );
        assert_eq!(
            tools(market).get_stock_price("MSFT").await,
            "The current price of MSFT is $420.00 (+5.00%)."
        );
    }

    #[tokio::test]
    async fn test_price_falls_back_to_closes() {
        let mut market = FakeMarket::default();
        market.charts.insert(
            "F".to_string(),
            Chart {
                last_price: None,
                previous_close: None,
                closes: vec![12.0, 11.4],
            },
        );
        assert_eq!(
            tools(market).get_stock_price("F").await,
            "The current price of F is $11.40 (-5.00%)."
        );
    }

    #[tokio::test]
    async fn test_flat_price_has_no_sign() {
        let mut market = FakeMarket::default();
        market.charts.insert(
            "KO".to_string(),
            Chart {
                last_price: None,
                previous_close: None,
                closes: vec![60.0],
            },
        );
        assert_eq!(
            tools(market).get_stock_price("KO").await,
            "The current price of KO is $60.00 (0.00%)."
        );
    }

    #[tokio::test]
    async fn test_price_without_previous_close_omits_change() {
        let mut market = FakeMarket::default();
        market.charts.insert(
            "NEW".to_string(),
            Chart {
                last_price: Some(10.0),
                previous_close: Some(0.0),
                closes: vec![],
            },
        );
        assert_eq!(
            tools(market).get_stock_price("NEW").await,
            "The current price of NEW is $10.00."
        );
    }

    #[tokio::test]
    async fn test_price_unavailable() {
        assert_eq!(
            tools(FakeMarket::default()).get_stock_price("ZZZZ").await,
            "Price data for ZZZZ is not available."
        );
    }

    #[tokio::test]
    async fn test_financials_sentence() {
        let mut market = FakeMarket::default();
        market.financials.insert(
            "AAPL".to_string(),
            CompanyFinancials {
                short_name: Some("Apple Inc.".to_string()),
                total_revenue: Some(383_290_000_000.0),
                net_income_to_common: None,
                net_income: Some(97_000_000_000.0),
            },
        );
        market
            .financials
            .insert("TINY".to_string(), CompanyFinancials::default());

        let tools = tools(market);
        assert_eq!(
            tools.get_financial_statements("AAPL").await,
            "Apple Inc. latest financials – Revenue: $383.29 B, Net income: $97.00 B (last annual/TTM)."
        );
        assert_eq!(
            tools.get_financial_statements("TINY").await,
            "TINY latest financials – Revenue: N/A, Net income: N/A (last annual/TTM)."
        );
        assert_eq!(
            tools.get_financial_statements("GONE").await,
            "Financial information for GONE is not available."
        );
    }

    #[tokio::test]
    async fn test_zero_net_income_falls_through() {
        let mut market = FakeMarket::default();
        market.financials.insert(
            "XYZ".to_string(),
            CompanyFinancials {
                short_name: Some("XYZ Corp".to_string()),
                total_revenue: Some(5_000_000.0),
                net_income_to_common: Some(0.0),
                net_income: Some(1_250_000.0),
            },
        );
        market.financials.insert(
            "ABC".to_string(),
            CompanyFinancials {
                short_name: None,
                total_revenue: None,
                net_income_to_common: Some(2_000_000_000.0),
                net_income: Some(1_000_000_000.0),
            },
        );

        let tools = tools(market);
        assert_eq!(
            tools.get_financial_statements("XYZ").await,
            "XYZ Corp latest financials – Revenue: $5.00 M, Net income: $1.25 M (last annual/TTM)."
        );
        assert_eq!(
            tools.get_financial_statements("ABC").await,
            "ABC latest financials – Revenue: N/A, Net income: $2.00 B (last annual/TTM)."
        );
    }

    #[tokio::test]
    async fn test_news_direct_hit() {
        let mut market = FakeMarket::default();
        market.news.insert(
            "AAPL".to_string(),
            vec![
                headline("Apple ships", "Reuters", 1714564800),
                headline("Apple earnings", "CNBC", 1714478400),
            ],
        );
        assert_eq!(
            tools(market).get_recent_news("AAPL", 3).await,
            "Recent news for AAPL:\n- Apple ships (Reuters, 2024-05-01)\n- Apple earnings (CNBC, 2024-04-30)"
        );
    }

    #[tokio::test]
    async fn test_news_via_symbol_lookup() {
        let mut market = FakeMarket::default();
        market.symbols.insert("Apple".to_string(), "AAPL".to_string());
        market
            .news
            .insert("AAPL".to_string(), vec![headline("Apple ships", "Reuters", 1714564800)]);
        let answer = tools(market).get_recent_news("Apple", 3).await;
        assert!(answer.starts_with("Recent news for AAPL:\n"));
    }

    #[tokio::test]
    async fn test_news_fallback_and_miss() {
        let fallback = FakeNewsSearch(vec![headline("Rates rise", "Bloomberg", 1714564800)]);
        let with_fallback = tools(FakeMarket::default()).with_news_fallback(Arc::new(fallback));
        assert_eq!(
            with_fallback.get_recent_news("interest rates", 3).await,
            "Recent news for interest rates:\n- Rates rise (Bloomberg, 2024-05-01)"
        );

        assert_eq!(
            tools(FakeMarket::default()).get_recent_news("nothing", 3).await,
            "No recent news found for nothing."
        );
    }

    #[tokio::test]
    async fn test_market_summary_sentiment() {
        let mut market = FakeMarket::default();
        let chart = |closes: Vec<f64>| Chart {
            last_price: None,
            previous_close: None,
            closes,
        };
        market.charts.insert("^GSPC".to_string(), chart(vec![5000.0, 5021.0]));
        market.charts.insert("^DJI".to_string(), chart(vec![38000.0, 37810.0]));
        market.charts.insert("^IXIC".to_string(), chart(vec![16000.0, 16080.0]));

        assert_eq!(
            tools(market).get_market_summary().await,
            "Market Summary – S&P 500: 5,021 (+0.42%); Dow Jones: 37,810 (-0.50%); Nasdaq: 16,080 (+0.50%). Overall sentiment: positive."
        );
    }

    #[tokio::test]
    async fn test_resolve_symbol() {
        let mut market = FakeMarket::default();
        market.symbols.insert("tesla".to_string(), "TSLA".to_string());
        let tools = tools(market);
        assert_eq!(tools.resolve_symbol("BRK.B").await, "BRK.B");
        assert_eq!(tools.resolve_symbol("tesla").await, "TSLA");
        assert_eq!(tools.resolve_symbol("acme widgets").await, "acme widgets");
    }

    #[tokio::test]
    async fn test_market_summary_missing_indices_are_mixed() {
        let mut market = FakeMarket::default();
        market.charts.insert(
            "^DJI".to_string(),
            Chart {
                last_price: None,
                previous_close: None,
                closes: vec![],
            },
        );
        assert_eq!(
            tools(market).get_market_summary().await,
            "Market Summary – S&P 500: N/A; Dow Jones: N/A; Nasdaq: N/A. Overall sentiment: mixed."
        );
    }
}
