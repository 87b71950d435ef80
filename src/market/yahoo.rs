use super::{Chart, CompanyFinancials, Headline, MarketData, USER_AGENT};
use crate::config::MarketConfig;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const SUMMARY_MODULES: &str = "price,financialData,defaultKeyStatistics,incomeStatementHistory";

#[derive(Debug, Deserialize)]
struct YahooError {
    code: Option<String>,
    description: Option<String>,
}

impl YahooError {
    fn into_app_error(self, symbol: &str) -> AppError {
        AppError::Market(format!(
            "{} for {}: {}",
            self.code.unwrap_or_else(|| "error".to_string()),
            symbol,
            self.description.unwrap_or_default()
        ))
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    result: Option<Vec<SummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryResult {
    price: Option<PriceModule>,
    financial_data: Option<FinancialData>,
    default_key_statistics: Option<KeyStatistics>,
    income_statement_history: Option<IncomeHistory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    total_revenue: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    net_income_to_common: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeHistory {
    #[serde(default)]
    income_statement_history: Vec<IncomeStatement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatement {
    net_income: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`, or `{}` when unknown
#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    quotes: Vec<SearchQuote>,
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    title: Option<String>,
    publisher: Option<String>,
    provider_publish_time: Option<i64>,
}

pub struct YahooClient {
    client: Client,
    config: MarketConfig,
}

impl YahooClient {
    pub fn new(config: MarketConfig) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            config,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout_secs: u64,
    ) -> AppResult<T> {
        tracing::debug!(url, ?query, "yahoo request");

        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to reach Yahoo Finance: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "Yahoo Finance request failed: {} - {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Failed to parse Yahoo Finance response: {}", e)))
    }

    async fn search(&self, query: &str, quotes: usize, news: usize) -> AppResult<SearchResponse> {
        let params = [
            ("q", query.to_string()),
            ("quotesCount", quotes.to_string()),
            ("newsCount", news.to_string()),
        ];
        self.get_json(&self.config.search_url, &params, self.config.search_timeout_secs)
            .await
    }
}

#[async_trait]
impl MarketData for YahooClient {
    async fn chart(&self, symbol: &str) -> AppResult<Chart> {
        let url = format!("{}/{}", self.config.chart_url, symbol);
        let params = [("range", "2d".to_string()), ("interval", "1d".to_string())];
        let envelope: ChartEnvelope = self.get_json(&url, &params, self.config.timeout_secs).await?;

        if let Some(err) = envelope.chart.error {
            return Err(err.into_app_error(symbol));
        }

        let result = envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| AppError::Market(format!("No chart data for {}", symbol)))?;

        let closes = result
            .indicators
            .and_then(|ind| ind.quote.into_iter().next())
            .map(|quote| quote.close.into_iter().flatten().collect())
            .unwrap_or_default();

        Ok(Chart {
            last_price: result.meta.regular_market_price,
            previous_close: result.meta.previous_close.or(result.meta.chart_previous_close),
            closes,
        })
    }

    async fn financials(&self, symbol: &str) -> AppResult<CompanyFinancials> {
        let url = format!("{}/{}", self.config.summary_url, symbol);
        let params = [("modules", SUMMARY_MODULES.to_string())];
        let envelope: SummaryEnvelope =
            self.get_json(&url, &params, self.config.timeout_secs).await?;

        if let Some(err) = envelope.quote_summary.error {
            return Err(err.into_app_error(symbol));
        }

        let result = envelope
            .quote_summary
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| AppError::Market(format!("No summary data for {}", symbol)))?;

        let net_income = result
            .income_statement_history
            .and_then(|h| h.income_statement_history.into_iter().next())
            .and_then(|statement| raw(statement.net_income));

        Ok(CompanyFinancials {
            short_name: result.price.and_then(|p| p.short_name),
            total_revenue: result.financial_data.and_then(|f| raw(f.total_revenue)),
            net_income_to_common: result
                .default_key_statistics
                .and_then(|k| raw(k.net_income_to_common)),
            net_income,
        })
    }

    async fn news(&self, symbol: &str, limit: usize) -> AppResult<Vec<Headline>> {
        let response = self.search(symbol, 0, limit).await?;
        Ok(response
            .news
            .into_iter()
            .take(limit)
            .filter_map(|item| {
                let title = item.title.filter(|t| !t.is_empty())?;
                Some(Headline {
                    title,
                    source: item.publisher.unwrap_or_else(|| "Yahoo".to_string()),
                    published: item
                        .provider_publish_time
                        .and_then(|ts| DateTime::from_timestamp(ts, 0)),
                })
            })
            .collect())
    }

    async fn lookup_symbol(&self, name: &str) -> AppResult<Option<String>> {
        let response = self.search(name, 1, 0).await?;
        Ok(response.quotes.into_iter().next().and_then(|q| q.symbol))
    }
}
