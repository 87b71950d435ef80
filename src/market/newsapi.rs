use super::{Headline, NewsSearch, USER_AGENT};
use crate::config::NewsApiConfig;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    source: ArticleSource,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// Only the calendar date of `publishedAt` is kept
fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let date = raw.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub struct NewsApiClient {
    client: Client,
    url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(config: &NewsApiConfig, api_key: String) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            url: config.url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl NewsSearch for NewsApiClient {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Headline>> {
        tracing::debug!(query, limit, "newsapi request");

        let response = self
            .client
            .get(&self.url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.to_string()),
                ("language", "en".to_string()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to reach NewsAPI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "NewsAPI request failed: {} - {}",
                status, error_text
            )));
        }

        let body: EverythingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Failed to parse NewsAPI response: {}", e)))?;

        Ok(body
            .articles
            .into_iter()
            .filter_map(|article| {
                Some(Headline {
                    title: article.title?,
                    source: article.source.name.unwrap_or_default(),
                    published: article.published_at.as_deref().and_then(parse_published),
                })
            })
            .collect())
    }
}
