//! Keyword routing of chat queries to agents and merging of their answers.

use crate::agents::Agent;
use regex::Regex;
use std::sync::{Arc, LazyLock};

pub const ROUTING_FAILED: &str = "Sorry, I hit a problem while processing that.";

const PRICE_WORDS: &[&str] = &["price", "quote", "trading at"];
const NEWS_WORDS: &[&str] = &["news", "headline"];
const FINANCIAL_WORDS: &[&str] = &["earnings", "financial", "revenue"];
const MARKET_WORDS: &[&str] = &["market", "index", "indices", "dow", "nasdaq", "s&p"];

/// Words that never name the company a question is about
const FILLER_WORDS: &[&str] = &[
    "a", "about", "an", "are", "at", "company", "company's", "current", "currently", "do",
    "does", "for", "get", "give", "how", "is", "latest", "me", "much", "of", "on", "please",
    "recent", "share", "shares", "show", "stock", "stocks", "tell", "the", "today", "what",
    "what's", "whats", "with",
];

static AND_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i) and ").expect("split pattern is valid"));

/// What a query asks for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub price: bool,
    pub news: bool,
    pub financial: bool,
    pub market: bool,
    pub ticker: Option<String>,
}

impl Intent {
    fn any(&self) -> bool {
        self.price || self.news || self.financial || self.market
    }

    /// Market summaries are dropped when news is requested
    pub fn wants_market_summary(&self) -> bool {
        self.market && !self.news
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// First all-uppercase alphabetic token, ignoring trailing punctuation
pub fn detect_ticker(query: &str) -> Option<String> {
    query
        .split_whitespace()
        .map(|t| t.trim_end_matches(['?', '!', ',', '.', ';', ':']))
        .find(|t| {
            !t.is_empty()
                && *t != "I"
                && t.chars().all(|c| c.is_alphabetic())
                && t.chars().all(|c| c.is_uppercase())
        })
        .map(str::to_string)
}

pub fn analyze(query: &str) -> Intent {
    let q = query.to_lowercase();
    let mut intent = Intent {
        price: contains_any(&q, PRICE_WORDS),
        news: contains_any(&q, NEWS_WORDS),
        financial: contains_any(&q, FINANCIAL_WORDS),
        market: contains_any(&q, MARKET_WORDS),
        ticker: detect_ticker(query),
    };

    if intent.ticker.is_some() && !intent.any() {
        intent.price = true;
    }
    intent
}

/// Parts of a compound question such as "AAPL price and latest news"
pub fn split_parts(query: &str) -> Option<Vec<String>> {
    if !query.to_lowercase().contains(" and ") {
        return None;
    }
    Some(
        AND_SPLIT
            .split(query)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// The words of a query left once intent keywords and filler are removed
pub fn subject(query: &str) -> String {
    let keywords: Vec<&str> = PRICE_WORDS
        .iter()
        .chain(NEWS_WORDS)
        .chain(FINANCIAL_WORDS)
        .chain(MARKET_WORDS)
        .copied()
        .collect();

    let words: Vec<&str> = query
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '&' && c != '.'))
        .map(|w| w.trim_end_matches('.'))
        .filter(|w| !w.is_empty())
        .filter(|w| {
            let lower = w.to_lowercase();
            let stem = lower.trim_end_matches('s');
            !FILLER_WORDS.contains(&lower.as_str())
                && !keywords.iter().any(|k| *k == lower || *k == stem)
        })
        .collect();

    if words.is_empty() {
        query.trim().to_string()
    } else {
        words.join(" ")
    }
}

pub struct Router {
    price: Arc<dyn Agent>,
    news: Arc<dyn Agent>,
    financials: Arc<dyn Agent>,
    market: Arc<dyn Agent>,
    knowledge: Arc<dyn Agent>,
}

impl Router {
    pub fn new(
        price: Arc<dyn Agent>,
        news: Arc<dyn Agent>,
        financials: Arc<dyn Agent>,
        market: Arc<dyn Agent>,
        knowledge: Arc<dyn Agent>,
    ) -> Self {
        Self {
            price,
            news,
            financials,
            market,
            knowledge,
        }
    }

    /// Decide which agents answer `query` and merge their answers
    pub async fn route_query(&self, query: &str) -> String {
        if let Some(parts) = split_parts(query) {
            let mut answers = Vec::with_capacity(parts.len());
            for part in &parts {
                answers.push(self.route_single(part).await);
            }
            return answers.join("\n\n");
        }
        self.route_single(query).await
    }

    async fn route_single(&self, query: &str) -> String {
        let intent = analyze(query);
        tracing::debug!(query, ?intent, "routing query");

        let target = intent.ticker.clone().unwrap_or_else(|| subject(query));

        let mut plan: Vec<(&'static str, &Arc<dyn Agent>, &str)> = Vec::new();
        if intent.price {
            plan.push(("Price", &self.price, target.as_str()));
        }
        if intent.news {
            plan.push(("News", &self.news, target.as_str()));
        }
        if intent.financial {
            plan.push(("Financials", &self.financials, target.as_str()));
        }
        if intent.wants_market_summary() {
            plan.push(("Market", &self.market, query));
        }
        if plan.is_empty() {
            plan.push(("Knowledge", &self.knowledge, query));
        }

        let mut labelled = Vec::with_capacity(plan.len());
        for (label, agent, input) in &plan {
            match agent.run(input).await {
                Ok(answer) => labelled.push((*label, answer)),
                Err(e) => {
                    tracing::error!(agent = agent.name(), error = %e, "agent failed");
                    return ROUTING_FAILED.to_string();
                }
            }
        }

        if labelled.len() == 1 {
            return labelled.remove(0).1;
        }

        labelled
            .into_iter()
            .map(|(label, answer)| format!("**{}:** {}", label, answer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{AppError, AppResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes its input and records every call
    struct EchoAgent {
        name: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Agent for EchoAgent {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, input: &str) -> AppResult<String> {
            self.calls.lock().unwrap().push(format!("{}({})", self.name, input));
            Ok(format!("{}[{}]", self.name, input))
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl Agent for FailingAgent {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn run(&self, _input: &str) -> AppResult<String> {
            Err(AppError::Network("timeout".to_string()))
        }
    }

    fn router() -> (Router, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let agent = |name: &'static str| -> Arc<dyn Agent> {
            Arc::new(EchoAgent {
                name,
                calls: calls.clone(),
            })
        };
        let router = Router::new(
            agent("price"),
            agent("news"),
            agent("financials"),
            agent("market"),
            agent("kb"),
        );
        (router, calls)
    }

    #[test]
    fn test_analyze_keywords() {
        let intent = analyze("What's the latest news and earnings for MSFT?");
        assert!(intent.news && intent.financial);
        assert!(!intent.price && !intent.market);
        assert_eq!(intent.ticker.as_deref(), Some("MSFT"));
    }

    #[test]
    fn test_bare_ticker_means_price() {
        let intent = analyze("NVDA");
        assert!(intent.price);
        assert_eq!(intent.ticker.as_deref(), Some("NVDA"));
    }

    #[test]
    fn test_pronoun_is_not_a_ticker() {
        assert_eq!(detect_ticker("Can I buy stocks"), None);
        assert!(!analyze("Can I retire early").price);
    }

    #[test]
    fn test_market_keywords() {
        let intent = analyze("How did the S&P do today?");
        assert!(intent.market);
        assert!(intent.wants_market_summary());

        let with_news = analyze("stock market news");
        assert!(with_news.market && with_news.news);
        assert!(!with_news.wants_market_summary());
    }

    #[test]
    fn test_split_parts_keeps_case() {
        assert_eq!(
            split_parts("AAPL price AND latest news"),
            Some(vec!["AAPL price".to_string(), "latest news".to_string()])
        );
        assert_eq!(split_parts("brand new ideas"), None);
    }

    #[test]
    fn test_subject_strips_keywords_and_filler() {
        assert_eq!(subject("What is the stock price of Tesla?"), "Tesla");
        assert_eq!(subject("latest headlines about Apple"), "Apple");
        assert_eq!(subject("news"), "news");
    }

    #[tokio::test]
    async fn test_single_intent_returns_bare_answer() {
        let (router, calls) = router();
        assert_eq!(router.route_query("AAPL").await, "price[AAPL]");
        assert_eq!(*calls.lock().unwrap(), vec!["price(AAPL)"]);
    }

    #[tokio::test]
    async fn test_multiple_intents_are_labelled() {
        let (router, _) = router();
        assert_eq!(
            router.route_query("TSLA price, news and revenue").await,
            "**Price:** price[TSLA]\n\n**News:** news[TSLA]\n\nfinancials[revenue]"
        );
        assert_eq!(
            router.route_query("TSLA price, news, revenue").await,
            "**Price:** price[TSLA]\n\n**News:** news[TSLA]\n\n**Financials:** financials[TSLA]"
        );
    }

    #[tokio::test]
    async fn test_compound_question_routes_each_part() {
        let (router, calls) = router();
        let answer = router.route_query("AAPL price and latest news").await;
        assert_eq!(answer, "price[AAPL]\n\nnews[latest news]");
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_market_summary_gets_full_query() {
        let (router, _) = router();
        assert_eq!(
            router.route_query("how is the nasdaq doing").await,
            "market[how is the nasdaq doing]"
        );
    }

    #[tokio::test]
    async fn test_fallback_to_knowledge_base() {
        let (router, _) = router();
        assert_eq!(
            router.route_query("what is diversification").await,
            "kb[what is diversification]"
        );
    }

    #[tokio::test]
    async fn test_agent_failure_is_apology() {
        let (echo, _) = router();
        let router = Router::new(
            echo.price.clone(),
            Arc::new(FailingAgent),
            echo.financials.clone(),
            echo.market.clone(),
            echo.knowledge.clone(),
        );
        assert_eq!(router.route_query("GOOG price and news").await, format!("price[GOOG]\n\n{}", ROUTING_FAILED));
    }
}
