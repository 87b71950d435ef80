use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const NEWSAPI_KEY_ENV: &str = "NEWSAPI_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub news_api: NewsApiConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database: PathBuf,
    pub history_limit: usize,
    pub color: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub chart_url: String,
    pub summary_url: String,
    pub search_url: String,
    pub timeout_secs: u64,
    pub search_timeout_secs: u64,
    pub news_limit: usize,
    pub indices: Vec<IndexConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexConfig {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub url: String,
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub docs_dir: PathBuf,
    pub index_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            url: "https://newsapi.org/v2/everything".to_string(),
            api_key: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            api_key: None,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database: Config::data_dir().join("stockchat.db"),
            history_limit: 200,
            color: true,
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            chart_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            summary_url: "https://query1.finance.yahoo.com/v10/finance/quoteSummary".to_string(),
            search_url: "https://query1.finance.yahoo.com/v1/finance/search".to_string(),
            timeout_secs: 10,
            search_timeout_secs: 4,
            news_limit: 3,
            indices: vec![
                IndexConfig {
                    name: "S&P 500".to_string(),
                    symbol: "^GSPC".to_string(),
                },
                IndexConfig {
                    name: "Dow Jones".to_string(),
                    symbol: "^DJI".to_string(),
                },
                IndexConfig {
                    name: "Nasdaq".to_string(),
                    symbol: "^IXIC".to_string(),
                },
            ],
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        let data_dir = Config::data_dir();
        Self {
            docs_dir: data_dir.join("sample_docs"),
            index_dir: data_dir.join("index"),
            chunk_size: 1_000,
            chunk_overlap: 100,
            top_k: 3,
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        Self::load_custom(&Self::config_file_path())
    }

    pub fn ensure_config_exists() -> AppResult<()> {
        let config_path = Self::config_file_path();
        if !config_path.exists() {
            Config::default().save_to(&config_path)?;
        }
        Ok(())
    }

    pub fn load_custom(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(config_path)?;
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.general.database.as_os_str().is_empty() {
            return Err(AppError::Config("Database path cannot be empty".to_string()));
        }

        if self.general.history_limit == 0 {
            return Err(AppError::Config(
                "History limit must be greater than zero".to_string(),
            ));
        }

        if self.market.indices.is_empty() {
            return Err(AppError::Config(
                "At least one market index must be configured".to_string(),
            ));
        }

        let knowledge = &self.knowledge;
        if knowledge.chunk_overlap >= knowledge.chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                knowledge.chunk_overlap, knowledge.chunk_size
            )));
        }

        if knowledge.top_k == 0 {
            return Err(AppError::Config("top_k must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// OpenAI key from config, falling back to the environment
    pub fn openai_key(&self) -> Option<String> {
        self.llm
            .api_key
            .clone()
            .or_else(|| std::env::var(OPENAI_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// NewsAPI key from config, falling back to the environment
    pub fn newsapi_key(&self) -> Option<String> {
        self.news_api
            .api_key
            .clone()
            .or_else(|| std::env::var(NEWSAPI_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&Self::config_file_path())
    }

    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;

        Ok(())
    }

    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stockchat")
            .join("config.toml")
    }

    fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stockchat")
    }
}
