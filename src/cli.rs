use crate::commands::{account, chat, configure, history, knowledge, market};
use crate::config::Config;
use crate::utils::error::AppResult;
use crate::{StockChat, market_tools};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stockchat")]
#[command(about = "Chat about stock prices, market news and investing basics")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Log debug output to stderr")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Commands {
    pub async fn execute(self, config: Config) -> AppResult<()> {
        match self {
            Commands::Register => account::handle_register_command(config)?,
            Commands::Chat(args) => {
                chat::handle_chat_command(&StockChat::new(config)?, &args).await?;
            }
            Commands::Ask(args) => {
                chat::handle_ask_command(&StockChat::new(config)?, &args).await?;
            }
            Commands::History(args) => history::handle_history_command(config, &args)?,
            Commands::Quote(args) => {
                market::handle_quote_command(&market_tools(&config)?, &args).await;
            }
            Commands::News(args) => {
                market::handle_news_command(&market_tools(&config)?, &args).await;
            }
            Commands::Financials(args) => {
                market::handle_financials_command(&market_tools(&config)?, &args).await;
            }
            Commands::Market => {
                market::handle_market_command(&market_tools(&config)?).await;
            }
            Commands::Define(args) => knowledge::handle_define_command(&args),
            Commands::Index(args) => knowledge::handle_index_command(config, &args)?,
            Commands::Config(args) => configure::handle_config_command(config, args.command)?,
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register,

    /// Log in and chat interactively
    Chat(ChatArgs),

    /// Ask a single question as a user
    Ask(AskArgs),

    /// Show or clear a user's chat history
    History(HistoryArgs),

    /// Current price for a ticker or company name
    Quote(SymbolArgs),

    /// Recent headlines for a ticker or search phrase
    News(NewsArgs),

    /// Latest annual revenue and net income
    Financials(SymbolArgs),

    /// Snapshot of the major indices
    Market,

    /// Look up a glossary term
    Define(DefineArgs),

    /// Show or rebuild the knowledge index
    Index(IndexArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ChatArgs {
    #[arg(short, long, help = "Username to log in as")]
    pub user: Option<String>,
}

#[derive(Args)]
pub struct AskArgs {
    #[arg(short, long)]
    pub user: String,

    #[arg(required = true, num_args = 1.., help = "The question to ask")]
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct HistoryArgs {
    #[arg(short, long)]
    pub user: String,

    #[arg(long, help = "Delete the stored conversation")]
    pub clear: bool,

    #[arg(short, long, help = "Skip the confirmation when clearing")]
    pub force: bool,
}

#[derive(Args)]
pub struct SymbolArgs {
    #[arg(required = true, num_args = 1.., help = "Ticker symbol or company name")]
    pub symbol: Vec<String>,
}

#[derive(Args)]
pub struct NewsArgs {
    #[arg(required = true, num_args = 1.., help = "Ticker symbol, company or topic")]
    pub query: Vec<String>,

    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct DefineArgs {
    #[arg(help = "Term to define; lists every term when omitted")]
    pub term: Vec<String>,
}

#[derive(Args)]
pub struct IndexArgs {
    #[arg(long, help = "Rebuild the index from the documents directory")]
    pub rebuild: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}
