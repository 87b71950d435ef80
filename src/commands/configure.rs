use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::utils::error::AppResult;
use crate::utils::{OutputStyle, print_success, prompt_yes_no};

pub fn handle_config_command(mut config: Config, command: Option<ConfigCommands>) -> AppResult<()> {
    match command {
        Some(ConfigCommands::Show) => handle_show_command(&config),
        Some(ConfigCommands::Path) => {
            println!("{}", Config::config_file_path().display());
            Ok(())
        }
        Some(ConfigCommands::Reset) => handle_reset_command(&mut config),
        None => handle_config_help(),
    }
}

fn key_status(key: &Option<String>) -> &'static str {
    if key.is_some() { "✓" } else { "not set" }
}

fn handle_show_command(config: &Config) -> AppResult<()> {
    println!("⚙️  stockchat Configuration");
    println!("==========================");

    println!("General:");
    println!("  Database: {}", config.general.database.display());
    println!("  History limit: {}", config.general.history_limit);
    println!("  Color: {}", config.general.color);

    println!("Market:");
    println!("  Chart URL: {}", config.market.chart_url);
    println!("  Summary URL: {}", config.market.summary_url);
    println!("  Search URL: {}", config.market.search_url);
    println!("  Timeout: {}s (search {}s)", config.market.timeout_secs, config.market.search_timeout_secs);
    println!("  News limit: {}", config.market.news_limit);
    let indices: Vec<String> = config
        .market
        .indices
        .iter()
        .map(|i| format!("{} ({})", i.name, i.symbol))
        .collect();
    println!("  Indices: {}", indices.join(", "));

    println!("NewsAPI:");
    println!("  URL: {}", config.news_api.url);
    println!("  API key: {}", key_status(&config.newsapi_key()));

    println!("LLM:");
    println!("  URL: {}", config.llm.url);
    println!("  Model: {}", config.llm.model);
    println!("  Temperature: {}", config.llm.temperature);
    println!("  API key: {}", key_status(&config.openai_key()));

    println!("Knowledge:");
    println!("  Documents: {}", config.knowledge.docs_dir.display());
    println!("  Index: {}", config.knowledge.index_dir.display());
    println!(
        "  Chunks: {} chars, {} overlap, top {}",
        config.knowledge.chunk_size, config.knowledge.chunk_overlap, config.knowledge.top_k
    );

    Ok(())
}

fn handle_config_help() -> AppResult<()> {
    OutputStyle::print_header("⚙️  Configuration Management");
    println!("Available configuration commands:");
    println!("  stockchat config show    - Show current configuration");
    println!("  stockchat config path    - Print the configuration file location");
    println!("  stockchat config reset   - Reset configuration to defaults");
    println!();
    println!("Configuration file location: {}", Config::config_file_path().display());
    Ok(())
}

fn handle_reset_command(config: &mut Config) -> AppResult<()> {
    if prompt_yes_no("Are you sure you want to reset configuration to defaults? This will overwrite your current settings.")? {
        *config = Config::default();
        config.save()?;
        print_success("Configuration reset to defaults!");
    } else {
        println!("Reset cancelled.");
    }
    Ok(())
}
