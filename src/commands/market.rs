use crate::cli::{NewsArgs, SymbolArgs};
use crate::market::MarketTools;
use crate::utils::OutputStyle;

pub async fn handle_quote_command(tools: &MarketTools, args: &SymbolArgs) {
    let symbol = tools.resolve_symbol(&args.symbol.join(" ")).await;
    OutputStyle::print_answer(&tools.get_stock_price(&symbol).await);
}

pub async fn handle_news_command(tools: &MarketTools, args: &NewsArgs) {
    let limit = args.limit.unwrap_or_else(|| tools.news_limit());
    OutputStyle::print_answer(&tools.get_recent_news(&args.query.join(" "), limit).await);
}

pub async fn handle_financials_command(tools: &MarketTools, args: &SymbolArgs) {
    let symbol = tools.resolve_symbol(&args.symbol.join(" ")).await;
    OutputStyle::print_answer(&tools.get_financial_statements(&symbol).await);
}

pub async fn handle_market_command(tools: &MarketTools) {
    OutputStyle::print_answer(&tools.get_market_summary().await);
}
