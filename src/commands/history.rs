use crate::cli::HistoryArgs;
use crate::config::Config;
use crate::core::traits::{ChatStore, UserStore};
use crate::session::INVALID_LOGIN;
use crate::storage::Database;
use crate::utils::error::{AppError, AppResult, FlowResult, handle_flow};
use crate::utils::pagination::display_paged;
use crate::utils::{OutputStyle, prompt_password, prompt_yes_no};

pub fn handle_history_command(config: Config, args: &HistoryArgs) -> AppResult<()> {
    let (users, chats) = Database::new(config.general.database.clone()).open_stores()?;

    let password = prompt_password("Password: ")?;
    if !users.verify_login(&args.user, &password)? {
        return Err(AppError::Auth(INVALID_LOGIN.to_string()));
    }

    if args.clear {
        let confirmed = args.force
            || prompt_yes_no(&format!("Delete the whole conversation of '{}'?", args.user))?;
        if !confirmed {
            handle_flow(FlowResult::Cancelled("Nothing deleted".to_string()));
            return Ok(());
        }
        let removed = chats.clear_chat(&args.user)?;
        handle_flow(FlowResult::Success(format!("Removed {} messages", removed)));
        return Ok(());
    }

    let messages = chats.fetch_chat(&args.user, config.general.history_limit)?;
    if messages.is_empty() {
        handle_flow(FlowResult::EmptyList {
            item_type: "messages".to_string(),
        });
        return Ok(());
    }

    let header = format!(
        "{}\n{}\n",
        OutputStyle::title(&format!("💬 Conversation of {}", args.user)),
        OutputStyle::header_separator()
    );
    display_paged(&format!("{}{}", header, OutputStyle::format_transcript(&messages)))
}
