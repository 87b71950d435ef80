use crate::cli::{AskArgs, ChatArgs};
use crate::commands::account::login_interactive;
use crate::core::traits::{ChatStore, UserStore};
use crate::session::ChatSession;
use crate::utils::error::{AppResult, FlowResult, handle_flow, report_error};
use crate::utils::pagination::display_paged;
use crate::utils::{OutputStyle, print_info, prompt_input, prompt_yes_no};
use crate::StockChat;

/// What the REPL does after reading a line
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Ask(String),
    History,
    Clear,
    Logout,
    Quit,
    Help,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    match line {
        "" => ChatInput::Empty,
        "/history" => ChatInput::History,
        "/clear" => ChatInput::Clear,
        "/logout" => ChatInput::Logout,
        "/quit" | "/exit" => ChatInput::Quit,
        "/help" => ChatInput::Help,
        cmd if cmd.starts_with('/') => ChatInput::Unknown(cmd.to_string()),
        question => ChatInput::Ask(question.to_string()),
    }
}

fn print_help() {
    print_info("Ask about a ticker (\"AAPL price and news\"), the market or an investing term.");
    println!("  /history  show this conversation");
    println!("  /clear    delete your stored conversation");
    println!("  /logout   log out and switch user");
    println!("  /quit     leave");
}

pub async fn handle_chat_command(app: &StockChat, args: &ChatArgs) -> AppResult<()> {
    let mut session = app.session()?;
    OutputStyle::print_header("📈 Stock Market Chatbot");

    let mut username = args.user.clone();
    loop {
        login_interactive(&mut session, username.as_deref())?;
        username = None;

        for message in session.messages() {
            OutputStyle::print_message(message);
        }
        print_help();

        if !run_conversation(&mut session).await? {
            break;
        }
        session.logout();
        handle_flow(FlowResult::Success("Logged out".to_string()));
    }

    Ok(())
}

/// Runs until the user quits (`false`) or logs out (`true`)
async fn run_conversation<U: UserStore, C: ChatStore>(
    session: &mut ChatSession<U, C>,
) -> AppResult<bool> {
    loop {
        let line = prompt_input(&format!("{} ", OutputStyle::user("You:")))?;
        match parse_input(&line) {
            ChatInput::Empty => {}
            ChatInput::Help => print_help(),
            ChatInput::Quit => return Ok(false),
            ChatInput::Logout => return Ok(true),
            ChatInput::History => {
                if session.messages().is_empty() {
                    handle_flow(FlowResult::EmptyList {
                        item_type: "messages".to_string(),
                    });
                } else {
                    display_paged(&OutputStyle::format_transcript(session.messages()))?;
                }
            }
            ChatInput::Clear => {
                if prompt_yes_no("Delete your whole conversation?")? {
                    let removed = session.clear_history()?;
                    handle_flow(FlowResult::Success(format!("Removed {} messages", removed)));
                } else {
                    handle_flow(FlowResult::Cancelled("Nothing deleted".to_string()));
                }
            }
            ChatInput::Unknown(cmd) => {
                handle_flow(FlowResult::NotFound {
                    item_type: "Command".to_string(),
                    search_term: cmd,
                });
            }
            ChatInput::Ask(question) => match session.submit(&question).await {
                Ok(answer) => OutputStyle::print_answer(&answer),
                Err(e) => report_error(&e),
            },
        }
    }
}

pub async fn handle_ask_command(app: &StockChat, args: &AskArgs) -> AppResult<()> {
    let mut session = app.session()?;
    login_interactive(&mut session, Some(&args.user))?;

    let answer = session.submit(&args.question.join(" ")).await?;
    OutputStyle::print_answer(&answer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("  "), ChatInput::Empty);
        assert_eq!(parse_input("/quit"), ChatInput::Quit);
        assert_eq!(parse_input("/exit"), ChatInput::Quit);
        assert_eq!(parse_input("/history"), ChatInput::History);
        assert_eq!(parse_input(" /logout "), ChatInput::Logout);
        assert_eq!(parse_input("/stats"), ChatInput::Unknown("/stats".to_string()));
        assert_eq!(
            parse_input(" AAPL price "),
            ChatInput::Ask("AAPL price".to_string())
        );
    }
}
