use crate::core::data::{ChatMessage, Role};
use crate::utils::format::format_datetime;
use colored::*;

pub struct OutputStyle;

impl OutputStyle {
    pub fn user(text: &str) -> ColoredString {
        text.bright_green().bold()
    }

    pub fn assistant(text: &str) -> ColoredString {
        text.bright_blue().bold()
    }

    pub fn content(text: &str) -> ColoredString {
        text.clear()
    }

    pub fn title(text: &str) -> ColoredString {
        text.bright_blue().bold()
    }

    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn label(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn info(text: &str) -> ColoredString {
        text.blue()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn separator() -> String {
        "─".repeat(50)
    }

    pub fn header_separator() -> String {
        "═".repeat(50)
    }

    pub fn print_header(title: &str) {
        println!("{}", Self::title(title));
        println!("{}", Self::header_separator());
    }

    pub fn print_field_colored(label: &str, value: &str, color_fn: impl Fn(&str) -> ColoredString) {
        println!("{:>12}: {}", Self::label(label), color_fn(value));
    }

    /// Speaker label used in transcripts
    pub fn speaker(role: Role) -> ColoredString {
        match role {
            Role::User => Self::user("User:"),
            Role::Assistant => Self::assistant("Assistant:"),
        }
    }

    pub fn print_message(message: &ChatMessage) {
        println!("{} {}", Self::speaker(message.role), Self::content(&message.text));
    }

    /// Plain-text transcript, one block per message, suitable for the pager
    pub fn format_transcript(messages: &[ChatMessage]) -> String {
        let mut out = String::new();
        for message in messages {
            let stamp = message
                .created_at
                .as_ref()
                .map(|ts| format!(" [{}]", format_datetime(ts)))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}{} {}\n\n",
                Self::speaker(message.role),
                Self::muted(&stamp),
                message.text
            ));
        }
        out
    }

    pub fn print_answer(answer: &str) {
        println!("{} {}", Self::speaker(Role::Assistant), Self::content(answer));
        println!();
    }
}

pub fn print_warning(message: &str) {
    println!("⚠️  {}", OutputStyle::warning(message));
}

pub fn print_success(message: &str) {
    println!("✅ {}", OutputStyle::success(message));
}

pub fn print_info(message: &str) {
    println!("{}", OutputStyle::info(message));
}
