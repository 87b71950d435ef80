//! Core data structures for accounts and conversations
//!
//! This module contains the fundamental data structures used throughout
//! the stockchat application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown chat role '{}'", other)),
        }
    }
}

/// A single turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: None,
        }
    }
}

/// Raw registration input, checked before it reaches the user store
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub confirm: String,
}

/// Why a registration form was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationIssue {
    MissingFields,
    PasswordMismatch,
    UsernameTaken,
}

impl fmt::Display for RegistrationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationIssue::MissingFields => f.write_str("Please fill in all fields."),
            RegistrationIssue::PasswordMismatch => f.write_str("Passwords don’t match."),
            RegistrationIssue::UsernameTaken => f.write_str("Username already exists."),
        }
    }
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), RegistrationIssue> {
        let required = [&self.username, &self.email, &self.full_name, &self.password];
        if required.iter().any(|field| field.is_empty()) {
            return Err(RegistrationIssue::MissingFields);
        }
        if self.password != self.confirm {
            return Err(RegistrationIssue::PasswordMismatch);
        }
        Ok(())
    }
}
