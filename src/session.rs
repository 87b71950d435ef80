//! A user's chat session: login state, in-memory transcript and persistence.

use crate::core::data::{ChatMessage, RegistrationForm, RegistrationIssue, Role};
use crate::core::traits::{ChatStore, UserStore};
use crate::router::Router;
use crate::utils::error::{AppError, AppResult};
use std::sync::Arc;

pub const REGISTERED: &str = "Registered – please log in.";
pub const INVALID_LOGIN: &str = "Invalid username or password.";

/// Validate `form` and create the account; the inner error is for the user to fix
pub fn register<U: UserStore>(
    users: &U,
    form: &RegistrationForm,
) -> AppResult<Result<(), RegistrationIssue>> {
    if let Err(issue) = form.validate() {
        return Ok(Err(issue));
    }

    let created = users.register_user(&form.username, &form.email, &form.full_name, &form.password)?;

    Ok(if created {
        tracing::info!(username = %form.username, "registered");
        Ok(())
    } else {
        Err(RegistrationIssue::UsernameTaken)
    })
}

pub struct ChatSession<U, C> {
    users: U,
    chats: C,
    router: Arc<Router>,
    history_limit: usize,
    username: Option<String>,
    messages: Vec<ChatMessage>,
}

impl<U: UserStore, C: ChatStore> ChatSession<U, C> {
    pub fn new(users: U, chats: C, router: Arc<Router>, history_limit: usize) -> Self {
        Self {
            users,
            chats,
            router,
            history_limit,
            username: None,
            messages: Vec::new(),
        }
    }

    pub fn register(&self, form: &RegistrationForm) -> AppResult<Result<(), RegistrationIssue>> {
        register(&self.users, form)
    }

    /// Log in and restore the stored conversation; `Ok(false)` on bad credentials
    pub fn login(&mut self, username: &str, password: &str) -> AppResult<bool> {
        if !self.users.verify_login(username, password)? {
            tracing::info!(username, "failed login");
            return Ok(false);
        }

        self.messages = self.chats.fetch_chat(username, self.history_limit)?;
        self.username = Some(username.to_string());
        tracing::info!(username, restored = self.messages.len(), "logged in");
        Ok(true)
    }

    pub fn logout(&mut self) {
        if let Some(username) = self.username.take() {
            tracing::info!(%username, "logged out");
        }
        self.messages.clear();
    }

    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Full name when one was registered, otherwise the username
    pub fn display_name(&self) -> AppResult<String> {
        let username = self.require_user()?;
        let full_name = self.users.get_full_name(username)?;
        Ok(if full_name.is_empty() {
            username.to_string()
        } else {
            full_name
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    fn require_user(&self) -> AppResult<&str> {
        self.username
            .as_deref()
            .ok_or_else(|| AppError::Auth("Please log in first.".to_string()))
    }

    /// Record the question, answer it and record the answer
    pub async fn submit(&mut self, query: &str) -> AppResult<String> {
        let username = self.require_user()?.to_string();
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::System("Question cannot be empty".to_string()));
        }

        self.messages.push(ChatMessage::new(Role::User, query));
        self.chats.save_chat(&username, Role::User, query)?;

        let answer = self.router.route_query(query).await;

        self.messages.push(ChatMessage::new(Role::Assistant, answer.clone()));
        self.chats.save_chat(&username, Role::Assistant, &answer)?;

        Ok(answer)
    }

    pub fn clear_history(&mut self) -> AppResult<usize> {
        let username = self.require_user()?.to_string();
        self.messages.clear();
        self.chats.clear_chat(&username)
    }
}
