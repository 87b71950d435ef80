pub mod account;
pub mod chat;
pub mod configure;
pub mod history;
pub mod knowledge;
pub mod market;
