//! Core business logic layer
//!
//! This module contains the fundamental data structures and storage traits
//! that the chat session is built on.

pub mod data;
pub mod traits;
