//! Shared library for the portfolio chat Lambda.
//!
//! This crate provides the configuration, error types, HTTP helpers, and
//! clients used by the chat function.

pub mod config;
pub mod conversation;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod http;
pub mod knowledge;
pub mod models;

pub use config::{Config, FailurePolicy, KnowledgeSource};
pub use error::{Error, Result};
pub use gemini::GeminiClient;
pub use knowledge::{HttpFetcher, KnowledgeProvider, KnowledgeText};
pub use models::{ChatReply, ChatRequest, HistoryEntry};
