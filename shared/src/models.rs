//! Wire shapes for the chat endpoint.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Inbound chat request payload.
///
/// `message` defaults to empty so an absent field reaches validation instead
/// of failing the parse.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// One prior conversation turn as supplied by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Outbound chat reply payload.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    /// Reply produced by the model.
    pub fn success(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            timestamp: Utc::now().to_rfc3339(),
            error: None,
        }
    }

    /// Canned reply masking an upstream failure; the diagnostic rides along.
    pub fn degraded(reply: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            timestamp: Utc::now().to_rfc3339(),
            error: Some(error.into()),
        }
    }
}
