// src/message.rs
use serde::{Deserialize, Serialize};

/// Who wrote a history entry. Anything other than `"user"` is the bot's turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Sender {
    User,
    #[default]
    Bot,
}

impl From<String> for Sender {
    fn from(raw: String) -> Self {
        if raw == "user" { Sender::User } else { Sender::Bot }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub text: String,
}

/// Inbound body of `POST /api/chat`. Everything the bot knows about the
/// conversation arrives here; nothing is kept between requests.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

impl ChatRequest {
    /// The message as sent, or `None` when it is missing or blank.
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
