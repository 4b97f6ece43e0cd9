// src/services/prompt.rs
use crate::message::{HistoryEntry, Sender};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful study assistant for a full stack web development course. \
Answer the student's question concisely and directly, without unnecessary clarifying questions.";

const NOT_SPECIFIED: &str = "Not specified";

/// Bounds on how much client-supplied history ends up in a prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryLimits {
    pub max_entries: usize,
    pub max_entry_chars: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self { max_entries: 20, max_entry_chars: 2000 }
    }
}

/// Composes the single prompt string sent upstream.
pub fn build_prompt(
    message: &str,
    history: &[HistoryEntry],
    unit: Option<&str>,
    topic: Option<&str>,
    limits: &HistoryLimits,
) -> String {
    let mut prompt = String::from(SYSTEM_INSTRUCTION);

    prompt.push_str("\n\nCurrent unit: ");
    prompt.push_str(or_not_specified(unit));
    prompt.push_str("\nCurrent topic: ");
    prompt.push_str(or_not_specified(topic));

    // A single entry is just the message being asked now.
    if history.len() > 1 {
        let recent = &history[history.len().saturating_sub(limits.max_entries)..];
        if !recent.is_empty() {
            prompt.push_str("\n\nConversation so far:");
            for entry in recent {
                prompt.push('\n');
                prompt.push_str(speaker(entry.sender));
                prompt.push_str(": ");
                prompt.push_str(&truncate_chars(&entry.text, limits.max_entry_chars));
            }
        }
    }

    prompt.push_str("\n\nStudent's new question: ");
    prompt.push_str(message);
    prompt
}

fn speaker(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "Student",
        Sender::Bot => "AI",
    }
}

fn or_not_specified(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(NOT_SPECIFIED)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
