use study_chat_backend::message::{HistoryEntry, Sender};
use study_chat_backend::services::prompt::{HistoryLimits, SYSTEM_INSTRUCTION, build_prompt};

fn turn(sender: Sender, text: &str) -> HistoryEntry {
    HistoryEntry { sender, text: text.to_string() }
}

#[test]
fn test_single_entry_history_is_omitted() {
    let history = vec![turn(Sender::User, "hi")];
    let prompt = build_prompt("hi", &history, None, None, &HistoryLimits::default());

    assert!(!prompt.contains("Student: hi"));
    assert!(!prompt.contains("Conversation so far"));
}

#[test]
fn test_empty_history_is_omitted() {
    let prompt = build_prompt("hi", &[], None, None, &HistoryLimits::default());
    assert!(!prompt.contains("Conversation so far"));
}

#[test]
fn test_history_keeps_original_order() {
    let history = vec![turn(Sender::User, "hi"), turn(Sender::Bot, "hello")];
    let prompt = build_prompt("how are you?", &history, None, None, &HistoryLimits::default());

    let student = prompt.find("Student: hi").unwrap();
    let ai = prompt.find("AI: hello").unwrap();
    assert!(student < ai);
}

#[test]
fn test_missing_context_renders_not_specified() {
    let prompt = build_prompt("q", &[], None, Some("  "), &HistoryLimits::default());

    assert!(prompt.contains("Current unit: Not specified"));
    assert!(prompt.contains("Current topic: Not specified"));
}

#[test]
fn test_prompt_layout() {
    let prompt = build_prompt("What is a closure?", &[], Some("unit2"), Some("Functions"), &HistoryLimits::default());

    assert!(prompt.starts_with(SYSTEM_INSTRUCTION));
    assert!(SYSTEM_INSTRUCTION.contains("concisely"));
    assert!(SYSTEM_INSTRUCTION.contains("without unnecessary clarifying questions"));
    assert!(prompt.contains("Current unit: unit2\nCurrent topic: Functions"));
    assert!(prompt.ends_with("Student's new question: What is a closure?"));
}

#[test]
fn test_long_history_entries_are_truncated() {
    let long = "x".repeat(50);
    let history = vec![turn(Sender::User, &long), turn(Sender::Bot, "short")];
    let limits = HistoryLimits { max_entries: 10, max_entry_chars: 10 };

    let prompt = build_prompt("q", &history, None, None, &limits);

    assert!(prompt.contains(&format!("Student: {}...", "x".repeat(10))));
    assert!(!prompt.contains(&long));
}
