//! ConversationLog - ordered record of the current session
//!
//! The log feeds two things into the pipeline: a rendered chat history for
//! every stage prompt, and preferences the user expressed in passing that have
//! not (yet) been stored durably.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

/// Words that make a turn a preference candidate (matched as substrings)
pub const PREFERENCE_KEYWORDS: [&str; 7] = ["prefer", "like", "love", "enjoy", "hate", "dislike", "preference"];

/// Marker written in front of an explicitly added preference (user side)
pub const USER_PREFERENCE_MARKER: &str = "User preference:";

/// Marker written in front of an acknowledged preference (system side)
pub const PREFERENCE_NOTED_MARKER: &str = "Preference noted:";

/// Who said a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    System,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "User"),
            TurnRole::System => write!(f, "System"),
        }
    }
}

/// One exchange in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

/// Append-only, in-memory session log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the log
    pub fn append(&mut self, role: TurnRole, text: impl Into<String>) {
        let text = text.into();
        debug!(%role, text_len = text.len(), "ConversationLog::append: called");
        self.turns.push(ConversationTurn { role, text });
    }

    pub fn user(&mut self, text: impl Into<String>) {
        self.append(TurnRole::User, text);
    }

    pub fn system(&mut self, text: impl Into<String>) {
        self.append(TurnRole::System, text);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render every turn as `Role: text`, one per line, in order
    pub fn render_history(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.role, t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Preferences expressed in this session that `known` does not already hold
    ///
    /// Keyword matching is case-insensitive substring containment. Results are
    /// deduplicated and keep first-seen order.
    pub fn mine_session_preferences(&self, known: &[String]) -> Vec<String> {
        debug!(turns = self.turns.len(), known = known.len(), "ConversationLog::mine_session_preferences: called");
        let mut seen: HashSet<&str> = known.iter().map(String::as_str).collect();
        let mut mined = Vec::new();

        for turn in &self.turns {
            if !is_candidate(&turn.text) {
                continue;
            }
            let payload = extract_payload(&turn.text);
            if payload.is_empty() {
                continue;
            }
            if seen.insert(payload) {
                mined.push(payload.to_string());
            }
        }

        debug!(mined = mined.len(), "ConversationLog::mine_session_preferences: done");
        mined
    }
}

fn is_candidate(text: &str) -> bool {
    let lowered = text.to_lowercase();
    PREFERENCE_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Text after the last marker, or the whole turn when no marker is present
fn extract_payload(text: &str) -> &str {
    for marker in [USER_PREFERENCE_MARKER, PREFERENCE_NOTED_MARKER] {
        if let Some(idx) = text.rfind(marker) {
            return text[idx + marker.len()..].trim();
        }
    }
    text
}
