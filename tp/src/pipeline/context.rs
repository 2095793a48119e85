//! Per-stage context bundles

use serde::Serialize;
use tracing::debug;

use super::Stage;
use crate::conversation::ConversationLog;

/// Separator between preferences in the combined preference text
pub const PREFERENCE_SEPARATOR: &str = " | ";

/// Combined preference text when nothing is stored or mined
pub const NO_PREFERENCES: &str = "No specific preferences stored yet.";

/// Join preferences into the single string the prompts receive
pub fn combine_preferences(preferences: &[String]) -> String {
    if preferences.is_empty() {
        NO_PREFERENCES.to_string()
    } else {
        preferences.join(PREFERENCE_SEPARATOR)
    }
}

/// Everything a generation backend receives for one stage call
///
/// Serializes to a flat map of the variant's fields, which is what the stage
/// templates render against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StageContext {
    Outline {
        destination: String,
        duration_days: u32,
        preferences: String,
        chat_history: String,
    },
    Itinerary {
        destination: String,
        outline: String,
        preferences: String,
        chat_history: String,
    },
    /// Packing works from the itinerary alone, never the raw preferences
    Packing {
        destination: String,
        itinerary: String,
        chat_history: String,
    },
}

impl StageContext {
    pub fn stage(&self) -> Stage {
        match self {
            StageContext::Outline { .. } => Stage::Outline,
            StageContext::Itinerary { .. } => Stage::Itinerary,
            StageContext::Packing { .. } => Stage::Packing,
        }
    }

    pub fn destination(&self) -> &str {
        match self {
            StageContext::Outline { destination, .. }
            | StageContext::Itinerary { destination, .. }
            | StageContext::Packing { destination, .. } => destination,
        }
    }

    /// Combined preference text, absent for the packing stage
    pub fn preferences(&self) -> Option<&str> {
        match self {
            StageContext::Outline { preferences, .. } | StageContext::Itinerary { preferences, .. } => {
                Some(preferences)
            }
            StageContext::Packing { .. } => None,
        }
    }

    /// Output of the previous stage, absent for the first stage
    pub fn previous_output(&self) -> Option<&str> {
        match self {
            StageContext::Outline { .. } => None,
            StageContext::Itinerary { outline, .. } => Some(outline),
            StageContext::Packing { itinerary, .. } => Some(itinerary),
        }
    }
}

/// Snapshot of session state shared by the three stages of one run
#[derive(Debug, Clone)]
pub struct StageContextBuilder {
    preferences: String,
    chat_history: String,
}

impl StageContextBuilder {
    /// Capture the combined preferences and rendered history once per run
    pub fn new(preferences: &[String], log: &ConversationLog) -> Self {
        debug!(preferences = preferences.len(), turns = log.len(), "StageContextBuilder::new: called");
        Self {
            preferences: combine_preferences(preferences),
            chat_history: log.render_history(),
        }
    }

    pub fn outline(&self, destination: &str, duration_days: u32) -> StageContext {
        StageContext::Outline {
            destination: destination.to_string(),
            duration_days,
            preferences: self.preferences.clone(),
            chat_history: self.chat_history.clone(),
        }
    }

    pub fn itinerary(&self, destination: &str, outline: &str) -> StageContext {
        StageContext::Itinerary {
            destination: destination.to_string(),
            outline: outline.to_string(),
            preferences: self.preferences.clone(),
            chat_history: self.chat_history.clone(),
        }
    }

    pub fn packing(&self, destination: &str, itinerary: &str) -> StageContext {
        StageContext::Packing {
            destination: destination.to_string(),
            itinerary: itinerary.to_string(),
            chat_history: self.chat_history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_preferences() {
        assert_eq!(combine_preferences(&[]), NO_PREFERENCES);
        assert_eq!(
            combine_preferences(&["beaches".to_string(), "no museums".to_string()]),
            "beaches | no museums"
        );
    }

    #[test]
    fn test_builder_shares_snapshot_across_stages() {
        let mut log = ConversationLog::new();
        log.user("hello");
        let builder = StageContextBuilder::new(&["love hiking".to_string()], &log);

        let outline = builder.outline("Peru", 5);
        assert_eq!(outline.stage(), Stage::Outline);
        assert_eq!(outline.preferences(), Some("love hiking"));
        assert_eq!(outline.previous_output(), None);

        let itinerary = builder.itinerary("Peru", "O");
        assert_eq!(itinerary.stage(), Stage::Itinerary);
        assert_eq!(itinerary.preferences(), Some("love hiking"));
        assert_eq!(itinerary.previous_output(), Some("O"));

        let packing = builder.packing("Peru", "D");
        assert_eq!(packing.stage(), Stage::Packing);
        assert_eq!(packing.destination(), "Peru");
        assert_eq!(packing.preferences(), None);
        assert_eq!(packing.previous_output(), Some("D"));
    }

    #[test]
    fn test_context_serializes_flat() {
        let builder = StageContextBuilder::new(&[], &ConversationLog::new());
        let value = serde_json::to_value(builder.packing("Peru", "D")).unwrap();

        assert_eq!(value["destination"], "Peru");
        assert_eq!(value["itinerary"], "D");
        assert_eq!(value["chat_history"], "");
        assert!(value.get("preferences").is_none());
    }
}
