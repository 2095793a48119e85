//! PrefStore - durable travel preference store
//!
//! Keeps an ordered, deduplicated list of free-text preferences and mirrors it
//! to a flat JSON file after every mutation.
//!
//! # Layout
//!
//! ```text
//! user_preferences.json
//! [
//!   "I prefer nature over museums",
//!   "love hiking"
//! ]
//! ```
//!
//! Persistence is best-effort: a missing or unreadable file loads as an empty
//! store, and a failed write is logged while the in-memory list stays current.
//!
//! # Example
//!
//! ```ignore
//! use prefstore::PreferenceStore;
//!
//! let mut store = PreferenceStore::open("user_preferences.json");
//! store.add("love hiking");
//! assert_eq!(store.all(), vec!["love hiking".to_string()]);
//! ```

mod error;
mod store;

pub use error::PersistenceError;
pub use store::{PreferenceStore, load, save, try_load, try_save};

/// Default preference file name
pub const DEFAULT_FILE_NAME: &str = "user_preferences.json";
