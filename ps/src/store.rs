//! Core PreferenceStore implementation

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::PersistenceError;

/// Read the preference list at `path`
///
/// A missing file yields an empty list. Duplicates are collapsed, keeping the
/// first occurrence.
pub fn try_load(path: impl AsRef<Path>) -> Result<Vec<String>, PersistenceError> {
    let path = path.as_ref();
    debug!(?path, "try_load: called");

    if !path.exists() {
        debug!(?path, "try_load: file absent, starting empty");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<String> = serde_json::from_str(&content).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    let preferences: Vec<String> = entries.into_iter().filter(|p| seen.insert(p.clone())).collect();

    debug!(count = preferences.len(), "try_load: loaded");
    Ok(preferences)
}

/// Write `preferences` to `path`, replacing the whole file
pub fn try_save(path: impl AsRef<Path>, preferences: &[String]) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    debug!(?path, count = preferences.len(), "try_save: called");

    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let content = serde_json::to_string_pretty(preferences).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(io_err)?;
    Ok(())
}

/// Best-effort load: any failure is logged and degrades to an empty list
pub fn load(path: impl AsRef<Path>) -> Vec<String> {
    match try_load(path) {
        Ok(preferences) => preferences,
        Err(e) => {
            warn!(error = %e, "Could not load preferences, starting with an empty set");
            Vec::new()
        }
    }
}

/// Best-effort save: a failure is logged and reported as `false`
pub fn save(path: impl AsRef<Path>, preferences: &[String]) -> bool {
    match try_save(path, preferences) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Could not save preferences, keeping them in memory only");
            false
        }
    }
}

/// Ordered, deduplicated set of preferences backed by a JSON file
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    /// Location of the backing file
    path: PathBuf,
    /// Preferences in insertion order
    preferences: Vec<String>,
}

impl PreferenceStore {
    /// Open the store at `path`, loading whatever is already there
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let preferences = load(&path);
        info!(path = %path.display(), count = preferences.len(), "Opened preference store");
        Self { path, preferences }
    }

    /// Insert a preference unless an identical one exists
    ///
    /// Returns whether the preference was inserted. The file is rewritten on
    /// insertion.
    pub fn add(&mut self, preference: impl Into<String>) -> bool {
        let preference = preference.into();
        debug!(%preference, "PreferenceStore::add: called");

        if self.contains(&preference) {
            debug!("PreferenceStore::add: already present");
            return false;
        }

        self.preferences.push(preference);
        save(&self.path, &self.preferences);
        true
    }

    /// Remove a preference if present
    ///
    /// Returns whether anything was removed. The file is rewritten on removal.
    pub fn remove(&mut self, preference: &str) -> bool {
        debug!(%preference, "PreferenceStore::remove: called");

        let Some(idx) = self.preferences.iter().position(|p| p == preference) else {
            debug!("PreferenceStore::remove: not present");
            return false;
        };

        self.preferences.remove(idx);
        save(&self.path, &self.preferences);
        true
    }

    /// Snapshot of all preferences in insertion order
    pub fn all(&self) -> Vec<String> {
        self.preferences.clone()
    }

    pub fn contains(&self, preference: &str) -> bool {
        self.preferences.iter().any(|p| p == preference)
    }

    pub fn len(&self) -> usize {
        self.preferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
