//! User-favorited responses
//!
//! Stored as a single JSON array under [`SAVED_RESPONSES_KEY`], rewritten on
//! every mutation, insertion order preserved. Entries are unique per
//! `(response, profile)`.

use crate::profile::Profile;
use crate::runtime::KeyValueStore;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const SAVED_RESPONSES_KEY: &str = "savedResponses";

/// A favorited turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResponse {
    pub response: String,
    /// ISO-8601, UTC
    pub timestamp: String,
    pub profile: String,
    pub profile_name: String,
}

impl SavedResponse {
    pub fn new(response: impl Into<String>, profile: &Profile) -> Self {
        Self {
            response: response.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            profile: profile.id().to_string(),
            profile_name: profile.display_name().to_string(),
        }
    }

    pub fn matches(&self, response: &str, profile: &Profile) -> bool {
        self.response == response && self.profile == profile.id()
    }
}

pub struct SavedResponseRepository<K: KeyValueStore> {
    kv: K,
    entries: Vec<SavedResponse>,
}

impl<K: KeyValueStore> SavedResponseRepository<K> {
    /// Load saved responses. A missing or malformed value yields an empty list.
    pub fn load(kv: K) -> Self {
        let entries = match kv.get(SAVED_RESPONSES_KEY) {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring malformed saved responses");
                Vec::new()
            }),
        };
        Self { kv, entries }
    }

    pub fn list(&self) -> &[SavedResponse] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, response: &str, profile: &Profile) -> bool {
        self.entries.iter().any(|s| s.matches(response, profile))
    }

    /// Save `response` under `profile`. Returns the new entry, or `None` if
    /// the pair was already saved.
    pub fn add(&mut self, response: &str, profile: &Profile) -> Option<SavedResponse> {
        if self.contains(response, profile) {
            return None;
        }
        let entry = SavedResponse::new(response, profile);
        self.entries.push(entry.clone());
        self.persist();
        tracing::info!(profile = %profile, count = self.entries.len(), "Saved response");
        Some(entry)
    }

    /// Delete by position. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<SavedResponse> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.persist();
        Some(removed)
    }

    fn persist(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(json) => self.kv.set(SAVED_RESPONSES_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to encode saved responses"),
        }
    }
}
