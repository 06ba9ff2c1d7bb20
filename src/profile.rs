//! Conversation profiles
//!
//! A profile scopes saved responses and picks the greeting shown before the
//! first turn arrives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name for profiles we do not recognize
pub const FALLBACK_PROFILE_NAME: &str = "AI Assistant";

const KNOWN_PROFILES: [(&str, &str); 6] = [
    ("interview", "Job Interview"),
    ("sales", "Sales Call"),
    ("meeting", "Business Meeting"),
    ("presentation", "Presentation"),
    ("negotiation", "Negotiation"),
    ("exam", "Exam Assistant"),
];

/// Profile identifier as persisted (e.g. `"interview"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(String);

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn display_name(&self) -> &'static str {
        KNOWN_PROFILES
            .iter()
            .find(|(id, _)| *id == self.0)
            .map_or(FALLBACK_PROFILE_NAME, |(_, name)| *name)
    }

    pub fn is_known(&self) -> bool {
        KNOWN_PROFILES.iter().any(|(id, _)| *id == self.0)
    }

    /// Text shown while the stream has no turns yet
    pub fn greeting(&self) -> String {
        format!(
            "I'm your {} assistant. How can I help you today?",
            self.display_name()
        )
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("interview")
    }
}

impl From<&str> for Profile {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
