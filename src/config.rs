//! Environment configuration

use crate::profile::Profile;
use crate::stream::TerminalKeywords;
use crate::typewriter::RevealSettings;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub profile: Profile,
    pub db_path: PathBuf,
    pub terminal_keywords: TerminalKeywords,
    pub reveal: RevealSettings,
}

impl ViewConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let profile = lookup("TURNVIEW_PROFILE")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map_or_else(Profile::default, Profile::new);

        let db_path = lookup("TURNVIEW_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.turnview/turnview.db"))
            },
            PathBuf::from,
        );

        let terminal_keywords = lookup("TURNVIEW_TERMINAL_KEYWORDS")
            .map(|raw| TerminalKeywords::parse(&raw))
            .unwrap_or_default();

        let reveal = match lookup("TURNVIEW_REVEAL").as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("off") => RevealSettings::disabled(),
            _ => RevealSettings::default(),
        };

        Self {
            profile,
            db_path,
            terminal_keywords,
            reveal,
        }
    }
}
