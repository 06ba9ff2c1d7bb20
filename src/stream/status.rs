//! Backend status tracking

/// Status substrings that signal the current turn is finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalKeywords(Vec<String>);

pub const DEFAULT_TERMINAL_KEYWORDS: [&str; 3] = ["Ready", "Listening", "Error"];

impl Default for TerminalKeywords {
    fn default() -> Self {
        Self(DEFAULT_TERMINAL_KEYWORDS.iter().map(ToString::to_string).collect())
    }
}

impl TerminalKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            keywords
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated list, falling back to the defaults when the
    /// list has no usable entries
    pub fn parse(list: &str) -> Self {
        let parsed = Self::new(list.split(',').map(str::trim));
        if parsed.0.is_empty() {
            Self::default()
        } else {
            parsed
        }
    }

    /// Case-sensitive substring match against any keyword
    pub fn matches(&self, status: &str) -> bool {
        self.0.iter().any(|k| status.contains(k.as_str()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
