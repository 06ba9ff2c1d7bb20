//! Filler fragment detection
//!
//! Short acknowledging utterances ("okay", "hmm") must not be merged into an
//! in-progress answer. The heuristic is substring based and deliberately
//! loose: a short substantive reply such as "No." is not filler, while any
//! phrase under the length limit that merely contains "okay" is.

/// Fragments at or above this many characters are never filler
pub const FILLER_MAX_LEN: usize = 30;

/// Lower-case tokens that mark a short fragment as filler
pub const FILLER_TOKENS: [&str; 5] = ["hmm", "okay", "next", "go on", "continue"];

/// Bare acknowledgements that only count as filler when they are the whole
/// fragment ("ok" as a substring would match "book", "look", ...)
pub const FILLER_WORDS: [&str; 1] = ["ok"];

/// Returns true if `text` is short conversational filler
pub fn is_filler(text: &str) -> bool {
    if text.chars().count() >= FILLER_MAX_LEN {
        return false;
    }
    let lowered = text.to_lowercase();
    if FILLER_TOKENS.iter().any(|token| lowered.contains(token)) {
        return true;
    }
    let bare = lowered.trim().trim_end_matches(|c: char| c.is_ascii_punctuation());
    FILLER_WORDS.contains(&bare)
}
