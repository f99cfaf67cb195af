//! Keyword intent matching

/// Label returned when nothing matches
pub const UNKNOWN_INTENT: &str = "unknown_intent";

/// Keyword rules in priority order; the first substring hit wins
pub const KEYWORD_RULES: &[(&str, &str)] = &[
    ("weather", "get_weather"),
    ("time", "get_time"),
    ("joke", "tell_joke"),
];

/// Classify `text` by case-insensitive substring match against [`KEYWORD_RULES`]
///
/// Matching ignores word boundaries, so "sometimes" resolves to `get_time`.
#[must_use]
pub fn match_keywords(text: &str) -> &'static str {
    let normalized = text.to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map_or(UNKNOWN_INTENT, |&(_, label)| label)
}
