//! Regex detector over known phishing/urgency phrasing.
//!
//! Cheapest signal in the suite: a fixed ordered set of case-insensitive
//! patterns, short-circuiting on the first hit. Deterministic, no failure
//! mode; a malformed pattern is a construction-time error.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered from most to least commonly observed phrasing.
const SUSPICIOUS_PATTERNS: &[&str] = &[
    r"\[WARNING\]",
    r"urgent.*action.*required",
    r"password.*expired",
    r"account.*suspended",
    r"verify.*account.*immediately",
    r"unusual.*activity",
    r"security.*alert",
];

static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
    SUSPICIOUS_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid suspicious pattern"))
        .collect()
});

#[derive(Debug, Clone, Default)]
pub struct PatternMatcher;

impl PatternMatcher {
    pub fn new() -> Self {
        Self
    }

    /// True if any known phishing phrase occurs in `text`.
    pub fn matches(&self, text: &str) -> bool {
        COMPILED.iter().any(|re| re.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_phrases_fire() {
        let m = PatternMatcher::new();
        assert!(m.matches("Your account has been suspended."));
        assert!(m.matches("URGENT: immediate action is required"));
        assert!(m.matches("your password has expired, renew now"));
        assert!(m.matches("please verify your account immediately"));
        assert!(m.matches("we noticed unusual sign-in activity"));
        assert!(m.matches("Security incident alert for your org"));
        assert!(m.matches("[WARNING] do not ignore this"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let m = PatternMatcher::new();
        assert!(m.matches("ACCOUNT temporarily SUSPENDED"));
        assert!(m.matches("[warning] heads up"));
    }

    #[test]
    fn clean_text_does_not_fire() {
        let m = PatternMatcher::new();
        assert!(!m.matches("Hi Alice, let's meet for coffee tomorrow at 10am."));
        assert!(!m.matches(""));
    }
}
