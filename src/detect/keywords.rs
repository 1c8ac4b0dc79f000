//! Weighted lexicon scorer.
//!
//! The lexicon (`scam_lexicon.json`, compiled in) groups a few hundred terms
//! by scam category. Scoring is a case-insensitive substring containment test
//! per term: each hit adds a fixed increment and the total is clamped to 1.0.
//! Frequency-weighted rather than binary so that multiple independent
//! indicators push confidence up monotonically, while the clamp keeps the
//! score on the [0,1] scale and every triggered term stays attributable.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::config::ScanConfig;

static LEXICON: Lazy<HashMap<String, Vec<String>>> = Lazy::new(|| {
    let raw = include_str!("../../scam_lexicon.json");
    let parsed: HashMap<String, Vec<String>> =
        serde_json::from_str(raw).expect("valid scam lexicon");
    // Lowercase once at load; scoring lowercases the haystack only.
    parsed
        .into_iter()
        .map(|(cat, terms)| {
            (
                cat,
                terms.into_iter().map(|t| t.to_lowercase()).collect(),
            )
        })
        .collect()
});

#[derive(Debug, Clone, Default)]
pub struct KeywordScorer;

impl KeywordScorer {
    pub fn new() -> Self {
        Self
    }

    /// Matched `(category, term)` pairs for `text`.
    pub fn hits(&self, text: &str) -> Vec<(&'static str, &'static str)> {
        if text.is_empty() {
            return Vec::new();
        }
        let haystack = text.to_lowercase();
        let mut hits = Vec::new();
        for (category, terms) in LEXICON.iter() {
            for term in terms {
                if haystack.contains(term.as_str()) {
                    hits.push((category.as_str(), term.as_str()));
                }
            }
        }
        hits
    }

    /// Score in [0,1]: one fixed increment per matched term, clamped.
    pub fn score(&self, text: &str, cfg: &ScanConfig) -> f32 {
        let hits = self.hits(text).len() as f32;
        (hits * cfg.keyword_hit_weight).min(1.0)
    }
}
