//! Structural/linguistic heuristics.
//!
//! Three independent boolean sub-signals, each with a fixed weight:
//! - personal names present (delegated to the host's text-analysis capability)
//! - repeated `!`/`$`/`%` punctuation
//! - suspicious short-domain tokens (`free.xyz`-shaped)
//!
//! The weights of whichever fire are summed and clamped to 1.0. A failing
//! text-analysis call degrades only the name sub-signal to false; it is never
//! propagated as a scan failure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ScanConfig;
use crate::host::TextAnalysisCapability;
use crate::verdict::clamp01;

static REPEATED_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!$%]{2,}").expect("valid punctuation pattern"));

/// Short label glued to a cheap throwaway TLD, the classic lure-link shape.
static SHORT_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z0-9-]{1,6}\.(xyz|top|club|online|site|icu|rest|info)\b")
        .expect("valid domain pattern")
});

#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score in [0,1] for `text`, consulting `nlp` for name presence.
    pub async fn score(
        &self,
        text: &str,
        nlp: &dyn TextAnalysisCapability,
        cfg: &ScanConfig,
    ) -> f32 {
        let has_names = match nlp.detect_person_names(text).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "name detection unavailable, sub-signal degraded");
                false
            }
        };

        let mut score = 0.0f32;
        if has_names {
            score += cfg.weight_person_names;
        }
        if REPEATED_PUNCT.is_match(text) {
            score += cfg.weight_punctuation;
        }
        if SHORT_DOMAIN.is_match(text) {
            score += cfg.weight_domain;
        }
        clamp01(score)
    }
}
