//! # Score aggregation & engine assembly
//! Pure, testable logic that maps a set of detector signals → `Verdict`,
//! plus the `Engine` entry point that wires capabilities into a coordinator.
//!
//! Policy: confidence is the arithmetic mean of the numeric signals
//! (toxicity, keyword, heuristic). The pattern signal is a boolean override:
//! a known literal phishing phrase escalates to "threat" no matter how clean
//! the numeric average looks, so it can never be diluted away.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::ScanConfig;
use crate::host::{
    ChangeSource, DynClassifier, DynTextAnalysis, Presenter, Subscription, TextSource,
};
use crate::scan::ScanCoordinator;
use crate::verdict::{SignalResult, SignalSource, Verdict, VerdictStatus};

/// Fixed user-visible reason for a total analysis failure.
pub const ANALYSIS_FAILED_REASON: &str = "Analysis failed due to an unexpected error";

/// Fallback threat reason so a threat banner is never empty.
pub const SUSPICIOUS_CONTENT_REASON: &str =
    "This email contains potentially suspicious content.";

const KEYWORD_REASON: &str = "Multiple scam-related keywords detected";
const HEURISTIC_REASON: &str = "Structural red flags in the message text";

/// Combine detector signals into one verdict.
///
/// Reasons keep a fixed order: toxicity categories first, then the keyword
/// indicator (only above the reason threshold), then the heuristic indicator.
/// If every signal errored the verdict is `Error` with a fixed reason.
pub fn aggregate(signals: &[SignalResult], cfg: &ScanConfig) -> Verdict {
    if !signals.is_empty() && signals.iter().all(|s| s.errored()) {
        return Verdict::new(VerdictStatus::Error, 0).with_reason(ANALYSIS_FAILED_REASON);
    }

    let find = |source: SignalSource| signals.iter().find(|s| s.source == source);

    let pattern_fired = find(SignalSource::Pattern)
        .map(|s| s.fired())
        .unwrap_or(false);
    let keyword = find(SignalSource::Keyword).map(|s| s.score).unwrap_or(0.0);
    let heuristic = find(SignalSource::Heuristic)
        .map(|s| s.score)
        .unwrap_or(0.0);
    let toxicity = find(SignalSource::Toxicity);
    let toxicity_score = toxicity.map(|s| s.score).unwrap_or(0.0);

    // Mean over the numeric contributions; the pattern bool stays outside.
    let contributions = [toxicity_score, keyword, heuristic];
    let confidence = contributions.iter().sum::<f32>() / contributions.len() as f32;
    let confidence_percent = (confidence * 100.0).round() as u8;

    let status = if confidence_percent > cfg.threat_percent || pattern_fired {
        VerdictStatus::Threat
    } else {
        VerdictStatus::Safe
    };

    let mut reasons: Vec<String> = Vec::new();
    if let Some(tox) = toxicity {
        reasons.extend(tox.reasons.iter().cloned());
    }
    if keyword > cfg.signal_reason_threshold {
        reasons.push(KEYWORD_REASON.to_string());
    }
    if heuristic > cfg.signal_reason_threshold {
        reasons.push(HEURISTIC_REASON.to_string());
    }
    if status == VerdictStatus::Threat && reasons.is_empty() {
        reasons.push(SUSPICIOUS_CONTENT_REASON.to_string());
    }

    Verdict {
        status,
        confidence_percent,
        reasons,
    }
}

/// All capabilities the engine consumes from its host.
#[derive(Clone)]
pub struct HostCapabilities {
    pub text_source: Arc<dyn TextSource>,
    pub presenter: Arc<dyn Presenter>,
    pub classifier: DynClassifier,
    pub text_analysis: DynTextAnalysis,
}

/// Top-level handle: validates the host, owns the coordinator, and optionally
/// holds the live trigger subscription.
pub struct Engine {
    coordinator: Arc<ScanCoordinator>,
    // Held for its Drop side effect: dropping the engine unsubscribes.
    _subscription: Option<Box<dyn Subscription>>,
}

impl Engine {
    /// Build the engine. Fails once, before any scanning, when the host
    /// environment is unsupported; the engine then stays inert.
    pub fn new(host: HostCapabilities, config: ScanConfig) -> Result<Self> {
        if !host.text_source.host_supported() {
            anyhow::bail!("unsupported host environment, scanner stays inert");
        }
        info!("mail-sentinel engine initialized");
        let coordinator = Arc::new(ScanCoordinator::new(host, config));
        Ok(Self {
            coordinator,
            _subscription: None,
        })
    }

    /// Wire a trigger stream into the coordinator. The returned guard lives
    /// inside the engine; dropping the engine unsubscribes.
    pub fn attach(&mut self, change_source: &dyn ChangeSource) {
        let coordinator = Arc::clone(&self.coordinator);
        self._subscription = Some(
            change_source.subscribe(Box::new(move |event| coordinator.notify_trigger(event))),
        );
    }

    pub fn coordinator(&self) -> &Arc<ScanCoordinator> {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScanConfig {
        ScanConfig::default()
    }

    fn pattern(fired: bool) -> SignalResult {
        SignalResult::ok(SignalSource::Pattern, if fired { 1.0 } else { 0.0 })
    }
    fn keyword(score: f32) -> SignalResult {
        SignalResult::ok(SignalSource::Keyword, score)
    }
    fn heuristic(score: f32) -> SignalResult {
        SignalResult::ok(SignalSource::Heuristic, score)
    }
    fn toxicity(score: f32, reasons: &[&str]) -> SignalResult {
        SignalResult::ok(SignalSource::Toxicity, score)
            .with_reasons(reasons.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn all_quiet_is_safe_with_zero_confidence() {
        let v = aggregate(
            &[
                pattern(false),
                keyword(0.0),
                heuristic(0.0),
                toxicity(0.0, &[]),
            ],
            &cfg(),
        );
        assert_eq!(v.status, VerdictStatus::Safe);
        assert_eq!(v.confidence_percent, 0);
        assert!(v.reasons.is_empty());
    }

    #[test]
    fn pattern_match_overrides_clean_average() {
        let v = aggregate(
            &[
                pattern(true),
                keyword(0.0),
                heuristic(0.0),
                toxicity(0.0, &[]),
            ],
            &cfg(),
        );
        assert_eq!(v.status, VerdictStatus::Threat);
        assert_eq!(v.confidence_percent, 0);
        // Threat banner must never be empty.
        assert_eq!(v.reasons, vec![SUSPICIOUS_CONTENT_REASON.to_string()]);
    }

    #[test]
    fn numeric_mean_above_threshold_escalates() {
        // mean(0.0, 0.6, 0.0) = 0.2 → 20% > 10%
        let v = aggregate(
            &[
                pattern(false),
                keyword(0.6),
                heuristic(0.0),
                toxicity(0.0, &[]),
            ],
            &cfg(),
        );
        assert_eq!(v.status, VerdictStatus::Threat);
        assert_eq!(v.confidence_percent, 20);
        assert_eq!(v.reasons, vec![KEYWORD_REASON.to_string()]);
    }

    #[test]
    fn borderline_mean_stays_safe() {
        // mean(0.0, 0.3, 0.0) = 0.1 → exactly 10%, not above the threshold
        let v = aggregate(
            &[
                pattern(false),
                keyword(0.3),
                heuristic(0.0),
                toxicity(0.0, &[]),
            ],
            &cfg(),
        );
        assert_eq!(v.status, VerdictStatus::Safe);
        assert_eq!(v.confidence_percent, 10);
    }

    #[test]
    fn reasons_keep_fixed_order() {
        let v = aggregate(
            &[
                pattern(false),
                keyword(0.8),
                heuristic(0.7),
                toxicity(0.9, &["threat (90% confidence)"]),
            ],
            &cfg(),
        );
        assert_eq!(v.status, VerdictStatus::Threat);
        assert_eq!(
            v.reasons,
            vec![
                "threat (90% confidence)".to_string(),
                KEYWORD_REASON.to_string(),
                HEURISTIC_REASON.to_string(),
            ]
        );
    }

    #[test]
    fn low_signals_get_no_reason_lines() {
        let v = aggregate(
            &[
                pattern(false),
                keyword(0.4),
                heuristic(0.4),
                toxicity(0.0, &[]),
            ],
            &cfg(),
        );
        // 0.4 is below the 0.5 reason threshold; the verdict is still threat.
        assert_eq!(v.status, VerdictStatus::Threat);
        assert_eq!(v.reasons, vec![SUSPICIOUS_CONTENT_REASON.to_string()]);
    }

    #[test]
    fn failed_toxicity_is_fail_open() {
        let v = aggregate(
            &[
                pattern(false),
                keyword(0.2),
                heuristic(0.0),
                SignalResult::failed(SignalSource::Toxicity, "model offline"),
            ],
            &cfg(),
        );
        // Still a valid verdict computed from the remaining signals.
        assert_ne!(v.status, VerdictStatus::Error);
        assert_eq!(v.confidence_percent, 7); // mean(0, 0.2, 0) ≈ 6.7 → 7
    }

    #[test]
    fn all_signals_failing_is_a_total_failure() {
        let signals: Vec<SignalResult> = [
            SignalSource::Pattern,
            SignalSource::Keyword,
            SignalSource::Heuristic,
            SignalSource::Toxicity,
        ]
        .into_iter()
        .map(|s| SignalResult::failed(s, "down"))
        .collect();

        let v = aggregate(&signals, &cfg());
        assert_eq!(v.status, VerdictStatus::Error);
        assert_eq!(v.confidence_percent, 0);
        assert_eq!(v.reasons, vec![ANALYSIS_FAILED_REASON.to_string()]);
    }
}
