//! verdict.rs: core data model for verdicts, signals and the scan lifecycle.
//!
//! Everything here is a plain serde-serializable value. The shapes are what the
//! hosting integration layer sees: `Verdict` is the per-scan output, and
//! `LifecycleEvent` is what the `Presenter` renders as a banner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final status of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Safe,
    Threat,
    Error,
}

/// Status/confidence/reasons triple produced for one scan.
/// Derived per session; never persisted beyond the current `ScanRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    /// Confidence in percent, 0..=100.
    #[serde(rename = "confidencePercent")]
    pub confidence_percent: u8,
    /// Human-readable reasons, most significant first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn new(status: VerdictStatus, confidence_percent: u8) -> Self {
        Self {
            status,
            confidence_percent: confidence_percent.min(100),
            reasons: Vec::new(),
        }
    }

    pub fn safe(confidence_percent: u8) -> Self {
        Self::new(VerdictStatus::Safe, confidence_percent)
    }

    pub fn threat(confidence_percent: u8) -> Self {
        Self::new(VerdictStatus::Threat, confidence_percent)
    }

    /// Adds one reason (builder style).
    pub fn with_reason(mut self, message: impl Into<String>) -> Self {
        self.reasons.push(message.into());
        self
    }
}

/// Which detector produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Pattern,
    Keyword,
    Heuristic,
    Toxicity,
}

/// One detector's independent contribution to the aggregate score.
///
/// Produced once per scan by each detector and consumed by the aggregation
/// call that requested it. `score` is in [0,1]; the pattern detector only ever
/// emits 0 or 1. A failed detector records `error` and a neutral score of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub source: SignalSource,
    pub score: f32,
    /// Short diagnostic label (e.g. lexicon hit count); not user-facing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// User-facing reasons contributed by this signal (toxicity categories).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SignalResult {
    pub fn ok(source: SignalSource, score: f32) -> Self {
        Self {
            source,
            score: clamp01(score),
            label: None,
            reasons: Vec::new(),
            error: None,
        }
    }

    /// A signal whose detector failed; contributes a neutral zero score.
    pub fn failed(source: SignalSource, error: impl Into<String>) -> Self {
        Self {
            source,
            score: 0.0,
            label: None,
            reasons: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_reasons(mut self, reasons: Vec<String>) -> Self {
        self.reasons = reasons;
        self
    }

    pub fn errored(&self) -> bool {
        self.error.is_some()
    }

    /// True for a boolean signal that fired (pattern match).
    pub fn fired(&self) -> bool {
        self.score >= 1.0
    }
}

/// Stable identity of the currently displayed message.
///
/// Opaque to the engine; the host derives it from whatever anchor the webmail
/// UI exposes. Used as the dedup/idempotency key for the scan table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Why a scan was requested. Ephemeral; consumed by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// First scan after the host page finished loading.
    InitialLoad,
    /// The observed document tree mutated (fires far more often than the
    /// message actually changes).
    DomMutation,
    /// SPA navigation changed the displayed message.
    NavigationChange,
    /// Explicit user request; forces a re-scan even when already resolved.
    ManualRequest,
}

impl TriggerEvent {
    pub fn is_manual(&self) -> bool {
        matches!(self, TriggerEvent::ManualRequest)
    }
}

/// Per-message scan state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Unscanned,
    Pending,
    Resolved,
    Failed,
}

/// Lifecycle event emitted to the `Presenter`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// Analysis started; show a progress state.
    Loading,
    /// Analysis finished with a verdict.
    Resolved { verdict: Verdict },
    /// Analysis failed terminally for this generation.
    Failed { reason: String },
}

impl LifecycleEvent {
    /// Terminal events end a generation's lifecycle; `Loading` does not.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LifecycleEvent::Loading)
    }
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_verdict_shape() {
        let v = Verdict::threat(42)
            .with_reason("Identity theft (85% confidence)")
            .with_reason("Multiple scam-related keywords detected");

        let j = serde_json::to_value(&v).unwrap();
        assert_eq!(j["status"], json!("threat"));
        assert_eq!(j["confidencePercent"], json!(42));
        assert_eq!(j["reasons"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn serialize_lifecycle_events_are_tagged() {
        let loading = serde_json::to_value(LifecycleEvent::Loading).unwrap();
        assert_eq!(loading["status"], json!("loading"));

        let resolved = serde_json::to_value(LifecycleEvent::Resolved {
            verdict: Verdict::safe(0),
        })
        .unwrap();
        assert_eq!(resolved["status"], json!("resolved"));
        assert_eq!(resolved["verdict"]["status"], json!("safe"));

        let failed = serde_json::to_value(LifecycleEvent::Failed {
            reason: "boom".into(),
        })
        .unwrap();
        assert_eq!(failed["status"], json!("failed"));
        assert_eq!(failed["reason"], json!("boom"));
    }

    #[test]
    fn confidence_is_capped_at_100() {
        let v = Verdict::new(VerdictStatus::Threat, 250);
        assert_eq!(v.confidence_percent, 100);
    }

    #[test]
    fn failed_signal_is_neutral() {
        let s = SignalResult::failed(SignalSource::Toxicity, "model load timed out");
        assert!(s.errored());
        assert_eq!(s.score, 0.0);
        assert!(s.reasons.is_empty());
    }
}
