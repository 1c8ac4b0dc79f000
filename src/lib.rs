// src/lib.rs
// Public library surface for the hosting integration layer and tests.
//
// mail-sentinel inspects rendered webmail content and produces a threat
// verdict (safe / threat / error) by merging four detectors (regex patterns,
// a weighted scam lexicon, structural heuristics and an external toxicity
// classifier) into one confidence score, and drives a per-message scan
// lifecycle so each message is analyzed exactly once per generation.
//
// The crate has no process boundary of its own: DOM traversal, banner
// rendering and the classification model live with the host and are injected
// through the traits in `host`.

pub mod config;
pub mod detect;
pub mod engine;
pub mod host;
pub mod scan;
pub mod verdict;

// ---- Re-exports for a stable public API ----
pub use crate::config::ScanConfig;
pub use crate::detect::{HeuristicScorer, KeywordScorer, PatternMatcher, ToxicityAdapter};
pub use crate::engine::{
    aggregate, Engine, HostCapabilities, ANALYSIS_FAILED_REASON, SUSPICIOUS_CONTENT_REASON,
};
pub use crate::host::{
    CategoryScore, ChangeSource, ClassificationCapability, ClassificationModel,
    DisabledClassifier, DynClassifier, DynTextAnalysis, NoopTextAnalysis, Presenter,
    StaticClassifier, Subscription, TextAnalysisCapability, TextSource, TriggerCallback,
};
pub use crate::scan::{ScanCoordinator, ScanRecord};
pub use crate::verdict::{
    LifecycleEvent, MessageId, ScanStatus, SignalResult, SignalSource, TriggerEvent, Verdict,
    VerdictStatus,
};
