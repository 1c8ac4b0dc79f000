//! Scan coordinator: the per-message lifecycle state machine.
//!
//! Triggers arrive from a live, asynchronously mutating document and fire far
//! more often than the displayed message actually changes. The coordinator
//! gates them so each message is analyzed exactly once per generation:
//!
//! `Unscanned → Pending → {Resolved, Failed}`
//!
//! Gating happens synchronously on trigger receipt; the analysis itself runs
//! on a spawned task with all four detectors dispatched concurrently. The
//! external model call cannot be cancelled, so supersession is handled by
//! version-stamping: every Pending cycle gets a fresh generation, and a
//! completing scan re-checks its generation before emitting. A stale result
//! is discarded silently; that is the designed outcome, not a failure.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::detect::{HeuristicScorer, KeywordScorer, PatternMatcher, ToxicityAdapter};
use crate::engine::{aggregate, HostCapabilities, ANALYSIS_FAILED_REASON};
use crate::verdict::{
    LifecycleEvent, MessageId, ScanStatus, SignalResult, SignalSource, TriggerEvent, Verdict,
    VerdictStatus,
};

/// Scan state for one message, keyed by `MessageId` in the coordinator table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub message_id: MessageId,
    pub status: ScanStatus,
    pub last_verdict: Option<Verdict>,
    /// Generation that produced (or is producing) this record's state.
    pub generation: u64,
}

#[derive(Default)]
struct CoordinatorState {
    records: HashMap<MessageId, ScanRecord>,
    /// The message currently displayed, as of the last accepted trigger.
    current: Option<MessageId>,
    /// Monotonic counter; bumped whenever a new Pending cycle starts.
    generation: u64,
}

pub struct ScanCoordinator {
    host: HostCapabilities,
    config: ScanConfig,
    patterns: PatternMatcher,
    keywords: KeywordScorer,
    heuristics: HeuristicScorer,
    toxicity: ToxicityAdapter,
    state: Mutex<CoordinatorState>,
}

impl ScanCoordinator {
    pub fn new(host: HostCapabilities, config: ScanConfig) -> Self {
        let toxicity = ToxicityAdapter::new(host.classifier.clone(), config.toxicity_threshold);
        Self {
            host,
            config,
            patterns: PatternMatcher::new(),
            keywords: KeywordScorer::new(),
            heuristics: HeuristicScorer::new(),
            toxicity,
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// Sole entry point for the trigger stream.
    ///
    /// Gating (dedup, generation bump, the `loading` emission) happens
    /// synchronously before this returns; the analysis is spawned. Must be
    /// called from within a tokio runtime.
    pub fn notify_trigger(self: &Arc<Self>, event: TriggerEvent) {
        let Some(id) = self.host.text_source.current_message_id() else {
            debug!(?event, "trigger with no open message, ignoring");
            return;
        };

        let generation = {
            let mut st = self.state.lock().expect("poisoned scan state");
            let same_message = st.current.as_ref() == Some(&id);
            match st.records.get(&id).map(|r| r.status) {
                // At most one in-flight scan per message: duplicates for the
                // same generation are suppressed, manual or not.
                Some(ScanStatus::Pending) if same_message => {
                    debug!(message = %id, ?event, "duplicate trigger suppressed, scan pending");
                    return;
                }
                // Already terminal for the still-current message: only a
                // manual request (or a different message in between) rescans.
                Some(ScanStatus::Resolved) | Some(ScanStatus::Failed)
                    if same_message && !event.is_manual() =>
                {
                    trace!(message = %id, ?event, "message already scanned");
                    return;
                }
                _ => {}
            }

            st.generation += 1;
            let generation = st.generation;
            st.current = Some(id.clone());
            st.records.insert(
                id.clone(),
                ScanRecord {
                    message_id: id.clone(),
                    status: ScanStatus::Pending,
                    last_verdict: None,
                    generation,
                },
            );
            generation
        };

        self.host.presenter.render(&LifecycleEvent::Loading);

        // Snapshot the text now; the document keeps mutating underneath.
        let raw = self.host.text_source.current_message_text();
        let text = html_escape::decode_html_entities(&raw).into_owned();

        debug!(message = %id, generation, ?event, "scan started");
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run_scan(id, generation, text).await;
        });
    }

    /// Scan status for a message; `Unscanned` when it has never been gated in.
    pub fn status(&self, id: &MessageId) -> ScanStatus {
        self.record(id)
            .map(|r| r.status)
            .unwrap_or(ScanStatus::Unscanned)
    }

    /// Current record for a message, if one exists. Mainly for embedders that
    /// want to show scan state outside the lifecycle stream.
    pub fn record(&self, id: &MessageId) -> Option<ScanRecord> {
        self.state
            .lock()
            .expect("poisoned scan state")
            .records
            .get(id)
            .cloned()
    }

    async fn run_scan(self: Arc<Self>, id: MessageId, generation: u64, text: String) {
        let signals = self.collect_signals(&text).await;
        let verdict = aggregate(&signals, &self.config);

        let Some(event) = self.settle(&id, generation, verdict) else {
            return;
        };
        debug!(message = %id, generation, "scan finished");
        self.host.presenter.render(&event);
    }

    /// Completion-time state transition. Returns the lifecycle event to emit,
    /// or `None` when the result arrived for a superseded generation and must
    /// stay silent.
    fn settle(
        &self,
        id: &MessageId,
        generation: u64,
        verdict: Verdict,
    ) -> Option<LifecycleEvent> {
        let mut st = self.state.lock().expect("poisoned scan state");
        if st.current.as_ref() != Some(id) {
            trace!(message = %id, generation, "superseded by another message, result discarded");
            return None;
        }
        let record = st.records.get_mut(id)?;
        if record.generation != generation {
            trace!(message = %id, generation, "superseded by a newer scan, result discarded");
            return None;
        }

        let event = if verdict.status == VerdictStatus::Error {
            record.status = ScanStatus::Failed;
            LifecycleEvent::Failed {
                reason: verdict
                    .reasons
                    .first()
                    .cloned()
                    .unwrap_or_else(|| ANALYSIS_FAILED_REASON.to_string()),
            }
        } else {
            record.status = ScanStatus::Resolved;
            record.last_verdict = Some(verdict.clone());
            LifecycleEvent::Resolved { verdict }
        };
        Some(event)
    }

    /// Run all four detectors for one scan. Pattern and keyword are
    /// synchronous; the two capability-backed detectors are joined so the
    /// combined latency is bounded by the slower one.
    async fn collect_signals(&self, text: &str) -> Vec<SignalResult> {
        let pattern = SignalResult::ok(
            SignalSource::Pattern,
            if self.patterns.matches(text) { 1.0 } else { 0.0 },
        );

        let keyword_hits = self.keywords.hits(text);
        let keyword = SignalResult::ok(
            SignalSource::Keyword,
            (keyword_hits.len() as f32 * self.config.keyword_hit_weight).min(1.0),
        )
        .with_label(format!("{} lexicon hits", keyword_hits.len()));

        let (heuristic_score, toxicity) = tokio::join!(
            self.heuristics
                .score(text, self.host.text_analysis.as_ref(), &self.config),
            self.toxicity.score(text),
        );

        vec![
            pattern,
            keyword,
            SignalResult::ok(SignalSource::Heuristic, heuristic_score),
            toxicity,
        ]
    }
}
