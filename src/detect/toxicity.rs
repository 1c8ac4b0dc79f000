//! Adapter over the external classification model.
//!
//! Owns the process-wide model instance: loaded lazily on first use behind a
//! `tokio::sync::OnceCell`, so concurrent first-use callers await the same
//! in-flight load instead of triggering duplicates. Once loaded the model is
//! shared read-only for the rest of the process; there is no teardown.
//!
//! Failure policy is fail-open and isolated: any error from the external
//! capability (load or classify) becomes a zero-score signal with the error
//! recorded, never an aborted scan.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::host::{ClassificationCapability, ClassificationModel};
use crate::verdict::{clamp01, SignalResult, SignalSource};

pub struct ToxicityAdapter {
    capability: Arc<dyn ClassificationCapability>,
    model: OnceCell<Arc<dyn ClassificationModel>>,
    threshold: f32,
}

impl ToxicityAdapter {
    /// `threshold` is handed to the model at load time (default 0.7).
    pub fn new(capability: Arc<dyn ClassificationCapability>, threshold: f32) -> Self {
        Self {
            capability,
            model: OnceCell::new(),
            threshold,
        }
    }

    /// Single-flight lazy access to the shared model.
    async fn model(&self) -> Result<&Arc<dyn ClassificationModel>> {
        self.model
            .get_or_try_init(|| self.capability.load(self.threshold))
            .await
    }

    /// Score `text`. Never fails the scan: classifier errors produce a
    /// neutral zero-score signal.
    pub async fn score(&self, text: &str) -> SignalResult {
        match self.try_score(text).await {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!(error = %e, "toxicity classifier unavailable, signal degraded");
                SignalResult::failed(SignalSource::Toxicity, e.to_string())
            }
        }
    }

    async fn try_score(&self, text: &str) -> Result<SignalResult> {
        let model = self.model().await?;
        let results = model.classify(&[text.to_string()]).await?;

        // Score = max probability among matched categories, 0 if none matched.
        let mut score = 0.0f32;
        let mut reasons = Vec::new();
        for r in results.iter().filter(|r| r.matched) {
            let p = clamp01(r.probability);
            if p > score {
                score = p;
            }
            reasons.push(format!(
                "{} ({}% confidence)",
                r.category,
                (p * 100.0).round() as u8
            ));
        }

        Ok(SignalResult::ok(SignalSource::Toxicity, score).with_reasons(reasons))
    }
}
