//! Host capability traits: everything the engine consumes from its embedding
//! environment, expressed as injectable trait objects.
//!
//! The engine owns no DOM code, no model weights and no UI. The hosting
//! page-integration layer implements these traits; the engine only sees a text
//! read capability, a trigger stream, two async analysis capabilities and a
//! one-way event sink. Deterministic stub implementations live alongside the
//! traits so embedders and tests share the same substitution points.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::verdict::{LifecycleEvent, MessageId, TriggerEvent};

// ------------------------------------------------------------
// Document / message extraction
// ------------------------------------------------------------

/// Read access to the currently displayed message.
pub trait TextSource: Send + Sync {
    /// Whether the engine is running against a supported host at all.
    /// `false` aborts engine construction; the engine stays inert.
    fn host_supported(&self) -> bool {
        true
    }

    /// Stable identity of the open message; `None` when no message is open
    /// (e.g. the reading pane shows a list view).
    fn current_message_id(&self) -> Option<MessageId>;

    /// Rendered text of the open message. May still carry HTML entities;
    /// the coordinator normalizes before scanning.
    fn current_message_text(&self) -> String;
}

// ------------------------------------------------------------
// Trigger stream
// ------------------------------------------------------------

pub type TriggerCallback = Box<dyn Fn(TriggerEvent) + Send + Sync>;

/// Guard for an active subscription; dropping it unsubscribes.
pub trait Subscription: Send {}

/// Supplies scan-trigger events (document mutated, navigation changed).
///
/// Implementations may fire arbitrarily often for the same underlying change;
/// the coordinator deduplicates.
pub trait ChangeSource: Send + Sync {
    fn subscribe(&self, callback: TriggerCallback) -> Box<dyn Subscription>;
}

// ------------------------------------------------------------
// Presentation
// ------------------------------------------------------------

/// One-way sink for lifecycle events; renders banners in the host UI.
pub trait Presenter: Send + Sync {
    fn render(&self, event: &LifecycleEvent);
}

// ------------------------------------------------------------
// Classification model (toxicity)
// ------------------------------------------------------------

/// Per-category output of one classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScore {
    pub category: String,
    pub matched: bool,
    /// Probability in [0,1].
    pub probability: f32,
}

impl CategoryScore {
    pub fn new(category: impl Into<String>, matched: bool, probability: f32) -> Self {
        Self {
            category: category.into(),
            matched,
            probability,
        }
    }
}

/// A loaded classification model. Opaque, async, fallible.
#[async_trait]
pub trait ClassificationModel: Send + Sync {
    async fn classify(&self, texts: &[String]) -> Result<Vec<CategoryScore>>;
}

/// Loads the classification model. Called at most once per process by the
/// toxicity adapter; concurrent first-use callers share the in-flight load.
#[async_trait]
pub trait ClassificationCapability: Send + Sync {
    async fn load(&self, threshold: f32) -> Result<Arc<dyn ClassificationModel>>;
}

pub type DynClassifier = Arc<dyn ClassificationCapability>;

// ------------------------------------------------------------
// Text analysis (named entities)
// ------------------------------------------------------------

/// Lightweight NLP capability used by the heuristic scorer.
#[async_trait]
pub trait TextAnalysisCapability: Send + Sync {
    async fn detect_person_names(&self, text: &str) -> Result<bool>;
}

pub type DynTextAnalysis = Arc<dyn TextAnalysisCapability>;

// ------------------------------------------------------------
// Stub implementations (tests / hosts without the real capabilities)
// ------------------------------------------------------------

/// Classifier whose load always fails; the toxicity signal degrades to zero.
pub struct DisabledClassifier;

#[async_trait]
impl ClassificationCapability for DisabledClassifier {
    async fn load(&self, _threshold: f32) -> Result<Arc<dyn ClassificationModel>> {
        anyhow::bail!("classification capability disabled")
    }
}

/// Deterministic classifier returning a fixed response for every text.
pub struct StaticClassifier {
    pub categories: Vec<CategoryScore>,
}

impl StaticClassifier {
    /// A classifier that never matches anything.
    pub fn silent() -> Self {
        Self {
            categories: Vec::new(),
        }
    }
}

#[async_trait]
impl ClassificationCapability for StaticClassifier {
    async fn load(&self, _threshold: f32) -> Result<Arc<dyn ClassificationModel>> {
        Ok(Arc::new(StaticModel {
            categories: self.categories.clone(),
        }))
    }
}

struct StaticModel {
    categories: Vec<CategoryScore>,
}

#[async_trait]
impl ClassificationModel for StaticModel {
    async fn classify(&self, _texts: &[String]) -> Result<Vec<CategoryScore>> {
        Ok(self.categories.clone())
    }
}

/// Text analysis that never finds names and never fails.
pub struct NoopTextAnalysis;

#[async_trait]
impl TextAnalysisCapability for NoopTextAnalysis {
    async fn detect_person_names(&self, _text: &str) -> Result<bool> {
        Ok(false)
    }
}
