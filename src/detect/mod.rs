// src/detect/mod.rs
//! Detector suite: four independent signal sources over rendered message text.

pub mod heuristics;
pub mod keywords;
pub mod patterns;
pub mod toxicity;

pub use heuristics::HeuristicScorer;
pub use keywords::KeywordScorer;
pub use patterns::PatternMatcher;
pub use toxicity::ToxicityAdapter;
