//! Scan configuration: detection thresholds and signal weights.
//!
//! Loaded from a JSON file; a missing or unparsable file falls back to the
//! built-in defaults so the engine always starts with sane tuning. Every
//! scoring component takes `&ScanConfig`, which lets tests tune thresholds
//! without touching the filesystem.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config path, relative to the runtime working dir.
pub const DEFAULT_CONFIG_PATH: &str = "config/scan.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Detection threshold handed to the classification model at load time.
    pub toxicity_threshold: f32,
    /// Escalate to "threat" when confidence percent exceeds this value.
    pub threat_percent: u8,
    /// Score increment per matched lexicon term.
    pub keyword_hit_weight: f32,
    /// Heuristic weight: personal names present in the text.
    pub weight_person_names: f32,
    /// Heuristic weight: repeated `!`/`$`/`%` punctuation.
    pub weight_punctuation: f32,
    /// Heuristic weight: suspicious short-domain tokens.
    pub weight_domain: f32,
    /// A keyword/heuristic signal above this score earns its own reason line.
    pub signal_reason_threshold: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            toxicity_threshold: 0.7,
            threat_percent: 10,
            keyword_hit_weight: 0.2,
            weight_person_names: 0.2,
            weight_punctuation: 0.3,
            weight_domain: 0.4,
            signal_reason_threshold: 0.5,
        }
    }
}

impl ScanConfig {
    /// Load from `path`. Reading or parse failure yields `Default` so a broken
    /// config file never blocks scanning.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::debug!(path = %path.display(), error = %e, "invalid scan config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = ScanConfig::load("__scan_config_should_not_exist__.json");
        assert_eq!(cfg, ScanConfig::default());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let cfg: ScanConfig = serde_json::from_str(r#"{"threat_percent": 25}"#).unwrap();
        assert_eq!(cfg.threat_percent, 25);
        assert_eq!(cfg.toxicity_threshold, 0.7);
        assert_eq!(cfg.keyword_hit_weight, 0.2);
    }
}
