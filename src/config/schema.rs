use serde::{Deserialize, Serialize};

use crate::scoring::{ScoringConfig, ScoringOptions};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringConfig>,
    /// Tracing filter used when RUST_LOG is unset, e.g. "info" or "sme_score=debug".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Starter config spelling out every scoring default.
    pub fn with_defaults() -> Self {
        Config {
            scoring: Some(ScoringConfig::with_defaults()),
            log_level: Some(crate::telemetry::DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Scoring section with `overrides` layered on top.
    pub fn scoring_config(&self, overrides: &ScoringConfig) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default().merge(overrides)
    }

    pub fn scoring_options(&self, overrides: &ScoringConfig) -> ScoringOptions {
        self.scoring_config(overrides).resolve()
    }
}
