//! Scoring configuration.
//!
//! The constants started life as fixed heuristics in the first deployment;
//! they are configuration here so operators can tune them without touching
//! the scoring code. Defaults reproduce the original behaviour exactly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version tag stamped on snapshots produced with the default scoring
/// function.
pub(crate) const DEFAULT_ALGO_VERSION: &str = "v1.0";

/// Knobs of the recommendation scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoConfig {
    /// Score every candidate starts from.
    pub base_score: f32,
    /// Weight of the tag-overlap bonus.
    pub tag_weight: f32,
    /// Flat bonus for plans inside the proximity threshold.
    pub proximity_bonus: f32,
    /// Distance under which the proximity bonus applies, in metres.
    ///
    /// A step function, not a continuous decay; a deliberate
    /// simplification of "nearby is better".
    pub proximity_threshold_m: f64,
    /// Upper bound on candidates fetched per user.
    pub prefetch_cap: usize,
    /// Upper bound on candidates actually scored per user.
    pub score_cap: usize,
    /// Version string stamped on every produced snapshot.
    pub algo_version: String,
}

impl RecoConfig {
    /// Validate the configuration and return it.
    ///
    /// # Errors
    /// Returns [`RecoConfigError`] when a weight is negative or not finite,
    /// the proximity threshold is negative, or a candidate cap is zero.
    pub fn validate(self) -> Result<Self, RecoConfigError> {
        let weights = [
            ("base_score", self.base_score),
            ("tag_weight", self.tag_weight),
            ("proximity_bonus", self.proximity_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(RecoConfigError::InvalidWeight { name, value });
            }
        }
        if !self.proximity_threshold_m.is_finite() || self.proximity_threshold_m < 0.0 {
            return Err(RecoConfigError::InvalidThreshold {
                meters: self.proximity_threshold_m,
            });
        }
        if self.prefetch_cap == 0 || self.score_cap == 0 {
            return Err(RecoConfigError::ZeroCandidateCap);
        }
        Ok(self)
    }
}

impl Default for RecoConfig {
    fn default() -> Self {
        Self {
            base_score: 0.5,
            tag_weight: 0.3,
            proximity_bonus: 0.2,
            proximity_threshold_m: 5_000.0,
            prefetch_cap: 50,
            score_cap: 20,
            algo_version: DEFAULT_ALGO_VERSION.to_owned(),
        }
    }
}

/// Errors raised when validating a [`RecoConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum RecoConfigError {
    /// A scoring weight was negative or not finite.
    #[error("{name} must be a non-negative finite number, got {value}")]
    InvalidWeight {
        /// Name of the offending field.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// The proximity threshold was negative or not finite.
    #[error("proximity threshold must be a non-negative number of metres, got {meters}")]
    InvalidThreshold {
        /// Rejected threshold.
        meters: f64,
    },
    /// Candidate caps must keep at least one candidate.
    #[error("candidate caps must be at least 1")]
    ZeroCandidateCap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_validate() {
        assert!(RecoConfig::default().validate().is_ok());
    }

    #[rstest]
    fn default_constants_match_the_documented_heuristics() {
        let config = RecoConfig::default();
        assert_eq!(config.base_score, 0.5);
        assert_eq!(config.tag_weight, 0.3);
        assert_eq!(config.proximity_bonus, 0.2);
        assert_eq!(config.proximity_threshold_m, 5_000.0);
        assert_eq!(config.prefetch_cap, 50);
        assert_eq!(config.score_cap, 20);
        assert_eq!(config.algo_version, "v1.0");
    }

    #[rstest]
    #[case(-0.1)]
    #[case(f32::NAN)]
    fn invalid_weights_are_rejected(#[case] tag_weight: f32) {
        let result = RecoConfig {
            tag_weight,
            ..RecoConfig::default()
        }
        .validate();
        assert!(matches!(result, Err(RecoConfigError::InvalidWeight { .. })));
    }

    #[rstest]
    fn negative_threshold_is_rejected() {
        let result = RecoConfig {
            proximity_threshold_m: -1.0,
            ..RecoConfig::default()
        }
        .validate();
        assert!(matches!(
            result,
            Err(RecoConfigError::InvalidThreshold { .. })
        ));
    }

    #[rstest]
    fn zero_caps_are_rejected() {
        let result = RecoConfig {
            score_cap: 0,
            ..RecoConfig::default()
        }
        .validate();
        assert_eq!(result, Err(RecoConfigError::ZeroCandidateCap));
    }
}
