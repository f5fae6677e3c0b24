//! Configuration types for join analysis.
//!
//! This module provides [`AnalysisOptions`] and a builder for it. The
//! defaults mirror the documented behaviour of the analyzer: edit distance 2,
//! at most 10 near-match candidates, a Cartesian threshold of 10x.

use serde::{Deserialize, Serialize};

/// Default maximum edit distance for near-match suggestions.
pub const DEFAULT_NEAR_MATCH_MAX_DISTANCE: usize = 2;
/// Default number of near-match candidates kept.
pub const DEFAULT_NEAR_MATCH_MAX_CANDIDATES: usize = 10;
/// Default cap on unmatched left keys compared for near matches.
pub const DEFAULT_NEAR_MATCH_LEFT_SAMPLE: usize = 50;
/// Default cap on right keys compared for near matches.
pub const DEFAULT_NEAR_MATCH_RIGHT_SAMPLE: usize = 100;
/// Keys shorter than this (in characters) are not near-matched.
pub const DEFAULT_NEAR_MATCH_MIN_LENGTH: usize = 3;
/// Default expansion factor above which a Cartesian risk is flagged.
pub const DEFAULT_CARTESIAN_THRESHOLD: f64 = 10.0;

/// Options for a single `analyze` call.
///
/// Use [`AnalysisOptions::builder()`] to create options with the fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use join_diagnostics::AnalysisOptions;
///
/// let options = AnalysisOptions::builder()
///     .sample_size(10_000)
///     .sample_seed(42)
///     .cartesian_threshold(5.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Sample this many rows from each table before analysis.
    /// Default: None (analyze every row)
    pub sample_size: Option<usize>,

    /// Seed for row sampling. When None and sampling is enabled, a seed is
    /// drawn and recorded in the report.
    /// Default: None
    pub sample_seed: Option<u64>,

    /// Maximum edit distance for near-match suggestions.
    /// Default: 2
    pub near_match_max_distance: usize,

    /// Maximum number of near-match suggestions kept.
    /// Default: 10
    pub near_match_max_candidates: usize,

    /// Maximum number of unmatched left keys compared.
    /// Default: 50
    pub near_match_left_sample: usize,

    /// Maximum number of right keys compared against.
    /// Default: 100
    pub near_match_right_sample: usize,

    /// Minimum key length (characters) for near matching.
    /// Default: 3
    pub near_match_min_length: usize,

    /// Expansion factor above which a Cartesian risk is flagged.
    /// Default: 10.0
    pub cartesian_threshold: f64,

    /// Whether to run the Cartesian risk estimator.
    /// Default: true
    pub check_cartesian: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            sample_size: None,
            sample_seed: None,
            near_match_max_distance: DEFAULT_NEAR_MATCH_MAX_DISTANCE,
            near_match_max_candidates: DEFAULT_NEAR_MATCH_MAX_CANDIDATES,
            near_match_left_sample: DEFAULT_NEAR_MATCH_LEFT_SAMPLE,
            near_match_right_sample: DEFAULT_NEAR_MATCH_RIGHT_SAMPLE,
            near_match_min_length: DEFAULT_NEAR_MATCH_MIN_LENGTH,
            cartesian_threshold: DEFAULT_CARTESIAN_THRESHOLD,
            check_cartesian: true,
        }
    }
}

impl AnalysisOptions {
    /// Create a new options builder.
    pub fn builder() -> AnalysisOptionsBuilder {
        AnalysisOptionsBuilder::default()
    }

    /// Validate the options and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.cartesian_threshold.is_finite() || self.cartesian_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "cartesian_threshold".to_string(),
                value: self.cartesian_threshold,
            });
        }

        if self.sample_size == Some(0) {
            return Err(ConfigValidationError::InvalidSampleSize(0));
        }

        if self.near_match_max_distance == 0 {
            return Err(ConfigValidationError::InvalidLimit {
                field: "near_match_max_distance".to_string(),
            });
        }

        if self.near_match_max_candidates == 0 {
            return Err(ConfigValidationError::InvalidLimit {
                field: "near_match_max_candidates".to_string(),
            });
        }

        Ok(())
    }
}

/// Errors that can occur during options validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be a positive finite number)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid sample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),

    #[error("Invalid value for '{field}': must be at least 1")]
    InvalidLimit { field: String },
}

/// Builder for [`AnalysisOptions`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisOptionsBuilder {
    sample_size: Option<usize>,
    sample_seed: Option<u64>,
    near_match_max_distance: Option<usize>,
    near_match_max_candidates: Option<usize>,
    near_match_left_sample: Option<usize>,
    near_match_right_sample: Option<usize>,
    near_match_min_length: Option<usize>,
    cartesian_threshold: Option<f64>,
    check_cartesian: Option<bool>,
}

impl AnalysisOptionsBuilder {
    /// Sample this many rows from each table before analysis.
    ///
    /// Sampling happens before any key is derived; every metric in the
    /// resulting report describes the sample, not the full tables.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }

    /// Fix the sampling seed for reproducible runs.
    pub fn sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    /// Set the maximum edit distance for near-match suggestions.
    pub fn near_match_max_distance(mut self, distance: usize) -> Self {
        self.near_match_max_distance = Some(distance);
        self
    }

    /// Set how many near-match suggestions are kept.
    pub fn near_match_max_candidates(mut self, candidates: usize) -> Self {
        self.near_match_max_candidates = Some(candidates);
        self
    }

    /// Cap the number of keys compared on each side by the near-match detector.
    ///
    /// These caps bound the quadratic cost of the comparison. They trade
    /// recall for speed and give no accuracy guarantee.
    pub fn near_match_samples(mut self, left: usize, right: usize) -> Self {
        self.near_match_left_sample = Some(left);
        self.near_match_right_sample = Some(right);
        self
    }

    /// Set the minimum key length considered by the near-match detector.
    pub fn near_match_min_length(mut self, length: usize) -> Self {
        self.near_match_min_length = Some(length);
        self
    }

    /// Set the expansion factor above which a Cartesian risk is flagged.
    pub fn cartesian_threshold(mut self, threshold: f64) -> Self {
        self.cartesian_threshold = Some(threshold);
        self
    }

    /// Enable or disable the Cartesian risk estimator.
    pub fn check_cartesian(mut self, check: bool) -> Self {
        self.check_cartesian = Some(check);
        self
    }

    /// Build the options.
    ///
    /// Returns validated `AnalysisOptions` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisOptions, ConfigValidationError> {
        let options = AnalysisOptions {
            sample_size: self.sample_size,
            sample_seed: self.sample_seed,
            near_match_max_distance: self
                .near_match_max_distance
                .unwrap_or(DEFAULT_NEAR_MATCH_MAX_DISTANCE),
            near_match_max_candidates: self
                .near_match_max_candidates
                .unwrap_or(DEFAULT_NEAR_MATCH_MAX_CANDIDATES),
            near_match_left_sample: self
                .near_match_left_sample
                .unwrap_or(DEFAULT_NEAR_MATCH_LEFT_SAMPLE),
            near_match_right_sample: self
                .near_match_right_sample
                .unwrap_or(DEFAULT_NEAR_MATCH_RIGHT_SAMPLE),
            near_match_min_length: self
                .near_match_min_length
                .unwrap_or(DEFAULT_NEAR_MATCH_MIN_LENGTH),
            cartesian_threshold: self
                .cartesian_threshold
                .unwrap_or(DEFAULT_CARTESIAN_THRESHOLD),
            check_cartesian: self.check_cartesian.unwrap_or(true),
        };

        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AnalysisOptions::default();
        assert_eq!(options.sample_size, None);
        assert_eq!(options.near_match_max_distance, 2);
        assert_eq!(options.near_match_max_candidates, 10);
        assert_eq!(options.near_match_left_sample, 50);
        assert_eq!(options.near_match_right_sample, 100);
        assert_eq!(options.cartesian_threshold, 10.0);
        assert!(options.check_cartesian);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let options = AnalysisOptions::builder().build().unwrap();
        assert_eq!(options, AnalysisOptions::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let options = AnalysisOptions::builder()
            .sample_size(500)
            .sample_seed(7)
            .near_match_max_distance(3)
            .near_match_samples(20, 40)
            .cartesian_threshold(2.5)
            .check_cartesian(false)
            .build()
            .unwrap();

        assert_eq!(options.sample_size, Some(500));
        assert_eq!(options.sample_seed, Some(7));
        assert_eq!(options.near_match_max_distance, 3);
        assert_eq!(options.near_match_left_sample, 20);
        assert_eq!(options.near_match_right_sample, 40);
        assert_eq!(options.cartesian_threshold, 2.5);
        assert!(!options.check_cartesian);
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = AnalysisOptions::builder().cartesian_threshold(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));

        let result = AnalysisOptions::builder()
            .cartesian_threshold(f64::NAN)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_sample_size() {
        let result = AnalysisOptions::builder().sample_size(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSampleSize(0)
        ));
    }

    #[test]
    fn test_validation_zero_distance() {
        let result = AnalysisOptions::builder().near_match_max_distance(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidLimit { .. }
        ));
    }

    #[test]
    fn test_options_from_json() {
        let json = r#"{
            "sample_size": 1000,
            "sample_seed": 99,
            "near_match_max_distance": 1,
            "near_match_max_candidates": 5,
            "near_match_left_sample": 50,
            "near_match_right_sample": 100,
            "near_match_min_length": 4,
            "cartesian_threshold": 3.0,
            "check_cartesian": true
        }"#;

        let options: AnalysisOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.sample_size, Some(1000));
        assert_eq!(options.sample_seed, Some(99));
        assert_eq!(options.near_match_min_length, 4);
        assert!(options.validate().is_ok());
    }
}
