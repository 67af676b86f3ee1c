//! Run configuration
//!
//! The analysis surface is supplied by the caller, never inferred from
//! the data: grouping keys, the metric list, correlation pairs (with an
//! explicit per-pair sign flip), the minimum correlation sample size,
//! and display precision. Serializable so a run configuration can be
//! persisted alongside its reports.

use serde::{Deserialize, Serialize};

/// Default minimum jointly-non-missing rows before a correlation
/// coefficient is reported. Observed reporting-quality floor, kept
/// configurable rather than fixed.
pub const DEFAULT_MIN_CORRELATION_SAMPLES: usize = 3;

/// Display rounding applied by the report assembler only; all
/// computation runs at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    /// Decimal places for means and standard deviations
    pub stats: u32,
    /// Decimal places for correlation coefficients
    pub correlation: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            stats: 4,
            correlation: 3,
        }
    }
}

/// One requested correlation: two metric names plus a sign-flip flag.
///
/// Some readability scales run "high is worse"; those pairs are
/// reported with a negated coefficient. The flip is configuration,
/// never inferred from metric names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationPair {
    /// First metric name
    pub a: String,
    /// Second metric name
    pub b: String,
    /// Negate the reported coefficient
    #[serde(default)]
    pub invert: bool,
}

impl CorrelationPair {
    /// A pair reported with its natural sign.
    #[must_use]
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            invert: false,
        }
    }

    /// A pair reported with an inverted sign.
    #[must_use]
    pub fn inverted(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            invert: true,
        }
    }

    /// Stable column label for this pair.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}_vs_{}", self.a, self.b)
    }
}

/// Names given to the three derived length-accuracy metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedNames {
    /// measured / target
    pub ratio: String,
    /// measured - target
    pub difference: String,
    /// |measured - target| / target
    pub relative_error: String,
}

impl Default for DerivedNames {
    fn default() -> Self {
        Self {
            ratio: "LengthRatio".to_string(),
            difference: "LengthDifference".to_string(),
            relative_error: "LengthAccuracy".to_string(),
        }
    }
}

/// Designates the measured/target columns for derived-metric
/// computation and length-accuracy reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthSpec {
    /// Metric holding the measured value (e.g. actual word count)
    pub measured: String,
    /// Metric holding the target value (e.g. requested length)
    pub target: String,
    /// Derived column names
    #[serde(default)]
    pub names: DerivedNames,
}

impl LengthSpec {
    /// Length spec with default derived-metric names.
    #[must_use]
    pub fn new(measured: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            measured: measured.into(),
            target: target.into(),
            names: DerivedNames::default(),
        }
    }
}

/// Full configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ordered grouping-key fields (possibly empty)
    pub grouping_keys: Vec<String>,
    /// Extra single-key fields, each reported as its own stats table
    pub secondary_keys: Vec<String>,
    /// Metrics to summarize, in report column order
    pub metrics: Vec<String>,
    /// Correlation pairs, in report column order
    pub correlation_pairs: Vec<CorrelationPair>,
    /// Minimum jointly-non-missing rows per reported coefficient
    pub min_correlation_samples: usize,
    /// Display rounding
    pub precision: Precision,
    /// Optional derived length-accuracy metric designation
    pub length: Option<LengthSpec>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grouping_keys: Vec::new(),
            secondary_keys: Vec::new(),
            metrics: Vec::new(),
            correlation_pairs: Vec::new(),
            min_correlation_samples: DEFAULT_MIN_CORRELATION_SAMPLES,
            precision: Precision::default(),
            length: None,
        }
    }
}

impl AnalysisConfig {
    /// Empty configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a grouping-key field.
    #[must_use]
    pub fn grouping_key(mut self, field: impl Into<String>) -> Self {
        self.grouping_keys.push(field.into());
        self
    }

    /// Append a secondary key, reported as a standalone
    /// per-key stats table alongside the composite grouping.
    #[must_use]
    pub fn secondary_key(mut self, field: impl Into<String>) -> Self {
        self.secondary_keys.push(field.into());
        self
    }

    /// Append a metric to summarize.
    #[must_use]
    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metrics.push(metric.into());
        self
    }

    /// Append a natural-sign correlation pair.
    #[must_use]
    pub fn pair(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.correlation_pairs.push(CorrelationPair::new(a, b));
        self
    }

    /// Append a sign-inverted correlation pair.
    #[must_use]
    pub fn inverted_pair(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.correlation_pairs.push(CorrelationPair::inverted(a, b));
        self
    }

    /// Set the minimum correlation sample size.
    #[must_use]
    pub fn min_correlation_samples(mut self, n: usize) -> Self {
        self.min_correlation_samples = n;
        self
    }

    /// Set display precision.
    #[must_use]
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Designate measured/target columns for length-accuracy analysis.
    #[must_use]
    pub fn length_spec(mut self, spec: LengthSpec) -> Self {
        self.length = Some(spec);
        self
    }
}

/// Loader-facing schema declaration: which columns are grouping keys
/// and which are numeric metrics. A field may be both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Ordered key fields
    pub key_fields: Vec<String>,
    /// Ordered numeric metric fields
    pub numeric_fields: Vec<String>,
    /// Cell values normalized to missing (case-insensitive; the empty
    /// cell is always missing)
    #[serde(default = "SchemaConfig::default_sentinels")]
    pub sentinels: Vec<String>,
}

impl SchemaConfig {
    /// Schema with the default missing-value sentinels.
    #[must_use]
    pub fn new(key_fields: Vec<String>, numeric_fields: Vec<String>) -> Self {
        Self {
            key_fields,
            numeric_fields,
            sentinels: Self::default_sentinels(),
        }
    }

    fn default_sentinels() -> Vec<String> {
        vec!["N/A".to_string(), "NA".to_string(), "null".to_string()]
    }

    /// True when `cell` is a missing-value sentinel.
    #[must_use]
    pub fn is_sentinel(&self, cell: &str) -> bool {
        let trimmed = cell.trim();
        trimmed.is_empty()
            || self
                .sentinels
                .iter()
                .any(|s| s.eq_ignore_ascii_case(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.min_correlation_samples, 3);
        assert_eq!(config.precision.stats, 4);
        assert_eq!(config.precision.correlation, 3);
    }

    #[test]
    fn test_builder_preserves_request_order() {
        let config = AnalysisConfig::new()
            .grouping_key("TargetLength")
            .metric("ActualWordCount")
            .metric("FleschKincaid")
            .inverted_pair("ActualWordCount", "FleschKincaid")
            .pair("ActualWordCount", "WordFrequencyScore")
            .secondary_key("EventKey");
        assert_eq!(config.metrics, vec!["ActualWordCount", "FleschKincaid"]);
        assert_eq!(config.secondary_keys, vec!["EventKey"]);
        assert!(config.correlation_pairs[0].invert);
        assert!(!config.correlation_pairs[1].invert);
    }

    #[test]
    fn test_pair_label() {
        let pair = CorrelationPair::new("NLI_AverageScore", "FleschKincaid");
        assert_eq!(pair.label(), "NLI_AverageScore_vs_FleschKincaid");
    }

    #[test]
    fn test_sentinel_matching() {
        let schema = SchemaConfig::new(vec![], vec![]);
        assert!(schema.is_sentinel("N/A"));
        assert!(schema.is_sentinel("n/a"));
        assert!(schema.is_sentinel("  "));
        assert!(!schema.is_sentinel("0.5"));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = AnalysisConfig::new()
            .grouping_key("TargetLength")
            .metric("NLI_AverageScore")
            .inverted_pair("NLI_AverageScore", "FleschKincaid")
            .length_spec(LengthSpec::new("ActualWordCount", "TargetLength"));
        let json = serde_json::to_string(&config).expect("serialization failed");
        let back: AnalysisConfig = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(config, back);
    }
}
