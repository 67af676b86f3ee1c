//! Analysis pipeline
//!
//! One run: stats over the whole dataset and over the configured
//! grouping key, derived length-accuracy metrics, and both correlation
//! modes, assembled into a [`ReportSet`]. Pure function of
//! (dataset, configuration); no state survives a run.

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::report::{
    correlation_table, grouped_correlation_table, stats_table, ReportSet,
};
use crate::{corr, derived, stats, Result};
use tracing::debug;

/// Report name for whole-dataset statistics.
pub const OVERALL: &str = "overall";
/// Report name for statistics grouped by the configured key.
pub const GROUPED_STATS: &str = "grouped_stats";
/// Report name for derived length-accuracy statistics.
pub const LENGTH_ACCURACY: &str = "length_accuracy";
/// Report name for unconditioned correlations.
pub const OVERALL_CORRELATIONS: &str = "overall_correlations";
/// Report name for length-controlled correlations.
pub const GROUPED_CORRELATIONS: &str = "grouped_correlations";

/// Run the full analysis and assemble named report tables.
///
/// Always emits [`OVERALL`]. Emits [`GROUPED_STATS`] when a grouping
/// key is configured, one `by_<field>` stats table per secondary key,
/// [`LENGTH_ACCURACY`] when a length spec is configured, and the
/// correlation tables when pairs are configured
/// ([`GROUPED_CORRELATIONS`] additionally requires a grouping key).
///
/// # Errors
/// Returns [`crate::Error::SchemaMismatch`] if any configured field
/// cannot be resolved against the dataset schema.
pub fn run(dataset: &Dataset, config: &AnalysisConfig) -> Result<ReportSet> {
    let mut reports = ReportSet::new();
    let precision = config.precision;

    debug!(rows = dataset.len(), "computing overall statistics");
    let overall = stats::summarize(dataset, &[], &config.metrics)?;
    reports.insert(
        OVERALL,
        stats_table(&overall, &[], &config.metrics, precision),
    );

    if !config.grouping_keys.is_empty() {
        debug!(key = ?config.grouping_keys, "computing grouped statistics");
        let grouped = stats::summarize(dataset, &config.grouping_keys, &config.metrics)?;
        reports.insert(
            GROUPED_STATS,
            stats_table(&grouped, &config.grouping_keys, &config.metrics, precision),
        );
    }

    for field in &config.secondary_keys {
        debug!(key = %field, "computing secondary-key statistics");
        let keys = std::slice::from_ref(field);
        let rows = stats::summarize(dataset, keys, &config.metrics)?;
        reports.insert(
            format!("by_{field}"),
            stats_table(&rows, keys, &config.metrics, precision),
        );
    }

    if let Some(length) = &config.length {
        debug!(
            measured = %length.measured,
            target = %length.target,
            "computing length-accuracy metrics"
        );
        // Derived columns are appended to a working copy; the input
        // dataset stays immutable for the rest of the run.
        let mut working = dataset.clone();
        derived::append_length_metrics(
            &mut working,
            &length.measured,
            &length.target,
            &length.names,
        )?;
        let derived_metrics = vec![
            length.names.ratio.clone(),
            length.names.difference.clone(),
            length.names.relative_error.clone(),
        ];
        let accuracy = stats::summarize(&working, &config.grouping_keys, &derived_metrics)?;
        reports.insert(
            LENGTH_ACCURACY,
            stats_table(&accuracy, &config.grouping_keys, &derived_metrics, precision),
        );
    }

    if !config.correlation_pairs.is_empty() {
        debug!(
            pairs = config.correlation_pairs.len(),
            "computing correlations"
        );
        let entries = corr::correlate(
            dataset,
            &config.correlation_pairs,
            config.min_correlation_samples,
        )?;
        reports.insert(
            OVERALL_CORRELATIONS,
            correlation_table(&entries, precision),
        );

        if !config.grouping_keys.is_empty() {
            let partitions = corr::correlate_by(
                dataset,
                &config.grouping_keys,
                &config.correlation_pairs,
                config.min_correlation_samples,
            )?;
            reports.insert(
                GROUPED_CORRELATIONS,
                grouped_correlation_table(
                    &partitions,
                    &config.grouping_keys,
                    &config.correlation_pairs,
                    precision,
                ),
            );
        }
    }

    debug!(tables = reports.tables.len(), "report set assembled");
    Ok(reports)
}

/// Serialize a report set to pretty JSON for the renderer boundary.
///
/// # Errors
/// Returns [`crate::Error::InvalidInput`] if serialization fails.
pub fn to_json(reports: &ReportSet) -> Result<String> {
    serde_json::to_string_pretty(reports)
        .map_err(|e| crate::Error::InvalidInput(format!("Failed to serialize reports: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LengthSpec;
    use crate::dataset::FieldValue;
    use crate::report::Cell;

    fn config() -> AnalysisConfig {
        AnalysisConfig::new()
            .grouping_key("TargetLength")
            .metric("ActualWordCount")
            .metric("NLI_AverageScore")
            .pair("ActualWordCount", "NLI_AverageScore")
            .length_spec(LengthSpec::new("ActualWordCount", "TargetLength"))
    }

    fn dataset() -> Dataset {
        Dataset::builder()
            .key_column(
                "TargetLength",
                vec![
                    FieldValue::Int(50),
                    FieldValue::Int(50),
                    FieldValue::Int(50),
                    FieldValue::Int(100),
                    FieldValue::Int(100),
                ],
            )
            .metric_column(
                "TargetLength",
                vec![Some(50.0), Some(50.0), Some(50.0), Some(100.0), Some(100.0)],
            )
            .metric_column(
                "ActualWordCount",
                vec![Some(60.0), Some(45.0), Some(52.0), Some(120.0), Some(95.0)],
            )
            .metric_column(
                "NLI_AverageScore",
                vec![Some(0.8), Some(0.85), None, Some(0.75), Some(0.7)],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_emits_expected_reports() {
        let reports = run(&dataset(), &config()).unwrap();
        for name in [
            OVERALL,
            GROUPED_STATS,
            LENGTH_ACCURACY,
            OVERALL_CORRELATIONS,
            GROUPED_CORRELATIONS,
        ] {
            assert!(reports.table(name).is_some(), "missing report {name}");
        }
    }

    #[test]
    fn test_run_without_grouping_key_skips_grouped_reports() {
        let cfg = AnalysisConfig::new()
            .metric("ActualWordCount")
            .pair("ActualWordCount", "NLI_AverageScore");
        let reports = run(&dataset(), &cfg).unwrap();
        assert!(reports.table(OVERALL).is_some());
        assert!(reports.table(OVERALL_CORRELATIONS).is_some());
        assert!(reports.table(GROUPED_STATS).is_none());
        assert!(reports.table(GROUPED_CORRELATIONS).is_none());
    }

    #[test]
    fn test_input_dataset_not_mutated_by_derived_step() {
        let ds = dataset();
        let before = ds.metric_names().len();
        run(&ds, &config()).unwrap();
        assert_eq!(ds.metric_names().len(), before);
    }

    #[test]
    fn test_length_accuracy_values() {
        let reports = run(&dataset(), &config()).unwrap();
        let table = reports.table(LENGTH_ACCURACY).unwrap();
        // Length 100 partition: ratios 1.2 and 0.95, mean 1.075
        assert_eq!(table.cell(1, "TargetLength"), Some(&Cell::Int(100)));
        assert_eq!(table.cell(1, "Mean_LengthRatio"), Some(&Cell::Float(1.075)));
    }

    #[test]
    fn test_bad_config_surfaces_schema_mismatch() {
        let cfg = AnalysisConfig::new().grouping_key("NoSuchKey");
        assert!(run(&dataset(), &cfg).is_err());
    }
}
