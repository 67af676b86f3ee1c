//! Grouped statistics engine
//!
//! Partitions the dataset by a grouping key and computes
//! count/mean/standard-deviation per metric per partition, excluding
//! missing values per metric. Pure function of (dataset, grouping key,
//! metric list); partition output order is ascending by key tuple.

use crate::dataset::{Dataset, FieldValue};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Mean and sample standard deviation of one metric within one
/// partition, computed over its non-missing subset only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Metric name
    pub metric: String,
    /// Mean over non-missing values; missing when no values exist
    pub mean: Option<f64>,
    /// Sample (n-1) standard deviation; missing below two values
    pub std: Option<f64>,
}

/// Summary of one partition: key values, row count, per-metric stats.
///
/// `sample_size` counts every row in the partition, including rows
/// whose metric values are missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    /// Grouping-key values, in grouping-key order
    pub key: Vec<FieldValue>,
    /// Rows in the partition
    pub sample_size: usize,
    /// Per-metric summaries, in requested metric order
    pub summaries: Vec<MetricSummary>,
}

/// Compute per-partition descriptive statistics.
///
/// The empty grouping key yields exactly one [`StatRow`] summarizing
/// the whole dataset. A requested metric absent from the schema
/// entirely reports missing mean/std in every partition - that is a
/// value, not an error.
///
/// # Errors
/// Returns [`crate::Error::SchemaMismatch`] if a grouping-key field is
/// absent from the schema.
pub fn summarize(
    dataset: &Dataset,
    grouping_key: &[String],
    metrics: &[String],
) -> Result<Vec<StatRow>> {
    let partitions = dataset.partition(grouping_key)?;
    let columns: Vec<Option<&[Option<f64>]>> = metrics
        .iter()
        .map(|m| dataset.metric_column(m))
        .collect();

    let mut rows = Vec::with_capacity(partitions.len());
    for (key, indices) in partitions {
        let summaries = metrics
            .iter()
            .zip(&columns)
            .map(|(metric, column)| {
                let (mean, std) = column.map_or((None, None), |col| {
                    mean_and_std(indices.iter().filter_map(|&i| col[i]))
                });
                MetricSummary {
                    metric: metric.clone(),
                    mean,
                    std,
                }
            })
            .collect();
        rows.push(StatRow {
            key,
            sample_size: indices.len(),
            summaries,
        });
    }
    Ok(rows)
}

/// Mean and sample standard deviation over an iterator of present
/// values. Zero values => both missing; one value => std missing.
fn mean_and_std(values: impl Iterator<Item = f64>) -> (Option<f64>, Option<f64>) {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return (None, None);
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (Some(mean), None);
    }
    let sum_sq = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
    let std = (sum_sq / (n - 1.0)).sqrt();
    (Some(mean), Some(std))
}
