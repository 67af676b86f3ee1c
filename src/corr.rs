//! Correlation engine
//!
//! Pairwise Pearson coefficients over jointly-non-missing rows, either
//! across the whole dataset or independently within each partition of
//! a grouping key (length-controlled mode). Every coefficient is gated
//! on a minimum sample size; zero-variance series report missing. The
//! per-pair sign flip is applied here, uniformly in both modes.

use crate::config::CorrelationPair;
use crate::dataset::{Dataset, FieldValue};
use crate::Result;
use serde::{Deserialize, Serialize};

/// One computed correlation: the requested pair, the joint sample
/// size, and the coefficient (missing below the sample-size gate or on
/// zero variance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    /// The requested pair (including its sign-flip flag)
    pub pair: CorrelationPair,
    /// Rows where both metrics are non-missing
    pub sample_size: usize,
    /// Pearson coefficient in [-1, 1], sign-flipped when requested
    pub coefficient: Option<f64>,
}

/// Correlations computed within one partition of a grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionCorrelations {
    /// Grouping-key values identifying the partition
    pub key: Vec<FieldValue>,
    /// Total rows in the partition (before joint-missing filtering)
    pub sample_size: usize,
    /// One entry per requested pair
    pub entries: Vec<CorrelationEntry>,
}

/// Compute unconditioned correlations over the whole dataset.
///
/// One entry is always emitted per requested pair, for column-shape
/// consistency; below `min_samples` jointly-non-missing rows the
/// coefficient is missing.
///
/// # Errors
/// Returns [`crate::Error::SchemaMismatch`] if a pair references a
/// metric absent from the schema.
pub fn correlate(
    dataset: &Dataset,
    pairs: &[CorrelationPair],
    min_samples: usize,
) -> Result<Vec<CorrelationEntry>> {
    let all_rows: Vec<usize> = (0..dataset.len()).collect();
    pairs
        .iter()
        .map(|pair| pair_entry(dataset, pair, &all_rows, min_samples))
        .collect()
}

/// Compute length-controlled correlations: partition by `grouping_key`
/// and apply the unconditioned computation independently per partition.
///
/// Unlike the unconditioned mode, a partition whose total row count is
/// below `min_samples` is omitted from the output entirely. Partitions
/// appear in ascending key order.
///
/// # Errors
/// Returns [`crate::Error::SchemaMismatch`] if the grouping key or a
/// pair metric cannot be resolved against the schema.
pub fn correlate_by(
    dataset: &Dataset,
    grouping_key: &[String],
    pairs: &[CorrelationPair],
    min_samples: usize,
) -> Result<Vec<PartitionCorrelations>> {
    // Resolve pair metrics up front so an empty or all-small partition
    // set still surfaces a configuration error.
    for pair in pairs {
        dataset.resolve_metric(&pair.a)?;
        dataset.resolve_metric(&pair.b)?;
    }

    let partitions = dataset.partition(grouping_key)?;
    let mut output = Vec::new();
    for (key, indices) in partitions {
        if indices.len() < min_samples {
            continue;
        }
        let entries = pairs
            .iter()
            .map(|pair| pair_entry(dataset, pair, &indices, min_samples))
            .collect::<Result<Vec<_>>>()?;
        output.push(PartitionCorrelations {
            key,
            sample_size: indices.len(),
            entries,
        });
    }
    Ok(output)
}

fn pair_entry(
    dataset: &Dataset,
    pair: &CorrelationPair,
    rows: &[usize],
    min_samples: usize,
) -> Result<CorrelationEntry> {
    let a = dataset.resolve_metric(&pair.a)?;
    let b = dataset.resolve_metric(&pair.b)?;

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for &row in rows {
        if let (Some(x), Some(y)) = (a[row], b[row]) {
            xs.push(x);
            ys.push(y);
        }
    }

    let coefficient = if xs.len() < min_samples {
        None
    } else {
        pearson(&xs, &ys).map(|c| if pair.invert { -c } else { c })
    };

    Ok(CorrelationEntry {
        pair: pair.clone(),
        sample_size: xs.len(),
        coefficient,
    })
}

/// Product-moment Pearson correlation at full precision.
///
/// Returns `None` when fewer than two points are given or either
/// series has zero variance (the denominator is zero, so the
/// coefficient is undefined).
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.len() < 2 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}
