//! Derived length-accuracy metrics
//!
//! Computes per-row ratio, signed difference, and absolute relative
//! error from a measured and a target column, appending them as new
//! metric columns. A target of exactly 0 is a defined outcome: the
//! derived values for that row are missing, never infinite or NaN.

use crate::config::DerivedNames;
use crate::dataset::Dataset;
use crate::Result;

/// Append ratio/difference/relative-error columns derived from
/// `measured` and `target`.
///
/// Per row:
/// - ratio = measured / target
/// - difference = measured - target
/// - relative error = |difference| / target
///
/// All three are missing when either input is missing or the target is
/// exactly 0.
///
/// # Errors
/// Returns [`crate::Error::SchemaMismatch`] if `measured` or `target`
/// is not a metric column, or [`crate::Error::InvalidInput`] if a
/// derived name collides with an existing metric.
pub fn append_length_metrics(
    dataset: &mut Dataset,
    measured: &str,
    target: &str,
    names: &DerivedNames,
) -> Result<()> {
    let measured_col = dataset.resolve_metric(measured)?.to_vec();
    let target_col = dataset.resolve_metric(target)?.to_vec();

    let mut ratio = Vec::with_capacity(dataset.len());
    let mut difference = Vec::with_capacity(dataset.len());
    let mut relative_error = Vec::with_capacity(dataset.len());

    for (m, t) in measured_col.into_iter().zip(target_col) {
        match (m, t) {
            (Some(m), Some(t)) if t != 0.0 => {
                let diff = m - t;
                ratio.push(Some(m / t));
                difference.push(Some(diff));
                relative_error.push(Some(diff.abs() / t));
            }
            _ => {
                ratio.push(None);
                difference.push(None);
                relative_error.push(None);
            }
        }
    }

    dataset.append_metric(names.ratio.clone(), ratio)?;
    dataset.append_metric(names.difference.clone(), difference)?;
    dataset.append_metric(names.relative_error.clone(), relative_error)?;
    Ok(())
}
