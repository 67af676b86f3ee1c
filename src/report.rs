//! Report assembly
//!
//! Arranges StatRows and CorrelationEntries into named tables with
//! stable column ordering: grouping-key columns first, then sample
//! size, then one value column per requested metric or pair. Rounding
//! to the configured display precision happens here and only here -
//! assembler inputs are always full precision, and nothing computed
//! downstream ever reads a rounded value.

use crate::config::{CorrelationPair, Precision};
use crate::corr::{CorrelationEntry, PartitionCorrelations};
use crate::dataset::FieldValue;
use crate::stats::StatRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Missing value
    Empty,
    /// Integer value (sample sizes, integer categories)
    Int(i64),
    /// Rounded numeric value
    Float(f64),
    /// Text category
    Text(String),
}

impl From<&FieldValue> for Cell {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Missing => Self::Empty,
            FieldValue::Int(v) => Self::Int(*v),
            FieldValue::Text(v) => Self::Text(v.clone()),
        }
    }
}

/// A named-column table ready for serialization or display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names, in emission order
    pub columns: Vec<String>,
    /// Row-major cells; every row has `columns.len()` cells
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Number of data rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, column name), if both exist.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// A full run's output: named tables plus a provenance stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSet {
    /// When this report set was assembled
    pub generated_at: DateTime<Utc>,
    /// Tables by report name
    pub tables: BTreeMap<String, Table>,
}

impl ReportSet {
    /// Empty report set stamped now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            tables: BTreeMap::new(),
        }
    }

    /// Insert a named table.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    /// Look up a table by report name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

impl Default for ReportSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Round half away from zero to `places` decimal places, display only.
#[must_use]
pub fn round_to(value: f64, places: u32) -> f64 {
    #[allow(clippy::cast_possible_wrap)]
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

fn float_cell(value: Option<f64>, places: u32) -> Cell {
    value.map_or(Cell::Empty, |v| Cell::Float(round_to(v, places)))
}

#[allow(clippy::cast_possible_wrap)]
fn size_cell(sample_size: usize) -> Cell {
    Cell::Int(sample_size as i64)
}

/// Assemble a grouped-statistics table.
///
/// Columns: grouping-key fields, `SampleSize`, then `Mean_<m>` and
/// `Std_<m>` per metric in requested order. Means/stds are rounded to
/// `precision.stats` places.
#[must_use]
pub fn stats_table(
    rows: &[StatRow],
    grouping_key: &[String],
    metrics: &[String],
    precision: Precision,
) -> Table {
    let mut columns: Vec<String> = grouping_key.to_vec();
    columns.push("SampleSize".to_string());
    for metric in metrics {
        columns.push(format!("Mean_{metric}"));
        columns.push(format!("Std_{metric}"));
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<Cell> = row.key.iter().map(Cell::from).collect();
            cells.push(size_cell(row.sample_size));
            for summary in &row.summaries {
                cells.push(float_cell(summary.mean, precision.stats));
                cells.push(float_cell(summary.std, precision.stats));
            }
            cells
        })
        .collect();

    Table {
        columns,
        rows: table_rows,
    }
}

/// Assemble the unconditioned correlation table.
///
/// Long form, one row per requested pair: `MetricA`, `MetricB`,
/// `SampleSize`, `Coefficient`. Joint-missing filtering gives each
/// pair its own sample size, so the wide one-row layout used for
/// partitioned output does not apply here.
#[must_use]
pub fn correlation_table(entries: &[CorrelationEntry], precision: Precision) -> Table {
    let columns = vec![
        "MetricA".to_string(),
        "MetricB".to_string(),
        "SampleSize".to_string(),
        "Coefficient".to_string(),
    ];
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                Cell::Text(entry.pair.a.clone()),
                Cell::Text(entry.pair.b.clone()),
                size_cell(entry.sample_size),
                float_cell(entry.coefficient, precision.correlation),
            ]
        })
        .collect();
    Table { columns, rows }
}

/// Assemble the length-controlled correlation table.
///
/// Columns: grouping-key fields, `SampleSize` (partition row count),
/// then one `<a>_vs_<b>` coefficient column per requested pair.
#[must_use]
pub fn grouped_correlation_table(
    partitions: &[PartitionCorrelations],
    grouping_key: &[String],
    pairs: &[CorrelationPair],
    precision: Precision,
) -> Table {
    let mut columns: Vec<String> = grouping_key.to_vec();
    columns.push("SampleSize".to_string());
    columns.extend(pairs.iter().map(CorrelationPair::label));

    let rows = partitions
        .iter()
        .map(|partition| {
            let mut cells: Vec<Cell> = partition.key.iter().map(Cell::from).collect();
            cells.push(size_cell(partition.sample_size));
            for entry in &partition.entries {
                cells.push(float_cell(entry.coefficient, precision.correlation));
            }
            cells
        })
        .collect();

    Table { columns, rows }
}
