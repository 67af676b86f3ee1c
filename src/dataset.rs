//! In-memory trial table
//!
//! Columnar, load-once design: one experiment run owns one `Dataset`,
//! immutable after ingestion except for appending derived metric
//! columns. Grouping-key columns carry [`FieldValue`] (a typed
//! categorical with an explicit missing variant and a total order);
//! metric columns carry `Option<f64>`, so "missing" never shares a
//! representation with a valid float and NaN never enters the table.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A categorical grouping-key value.
///
/// Total order (`Missing < Int < Text`, ints numeric, text
/// lexicographic) makes partition output deterministic across runs and
/// across mixed-type key columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldValue {
    /// Explicitly absent key value; forms its own partition, never
    /// silently dropped.
    Missing,
    /// Integer category (e.g. a target-length bucket)
    Int(i64),
    /// Free-text category (e.g. a condition or event label)
    Text(String),
}

impl FieldValue {
    /// Parse a raw non-sentinel cell: integer literal when possible,
    /// free text otherwise.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_string()), Self::Int)
    }

    /// True for the missing variant.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use FieldValue::{Int, Missing, Text};
        match (self, other) {
            (Missing, Missing) => Ordering::Equal,
            (Missing, _) => Ordering::Less,
            (_, Missing) => Ordering::Greater,
            (Int(a), Int(b)) => a.cmp(b),
            (Int(_), Text(_)) => Ordering::Less,
            (Text(_), Int(_)) => Ordering::Greater,
            (Text(a), Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, ""),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// One run's worth of per-trial records, columnar.
///
/// All columns have identical length. Key columns and metric columns
/// are disjoint namespaces; a source field may appear in both (the
/// target-length bucket is both a grouping key and a numeric target).
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    len: usize,
    keys: Vec<(String, Vec<FieldValue>)>,
    metrics: Vec<(String, Vec<Option<f64>>)>,
}

impl Dataset {
    /// Create a builder for assembling a dataset column by column.
    #[must_use]
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when the dataset has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ordered key-field names.
    #[must_use]
    pub fn key_fields(&self) -> Vec<&str> {
        self.keys.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Ordered metric names.
    #[must_use]
    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Look up a key column by field name.
    #[must_use]
    pub fn key_column(&self, field: &str) -> Option<&[FieldValue]> {
        self.keys
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, col)| col.as_slice())
    }

    /// Look up a metric column by name.
    #[must_use]
    pub fn metric_column(&self, metric: &str) -> Option<&[Option<f64>]> {
        self.metrics
            .iter()
            .find(|(name, _)| name == metric)
            .map(|(_, col)| col.as_slice())
    }

    /// True when the schema contains `metric`.
    #[must_use]
    pub fn has_metric(&self, metric: &str) -> bool {
        self.metric_column(metric).is_some()
    }

    /// Resolve a configured key field, surfacing the one fatal core
    /// error when it is absent from the schema.
    ///
    /// # Errors
    /// Returns [`Error::SchemaMismatch`] if `field` is not a key column.
    pub fn resolve_key(&self, field: &str) -> Result<&[FieldValue]> {
        self.key_column(field)
            .ok_or_else(|| Error::schema_mismatch(field))
    }

    /// Resolve a configured metric column.
    ///
    /// # Errors
    /// Returns [`Error::SchemaMismatch`] if `metric` is not in the schema.
    pub fn resolve_metric(&self, metric: &str) -> Result<&[Option<f64>]> {
        self.metric_column(metric)
            .ok_or_else(|| Error::schema_mismatch(metric))
    }

    /// Append a metric column.
    ///
    /// This is the ONLY post-load mutation: derived metrics are added
    /// as new columns without touching existing ones. Non-finite
    /// values are normalized to missing, same as at the load boundary.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the column length does not
    /// match the row count or the name is already a metric.
    pub fn append_metric(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.len {
            return Err(Error::InvalidInput(format!(
                "Column '{name}' has {} values, dataset has {} rows",
                values.len(),
                self.len
            )));
        }
        if self.has_metric(&name) {
            return Err(Error::InvalidInput(format!(
                "Metric column '{name}' already exists"
            )));
        }
        self.metrics.push((name, normalize_metric(values)));
        Ok(())
    }

    /// Partition row indices by the values of `grouping_key`.
    ///
    /// The empty grouping key yields exactly one partition (empty key
    /// tuple, all rows) even for an empty dataset. Missing key values
    /// form their own partition. The `BTreeMap` ordering over
    /// [`FieldValue`] tuples is the deterministic output order used by
    /// every downstream engine.
    ///
    /// # Errors
    /// Returns [`Error::SchemaMismatch`] if a grouping-key field is
    /// absent from the schema.
    pub fn partition(&self, grouping_key: &[String]) -> Result<BTreeMap<Vec<FieldValue>, Vec<usize>>> {
        let mut partitions: BTreeMap<Vec<FieldValue>, Vec<usize>> = BTreeMap::new();
        if grouping_key.is_empty() {
            partitions.insert(Vec::new(), (0..self.len).collect());
            return Ok(partitions);
        }

        let key_columns: Vec<&[FieldValue]> = grouping_key
            .iter()
            .map(|field| self.resolve_key(field))
            .collect::<Result<_>>()?;

        for row in 0..self.len {
            let key: Vec<FieldValue> = key_columns.iter().map(|col| col[row].clone()).collect();
            partitions.entry(key).or_default().push(row);
        }
        Ok(partitions)
    }
}

/// Metric cells are a finite real number or missing, nothing else: any
/// NaN or infinity handed to in-memory assembly collapses to missing.
fn normalize_metric(values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect()
}

/// Builder for [`Dataset`].
///
/// Columns may be added in any order; `build` validates that all
/// lengths agree and names are unique within their namespace.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    keys: Vec<(String, Vec<FieldValue>)>,
    metrics: Vec<(String, Vec<Option<f64>>)>,
}

impl DatasetBuilder {
    /// Add a grouping-key column.
    #[must_use]
    pub fn key_column(mut self, field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        self.keys.push((field.into(), values));
        self
    }

    /// Add a nullable metric column. Non-finite values are normalized
    /// to missing at build time.
    #[must_use]
    pub fn metric_column(mut self, metric: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.metrics.push((metric.into(), values));
        self
    }

    /// Build the dataset.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] on mismatched column lengths or
    /// duplicate column names.
    pub fn build(self) -> Result<Dataset> {
        let len = self
            .keys
            .first()
            .map(|(_, col)| col.len())
            .or_else(|| self.metrics.first().map(|(_, col)| col.len()))
            .unwrap_or(0);

        for (name, col) in &self.keys {
            if col.len() != len {
                return Err(Error::InvalidInput(format!(
                    "Key column '{name}' has {} values, expected {len}",
                    col.len()
                )));
            }
        }
        for (name, col) in &self.metrics {
            if col.len() != len {
                return Err(Error::InvalidInput(format!(
                    "Metric column '{name}' has {} values, expected {len}",
                    col.len()
                )));
            }
        }

        let mut seen_keys: Vec<&str> = Vec::new();
        for (name, _) in &self.keys {
            if seen_keys.contains(&name.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "Duplicate key column '{name}'"
                )));
            }
            seen_keys.push(name);
        }
        let mut seen_metrics: Vec<&str> = Vec::new();
        for (name, _) in &self.metrics {
            if seen_metrics.contains(&name.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "Duplicate metric column '{name}'"
                )));
            }
            seen_metrics.push(name);
        }

        Ok(Dataset {
            len,
            keys: self.keys,
            metrics: self
                .metrics
                .into_iter()
                .map(|(name, values)| (name, normalize_metric(values)))
                .collect(),
        })
    }
}
