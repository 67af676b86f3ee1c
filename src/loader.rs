//! CSV ingestion
//!
//! Load-once boundary between raw trial exports and the typed
//! [`Dataset`]. Sentinel strings and unparsable numerics are coerced
//! to missing here so no string placeholder or NaN ever reaches a
//! downstream engine; only a schema-configuration error (a declared
//! column absent from the header) fails the load.

use crate::config::SchemaConfig;
use crate::dataset::{Dataset, FieldValue};
use crate::{Error, Result};
use std::io;
use std::path::Path;
use tracing::info;

/// Load a headered CSV file into a [`Dataset`] per `schema`.
///
/// # Errors
/// Returns an error if the file cannot be read, a record is malformed,
/// or a schema-declared column is missing from the header.
pub fn load_csv<P: AsRef<Path>>(path: P, schema: &SchemaConfig) -> Result<Dataset> {
    let file = std::fs::File::open(path.as_ref())?;
    let dataset = read_csv(file, schema)?;
    info!(
        rows = dataset.len(),
        path = %path.as_ref().display(),
        "loaded trial data"
    );
    Ok(dataset)
}

/// Read headered CSV data from any reader into a [`Dataset`].
///
/// Cell handling:
/// - sentinel cells (per [`SchemaConfig::is_sentinel`]) become missing
/// - numeric cells that fail to parse, or parse non-finite, become
///   missing rather than failing the load
/// - key cells parse as integer categories when possible, text
///   otherwise
///
/// # Errors
/// Returns [`Error::SchemaMismatch`] if a declared key or numeric
/// field is absent from the header, or [`Error::Csv`] on malformed
/// records.
pub fn read_csv<R: io::Read>(reader: R, schema: &SchemaConfig) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let header_index = |field: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == field)
            .ok_or_else(|| Error::schema_mismatch(field))
    };

    let key_indices: Vec<(String, usize)> = schema
        .key_fields
        .iter()
        .map(|f| header_index(f).map(|i| (f.clone(), i)))
        .collect::<Result<_>>()?;
    let numeric_indices: Vec<(String, usize)> = schema
        .numeric_fields
        .iter()
        .map(|f| header_index(f).map(|i| (f.clone(), i)))
        .collect::<Result<_>>()?;

    let mut key_columns: Vec<Vec<FieldValue>> = vec![Vec::new(); key_indices.len()];
    let mut metric_columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); numeric_indices.len()];

    for record in csv_reader.records() {
        let record = record?;
        for (slot, (_, idx)) in key_indices.iter().enumerate() {
            key_columns[slot].push(parse_key_cell(record.get(*idx), schema));
        }
        for (slot, (_, idx)) in numeric_indices.iter().enumerate() {
            metric_columns[slot].push(parse_numeric_cell(record.get(*idx), schema));
        }
    }

    let mut builder = Dataset::builder();
    for ((field, _), column) in key_indices.into_iter().zip(key_columns) {
        builder = builder.key_column(field, column);
    }
    for ((field, _), column) in numeric_indices.into_iter().zip(metric_columns) {
        builder = builder.metric_column(field, column);
    }
    builder.build()
}

fn parse_key_cell(cell: Option<&str>, schema: &SchemaConfig) -> FieldValue {
    match cell {
        Some(raw) if !schema.is_sentinel(raw) => FieldValue::parse(raw),
        _ => FieldValue::Missing,
    }
}

fn parse_numeric_cell(cell: Option<&str>, schema: &SchemaConfig) -> Option<f64> {
    let raw = cell?;
    if schema.is_sentinel(raw) {
        return None;
    }
    // Unparsable and non-finite values coerce to missing, never fail
    // the load and never enter the table as NaN.
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_schema() -> SchemaConfig {
        SchemaConfig::new(
            vec!["TargetLength".to_string(), "EventKey".to_string()],
            vec![
                "TargetLength".to_string(),
                "ActualWordCount".to_string(),
                "NLI_AverageScore".to_string(),
            ],
        )
    }

    #[test]
    fn test_read_csv_typed_columns() {
        let data = "\
TargetLength,EventKey,ActualWordCount,NLI_AverageScore
50,sleep_start,61,0.84
100,journal_entry,118,0.79
";
        let dataset = read_csv(data.as_bytes(), &test_schema()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.key_column("TargetLength").unwrap()[0],
            FieldValue::Int(50)
        );
        assert_eq!(
            dataset.key_column("EventKey").unwrap()[1],
            FieldValue::Text("journal_entry".to_string())
        );
        assert_eq!(
            dataset.metric_column("NLI_AverageScore").unwrap()[1],
            Some(0.79)
        );
    }

    #[test]
    fn test_sentinels_and_junk_coerce_to_missing() {
        let data = "\
TargetLength,EventKey,ActualWordCount,NLI_AverageScore
50,sleep_start,N/A,0.84
100,,not-a-number,inf
150,journal_entry,90,
";
        let dataset = read_csv(data.as_bytes(), &test_schema()).unwrap();
        let counts = dataset.metric_column("ActualWordCount").unwrap();
        assert_eq!(counts, &[None, None, Some(90.0)]);
        let nli = dataset.metric_column("NLI_AverageScore").unwrap();
        assert_eq!(nli, &[Some(0.84), None, None]);
        assert_eq!(
            dataset.key_column("EventKey").unwrap()[1],
            FieldValue::Missing
        );
    }

    #[test]
    fn test_field_in_both_namespaces() {
        let data = "\
TargetLength,EventKey,ActualWordCount,NLI_AverageScore
50,sleep_start,61,0.84
";
        let dataset = read_csv(data.as_bytes(), &test_schema()).unwrap();
        // TargetLength doubles as grouping key and numeric target
        assert!(dataset.key_column("TargetLength").is_some());
        assert_eq!(dataset.metric_column("TargetLength").unwrap(), &[Some(50.0)]);
    }

    #[test]
    fn test_missing_declared_column_is_schema_mismatch() {
        let data = "TargetLength,EventKey\n50,x\n";
        let result = read_csv(data.as_bytes(), &test_schema());
        assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn test_empty_body_loads_empty_dataset() {
        let data = "TargetLength,EventKey,ActualWordCount,NLI_AverageScore\n";
        let dataset = read_csv(data.as_bytes(), &test_schema()).unwrap();
        assert!(dataset.is_empty());
    }
}
