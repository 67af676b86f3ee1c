//! Loader integration tests against on-disk CSV fixtures.

use claridad::config::SchemaConfig;
use claridad::dataset::FieldValue;
use claridad::{loader, Error};
use std::io::Write;

fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file.flush().expect("flush fixture");
    file
}

fn schema() -> SchemaConfig {
    SchemaConfig::new(
        vec!["EventKey".to_string(), "TargetLength".to_string()],
        vec!["ActualWordCount".to_string(), "NLI_AverageScore".to_string()],
    )
}

#[test]
fn load_csv_from_disk() {
    let fixture = write_fixture(
        "EventKey,TargetLength,ActualWordCount,NLI_AverageScore\n\
         sleep_start,50,48,0.81\n\
         journal_entry,100,N/A,0.74\n",
    );
    let dataset = loader::load_csv(fixture.path(), &schema()).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(
        dataset.key_column("EventKey").unwrap()[0],
        FieldValue::Text("sleep_start".to_string())
    );
    assert_eq!(
        dataset.metric_column("ActualWordCount").unwrap(),
        &[Some(48.0), None]
    );
}

#[test]
fn load_csv_missing_file_is_io_error() {
    let result = loader::load_csv("/no/such/file.csv", &schema());
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn load_csv_missing_declared_column_fails() {
    let fixture = write_fixture("EventKey,TargetLength\nsleep_start,50\n");
    let result = loader::load_csv(fixture.path(), &schema());
    match result {
        Err(Error::SchemaMismatch { field }) => assert_eq!(field, "ActualWordCount"),
        other => panic!("expected schema mismatch, got {other:?}"),
    }
}
