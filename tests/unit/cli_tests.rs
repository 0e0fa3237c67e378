//! Unit tests for CLI argument parsing and validation

use clap::Parser;
use csvdiff::cli::{Cli, OutputFormat};
use csvdiff::{CsvDiffError, FieldRef};
use crate::common::TestFixture;

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["csvdiff", "old.csv", "new.csv", "-k", "id"]).unwrap();
    assert_eq!(cli.from.to_str(), Some("old.csv"));
    assert_eq!(cli.to.to_str(), Some("new.csv"));
    assert_eq!(cli.delimiter, b',');
    assert_eq!(cli.encoding, "utf-8");
    assert_eq!(cli.format, "text");
    assert_eq!(cli.pattern, vec!["*.csv"]);
    assert!(cli.output.is_none());
    assert!(!cli.no_header);
    assert!(!cli.verbose);
}

#[test]
fn test_cli_requires_both_inputs() {
    assert!(Cli::try_parse_from(["csvdiff", "old.csv"]).is_err());
}

#[test]
fn test_cli_key_lists() {
    let cli = Cli::try_parse_from([
        "csvdiff", "a.csv", "b.csv",
        "--parent-fields", "region,country",
        "--child-fields", "2",
    ])
    .unwrap();

    let options = cli.diff_options().unwrap();
    assert_eq!(
        options.parent_fields,
        vec![FieldRef::ByName("region".into()), FieldRef::ByName("country".into())]
    );
    assert_eq!(options.child_fields, vec![FieldRef::ByIndex(2)]);
    assert!(options.key_fields.is_empty());
}

#[test]
fn test_cli_flags_map_to_options() {
    let cli = Cli::try_parse_from([
        "csvdiff", "a.csv", "b.csv", "-k", "id",
        "--ignore-fields", "updated_at",
        "--output-fields", "name,price",
        "--ignore-case", "--trim-whitespace",
        "--include-matched", "--diff-common-fields-only",
        "--ignore-adds", "--ignore-deletes", "--ignore-updates", "--ignore-moves",
    ])
    .unwrap();

    let options = cli.diff_options().unwrap();
    assert_eq!(options.key_fields, vec![FieldRef::ByName("id".into())]);
    assert_eq!(options.ignore_fields, vec![FieldRef::ByName("updated_at".into())]);
    assert_eq!(options.output_fields.len(), 2);
    assert!(options.ignore_case && options.trim_whitespace);
    assert!(options.include_matched && options.diff_common_fields_only);
    assert!(options.ignore_adds && options.ignore_deletes);
    assert!(options.ignore_updates && options.ignore_moves);
}

#[test]
fn test_cli_rejects_key_with_child_fields() {
    let cli = Cli::try_parse_from([
        "csvdiff", "a.csv", "b.csv", "-k", "id", "--child-fields", "line",
    ])
    .unwrap();
    assert!(matches!(cli.diff_options(), Err(CsvDiffError::Config { .. })));
}

#[test]
fn test_cli_missing_key_is_key_error() {
    let cli = Cli::try_parse_from(["csvdiff", "a.csv", "b.csv"]).unwrap();
    assert!(matches!(cli.diff_options(), Err(CsvDiffError::KeyExtraction { .. })));
}

#[test]
fn test_cli_delimiter_names() {
    let cli = Cli::try_parse_from(["csvdiff", "a", "b", "-k", "0", "-d", "tab"]).unwrap();
    assert_eq!(cli.delimiter, b'\t');

    let cli = Cli::try_parse_from(["csvdiff", "a", "b", "-k", "0", "--delimiter", ";"]).unwrap();
    assert_eq!(cli.source_options().unwrap().delimiter, b';');

    assert!(Cli::try_parse_from(["csvdiff", "a", "b", "-d", "::"]).is_err());
}

#[test]
fn test_cli_source_options() {
    let cli = Cli::try_parse_from([
        "csvdiff", "a", "b", "-k", "id",
        "--no-header", "--field-names", "id,name",
        "--encoding", "latin1",
    ])
    .unwrap();

    let source = cli.source_options().unwrap();
    assert!(!source.has_header);
    assert_eq!(source.field_names, vec!["id", "name"]);
    assert_eq!(source.encoding, "latin1");
}

#[test]
fn test_cli_output_formats() {
    for (arg, expected) in [
        ("text", OutputFormat::Text),
        ("csv", OutputFormat::Csv),
        ("html", OutputFormat::Html),
        ("JSON", OutputFormat::Json),
    ] {
        let cli = Cli::try_parse_from(["csvdiff", "a", "b", "-k", "id", "-f", arg]).unwrap();
        assert_eq!(cli.output_format().unwrap(), expected);
    }

    let cli = Cli::try_parse_from(["csvdiff", "a", "b", "-k", "id", "-f", "xlsx"]).unwrap();
    assert!(matches!(cli.output_format(), Err(CsvDiffError::InvalidInput { .. })));
}

#[test]
fn test_cli_directory_filters() {
    let cli = Cli::try_parse_from([
        "csvdiff", "old", "new", "-k", "id",
        "--pattern", "*.csv,*.tsv",
        "--exclude", "tmp_*",
    ])
    .unwrap();

    let filter = cli.file_filter();
    assert!(filter.accepts("orders.tsv"));
    assert!(!filter.accepts("tmp_orders.csv"));
    assert!(!filter.accepts("orders.txt"));
}

#[test]
fn test_options_file_with_cli_override() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .create_csv_raw(
            "options.json",
            r#"{"key_fields": ["sku"], "ignore_case": true, "ignore_fields": [3]}"#,
        )
        .unwrap();
    let options_path = fixture.arg("options.json");

    let cli = Cli::try_parse_from(["csvdiff", "a", "b", "--options", &options_path]).unwrap();
    let options = cli.diff_options().unwrap();
    assert_eq!(options.key_fields, vec![FieldRef::ByName("sku".into())]);
    assert_eq!(options.ignore_fields, vec![FieldRef::ByIndex(3)]);
    assert!(options.ignore_case);
    assert!(!options.trim_whitespace);

    let cli = Cli::try_parse_from([
        "csvdiff", "a", "b", "--options", &options_path, "-k", "id", "--trim-whitespace",
    ])
    .unwrap();
    let options = cli.diff_options().unwrap();
    assert_eq!(options.key_fields, vec![FieldRef::ByName("id".into())]);
    assert!(options.ignore_case);
    assert!(options.trim_whitespace);
}

#[test]
fn test_invalid_options_file() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_csv_raw("options.json", "{ not json").unwrap();
    let options_path = fixture.arg("options.json");

    let cli = Cli::try_parse_from(["csvdiff", "a", "b", "--options", &options_path]).unwrap();
    assert!(matches!(cli.diff_options(), Err(CsvDiffError::Config { .. })));
}
