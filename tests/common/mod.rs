//! Common test utilities and helpers

use csvdiff::{DiffOptions, DiffReport, Result, Schema};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary test environments
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file in the fixture, as a command-line argument
    pub fn arg(&self, name: &str) -> String {
        self.root().join(name).display().to_string()
    }

    /// Create a test CSV file with sample data
    pub fn create_csv(&self, name: &str, data: &[Vec<&str>]) -> Result<PathBuf> {
        let mut content = String::new();
        for row in data {
            content.push_str(&row.join(","));
            content.push('\n');
        }
        self.create_csv_raw(name, &content)
    }

    /// Create a test CSV file with raw string content
    pub fn create_csv_raw(&self, name: &str, content: &str) -> Result<PathBuf> {
        self.create_file_bytes(name, content.as_bytes())
    }

    /// Create a file with raw bytes, creating parent directories
    pub fn create_file_bytes(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a subdirectory
    pub fn create_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Read a written report
    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("Report should be readable")
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a csvdiff command and return the report path
    pub fn run_command(&self, args: &[&str]) -> Result<PathBuf> {
        use clap::Parser;
        use csvdiff::cli::Cli;
        use csvdiff::commands::execute_command;

        let mut cmd_args = vec!["csvdiff"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| csvdiff::CsvDiffError::invalid_input(e.to_string()))?;
        execute_command(&cli)
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) -> PathBuf {
        self.run_command(args).expect("Command should succeed")
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> csvdiff::CsvDiffError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Diff in-memory tables whose first row is the header
pub fn diff_tables(left: &[Vec<&str>], right: &[Vec<&str>], options: &DiffOptions) -> Result<DiffReport> {
    let split = |table: &[Vec<&str>]| -> Result<(Schema, Vec<Vec<String>>)> {
        let schema = Schema::new(table[0].iter().copied())?;
        let rows = table[1..]
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        Ok((schema, rows))
    };
    let (left_schema, left_rows) = split(left)?;
    let (right_schema, right_rows) = split(right)?;
    csvdiff::diff_rows(
        ("left", left_schema, left_rows),
        ("right", right_schema, right_rows),
        options,
    )
}

/// Keys of the report entries of one kind, rendered as text
pub fn keys_of(report: &DiffReport, kind: csvdiff::ChangeKind) -> Vec<String> {
    report.entries_of(kind).map(|e| e.key.to_string()).collect()
}

/// Sample data generators for testing
pub mod sample_data {
    pub fn simple_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price"],
            vec!["1", "Apple", "1.50"],
            vec!["2", "Banana", "0.75"],
            vec!["3", "Cherry", "2.00"],
        ]
    }

    pub fn updated_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price"],
            vec!["1", "Apple", "1.60"], // Price changed
            vec!["2", "Banana", "0.75"],
            vec!["4", "Date", "3.00"], // New row, Cherry removed
        ]
    }

    pub fn schema_changed_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price", "category"],
            vec!["1", "Apple", "1.50", "Fruit"],
            vec!["2", "Banana", "0.75", "Fruit"],
            vec!["3", "Cherry", "2.00", "Fruit"],
        ]
    }

    /// Order lines grouped under order numbers
    pub fn order_lines() -> Vec<Vec<&'static str>> {
        vec![
            vec!["order", "line", "sku", "qty"],
            vec!["A1", "1", "widget", "2"],
            vec!["A1", "2", "gadget", "1"],
            vec!["B7", "1", "widget", "5"],
        ]
    }
}
