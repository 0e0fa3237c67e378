//! Command-line interface for csvdiff

use crate::config::{DiffOptions, SourceOptions};
use crate::error::{CsvDiffError, Result};
use crate::pairing::FileFilter;
use crate::record::FieldRef;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "csvdiff")]
#[command(about = "Key-based structural diff of CSV and other delimited files")]
#[command(version)]
pub struct Cli {
    /// Left ("from") file or directory
    pub from: PathBuf,

    /// Right ("to") file or directory
    pub to: PathBuf,

    /// Key fields, by name or zero-based index (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub key_fields: Vec<String>,

    /// Parent fields of a hierarchical key
    #[arg(long, value_delimiter = ',')]
    pub parent_fields: Vec<String>,

    /// Child fields of a hierarchical key
    #[arg(long, value_delimiter = ',')]
    pub child_fields: Vec<String>,

    /// Field names to use instead of (or in the absence of) a header row
    #[arg(long, value_delimiter = ',')]
    pub field_names: Vec<String>,

    /// Sources have no header row
    #[arg(long)]
    pub no_header: bool,

    /// Field delimiter: a single character, or "tab"
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Text encoding of the sources
    #[arg(long, default_value = crate::DEFAULT_ENCODING)]
    pub encoding: String,

    /// Fields to exclude from comparison and output
    #[arg(long, value_delimiter = ',')]
    pub ignore_fields: Vec<String>,

    /// Restrict reported field differences to these fields
    #[arg(long, value_delimiter = ',')]
    pub output_fields: Vec<String>,

    /// Only compare fields present in both sources
    #[arg(long)]
    pub diff_common_fields_only: bool,

    /// Include unchanged records in the report
    #[arg(long)]
    pub include_matched: bool,

    /// Compare values case-insensitively
    #[arg(long)]
    pub ignore_case: bool,

    /// Trim leading and trailing whitespace before comparing
    #[arg(long)]
    pub trim_whitespace: bool,

    #[arg(long)]
    pub ignore_adds: bool,

    #[arg(long)]
    pub ignore_deletes: bool,

    #[arg(long)]
    pub ignore_updates: bool,

    #[arg(long)]
    pub ignore_moves: bool,

    /// Report format: "text", "csv", "html" or "json"
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Report path (defaults to Diff_<from>_to_<to>.<ext> beside FROM)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File name patterns to compare in directory mode
    #[arg(long, value_delimiter = ',', default_value = crate::DEFAULT_PATTERN)]
    pub pattern: Vec<String>,

    /// File name patterns to skip in directory mode
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// JSON file with default diff options
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Engine options: the options file, overridden by explicit flags
    pub fn diff_options(&self) -> Result<DiffOptions> {
        let mut options = match &self.options {
            Some(path) => DiffOptions::from_file(path)?,
            None => DiffOptions::default(),
        };

        let refs = |values: &[String]| values.iter().map(|v| FieldRef::parse(v)).collect::<Vec<_>>();
        if !self.key_fields.is_empty() {
            options.key_fields = refs(&self.key_fields);
        }
        if !self.parent_fields.is_empty() {
            options.parent_fields = refs(&self.parent_fields);
        }
        if !self.child_fields.is_empty() {
            options.child_fields = refs(&self.child_fields);
        }
        if !self.ignore_fields.is_empty() {
            options.ignore_fields = refs(&self.ignore_fields);
        }
        if !self.output_fields.is_empty() {
            options.output_fields = refs(&self.output_fields);
        }

        options.diff_common_fields_only |= self.diff_common_fields_only;
        options.include_matched |= self.include_matched;
        options.ignore_case |= self.ignore_case;
        options.trim_whitespace |= self.trim_whitespace;
        options.ignore_adds |= self.ignore_adds;
        options.ignore_deletes |= self.ignore_deletes;
        options.ignore_updates |= self.ignore_updates;
        options.ignore_moves |= self.ignore_moves;

        options.validate()?;
        Ok(options)
    }

    /// Tokenizer options for both sources
    pub fn source_options(&self) -> Result<SourceOptions> {
        if self.no_header && self.field_names.is_empty() {
            log::info!("No header row and no field names given; fields are addressed by index");
        }
        Ok(SourceOptions {
            delimiter: self.delimiter,
            encoding: self.encoding.clone(),
            has_header: !self.no_header,
            field_names: self.field_names.clone(),
        })
    }

    pub fn file_filter(&self) -> FileFilter {
        FileFilter {
            include: self.pattern.clone(),
            exclude: self.exclude.clone(),
        }
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::parse(&self.format).map_err(CsvDiffError::invalid_input)
    }
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Html,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid output format: {}. Use 'text', 'csv', 'html' or 'json'",
                s
            )),
        }
    }

    /// File extension of reports in this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

/// Validate a single-byte delimiter
fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => return Ok(b'\t'),
        "comma" => return Ok(b','),
        "pipe" => return Ok(b'|'),
        _ => {}
    }

    let bytes = s.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii() {
        return Err(format!(
            "Invalid delimiter: '{}'. Must be a single ASCII character or 'tab'.",
            s
        ));
    }
    Ok(bytes[0])
}
