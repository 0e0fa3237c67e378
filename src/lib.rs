//! # csvdiff
//!
//! A key-based structural diff engine for CSV and other delimited files.
//! Records are matched across two sources by a (possibly composite or
//! hierarchical) key and classified as added, deleted, updated, moved or
//! unchanged, with field-level differences for updates.

pub mod cli;
pub mod error;
pub mod config;
pub mod record;
pub mod compare;
pub mod matcher;
pub mod classify;
pub mod report;
pub mod engine;
pub mod reader;
pub mod pairing;
pub mod commands;
pub mod output;
pub mod progress;

pub use config::{DiffOptions, SourceOptions};
pub use engine::{diff, diff_rows};
pub use error::{CsvDiffError, Result};
pub use record::{FieldRef, Key, Record, Schema, Source};
pub use report::{ChangeKind, DiffEntry, DiffReport, DiffSummary};

/// Default field delimiter
pub const DEFAULT_DELIMITER: u8 = b',';

/// Default text encoding label
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Default file pattern for directory mode
pub const DEFAULT_PATTERN: &str = "*.csv";

/// Record count above which the two key indexes are built in parallel
pub const PARALLEL_INDEX_THRESHOLD: usize = 10_000;
