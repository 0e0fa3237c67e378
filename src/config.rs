//! Run configuration for the diff engine and the source reader

use crate::error::{CsvDiffError, Result};
use crate::record::{FieldRef, KeySpec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options controlling a single diff run.
///
/// The value is assembled once (options file, then command-line flags) and is
/// passed by reference to every engine component afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Fields forming the record key
    pub key_fields: Vec<FieldRef>,
    /// Fields forming the parent (ancestry) part of the key
    pub parent_fields: Vec<FieldRef>,
    /// Fields discriminating children within a parent
    pub child_fields: Vec<FieldRef>,
    /// Fields that are never compared nor output
    pub ignore_fields: Vec<FieldRef>,
    /// When non-empty, the only fields that may appear in field diffs
    pub output_fields: Vec<FieldRef>,
    pub diff_common_fields_only: bool,
    pub include_matched: bool,
    pub ignore_case: bool,
    pub trim_whitespace: bool,
    pub ignore_adds: bool,
    pub ignore_deletes: bool,
    pub ignore_updates: bool,
    pub ignore_moves: bool,
}

impl DiffOptions {
    /// Create options keyed on the given fields
    pub fn keyed_on<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldRef>,
    {
        Self {
            key_fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load options from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: DiffOptions = serde_json::from_str(&content).map_err(|e| {
            CsvDiffError::config(format!("Invalid options file '{}': {}", path.display(), e))
        })?;
        log::debug!("Loaded diff options from {}", path.display());
        Ok(options)
    }

    /// Derive the key specification from the configured key fields
    pub fn key_spec(&self) -> Result<KeySpec> {
        if !self.key_fields.is_empty() {
            if !self.child_fields.is_empty() {
                return Err(CsvDiffError::config(
                    "child fields cannot be combined with key fields; use either key fields or parent/child fields",
                ));
            }
            return Ok(KeySpec::Flat {
                key: self.key_fields.clone(),
                parent: self.parent_fields.clone(),
            });
        }

        if self.child_fields.is_empty() {
            return Err(CsvDiffError::key_extraction(
                "no key specified: provide key fields, or parent and child fields",
            ));
        }

        Ok(KeySpec::Hierarchical {
            parent: self.parent_fields.clone(),
            child: self.child_fields.clone(),
        })
    }

    /// Check the options for contradictions before any data is read
    pub fn validate(&self) -> Result<()> {
        self.key_spec()?;
        Ok(())
    }

    /// Whether move detection is active for this run
    pub fn tracks_moves(&self) -> bool {
        !self.ignore_moves
    }
}

/// Options for tokenizing a delimited text source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    pub delimiter: u8,
    /// Encoding label as understood by the WHATWG encoding standard
    pub encoding: String,
    pub has_header: bool,
    /// Explicit field names; required when there is no header row
    pub field_names: Vec<String>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: crate::DEFAULT_DELIMITER,
            encoding: crate::DEFAULT_ENCODING.to_string(),
            has_header: true,
            field_names: Vec::new(),
        }
    }
}
