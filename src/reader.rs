//! Reading delimited text files into record sources

use crate::config::SourceOptions;
use crate::error::{CsvDiffError, Result};
use crate::record::{KeySpec, Schema, Source};
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Header and data rows of a delimited source, before key extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub schema: Schema,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// No header, no field names and no rows, as read from a zero-byte file
    pub fn is_blank(&self) -> bool {
        self.schema.is_empty() && self.rows.is_empty()
    }
}

/// Tokenizer for CSV-like sources
#[derive(Debug)]
pub struct SourceReader<'a> {
    options: &'a SourceOptions,
    encoding: &'static Encoding,
}

impl<'a> SourceReader<'a> {
    /// Create a reader, resolving the encoding label up front
    pub fn new(options: &'a SourceOptions) -> Result<Self> {
        let encoding = Encoding::for_label(options.encoding.trim().as_bytes())
            .ok_or_else(|| CsvDiffError::unknown_encoding(&options.encoding))?;

        if !options.has_header && options.field_names.is_empty() {
            log::debug!("No header and no field names; fields are named by position");
        }

        Ok(Self { options, encoding })
    }

    /// Read a file and build a keyed source from it
    pub fn load_source(&self, path: &Path, key_spec: &KeySpec) -> Result<Source> {
        let table = self.read_file(path)?;
        Self::keyed(path, table, key_spec)
    }

    /// Read both sides of a diff.
    ///
    /// A blank side takes the other side's schema, so it diffs as an empty
    /// source rather than failing key resolution.
    pub fn load_pair(&self, left: &Path, right: &Path, key_spec: &KeySpec) -> Result<(Source, Source)> {
        let mut left_table = self.read_file(left)?;
        let mut right_table = self.read_file(right)?;

        if left_table.is_blank() {
            log::debug!("{} is blank; using the fields of {}", left.display(), right.display());
            left_table.schema = right_table.schema.clone();
        } else if right_table.is_blank() {
            log::debug!("{} is blank; using the fields of {}", right.display(), left.display());
            right_table.schema = left_table.schema.clone();
        }

        Ok((
            Self::keyed(left, left_table, key_spec)?,
            Self::keyed(right, right_table, key_spec)?,
        ))
    }

    fn keyed(path: &Path, table: RawTable, key_spec: &KeySpec) -> Result<Source> {
        log::debug!(
            "Read {} rows with {} fields from {}",
            table.rows.len(),
            table.schema.len(),
            path.display()
        );
        Source::from_rows(path.display().to_string(), table.schema, table.rows, key_spec)
    }

    /// Read a file into a raw table
    pub fn read_file(&self, path: &Path) -> Result<RawTable> {
        if !path.is_file() {
            return Err(CsvDiffError::InvalidSource {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        self.read_from(BufReader::new(file)).map_err(|e| match e {
            CsvDiffError::Csv(err) => CsvDiffError::invalid_input(format!(
                "Malformed delimited file '{}': {}",
                path.display(),
                err
            )),
            other => other,
        })
    }

    /// Decode and tokenize any byte stream
    pub fn read_from<R: Read>(&self, input: R) -> Result<RawTable> {
        let decoded = DecodeReaderBytesBuilder::new()
            .encoding(Some(self.encoding))
            .bom_sniffing(true)
            .build(input);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(decoded);

        let mut records = reader.records();
        let header = if self.options.has_header {
            match records.next() {
                Some(record) => Some(record?),
                None => None,
            }
        } else {
            None
        };

        let mut rows = Vec::new();
        let mut width = 0;
        for record in records {
            let record = record?;
            width = width.max(record.len());
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let schema = if !self.options.field_names.is_empty() {
            Schema::new(self.options.field_names.iter().cloned())?
        } else if let Some(header) = header {
            Schema::new(header.iter())?
        } else {
            Schema::positional(width)
        };

        Ok(RawTable { schema, rows })
    }
}
