//! Record model: schemas, keys and parsed source rows

use crate::error::{CsvDiffError, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Reference to a field, either by header name or by zero-based column index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRef {
    ByIndex(usize),
    ByName(String),
}

impl FieldRef {
    /// Parse a command-line field reference; plain digits are column indices
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<usize>() {
            Ok(index) => Self::ByIndex(index),
            Err(_) => Self::ByName(s.to_string()),
        }
    }
}

impl FromStr for FieldRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FieldRef {
    fn from(s: &str) -> Self {
        Self::ByName(s.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(s: String) -> Self {
        Self::ByName(s)
    }
}

impl From<usize> for FieldRef {
    fn from(index: usize) -> Self {
        Self::ByIndex(index)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByIndex(index) => write!(f, "#{}", index),
            Self::ByName(name) => write!(f, "'{}'", name),
        }
    }
}

/// Ordered, unique field names of one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: IndexSet<String>,
}

impl Schema {
    /// Build a schema from header names; duplicate names are rejected
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = IndexSet::new();
        for name in names {
            let name = name.into();
            if !fields.insert(name.clone()) {
                return Err(CsvDiffError::invalid_input(format!(
                    "Duplicate field name '{}' in header",
                    name
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Schema naming each column by its zero-based position
    pub fn positional(width: usize) -> Self {
        Self {
            fields: (0..width).map(|i| i.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.fields.get_index(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Resolve a field reference to a column index
    pub fn resolve(&self, field: &FieldRef) -> Option<usize> {
        match field {
            FieldRef::ByIndex(index) if *index < self.len() => Some(*index),
            FieldRef::ByIndex(_) => None,
            FieldRef::ByName(name) => self.index_of(name),
        }
    }

    /// Resolve a field reference to its name in this schema
    pub fn resolve_name(&self, field: &FieldRef) -> Option<&str> {
        self.resolve(field).and_then(|index| self.name(index))
    }

    fn resolve_key_field(&self, role: &str, field: &FieldRef) -> Result<usize> {
        self.resolve(field).ok_or_else(|| match field {
            FieldRef::ByIndex(index) => CsvDiffError::key_extraction(format!(
                "{} field index {} is out of range for {} fields",
                role,
                index,
                self.len()
            )),
            FieldRef::ByName(name) => CsvDiffError::key_extraction(format!(
                "{} field '{}' not found in fields [{}]",
                role,
                name,
                self.names().collect::<Vec<_>>().join(", ")
            )),
        })
    }
}

/// Ordered tuple of field values identifying a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(Vec<String>);

impl Key {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Component-wise order in which numeric values compare by magnitude,
    /// so `"2"` sorts before `"10"`. Other values compare as text.
    pub fn natural_cmp(&self, other: &Key) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let ordering = natural_value_cmp(a, b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" - "))
    }
}

fn natural_value_cmp(a: &str, b: &str) -> Ordering {
    let number = |s: &str| s.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    let by_magnitude = match (number(a), number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    // "1" and "01" are equal in magnitude; text keeps the order total
    by_magnitude.then_with(|| a.cmp(b))
}

/// How the key of a record is composed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySpec {
    /// Key fields, plus optional parent fields providing hierarchy context
    Flat {
        key: Vec<FieldRef>,
        parent: Vec<FieldRef>,
    },
    /// Key is the parent fields followed by the child fields
    Hierarchical {
        parent: Vec<FieldRef>,
        child: Vec<FieldRef>,
    },
}

impl KeySpec {
    /// Resolve the key fields against a schema, once per source
    pub fn resolve(&self, schema: &Schema) -> Result<KeyColumns> {
        let resolve_all = |role: &str, fields: &[FieldRef]| -> Result<Vec<usize>> {
            fields
                .iter()
                .map(|field| schema.resolve_key_field(role, field))
                .collect()
        };

        match self {
            Self::Flat { key, parent } => Ok(KeyColumns {
                key: resolve_all("key", key)?,
                parent: resolve_all("parent", parent)?,
            }),
            Self::Hierarchical { parent, child } => {
                let parent = resolve_all("parent", parent)?;
                let child = resolve_all("child", child)?;
                let key = parent.iter().chain(child.iter()).copied().collect();
                Ok(KeyColumns { key, parent })
            }
        }
    }
}

/// Key fields resolved to column positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumns {
    pub key: Vec<usize>,
    pub parent: Vec<usize>,
}

impl KeyColumns {
    fn extract(&self, columns: &[usize], values: &[String]) -> Key {
        Key(columns
            .iter()
            .map(|&i| values.get(i).cloned().unwrap_or_default())
            .collect())
    }
}

/// One parsed source row with its derived key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    values: Vec<String>,
    key: Key,
    parent_key: Option<Key>,
    source_index: usize,
}

impl Record {
    /// Build a record from a raw row using already-resolved key columns
    pub fn from_row(values: Vec<String>, columns: &KeyColumns, source_index: usize) -> Self {
        let key = columns.extract(&columns.key, &values);
        let parent_key = if columns.parent.is_empty() {
            None
        } else {
            Some(columns.extract(&columns.parent, &values))
        };
        Self {
            values,
            key,
            parent_key,
            source_index,
        }
    }

    /// Build a single record, resolving the key fields against the schema
    pub fn new(
        values: Vec<String>,
        schema: &Schema,
        key_spec: &KeySpec,
        source_index: usize,
    ) -> Result<Self> {
        let columns = key_spec.resolve(schema)?;
        Ok(Self::from_row(values, &columns, source_index))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at a column; rows shorter than the schema read as empty
    pub fn value(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn parent_key(&self) -> Option<&Key> {
        self.parent_key.as_ref()
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }
}

/// A fully parsed source: label, schema and records in source order
#[derive(Debug, Clone)]
pub struct Source {
    label: String,
    schema: Schema,
    records: Vec<Record>,
}

impl Source {
    /// Build a source from raw rows, resolving the key fields once
    pub fn from_rows<I>(
        label: impl Into<String>,
        schema: Schema,
        rows: I,
        key_spec: &KeySpec,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let label = label.into();
        let mut rows = rows.into_iter().peekable();

        // No fields and no rows: nothing to key, and nothing to resolve against
        if schema.is_empty() && rows.peek().is_none() {
            return Ok(Self {
                label,
                schema,
                records: Vec::new(),
            });
        }

        let columns = key_spec.resolve(&schema).map_err(|e| match e {
            CsvDiffError::KeyExtraction { message } => {
                CsvDiffError::key_extraction(format!("{} in '{}'", message, label))
            }
            other => other,
        })?;

        let records = rows
            .enumerate()
            .map(|(index, values)| Record::from_row(values, &columns, index))
            .collect();

        Ok(Self {
            label,
            schema,
            records,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
