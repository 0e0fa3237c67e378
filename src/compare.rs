//! Field comparison: value normalization and the per-run field plan

use crate::config::DiffOptions;
use crate::error::{CsvDiffError, Result};
use crate::record::{FieldRef, Record, Schema};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Outcome of comparing two field values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldComparison {
    Equal,
    Different,
}

/// Compares field values under the run's normalization rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldComparator {
    ignore_case: bool,
    trim_whitespace: bool,
}

impl FieldComparator {
    pub fn new(options: &DiffOptions) -> Self {
        Self {
            ignore_case: options.ignore_case,
            trim_whitespace: options.trim_whitespace,
        }
    }

    /// Normalize a value; borrows when no rule changes it
    pub fn normalize<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let value = if self.trim_whitespace {
            value.trim()
        } else {
            value
        };
        if self.ignore_case {
            Cow::Owned(value.to_lowercase())
        } else {
            Cow::Borrowed(value)
        }
    }

    pub fn compare(&self, left: &str, right: &str) -> FieldComparison {
        if self.normalize(left) == self.normalize(right) {
            FieldComparison::Equal
        } else {
            FieldComparison::Different
        }
    }
}

/// A field taking part in comparison, with its column on each side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedField {
    pub name: String,
    pub left: Option<usize>,
    pub right: Option<usize>,
    /// Whether a difference in this field is listed in field diffs
    pub output: bool,
}

/// One differing field of an updated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    pub left: String,
    pub right: String,
}

/// Result of comparing every planned field of a matched pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordComparison {
    /// Any planned field differs, output-eligible or not
    pub differs: bool,
    pub field_diffs: Vec<FieldDiff>,
}

/// The fields compared in a run, computed once from both schemas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPlan {
    fields: Vec<PlannedField>,
}

impl FieldPlan {
    /// Build the plan, failing when the schemas disagree and the run
    /// does not restrict itself to common fields.
    pub fn build(left: &Schema, right: &Schema, options: &DiffOptions) -> Result<Self> {
        let ignored = resolve_names(&options.ignore_fields, left, right, "ignore");
        let outputs = resolve_names(&options.output_fields, left, right, "output");

        let mut names: IndexSet<&str> = left.names().filter(|n| !ignored.contains(*n)).collect();
        let right_only: Vec<&str> = right
            .names()
            .filter(|n| !ignored.contains(*n) && !left.contains(n))
            .collect();
        let left_only: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !right.contains(n))
            .collect();

        if !options.diff_common_fields_only && (!left_only.is_empty() || !right_only.is_empty()) {
            return Err(CsvDiffError::schema_mismatch(format!(
                "fields only in left: [{}]; fields only in right: [{}]",
                left_only.join(", "),
                right_only.join(", ")
            )));
        }
        if options.diff_common_fields_only {
            names.retain(|n| right.contains(n));
        }

        let fields = names
            .into_iter()
            .map(|name| PlannedField {
                name: name.to_string(),
                left: left.index_of(name),
                right: right.index_of(name),
                output: outputs.is_empty() || outputs.contains(name),
            })
            .collect();

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[PlannedField] {
        &self.fields
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Names of the fields that may appear in reports
    pub fn output_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.output)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Compare a matched pair field by field
    pub fn compare_records(
        &self,
        comparator: &FieldComparator,
        left: &Record,
        right: &Record,
    ) -> RecordComparison {
        let mut result = RecordComparison::default();

        for field in &self.fields {
            // Fields missing on one side are only planned under common-fields mode,
            // where they never count as a difference.
            let (Some(li), Some(ri)) = (field.left, field.right) else {
                continue;
            };
            let (lv, rv) = (left.value(li), right.value(ri));
            if comparator.compare(lv, rv) == FieldComparison::Different {
                result.differs = true;
                if field.output {
                    result.field_diffs.push(FieldDiff {
                        field: field.name.clone(),
                        left: lv.to_string(),
                        right: rv.to_string(),
                    });
                }
            }
        }

        result
    }
}

/// Resolve field references against either schema, left first
fn resolve_names(
    fields: &[FieldRef],
    left: &Schema,
    right: &Schema,
    role: &str,
) -> IndexSet<String> {
    let mut names = IndexSet::new();
    for field in fields {
        match left.resolve_name(field).or_else(|| right.resolve_name(field)) {
            Some(name) => {
                names.insert(name.to_string());
            }
            None => log::warn!("Ignoring unknown {} field {}", role, field),
        }
    }
    names
}
