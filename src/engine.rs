//! Diff engine entry point

use crate::classify::DiffClassifier;
use crate::compare::FieldPlan;
use crate::config::DiffOptions;
use crate::error::Result;
use crate::matcher::match_records;
use crate::record::{Schema, Source};
use crate::report::{DiffEntry, DiffReport, DiffWarning, ReportAccumulator, Side, SourceInfo};

/// Diff two sources.
///
/// Fails without producing a report when the key is unusable or the
/// schemas disagree; duplicate keys and empty sources are recorded as
/// warnings in the returned report.
pub fn diff(left: &Source, right: &Source, options: &DiffOptions) -> Result<DiffReport> {
    options.validate()?;
    let plan = FieldPlan::build(left.schema(), right.schema(), options)?;

    let mut warnings = Vec::new();
    for (side, source) in [(Side::Left, left), (Side::Right, right)] {
        if source.is_empty() {
            log::warn!("{} source '{}' has no records", side, source.label());
            warnings.push(DiffWarning::EmptySource { side });
        }
    }

    let mut matched = match_records(left.records(), right.records());
    for key in &matched.left_duplicates {
        log::warn!("Duplicate key '{}' in '{}'; first record wins", key, left.label());
        warnings.push(DiffWarning::DuplicateKey {
            side: Side::Left,
            key: key.clone(),
        });
    }
    for key in &matched.right_duplicates {
        log::warn!("Duplicate key '{}' in '{}'; first record wins", key, right.label());
        warnings.push(DiffWarning::DuplicateKey {
            side: Side::Right,
            key: key.clone(),
        });
    }
    matched.suppress(options);

    let track_positions = options.tracks_moves();
    let added = matched
        .added
        .iter()
        .map(|r| DiffEntry::added(r, track_positions))
        .collect();
    let deleted = matched
        .deleted
        .iter()
        .map(|r| DiffEntry::deleted(r, track_positions))
        .collect();
    let classified = DiffClassifier::new(&plan, options).classify(&matched.matched);

    let mut accumulator = ReportAccumulator::new(options.include_matched);
    accumulator.accumulate(
        added,
        deleted,
        classified.updated,
        classified.moved,
        classified.unchanged,
    );

    let mut report = accumulator.finish(source_info(left), source_info(right));
    report.compared_fields = plan.names();
    report.output_fields = plan.output_names();
    report.left_duplicates = matched.left_duplicates;
    report.right_duplicates = matched.right_duplicates;
    report.warnings = warnings;

    log::debug!(
        "Diff '{}' -> '{}': {} added, {} deleted, {} updated, {} moved, {} unchanged",
        left.label(),
        right.label(),
        report.summary.added,
        report.summary.deleted,
        report.summary.updated,
        report.summary.moved,
        report.summary.unchanged
    );

    Ok(report)
}

/// Build both sources from raw rows and diff them
pub fn diff_rows<L, R>(
    left: (&str, Schema, L),
    right: (&str, Schema, R),
    options: &DiffOptions,
) -> Result<DiffReport>
where
    L: IntoIterator<Item = Vec<String>>,
    R: IntoIterator<Item = Vec<String>>,
{
    let key_spec = options.key_spec()?;
    let left = Source::from_rows(left.0, left.1, left.2, &key_spec)?;
    let right = Source::from_rows(right.0, right.1, right.2, &key_spec)?;
    diff(&left, &right, options)
}

fn source_info(source: &Source) -> SourceInfo {
    SourceInfo {
        label: source.label().to_string(),
        fields: source.schema().names().map(str::to_string).collect(),
        record_count: source.len(),
    }
}
