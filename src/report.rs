//! Diff model: entries, summary counts and the report accumulator

use crate::compare::FieldDiff;
use crate::record::{Key, Record};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// The change carried by a diff entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    Added {
        right: Record,
    },
    Deleted {
        left: Record,
    },
    Updated {
        left: Record,
        right: Record,
        field_diffs: Vec<FieldDiff>,
    },
    Unchanged {
        left: Record,
        right: Record,
    },
}

/// Display classification of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeKind {
    Add,
    Delete,
    Update,
    /// Unchanged fields, changed position
    Move,
    Match,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Delete => "Delete",
            Self::Update => "Update",
            Self::Move => "Move",
            Self::Match => "Match",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of a diff report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub key: Key,
    pub parent_key: Option<Key>,
    pub change: Change,
    pub moved: bool,
    /// Left source index, when move detection is enabled
    pub from_position: Option<usize>,
    /// Right source index, when move detection is enabled
    pub to_position: Option<usize>,
}

impl DiffEntry {
    pub fn new(key: Key, parent_key: Option<Key>, change: Change) -> Self {
        Self {
            key,
            parent_key,
            change,
            moved: false,
            from_position: None,
            to_position: None,
        }
    }

    pub fn added(record: &Record, track_positions: bool) -> Self {
        let entry = Self::new(
            record.key().clone(),
            record.parent_key().cloned(),
            Change::Added {
                right: record.clone(),
            },
        );
        if track_positions {
            entry.with_positions(None, Some(record.source_index()), false)
        } else {
            entry
        }
    }

    pub fn deleted(record: &Record, track_positions: bool) -> Self {
        let entry = Self::new(
            record.key().clone(),
            record.parent_key().cloned(),
            Change::Deleted {
                left: record.clone(),
            },
        );
        if track_positions {
            entry.with_positions(Some(record.source_index()), None, false)
        } else {
            entry
        }
    }

    pub fn with_positions(mut self, from: Option<usize>, to: Option<usize>, moved: bool) -> Self {
        self.from_position = from;
        self.to_position = to;
        self.moved = moved;
        self
    }

    pub fn kind(&self) -> ChangeKind {
        match (&self.change, self.moved) {
            (Change::Added { .. }, _) => ChangeKind::Add,
            (Change::Deleted { .. }, _) => ChangeKind::Delete,
            (Change::Updated { .. }, _) => ChangeKind::Update,
            (Change::Unchanged { .. }, true) => ChangeKind::Move,
            (Change::Unchanged { .. }, false) => ChangeKind::Match,
        }
    }

    pub fn left(&self) -> Option<&Record> {
        match &self.change {
            Change::Deleted { left }
            | Change::Updated { left, .. }
            | Change::Unchanged { left, .. } => Some(left),
            Change::Added { .. } => None,
        }
    }

    pub fn right(&self) -> Option<&Record> {
        match &self.change {
            Change::Added { right }
            | Change::Updated { right, .. }
            | Change::Unchanged { right, .. } => Some(right),
            Change::Deleted { .. } => None,
        }
    }

    pub fn field_diffs(&self) -> &[FieldDiff] {
        match &self.change {
            Change::Updated { field_diffs, .. } => field_diffs,
            _ => &[],
        }
    }

    /// Sibling order: by parent key, then key, absent parents first
    fn sibling_cmp(&self, other: &DiffEntry) -> Ordering {
        let parent = match (&self.parent_key, &other.parent_key) {
            (Some(a), Some(b)) => a.natural_cmp(b),
            (a, b) => a.is_some().cmp(&b.is_some()),
        };
        parent.then_with(|| self.key.natural_cmp(&other.key))
    }
}

/// Summary counts of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub deleted: usize,
    pub updated: usize,
    pub moved: usize,
    /// Matched pairs with no difference, whether retained or not
    pub unchanged: usize,
}

impl DiffSummary {
    /// Check if there are any reported differences
    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    /// Adds, deletes, updates and pure moves; an updated move counts once
    pub fn total_changes(&self) -> usize {
        self.added + self.deleted + self.updated + self.moved
    }
}

/// Which side of the diff a condition was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Non-fatal conditions folded into the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiffWarning {
    DuplicateKey { side: Side, key: Key },
    EmptySource { side: Side },
}

impl fmt::Display for DiffWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey { side, key } => {
                write!(f, "duplicate key '{}' in {} source", key, side)
            }
            Self::EmptySource { side } => write!(f, "{} source has no records", side),
        }
    }
}

/// Description of one side of the diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub label: String,
    pub fields: Vec<String>,
    pub record_count: usize,
}

/// The complete, deterministic result of one diff run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub left: SourceInfo,
    pub right: SourceInfo,
    pub compared_fields: Vec<String>,
    /// Fields eligible to appear in field diffs
    pub output_fields: Vec<String>,
    entries: Vec<DiffEntry>,
    pub summary: DiffSummary,
    pub left_duplicates: Vec<Key>,
    pub right_duplicates: Vec<Key>,
    pub warnings: Vec<DiffWarning>,
}

impl DiffReport {
    /// Entries in report order; each call starts a fresh pass
    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry> {
        self.entries.iter()
    }

    /// Entries of one kind, in report order
    pub fn entries_of(&self, kind: ChangeKind) -> impl Iterator<Item = &DiffEntry> + '_ {
        self.entries.iter().filter(move |e| e.kind() == kind)
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DiffReport {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds a report append-only while keeping running counts
#[derive(Debug, Default)]
pub struct ReportAccumulator {
    include_matched: bool,
    entries: Vec<DiffEntry>,
    summary: DiffSummary,
}

impl ReportAccumulator {
    pub fn new(include_matched: bool) -> Self {
        Self {
            include_matched,
            ..Self::default()
        }
    }

    /// Count an entry and retain it unless it is an unretained match
    pub fn push(&mut self, entry: DiffEntry) {
        if entry.moved {
            self.summary.moved += 1;
        }
        match entry.kind() {
            ChangeKind::Add => self.summary.added += 1,
            ChangeKind::Delete => self.summary.deleted += 1,
            ChangeKind::Update => self.summary.updated += 1,
            ChangeKind::Move => {}
            ChangeKind::Match => {
                self.summary.unchanged += 1;
                if !self.include_matched {
                    return;
                }
            }
        }
        self.entries.push(entry);
    }

    pub fn accumulate(
        &mut self,
        added: Vec<DiffEntry>,
        deleted: Vec<DiffEntry>,
        updated: Vec<DiffEntry>,
        moved: Vec<DiffEntry>,
        unchanged: Vec<DiffEntry>,
    ) {
        for entry in added
            .into_iter()
            .chain(deleted)
            .chain(updated)
            .chain(moved)
            .chain(unchanged)
        {
            self.push(entry);
        }
    }

    pub fn summary(&self) -> &DiffSummary {
        &self.summary
    }

    /// Order the entries and hand out the finished report
    pub fn finish(self, left: SourceInfo, right: SourceInfo) -> DiffReport {
        DiffReport {
            left,
            right,
            entries: hierarchy_order(self.entries),
            summary: self.summary,
            ..DiffReport::default()
        }
    }
}

/// Order entries depth-first: each entry is followed by the entries whose
/// parent key is its key, siblings in natural key order.
///
/// Entries whose parent is not itself reported are roots. Entries caught in
/// a parent cycle are emitted once, after the acyclic trees.
fn hierarchy_order(mut entries: Vec<DiffEntry>) -> Vec<DiffEntry> {
    entries.sort_by(|a, b| a.sibling_cmp(b));

    let (roots, children) = {
        let positions: HashMap<&Key, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (&e.key, i))
            .collect();
        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); entries.len()];
        for (i, entry) in entries.iter().enumerate() {
            match entry.parent_key.as_ref().and_then(|p| positions.get(p)) {
                Some(&parent) if parent != i => children[parent].push(i),
                _ => roots.push(i),
            }
        }
        (roots, children)
    };

    let mut visited = vec![false; entries.len()];
    let mut order = Vec::with_capacity(entries.len());
    for start in roots.into_iter().chain(0..entries.len()) {
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            order.push(i);
            stack.extend(children[i].iter().rev().copied());
        }
    }

    let mut slots: Vec<Option<DiffEntry>> = entries.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}
