//! Classification of matched pairs: field updates and positional moves

use crate::compare::{FieldComparator, FieldPlan};
use crate::config::DiffOptions;
use crate::matcher::MatchedPair;
use crate::record::Key;
use crate::report::{Change, DiffEntry};
use std::collections::HashMap;

/// Matched pairs sorted into the report buckets
#[derive(Debug, Default)]
pub struct Classified {
    /// Pairs with differing fields, moved or not
    pub updated: Vec<DiffEntry>,
    /// Pairs with equal fields whose position changed
    pub moved: Vec<DiffEntry>,
    pub unchanged: Vec<DiffEntry>,
}

/// Ordinal of each matched pair among its matched siblings, per side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingRanks {
    left: Vec<usize>,
    right: Vec<usize>,
}

impl SiblingRanks {
    /// Rank pairs by source index within their parent group on each side.
    ///
    /// Only matched records are ranked, so records added or deleted around a
    /// pair never shift its ordinal.
    pub fn compute(pairs: &[MatchedPair<'_>]) -> Self {
        let left = rank_side(pairs, |p| (p.left.source_index(), p.left.parent_key()));
        let right = rank_side(pairs, |p| (p.right.source_index(), p.right.parent_key()));
        Self { left, right }
    }

    pub fn get(&self, pair_index: usize) -> (usize, usize) {
        (self.left[pair_index], self.right[pair_index])
    }
}

fn rank_side<'a, F>(pairs: &[MatchedPair<'a>], side: F) -> Vec<usize>
where
    F: Fn(&MatchedPair<'a>) -> (usize, Option<&'a Key>),
{
    let mut order: Vec<usize> = (0..pairs.len()).collect();
    order.sort_by_key(|&i| side(&pairs[i]).0);

    let mut next_rank: HashMap<Option<&Key>, usize> = HashMap::new();
    let mut ranks = vec![0; pairs.len()];
    for i in order {
        let counter = next_rank.entry(side(&pairs[i]).1).or_insert(0);
        ranks[i] = *counter;
        *counter += 1;
    }
    ranks
}

/// Decides Updated/Unchanged and moved for matched pairs
#[derive(Debug)]
pub struct DiffClassifier<'p> {
    plan: &'p FieldPlan,
    comparator: FieldComparator,
    compare_fields: bool,
    track_moves: bool,
}

impl<'p> DiffClassifier<'p> {
    pub fn new(plan: &'p FieldPlan, options: &DiffOptions) -> Self {
        Self {
            plan,
            comparator: FieldComparator::new(options),
            compare_fields: !options.ignore_updates,
            track_moves: options.tracks_moves(),
        }
    }

    /// Classify every matched pair, preserving the input order within buckets
    pub fn classify(&self, pairs: &[MatchedPair<'_>]) -> Classified {
        let ranks = self
            .track_moves
            .then(|| SiblingRanks::compute(pairs));

        let mut classified = Classified::default();
        for (i, pair) in pairs.iter().enumerate() {
            let moved = ranks
                .as_ref()
                .map(|r| self.is_moved(pair, r.get(i)))
                .unwrap_or(false);
            let entry = self.classify_pair(pair, moved);
            match (&entry.change, entry.moved) {
                (Change::Updated { .. }, _) => classified.updated.push(entry),
                (_, true) => classified.moved.push(entry),
                _ => classified.unchanged.push(entry),
            }
        }
        classified
    }

    /// A pair moved if its parent changed, or if its sibling ordinal changed
    /// under the same parent.
    pub fn is_moved(&self, pair: &MatchedPair<'_>, (left_rank, right_rank): (usize, usize)) -> bool {
        pair.left.parent_key() != pair.right.parent_key() || left_rank != right_rank
    }

    fn classify_pair(&self, pair: &MatchedPair<'_>, moved: bool) -> DiffEntry {
        let comparison = if self.compare_fields {
            Some(self.plan.compare_records(&self.comparator, pair.left, pair.right))
        } else {
            None
        };

        let change = match comparison {
            Some(result) if result.differs => Change::Updated {
                left: pair.left.clone(),
                right: pair.right.clone(),
                field_diffs: result.field_diffs,
            },
            _ => Change::Unchanged {
                left: pair.left.clone(),
                right: pair.right.clone(),
            },
        };

        let mut entry = DiffEntry::new(pair.right.key().clone(), pair.right.parent_key().cloned(), change);
        if self.track_moves {
            entry = entry.with_positions(
                Some(pair.left.source_index()),
                Some(pair.right.source_index()),
                moved,
            );
        }
        entry
    }
}
