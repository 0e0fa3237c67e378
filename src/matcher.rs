//! Key-based matching of left and right records

use crate::config::DiffOptions;
use crate::record::{Key, Record};
use indexmap::{IndexMap, IndexSet};

/// Records of one source indexed by key, in encounter order
#[derive(Debug, Default)]
pub struct KeyIndex<'a> {
    entries: IndexMap<Key, &'a Record>,
    duplicates: IndexSet<Key>,
}

impl<'a> KeyIndex<'a> {
    /// Index records in a single pass; the first record seen for a key wins.
    ///
    /// Keys are taken verbatim. Case and whitespace options only affect
    /// field comparison, never which records pair up.
    pub fn build(records: &'a [Record]) -> Self {
        let mut index = Self {
            entries: IndexMap::with_capacity(records.len()),
            duplicates: IndexSet::new(),
        };

        for record in records {
            let key = record.key();
            if index.entries.contains_key(key) {
                index.duplicates.insert(key.clone());
            } else {
                index.entries.insert(key.clone(), record);
            }
        }

        index
    }

    pub fn get(&self, key: &Key) -> Option<&'a Record> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys and their first records, in encounter order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &'a Record)> + '_ {
        self.entries.iter().map(|(k, r)| (k, *r))
    }

    /// Keys seen more than once, each listed once as first encountered
    pub fn duplicates(&self) -> &IndexSet<Key> {
        &self.duplicates
    }
}

/// A left and a right record sharing the same key
#[derive(Debug, Clone, Copy)]
pub struct MatchedPair<'a> {
    pub left: &'a Record,
    pub right: &'a Record,
}

/// Partition of both sources by key
#[derive(Debug, Default)]
pub struct MatchResult<'a> {
    /// Right records whose key is absent on the left, in right order
    pub added: Vec<&'a Record>,
    /// Left records whose key is absent on the right, in left order
    pub deleted: Vec<&'a Record>,
    /// Pairs in left encounter order
    pub matched: Vec<MatchedPair<'a>>,
    pub left_duplicates: Vec<Key>,
    pub right_duplicates: Vec<Key>,
}

impl<'a> MatchResult<'a> {
    /// Drop suppressed partitions; matching itself has already happened
    pub fn suppress(&mut self, options: &DiffOptions) {
        if options.ignore_adds {
            self.added.clear();
        }
        if options.ignore_deletes {
            self.deleted.clear();
        }
    }
}

/// Match two record sets by key.
///
/// Both indices are built before any partition is computed. Large inputs
/// build them on two rayon tasks.
pub fn match_records<'a>(left: &'a [Record], right: &'a [Record]) -> MatchResult<'a> {
    let (left_index, right_index) =
        if left.len() + right.len() >= crate::PARALLEL_INDEX_THRESHOLD {
            rayon::join(|| KeyIndex::build(left), || KeyIndex::build(right))
        } else {
            (KeyIndex::build(left), KeyIndex::build(right))
        };

    log::debug!(
        "Indexed {} left keys and {} right keys",
        left_index.len(),
        right_index.len()
    );

    let mut result = MatchResult::default();

    for (key, left_record) in left_index.iter() {
        match right_index.get(key) {
            Some(right_record) => result.matched.push(MatchedPair {
                left: left_record,
                right: right_record,
            }),
            None => result.deleted.push(left_record),
        }
    }

    result.added = right_index
        .iter()
        .filter(|(key, _)| !left_index.contains(key))
        .map(|(_, record)| record)
        .collect();

    result.left_duplicates = left_index.duplicates().iter().cloned().collect();
    result.right_duplicates = right_index.duplicates().iter().cloned().collect();

    result
}
