// src/browse/sentinels.rs
// Decide which column represents which foreign key when column sets overlap

use std::collections::{BTreeMap, HashSet};

/// Result of [`separate_sentinels`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentinelResolution {
    /// One entry per input list: the claimed column, or `None` when the list
    /// had nothing left to claim.
    pub sentinels: Vec<Option<String>>,
    /// Sentinel column → index of the list (foreign key) it represents.
    pub ordering: BTreeMap<String, usize>,
    /// Participating columns claimed by no list, in first-seen order.
    pub remainder: Vec<String>,
}

impl SentinelResolution {
    pub fn sentinel_for(&self, column: &str) -> Option<usize> {
        self.ordering.get(column).copied()
    }

    pub fn is_remainder(&self, column: &str) -> bool {
        self.remainder.iter().any(|c| c == column)
    }
}

fn column_name<S: AsRef<str>>(column: &S) -> &str {
    column.as_ref()
}

/// Claim up to one sentinel per list, as close to the head of the list as
/// possible, skipping `None` placeholders and columns an earlier list already
/// claimed. Every other participating column ends up in the remainder.
pub fn separate_sentinels<S: AsRef<str>>(lists: &[Vec<Option<S>>]) -> SentinelResolution {
    let mut resolution = SentinelResolution::default();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut participants: Vec<&str> = Vec::new();

    for (index, list) in lists.iter().enumerate() {
        let claimed = list
            .iter()
            .flatten()
            .map(column_name)
            .find(|column| !resolution.ordering.contains_key(*column));

        match claimed {
            Some(column) => {
                resolution.ordering.insert(column.to_string(), index);
                resolution.sentinels.push(Some(column.to_string()));
            }
            None => resolution.sentinels.push(None),
        }

        for column in list.iter().flatten().map(column_name) {
            if seen.insert(column) {
                participants.push(column);
            }
        }
    }

    resolution.remainder = participants
        .into_iter()
        .filter(|column| !resolution.ordering.contains_key(*column))
        .map(str::to_string)
        .collect();
    resolution
}
