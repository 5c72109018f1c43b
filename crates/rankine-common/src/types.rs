//! Core record type shared by the index structures and dataset producers.

use serde::{Deserialize, Serialize};

/// A key paired with its rank in the ascending sort of the dataset.
///
/// After bulk load, `position` equals the record's array index: the index
/// structures rely on `data[i].position == i`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The indexed key.
    pub key: f64,
    /// Zero-based rank of the key in the sorted dataset.
    pub position: usize,
}

impl Record {
    /// Creates a new record.
    pub fn new(key: f64, position: usize) -> Self {
        Self { key, position }
    }
}

/// Sorts records ascending by key (stable tie-break on position) and rewrites
/// each position to its final index.
///
/// Dataset producers call this before handing records to an index; the RMI
/// also applies it defensively at build time, so producers that already
/// deliver sorted, renumbered data pay only a verification pass.
pub fn sort_and_renumber(records: &mut [Record]) {
    records.sort_by(|a, b| {
        a.key
            .total_cmp(&b.key)
            .then_with(|| a.position.cmp(&b.position))
    });
    for (i, record) in records.iter_mut().enumerate() {
        record.position = i;
    }
}
