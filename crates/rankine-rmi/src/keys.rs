//! Sorted key storage backing the final bounded search.

use rankine_common::Record;

/// Contiguous storage for the sorted keys and their record positions.
///
/// Keys are held in one flat array so the bounded search at the end of a
/// lookup touches a single cache-friendly slab. Positions are trivially the
/// array index after bulk load; they are retained so the structure accounts
/// for the full footprint a record store would carry.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: Vec<f64>,
    positions: Vec<usize>,
}

impl KeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the store from records already sorted and renumbered.
    pub fn from_records(records: &[Record]) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].key <= w[1].key));
        Self {
            keys: records.iter().map(|r| r.key).collect(),
            positions: records.iter().map(|r| r.position).collect(),
        }
    }

    /// Number of keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the store holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the key at `index`.
    #[inline]
    pub fn key(&self, index: usize) -> f64 {
        self.keys[index]
    }

    /// All keys, ascending.
    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    /// First index `i` in `[start, end)` with `keys[i] >= key`, or `end` if
    /// no such index exists.
    #[inline]
    pub fn lower_bound_in(&self, start: usize, end: usize, key: f64) -> usize {
        start + self.keys[start..end].partition_point(|&k| k < key)
    }

    /// Bytes held by the key and position arrays.
    pub fn size_bytes(&self) -> usize {
        self.keys.len() * std::mem::size_of::<f64>()
            + self.positions.len() * std::mem::size_of::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(keys: &[f64]) -> KeyStore {
        let records: Vec<Record> = keys
            .iter()
            .enumerate()
            .map(|(i, &k)| Record::new(k, i))
            .collect();
        KeyStore::from_records(&records)
    }

    #[test]
    fn test_empty_store() {
        let s = KeyStore::new();
        assert_eq!(s.len(), 0);
        assert!(s.is_empty());
        assert_eq!(s.size_bytes(), 0);
        assert_eq!(s.lower_bound_in(0, 0, 1.0), 0);
    }

    #[test]
    fn test_full_range_lower_bound() {
        let s = store(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(s.lower_bound_in(0, 5, 5.0), 0);
        assert_eq!(s.lower_bound_in(0, 5, 10.0), 0);
        assert_eq!(s.lower_bound_in(0, 5, 25.0), 2);
        assert_eq!(s.lower_bound_in(0, 5, 50.0), 4);
        assert_eq!(s.lower_bound_in(0, 5, 51.0), 5);
    }

    #[test]
    fn test_subrange_lower_bound() {
        let s = store(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        // Window excludes the answer below: result clamps to window start.
        assert_eq!(s.lower_bound_in(2, 5, 5.0), 2);
        // Window excludes the answer above: result is the window end.
        assert_eq!(s.lower_bound_in(0, 2, 45.0), 2);
        // Window contains the answer.
        assert_eq!(s.lower_bound_in(1, 4, 30.0), 2);
    }

    #[test]
    fn test_duplicates_find_first_occurrence() {
        let s = store(&[1.0, 1.0, 1.0, 2.0, 2.0, 3.0]);
        assert_eq!(s.lower_bound_in(0, 6, 1.0), 0);
        assert_eq!(s.lower_bound_in(0, 6, 2.0), 3);
        assert_eq!(s.lower_bound_in(0, 6, 3.0), 5);
    }

    #[test]
    fn test_size_bytes() {
        let s = store(&[1.0, 2.0, 3.0]);
        let expected = 3 * std::mem::size_of::<f64>() + 3 * std::mem::size_of::<usize>();
        assert_eq!(s.size_bytes(), expected);
    }
}
