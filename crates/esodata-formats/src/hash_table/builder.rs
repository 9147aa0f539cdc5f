//! Builder for keyed hash tables
//!
//! Pairs are placed the way the reader probes for them: each key goes into
//! the first empty bucket at or after `hash64(key) % bucket_count`, wrapping
//! at the end. Pair indices follow insertion order.

use esodata_crypto::hash64;

use super::{KeyedHashTable, OCCUPIED_TAG, PAIR_INDEX_MASK, TableKey};
use crate::error::{FormatError, FormatResult};

/// Builder for [`KeyedHashTable`]
#[derive(Debug, Clone)]
pub struct KeyedHashTableBuilder<K, V> {
    pairs: Vec<(K, V)>,
    bucket_count: Option<usize>,
}

impl<K, V> Default for KeyedHashTableBuilder<K, V> {
    fn default() -> Self {
        Self {
            pairs: Vec::new(),
            bucket_count: None,
        }
    }
}

impl<K: TableKey, V> KeyedHashTableBuilder<K, V> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use exactly `bucket_count` buckets instead of twice the pair count
    pub fn with_bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = Some(bucket_count);
        self
    }

    /// Add a pair, replacing the value of an existing equal key
    pub fn insert(mut self, key: K, value: V) -> Self {
        self.push(key, value);
        self
    }

    /// Add a pair in place, replacing the value of an existing equal key
    pub fn push(&mut self, key: K, value: V) {
        if let Some(slot) = self.pairs.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = value;
        } else {
            self.pairs.push((key, value));
        }
    }

    /// Number of pairs added so far
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair has been added
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Lay out buckets and produce the table
    pub fn build(self) -> FormatResult<KeyedHashTable<K, V>> {
        let pair_count = self.pairs.len();
        let bucket_count = self.bucket_count.unwrap_or(pair_count * 2);

        if pair_count > bucket_count || pair_count > PAIR_INDEX_MASK as usize + 1 {
            return Err(FormatError::TableFull {
                pairs: pair_count,
                buckets: bucket_count,
            });
        }

        let mut buckets = vec![0u32; bucket_count];
        let mut keys = Vec::with_capacity(pair_count);
        let mut values = Vec::with_capacity(pair_count);

        for (index, (key, value)) in self.pairs.into_iter().enumerate() {
            let start = (hash64(key.raw_bytes().as_ref()) % bucket_count as u64) as usize;
            let slot = (0..bucket_count)
                .map(|step| (start + step) % bucket_count)
                .find(|&slot| buckets[slot] == 0)
                .ok_or(FormatError::TableFull {
                    pairs: pair_count,
                    buckets: bucket_count,
                })?;
            buckets[slot] = OCCUPIED_TAG | index as u32;
            keys.push(key);
            values.push(value);
        }

        KeyedHashTable::from_parts(buckets, keys, values)
    }
}
