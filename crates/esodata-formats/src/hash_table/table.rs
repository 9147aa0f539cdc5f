use esodata_crypto::hash64;

use super::{HASH_TABLE_SECTIONS, HASH_TABLE_TYPE, OCCUPIED_TAG, PAIR_INDEX_MASK, STATE_MASK};
use crate::error::{FormatError, FormatResult};
use crate::region::{EndianMode, read_compressed, write_compressed};
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize};

/// Key type stored in a [`KeyedHashTable`]
///
/// Keys are hashed and compared by their raw little-endian bytes.
pub trait TableKey: Copy + Eq {
    /// Fixed-size byte form of the key
    type Raw: AsRef<[u8]>;

    /// Raw bytes used for hashing and comparison
    fn raw_bytes(&self) -> Self::Raw;
}

impl TableKey for u32 {
    type Raw = [u8; 4];

    fn raw_bytes(&self) -> [u8; 4] {
        self.to_le_bytes()
    }
}

impl TableKey for u64 {
    type Raw = [u8; 8];

    fn raw_bytes(&self) -> [u8; 8] {
        self.to_le_bytes()
    }
}

/// Decoded state of one bucket tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketState {
    /// Never used; ends a probe
    Empty,
    /// Holds the pair at this index
    Occupied(u32),
    /// Reserved state; probing continues past it
    Skip,
}

impl BucketState {
    /// Decode a raw bucket tag
    pub const fn from_tag(tag: u32) -> Self {
        match tag & STATE_MASK {
            0 => Self::Empty,
            OCCUPIED_TAG => Self::Occupied(tag & PAIR_INDEX_MASK),
            _ => Self::Skip,
        }
    }
}

/// Open-addressed hash table with parallel key and value arrays
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedHashTable<K, V> {
    buckets: Vec<u32>,
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K, V> Default for KeyedHashTable<K, V> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
            keys: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<K: TableKey, V> KeyedHashTable<K, V> {
    /// Create an empty table with no buckets
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a table from raw arrays, validating every occupied bucket
    pub fn from_parts(buckets: Vec<u32>, keys: Vec<K>, values: Vec<V>) -> FormatResult<Self> {
        if keys.len() != values.len() {
            return Err(FormatError::MismatchedPairArrays {
                keys: keys.len(),
                values: values.len(),
            });
        }
        for (bucket, &tag) in buckets.iter().enumerate() {
            if let BucketState::Occupied(pair) = BucketState::from_tag(tag)
                && pair as usize >= keys.len()
            {
                return Err(FormatError::InvalidPairIndex {
                    bucket,
                    pair: pair as usize,
                    pair_count: keys.len(),
                });
            }
        }
        Ok(Self {
            buckets,
            keys,
            values,
        })
    }

    /// Find the stored key and value for `key`
    pub fn find(&self, key: &K) -> Option<(&K, &V)> {
        let bucket_count = self.buckets.len();
        if bucket_count == 0 {
            return None;
        }

        let raw = key.raw_bytes();
        let start = (hash64(raw.as_ref()) % bucket_count as u64) as usize;

        for step in 0..bucket_count {
            let tag = self.buckets[(start + step) % bucket_count];
            match BucketState::from_tag(tag) {
                BucketState::Empty => return None,
                BucketState::Occupied(pair) => {
                    let pair = pair as usize;
                    if let (Some(candidate), Some(value)) = (self.keys.get(pair), self.values.get(pair))
                        && candidate.raw_bytes().as_ref() == raw.as_ref()
                    {
                        return Some((candidate, value));
                    }
                }
                BucketState::Skip => {}
            }
        }
        None
    }

    /// Value stored under `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|(_, value)| value)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }
}

impl<K, V> KeyedHashTable<K, V> {
    /// Iterate occupied pairs in bucket order
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: self,
            bucket: 0,
        }
    }

    /// Number of occupied buckets
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no bucket is occupied
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Number of buckets, including empty ones
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Length of the key and value arrays
    pub fn pair_count(&self) -> usize {
        self.keys.len()
    }

    /// Raw bucket tags
    pub fn buckets(&self) -> &[u32] {
        &self.buckets
    }
}

/// Iterator over occupied pairs of a [`KeyedHashTable`] in bucket order
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    table: &'a KeyedHashTable<K, V>,
    bucket: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&tag) = self.table.buckets.get(self.bucket) {
            self.bucket += 1;
            if let BucketState::Occupied(pair) = BucketState::from_tag(tag) {
                let pair = pair as usize;
                if let (Some(key), Some(value)) =
                    (self.table.keys.get(pair), self.table.values.get(pair))
                {
                    return Some((key, value));
                }
            }
        }
        None
    }
}

impl<'a, K, V> IntoIterator for &'a KeyedHashTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn count_field(value: usize, field: &'static str) -> FormatResult<u32> {
    u32::try_from(value).map_err(|_| FormatError::LengthOverflow { field, value })
}

impl<K: Serialize, V: Serialize> Serialize for KeyedHashTable<K, V> {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&HASH_TABLE_TYPE)?;
        stream.write(&HASH_TABLE_SECTIONS)?;
        stream.write(&count_field(self.buckets.len(), "bucket count")?)?;
        stream.write(&count_field(self.keys.len(), "key count")?)?;
        stream.write(&count_field(self.values.len(), "value count")?)?;

        if !self.buckets.is_empty() {
            write_compressed(stream, EndianMode::NoSwap, |nested| nested.write(&self.buckets))?;
        }
        if !self.keys.is_empty() {
            write_compressed(stream, EndianMode::NoSwap, |nested| nested.write(&self.keys))?;
        }
        if !self.values.is_empty() {
            write_compressed(stream, EndianMode::NoSwap, |nested| nested.write(&self.values))?;
        }
        Ok(())
    }
}

impl<K: TableKey + Deserialize, V: Deserialize> Deserialize for KeyedHashTable<K, V> {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let table_type: u16 = stream.read()?;
        if table_type != HASH_TABLE_TYPE {
            return Err(FormatError::UnsupportedHashTableType(table_type));
        }
        let sections: u32 = stream.read()?;
        if sections != HASH_TABLE_SECTIONS {
            return Err(FormatError::UnexpectedSectionCount(sections));
        }

        let bucket_count = stream.read::<u32>()? as usize;
        let key_count = stream.read::<u32>()? as usize;
        let value_count = stream.read::<u32>()? as usize;
        let pair_count = key_count.max(value_count);

        let buckets = if bucket_count != 0 {
            read_compressed(stream, EndianMode::NoSwap, |nested| {
                nested.read_array::<u32>(bucket_count)
            })?
        } else {
            Vec::new()
        };

        let (keys, values) = if pair_count != 0 {
            let keys = read_compressed(stream, EndianMode::NoSwap, |nested| {
                nested.read_array::<K>(pair_count)
            })?;
            let values = read_compressed(stream, EndianMode::NoSwap, |nested| {
                nested.read_array::<V>(pair_count)
            })?;
            (keys, values)
        } else {
            (Vec::new(), Vec::new())
        };

        Self::from_parts(buckets, keys, values)
    }
}
