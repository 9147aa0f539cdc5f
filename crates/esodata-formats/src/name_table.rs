//! ZOSFT name table
//!
//! A name table maps local file ids to file names. It is stored as an
//! ordinary archive entry and read little-endian:
//!
//! ```text
//! ["ZOSFT"][reserved: u16][reserved: u32][reserved: u32][record count: u32]
//! [name hash table:  keyed hash table u64 -> u32]
//! [entry table:      keyed hash table u32 -> name entry]
//! [auxiliary table:  keyed hash table u32 -> 11 x u32]
//! [name heap: u32 length + bytes of NUL-terminated names]
//! ["ZOSFT"]
//! ```

use std::borrow::Cow;

use crate::ArchiveFormat;
use crate::error::{FormatError, FormatResult};
use crate::hash_table::KeyedHashTable;
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize, SizedVec};

/// Signature at both ends of a name table
pub const NAME_TABLE_MAGIC: [u8; 5] = *b"ZOSFT";

/// One named file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NameEntry {
    /// Local file id; combine with the table prefix for the global id
    pub local_file_key: u32,
    /// Offset of the NUL-terminated name in the heap
    pub name_offset: u32,
    /// Hash of the name
    pub name_hash: u64,
}

impl Serialize for NameEntry {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.local_file_key)?;
        stream.write(&self.name_offset)?;
        stream.write(&self.name_hash)
    }
}

impl Deserialize for NameEntry {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(Self {
            local_file_key: stream.read()?,
            name_offset: stream.read()?,
            name_hash: stream.read()?,
        })
    }
}

/// Per-file record of the third table; its fields are not interpreted
pub type AuxiliaryRecord = [u32; 11];

/// Parsed name table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NameTable {
    /// Unused header fields
    pub reserved: (u16, u32, u32),
    /// Number of records the writer declared
    pub record_count: u32,
    /// Name hash to local id
    pub name_hashes: KeyedHashTable<u64, u32>,
    /// Local id to name entry
    pub entries: KeyedHashTable<u32, NameEntry>,
    /// Local id to auxiliary record
    pub auxiliary: KeyedHashTable<u32, AuxiliaryRecord>,
    /// Concatenated NUL-terminated names
    pub name_heap: Vec<u8>,
}

fn read_signature(stream: &mut InputStream<'_>) -> FormatResult<()> {
    let actual = stream.read_fixed::<5>()?;
    if actual != NAME_TABLE_MAGIC {
        return Err(FormatError::InvalidMagic {
            format: "name table",
            expected: NAME_TABLE_MAGIC.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

impl NameTable {
    /// Read a name table
    pub fn read(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        read_signature(stream)?;
        let reserved = (stream.read()?, stream.read()?, stream.read()?);
        let record_count = stream.read()?;
        let name_hashes = stream.read()?;
        let entries = stream.read()?;
        let auxiliary = stream.read()?;
        let name_heap = stream.read::<SizedVec<u32, u8>>()?.into_inner();
        read_signature(stream)?;

        Ok(Self {
            reserved,
            record_count,
            name_hashes,
            entries,
            auxiliary,
            name_heap,
        })
    }

    /// Write a name table
    pub fn write(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write_bytes(&NAME_TABLE_MAGIC);
        stream.write(&self.reserved.0)?;
        stream.write(&self.reserved.1)?;
        stream.write(&self.reserved.2)?;
        stream.write(&self.record_count)?;
        stream.write(&self.name_hashes)?;
        stream.write(&self.entries)?;
        stream.write(&self.auxiliary)?;
        stream.write(&SizedVec::<u32, u8>::new(self.name_heap.clone()))?;
        stream.write_bytes(&NAME_TABLE_MAGIC);
        Ok(())
    }

    /// Raw bytes of the NUL-terminated name at `offset`
    ///
    /// Returns `None` when the offset lies outside the heap. A name missing
    /// its terminator runs to the end of the heap.
    pub fn name_at(&self, offset: u32) -> Option<&[u8]> {
        let tail = self.name_heap.get(offset as usize..)?;
        let end = tail.iter().position(|&byte| byte == 0).unwrap_or(tail.len());
        Some(&tail[..end])
    }

    /// Name of an entry, decoded lossily as UTF-8
    pub fn name_of(&self, entry: &NameEntry) -> Option<Cow<'_, str>> {
        self.name_at(entry.name_offset).map(String::from_utf8_lossy)
    }

    /// Entry for a local file id
    pub fn entry(&self, local_file_key: u32) -> Option<&NameEntry> {
        self.entries.get(&local_file_key)
    }

    /// Local file id registered for a name hash
    pub fn lookup_name_hash(&self, name_hash: u64) -> Option<u32> {
        self.name_hashes.get(&name_hash).copied()
    }
}

impl ArchiveFormat for NameTable {
    fn parse(data: &[u8]) -> FormatResult<Self> {
        Self::read(&mut InputStream::new(data))
    }

    fn build(&self) -> FormatResult<Vec<u8>> {
        let mut stream = OutputStream::new();
        self.write(&mut stream)?;
        Ok(stream.into_inner())
    }
}
