//! Ordered set of archives and name tables
//!
//! Lookups scan archives in the order they were added and return the first
//! hit, so an archive added earlier shadows later ones holding the same key.

use esodata_formats::ArchiveFormat;
use esodata_formats::name_table::NameTable;
use std::path::Path;
use tracing::{debug, warn};

use crate::archive::Archive;
use crate::config::ArchiveOptions;
use crate::{Result, StorageError};

/// Bits of a name table key that become the global id prefix of its entries
pub const GLOBAL_ID_PREFIX_MASK: u64 = 0xFFFF_FFFE_0000_0000;

/// Name table loaded from an archive entry
#[derive(Debug, Clone)]
pub struct LoadedNameTable {
    /// Key the table was read from
    pub table_key: u64,
    /// Prefix combined with local file keys to form global ids
    pub global_id_prefix: u64,
    /// Parsed table
    pub table: NameTable,
}

impl LoadedNameTable {
    /// Global id for a local file key of this table
    pub const fn global_key(&self, local_file_key: u32) -> u64 {
        local_file_key as u64 | self.global_id_prefix
    }
}

/// A named file found by [`Filesystem::enumerate_names`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    /// File name from the name heap
    pub name: String,
    /// Global file id
    pub key: u64,
}

/// Archives and name tables forming one file namespace
#[derive(Debug, Default)]
pub struct Filesystem {
    archives: Vec<Archive>,
    name_tables: Vec<LoadedNameTable>,
}

impl Filesystem {
    /// Create an empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a manifest and append it to the lookup order
    pub fn add_manifest(&mut self, path: impl AsRef<Path>, options: ArchiveOptions) -> Result<()> {
        let archive = Archive::open(path, options)?;
        self.add_archive(archive);
        Ok(())
    }

    /// Append an already opened archive to the lookup order
    pub fn add_archive(&mut self, archive: Archive) {
        debug!(
            "Added archive {} with {} entries",
            archive.path().display(),
            archive.len()
        );
        self.archives.push(archive);
    }

    /// Archives in lookup order
    pub fn archives(&self) -> &[Archive] {
        &self.archives
    }

    /// Loaded name tables in load order
    pub fn name_tables(&self) -> &[LoadedNameTable] {
        &self.name_tables
    }

    /// Read `key` from the first archive that has it
    pub fn read_by_key(&self, key: u64) -> Result<Vec<u8>> {
        self.try_read_by_key(key)?
            .ok_or(StorageError::NotFound(key))
    }

    /// Read `key` from the first archive that has it, returning `None` when
    /// no archive does
    pub fn try_read_by_key(&self, key: u64) -> Result<Option<Vec<u8>>> {
        for archive in &self.archives {
            if let Some(data) = archive.try_read_by_key(key)? {
                return Ok(Some(data));
            }
        }
        Ok(None)
    }

    /// Whether any archive has `key`
    pub fn contains(&self, key: u64) -> bool {
        self.archives.iter().any(|archive| archive.contains(key))
    }

    /// Read and parse the name table stored under `table_key`
    pub fn load_file_table(&mut self, table_key: u64) -> Result<()> {
        let data = self.read_by_key(table_key)?;
        let table = NameTable::parse(&data)?;
        let global_id_prefix = table_key & GLOBAL_ID_PREFIX_MASK;

        debug!(
            "Loaded name table {:#018x} ({} entries, prefix {:#018x})",
            table_key,
            table.entries.len(),
            global_id_prefix
        );

        self.name_tables.push(LoadedNameTable {
            table_key,
            global_id_prefix,
            table,
        });
        Ok(())
    }

    /// Every named file of every loaded name table
    ///
    /// Entries whose name offset lies outside the name heap are skipped.
    pub fn enumerate_names(&self) -> impl Iterator<Item = NamedFile> + '_ {
        self.name_tables.iter().flat_map(|loaded| {
            loaded.table.entries.iter().filter_map(move |(_, entry)| {
                let key = loaded.global_key(entry.local_file_key);
                match loaded.table.name_of(entry) {
                    Some(name) => Some(NamedFile {
                        name: name.into_owned(),
                        key,
                    }),
                    None => {
                        warn!(
                            "Name offset {} for {:#018x} is outside the name heap",
                            entry.name_offset, key
                        );
                        None
                    }
                }
            })
        })
    }

    /// Every entry of every archive as `(key, size)`, archive by archive
    ///
    /// Keys present in several archives are reported once per archive.
    pub fn enumerate_files(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.archives.iter().flat_map(|archive| archive.entries())
    }
}
