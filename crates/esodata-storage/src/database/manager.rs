//! Lazy definition table loading with a permanent decode cache

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use esodata_formats::ArchiveFormat;
use esodata_formats::addressing::{def_index_key, def_rows_key};
use esodata_formats::def::{DefFileHeader, DefIndex, DefRowFile};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use super::registry::{DatabaseRegistry, RegistryClaim};
use super::CompiledDef;
use crate::filesystem::Filesystem;
use crate::{IntegrityError, Result, StorageError};

type CachedRecord = Option<Arc<dyn Any + Send + Sync>>;

/// Row file and id lookup of one definition table
#[derive(Debug)]
struct LoadedTable {
    header: DefFileHeader,
    offsets: HashMap<u32, u32>,
    rows: DefRowFile,
}

/// Fetches and caches definition records
///
/// Each table is read from the filesystem the first time a record of its
/// type is requested. The table's row version is compared with the record
/// type's version on every fetch. Every fetched id is cached, including ids the table
/// does not hold, so a `(table, id)` pair is decoded at most once until
/// [`clear`](Self::clear) is called.
pub struct DatabaseManager {
    filesystem: Arc<Filesystem>,
    tables: RwLock<HashMap<u32, Arc<LoadedTable>>>,
    cache: DashMap<(u32, u32), CachedRecord>,
    _claim: RegistryClaim,
}

impl fmt::Debug for DatabaseManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("loaded_tables", &self.loaded_table_count())
            .field("cached_records", &self.cached_count())
            .finish_non_exhaustive()
    }
}

impl DatabaseManager {
    /// Create the manager for `registry`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::State`] if another manager created from the
    /// same registry is still alive.
    pub fn new(filesystem: Arc<Filesystem>, registry: &DatabaseRegistry) -> Result<Self> {
        let claim = registry.claim()?;
        Ok(Self {
            filesystem,
            tables: RwLock::new(HashMap::new()),
            cache: DashMap::new(),
            _claim: claim,
        })
    }

    /// Filesystem the tables are read from
    pub fn filesystem(&self) -> &Arc<Filesystem> {
        &self.filesystem
    }

    /// Fetch the record with `id`, decoding into a default instance
    ///
    /// Returns `None` for id 0 and for ids the table does not hold.
    pub fn fetch<T: CompiledDef>(&self, id: u32) -> Result<Option<Arc<T>>> {
        self.fetch_with(id, T::default)
    }

    /// Fetch the record with `id`, decoding into `instance`
    ///
    /// `instance` is only used when the record is not cached yet; a cached
    /// record is returned as is.
    pub fn fetch_into<T: CompiledDef>(&self, id: u32, instance: T) -> Result<Option<Arc<T>>> {
        self.fetch_with(id, || instance)
    }

    fn fetch_with<T: CompiledDef>(
        &self,
        id: u32,
        instance: impl FnOnce() -> T,
    ) -> Result<Option<Arc<T>>> {
        if id == 0 {
            return Ok(None);
        }

        // Every typed fetch checks the row version, cached or not
        let table = self.table::<T>()?;
        if table.header.version != T::DEF_VERSION {
            return Err(IntegrityError::VersionMismatch {
                def_index: T::DEF_INDEX,
                expected: T::DEF_VERSION,
                actual: table.header.version,
            }
            .into());
        }

        let cache_key = (T::DEF_INDEX, id);
        if let Some(cached) = self.cache.get(&cache_key) {
            return downcast(cached.value(), cache_key);
        }

        let record = match self.cache.entry(cache_key) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                let record = match table.offsets.get(&id) {
                    Some(&offset) => {
                        let row = table.rows.row_at(offset)?;
                        let mut value = instance();
                        value.deserialize(&mut row.stream())?;
                        trace!("Decoded record {id} of definition table {}", T::DEF_INDEX);
                        Some(Arc::new(value) as Arc<dyn Any + Send + Sync>)
                    }
                    None => None,
                };
                vacant.insert(record).value().clone()
            }
        };

        downcast(&record, cache_key)
    }

    fn table<T: CompiledDef>(&self) -> Result<Arc<LoadedTable>> {
        if let Some(table) = self.tables.read().get(&T::DEF_INDEX) {
            return Ok(Arc::clone(table));
        }

        let mut tables = self.tables.write();
        match tables.entry(T::DEF_INDEX) {
            hash_map::Entry::Occupied(occupied) => Ok(Arc::clone(occupied.get())),
            hash_map::Entry::Vacant(vacant) => {
                let table = Arc::new(self.load_table(T::DEF_INDEX)?);
                Ok(Arc::clone(vacant.insert(table)))
            }
        }
    }

    fn load_table(&self, def_index: u32) -> Result<LoadedTable> {
        let rows = DefRowFile::new(self.filesystem.read_by_key(def_rows_key(def_index))?)?;
        let header = rows.header;

        if !header.is_client_depot() {
            return Err(IntegrityError::NotClientDepot {
                def_index,
                flags: header.flags,
            }
            .into());
        }
        let index = DefIndex::parse(&self.filesystem.read_by_key(def_index_key(def_index))?)?;
        let mut offsets = HashMap::with_capacity(index.records.len());
        for record in &index.records {
            offsets.entry(record.id).or_insert(record.offset);
        }

        debug!(
            "Loaded definition table {def_index}: version {}, {} rows, {} indexed ids",
            header.version,
            header.item_count,
            offsets.len()
        );

        Ok(LoadedTable {
            header,
            offsets,
            rows,
        })
    }

    /// Row file header of a loaded table
    pub fn table_header(&self, def_index: u32) -> Option<DefFileHeader> {
        self.tables.read().get(&def_index).map(|table| table.header)
    }

    /// Number of tables loaded so far
    pub fn loaded_table_count(&self) -> usize {
        self.tables.read().len()
    }

    /// Number of cached fetch results, including absent ids
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached record
    ///
    /// Loaded tables are kept; records are decoded again on next fetch.
    pub fn clear(&self) {
        self.cache.clear();
    }
}

fn downcast<T: CompiledDef>(record: &CachedRecord, key: (u32, u32)) -> Result<Option<Arc<T>>> {
    match record {
        None => Ok(None),
        Some(any) => Arc::clone(any).downcast::<T>().map(Some).map_err(|_| {
            StorageError::State(format!(
                "record {} of definition table {} was cached as a different type",
                key.1, key.0
            ))
        }),
    }
}
