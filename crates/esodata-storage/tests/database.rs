//! Integration tests for definition table fetches

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

mod common;

use common::ArchiveFixture;
use esodata_formats::FormatResult;
use esodata_formats::def::CLIENT_DEPOT_FLAGS;
use esodata_formats::stream::{InputStream, OutputStream};
use esodata_storage::{
    ArchiveOptions, AssetReference, CompiledDef, DatabaseManager, DatabaseRegistry, Filesystem,
    ForeignKey, IntegrityError, StorageError,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default, PartialEq)]
struct Item {
    name: String,
    icon: AssetReference,
    upgrade: ForeignKey<Item>,
    quality: u8,
}

impl Item {
    fn new(name: &str, icon: u32, upgrade: u32, quality: u8) -> Self {
        Self {
            name: name.to_string(),
            icon: AssetReference(icon),
            upgrade: ForeignKey::new(upgrade),
            quality,
        }
    }
}

impl CompiledDef for Item {
    const DEF_INDEX: u32 = 12;
    const DEF_VERSION: u32 = 7;

    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.name)?;
        stream.write(&self.icon)?;
        stream.write(&self.upgrade)?;
        stream.write(&self.quality)
    }

    fn deserialize(&mut self, stream: &mut InputStream<'_>) -> FormatResult<()> {
        self.name = stream.read()?;
        self.icon = stream.read()?;
        self.upgrade = stream.read()?;
        self.quality = stream.read()?;
        Ok(())
    }
}

static COUNTED_DECODES: AtomicUsize = AtomicUsize::new(0);

/// Record type that counts how often it is decoded
#[derive(Debug, Default, PartialEq)]
struct Counted {
    value: u32,
    tag: &'static str,
}

impl CompiledDef for Counted {
    const DEF_INDEX: u32 = 40;
    const DEF_VERSION: u32 = 1;

    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.value)
    }

    fn deserialize(&mut self, stream: &mut InputStream<'_>) -> FormatResult<()> {
        COUNTED_DECODES.fetch_add(1, Ordering::SeqCst);
        self.value = stream.read()?;
        Ok(())
    }
}

fn open(dir: &Path, fixture: &ArchiveFixture) -> Arc<Filesystem> {
    let manifest = fixture.write(dir, "game");
    let mut filesystem = Filesystem::new();
    filesystem.add_manifest(&manifest, ArchiveOptions::default()).unwrap();
    Arc::new(filesystem)
}

fn item_rows() -> Vec<(u32, Item)> {
    vec![
        (1, Item::new("Iron Sword", 0x100, 2, 1)),
        (2, Item::new("Steel Sword", 0x101, 0, 2)),
        (5, Item::new("Ebony Staff", 0x102, 0, 4)),
    ]
}

#[test]
fn fetch_decodes_rows_and_resolves_references() {
    let dir = tempfile::tempdir().unwrap();
    let filesystem = open(dir.path(), &ArchiveFixture::new().def_table(&item_rows()));
    let registry = DatabaseRegistry::new();
    let database = DatabaseManager::new(filesystem, &registry).unwrap();

    let sword = database.fetch::<Item>(1).unwrap().unwrap();
    assert_eq!(*sword, Item::new("Iron Sword", 0x100, 2, 1));
    assert_eq!(sword.icon.id(), 0x100);

    let upgrade = sword.upgrade.resolve(&database).unwrap().unwrap();
    assert_eq!(upgrade.name, "Steel Sword");
    assert!(upgrade.upgrade.is_null());
    assert!(upgrade.upgrade.resolve(&database).unwrap().is_none());

    assert_eq!(database.fetch::<Item>(5).unwrap().unwrap().quality, 4);
    assert_eq!(database.loaded_table_count(), 1);
    assert_eq!(database.table_header(Item::DEF_INDEX).unwrap().item_count, 3);
}

#[test]
fn fetch_decodes_once_and_caches_misses() {
    let dir = tempfile::tempdir().unwrap();
    let rows = [
        (3, Counted { value: 30, tag: "" }),
        (4, Counted { value: 40, tag: "" }),
    ];
    let filesystem = open(dir.path(), &ArchiveFixture::new().def_table(&rows));
    let registry = DatabaseRegistry::new();
    let database = DatabaseManager::new(filesystem, &registry).unwrap();

    let first = database.fetch::<Counted>(3).unwrap().unwrap();
    let second = database.fetch::<Counted>(3).unwrap().unwrap();
    assert_eq!(COUNTED_DECODES.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.value, 30);

    // A cached record ignores the instance offered for decoding
    let offered = Counted {
        value: 0,
        tag: "offered",
    };
    let cached = database.fetch_into(3, offered).unwrap().unwrap();
    assert_eq!(cached.tag, "");
    assert_eq!(COUNTED_DECODES.load(Ordering::SeqCst), 1);

    // Absent ids are remembered too
    assert!(database.fetch::<Counted>(99).unwrap().is_none());
    assert!(database.fetch::<Counted>(99).unwrap().is_none());
    assert_eq!(database.cached_count(), 2);

    // A fresh instance is decoded into when nothing is cached
    let fresh = database
        .fetch_into(
            4,
            Counted {
                value: 0,
                tag: "fresh",
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!((fresh.value, fresh.tag), (40, "fresh"));
    assert_eq!(COUNTED_DECODES.load(Ordering::SeqCst), 2);

    database.clear();
    assert_eq!(database.cached_count(), 0);
    assert_eq!(database.loaded_table_count(), 1);
    let again = database.fetch::<Counted>(3).unwrap().unwrap();
    assert!(!Arc::ptr_eq(&first, &again));
    assert_eq!(COUNTED_DECODES.load(Ordering::SeqCst), 3);
}

#[test]
fn null_id_never_touches_tables() {
    let dir = tempfile::tempdir().unwrap();
    let filesystem = open(dir.path(), &ArchiveFixture::new().file(0x1, "unrelated"));
    let registry = DatabaseRegistry::new();
    let database = DatabaseManager::new(filesystem, &registry).unwrap();

    assert!(database.fetch::<Item>(0).unwrap().is_none());
    assert_eq!(database.loaded_table_count(), 0);
    assert_eq!(database.cached_count(), 0);

    // Any real id needs the table, which is not there
    assert!(database.fetch::<Item>(1).unwrap_err().is_not_found());
}

#[test]
fn version_mismatch_fails_hard() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = ArchiveFixture::new().def_table_raw(
        Item::DEF_INDEX,
        CLIENT_DEPOT_FLAGS,
        Item::DEF_VERSION + 1,
        &item_rows(),
    );
    let registry = DatabaseRegistry::new();
    let database = DatabaseManager::new(open(dir.path(), &fixture), &registry).unwrap();

    let err = database.fetch::<Item>(1).unwrap_err();
    assert!(err.is_integrity());
    assert!(matches!(
        err,
        StorageError::Integrity(IntegrityError::VersionMismatch {
            def_index: 12,
            expected: 7,
            actual: 8,
        })
    ));
    assert_eq!(database.cached_count(), 0);
}

/// Reads table 12 with the layout of a later client build
#[derive(Debug, Default, PartialEq)]
struct ItemNext {
    name: String,
}

impl CompiledDef for ItemNext {
    const DEF_INDEX: u32 = Item::DEF_INDEX;
    const DEF_VERSION: u32 = Item::DEF_VERSION + 1;

    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.name)
    }

    fn deserialize(&mut self, stream: &mut InputStream<'_>) -> FormatResult<()> {
        self.name = stream.read()?;
        Ok(())
    }
}

#[test]
fn version_is_checked_on_every_typed_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let filesystem = open(dir.path(), &ArchiveFixture::new().def_table(&item_rows()));
    let registry = DatabaseRegistry::new();
    let database = DatabaseManager::new(filesystem, &registry).unwrap();

    assert_eq!(database.fetch::<Item>(1).unwrap().unwrap().name, "Iron Sword");
    assert_eq!(database.loaded_table_count(), 1);

    // Same table, other version: rejected for cached and uncached ids alike
    for id in [1, 2] {
        assert!(matches!(
            database.fetch::<ItemNext>(id),
            Err(StorageError::Integrity(IntegrityError::VersionMismatch {
                def_index: 12,
                expected: 8,
                actual: 7,
            }))
        ));
    }
    assert!(matches!(
        database.fetch_into(1, ItemNext::default()),
        Err(StorageError::Integrity(IntegrityError::VersionMismatch { .. }))
    ));

    // The matching type still sees its cached record
    assert_eq!(database.fetch::<Item>(1).unwrap().unwrap().name, "Iron Sword");
    assert_eq!(database.cached_count(), 1);
}

#[test]
fn non_client_rows_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let fixture =
        ArchiveFixture::new().def_table_raw(Item::DEF_INDEX, 0, Item::DEF_VERSION, &item_rows());
    let registry = DatabaseRegistry::new();
    let database = DatabaseManager::new(open(dir.path(), &fixture), &registry).unwrap();

    assert!(matches!(
        database.fetch::<Item>(1),
        Err(StorageError::Integrity(IntegrityError::NotClientDepot {
            def_index: 12,
            flags: 0,
        }))
    ));
}

#[test]
fn duplicate_index_ids_use_first_offset() {
    let dir = tempfile::tempdir().unwrap();
    let rows = [
        (8, Item::new("first", 1, 0, 1)),
        (8, Item::new("second", 2, 0, 1)),
    ];
    let registry = DatabaseRegistry::new();
    let database =
        DatabaseManager::new(open(dir.path(), &ArchiveFixture::new().def_table(&rows)), &registry)
            .unwrap();

    assert_eq!(database.fetch::<Item>(8).unwrap().unwrap().name, "first");
}

#[test]
fn one_manager_per_registry() {
    let dir = tempfile::tempdir().unwrap();
    let filesystem = open(dir.path(), &ArchiveFixture::new().def_table(&item_rows()));
    let registry = DatabaseRegistry::new();

    let database = DatabaseManager::new(Arc::clone(&filesystem), &registry).unwrap();
    assert!(matches!(
        DatabaseManager::new(Arc::clone(&filesystem), &registry),
        Err(StorageError::State(_))
    ));

    drop(database);
    assert!(!registry.is_claimed());
    let replacement = DatabaseManager::new(filesystem, &registry).unwrap();
    assert_eq!(replacement.fetch::<Item>(2).unwrap().unwrap().name, "Steel Sword");
}

#[test]
fn concurrent_fetches_share_one_decode() {
    static DECODES: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Shared(u32);

    impl CompiledDef for Shared {
        const DEF_INDEX: u32 = 41;
        const DEF_VERSION: u32 = 2;

        fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
            stream.write(&self.0)
        }

        fn deserialize(&mut self, stream: &mut InputStream<'_>) -> FormatResult<()> {
            DECODES.fetch_add(1, Ordering::SeqCst);
            self.0 = stream.read()?;
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let filesystem = open(dir.path(), &ArchiveFixture::new().def_table(&[(1, Shared(77))]));
    let registry = DatabaseRegistry::new();
    let database = DatabaseManager::new(filesystem, &registry).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                assert_eq!(database.fetch::<Shared>(1).unwrap().unwrap().0, 77);
            });
        }
    });
    assert_eq!(DECODES.load(Ordering::SeqCst), 1);
}
