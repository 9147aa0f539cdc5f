//! File-backed read path for ESO client depots.
//!
//! This crate opens MES2 manifests and their PES2 data files, resolves
//! global file ids across an ordered set of archives, enumerates name
//! tables and decodes definition records on demand:
//!
//! - **Archive**: one manifest plus its memory-mapped data files, with
//!   checksum and per-file signature checks on every read
//! - **Filesystem**: archives in lookup order plus loaded name tables
//! - **DatabaseManager**: lazily loaded definition tables with a decode cache
//! - **Depot**: configuration-driven bootstrap of all of the above
//!
//! # Example
//!
//! ```rust,no_run
//! use esodata_storage::{DatabaseRegistry, Depot, DepotConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let depot = Depot::open(DepotConfig::new("/path/to/The Elder Scrolls Online"))?;
//! for (key, size) in depot.filesystem().enumerate_files().take(10) {
//!     println!("{key:#018x} {size}");
//! }
//!
//! let registry = DatabaseRegistry::new();
//! let _database = depot.database(&registry)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

pub mod archive;
pub mod build_stamp;
pub mod config;
pub mod database;
pub mod depot;
pub mod error;
pub mod filesystem;
pub mod world;

pub use archive::Archive;
pub use build_stamp::BuildStamp;
pub use config::{ArchiveOptions, DepotConfig};
pub use database::{
    AssetReference, CompiledDef, DatabaseManager, DatabaseRegistry, ForeignKey,
    PolymorphicReference,
};
pub use depot::{Depot, DepotValidation, LoadingCallback};
pub use error::{IntegrityError, Result, StorageError};
pub use filesystem::{Filesystem, LoadedNameTable, NamedFile};
pub use world::read_world_toc;
