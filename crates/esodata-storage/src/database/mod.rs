//! Definition database
//!
//! Definition tables hold versioned records of one type each. A record type
//! implements [`CompiledDef`] to name its table and layout version and to
//! decode itself from a row. The [`DatabaseManager`] loads each table lazily
//! on first use and keeps every decoded record for reuse.

mod manager;
mod references;
mod registry;

pub use manager::DatabaseManager;
pub use references::{AssetReference, ForeignKey, PolymorphicReference};
pub use registry::DatabaseRegistry;

use esodata_formats::FormatResult;
use esodata_formats::stream::{InputStream, OutputStream};

/// Record type stored in a definition table
///
/// Implementations are normally generated from the record schema. Rows are
/// decoded into a default-constructed instance unless the caller supplies
/// one through [`DatabaseManager::fetch_into`].
pub trait CompiledDef: Default + Send + Sync + 'static {
    /// Table index of the record type
    const DEF_INDEX: u32;

    /// Layout version the type was generated for
    const DEF_VERSION: u32;

    /// Encode the record
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()>;

    /// Decode a record into `self`
    fn deserialize(&mut self, stream: &mut InputStream<'_>) -> FormatResult<()>;
}
