//! World lookups over a [`Filesystem`]

use esodata_formats::ArchiveFormat;
use esodata_formats::addressing::world_toc_key;
use esodata_formats::world::WorldTableOfContents;

use crate::filesystem::Filesystem;
use crate::{Result, StorageError};

/// Read the table of contents of `world_id`
///
/// Returns `None` when no archive holds it; malformed contents are an error.
pub fn read_world_toc(
    filesystem: &Filesystem,
    world_id: u32,
) -> Result<Option<WorldTableOfContents>> {
    filesystem
        .try_read_by_key(world_toc_key(world_id))?
        .map(|data| WorldTableOfContents::parse(&data).map_err(StorageError::from))
        .transpose()
}
