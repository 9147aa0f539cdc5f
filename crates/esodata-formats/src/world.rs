//! World table of contents
//!
//! Describes a world's size and the terrain layers stored as cells under
//! [`crate::addressing::world_cell_key`]. Read little-endian; strings are a
//! `u32` byte length followed by UTF-8 bytes.

use crate::ArchiveFormat;
use crate::error::{FormatError, FormatResult};
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize, SizedVec};

/// Only supported table of contents version
pub const WORLD_TOC_VERSION: u32 = 1;

/// One terrain layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldLayer {
    /// World units covered by one cell of this layer
    pub layer_size: u16,
    /// Layer name
    pub name: String,
    /// Extension of the layer's cell files
    pub extension: String,
}

impl Serialize for WorldLayer {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.layer_size)?;
        stream.write(&self.name)?;
        stream.write(&self.extension)
    }
}

impl Deserialize for WorldLayer {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(Self {
            layer_size: stream.read()?,
            name: stream.read()?,
            extension: stream.read()?,
        })
    }
}

/// Parsed world table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldTableOfContents {
    /// World height in world units
    pub world_height: u32,
    /// World width in world units
    pub world_width: u32,
    /// Unused
    pub reserved: u16,
    /// Terrain layers
    pub layers: Vec<WorldLayer>,
}

impl WorldTableOfContents {
    /// Cells needed to cover the world in `layer`, as `(columns, rows)`
    ///
    /// Returns `None` for an unknown layer or one with a zero cell size.
    pub fn cell_counts(&self, layer: usize) -> Option<(u32, u32)> {
        let size = u32::from(self.layers.get(layer)?.layer_size);
        if size == 0 {
            return None;
        }
        Some((self.world_width.div_ceil(size), self.world_height.div_ceil(size)))
    }
}

impl Serialize for WorldTableOfContents {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&WORLD_TOC_VERSION)?;
        stream.write(&self.world_height)?;
        stream.write(&self.world_width)?;
        stream.write(&self.reserved)?;
        stream.write(&SizedVec::<u8, WorldLayer>::new(self.layers.clone()))
    }
}

impl Deserialize for WorldTableOfContents {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let version: u32 = stream.read()?;
        if version != WORLD_TOC_VERSION {
            return Err(FormatError::UnsupportedVersion {
                format: "world table of contents",
                version,
            });
        }
        Ok(Self {
            world_height: stream.read()?,
            world_width: stream.read()?,
            reserved: stream.read()?,
            layers: stream.read::<SizedVec<u8, WorldLayer>>()?.into_inner(),
        })
    }
}

impl ArchiveFormat for WorldTableOfContents {
    fn parse(data: &[u8]) -> FormatResult<Self> {
        InputStream::new(data).read()
    }

    fn build(&self) -> FormatResult<Vec<u8>> {
        let mut stream = OutputStream::new();
        stream.write(self)?;
        Ok(stream.into_inner())
    }
}
