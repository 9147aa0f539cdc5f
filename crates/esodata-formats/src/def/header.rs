use crate::error::FormatResult;
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize};

/// Value in the first word that announces an explicit flags field
pub const FLAGS_PRESENT_MARKER: u32 = 0xFAFA_EBEB;

/// Flags carried by row files shipped with the client
pub const CLIENT_DEPOT_FLAGS: u32 = 0x13;

/// Header at the start of a definition row file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefFileHeader {
    /// Flags; zero when the file predates the flags field
    pub flags: u32,
    /// Number of rows
    pub item_count: u32,
    /// Layout version of the records
    pub version: u32,
}

impl DefFileHeader {
    /// Whether the row file comes from a client depot
    pub const fn is_client_depot(&self) -> bool {
        self.flags == CLIENT_DEPOT_FLAGS
    }
}

impl Serialize for DefFileHeader {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        if self.flags != 0 {
            stream.write(&FLAGS_PRESENT_MARKER)?;
            stream.write(&self.flags)?;
        }
        stream.write(&self.item_count)?;
        stream.write(&self.version)
    }
}

impl Deserialize for DefFileHeader {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let first: u32 = stream.read()?;
        let (flags, item_count) = if first == FLAGS_PRESENT_MARKER {
            let flags = stream.read()?;
            (flags, stream.read()?)
        } else {
            (0, first)
        };
        let version = stream.read()?;
        Ok(Self {
            flags,
            item_count,
            version,
        })
    }
}
