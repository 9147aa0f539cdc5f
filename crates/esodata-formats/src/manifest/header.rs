use std::fmt;

use super::{MANIFEST_MAGIC, WIDE_DATA_FILE_COUNT_VERSION};
use crate::error::{FormatError, FormatResult};
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize};

/// Manifest flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ManifestFlags(u32);

impl ManifestFlags {
    /// The body starts with a signature over the entry table
    pub const DIRECTORY_SIGNATURE: u32 = 0x1;
    /// Every entry payload starts with its own signature
    pub const FILE_SIGNATURES: u32 = 0x2 | 0x4;

    /// Wrap raw flag bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw flag bits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether the body carries a directory signature
    pub const fn has_directory_signature(self) -> bool {
        self.0 & Self::DIRECTORY_SIGNATURE != 0
    }

    /// Whether entry payloads carry their own signatures
    pub const fn has_file_signatures(self) -> bool {
        self.0 & Self::FILE_SIGNATURES != 0
    }
}

impl fmt::Display for ManifestFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Fixed fields at the start of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestHeader {
    /// Format version
    pub version: u16,
    data_file_count: u32,
    /// Flag bits
    pub flags: ManifestFlags,
}

impl ManifestHeader {
    /// Create a header, checking that the count fits the version's field
    pub fn new(version: u16, data_file_count: u32, flags: ManifestFlags) -> FormatResult<Self> {
        let mut header = Self {
            version,
            data_file_count: 0,
            flags,
        };
        header.set_data_file_count(data_file_count)?;
        Ok(header)
    }

    /// Whether the data file count is stored as a single byte
    pub const fn has_narrow_data_file_count(&self) -> bool {
        self.version < WIDE_DATA_FILE_COUNT_VERSION
    }

    /// Number of data files the manifest indexes
    pub const fn data_file_count(&self) -> u32 {
        self.data_file_count
    }

    /// Change the data file count
    ///
    /// Versions before 0x0102 store the count in one byte, so larger values
    /// are rejected for them.
    pub fn set_data_file_count(&mut self, count: u32) -> FormatResult<()> {
        if self.has_narrow_data_file_count() && count > u32::from(u8::MAX) {
            return Err(FormatError::LengthOverflow {
                field: "data file count",
                value: count as usize,
            });
        }
        self.data_file_count = count;
        Ok(())
    }
}

impl Serialize for ManifestHeader {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&MANIFEST_MAGIC)?;
        stream.write(&self.version)?;
        if self.has_narrow_data_file_count() {
            let count = u8::try_from(self.data_file_count).map_err(|_| {
                FormatError::LengthOverflow {
                    field: "data file count",
                    value: self.data_file_count as usize,
                }
            })?;
            stream.write(&count)?;
        } else {
            stream.write(&self.data_file_count)?;
        }
        stream.write(&self.flags.bits())
    }
}

impl Deserialize for ManifestHeader {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let magic: u32 = stream.read()?;
        if magic != MANIFEST_MAGIC {
            return Err(FormatError::InvalidMagic {
                format: "manifest",
                expected: b"MES2".to_vec(),
                actual: magic.to_le_bytes().to_vec(),
            });
        }

        let version: u16 = stream.read()?;
        let data_file_count = if version < WIDE_DATA_FILE_COUNT_VERSION {
            u32::from(stream.read::<u8>()?)
        } else {
            stream.read::<u32>()?
        };
        let flags = ManifestFlags::from_bits(stream.read()?);

        Ok(Self {
            version,
            data_file_count,
            flags,
        })
    }
}
