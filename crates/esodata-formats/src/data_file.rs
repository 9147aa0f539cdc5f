//! PES2 data file header
//!
//! Each data file referenced by a manifest starts with a fixed 14-byte
//! little-endian header; entry offsets are absolute positions in the file.

use binrw::{BinRead, BinWrite};

use crate::ArchiveFormat;
use crate::error::{FormatError, FormatResult};
use crate::stream::{InputStream, OutputStream};

/// Magic bytes at the start of every data file
pub const DATA_FILE_MAGIC: [u8; 4] = *b"PES2";

/// Encoded size of [`DataFileHeader`]
pub const DATA_FILE_HEADER_SIZE: usize = 14;

/// Version written by current clients
pub const DATA_FILE_VERSION: u16 = 1;

/// Data file header (14 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little, magic = b"PES2")]
pub struct DataFileHeader {
    /// Format version
    pub version: u16,
    /// Unused
    pub reserved: u32,
    /// Size of the header as recorded by the writer
    pub header_size: u32,
}

impl DataFileHeader {
    /// Create a current-version header
    pub const fn new() -> Self {
        Self {
            version: DATA_FILE_VERSION,
            reserved: 0,
            header_size: DATA_FILE_HEADER_SIZE as u32,
        }
    }

    /// Read a header, reporting a wrong magic as [`FormatError::InvalidMagic`]
    pub fn read(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let magic_bytes = stream.remaining_slice().get(..4).map(<[u8]>::to_vec);
        match stream.read_binrw::<Self>() {
            Err(FormatError::BinRw(binrw::Error::BadMagic { .. })) => {
                Err(FormatError::InvalidMagic {
                    format: "data file",
                    expected: DATA_FILE_MAGIC.to_vec(),
                    actual: magic_bytes.unwrap_or_default(),
                })
            }
            other => other,
        }
    }

    /// Whether the version is the one current clients write
    pub const fn is_current_version(&self) -> bool {
        self.version == DATA_FILE_VERSION
    }
}

impl Default for DataFileHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveFormat for DataFileHeader {
    fn parse(data: &[u8]) -> FormatResult<Self> {
        Self::read(&mut InputStream::new(data))
    }

    fn build(&self) -> FormatResult<Vec<u8>> {
        let mut stream = OutputStream::new();
        stream.write_binrw(self)?;
        Ok(stream.into_inner())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let data = DataFileHeader::new().build().unwrap();
        assert_eq!(data.len(), DATA_FILE_HEADER_SIZE);
        assert_eq!(
            data,
            vec![b'P', b'E', b'S', b'2', 1, 0, 0, 0, 0, 0, 14, 0, 0, 0]
        );
        DataFileHeader::verify_round_trip(&data).unwrap();
    }

    #[test]
    fn test_header_ignores_stream_order() {
        let data = DataFileHeader::new().build().unwrap();
        let mut stream = InputStream::new(&data).with_swap_endian(true);
        let header = DataFileHeader::read(&mut stream).unwrap();
        assert_eq!(header.header_size, 14);
        assert!(header.is_current_version());
        assert_eq!(stream.position(), DATA_FILE_HEADER_SIZE);
    }

    #[test]
    fn test_bad_magic() {
        let mut data = DataFileHeader::new().build().unwrap();
        data[3] = b'3';
        let err = DataFileHeader::parse(&data).unwrap_err();
        assert!(matches!(
            &err,
            FormatError::InvalidMagic { actual, .. } if actual == b"PES3"
        ));
        assert!(err.is_integrity());
    }

    #[test]
    fn test_truncated_header() {
        let data = DataFileHeader::new().build().unwrap();
        assert!(DataFileHeader::parse(&data[..10]).is_err());
    }
}
