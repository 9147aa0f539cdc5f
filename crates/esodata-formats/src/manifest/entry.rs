use crate::compression::CompressionCodec;
use crate::error::FormatResult;
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize};

/// Location and encoding of one archive entry
///
/// Stored as 20 bytes in the manifest's entry table values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManifestEntry {
    /// Size after decompression
    pub uncompressed_size: u32,
    /// Size of the stored bytes
    pub compressed_size: u32,
    /// Checksum of the uncompressed payload
    pub crc32: u32,
    /// Byte offset within the data file
    pub offset: u32,
    /// Index of the data file holding the bytes
    pub data_file_index: u8,
    /// Raw codec id; see [`ManifestEntry::codec`]
    pub compression: u8,
    /// Unused
    pub reserved: u16,
}

impl ManifestEntry {
    /// Codec used for the stored bytes
    pub fn codec(&self) -> FormatResult<CompressionCodec> {
        CompressionCodec::from_byte(self.compression)
    }
}

impl Serialize for ManifestEntry {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.uncompressed_size)?;
        stream.write(&self.compressed_size)?;
        stream.write(&self.crc32)?;
        stream.write(&self.offset)?;
        stream.write(&self.data_file_index)?;
        stream.write(&self.compression)?;
        stream.write(&self.reserved)
    }
}

impl Deserialize for ManifestEntry {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(Self {
            uncompressed_size: stream.read()?,
            compressed_size: stream.read()?,
            crc32: stream.read()?,
            offset: stream.read()?,
            data_file_index: stream.read()?,
            compression: stream.read()?,
            reserved: stream.read()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    #[test]
    fn test_entry_layout() {
        let entry = ManifestEntry {
            uncompressed_size: 5,
            compressed_size: 13,
            crc32: 0xf032_519b,
            offset: 14,
            data_file_index: 2,
            compression: 1,
            reserved: 0,
        };
        let mut stream = OutputStream::new();
        stream.write(&entry).unwrap();
        assert_eq!(
            stream.as_slice(),
            &[
                5, 0, 0, 0, 13, 0, 0, 0, 0x9b, 0x51, 0x32, 0xf0, 14, 0, 0, 0, 2, 1, 0, 0
            ]
        );

        let data = stream.into_inner();
        let decoded: ManifestEntry = InputStream::new(&data).read().unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(decoded.codec().unwrap(), CompressionCodec::Deflate);
    }

    #[test]
    fn test_unknown_codec() {
        let entry = ManifestEntry {
            compression: 9,
            ..ManifestEntry::default()
        };
        assert!(matches!(
            entry.codec(),
            Err(FormatError::UnsupportedCompression(9))
        ));
    }
}
