use super::DefFileHeader;
use crate::error::{FormatError, FormatResult};
use crate::region::{EndianMode, read_compressed, write_compressed};
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize};

/// One compressed record of a definition table
///
/// Stored as a declared length followed by a compressed region whose
/// uncompressed size must equal that length. The record bytes themselves
/// are decoded big-endian by the record type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefRow {
    /// Uncompressed record bytes
    pub data: Vec<u8>,
}

impl DefRow {
    /// Stream over the record bytes in record byte order
    pub fn stream(&self) -> InputStream<'_> {
        InputStream::new(&self.data).with_swap_endian(true)
    }
}

impl Serialize for DefRow {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        let declared = u32::try_from(self.data.len()).map_err(|_| FormatError::LengthOverflow {
            field: "definition row length",
            value: self.data.len(),
        })?;
        stream.write(&declared)?;
        write_compressed(stream, EndianMode::Inherit, |nested| {
            nested.write_bytes(&self.data);
            Ok(())
        })
    }
}

impl Deserialize for DefRow {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let declared = stream.read::<u32>()? as usize;
        let data = read_compressed(stream, EndianMode::Inherit, |nested| {
            Ok(nested.remaining_slice().to_vec())
        })?;
        if data.len() != declared {
            return Err(FormatError::SizeMismatch {
                expected: declared,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }
}

/// Row file of a definition table: header plus rows at indexed offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefRowFile {
    /// Parsed header
    pub header: DefFileHeader,
    data: Vec<u8>,
}

impl DefRowFile {
    /// Parse the header and keep the bytes for row access
    pub fn new(data: Vec<u8>) -> FormatResult<Self> {
        let header = InputStream::new(&data).with_swap_endian(true).read()?;
        Ok(Self { header, data })
    }

    /// Decode the row at an absolute offset
    pub fn row_at(&self, offset: u32) -> FormatResult<DefRow> {
        let mut stream = InputStream::new(&self.data).with_swap_endian(true);
        stream.set_position(offset as usize)?;
        stream.read()
    }

    /// Raw file bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::def::CLIENT_DEPOT_FLAGS;

    fn row_file(rows: &[&[u8]]) -> (Vec<u8>, Vec<u32>) {
        let mut stream = OutputStream::new().with_swap_endian(true);
        stream
            .write(&DefFileHeader {
                flags: CLIENT_DEPOT_FLAGS,
                item_count: rows.len() as u32,
                version: 1,
            })
            .unwrap();
        let mut offsets = Vec::new();
        for row in rows {
            offsets.push(stream.position() as u32);
            stream.write(&DefRow { data: row.to_vec() }).unwrap();
        }
        (stream.into_inner(), offsets)
    }

    #[test]
    fn test_rows_at_offsets() {
        let (data, offsets) = row_file(&[b"\x00\x00\x00\x2a", b"second row"]);
        let file = DefRowFile::new(data).unwrap();
        assert_eq!(file.header.item_count, 2);

        let first = file.row_at(offsets[0]).unwrap();
        assert_eq!(first.stream().read::<u32>().unwrap(), 42);
        assert_eq!(file.row_at(offsets[1]).unwrap().data, b"second row");
    }

    #[test]
    fn test_declared_length_mismatch() {
        let (mut data, offsets) = row_file(&[b"abcd"]);
        let at = offsets[0] as usize;
        data[at..at + 4].copy_from_slice(&5u32.to_be_bytes());
        let file = DefRowFile::new(data).unwrap();
        assert!(matches!(
            file.row_at(offsets[0]),
            Err(FormatError::SizeMismatch {
                expected: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_offset_out_of_range() {
        let (data, _) = row_file(&[b"abcd"]);
        let length = data.len() as u32;
        let file = DefRowFile::new(data).unwrap();
        assert!(file.row_at(length + 1).is_err());
        assert!(file.row_at(length).is_err());
    }
}
