use binrw::{BinWrite, Endian};
use std::io::Cursor;

use super::Serialize;
use crate::error::{FormatError, FormatResult};

/// Growable writer producing a byte vector
///
/// Writes land at the current position, overwriting existing bytes and
/// extending the buffer as needed. The position can be moved back to patch
/// earlier bytes but never past the end of what has been written.
#[derive(Debug, Clone, Default)]
pub struct OutputStream {
    data: Vec<u8>,
    position: usize,
    swap_endian: bool,
}

impl OutputStream {
    /// Create an empty little-endian stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the swap flag, consuming the stream
    #[must_use]
    pub fn with_swap_endian(mut self, swap_endian: bool) -> Self {
        self.swap_endian = swap_endian;
        self
    }

    /// Whether multi-byte numbers are written big-endian
    pub const fn swap_endian(&self) -> bool {
        self.swap_endian
    }

    /// Change the swap flag in place
    pub fn set_swap_endian(&mut self, swap_endian: bool) {
        self.swap_endian = swap_endian;
    }

    /// Byte order used for numbers in this stream
    pub const fn endian(&self) -> Endian {
        if self.swap_endian {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Current write offset
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Move the write offset back to patch already written bytes
    pub fn set_position(&mut self, position: usize) -> FormatResult<()> {
        if position > self.data.len() {
            return Err(FormatError::InvalidPosition {
                position,
                limit: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Reserve `size` bytes at the current position and return them for filling
    pub fn write_region(&mut self, size: usize) -> &mut [u8] {
        let start = self.position;
        let end = start + size;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.position = end;
        &mut self.data[start..end]
    }

    /// Copy `bytes` verbatim
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_region(bytes.len()).copy_from_slice(bytes);
    }

    /// Write one value
    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> FormatResult<()> {
        value.serialize(self)
    }

    /// Write a value described with binrw, honouring this stream's byte order
    /// for fields that do not pin their own
    pub fn write_binrw<T>(&mut self, value: &T) -> FormatResult<()>
    where
        T: for<'b> BinWrite<Args<'b> = ()>,
    {
        let mut cursor = Cursor::new(Vec::new());
        value.write_options(&mut cursor, self.endian(), ())?;
        self.write_bytes(&cursor.into_inner());
        Ok(())
    }

    /// Written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the stream and return the written bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}
