use binrw::{BinRead, Endian};
use std::io::Cursor;

use super::Deserialize;
use crate::error::{FormatError, FormatResult};

/// Bounded reader over a byte slice
///
/// All reads are checked against the slice bounds; a read that would run
/// past the end fails with [`FormatError::UnexpectedEof`] and leaves the
/// position unchanged.
#[derive(Debug, Clone)]
pub struct InputStream<'a> {
    data: &'a [u8],
    position: usize,
    swap_endian: bool,
}

impl<'a> InputStream<'a> {
    /// Create a little-endian stream over `data`
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            swap_endian: false,
        }
    }

    /// Set the swap flag, consuming the stream
    #[must_use]
    pub const fn with_swap_endian(mut self, swap_endian: bool) -> Self {
        self.swap_endian = swap_endian;
        self
    }

    /// Whether multi-byte numbers are read big-endian
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

    /// Current read offset
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Total length of the underlying slice
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying slice is empty
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the current position
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Whether every byte has been consumed
    pub const fn is_at_end(&self) -> bool {
        self.position == self.data.len()
    }

    /// Move the read offset anywhere within the slice
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

    /// The unread tail of the slice, without consuming it
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Consume exactly `size` bytes and return them
    pub fn read_region(&mut self, size: usize) -> FormatResult<&'a [u8]> {
        let available = self.remaining();
        if size > available {
            return Err(FormatError::UnexpectedEof {
                offset: self.position,
                needed: size,
                available,
            });
        }
        let region = &self.data[self.position..self.position + size];
        self.position += size;
        Ok(region)
    }

    /// Consume exactly `N` bytes into a fixed array
    pub fn read_fixed<const N: usize>(&mut self) -> FormatResult<[u8; N]> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.read_region(N)?);
        Ok(bytes)
    }

    /// Consume `size` bytes as a nested stream with the same swap flag
    pub fn sub_stream(&mut self, size: usize) -> FormatResult<InputStream<'a>> {
        let region = self.read_region(size)?;
        Ok(InputStream::new(region).with_swap_endian(self.swap_endian))
    }

    /// Read one value
    pub fn read<T: Deserialize>(&mut self) -> FormatResult<T> {
        T::deserialize(self)
    }

    /// Read `count` consecutive values
    pub fn read_array<T: Deserialize>(&mut self, count: usize) -> FormatResult<Vec<T>> {
        T::deserialize_array(self, count)
    }

    /// Read a value described with binrw, honouring this stream's byte order
    /// for fields that do not pin their own
    pub fn read_binrw<T>(&mut self) -> FormatResult<T>
    where
        T: for<'b> BinRead<Args<'b> = ()>,
    {
        let mut cursor = Cursor::new(self.remaining_slice());
        let value = T::read_options(&mut cursor, self.endian(), ())?;
        self.position += cursor.position() as usize;
        Ok(value)
    }
}
