//! Length-prefixed and zlib-compressed nested regions
//!
//! A region is a run of bytes inside an outer stream that is read or written
//! through its own nested stream. The nested stream may use a different byte
//! order from the outer one, selected with [`EndianMode`].
//!
//! Sized region layout:
//!
//! ```text
//! [length: u32][payload: length bytes]
//! ```
//!
//! Compressed region layout:
//!
//! ```text
//! [uncompressed length: u32][compressed length: u32][zlib stream]
//! ```
//!
//! Length fields use the outer stream's byte order. The typed wrappers
//! [`SizedRegion`] and [`CompressedRegion`] carry the byte order as a type
//! parameter; the `read_*`/`write_*` functions take it at runtime for callers
//! that need extra context to decode the payload.

use std::marker::PhantomData;

use crate::compression::{deflate, inflate_exact};
use crate::error::{FormatError, FormatResult};
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize};

/// Byte order of a nested region relative to its enclosing stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndianMode {
    /// Same swap flag as the enclosing stream
    #[default]
    Inherit,
    /// Always big-endian
    Swap,
    /// Always little-endian
    NoSwap,
}

impl EndianMode {
    /// Swap flag for a nested stream inside a stream with `enclosing` swap
    pub const fn resolve(self, enclosing: bool) -> bool {
        match self {
            Self::Inherit => enclosing,
            Self::Swap => true,
            Self::NoSwap => false,
        }
    }
}

/// Compile-time [`EndianMode`] selector for the typed region wrappers
pub trait EndianPolicy {
    /// Mode applied to the nested stream
    const MODE: EndianMode;
}

/// Nested stream inherits the outer swap flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Inherit;

/// Nested stream is always big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForceSwap;

/// Nested stream is always little-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForceNoSwap;

impl EndianPolicy for Inherit {
    const MODE: EndianMode = EndianMode::Inherit;
}

impl EndianPolicy for ForceSwap {
    const MODE: EndianMode = EndianMode::Swap;
}

impl EndianPolicy for ForceNoSwap {
    const MODE: EndianMode = EndianMode::NoSwap;
}

fn length_field(value: usize, field: &'static str) -> FormatResult<u32> {
    u32::try_from(value).map_err(|_| FormatError::LengthOverflow { field, value })
}

/// Read a sized region and decode its payload with `read`
///
/// Bytes left in the region after `read` returns are ignored.
pub fn read_sized<'a, T>(
    stream: &mut InputStream<'a>,
    mode: EndianMode,
    read: impl FnOnce(&mut InputStream<'a>) -> FormatResult<T>,
) -> FormatResult<T> {
    let length: u32 = stream.read()?;
    let region = stream.read_region(length as usize)?;
    let mut nested = InputStream::new(region).with_swap_endian(mode.resolve(stream.swap_endian()));
    read(&mut nested)
}

/// Write a sized region whose payload is produced by `write`
///
/// A zero placeholder is written first and patched with the payload length
/// once `write` returns.
pub fn write_sized(
    stream: &mut OutputStream,
    mode: EndianMode,
    write: impl FnOnce(&mut OutputStream) -> FormatResult<()>,
) -> FormatResult<()> {
    let outer_swap = stream.swap_endian();
    let length_position = stream.position();
    stream.write(&0u32)?;
    let payload_start = stream.position();

    stream.set_swap_endian(mode.resolve(outer_swap));
    let result = write(stream);
    stream.set_swap_endian(outer_swap);
    result?;

    let payload_end = stream.position();
    let length = length_field(payload_end - payload_start, "sized region length")?;
    stream.set_position(length_position)?;
    stream.write(&length)?;
    stream.set_position(payload_end)
}

/// Read a compressed region and decode its inflated payload with `read`
///
/// The zlib stream must expand to exactly the declared length and be
/// consumed completely.
pub fn read_compressed<T>(
    stream: &mut InputStream<'_>,
    mode: EndianMode,
    read: impl FnOnce(&mut InputStream<'_>) -> FormatResult<T>,
) -> FormatResult<T> {
    let uncompressed_length: u32 = stream.read()?;
    let compressed_length: u32 = stream.read()?;
    let compressed = stream.read_region(compressed_length as usize)?;
    let plain = inflate_exact(compressed, uncompressed_length as usize)?;
    let mut nested = InputStream::new(&plain).with_swap_endian(mode.resolve(stream.swap_endian()));
    read(&mut nested)
}

/// Write a compressed region whose payload is produced by `write`
pub fn write_compressed(
    stream: &mut OutputStream,
    mode: EndianMode,
    write: impl FnOnce(&mut OutputStream) -> FormatResult<()>,
) -> FormatResult<()> {
    let mut nested = OutputStream::new().with_swap_endian(mode.resolve(stream.swap_endian()));
    write(&mut nested)?;
    let plain = nested.into_inner();
    let compressed = deflate(&plain)?;

    stream.write(&length_field(plain.len(), "uncompressed region length")?)?;
    stream.write(&length_field(compressed.len(), "compressed region length")?)?;
    stream.write_bytes(&compressed);
    Ok(())
}

/// A value stored inside a sized region
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SizedRegion<T, E = Inherit> {
    /// Decoded payload
    pub value: T,
    _endian: PhantomData<E>,
}

impl<T, E> SizedRegion<T, E> {
    /// Wrap a payload
    pub fn new(value: T) -> Self {
        Self {
            value,
            _endian: PhantomData,
        }
    }

    /// Unwrap the payload
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Serialize, E: EndianPolicy> Serialize for SizedRegion<T, E> {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        write_sized(stream, E::MODE, |nested| self.value.serialize(nested))
    }
}

impl<T: Deserialize, E: EndianPolicy> Deserialize for SizedRegion<T, E> {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        read_sized(stream, E::MODE, |nested| T::deserialize(nested)).map(Self::new)
    }
}

/// A value stored inside a zlib-compressed region
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompressedRegion<T, E = Inherit> {
    /// Decoded payload
    pub value: T,
    _endian: PhantomData<E>,
}

impl<T, E> CompressedRegion<T, E> {
    /// Wrap a payload
    pub fn new(value: T) -> Self {
        Self {
            value,
            _endian: PhantomData,
        }
    }

    /// Unwrap the payload
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Serialize, E: EndianPolicy> Serialize for CompressedRegion<T, E> {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        write_compressed(stream, E::MODE, |nested| self.value.serialize(nested))
    }
}

impl<T: Deserialize, E: EndianPolicy> Deserialize for CompressedRegion<T, E> {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        read_compressed(stream, E::MODE, |nested| T::deserialize(nested)).map(Self::new)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn sized_round_trip(payload: &[u8], swap: bool) -> (Vec<u8>, Vec<u8>) {
        let mut stream = OutputStream::new().with_swap_endian(swap);
        write_sized(&mut stream, EndianMode::Inherit, |nested| {
            nested.write_bytes(payload);
            Ok(())
        })
        .unwrap();
        stream.write(&0xAAu8).unwrap();
        let data = stream.into_inner();

        let mut input = InputStream::new(&data).with_swap_endian(swap);
        let decoded = read_sized(&mut input, EndianMode::Inherit, |nested| {
            Ok(nested.remaining_slice().to_vec())
        })
        .unwrap();
        assert_eq!(input.read::<u8>().unwrap(), 0xAA);
        assert!(input.is_at_end());
        (decoded, data)
    }

    fn compressed_round_trip(payload: &[u8], swap: bool) -> Vec<u8> {
        let mut stream = OutputStream::new().with_swap_endian(swap);
        write_compressed(&mut stream, EndianMode::NoSwap, |nested| {
            nested.write_bytes(payload);
            Ok(())
        })
        .unwrap();
        let data = stream.into_inner();

        let mut input = InputStream::new(&data).with_swap_endian(swap);
        let decoded = read_compressed(&mut input, EndianMode::NoSwap, |nested| {
            Ok(nested.remaining_slice().to_vec())
        })
        .unwrap();
        assert!(input.is_at_end());
        decoded
    }

    #[test]
    fn test_sized_region_layout() {
        let mut stream = OutputStream::new();
        stream
            .write(&SizedRegion::<u32, ForceSwap>::new(0x0102_0304))
            .unwrap();
        stream.write(&0xAAu8).unwrap();

        // Little-endian length, big-endian payload
        assert_eq!(
            stream.as_slice(),
            &[4, 0, 0, 0, 0x01, 0x02, 0x03, 0x04, 0xAA]
        );

        let data = stream.into_inner();
        let mut input = InputStream::new(&data);
        let region: SizedRegion<u32, ForceSwap> = input.read().unwrap();
        assert_eq!(region.value, 0x0102_0304);
        assert_eq!(input.read::<u8>().unwrap(), 0xAA);
    }

    #[test]
    fn test_sized_region_ignores_trailing_payload() {
        // Region declares 6 bytes but the payload only reads 4
        let data = [6, 0, 0, 0, 1, 0, 0, 0, 0xEE, 0xEE, 7];
        let mut input = InputStream::new(&data);
        let value = read_sized(&mut input, EndianMode::Inherit, |nested| nested.read::<u32>())
            .unwrap();
        assert_eq!(value, 1);
        assert_eq!(input.read::<u8>().unwrap(), 7);
    }

    #[test]
    fn test_sized_region_read_is_bounded() {
        let data = [2, 0, 0, 0, 1, 0, 0, 0];
        let mut input = InputStream::new(&data);
        assert!(matches!(
            read_sized(&mut input, EndianMode::Inherit, |nested| nested.read::<u32>()),
            Err(FormatError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_sized_region_restores_outer_order() {
        let mut stream = OutputStream::new().with_swap_endian(true);
        write_sized(&mut stream, EndianMode::NoSwap, |nested| {
            assert!(!nested.swap_endian());
            nested.write(&1u16)
        })
        .unwrap();
        assert!(stream.swap_endian());
        stream.write(&1u16).unwrap();
        assert_eq!(stream.as_slice(), &[0, 0, 0, 2, 1, 0, 0, 1]);
    }

    #[test]
    fn test_compressed_region_layout() {
        let payload: Vec<u32> = (0..64).collect();
        let mut stream = OutputStream::new().with_swap_endian(true);
        stream
            .write(&CompressedRegion::<Vec<u32>, ForceNoSwap>::new(payload.clone()))
            .unwrap();

        let data = stream.into_inner();
        assert_eq!(&data[..4], &256u32.to_be_bytes());
        let compressed_length = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        assert_eq!(data.len(), 8 + compressed_length as usize);

        let mut input = InputStream::new(&data).with_swap_endian(true);
        let decoded = read_compressed(&mut input, EndianMode::NoSwap, |nested| {
            assert!(!nested.swap_endian());
            nested.read_array::<u32>(64)
        })
        .unwrap();
        assert_eq!(decoded, payload);
        assert!(input.is_at_end());
    }

    #[test]
    fn test_compressed_region_declared_length_mismatch() {
        let mut stream = OutputStream::new();
        stream.write(&CompressedRegion::<u32>::new(5)).unwrap();
        let mut data = stream.into_inner();
        data[0] = 3;

        let mut input = InputStream::new(&data);
        assert!(matches!(
            input.read::<CompressedRegion<u32>>(),
            Err(FormatError::SizeMismatch { expected: 3, .. })
        ));
    }

    #[test]
    fn test_compressed_region_trailing_bytes() {
        let compressed = deflate(&[9, 0, 0, 0]).unwrap();
        let mut stream = OutputStream::new();
        stream.write(&4u32).unwrap();
        stream.write(&((compressed.len() + 1) as u32)).unwrap();
        stream.write_bytes(&compressed);
        stream.write(&0u8).unwrap();

        let data = stream.into_inner();
        let mut input = InputStream::new(&data);
        assert!(matches!(
            input.read::<CompressedRegion<u32>>(),
            Err(FormatError::TrailingCompressedData(1))
        ));
    }

    #[test]
    fn test_modes_resolve() {
        assert!(EndianMode::Inherit.resolve(true));
        assert!(!EndianMode::Inherit.resolve(false));
        assert!(EndianMode::Swap.resolve(false));
        assert!(!EndianMode::NoSwap.resolve(true));
    }

    #[test]
    fn test_empty_sized_region() {
        let (decoded, data) = sized_round_trip(&[], false);
        assert!(decoded.is_empty());
        assert_eq!(data, vec![0, 0, 0, 0, 0xAA]);
    }

    #[test]
    fn test_empty_compressed_region() {
        assert!(compressed_round_trip(&[], false).is_empty());
        assert!(compressed_round_trip(&[], true).is_empty());
    }

    proptest! {
        #[test]
        fn prop_sized_region_round_trips(
            payload in prop::collection::vec(any::<u8>(), 0..2048),
            swap in any::<bool>(),
        ) {
            let (decoded, data) = sized_round_trip(&payload, swap);
            prop_assert_eq!(decoded, payload.clone());
            prop_assert_eq!(data.len(), 4 + payload.len() + 1);
        }

        #[test]
        fn prop_compressed_region_round_trips(
            payload in prop::collection::vec(any::<u8>(), 0..2048),
            swap in any::<bool>(),
        ) {
            prop_assert_eq!(compressed_round_trip(&payload, swap), payload);
        }
    }
}
