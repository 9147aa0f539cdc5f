use super::{InputStream, OutputStream};
use crate::error::{FormatError, FormatResult};

/// A value that can be written to an [`OutputStream`]
pub trait Serialize {
    /// Write this value at the stream position
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()>;

    /// Write a run of values back to back
    fn serialize_array(items: &[Self], stream: &mut OutputStream) -> FormatResult<()>
    where
        Self: Sized,
    {
        for item in items {
            item.serialize(stream)?;
        }
        Ok(())
    }
}

/// A value that can be read from an [`InputStream`]
pub trait Deserialize: Sized {
    /// Read one value at the stream position
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self>;

    /// Read `count` values back to back
    fn deserialize_array(stream: &mut InputStream<'_>, count: usize) -> FormatResult<Vec<Self>> {
        // Cap the reservation by what the stream could possibly hold
        let mut items = Vec::with_capacity(count.min(stream.remaining()));
        for _ in 0..count {
            items.push(Self::deserialize(stream)?);
        }
        Ok(items)
    }
}

macro_rules! impl_numeric {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
                    let bytes = if stream.swap_endian() {
                        self.to_be_bytes()
                    } else {
                        self.to_le_bytes()
                    };
                    stream.write_bytes(&bytes);
                    Ok(())
                }
            }

            impl Deserialize for $ty {
                fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
                    let bytes = stream.read_fixed::<{ std::mem::size_of::<$ty>() }>()?;
                    Ok(if stream.swap_endian() {
                        <$ty>::from_be_bytes(bytes)
                    } else {
                        <$ty>::from_le_bytes(bytes)
                    })
                }
            }
        )*
    };
}

impl_numeric!(u16, i16, u32, i32, u64, i64, f32, f64);

impl Serialize for u8 {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write_bytes(&[*self]);
        Ok(())
    }

    fn serialize_array(items: &[Self], stream: &mut OutputStream) -> FormatResult<()> {
        stream.write_bytes(items);
        Ok(())
    }
}

impl Deserialize for u8 {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(stream.read_fixed::<1>()?[0])
    }

    fn deserialize_array(stream: &mut InputStream<'_>, count: usize) -> FormatResult<Vec<Self>> {
        Ok(stream.read_region(count)?.to_vec())
    }
}

impl Serialize for i8 {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write_bytes(&self.to_le_bytes());
        Ok(())
    }
}

impl Deserialize for i8 {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(i8::from_le_bytes(stream.read_fixed::<1>()?))
    }
}

/// Booleans occupy one byte; any non-zero value reads as true
impl Serialize for bool {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        u8::from(*self).serialize(stream)
    }
}

impl Deserialize for bool {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(u8::deserialize(stream)? != 0)
    }
}

impl<T: Serialize, const N: usize> Serialize for [T; N] {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        T::serialize_array(self, stream)
    }
}

impl<T: Deserialize, const N: usize> Deserialize for [T; N] {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let items = T::deserialize_array(stream, N)?;
        let actual = items.len();
        items
            .try_into()
            .map_err(|_| FormatError::SizeMismatch { expected: N, actual })
    }
}

/// Vectors are written as a bare run of elements; the element count is
/// carried elsewhere. Use [`super::SizedVec`] for a length-prefixed vector.
impl<T: Serialize> Serialize for Vec<T> {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        T::serialize_array(self, stream)
    }
}

impl<T: Serialize> Serialize for [T] {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        T::serialize_array(self, stream)
    }
}

/// Strings are a `u32` byte length followed by UTF-8 bytes
impl Serialize for String {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        self.as_str().serialize(stream)
    }
}

impl Serialize for str {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        let length = u32::try_from(self.len()).map_err(|_| FormatError::LengthOverflow {
            field: "string length",
            value: self.len(),
        })?;
        length.serialize(stream)?;
        stream.write_bytes(self.as_bytes());
        Ok(())
    }
}

impl Deserialize for String {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let length = u32::deserialize(stream)? as usize;
        let bytes = stream.read_region(length)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_reverses_every_width() {
        let mut stream = OutputStream::new().with_swap_endian(true);
        stream.write(&0x0102u16).unwrap();
        stream.write(&0x0304_0506_0708_090Au64).unwrap();
        stream.write(&-2i32).unwrap();
        assert_eq!(
            stream.as_slice(),
            &[
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0xFF, 0xFF, 0xFF,
                0xFE
            ]
        );

        let data = stream.into_inner();
        let mut input = InputStream::new(&data).with_swap_endian(true);
        assert_eq!(input.read::<u16>().unwrap(), 0x0102);
        assert_eq!(input.read::<u64>().unwrap(), 0x0304_0506_0708_090A);
        assert_eq!(input.read::<i32>().unwrap(), -2);
    }

    #[test]
    fn test_byte_blobs_are_verbatim_under_swap() {
        let mut stream = OutputStream::new().with_swap_endian(true);
        stream.write(&[1u8, 2, 3, 4]).unwrap();
        assert_eq!(stream.as_slice(), &[1, 2, 3, 4]);

        let data = stream.into_inner();
        let mut input = InputStream::new(&data).with_swap_endian(true);
        assert_eq!(input.read::<[u8; 4]>().unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_bool_reads_any_nonzero_as_true() {
        let data = [0, 1, 7];
        let mut input = InputStream::new(&data);
        assert!(!input.read::<bool>().unwrap());
        assert!(input.read::<bool>().unwrap());
        assert!(input.read::<bool>().unwrap());
    }

    #[test]
    fn test_u32_array() {
        let data = [1, 0, 0, 0, 0, 0, 0, 2];
        let mut input = InputStream::new(&data);
        let first: [u32; 1] = input.read().unwrap();
        assert_eq!(first, [1]);
        input.set_swap_endian(true);
        assert_eq!(input.read_array::<u32>(1).unwrap(), vec![2]);
    }

    #[test]
    fn test_string_layout() {
        let mut stream = OutputStream::new();
        stream.write("terrain").unwrap();
        assert_eq!(&stream.as_slice()[..4], &[7, 0, 0, 0]);
        assert_eq!(&stream.as_slice()[4..], b"terrain");

        let data = stream.into_inner();
        let mut input = InputStream::new(&data);
        assert_eq!(input.read::<String>().unwrap(), "terrain");
    }

    #[test]
    fn test_oversized_array_count_fails_cleanly() {
        let data = [0u8; 6];
        let mut input = InputStream::new(&data);
        assert!(input.read_array::<u32>(usize::MAX / 8).is_err());
    }
}
