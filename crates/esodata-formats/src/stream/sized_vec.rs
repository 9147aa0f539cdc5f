use std::marker::PhantomData;

use super::{Deserialize, InputStream, OutputStream, Serialize};
use crate::error::{FormatError, FormatResult};

/// Integer type usable as an element-count prefix
pub trait LengthPrefix: Serialize + Deserialize {
    /// Name used in overflow errors
    const NAME: &'static str;

    /// Convert an element count, failing if it does not fit
    fn from_count(count: usize) -> Option<Self>;

    /// Convert back to an element count
    fn to_count(self) -> usize;
}

macro_rules! impl_length_prefix {
    ($($ty:ty),*) => {
        $(
            impl LengthPrefix for $ty {
                const NAME: &'static str = stringify!($ty);

                fn from_count(count: usize) -> Option<Self> {
                    <$ty>::try_from(count).ok()
                }

                fn to_count(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_length_prefix!(u8, u16, u32);

/// Vector written as an `L` element count followed by the elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedVec<L, T> {
    /// Elements in order
    pub items: Vec<T>,
    _length: PhantomData<L>,
}

impl<L, T> SizedVec<L, T> {
    /// Wrap existing elements
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            _length: PhantomData,
        }
    }

    /// Unwrap into the element vector
    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<L, T> Default for SizedVec<L, T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<L, T> From<Vec<T>> for SizedVec<L, T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<L: LengthPrefix, T: Serialize> Serialize for SizedVec<L, T> {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        let count = L::from_count(self.items.len()).ok_or(FormatError::LengthOverflow {
            field: L::NAME,
            value: self.items.len(),
        })?;
        count.serialize(stream)?;
        T::serialize_array(&self.items, stream)
    }
}

impl<L: LengthPrefix, T: Deserialize> Deserialize for SizedVec<L, T> {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let count = L::deserialize(stream)?.to_count();
        Ok(Self::new(T::deserialize_array(stream, count)?))
    }
}
