//! Field types that refer to other records or assets

use esodata_formats::FormatResult;
use esodata_formats::stream::{Deserialize, InputStream, OutputStream, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use super::{CompiledDef, DatabaseManager};
use crate::Result;

/// Id of a record in another definition table; 0 is null
pub struct ForeignKey<T> {
    id: u32,
    _target: PhantomData<fn() -> T>,
}

impl<T> ForeignKey<T> {
    /// Reference the record with `id`
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            _target: PhantomData,
        }
    }

    /// Null reference
    pub const fn null() -> Self {
        Self::new(0)
    }

    /// Referenced record id
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Whether the reference is null
    pub const fn is_null(&self) -> bool {
        self.id == 0
    }
}

impl<T: CompiledDef> ForeignKey<T> {
    /// Fetch the referenced record
    pub fn resolve(&self, database: &DatabaseManager) -> Result<Option<Arc<T>>> {
        database.fetch::<T>(self.id)
    }
}

impl<T> Clone for ForeignKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ForeignKey<T> {}

impl<T> Default for ForeignKey<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> PartialEq for ForeignKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ForeignKey<T> {}

impl<T> Hash for ForeignKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for ForeignKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ForeignKey").field(&self.id).finish()
    }
}

impl<T> Serialize for ForeignKey<T> {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.id)
    }
}

impl<T> Deserialize for ForeignKey<T> {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(Self::new(stream.read()?))
    }
}

/// Id of an asset; 0 is null
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AssetReference(pub u32);

impl AssetReference {
    /// Asset id
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Whether the reference is null
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Serialize for AssetReference {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.0)
    }
}

impl Deserialize for AssetReference {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(Self(stream.read()?))
    }
}

/// Record id whose target table is chosen by a selector value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PolymorphicReference<S> {
    /// Selects the target table
    pub selector: S,
    /// Record id in the selected table
    pub id: u32,
}

impl<S> PolymorphicReference<S> {
    /// Whether the reference is null
    pub const fn is_null(&self) -> bool {
        self.id == 0
    }
}

impl<S: Serialize> Serialize for PolymorphicReference<S> {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.selector)?;
        stream.write(&self.id)
    }
}

impl<S: Deserialize> Deserialize for PolymorphicReference<S> {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(Self {
            selector: stream.read()?,
            id: stream.read()?,
        })
    }
}
