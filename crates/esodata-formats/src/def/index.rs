use crate::ArchiveFormat;
use crate::error::{FormatError, FormatResult};
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize, SizedVec};

/// Magic at the start of every definition index
pub const DEF_INDEX_MAGIC: u32 = 0xFBFB_ECEC;

/// Record id and row offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefLookupRecord {
    /// Record id
    pub id: u32,
    /// Offset of the row in the row file
    pub offset: u32,
}

impl Serialize for DefLookupRecord {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.id)?;
        stream.write(&self.offset)
    }
}

impl Deserialize for DefLookupRecord {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        Ok(Self {
            id: stream.read()?,
            offset: stream.read()?,
        })
    }
}

/// Definition table index
///
/// Fields after the version appear only from the version that introduced
/// them; older indexes take the defaults shown on each field. A version 0
/// index carries no lookup records at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefIndex {
    /// Index format version
    pub version: u32,
    /// Present from version 1 (default false)
    pub flag1: bool,
    /// Present from version 2 (default false)
    pub flag2: bool,
    /// Present from version 3 (default 3)
    pub field3: u32,
    /// Present from version 4 (default -2)
    pub field4: i32,
    /// Largest record id in the table (present from version 1)
    pub highest_key: u32,
    /// Lookup records in file order (present from version 1)
    pub records: Vec<DefLookupRecord>,
}

impl Default for DefIndex {
    fn default() -> Self {
        Self {
            version: 4,
            flag1: false,
            flag2: false,
            field3: 3,
            field4: -2,
            highest_key: 0,
            records: Vec::new(),
        }
    }
}

impl DefIndex {
    /// Offset of the row for `id`, scanning records in file order
    pub fn offset_of(&self, id: u32) -> Option<u32> {
        self.records
            .iter()
            .find(|record| record.id == id)
            .map(|record| record.offset)
    }
}

impl Serialize for DefIndex {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&DEF_INDEX_MAGIC)?;
        stream.write(&self.version)?;
        // A version 0 index ends after the version field
        if self.version == 0 {
            return Ok(());
        }

        stream.write(&self.flag1)?;
        if self.version >= 2 {
            stream.write(&self.flag2)?;
        }
        if self.version >= 3 {
            stream.write(&self.field3)?;
        }
        if self.version >= 4 {
            stream.write(&self.field4)?;
        }
        stream.write(&self.highest_key)?;
        stream.write(&SizedVec::<u32, DefLookupRecord>::new(self.records.clone()))
    }
}

impl Deserialize for DefIndex {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let magic: u32 = stream.read()?;
        if magic != DEF_INDEX_MAGIC {
            return Err(FormatError::InvalidMagic {
                format: "definition index",
                expected: DEF_INDEX_MAGIC.to_be_bytes().to_vec(),
                actual: magic.to_be_bytes().to_vec(),
            });
        }

        let mut index = Self {
            version: stream.read()?,
            ..Self::default()
        };
        if index.version == 0 {
            return Ok(index);
        }

        index.flag1 = stream.read()?;
        if index.version >= 2 {
            index.flag2 = stream.read()?;
        }
        if index.version >= 3 {
            index.field3 = stream.read()?;
        }
        if index.version >= 4 {
            index.field4 = stream.read()?;
        }
        index.highest_key = stream.read()?;
        index.records = stream.read::<SizedVec<u32, DefLookupRecord>>()?.into_inner();

        Ok(index)
    }
}

impl ArchiveFormat for DefIndex {
    fn parse(data: &[u8]) -> FormatResult<Self> {
        InputStream::new(data).with_swap_endian(true).read()
    }

    fn build(&self) -> FormatResult<Vec<u8>> {
        let mut stream = OutputStream::new().with_swap_endian(true);
        stream.write(self)?;
        Ok(stream.into_inner())
    }
}
