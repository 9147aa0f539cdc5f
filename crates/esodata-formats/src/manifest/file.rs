use super::{FileSignature, ManifestEntry, ManifestHeader};
use crate::ArchiveFormat;
use crate::error::FormatResult;
use crate::hash_table::KeyedHashTable;
use crate::region::{EndianMode, read_sized, write_sized};
use crate::stream::{InputStream, OutputStream};

/// Parsed MES2 manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Fixed header fields
    pub header: ManifestHeader,
    /// Signature over the entry table, present when the header flag is set
    pub directory_signature: Option<FileSignature>,
    signed_directory: Option<Vec<u8>>,
    /// Entry table keyed by global file id
    pub entries: KeyedHashTable<u64, ManifestEntry>,
}

impl Manifest {
    /// Create an unsigned manifest from a header and entry table
    pub fn new(header: ManifestHeader, entries: KeyedHashTable<u64, ManifestEntry>) -> Self {
        Self {
            header,
            directory_signature: None,
            signed_directory: None,
            entries,
        }
    }

    /// Read a manifest from a little-endian stream
    pub fn read(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let header: ManifestHeader = stream.read()?;
        let signed = header.flags.has_directory_signature();

        let (directory_signature, signed_directory, entries) =
            read_sized(stream, EndianMode::Swap, |body| {
                let directory_signature = if signed {
                    Some(body.read::<FileSignature>()?)
                } else {
                    None
                };

                let table_start = body.remaining_slice();
                let entries: KeyedHashTable<u64, ManifestEntry> = body.read()?;
                let table_length = table_start.len() - body.remaining();
                let signed_directory = signed.then(|| table_start[..table_length].to_vec());

                Ok((directory_signature, signed_directory, entries))
            })?;

        Ok(Self {
            header,
            directory_signature,
            signed_directory,
            entries,
        })
    }

    /// Write the manifest to a little-endian stream
    ///
    /// A manifest flagged as signed but lacking a signature block gets an
    /// empty one.
    pub fn write(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.header)?;
        write_sized(stream, EndianMode::Swap, |body| {
            if self.header.flags.has_directory_signature() {
                match &self.directory_signature {
                    Some(signature) => body.write(signature)?,
                    None => body.write(&FileSignature::default())?,
                }
            }
            body.write(&self.entries)
        })
    }

    /// Encoded entry table bytes covered by the directory signature
    pub fn signed_directory(&self) -> Option<&[u8]> {
        self.signed_directory.as_deref()
    }

    /// Whether the manifest carries a directory signature
    pub fn has_directory_signature(&self) -> bool {
        self.header.flags.has_directory_signature()
    }

    /// Whether entry payloads carry their own signatures
    pub fn has_file_signatures(&self) -> bool {
        self.header.flags.has_file_signatures()
    }

    /// Number of data files
    pub fn data_file_count(&self) -> u32 {
        self.header.data_file_count()
    }

    /// Change the number of data files, checking the version's field width
    pub fn set_data_file_count(&mut self, count: u32) -> FormatResult<()> {
        self.header.set_data_file_count(count)
    }

    /// Look up the entry for a global file id
    pub fn find(&self, key: u64) -> Option<&ManifestEntry> {
        self.entries.get(&key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArchiveFormat for Manifest {
    fn parse(data: &[u8]) -> FormatResult<Self> {
        Self::read(&mut InputStream::new(data))
    }

    fn build(&self) -> FormatResult<Vec<u8>> {
        let mut stream = OutputStream::new();
        self.write(&mut stream)?;
        Ok(stream.into_inner())
    }
}
