//! Manifest plus its memory-mapped data files
//!
//! An [`Archive`] resolves a global file id to verified plaintext: the
//! manifest entry gives the data file, offset and codec; the stored bytes are
//! decompressed, checksummed and, for signed archives, stripped of their
//! signature header after verification.

use esodata_crypto::{RsaSha1Verifier, SignatureVerifier, entry_checksum};
use esodata_formats::ArchiveFormat;
use esodata_formats::data_file::{DATA_FILE_HEADER_SIZE, DataFileHeader};
use esodata_formats::manifest::{FileSignature, Manifest, ManifestEntry};
use esodata_formats::stream::InputStream;
use memmap2::{Mmap, MmapOptions};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::ArchiveOptions;
use crate::error::IntegrityError;
use crate::{Result, StorageError};

/// Path of data file `index` for a manifest
///
/// The manifest's extension is replaced by the zero-padded index and `.dat`:
/// `game/client/game.mnf` uses `game/client/game0000.dat`,
/// `game/client/game0001.dat`, and so on.
pub fn data_file_path(manifest_path: &Path, index: u32) -> PathBuf {
    let mut name = OsString::from(manifest_path.with_extension(""));
    name.push(format!("{index:04}.dat"));
    PathBuf::from(name)
}

/// Memory-mapped data file
struct DataFile {
    path: PathBuf,
    header: DataFileHeader,
    mmap: Mmap,
}

impl DataFile {
    fn open(path: PathBuf) -> Result<Self> {
        let file = File::open(&path).map_err(|e| {
            StorageError::Archive(format!("failed to open data file {}: {e}", path.display()))
        })?;

        #[allow(unsafe_code)]
        let mmap = unsafe {
            MmapOptions::new().map(&file).map_err(|e| {
                StorageError::Archive(format!("failed to mmap data file {}: {e}", path.display()))
            })?
        };

        if mmap.len() < DATA_FILE_HEADER_SIZE {
            return Err(StorageError::TruncatedRead(format!(
                "data file {} is {} bytes, shorter than its header",
                path.display(),
                mmap.len()
            )));
        }

        let header = DataFileHeader::parse(&mmap[..DATA_FILE_HEADER_SIZE])?;
        if !header.is_current_version() {
            warn!(
                "Data file {} has unexpected version {}",
                path.display(),
                header.version
            );
        }

        Ok(Self { path, header, mmap })
    }

    fn slice(&self, offset: u32, size: u32) -> Result<&[u8]> {
        let start = offset as usize;
        let end = start + size as usize;
        self.mmap.get(start..end).ok_or_else(|| {
            StorageError::TruncatedRead(format!(
                "{}: {} + {} > {}",
                self.path.display(),
                offset,
                size,
                self.mmap.len()
            ))
        })
    }
}

/// One manifest and its backing data files
///
/// Immutable once opened; reads of distinct keys may run concurrently.
pub struct Archive {
    path: PathBuf,
    manifest: Manifest,
    data_files: Vec<DataFile>,
    options: ArchiveOptions,
    verifier: Arc<dyn SignatureVerifier>,
    precise_sizes: HashMap<u64, usize>,
}

impl fmt::Debug for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("entries", &self.manifest.len())
            .field("data_files", &self.data_files.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Archive {
    /// Open a manifest and its data files with the RSA/SHA-1 verifier
    pub fn open(manifest_path: impl AsRef<Path>, options: ArchiveOptions) -> Result<Self> {
        Self::open_with_verifier(manifest_path, options, Arc::new(RsaSha1Verifier))
    }

    /// Open a manifest and its data files with a custom signature verifier
    pub fn open_with_verifier(
        manifest_path: impl AsRef<Path>,
        options: ArchiveOptions,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Result<Self> {
        let path = manifest_path.as_ref().to_path_buf();
        let data = std::fs::read(&path)?;
        let manifest = Manifest::parse(&data)?;

        debug!(
            "Opened manifest {} (version 0x{:04x}, {} entries, {} data files, flags {})",
            path.display(),
            manifest.header.version,
            manifest.len(),
            manifest.data_file_count(),
            manifest.header.flags
        );

        let data_files = (0..manifest.data_file_count())
            .map(|index| DataFile::open(data_file_path(&path, index)))
            .collect::<Result<Vec<_>>>()?;

        let mut archive = Self {
            path,
            manifest,
            data_files,
            options,
            verifier,
            precise_sizes: HashMap::new(),
        };

        if archive.manifest.has_file_signatures() && options.need_precise_sizes {
            archive.precise_sizes = archive.resolve_sizes()?;
        }

        Ok(archive)
    }

    fn resolve_sizes(&self) -> Result<HashMap<u64, usize>> {
        debug!(
            "Resolving payload sizes for {} signed entries in {}",
            self.manifest.len(),
            self.path.display()
        );
        self.manifest
            .entries
            .iter()
            .map(|(&key, entry)| Ok((key, self.read_entry(key, entry)?.len())))
            .collect()
    }

    /// Manifest path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Options the archive was opened with
    pub const fn options(&self) -> ArchiveOptions {
        self.options
    }

    /// Headers of the data files, by index
    pub fn data_file_headers(&self) -> impl Iterator<Item = &DataFileHeader> {
        self.data_files.iter().map(|file| &file.header)
    }

    /// Whether the manifest has an entry for `key`
    pub fn contains(&self, key: u64) -> bool {
        self.manifest.find(key).is_some()
    }

    /// Read and verify the plaintext for `key`
    pub fn read_by_key(&self, key: u64) -> Result<Vec<u8>> {
        self.try_read_by_key(key)?
            .ok_or(StorageError::NotFound(key))
    }

    /// Read and verify the plaintext for `key`, returning `None` on a miss
    pub fn try_read_by_key(&self, key: u64) -> Result<Option<Vec<u8>>> {
        match self.manifest.find(key) {
            Some(entry) => self.read_entry(key, entry).map(Some),
            None => Ok(None),
        }
    }

    fn read_entry(&self, key: u64, entry: &ManifestEntry) -> Result<Vec<u8>> {
        trace!(
            "Reading {:#018x} from data file {} at {} ({} bytes, codec {})",
            key, entry.data_file_index, entry.offset, entry.compressed_size, entry.compression
        );

        let data_file = self
            .data_files
            .get(usize::from(entry.data_file_index))
            .ok_or_else(|| {
                StorageError::Archive(format!(
                    "entry {key:#018x} references data file {} of {}",
                    entry.data_file_index,
                    self.data_files.len()
                ))
            })?;

        let stored = data_file.slice(entry.offset, entry.compressed_size)?;
        let plain = entry
            .codec()?
            .decompress(stored, entry.uncompressed_size as usize)?;

        let checksum = entry_checksum(&plain);
        if checksum != entry.crc32 {
            return Err(IntegrityError::ChecksumMismatch {
                key,
                expected: entry.crc32,
                actual: checksum,
            }
            .into());
        }

        if self.manifest.has_file_signatures() {
            return self.strip_signature(key, &plain);
        }
        Ok(plain)
    }

    fn strip_signature(&self, key: u64, plain: &[u8]) -> Result<Vec<u8>> {
        let mut stream = InputStream::new(plain).with_swap_endian(true);
        let signature: FileSignature = stream.read()?;
        let payload = stream.remaining_slice();

        if self.options.verify_signatures
            && !self
                .verifier
                .verify_payload(&signature.public_key, payload, &signature.signature)?
        {
            return Err(IntegrityError::SignatureMismatch { key }.into());
        }
        Ok(payload.to_vec())
    }

    /// Size of the plaintext `read_by_key` returns for `key`
    ///
    /// Signed archives opened with precise sizes report the verified payload
    /// size; otherwise the manifest's declared size is used.
    pub fn entry_size(&self, key: u64) -> Option<usize> {
        let entry = self.manifest.find(key)?;
        Some(self.size_of(key, entry))
    }

    fn size_of(&self, key: u64, entry: &ManifestEntry) -> usize {
        self.precise_sizes
            .get(&key)
            .copied()
            .unwrap_or(entry.uncompressed_size as usize)
    }

    /// Every entry as `(key, size)` in manifest bucket order
    pub fn entries(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.manifest
            .entries
            .iter()
            .map(|(&key, entry)| (key, self.size_of(key, entry)))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    /// Whether the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_file_naming() {
        assert_eq!(
            data_file_path(Path::new("game/client/game.mnf"), 0),
            PathBuf::from("game/client/game0000.dat")
        );
        assert_eq!(
            data_file_path(Path::new("/depot/eso.mnf"), 12),
            PathBuf::from("/depot/eso0012.dat")
        );
        assert_eq!(
            data_file_path(Path::new("vo_en/esoaudioen"), 3),
            PathBuf::from("vo_en/esoaudioen0003.dat")
        );
    }
}
