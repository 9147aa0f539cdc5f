//! Depot fixtures assembled in code
//!
//! Each fixture writes real manifest, data file and table bytes into a
//! temporary directory so tests run through the same parsing path as files
//! shipped with the client.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use esodata_crypto::entry_checksum;
use esodata_formats::ArchiveFormat;
use esodata_formats::compression::CompressionCodec;
use esodata_formats::data_file::DataFileHeader;
use esodata_formats::def::{CLIENT_DEPOT_FLAGS, DefFileHeader, DefIndex, DefLookupRecord, DefRow};
use esodata_formats::hash_table::KeyedHashTableBuilder;
use esodata_formats::manifest::{
    FileSignature, Manifest, ManifestEntry, ManifestFlags, ManifestHeader,
    WIDE_DATA_FILE_COUNT_VERSION,
};
use esodata_formats::name_table::{NameEntry, NameTable};
use esodata_formats::stream::OutputStream;
use esodata_storage::CompiledDef;
use std::path::{Path, PathBuf};

/// RSA-1024 public key (SubjectPublicKeyInfo DER)
pub const SPKI_HEX: &str = "30819f300d06092a864886f70d010101050003818d0030818902818100de1e964efb2cc57ea309c18adb855dd6821acf0400df7fbe53239a12d71ffc528d88b37575a4dbc80e316dd6c0c23289838353f278a34315883a66bae7a923474ccfad4fe6e029c6520046e49bf871d1ed7ff6808f2f5bce8dc6ab403789e64f1d3ae659dad54366895ab44724f4d452b8d092f7246c551ca1b727814f78959b0203010001";

/// PKCS#1 v1.5 SHA-1 signature of [`SIGNED_PAYLOAD`] under [`SPKI_HEX`]
pub const SIGNATURE_HEX: &str = "b82a468086e2398475d5994aba63df9b51f65741cbfca84d43e3b8a6fb1e717dd3d89b6bb1f0a432e3616e874313248adf9bcc3e82fff43f4f70b9525d9ef678117b038e8a4c2f3732f6464dc8057bc91940e9ab96e4dd5d776cd1fa19281a2dc1e2ba76d59efb651e3f14ab7ce6a1701e4100deff3c4224406d71c8bbe527f3";

pub const SIGNED_PAYLOAD: &[u8] = b"signed payload";

/// Plaintext of a signed entry: signature block followed by the payload
pub fn signed_plaintext(public_key: &[u8], signature: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut stream = OutputStream::new().with_swap_endian(true);
    stream
        .write(&FileSignature {
            reserved: 0,
            public_key: public_key.to_vec(),
            signature: signature.to_vec(),
        })
        .unwrap();
    stream.write_bytes(payload);
    stream.into_inner()
}

/// Plaintext of [`SIGNED_PAYLOAD`] carrying its real signature
pub fn validly_signed_plaintext() -> Vec<u8> {
    signed_plaintext(
        &hex::decode(SPKI_HEX).unwrap(),
        &hex::decode(SIGNATURE_HEX).unwrap(),
        SIGNED_PAYLOAD,
    )
}

struct FixtureFile {
    key: u64,
    plaintext: Vec<u8>,
    codec: CompressionCodec,
}

/// Builder for a manifest and its data files
pub struct ArchiveFixture {
    files: Vec<FixtureFile>,
    flags: u32,
    data_file_count: u8,
}

impl Default for ArchiveFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveFixture {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            flags: 0,
            data_file_count: 1,
        }
    }

    /// Add an uncompressed file
    pub fn file(self, key: u64, plaintext: impl Into<Vec<u8>>) -> Self {
        self.compressed(key, plaintext, CompressionCodec::None)
    }

    /// Add a file stored with `codec`
    pub fn compressed(mut self, key: u64, plaintext: impl Into<Vec<u8>>, codec: CompressionCodec) -> Self {
        self.files.push(FixtureFile {
            key,
            plaintext: plaintext.into(),
            codec,
        });
        self
    }

    /// Mark every entry as carrying a per-file signature
    pub fn with_file_signatures(mut self) -> Self {
        self.flags |= ManifestFlags::FILE_SIGNATURES;
        self
    }

    /// Spread files round-robin over `count` data files
    pub fn with_data_files(mut self, count: u8) -> Self {
        self.data_file_count = count;
        self
    }

    /// Add the row and index files of a definition table
    pub fn def_table<T: CompiledDef>(self, rows: &[(u32, T)]) -> Self {
        self.def_table_raw(T::DEF_INDEX, CLIENT_DEPOT_FLAGS, T::DEF_VERSION, rows)
    }

    /// Add a definition table with an explicit header
    pub fn def_table_raw<T: CompiledDef>(
        self,
        def_index: u32,
        flags: u32,
        version: u32,
        rows: &[(u32, T)],
    ) -> Self {
        let (row_file, index) = def_table_bytes(flags, version, rows);
        self.compressed(
            esodata_formats::addressing::def_rows_key(def_index),
            row_file,
            CompressionCodec::Deflate,
        )
        .file(esodata_formats::addressing::def_index_key(def_index), index)
    }

    /// Write `<dir>/<stem>.mnf` and its data files
    pub fn write(&self, dir: &Path, stem: &str) -> PathBuf {
        let manifest_path = dir.join(format!("{stem}.mnf"));
        let header_bytes = DataFileHeader::new().build().unwrap();
        let mut data_files = vec![header_bytes; usize::from(self.data_file_count)];

        let mut builder = KeyedHashTableBuilder::new();
        for (position, file) in self.files.iter().enumerate() {
            let data_file_index = (position % usize::from(self.data_file_count)) as u8;
            let stored = file.codec.compress(&file.plaintext).unwrap();
            let target = &mut data_files[usize::from(data_file_index)];

            builder.push(
                file.key,
                ManifestEntry {
                    uncompressed_size: file.plaintext.len() as u32,
                    compressed_size: stored.len() as u32,
                    crc32: entry_checksum(&file.plaintext),
                    offset: target.len() as u32,
                    data_file_index,
                    compression: file.codec.as_byte(),
                    reserved: 0,
                },
            );
            target.extend_from_slice(&stored);
        }

        let header = ManifestHeader::new(
            WIDE_DATA_FILE_COUNT_VERSION,
            u32::from(self.data_file_count),
            ManifestFlags::from_bits(self.flags),
        )
        .unwrap();
        let manifest = Manifest::new(header, builder.build().unwrap());
        std::fs::write(&manifest_path, manifest.build().unwrap()).unwrap();

        for (index, bytes) in data_files.iter().enumerate() {
            let path = esodata_storage::archive::data_file_path(&manifest_path, index as u32);
            std::fs::write(path, bytes).unwrap();
        }
        manifest_path
    }
}

/// Encode one record the way the row file stores it
pub fn encode_record<T: CompiledDef>(record: &T) -> Vec<u8> {
    let mut stream = OutputStream::new().with_swap_endian(true);
    record.serialize(&mut stream).unwrap();
    stream.into_inner()
}

/// Row file and index file of a definition table
pub fn def_table_bytes<T: CompiledDef>(flags: u32, version: u32, rows: &[(u32, T)]) -> (Vec<u8>, Vec<u8>) {
    let mut stream = OutputStream::new().with_swap_endian(true);
    stream
        .write(&DefFileHeader {
            flags,
            item_count: rows.len() as u32,
            version,
        })
        .unwrap();

    let mut index = DefIndex::default();
    for (id, record) in rows {
        index.records.push(DefLookupRecord {
            id: *id,
            offset: stream.position() as u32,
        });
        index.highest_key = index.highest_key.max(*id);
        stream
            .write(&DefRow {
                data: encode_record(record),
            })
            .unwrap();
    }

    (stream.into_inner(), index.build().unwrap())
}

/// Name table listing `(local key, name)` pairs
pub fn name_table_bytes(names: &[(u32, &str)]) -> Vec<u8> {
    let mut heap = Vec::new();
    let mut entries = KeyedHashTableBuilder::new();
    let mut hashes = KeyedHashTableBuilder::new();

    for (position, &(local_file_key, name)) in names.iter().enumerate() {
        let name_hash = 0x1000 + position as u64;
        entries.push(
            local_file_key,
            NameEntry {
                local_file_key,
                name_offset: heap.len() as u32,
                name_hash,
            },
        );
        hashes.push(name_hash, local_file_key);
        heap.extend_from_slice(name.as_bytes());
        heap.push(0);
    }

    NameTable {
        record_count: names.len() as u32,
        name_hashes: hashes.build().unwrap(),
        entries: entries.build().unwrap(),
        name_heap: heap,
        ..NameTable::default()
    }
    .build()
    .unwrap()
}
