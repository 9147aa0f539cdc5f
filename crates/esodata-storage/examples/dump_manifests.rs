#![allow(clippy::expect_used, clippy::panic)]

//! Dump manifest and data file headers of every standard archive.
//!
//! Usage:
//!   ESODATA_ESO_PATH=/path/to/eso cargo run --example dump_manifests \
//!       -p esodata-storage --features local-install

mod common;

use esodata_storage::{Archive, ArchiveOptions};

fn main() {
    let config = common::depot_config();

    for path in config.manifest_paths() {
        println!("=== {} ===", path.display());
        let archive = match Archive::open(&path, ArchiveOptions::default()) {
            Ok(archive) => archive,
            Err(e) => {
                println!("  Failed to open: {e}\n");
                continue;
            }
        };

        let manifest = archive.manifest();
        println!("  Version:      {:#06x}", manifest.header.version);
        println!("  Flags:        {}", manifest.header.flags);
        println!("  Entries:      {}", manifest.len());
        println!("  Buckets:      {}", manifest.entries.bucket_count());
        println!("  Data files:   {}", manifest.data_file_count());
        if let Some(signature) = &manifest.directory_signature {
            println!(
                "  Directory signature: {} byte key, {} byte signature",
                signature.public_key.len(),
                signature.signature.len()
            );
        }

        for (index, header) in archive.data_file_headers().enumerate() {
            println!(
                "  [{index:04}] version={} header_size={}",
                header.version, header.header_size
            );
        }
        println!();
    }
}
