#![allow(clippy::expect_used, clippy::panic)]

//! Read sample entries through the full depot stack.
//!
//! Opens every standard manifest, loads the name tables, then reads a
//! handful of sample entries to exercise decompression, checksums and
//! signature checks.
//!
//! Usage:
//!   ESODATA_ESO_PATH=/path/to/eso cargo run --example read_archives \
//!       -p esodata-storage --features local-install

mod common;

use esodata_storage::Depot;

fn main() {
    let config = common::depot_config();
    println!("Opening depot: {}", config.root.display());

    let depot = Depot::open(config).expect("failed to open depot");
    let filesystem = depot.filesystem();

    for archive in filesystem.archives() {
        println!(
            "  {}: {} entries, {} data files",
            archive.path().display(),
            archive.len(),
            archive.manifest().data_file_count()
        );
    }
    println!();

    let all_entries: Vec<_> = filesystem.enumerate_files().collect();
    if all_entries.is_empty() {
        println!("No entries found.");
        return;
    }

    println!("Sampling {} of {} entries:\n", 10.min(all_entries.len()), all_entries.len());

    // First 5 + last 5 (or fewer if less than 10 total)
    let sample_count = 5.min(all_entries.len());
    let mut samples: Vec<_> = all_entries[..sample_count].to_vec();
    let tail_start = all_entries.len().saturating_sub(sample_count);
    if tail_start >= sample_count {
        samples.extend_from_slice(&all_entries[tail_start..]);
    }

    for (i, (key, size)) in samples.iter().enumerate() {
        println!("[{i}] key={key:#018x} size={size}");

        match filesystem.read_by_key(*key) {
            Ok(data) => {
                println!("    Read {} bytes:", data.len());
                common::hex_dump(&data, 64);
            }
            Err(e) => {
                println!("    Read error: {e}");
            }
        }
        println!();
    }
}
