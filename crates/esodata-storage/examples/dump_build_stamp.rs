#![allow(clippy::expect_used, clippy::panic)]

//! Print the depot build stamp.
//!
//! Usage:
//!   ESODATA_ESO_PATH=/path/to/eso cargo run --example dump_build_stamp \
//!       -p esodata-storage --features local-install

mod common;

use esodata_storage::BuildStamp;

fn main() {
    let root = common::eso_path();
    let path = BuildStamp::path_in(&root);
    println!("Reading {}", path.display());

    match BuildStamp::read_from(&root).expect("failed to read build stamp") {
        Some(stamp) => {
            println!("  Build:          {}", stamp.build);
            println!("  Build date:     {}", stamp.build_date);
            println!("  Client version: {}", stamp.client_version);
        }
        None => println!("  No build stamp"),
    }
}
