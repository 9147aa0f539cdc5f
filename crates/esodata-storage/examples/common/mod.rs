#![allow(dead_code)]

use esodata_storage::DepotConfig;
use std::fmt::Write;
use std::path::PathBuf;

/// Read the ESO installation path from `ESODATA_ESO_PATH`.
///
/// Panics with an informative message if the variable is unset or empty.
pub fn eso_path() -> PathBuf {
    let path = std::env::var("ESODATA_ESO_PATH").expect(
        "ESODATA_ESO_PATH environment variable not set.\n\
         Set it to your ESO installation root, e.g.:\n\
         export ESODATA_ESO_PATH=\"/path/to/The Elder Scrolls Online\"",
    );
    assert!(!path.is_empty(), "ESODATA_ESO_PATH is empty");
    let p = PathBuf::from(&path);
    assert!(p.exists(), "ESODATA_ESO_PATH does not exist: {path}");
    p
}

/// Standard depot configuration rooted at the installation path.
pub fn depot_config() -> DepotConfig {
    DepotConfig::new(eso_path())
}

/// Hex-encode bytes to a lowercase string.
pub fn hex_str(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Print a hex dump of `bytes`, capped at `max_bytes`.
pub fn hex_dump(bytes: &[u8], max_bytes: usize) {
    let len = bytes.len().min(max_bytes);
    for (i, chunk) in bytes[..len].chunks(16).enumerate() {
        let offset = i * 16;
        let hex = hex_str(chunk);
        let spaced: String = hex
            .as_bytes()
            .chunks(2)
            .map(|c| std::str::from_utf8(c).expect("valid utf8"))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii: String = chunk
            .iter()
            .map(|b| {
                if b.is_ascii_graphic() || *b == b' ' {
                    *b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("  {offset:08x}  {spaced:<48}  {ascii}");
    }
    if bytes.len() > max_bytes {
        println!("  ... ({} more bytes)", bytes.len() - max_bytes);
    }
}
