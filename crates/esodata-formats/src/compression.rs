//! Codecs used by compressed regions and archive entries

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::fmt;
use std::io::Write;

use crate::error::{FormatError, FormatResult};

/// Maximum allowed decompression size (1 GB)
///
/// Declared sizes come straight from the file, so the output buffer is
/// capped before it is allocated.
pub const MAX_DECOMPRESSION_SIZE: usize = 1024 * 1024 * 1024;

/// Compression applied to an archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionCodec {
    /// Stored as-is
    None = 0,
    /// zlib-wrapped deflate
    Deflate = 1,
    /// Raw snappy block
    Snappy = 2,
}

impl CompressionCodec {
    /// Map the on-disk codec id
    pub fn from_byte(value: u8) -> FormatResult<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Deflate),
            2 => Ok(Self::Snappy),
            other => Err(FormatError::UnsupportedCompression(other)),
        }
    }

    /// On-disk codec id
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode `data`, which must expand to exactly `expected` bytes
    pub fn decompress(self, data: &[u8], expected: usize) -> FormatResult<Vec<u8>> {
        match self {
            Self::None => {
                if data.len() != expected {
                    return Err(FormatError::SizeMismatch {
                        expected,
                        actual: data.len(),
                    });
                }
                Ok(data.to_vec())
            }
            Self::Deflate => inflate_exact(data, expected),
            Self::Snappy => snappy_decompress_exact(data, expected),
        }
    }

    /// Encode `data` with this codec
    pub fn compress(self, data: &[u8]) -> FormatResult<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Deflate => deflate(data),
            Self::Snappy => snap::raw::Encoder::new()
                .compress_vec(data)
                .map_err(|e| FormatError::Compression(format!("snappy: {e}"))),
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Deflate => "deflate",
            Self::Snappy => "snappy",
        };
        f.write_str(name)
    }
}

/// Compress with zlib at the best compression level
pub fn deflate(data: &[u8]) -> FormatResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| FormatError::Compression(format!("zlib: {e}")))?;
    encoder
        .finish()
        .map_err(|e| FormatError::Compression(format!("zlib: {e}")))
}

fn check_limit(expected: usize) -> FormatResult<()> {
    if expected > MAX_DECOMPRESSION_SIZE {
        return Err(FormatError::SizeLimitExceeded(expected));
    }
    Ok(())
}

/// Inflate a zlib stream that must produce exactly `expected` bytes and
/// consume all of `data`
pub fn inflate_exact(data: &[u8], expected: usize) -> FormatResult<Vec<u8>> {
    check_limit(expected)?;

    // One spare byte makes an oversized stream observable
    let mut output = vec![0u8; expected + 1];
    let mut decompress = Decompress::new(true);
    let status = decompress
        .decompress(data, &mut output, FlushDecompress::Finish)
        .map_err(|e| FormatError::Decompression(format!("zlib: {e}")))?;

    let consumed = decompress.total_in() as usize;
    let produced = decompress.total_out() as usize;

    if status != Status::StreamEnd {
        if produced > expected {
            return Err(FormatError::SizeMismatch {
                expected,
                actual: produced,
            });
        }
        return Err(FormatError::Decompression(
            "zlib: stream ended before the final block".to_string(),
        ));
    }
    if produced != expected {
        return Err(FormatError::SizeMismatch {
            expected,
            actual: produced,
        });
    }
    if consumed != data.len() {
        return Err(FormatError::TrailingCompressedData(data.len() - consumed));
    }

    output.truncate(expected);
    Ok(output)
}

/// Decode a raw snappy block that must produce exactly `expected` bytes
pub fn snappy_decompress_exact(data: &[u8], expected: usize) -> FormatResult<Vec<u8>> {
    check_limit(expected)?;

    let declared = snap::raw::decompress_len(data)
        .map_err(|e| FormatError::Decompression(format!("snappy: {e}")))?;
    if declared != expected {
        return Err(FormatError::SizeMismatch {
            expected,
            actual: declared,
        });
    }

    let mut output = vec![0u8; expected];
    let written = snap::raw::Decoder::new()
        .decompress(data, &mut output)
        .map_err(|e| FormatError::Decompression(format!("snappy: {e}")))?;
    if written != expected {
        return Err(FormatError::SizeMismatch {
            expected,
            actual: written,
        });
    }
    Ok(output)
}
