//! Byte-order-aware serialization streams
//!
//! Every archive structure is read through an [`InputStream`] and written
//! through an [`OutputStream`]. Each stream carries a swap flag: without swap,
//! multi-byte numbers are little-endian; with swap, they are big-endian. Byte
//! blobs are always copied verbatim.
//!
//! Structures implement [`Serialize`] and [`Deserialize`] against these
//! streams. Nested regions with their own byte order live in
//! [`crate::region`].

mod input;
mod output;
mod sized_vec;
mod traits;

pub use input::InputStream;
pub use output::OutputStream;
pub use sized_vec::{LengthPrefix, SizedVec};
pub use traits::{Deserialize, Serialize};
