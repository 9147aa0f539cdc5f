//! Definition database tables
//!
//! Each definition table is split across two archive entries, both read
//! big-endian:
//!
//! - an index ([`DefIndex`]) mapping record ids to byte offsets, and
//! - a row file that starts with a [`DefFileHeader`] and holds one
//!   [`DefRow`] at each indexed offset.
//!
//! Offsets are absolute positions within the row file.

mod header;
mod index;
mod row;

pub use header::{CLIENT_DEPOT_FLAGS, DefFileHeader, FLAGS_PRESENT_MARKER};
pub use index::{DEF_INDEX_MAGIC, DefIndex, DefLookupRecord};
pub use row::{DefRow, DefRowFile};
