//! Global file id construction
//!
//! Every archive entry is addressed by a 64-bit id. The top byte selects the
//! kind of content and the remaining bits carry its coordinates.

/// World terrain cell
pub const WORLD_CELL_PREFIX: u64 = 0x4000_0000_0000_0000;
/// World table of contents
pub const WORLD_TOC_PREFIX: u64 = 0x4400_0000_0000_0000;
/// Loose file attached to a world
pub const WORLD_LOOSE_FILE_PREFIX: u64 = 0x4800_0000_0000_0000;
/// Definition table rows
pub const DEF_ROWS_PREFIX: u64 = 0x6000_0000_0000_0000;
/// Definition table index
pub const DEF_INDEX_PREFIX: u64 = 0x6000_0001_0000_0000;

/// Id of a world cell at `(x, y)` in `layer`
pub const fn world_cell_key(world: u32, layer: u32, x: u32, y: u32) -> u64 {
    WORLD_CELL_PREFIX
        | ((world as u64 & 0x7FF) << 37)
        | ((layer as u64 & 0x1F) << 32)
        | ((x as u64 & 0xFFFF) << 16)
        | (y as u64 & 0xFFFF)
}

/// Id of a world's table of contents
pub const fn world_toc_key(world: u32) -> u64 {
    WORLD_TOC_PREFIX | world as u64
}

/// Id of a world's loose file
pub const fn world_loose_file_key(world: u32, file: u32) -> u64 {
    WORLD_LOOSE_FILE_PREFIX | ((world as u64 & 0x7FF) << 37) | ((file as u64 & 0x1F) << 32)
}

/// Id of a definition table's row file
pub const fn def_rows_key(def_index: u32) -> u64 {
    DEF_ROWS_PREFIX | def_index as u64
}

/// Id of a definition table's index
pub const fn def_index_key(def_index: u32) -> u64 {
    DEF_INDEX_PREFIX | def_index as u64
}
