//! Character-cell encoding
//!
//! Every 2-wide × 3-tall block of an [`IndexedImage`](crate::IndexedImage)
//! becomes one [`Cell`]: a glyph from the 32-entry block alphabet plus a
//! foreground and background palette index, chosen to minimize the summed
//! squared Lab error of the block as drawn.

mod encoder;
mod glyph;
mod grid;

pub use encoder::{encode_cells, CellEncoder};
pub use glyph::{
    is_glyph, shows_foreground, GlyphChoice, CELL_HEIGHT, CELL_WIDTH, GLYPH_BASE, GLYPH_COUNT,
    GLYPH_TABLE, SUBPIXELS,
};
pub use grid::{Cell, CellGrid};
