//! Serializers for [`CellGrid`](crate::CellGrid)s.
//!
//! Every exporter is a pure function of the grid and its flags: the same
//! input always produces byte-identical output.
//!
//! # Formats
//!
//! - **Table** ([`make_table`]): a Lua blit-image table literal.
//! - **Paint** ([`make_paint`]): the paint-program text grid, one character
//!   per sub-pixel.
//! - **Script** ([`make_script`]): a runnable Lua program that shows the
//!   image and restores the terminal palette afterwards.
//! - **Raw** ([`make_raw`]): a little-endian binary dump of the streams.
//!
//! The three text formats address colors with a single hex digit and so
//! reject palettes of more than 16 colors.

mod paint;
mod raw;
mod script;
mod table;

pub use paint::make_paint;
pub use raw::make_raw;
pub use script::make_script;
pub use table::{make_table, TableOptions};

use crate::cell::CellGrid;
use crate::error::{EngineError, Result};

/// Palette index → hex digit.
pub const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Colors a single hex digit can address.
pub const MAX_TEXT_COLORS: usize = 16;

pub(crate) fn require_hex_palette(grid: &CellGrid, format: &str) -> Result<()> {
    if grid.palette().len() > MAX_TEXT_COLORS {
        return Err(EngineError::invalid(format!(
            "{format} output supports at most {MAX_TEXT_COLORS} colors, palette has {}",
            grid.palette().len()
        )));
    }
    Ok(())
}

#[inline]
pub(crate) fn hex_digit(index: u8) -> u8 {
    HEX_DIGITS[index as usize & 0x0F]
}
