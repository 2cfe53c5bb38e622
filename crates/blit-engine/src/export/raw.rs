//! Raw binary dump.

use crate::cell::CellGrid;
use crate::error::{EngineError, Result};

fn dimension(value: usize, what: &str) -> Result<[u8; 2]> {
    u16::try_from(value)
        .map(u16::to_le_bytes)
        .map_err(|_| EngineError::invalid(format!("{what} {value} does not fit in 16 bits")))
}

/// Serialize a grid as raw bytes:
///
/// ```text
/// width u16le   height u16le            (cells)
/// glyphs        width * height bytes
/// colors        all foreground bytes, then all background bytes
/// palette_len   u16le
/// palette       palette_len * (r, g, b)
/// ```
///
/// Supports the full 256-color palette.
pub fn make_raw(grid: &CellGrid) -> Result<Vec<u8>> {
    let width = dimension(grid.width(), "width")?;
    let height = dimension(grid.height(), "height")?;
    let (glyphs, colors) = grid.streams();
    let palette = grid.palette().colors();

    let mut out = Vec::with_capacity(6 + glyphs.len() + colors.len() + palette.len() * 3);
    out.extend_from_slice(&width);
    out.extend_from_slice(&height);
    out.extend_from_slice(&glyphs);
    out.extend_from_slice(&colors);
    out.extend_from_slice(&(palette.len() as u16).to_le_bytes());
    for c in palette {
        out.extend_from_slice(&c.to_array());
    }
    Ok(out)
}
