//! Paint-program text grid.

use super::{hex_digit, require_hex_palette};
use crate::cell::CellGrid;
use crate::error::Result;

/// Render a grid as paint-format text.
///
/// Each character is one canvas cell, so every glyph cell expands to a 2×3
/// block of characters and the picture's proportions change. Characters are
/// palette indices in hex; each sub-pixel row ends with `\n`.
pub fn make_paint(grid: &CellGrid) -> Result<String> {
    require_hex_palette(grid, "paint")?;

    let pixels = grid.render();
    let mut out = String::with_capacity((pixels.width() + 1) * pixels.height());
    for row in pixels.data().chunks(pixels.width()) {
        out.extend(row.iter().map(|&c| hex_digit(c) as char));
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::color::Pixel;
    use crate::palette::Palette;

    #[test]
    fn test_expands_cells_to_subpixels() {
        let palette = Palette::new(vec![Pixel::BLACK; 12]).unwrap();
        let grid = CellGrid::from_cells(
            2,
            1,
            &[
                Cell {
                    glyph: 128 + 0b00110,
                    fg: 11,
                    bg: 2,
                },
                Cell::solid(7),
            ],
            palette,
        );
        assert_eq!(make_paint(&grid).unwrap(), "2b77\nb277\n2277\n");
    }
}
