//! Self-contained Lua display script.

use super::table::{make_table, TableOptions};
use crate::cell::CellGrid;
use crate::error::Result;

const SHOW_IMAGE: &str = r#"
local native = {}
for i = 0, 15 do
    native[i] = {term.getPaletteColor(2 ^ i)}
end
for i, color in pairs(image.palette) do
    term.setPaletteColor(2 ^ i, color)
end
term.setBackgroundColor(colors.black)
term.clear()
for y, row in ipairs(image) do
    term.setCursorPos(1, y)
    term.blit(table.unpack(row))
end
os.pullEvent("key")
for i = 0, 15 do
    term.setPaletteColor(2 ^ i, table.unpack(native[i]))
end
term.setBackgroundColor(colors.black)
term.setTextColor(colors.white)
term.clear()
term.setCursorPos(1, 1)
"#;

/// Generate a Lua program that displays the grid.
///
/// The program embeds the table (escaped, palette included), installs the
/// image palette, blits every row, waits for a key press and then restores
/// the palette that was active before.
pub fn make_script(grid: &CellGrid) -> Result<String> {
    let table = make_table(grid, &TableOptions::new().escape(true).embed_palette(true))?;
    // Escaped tables are plain ASCII.
    let table = String::from_utf8_lossy(&table);
    Ok(format!("local image = {table}\n{SHOW_IMAGE}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::color::Pixel;
    use crate::palette::Palette;

    #[test]
    fn test_script_embeds_escaped_table() {
        let palette = Palette::new(vec![Pixel::BLACK, Pixel::WHITE]).unwrap();
        let grid = CellGrid::from_cells(
            1,
            1,
            &[Cell {
                glyph: 150,
                fg: 1,
                bg: 0,
            }],
            palette,
        );
        let script = make_script(&grid).unwrap();
        assert!(script.starts_with("local image = {\n"));
        assert!(script.contains("\"\\150\""));
        assert!(script.contains("[1] = 0xFFFFFF,"));
        assert!(script.contains("term.blit(table.unpack(row))"));
        assert!(script.is_ascii());
        assert_eq!(script, make_script(&grid).unwrap());
    }
}
