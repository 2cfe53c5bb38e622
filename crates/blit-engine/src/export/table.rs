//! Blit-image table literal.

use serde::{Deserialize, Serialize};

use super::{hex_digit, require_hex_palette};
use crate::cell::CellGrid;
use crate::error::Result;

/// Flags for [`make_table`].
///
/// # Example
///
/// ```
/// use blit_engine::TableOptions;
///
/// let options = TableOptions::new().compact(true).embed_palette(true);
/// assert!(options.compact);
/// assert!(!options.escape);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Drop indentation and newlines.
    pub compact: bool,
    /// Add a `palette` key with every color as `0xRRGGBB`.
    pub embed_palette: bool,
    /// Write glyph bytes as `\ddd` decimal escapes instead of raw bytes.
    pub escape: bool,
}

impl TableOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn compact(mut self, enabled: bool) -> Self {
        self.compact = enabled;
        self
    }

    #[inline]
    pub fn embed_palette(mut self, enabled: bool) -> Self {
        self.embed_palette = enabled;
        self
    }

    #[inline]
    pub fn escape(mut self, enabled: bool) -> Self {
        self.escape = enabled;
        self
    }
}

/// Append `bytes` as a double-quoted Lua string.
fn push_lua_string(out: &mut Vec<u8>, bytes: &[u8], escape_all: bool) {
    out.push(b'"');
    for &b in bytes {
        match b {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            _ if escape_all && !(0x20..0x7F).contains(&b) => {
                out.extend_from_slice(format!("\\{b}").as_bytes());
            }
            _ => out.push(b),
        }
    }
    out.push(b'"');
}

/// Serialize a grid as a Lua table of rows, each `{text, fg, bg}`.
///
/// `text` holds the glyph bytes; `fg` and `bg` hold one hex digit per cell.
///
/// # Errors
///
/// [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) if the
/// palette has more than 16 colors.
pub fn make_table(grid: &CellGrid, options: &TableOptions) -> Result<Vec<u8>> {
    require_hex_palette(grid, "table")?;

    let (open, sep, indent, indent2, close_row) = if options.compact {
        ("{", ",", "", "", "}")
    } else {
        ("{\n", ",\n", "    ", "        ", "    }")
    };

    let mut out = Vec::new();
    out.extend_from_slice(open.as_bytes());
    for y in 0..grid.height() {
        let (glyphs, fg, bg) = grid.row(y);
        let fg: Vec<u8> = fg.iter().map(|&c| hex_digit(c)).collect();
        let bg: Vec<u8> = bg.iter().map(|&c| hex_digit(c)).collect();

        out.extend_from_slice(indent.as_bytes());
        out.extend_from_slice(open.as_bytes());
        for (i, field) in [glyphs, &fg[..], &bg[..]].into_iter().enumerate() {
            out.extend_from_slice(indent2.as_bytes());
            push_lua_string(&mut out, field, options.escape);
            if !options.compact || i < 2 {
                out.extend_from_slice(sep.as_bytes());
            }
        }
        out.extend_from_slice(close_row.as_bytes());
        out.extend_from_slice(sep.as_bytes());
    }

    if options.embed_palette {
        out.extend_from_slice(indent.as_bytes());
        out.extend_from_slice(if options.compact {
            b"palette={".as_slice()
        } else {
            b"palette = {\n".as_slice()
        });
        for (i, color) in grid.palette().colors().iter().enumerate() {
            let entry = if options.compact {
                format!("[{i}]=0x{:06X},", color.to_hex())
            } else {
                format!("{indent2}[{i}] = 0x{:06X},\n", color.to_hex())
            };
            out.extend_from_slice(entry.as_bytes());
        }
        out.extend_from_slice(close_row.as_bytes());
        out.extend_from_slice(sep.as_bytes());
    }
    out.push(b'}');
    Ok(out)
}
