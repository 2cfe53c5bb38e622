//! The 2×3 block glyph alphabet.
//!
//! Glyph codes run from 128 to 159. Bit `i` of `code - 128` set means
//! sub-pixel `i` shows the foreground color; sub-pixel 5 always shows the
//! background. Sub-pixels are numbered row-major:
//!
//! ```text
//!    0 1
//!    2 3
//!    4 5
//! ```

/// First glyph code.
pub const GLYPH_BASE: u8 = 128;
/// Number of glyphs.
pub const GLYPH_COUNT: usize = 32;
/// Sub-pixels per cell.
pub const SUBPIXELS: usize = 6;
/// Cell width in sub-pixels.
pub const CELL_WIDTH: usize = 2;
/// Cell height in sub-pixels.
pub const CELL_HEIGHT: usize = 3;

/// How to draw one 6-bit coverage mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphChoice {
    pub code: u8,
    /// Foreground and background trade places.
    pub swap: bool,
}

const fn choice(mask: u8) -> GlyphChoice {
    if mask & 0x20 == 0 {
        GlyphChoice {
            code: GLYPH_BASE + mask,
            swap: false,
        }
    } else {
        GlyphChoice {
            code: GLYPH_BASE + (!mask & 0x1F),
            swap: true,
        }
    }
}

const fn build_table() -> [GlyphChoice; 64] {
    let mut table = [GlyphChoice {
        code: GLYPH_BASE,
        swap: false,
    }; 64];
    let mut mask = 0;
    while mask < 64 {
        table[mask] = choice(mask as u8);
        mask += 1;
    }
    table
}

/// Glyph for every coverage mask, where bit `i` marks sub-pixel `i` as
/// foreground.
pub static GLYPH_TABLE: [GlyphChoice; 64] = build_table();

#[inline]
pub fn is_glyph(code: u8) -> bool {
    (GLYPH_BASE..GLYPH_BASE + GLYPH_COUNT as u8).contains(&code)
}

/// Whether sub-pixel `i` of `code` shows the foreground.
#[inline]
pub fn shows_foreground(code: u8, subpixel: usize) -> bool {
    subpixel < 5 && (code.wrapping_sub(GLYPH_BASE) >> subpixel) & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_stays_in_alphabet() {
        for entry in GLYPH_TABLE.iter() {
            assert!(is_glyph(entry.code), "code {} outside alphabet", entry.code);
        }
        assert!(!is_glyph(127));
        assert!(!is_glyph(160));
    }

    #[test]
    fn test_table_reproduces_every_mask() {
        for mask in 0..64usize {
            let GlyphChoice { code, swap } = GLYPH_TABLE[mask];
            for i in 0..SUBPIXELS {
                let wants_fg = (mask >> i) & 1 == 1;
                let drawn_fg = shows_foreground(code, i) != swap;
                assert_eq!(wants_fg, drawn_fg, "mask {mask:06b} sub-pixel {i}");
            }
        }
    }

    #[test]
    fn test_low_masks_are_direct() {
        assert_eq!(
            GLYPH_TABLE[0b00101],
            GlyphChoice {
                code: 133,
                swap: false
            }
        );
        assert_eq!(
            GLYPH_TABLE[0b100000],
            GlyphChoice {
                code: 159,
                swap: true
            }
        );
    }
}
