//! CellGrid: glyph and color planes plus the palette they index.

use serde::Serialize;

use super::glyph::{is_glyph, shows_foreground, CELL_HEIGHT, CELL_WIDTH, GLYPH_BASE};
use crate::error::{EngineError, Result};
use crate::image::IndexedImage;
use crate::palette::Palette;

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Glyph code in `128..=159`.
    pub glyph: u8,
    pub fg: u8,
    pub bg: u8,
}

impl Cell {
    /// A cell filled with a single color.
    pub const fn solid(color: u8) -> Self {
        Self {
            glyph: GLYPH_BASE,
            fg: color,
            bg: color,
        }
    }

    /// Palette index shown at sub-pixel `i` (row-major in the 2×3 block).
    #[inline]
    pub fn color_at(&self, subpixel: usize) -> u8 {
        if shows_foreground(self.glyph, subpixel) {
            self.fg
        } else {
            self.bg
        }
    }
}

/// A grid of cells, row-major, with the palette its colors refer to.
///
/// Glyph codes are always in the alphabet and every color index addresses
/// the palette; both constructors enforce this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellGrid {
    width: usize,
    height: usize,
    glyphs: Vec<u8>,
    foreground: Vec<u8>,
    background: Vec<u8>,
    palette: Palette,
}

impl CellGrid {
    pub(crate) fn from_cells(
        width: usize,
        height: usize,
        cells: &[Cell],
        palette: Palette,
    ) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            glyphs: cells.iter().map(|c| c.glyph).collect(),
            foreground: cells.iter().map(|c| c.fg).collect(),
            background: cells.iter().map(|c| c.bg).collect(),
            palette,
        }
    }

    /// Rebuild a grid from its [`streams`](CellGrid::streams).
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] for zero dimensions, stream lengths
    ///   that do not match the geometry, glyph codes outside `128..=159` or
    ///   colors outside the palette.
    pub fn from_streams(
        width: usize,
        height: usize,
        glyphs: &[u8],
        colors: &[u8],
        palette: Palette,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::invalid(format!(
                "cell grid dimensions must be positive, got {width}x{height}"
            )));
        }
        let n = width * height;
        if glyphs.len() != n || colors.len() != 2 * n {
            return Err(EngineError::invalid(format!(
                "streams of {} glyphs and {} colors do not fit a {width}x{height} grid",
                glyphs.len(),
                colors.len()
            )));
        }
        if let Some(&g) = glyphs.iter().find(|&&g| !is_glyph(g)) {
            return Err(EngineError::invalid(format!("glyph code {g} outside 128..=159")));
        }
        if let Some(&c) = colors.iter().find(|&&c| c as usize >= palette.len()) {
            return Err(EngineError::invalid(format!(
                "color index {c} exceeds palette of {} colors",
                palette.len()
            )));
        }
        Ok(Self {
            width,
            height,
            glyphs: glyphs.to_vec(),
            foreground: colors[..n].to_vec(),
            background: colors[n..].to_vec(),
            palette,
        })
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn glyphs(&self) -> &[u8] {
        &self.glyphs
    }

    #[inline]
    pub fn foreground(&self) -> &[u8] {
        &self.foreground
    }

    #[inline]
    pub fn background(&self) -> &[u8] {
        &self.background
    }

    /// Cell at column `x`, row `y`.
    pub fn cell(&self, x: usize, y: usize) -> Result<Cell> {
        if x >= self.width || y >= self.height {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let i = y * self.width + x;
        Ok(Cell {
            glyph: self.glyphs[i],
            fg: self.foreground[i],
            bg: self.background[i],
        })
    }

    /// One row of glyphs, foreground and background.
    pub(crate) fn row(&self, y: usize) -> (&[u8], &[u8], &[u8]) {
        let r = y * self.width..(y + 1) * self.width;
        (
            &self.glyphs[r.clone()],
            &self.foreground[r.clone()],
            &self.background[r],
        )
    }

    /// The glyph stream (one byte per cell) and the color stream (every
    /// foreground byte, then every background byte), both row-major.
    pub fn streams(&self) -> (Vec<u8>, Vec<u8>) {
        let mut colors = Vec::with_capacity(self.foreground.len() * 2);
        colors.extend_from_slice(&self.foreground);
        colors.extend_from_slice(&self.background);
        (self.glyphs.clone(), colors)
    }

    /// Draw every cell back into a `2W × 3H` indexed image.
    pub fn render(&self) -> IndexedImage {
        let pw = self.width * CELL_WIDTH;
        let ph = self.height * CELL_HEIGHT;
        let mut data = vec![0u8; pw * ph];
        for cy in 0..self.height {
            for cx in 0..self.width {
                let i = cy * self.width + cx;
                let cell = Cell {
                    glyph: self.glyphs[i],
                    fg: self.foreground[i],
                    bg: self.background[i],
                };
                for sub in 0..CELL_WIDTH * CELL_HEIGHT {
                    let x = cx * CELL_WIDTH + sub % CELL_WIDTH;
                    let y = cy * CELL_HEIGHT + sub / CELL_WIDTH;
                    data[y * pw + x] = cell.color_at(sub);
                }
            }
        }
        IndexedImage::from_validated(pw, ph, data)
    }
}
