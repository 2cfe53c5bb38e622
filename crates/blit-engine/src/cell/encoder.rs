//! Block-to-glyph approximation.

use super::glyph::{CELL_HEIGHT, CELL_WIDTH, GLYPH_TABLE, SUBPIXELS};
use super::grid::{Cell, CellGrid};
use crate::error::{EngineError, Result};
use crate::exec::ExecutionContext;
use crate::image::IndexedImage;
use crate::palette::Palette;

/// Chooses a glyph and color pair for each 2×3 block of an indexed image.
///
/// Squared Lab distances between all palette entries are computed once per
/// encoder, so a block costs only table lookups.
#[derive(Debug, Clone)]
pub struct CellEncoder {
    palette: Palette,
    dist: Vec<f32>,
}

impl CellEncoder {
    pub fn new(palette: &Palette) -> Self {
        let n = palette.len();
        let mut dist = vec![0.0; n * n];
        for a in 0..n {
            for b in 0..n {
                dist[a * n + b] = palette.lab(a).distance_squared(palette.lab(b));
            }
        }
        Self {
            palette: palette.clone(),
            dist,
        }
    }

    #[inline]
    fn distance(&self, a: u8, b: u8) -> f32 {
        self.dist[a as usize * self.palette.len() + b as usize]
    }

    /// Reconstruction error of drawing `block` with colors `a < b`, and the
    /// mask of sub-pixels that take `b`. Each sub-pixel takes the closer of
    /// the two; ties go to `a`.
    fn pair_cost(&self, block: &[u8; SUBPIXELS], a: u8, b: u8) -> (f32, u8) {
        let mut error = 0.0;
        let mut mask = 0u8;
        for (i, &p) in block.iter().enumerate() {
            let da = self.distance(p, a);
            let db = self.distance(p, b);
            if db < da {
                error += db;
                mask |= 1 << i;
            } else {
                error += da;
            }
        }
        (error, mask)
    }

    /// Best cell for one block of six palette indices, row-major.
    ///
    /// Every unordered pair of distinct indices present in the block is
    /// tried in ascending `(low, high)` order; the first pair reaching the
    /// minimum error wins. A single-color block becomes a solid cell.
    ///
    /// Palette entries absent from the block are never candidates, even
    /// when one would sit closer to a mixed block than any present pair.
    pub fn encode_block(&self, block: &[u8; SUBPIXELS]) -> Cell {
        let mut present: Vec<u8> = block.to_vec();
        present.sort_unstable();
        present.dedup();

        if present.len() == 1 {
            return Cell::solid(present[0]);
        }

        let mut best: Option<(f32, u8, u8, u8)> = None;
        for (i, &a) in present.iter().enumerate() {
            for &b in &present[i + 1..] {
                let (error, mask) = self.pair_cost(block, a, b);
                if best.map_or(true, |(e, ..)| error < e) {
                    best = Some((error, a, b, mask));
                }
            }
        }

        let (_, a, b, mask) = best.unwrap_or((0.0, present[0], present[0], 0));
        let choice = GLYPH_TABLE[mask as usize];
        let (fg, bg) = if choice.swap { (a, b) } else { (b, a) };
        Cell {
            glyph: choice.code,
            fg,
            bg,
        }
    }

    /// Encode an indexed image into a `⌊W/2⌋ × ⌊H/3⌋` grid. Trailing pixel
    /// columns and rows that do not fill a cell are dropped.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] if an index exceeds the palette, or
    ///   the image is smaller than one cell.
    pub fn encode(&self, image: &IndexedImage, ctx: &ExecutionContext) -> Result<CellGrid> {
        image.validate(&self.palette)?;
        let width = image.width() / CELL_WIDTH;
        let height = image.height() / CELL_HEIGHT;
        if width == 0 || height == 0 {
            return Err(EngineError::invalid(format!(
                "a {}x{} image is smaller than one {CELL_WIDTH}x{CELL_HEIGHT} cell",
                image.width(),
                image.height()
            )));
        }

        let data = image.data();
        let stride = image.width();
        let rows = ctx.map_range(height, |cy| {
            (0..width)
                .map(|cx| {
                    let mut block = [0u8; SUBPIXELS];
                    for (sub, slot) in block.iter_mut().enumerate() {
                        let x = cx * CELL_WIDTH + sub % CELL_WIDTH;
                        let y = cy * CELL_HEIGHT + sub / CELL_WIDTH;
                        *slot = data[y * stride + x];
                    }
                    self.encode_block(&block)
                })
                .collect::<Vec<_>>()
        });

        tracing::debug!(width, height, "Cells encoded");
        Ok(CellGrid::from_cells(
            width,
            height,
            &rows.concat(),
            self.palette.clone(),
        ))
    }

    /// Sum of squared Lab distances between `block` and `cell` as drawn.
    pub fn block_error(&self, block: &[u8; SUBPIXELS], cell: &Cell) -> f32 {
        block
            .iter()
            .enumerate()
            .map(|(i, &p)| self.distance(p, cell.color_at(i)))
            .sum()
    }
}

/// Encode `image` against `palette` in one call.
pub fn encode_cells(
    image: &IndexedImage,
    palette: &Palette,
    ctx: &ExecutionContext,
) -> Result<CellGrid> {
    CellEncoder::new(palette).encode(image, ctx)
}
