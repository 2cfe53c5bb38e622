//! Floyd-Steinberg error diffusion dithering algorithm.

use super::{nearest_color, Dither};
use crate::color::Pixel;
use crate::exec::ExecutionContext;
use crate::image::Image;
use crate::palette::Palette;

/// Diffusion targets as `(dx, dy, sixteenths)`.
///
/// ```text
///        X   7
///    3   5   1
/// ```
const WEIGHTS: [(isize, usize, f32); 4] = [(1, 0, 7.0), (-1, 1, 3.0), (0, 1, 5.0), (1, 1, 1.0)];

/// Error carried into the current row and the row below it.
#[derive(Debug)]
struct ErrorRows {
    current: Vec<[f32; 3]>,
    next: Vec<[f32; 3]>,
}

impl ErrorRows {
    fn new(width: usize) -> Self {
        Self {
            current: vec![[0.0; 3]; width],
            next: vec![[0.0; 3]; width],
        }
    }

    #[inline]
    fn carried(&self, x: usize) -> [f32; 3] {
        self.current[x]
    }

    /// Spread the residual of column `x` over its unvisited neighbors.
    /// Shares that would land outside the row are dropped.
    fn spread(&mut self, x: usize, error: [f32; 3]) {
        for (dx, dy, weight) in WEIGHTS {
            let Some(tx) = x.checked_add_signed(dx) else {
                continue;
            };
            let row = if dy == 0 {
                &mut self.current
            } else {
                &mut self.next
            };
            if let Some(cell) = row.get_mut(tx) {
                for c in 0..3 {
                    cell[c] += error[c] * weight / 16.0;
                }
            }
        }
    }

    fn advance(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.fill([0.0; 3]);
    }
}

/// Floyd-Steinberg error diffusion.
///
/// Pixels are visited in raster order, always left to right. Each pixel's
/// channels plus the error it received are clamped to `[0, 255]`, matched to
/// the nearest palette color in Lab, and the residual is spread with the
/// 7/16, 3/16, 5/16, 1/16 kernel. Error pushed past the image edge is
/// dropped.
///
/// The scan is inherently serial, so the execution context is not used.
pub struct FloydSteinberg;

impl Dither for FloydSteinberg {
    fn dither(&self, image: &Image, palette: &Palette, _ctx: &ExecutionContext) -> Image {
        let colors = palette.colors();
        let mut output = Vec::with_capacity(image.pixels().len());
        let mut errors = ErrorRows::new(image.width());

        for y in 0..image.height() {
            for (x, p) in image.row(y).iter().enumerate() {
                let acc = errors.carried(x);
                let value = [
                    (p.r as f32 + acc[0]).clamp(0.0, 255.0),
                    (p.g as f32 + acc[1]).clamp(0.0, 255.0),
                    (p.b as f32 + acc[2]).clamp(0.0, 255.0),
                ];

                let chosen: Pixel = colors[nearest_color(palette, value)];
                output.push(chosen);
                errors.spread(
                    x,
                    [
                        value[0] - chosen.r as f32,
                        value[1] - chosen.g as f32,
                        value[2] - chosen.b as f32,
                    ],
                );
            }
            errors.advance();
        }

        image.with_pixels(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bw() -> Palette {
        Palette::new(vec![Pixel::BLACK, Pixel::WHITE]).unwrap()
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum: f32 = WEIGHTS.iter().map(|&(_, _, w)| w).sum();
        assert_eq!(sum, 16.0);
    }

    #[test]
    fn test_spread_reaches_each_neighbor() {
        let mut rows = ErrorRows::new(3);
        rows.spread(1, [16.0, 32.0, -16.0]);
        assert_eq!(rows.current, vec![[0.0; 3], [0.0; 3], [7.0, 14.0, -7.0]]);
        assert_eq!(rows.next, vec![[3.0, 6.0, -3.0], [5.0, 10.0, -5.0], [1.0, 2.0, -1.0]]);

        rows.advance();
        assert_eq!(rows.carried(1), [5.0, 10.0, -5.0]);
        assert_eq!(rows.next, vec![[0.0; 3]; 3]);
    }

    #[test]
    fn test_spread_drops_shares_past_the_edges() {
        let mut rows = ErrorRows::new(2);
        rows.spread(0, [16.0; 3]);
        // Bottom-left of column 0 falls off.
        assert_eq!(rows.current[1], [7.0; 3]);
        assert_eq!(rows.next, vec![[5.0; 3], [1.0; 3]]);

        let mut rows = ErrorRows::new(2);
        rows.spread(1, [16.0; 3]);
        // Right and bottom-right of the last column fall off.
        assert_eq!(rows.current, vec![[0.0; 3]; 2]);
        assert_eq!(rows.next, vec![[3.0; 3], [5.0; 3]]);
    }

    #[test]
    fn test_floyd_steinberg_basic() {
        let image = Image::from_pixels(2, 2, vec![Pixel::new(128, 128, 128); 4]).unwrap();
        let out = FloydSteinberg.dither(&image, &bw(), &ExecutionContext::sequential());
        assert_eq!(out.width(), 2);
        assert_eq!(out.height(), 2);
        assert!(out
            .pixels()
            .iter()
            .all(|&p| p == Pixel::BLACK || p == Pixel::WHITE));
    }

    #[test]
    fn test_mean_level_conserved_without_clamping() {
        // Mid-range grays against 16 gray levels: residuals stay below one
        // level step, so nothing is clamped and only edge shares are lost.
        let grays: Vec<Pixel> = (0..16u8).map(|i| Pixel::new(i * 16, i * 16, i * 16)).collect();
        let palette = Palette::new(grays).unwrap();
        let (w, h) = (64, 64);
        let pixels: Vec<Pixel> = (0..w * h)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                let v = 96 + ((x * 37 + y * 61) % 64) as u8;
                Pixel::new(v, v, v)
            })
            .collect();
        let image = Image::from_pixels(w, h, pixels).unwrap();

        let out = FloydSteinberg.dither(&image, &palette, &ExecutionContext::sequential());
        let sum = |img: &Image| img.pixels().iter().map(|p| p.r as f64).sum::<f64>();
        let drift = (sum(&out) - sum(&image)).abs() / (w * h) as f64;
        assert!(drift <= 0.5, "mean level drifted by {drift} per pixel");
    }

    #[test]
    fn test_exact_colors_pass_through() {
        let image =
            Image::from_pixels(3, 1, vec![Pixel::BLACK, Pixel::WHITE, Pixel::BLACK]).unwrap();
        let out = FloydSteinberg.dither(&image, &bw(), &ExecutionContext::sequential());
        assert_eq!(out, image);
    }

    #[test]
    fn test_first_pixel_error_goes_right() {
        // Dark gray snaps to black; its error pushes the next pixel to white.
        let image = Image::from_pixels(2, 1, vec![Pixel::new(100, 100, 100); 2]).unwrap();
        let out = FloydSteinberg.dither(&image, &bw(), &ExecutionContext::sequential());
        assert_eq!(out.pixels(), &[Pixel::BLACK, Pixel::WHITE]);
    }
}
