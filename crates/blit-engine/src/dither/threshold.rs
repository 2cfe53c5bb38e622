//! Nearest-color quantization without error propagation.

use super::{map_pixels, Dither};
use crate::color::Lab;
use crate::exec::ExecutionContext;
use crate::image::Image;
use crate::palette::Palette;

/// Replace every pixel with its nearest palette color in Lab.
///
/// Pixels are independent, so rows run in parallel under a parallel context.
pub struct Threshold;

impl Dither for Threshold {
    fn dither(&self, image: &Image, palette: &Palette, ctx: &ExecutionContext) -> Image {
        let colors = palette.colors();
        map_pixels(image, ctx, |_, _, p| {
            colors[palette.find_nearest(Lab::from(p)).0]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Pixel;

    #[test]
    fn test_threshold_snaps_to_nearest() {
        let palette = Palette::new(vec![Pixel::BLACK, Pixel::WHITE, Pixel::new(255, 0, 0)]).unwrap();
        let image = Image::from_pixels(
            3,
            1,
            vec![
                Pixel::new(30, 30, 30),
                Pixel::new(230, 220, 225),
                Pixel::new(220, 20, 10),
            ],
        )
        .unwrap();
        let out = Threshold.dither(&image, &palette, &ExecutionContext::sequential());
        assert_eq!(
            out.pixels(),
            &[Pixel::BLACK, Pixel::WHITE, Pixel::new(255, 0, 0)]
        );
    }

    #[test]
    fn test_threshold_keeps_palette_colors() {
        let palette = Palette::new(vec![Pixel::new(1, 2, 3), Pixel::new(200, 100, 0)]).unwrap();
        let image = Image::from_pixels(2, 1, palette.colors().to_vec()).unwrap();
        let out = Threshold.dither(&image, &palette, &ExecutionContext::sequential());
        assert_eq!(out, image);
    }
}
