//! CIE L\*a\*b\* perceptual color space
//!
//! Conversion path: 8-bit sRGB → linear RGB (gamma LUT) → CIE XYZ (sRGB
//! primaries) → L\*a\*b\* relative to the D65 reference white. The inverse runs
//! the same chain backwards.
//!
//! The inverse is lossy once the result is re-quantized to 8-bit channels:
//! `Pixel::from(Lab::from(p))` may differ from `p` by one step per channel.
//! That is an accepted property of the transform.

use serde::{Deserialize, Serialize};

use super::lut::{linear_to_srgb, srgb8_to_linear};
use super::pixel::Pixel;
use crate::image::Image;
use crate::palette::Palette;

/// D65 reference white, X component.
const WHITE_X: f32 = 0.95047;
/// D65 reference white, Y component.
const WHITE_Y: f32 = 1.0;
/// D65 reference white, Z component.
const WHITE_Z: f32 = 1.08883;

/// CIE ε = 216 / 24389.
const EPSILON: f32 = 216.0 / 24389.0;
/// CIE κ = 24389 / 27.
const KAPPA: f32 = 24389.0 / 27.0;

/// A color in CIE L\*a\*b\*.
///
/// - `l`: lightness, 0 (black) to 100 (white)
/// - `a`: green (negative) to red (positive)
/// - `b`: blue (negative) to yellow (positive)
///
/// Values are not clamped; centroids and dithered colors may leave the sRGB
/// gamut in intermediate steps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance (CIE76 ΔE²).
    ///
    /// Every nearest-color decision in the engine compares these values.
    #[inline]
    pub fn distance_squared(self, other: Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }

    /// Encode into 8-bit channels: L scaled from 0..100 to 0..255, a and b
    /// offset by 128. Out-of-range components are clamped.
    pub fn to_encoded(self) -> Pixel {
        Pixel::from_f32(self.l * 255.0 / 100.0, self.a + 128.0, self.b + 128.0)
    }

    /// Decode a color produced by [`Lab::to_encoded`].
    pub fn from_encoded(p: Pixel) -> Self {
        Self {
            l: p.r as f32 * 100.0 / 255.0,
            a: p.g as f32 - 128.0,
            b: p.b as f32 - 128.0,
        }
    }
}

#[inline]
fn pivot_xyz(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

impl From<Pixel> for Lab {
    fn from(p: Pixel) -> Self {
        let r = srgb8_to_linear(p.r);
        let g = srgb8_to_linear(p.g);
        let b = srgb8_to_linear(p.b);

        let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
        let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
        let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

        let fx = pivot_xyz(x / WHITE_X);
        let fy = pivot_xyz(y / WHITE_Y);
        let fz = pivot_xyz(z / WHITE_Z);

        Lab {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

impl From<Lab> for Pixel {
    fn from(lab: Lab) -> Self {
        let fy = (lab.l + 16.0) / 116.0;
        let fx = fy + lab.a / 500.0;
        let fz = fy - lab.b / 200.0;

        let fx3 = fx * fx * fx;
        let fz3 = fz * fz * fz;
        let xr = if fx3 > EPSILON {
            fx3
        } else {
            (116.0 * fx - 16.0) / KAPPA
        };
        let yr = if lab.l > KAPPA * EPSILON {
            fy * fy * fy
        } else {
            lab.l / KAPPA
        };
        let zr = if fz3 > EPSILON {
            fz3
        } else {
            (116.0 * fz - 16.0) / KAPPA
        };

        let x = xr * WHITE_X;
        let y = yr * WHITE_Y;
        let z = zr * WHITE_Z;

        let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
        let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
        let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

        Pixel::from_f32(
            linear_to_srgb(r) * 255.0,
            linear_to_srgb(g) * 255.0,
            linear_to_srgb(b) * 255.0,
        )
    }
}

/// Convert every pixel of an image to Lab, row-major.
pub fn lab_image(image: &Image) -> Vec<Lab> {
    image.pixels().iter().map(|&p| Lab::from(p)).collect()
}

/// Produce a copy of `image` whose pixels hold 8-bit encoded Lab values.
///
/// The palette reducers accept this like any other image; the palette they
/// return is then in encoded Lab and goes through [`convert_lab_palette`].
pub fn make_lab_image(image: &Image) -> Image {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        *p = Lab::from(*p).to_encoded();
    }
    out
}

/// Convert a palette of 8-bit encoded Lab colors back to RGB, element-wise.
pub fn convert_lab_palette(palette: &Palette) -> Palette {
    let colors: Vec<Pixel> = palette
        .colors()
        .iter()
        .map(|&p| Pixel::from(Lab::from_encoded(p)))
        .collect();
    // Same length as the input, which already satisfied the palette bounds.
    Palette::from_validated(colors)
}
