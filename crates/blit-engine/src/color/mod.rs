//! Color types and conversion utilities
//!
//! - [`Pixel`]: 8-bit sRGB, the storage format for images and palettes.
//! - [`Lab`]: CIE L\*a\*b\* (D65), used for every perceptual distance.
//!
//! Gamma companding goes through lookup tables generated by `build.rs`.

mod lab;
mod lut;
mod pixel;

pub use lab::{convert_lab_palette, lab_image, make_lab_image, Lab};
pub use pixel::Pixel;
