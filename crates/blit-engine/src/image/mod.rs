//! Pixel buffers and source-format decoding
//!
//! [`Image`] holds RGB pixels, [`IndexedImage`] holds palette indices. Both
//! are row-major, at least 1×1, and bounds-check random access.

mod buffer;
mod format;

pub use buffer::{Image, IndexedImage};
pub use format::PixelFormat;
