//! Palette type and nearest-color matching

mod palette;

pub use palette::{Palette, MAX_COLORS};
