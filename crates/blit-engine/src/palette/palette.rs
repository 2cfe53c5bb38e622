//! Palette struct with precomputed Lab colors and nearest-color matching.

use serde::{Serialize, Serializer};

use crate::color::{Lab, Pixel};
use crate::error::{EngineError, Result};

/// Largest palette an indexed byte can address.
pub const MAX_COLORS: usize = 256;

/// An ordered list of 1 to 256 colors.
///
/// Position defines the index→color mapping used by indexed images, cell
/// grids and every exporter. Duplicate entries are allowed; lookups resolve
/// them to the lowest index.
///
/// # Precomputation
///
/// The Lab form of every entry is computed once at construction, so
/// per-pixel matching never converts palette colors.
///
/// # Example
///
/// ```
/// use blit_engine::{Palette, Pixel};
///
/// let palette = Palette::new(vec![Pixel::BLACK, Pixel::WHITE]).unwrap();
/// assert_eq!(palette.len(), 2);
/// assert_eq!(palette.find_exact(Pixel::WHITE), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Pixel>,
    lab: Vec<Lab>,
}

impl Palette {
    /// Create a palette from its colors.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] when `colors` is empty or holds more
    /// than [`MAX_COLORS`] entries.
    pub fn new(colors: Vec<Pixel>) -> Result<Self> {
        if colors.is_empty() {
            return Err(EngineError::invalid("palette must hold at least one color"));
        }
        if colors.len() > MAX_COLORS {
            return Err(EngineError::invalid(format!(
                "palette holds {} colors, at most {MAX_COLORS} are addressable",
                colors.len()
            )));
        }
        Ok(Self::from_validated(colors))
    }

    /// Build from colors whose count is already known to be in range.
    pub(crate) fn from_validated(colors: Vec<Pixel>) -> Self {
        debug_assert!(!colors.is_empty() && colors.len() <= MAX_COLORS);
        let lab = colors.iter().map(|&c| Lab::from(c)).collect();
        Self { colors, lab }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; empty palettes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &[Pixel] {
        &self.colors
    }

    /// Color at `idx`, or `None` past the end.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Pixel> {
        self.colors.get(idx).copied()
    }

    /// Lab form of the color at `idx`.
    ///
    /// Panics when `idx` is out of range; callers hold validated indices.
    #[inline]
    pub fn lab(&self, idx: usize) -> Lab {
        self.lab[idx]
    }

    /// Find the nearest palette color to the given Lab color.
    ///
    /// Returns `(index, squared distance)`. Linear scan with a strict `<`,
    /// so equidistant entries resolve to the lowest index.
    #[inline]
    pub fn find_nearest(&self, color: Lab) -> (usize, f32) {
        let mut best_idx = 0;
        let mut best_dist = f32::MAX;

        for (i, &entry) in self.lab.iter().enumerate() {
            let dist = color.distance_squared(entry);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        (best_idx, best_dist)
    }

    /// Index of the first entry exactly equal to `color`.
    #[inline]
    pub fn find_exact(&self, color: Pixel) -> Option<usize> {
        self.colors.iter().position(|&c| c == color)
    }

    /// Exact match when present, nearest in Lab otherwise.
    pub fn index_of(&self, color: Pixel) -> usize {
        match self.find_exact(color) {
            Some(idx) => idx,
            None => self.find_nearest(Lab::from(color)).0,
        }
    }
}

impl Serialize for Palette {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.colors.serialize(serializer)
    }
}
