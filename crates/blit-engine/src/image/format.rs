//! Source pixel layouts accepted by the decoders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Pixel;
use crate::error::EngineError;

/// Channel order of a packed source buffer.
///
/// | tag    | bytes | order in source       |
/// |--------|-------|-----------------------|
/// | `rgb`  | 3     | R, G, B               |
/// | `bgr`  | 3     | B, G, R               |
/// | `rgba` | 4     | R, G, B, A            |
/// | `argb` | 4     | A, R, G, B            |
/// | `bgra` | 4     | B, G, R, A            |
/// | `abgr` | 4     | A, B, G, R            |
///
/// Alpha is always ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Rgb,
    Bgr,
    Rgba,
    Argb,
    Bgra,
    Abgr,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 6] = [
        PixelFormat::Rgb,
        PixelFormat::Bgr,
        PixelFormat::Rgba,
        PixelFormat::Argb,
        PixelFormat::Bgra,
        PixelFormat::Abgr,
    ];

    /// Bytes one pixel occupies in a byte buffer.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb | PixelFormat::Bgr => 3,
            _ => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PixelFormat::Rgb => "rgb",
            PixelFormat::Bgr => "bgr",
            PixelFormat::Rgba => "rgba",
            PixelFormat::Argb => "argb",
            PixelFormat::Bgra => "bgra",
            PixelFormat::Abgr => "abgr",
        }
    }

    /// Read one pixel from exactly `bytes_per_pixel()` bytes.
    #[inline]
    pub(crate) fn read_bytes(self, px: &[u8]) -> Pixel {
        match self {
            PixelFormat::Rgb | PixelFormat::Rgba => Pixel::new(px[0], px[1], px[2]),
            PixelFormat::Bgr | PixelFormat::Bgra => Pixel::new(px[2], px[1], px[0]),
            PixelFormat::Argb => Pixel::new(px[1], px[2], px[3]),
            PixelFormat::Abgr => Pixel::new(px[3], px[2], px[1]),
        }
    }

    /// Read one pixel from a packed 32-bit word, most significant byte first.
    ///
    /// Only the four 4-byte layouts have a word form.
    #[inline]
    pub(crate) fn read_word(self, word: u32) -> Option<Pixel> {
        let byte = |shift: u32| (word >> shift) as u8;
        match self {
            PixelFormat::Rgba => Some(Pixel::new(byte(24), byte(16), byte(8))),
            PixelFormat::Argb => Some(Pixel::new(byte(16), byte(8), byte(0))),
            PixelFormat::Bgra => Some(Pixel::new(byte(8), byte(16), byte(24))),
            PixelFormat::Abgr => Some(Pixel::new(byte(0), byte(8), byte(16))),
            PixelFormat::Rgb | PixelFormat::Bgr => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PixelFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| EngineError::unsupported("pixel format", s))
    }
}
