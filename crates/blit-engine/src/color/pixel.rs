//! 8-bit RGB pixel type.

use serde::{Deserialize, Serialize};

/// One 8-bit RGB color.
///
/// Channel order is always (red, green, blue), whatever byte layout the
/// source buffer used. Ordering is lexicographic on (r, g, b), which the
/// palette reducers rely on for a fixed visitation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);
    pub const WHITE: Pixel = Pixel::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as `[r, g, b]`.
    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channel by position: 0 = red, 1 = green, 2 = blue.
    #[inline]
    pub fn channel(self, channel: usize) -> u8 {
        match channel {
            0 => self.r,
            1 => self.g,
            _ => self.b,
        }
    }

    /// Pack as `0xRRGGBB`.
    #[inline]
    pub fn to_hex(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Build from float channels, rounding and clamping each to 0..=255.
    #[inline]
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.round().clamp(0.0, 255.0) as u8,
            g: g.round().clamp(0.0, 255.0) as u8,
            b: b.round().clamp(0.0, 255.0) as u8,
        }
    }
}

impl From<[u8; 3]> for Pixel {
    fn from(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_access() {
        let p = Pixel::new(10, 20, 30);
        assert_eq!(p.channel(0), 10);
        assert_eq!(p.channel(1), 20);
        assert_eq!(p.channel(2), 30);
        assert_eq!(p.to_array(), [10, 20, 30]);
        assert_eq!(Pixel::from([10, 20, 30]), p);
    }

    #[test]
    fn test_hex_packing() {
        assert_eq!(Pixel::new(0xF0, 0x0F, 0xAB).to_hex(), 0xF00FAB);
    }

    #[test]
    fn test_from_f32_clamps() {
        assert_eq!(Pixel::from_f32(-4.0, 127.6, 300.0), Pixel::new(0, 128, 255));
    }

    #[test]
    fn test_ordering_is_rgb_lexicographic() {
        assert!(Pixel::new(0, 255, 255) < Pixel::new(1, 0, 0));
        assert!(Pixel::new(5, 1, 9) < Pixel::new(5, 2, 0));
    }
}
