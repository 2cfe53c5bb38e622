//! Owned RGB and indexed pixel buffers.

use serde::Serialize;

use super::format::PixelFormat;
use crate::color::Pixel;
use crate::error::{EngineError, Result};
use crate::palette::Palette;

fn check_extent(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(EngineError::invalid(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }
    width
        .checked_mul(height)
        .ok_or_else(|| EngineError::invalid(format!("image {width}x{height} is too large")))
}

/// Byte length of `len` pixels at `bpp` bytes each.
fn byte_len(len: usize, bpp: usize, width: usize, height: usize) -> Result<usize> {
    len.checked_mul(bpp)
        .ok_or_else(|| EngineError::invalid(format!("image {width}x{height} is too large")))
}

/// A dense row-major RGB image, at least 1×1.
///
/// # Example
///
/// ```
/// use blit_engine::{Image, PixelFormat, Pixel};
///
/// let image = Image::from_bytes(&[10, 20, 30, 255], 1, 1, PixelFormat::Rgba).unwrap();
/// assert_eq!(image.at(0, 0).unwrap(), Pixel::new(10, 20, 30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Image {
    /// A black image of the given size.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = check_extent(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![Pixel::BLACK; len],
        })
    }

    /// Wrap row-major pixels. `pixels.len()` must equal `width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self> {
        let len = check_extent(width, height)?;
        if pixels.len() != len {
            return Err(EngineError::invalid(format!(
                "{} pixels supplied for a {width}x{height} image",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from a list of rows. Rows must be non-empty and of equal length.
    pub fn from_rows(rows: &[Vec<Pixel>]) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        check_extent(width, rows.len())?;
        if let Some(y) = rows.iter().position(|row| row.len() != width) {
            return Err(EngineError::invalid(format!(
                "row {y} holds {} pixels, expected {width}",
                rows[y].len()
            )));
        }
        Ok(Self {
            width,
            height: rows.len(),
            pixels: rows.concat(),
        })
    }

    /// Decode a packed byte buffer in the given channel layout.
    ///
    /// # Errors
    ///
    /// [`EngineError::Truncated`] when `data` holds fewer than
    /// `width * height * format.bytes_per_pixel()` bytes. Trailing bytes are
    /// ignored.
    pub fn from_bytes(
        data: &[u8],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        let len = check_extent(width, height)?;
        let bpp = format.bytes_per_pixel();
        let needed = byte_len(len, bpp, width, height)?;
        if data.len() < needed {
            return Err(EngineError::Truncated {
                needed,
                available: data.len(),
            });
        }
        let pixels = data[..needed]
            .chunks_exact(bpp)
            .map(|px| format.read_bytes(px))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode packed 32-bit words, one per pixel, via bit shifts.
    ///
    /// # Errors
    ///
    /// [`EngineError::Unsupported`] for the 3-byte layouts, which have no
    /// word form. [`EngineError::Truncated`] when fewer than
    /// `width * height` words are supplied (reported in bytes).
    pub fn from_words(
        data: &[u32],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        let len = check_extent(width, height)?;
        if format.read_word(0).is_none() {
            return Err(EngineError::unsupported("word pixel format", format.as_str()));
        }
        let needed = byte_len(len, 4, width, height)?;
        if data.len() < len {
            return Err(EngineError::Truncated {
                needed,
                available: data.len().saturating_mul(4),
            });
        }
        let pixels = data[..len]
            .iter()
            .map(|&w| format.read_word(w).unwrap_or_default())
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Same geometry, new pixels. `pixels.len()` must match.
    pub(crate) fn with_pixels(&self, pixels: Vec<Pixel>) -> Image {
        debug_assert_eq!(pixels.len(), self.pixels.len());
        Image {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// One row of pixels. Panics when `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[Pixel] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    /// Pixel at (x, y).
    pub fn at(&self, x: usize, y: usize) -> Result<Pixel> {
        Ok(self.pixels[self.offset(x, y)?])
    }

    /// Overwrite the pixel at (x, y).
    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) -> Result<()> {
        let i = self.offset(x, y)?;
        self.pixels[i] = pixel;
        Ok(())
    }

    /// Stack images of identical size on top of each other.
    ///
    /// Used to reduce one palette over every frame of a sequence.
    pub fn stack(frames: &[Image]) -> Result<Image> {
        let first = frames
            .first()
            .ok_or_else(|| EngineError::invalid("no frames to stack"))?;
        if let Some(i) = frames
            .iter()
            .position(|f| f.width != first.width || f.height != first.height)
        {
            return Err(EngineError::invalid(format!(
                "frame {i} is {}x{}, expected {}x{}",
                frames[i].width, frames[i].height, first.width, first.height
            )));
        }
        let height = first
            .height
            .checked_mul(frames.len())
            .ok_or_else(|| EngineError::invalid("stacked image is too large"))?;
        let mut pixels = Vec::with_capacity(first.pixels.len() * frames.len());
        for frame in frames {
            pixels.extend_from_slice(&frame.pixels);
        }
        Ok(Image {
            width: first.width,
            height,
            pixels,
        })
    }
}

/// Row-major palette indices with their dimensions.
///
/// The palette is not stored; [`IndexedImage::validate`] checks a pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl IndexedImage {
    /// `data.len()` must equal `width * height`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let len = check_extent(width, height)?;
        if data.len() != len {
            return Err(EngineError::invalid(format!(
                "{} indices supplied for a {width}x{height} image",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn from_validated(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Index at (x, y).
    pub fn at(&self, x: usize, y: usize) -> Result<u8> {
        if x >= self.width || y >= self.height {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.data[y * self.width + x])
    }

    /// Check that every index addresses a color of `palette`.
    pub fn validate(&self, palette: &Palette) -> Result<()> {
        match self.data.iter().position(|&i| i as usize >= palette.len()) {
            Some(pos) => Err(EngineError::invalid(format!(
                "index {} at ({}, {}) exceeds palette of {} colors",
                self.data[pos],
                pos % self.width,
                pos / self.width,
                palette.len()
            ))),
            None => Ok(()),
        }
    }

    /// Map every index back through `palette`.
    pub fn to_image(&self, palette: &Palette) -> Result<Image> {
        self.validate(palette)?;
        let colors = palette.colors();
        Ok(Image {
            width: self.width,
            height: self.height,
            pixels: self.data.iter().map(|&i| colors[i as usize]).collect(),
        })
    }
}
