//! PNG input and grid previews.

use std::io::Cursor;
use std::path::Path;

use blit_engine::{CellGrid, Image, PixelFormat};

use crate::error::AppError;

/// Decode a PNG of any color type and bit depth into an RGB image.
///
/// Palette images are expanded, 16-bit samples are truncated to 8 bits and
/// alpha is dropped.
pub fn decode_png(bytes: &[u8]) -> Result<Image, AppError> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| AppError::PngDecode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| AppError::PngDecode(e.to_string()))?;
    let data = &buf[..info.buffer_size()];
    let (width, height) = (info.width as usize, info.height as usize);

    let image = match info.color_type {
        png::ColorType::Rgb => Image::from_bytes(data, width, height, PixelFormat::Rgb)?,
        png::ColorType::Rgba => Image::from_bytes(data, width, height, PixelFormat::Rgba)?,
        png::ColorType::Grayscale => {
            let rgb: Vec<u8> = data.iter().flat_map(|&v| [v, v, v]).collect();
            Image::from_bytes(&rgb, width, height, PixelFormat::Rgb)?
        }
        png::ColorType::GrayscaleAlpha => {
            let rgb: Vec<u8> = data.chunks_exact(2).flat_map(|c| [c[0], c[0], c[0]]).collect();
            Image::from_bytes(&rgb, width, height, PixelFormat::Rgb)?
        }
        png::ColorType::Indexed => {
            return Err(AppError::PngDecode(
                "palette image was not expanded".to_string(),
            ))
        }
    };
    tracing::debug!(width, height, color_type = ?info.color_type, "PNG decoded");
    Ok(image)
}

pub fn load_png(path: &Path) -> Result<Image, AppError> {
    let bytes = std::fs::read(path)?;
    decode_png(&bytes)
}

/// Render a grid as an indexed PNG, one PNG pixel per sub-pixel.
pub fn encode_preview(grid: &CellGrid) -> Result<Vec<u8>, AppError> {
    let indexed = grid.render();
    let palette = grid.palette();
    let width = indexed.width() as u32;
    let height = indexed.height() as u32;

    let (depth, bits) = match palette.len() {
        0..=2 => (png::BitDepth::One, 1),
        3..=4 => (png::BitDepth::Two, 2),
        5..=16 => (png::BitDepth::Four, 4),
        _ => (png::BitDepth::Eight, 8),
    };
    let plte: Vec<u8> = palette.colors().iter().flat_map(|c| c.to_array()).collect();
    let packed = if bits == 8 {
        indexed.into_data()
    } else {
        pack_nbits(indexed.data(), width, bits)
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(depth);
        encoder.set_palette(plte);
        let mut writer = encoder
            .write_header()
            .map_err(|e| AppError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(&packed)
            .map_err(|e| AppError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Pack pixel values into N-bit PNG row data (1, 2, or 4 bits per pixel).
fn pack_nbits(indices: &[u8], width: u32, bits: u8) -> Vec<u8> {
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = (width as usize).div_ceil(pixels_per_byte);
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * (indices.len() / width as usize));

    for row in indices.chunks(width as usize) {
        for group in row.chunks(pixels_per_byte) {
            let mut byte = 0u8;
            for (i, &idx) in group.iter().enumerate() {
                byte |= (idx & mask) << ((8 - bits) - i as u8 * bits);
            }
            packed.push(byte);
        }
    }
    packed
}
