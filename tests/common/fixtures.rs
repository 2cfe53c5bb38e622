//! Test images and files.

use std::path::{Path, PathBuf};

use blit_engine::{Image, Pixel};

/// Colors used by the fixtures
pub mod colors {
    use blit_engine::Pixel;

    pub const RED: Pixel = Pixel::new(220, 40, 40);
    pub const NAVY: Pixel = Pixel::new(20, 20, 90);
    pub const LIME: Pixel = Pixel::new(60, 200, 60);
}

/// Two-color checkerboard whose squares are 2×3 sub-pixels, so every cell
/// is solid.
pub fn checker(width: usize, height: usize) -> Image {
    let pixels = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            if (x / 2 + y / 3) % 2 == 0 {
                colors::RED
            } else {
                colors::NAVY
            }
        })
        .collect();
    Image::from_pixels(width, height, pixels).unwrap()
}

/// Horizontal red-to-blue ramp.
pub fn gradient(width: usize, height: usize) -> Image {
    let pixels = (0..width * height)
        .map(|i| {
            let x = i % width;
            let t = (x * 255 / (width - 1).max(1)) as u8;
            Pixel::new(255 - t, 30, t)
        })
        .collect();
    Image::from_pixels(width, height, pixels).unwrap()
}

/// `base` with a `size`-pixel lime square at (`x`, `y`).
pub fn with_square(base: &Image, x: usize, y: usize, size: usize) -> Image {
    let mut image = base.clone();
    for dy in 0..size {
        for dx in 0..size {
            if x + dx < image.width() && y + dy < image.height() {
                image.set(x + dx, y + dy, colors::LIME).unwrap();
            }
        }
    }
    image
}

/// Encode `image` as an 8-bit RGB PNG.
pub fn png_bytes(image: &Image) -> Vec<u8> {
    let data: Vec<u8> = image.pixels().iter().flat_map(|p| p.to_array()).collect();
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width() as u32, image.height() as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&data).unwrap();
    }
    buf
}

/// Write `image` as `dir/name`.
pub fn write_png(dir: &Path, name: &str, image: &Image) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(image)).unwrap();
    path
}

/// Write a YAML config as `dir/blitpix.yaml`.
pub fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("blitpix.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}
