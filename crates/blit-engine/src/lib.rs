#![allow(
    clippy::excessive_precision,
    clippy::needless_range_loop,
    clippy::module_inception,
    clippy::manual_range_contains
)]

//! blit-engine: images and videos as 16-color character-cell grids
//!
//! The engine turns RGB images into grids of block glyphs for terminals
//! that draw each character cell as a 2×3 grid of sub-pixels in one of two
//! colors, and serializes those grids as text, scripts, raw dumps or a
//! compact video container.
//!
//! # Quick Start
//!
//! ```
//! use blit_engine::{
//!     encode_cells, make_table, quantize, reduce, DitherPolicy, ExecutionContext, Image,
//!     Pixel, ReducerKind, TableOptions,
//! };
//!
//! let mut image = Image::new(4, 6).unwrap();
//! for y in 0..6 {
//!     for x in 0..4 {
//!         let v = (x * 60 + y * 20) as u8;
//!         image.set(x, y, Pixel::new(v, v / 2, 255 - v)).unwrap();
//!     }
//! }
//!
//! let ctx = ExecutionContext::sequential();
//! let palette = reduce(&image, 4, ReducerKind::MedianCut, &ctx).unwrap();
//! let indexed = quantize(&image, &palette, DitherPolicy::FloydSteinberg, &ctx);
//! let grid = encode_cells(&indexed, &palette, &ctx).unwrap();
//! assert_eq!((grid.width(), grid.height()), (2, 2));
//!
//! let table = make_table(&grid, &TableOptions::new().escape(true)).unwrap();
//! assert!(table.starts_with(b"{\n"));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! bytes ──PixelFormat──▶ Image ──reduce──▶ Palette
//!                          │                  │
//!                          └──quantize────────┴──▶ IndexedImage
//!                                                      │
//!                                         encode_cells ▼
//!                                                  CellGrid ──▶ exporters
//!                                                      │
//!                                          VideoStream ▼ ──▶ BPVD container
//! ```
//!
//! # Color Distance
//!
//! Every nearest-color decision (palette lookup, k-means assignment, cell
//! pair selection) uses squared Euclidean distance in CIE Lab under D65.
//! Error diffusion adds its error in 8-bit RGB, where the channel sums are
//! conserved.
//!
//! # Execution
//!
//! Per-row and per-frame work runs through an [`ExecutionContext`]. The
//! default context is sequential; [`ExecutionContext::init`] builds a
//! thread pool and reports through [`AcceleratorStatus`] when it falls back.
//! The choice never changes output bytes.

pub mod cell;
pub mod color;
pub mod dither;
pub mod error;
pub mod exec;
pub mod export;
pub mod image;
pub mod palette;
pub mod reduce;
pub mod video;


pub use cell::{encode_cells, Cell, CellEncoder, CellGrid};
pub use color::{convert_lab_palette, lab_image, make_lab_image, Lab, Pixel};
pub use dither::{quantize, to_indexed, DitherPolicy};
pub use error::{EngineError, ErrorKind, Result};
pub use exec::{available_devices, AcceleratorStatus, DeviceInfo, DeviceSelector, ExecutionContext};
pub use export::{make_paint, make_raw, make_script, make_table, TableOptions};
pub use image::{Image, IndexedImage, PixelFormat};
pub use palette::{Palette, MAX_COLORS};
pub use reduce::{kmeans_lab, reduce, reduce_lab, ReducerKind, DEFAULT_PALETTE_SIZE};
pub use video::{CodecVariant, VideoEncoder, VideoHeader, VideoStream};
