pub mod png_io;

pub use png_io::{decode_png, encode_preview, load_png};
