use std::path::PathBuf;

use blit_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("PNG decode error: {0}")]
    PngDecode(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    FrameSize {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("No input frames")]
    NoFrames,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
