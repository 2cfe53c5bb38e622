//! Video container for sequences of cell grids.
//!
//! A stream is a header followed by one length-prefixed payload per frame,
//! in playback order. All integers are little-endian.
//!
//! ```text
//! magic "BPVD"  version u8 = 1  variant u8 (0 raw, 1 deflate, 2 ans)
//! width u16  height u16                    (cells)
//! palette_len u16  palette_len × (r, g, b)
//! frame_count u32
//! frame_count × (payload_len u32, payload)
//! ```
//!
//! Raw frames hold the glyph stream followed by the color stream. The
//! deflate and ans variants code frame 0 as is and every later frame as the
//! byte-wise XOR of its streams with the previous frame's, so decoding is
//! sequential. Deflate wraps both delta streams in one zlib stream; ans
//! codes glyphs and colors as two [`ans`] blobs with separate tables.

pub mod ans;
mod bytes;
mod codec;
mod stream;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use stream::{VideoEncoder, VideoHeader, VideoStream};

use crate::error::EngineError;

/// Container magic.
pub const MAGIC: &[u8; 4] = b"BPVD";

/// Container format version.
pub const FORMAT_VERSION: u8 = 1;

/// Frame payload coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecVariant {
    Raw,
    #[default]
    Deflate,
    Ans,
}

impl CodecVariant {
    pub const ALL: [CodecVariant; 3] = [CodecVariant::Raw, CodecVariant::Deflate, CodecVariant::Ans];

    pub fn as_str(self) -> &'static str {
        match self {
            CodecVariant::Raw => "raw",
            CodecVariant::Deflate => "deflate",
            CodecVariant::Ans => "ans",
        }
    }

    /// Header tag.
    pub fn tag(self) -> u8 {
        match self {
            CodecVariant::Raw => 0,
            CodecVariant::Deflate => 1,
            CodecVariant::Ans => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }

    /// Whether frames after the first are stored as deltas.
    pub fn uses_delta(self) -> bool {
        self != CodecVariant::Raw
    }
}

impl fmt::Display for CodecVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecVariant {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(CodecVariant::Raw),
            "deflate" => Ok(CodecVariant::Deflate),
            "ans" => Ok(CodecVariant::Ans),
            other => Err(EngineError::unsupported("codec variant", other)),
        }
    }
}
