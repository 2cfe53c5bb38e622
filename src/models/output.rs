use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What `convert` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lua blit-image table
    #[default]
    Table,
    /// Paint-program text grid
    Paint,
    /// Runnable Lua display script
    Script,
    /// Binary dump of the cell streams
    Raw,
    /// The cell grid as JSON
    Json,
    /// Single-frame video container
    Video,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Table => "bimg",
            OutputFormat::Paint => "nfp",
            OutputFormat::Script => "lua",
            OutputFormat::Raw => "bin",
            OutputFormat::Json => "json",
            OutputFormat::Video => "bpv",
        }
    }

    /// Pick the format matching a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::value_variants()
            .iter()
            .copied()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Paint => "paint",
            OutputFormat::Script => "script",
            OutputFormat::Raw => "raw",
            OutputFormat::Json => "json",
            OutputFormat::Video => "video",
        };
        f.write_str(name)
    }
}
