use std::path::Path;

use blit_engine::{CodecVariant, DitherPolicy, ReducerKind, TableOptions, DEFAULT_PALETTE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Conversion settings loaded from a YAML file.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Target palette size for the reducer
    pub palette_size: usize,

    pub reducer: ReducerKind,

    pub dither: DitherPolicy,

    /// Reduce the palette in Lab space instead of RGB
    pub lab: bool,

    /// Flags for the table exporter
    pub table: TableOptions,

    /// Frame coding for video output
    pub codec: CodecVariant,

    /// Accelerator selector: a device id, `best_flops` or `best_memory`.
    /// Unset runs sequentially.
    pub device: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            palette_size: DEFAULT_PALETTE_SIZE,
            reducer: ReducerKind::default(),
            dither: DitherPolicy::default(),
            lab: false,
            table: TableOptions::default(),
            codec: CodecVariant::default(),
            device: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file. A missing or invalid file is an
    /// error: the caller asked for it explicitly.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_yaml(&content).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::info!(
            path = %path.display(),
            palette_size = config.palette_size,
            reducer = %config.reducer,
            dither = %config.dither,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
