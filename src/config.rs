//! Config module.
//! Reads an optional JSON config file (square size, sprite source, output format, bind address).
//! Uses serde; every field has a default so a partial or missing file is fine.
//! CLI flags are applied on top by the binary.

use crate::encode::{DEFAULT_JPEG_QUALITY, OutputFormat};
use crate::error::ConfigError;
use crate::render::{BoardConfig, DEFAULT_SQUARE_SIZE};
use crate::sprites::DEFAULT_SPRITE_DIR;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub square_size: u32,
    pub sprite_dir: PathBuf,
    /// Base URL to fetch sprites from; takes precedence over `sprite_dir`.
    pub sprite_url: Option<String>,
    /// `jpeg` or `png`
    pub format: String,
    pub quality: u8,
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
            sprite_dir: PathBuf::from(DEFAULT_SPRITE_DIR),
            sprite_url: None,
            format: "jpeg".to_string(),
            quality: DEFAULT_JPEG_QUALITY,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn board_config(&self) -> Result<BoardConfig, ConfigError> {
        BoardConfig::new(self.square_size)
    }

    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        match self.format.parse::<OutputFormat>()? {
            OutputFormat::Jpeg { .. } => OutputFormat::jpeg(self.quality),
            OutputFormat::Png => Ok(OutputFormat::Png),
        }
    }
}
