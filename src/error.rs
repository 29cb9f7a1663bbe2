//! Error types shared by the parser, sprite loader, encoder and config layer.
//! The binary wraps these in `anyhow` with context; the HTTP handler returns
//! `ParseError`'s message verbatim as the 400 body.

use std::path::PathBuf;
use thiserror::Error;

/// FEN piece-placement syntax errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Placement field did not split into exactly 8 `/`-separated ranks.
    #[error("bad fen: expected 8 ranks, found {found}")]
    BadRankCount { found: usize },

    /// A rank did not expand to exactly 8 squares. `rank` is the chess rank (8 = top).
    #[error("bad fen: rank {rank} has {len} squares, expected 8")]
    BadRankLength { rank: usize, len: usize },
}

/// Failure to produce a complete sprite set. Always fatal at startup.
#[derive(Error, Debug)]
pub enum SpriteError {
    #[error("could not open sprite for '{symbol}' at {}", path.display())]
    Missing {
        symbol: char,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode sprite for '{symbol}'")]
    Decode {
        symbol: char,
        #[source]
        source: image::ImageError,
    },

    #[error("could not fetch sprite for '{symbol}'")]
    Fetch {
        symbol: char,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not build http client for sprite fetch")]
    Client(#[source] reqwest::Error),

    #[error("sprite set has no image for '{symbol}'")]
    Incomplete { symbol: char },
}

/// Output encoding failed; propagated to the caller, never retried.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("writing image failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("square size must be positive")]
    ZeroSquareSize,

    #[error("square size {0} is too large (max {max})", max = crate::render::MAX_SQUARE_SIZE)]
    SquareSizeTooLarge(u32),

    #[error("jpeg quality must be between 1 and 100, got {0}")]
    BadQuality(u8),

    #[error("unknown output format '{0}' (expected jpeg or png)")]
    UnknownFormat(String),

    #[error("could not read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
