//! Piece sprites.
//! A `SpriteSet` is loaded once at startup and shared read-only by every render.
//! Loading is all-or-nothing: a missing or corrupt image for any of the 12
//! canonical symbols fails the whole load.
//! Sources: a directory of `{symbol}.png` files, an HTTP base URL, or any
//! closure that returns decoded images.

use crate::error::SpriteError;
use image::RgbaImage;
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// The 12 canonical piece symbols, black then white.
pub const PIECE_SYMBOLS: [char; 12] = ['r', 'n', 'b', 'q', 'k', 'p', 'R', 'N', 'B', 'Q', 'K', 'P'];

pub const DEFAULT_SPRITE_DIR: &str = "images";

const FETCH_TIMEOUT_SECS: u64 = 30;

/// Resolves a piece symbol to a decoded image.
pub trait SpriteProvider {
    fn load(&self, symbol: char) -> Result<RgbaImage, SpriteError>;
}

impl<F> SpriteProvider for F
where
    F: Fn(char) -> Result<RgbaImage, SpriteError>,
{
    fn load(&self, symbol: char) -> Result<RgbaImage, SpriteError> {
        self(symbol)
    }
}

/// Loads `{dir}/{symbol}.png`.
#[derive(Clone, Debug)]
pub struct DirProvider {
    dir: PathBuf,
}

impl DirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: char) -> PathBuf {
        self.dir.join(format!("{symbol}.png"))
    }
}

impl Default for DirProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SPRITE_DIR)
    }
}

impl SpriteProvider for DirProvider {
    fn load(&self, symbol: char) -> Result<RgbaImage, SpriteError> {
        let path = self.path_for(symbol);
        let bytes = std::fs::read(&path).map_err(|source| SpriteError::Missing {
            symbol,
            path: path.clone(),
            source,
        })?;
        decode(symbol, &bytes)
    }
}

fn decode(symbol: char, bytes: &[u8]) -> Result<RgbaImage, SpriteError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| SpriteError::Decode { symbol, source })
}

/// Immutable symbol -> sprite map covering all of [`PIECE_SYMBOLS`].
#[derive(Clone, Debug)]
pub struct SpriteSet {
    images: HashMap<char, RgbaImage>,
}

impl SpriteSet {
    /// Loads every canonical symbol from `provider`, stopping at the first failure.
    pub fn load<P: SpriteProvider + ?Sized>(provider: &P) -> Result<Self, SpriteError> {
        let mut images = HashMap::with_capacity(PIECE_SYMBOLS.len());
        for symbol in PIECE_SYMBOLS {
            images.insert(symbol, provider.load(symbol)?);
        }
        info!(count = images.len(), "loaded piece sprites");
        Ok(Self { images })
    }

    /// Builds a set from already-decoded images. Extra symbols are kept.
    pub fn from_images(images: HashMap<char, RgbaImage>) -> Result<Self, SpriteError> {
        if let Some(&symbol) = PIECE_SYMBOLS.iter().find(|s| !images.contains_key(*s)) {
            return Err(SpriteError::Incomplete { symbol });
        }
        Ok(Self { images })
    }

    pub fn get(&self, symbol: char) -> Option<&RgbaImage> {
        self.images.get(&symbol)
    }

    /// Warns about sprites that will not exactly cover a square. Returns how many.
    pub fn check_size(&self, square_size: u32) -> usize {
        let mut mismatched = 0;
        for symbol in PIECE_SYMBOLS {
            if let Some(img) = self.images.get(&symbol) {
                let (w, h) = img.dimensions();
                if w != square_size || h != square_size {
                    warn!(%symbol, width = w, height = h, square_size, "sprite size does not match square size");
                    mismatched += 1;
                }
            }
        }
        mismatched
    }
}

/// Loads sprites from `{dir}/{symbol}.png`.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<SpriteSet, SpriteError> {
    SpriteSet::load(&DirProvider::new(dir.as_ref()))
}

/// Fetches `{base_url}/{symbol}.png` for every canonical symbol.
pub async fn fetch_sprites(base_url: &str) -> Result<SpriteSet, SpriteError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(SpriteError::Client)?;

    let base = base_url.trim_end_matches('/');
    let mut images = HashMap::with_capacity(PIECE_SYMBOLS.len());
    for symbol in PIECE_SYMBOLS {
        let bytes = fetch_one(&client, &sprite_url(base, symbol))
            .await
            .map_err(|source| SpriteError::Fetch { symbol, source })?;
        images.insert(symbol, decode(symbol, &bytes)?);
    }
    info!(count = images.len(), url = base, "fetched piece sprites");
    SpriteSet::from_images(images)
}

fn sprite_url(base: &str, symbol: char) -> String {
    format!("{base}/{symbol}.png")
}

async fn fetch_one(client: &Client, url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}
