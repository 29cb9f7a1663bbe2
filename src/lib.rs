//! Renders chess positions given as FEN into board images.
//!
//! `fen::parse` turns the placement field into a [`Board`], `render::render`
//! composites it with a [`SpriteSet`] into an RGBA buffer, and `encode` writes
//! that out as JPEG or PNG. `server` wraps the same pipeline in an HTTP route.

pub mod config;
pub mod encode;
pub mod error;
pub mod fen;
pub mod render;
pub mod server;
pub mod sprites;

pub use encode::OutputFormat;
pub use error::{ConfigError, EncodeError, ParseError, SpriteError};
pub use fen::{Board, Cell};
pub use render::BoardConfig;
pub use sprites::{SpriteProvider, SpriteSet};
