//! Board compositor.
//! Paints the dark color over the whole buffer, then light squares, then
//! alpha-blends each piece sprite onto its square.
//! Sprites are not scaled; each is clipped to its square, so they are
//! expected to be `square_size` on each side.

use crate::error::ConfigError;
use crate::fen::Board;
use crate::sprites::SpriteSet;
use image::{GenericImageView, Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, warn};

pub const DEFAULT_SQUARE_SIZE: u32 = 45;

/// Largest square size whose board edge still fits the `i32` pixel coordinates of `Rect`.
pub const MAX_SQUARE_SIZE: u32 = i32::MAX as u32 / 8;

pub const DARK: Rgba<u8> = Rgba([77, 109, 146, 255]);
pub const LIGHT: Rgba<u8> = Rgba([236, 236, 215, 255]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    square_size: u32,
    board_size: u32,
}

impl BoardConfig {
    pub fn new(square_size: u32) -> Result<Self, ConfigError> {
        if square_size == 0 {
            return Err(ConfigError::ZeroSquareSize);
        }
        let board_size = square_size
            .checked_mul(8)
            .filter(|_| square_size <= MAX_SQUARE_SIZE)
            .ok_or(ConfigError::SquareSizeTooLarge(square_size))?;
        Ok(Self {
            square_size,
            board_size,
        })
    }

    pub fn square_size(&self) -> u32 {
        self.square_size
    }

    pub fn board_size(&self) -> u32 {
        self.board_size
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
            board_size: DEFAULT_SQUARE_SIZE * 8,
        }
    }
}

/// Color of the square at (`rank`, `file`); a1 is dark.
pub fn square_color(rank: usize, file: usize) -> Rgba<u8> {
    if (rank + file) % 2 == 1 { LIGHT } else { DARK }
}

/// Top-left pixel of the square. Rank 0 sits on the bottom edge of the image.
pub fn square_origin(config: &BoardConfig, rank: usize, file: usize) -> (u32, u32) {
    let s = config.square_size;
    let x = file as u32 * s;
    let y = config.board_size - rank as u32 * s - s;
    (x, y)
}

/// Renders `board` into a fresh `board_size` x `board_size` buffer.
pub fn render(config: &BoardConfig, board: &Board, sprites: &SpriteSet) -> RgbaImage {
    let s = config.square_size;
    let mut img = RgbaImage::from_pixel(config.board_size, config.board_size, DARK);

    for (r, rank) in board.ranks().enumerate() {
        for (f, cell) in rank.iter().enumerate() {
            let (x, y) = square_origin(config, r, f);
            let rect = Rect::at(x as i32, y as i32).of_size(s, s);
            debug!(rank = r, file = f, ?rect, "square");

            if (r + f) % 2 == 1 {
                draw_filled_rect_mut(&mut img, rect, LIGHT);
            }

            if let Some(symbol) = cell.piece() {
                match sprites.get(symbol) {
                    Some(sprite) => {
                        let (w, h) = sprite.dimensions();
                        let clipped = sprite.view(0, 0, w.min(s), h.min(s));
                        imageops::overlay(&mut img, &*clipped, x as i64, y as i64);
                    }
                    None => warn!(%symbol, rank = r, file = f, "no sprite for piece, leaving square bare"),
                }
            }
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;
    use crate::sprites::testing::{solid_sprites, sprite_color};

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    /// Alpha blending goes through f32, so allow off-by-one per channel.
    fn assert_close(actual: Rgba<u8>, expected: Rgba<u8>) {
        let close = actual.0.iter().zip(expected.0.iter()).all(|(a, e)| a.abs_diff(*e) <= 1);
        assert!(close, "pixel {actual:?} != {expected:?}");
    }

    /// Center pixel of a square.
    fn center(img: &RgbaImage, config: &BoardConfig, rank: usize, file: usize) -> Rgba<u8> {
        let (x, y) = square_origin(config, rank, file);
        let half = config.square_size() / 2;
        *img.get_pixel(x + half, y + half)
    }

    #[test]
    fn test_board_config() {
        let config = BoardConfig::new(45).unwrap();
        assert_eq!(config.square_size(), 45);
        assert_eq!(config.board_size(), 360);
        assert_eq!(BoardConfig::default(), config);
        assert!(matches!(BoardConfig::new(0), Err(ConfigError::ZeroSquareSize)));
    }

    #[test]
    fn test_board_config_rejects_oversized_squares() {
        let max = BoardConfig::new(MAX_SQUARE_SIZE).unwrap();
        assert_eq!(max.board_size(), MAX_SQUARE_SIZE * 8);
        assert!(max.board_size() <= i32::MAX as u32);

        for size in [MAX_SQUARE_SIZE + 1, u32::MAX / 4, u32::MAX] {
            assert!(matches!(
                BoardConfig::new(size),
                Err(ConfigError::SquareSizeTooLarge(n)) if n == size
            ));
        }
    }

    #[test]
    fn test_oversized_sprite_is_clipped_to_its_square() {
        let config = BoardConfig::new(4).unwrap();
        let red = Rgba([255, 0, 0, 255]);
        let provider = |_: char| -> Result<RgbaImage, crate::error::SpriteError> {
            Ok(RgbaImage::from_pixel(8, 8, red))
        };
        let sprites = SpriteSet::load(&provider).unwrap();
        // rook on a2; its 8x8 sprite would spill onto a1 and b2
        let board = fen::parse("8/8/8/8/8/8/R7/8").unwrap();
        let img = render(&config, &board, &sprites);

        assert_close(center(&img, &config, 1, 0), red);
        assert_eq!(center(&img, &config, 0, 0), DARK);
        assert_eq!(center(&img, &config, 1, 1), square_color(1, 1));
        assert_eq!(center(&img, &config, 0, 1), LIGHT);
    }

    #[test]
    fn test_square_origin_flips_ranks() {
        let config = BoardConfig::new(10).unwrap();
        assert_eq!(square_origin(&config, 0, 0), (0, 70));
        assert_eq!(square_origin(&config, 7, 0), (0, 0));
        assert_eq!(square_origin(&config, 0, 7), (70, 70));
        assert_eq!(square_origin(&config, 3, 2), (20, 40));
    }

    #[test]
    fn test_square_parity() {
        assert_eq!(square_color(0, 0), DARK);
        assert_eq!(square_color(0, 1), LIGHT);
        assert_eq!(square_color(1, 0), LIGHT);
        assert_eq!(square_color(7, 7), DARK);
    }

    #[test]
    fn test_empty_board_checkerboard() {
        let config = BoardConfig::new(8).unwrap();
        let sprites = solid_sprites(8);
        let board = fen::parse("8/8/8/8/8/8/8/8").unwrap();
        let img = render(&config, &board, &sprites);

        for r in 0..8 {
            for f in 0..8 {
                assert_eq!(center(&img, &config, r, f), square_color(r, f), "rank {r} file {f}");
            }
        }
        // bottom-left image pixel is a1, which is dark
        assert_eq!(*img.get_pixel(0, 63), DARK);
        assert_eq!(*img.get_pixel(8, 63), LIGHT);
    }

    #[test]
    fn test_sprite_transparency_shows_square() {
        let config = BoardConfig::new(10).unwrap();
        let sprites = solid_sprites(10);
        let board = fen::parse(START).unwrap();
        let img = render(&config, &board, &sprites);

        // a1 holds 'R': opaque center, transparent corner over a dark square
        let (x, y) = square_origin(&config, 0, 0);
        assert_close(*img.get_pixel(x + 5, y + 5), sprite_color('R'));
        assert_close(*img.get_pixel(x, y), DARK);

        // b1 holds 'N' on a light square
        let (x, y) = square_origin(&config, 0, 1);
        assert_close(*img.get_pixel(x, y), LIGHT);
        assert_close(*img.get_pixel(x + 5, y + 5), sprite_color('N'));

        // a8 holds 'r' at the top of the image
        assert_close(center(&img, &config, 7, 0), sprite_color('r'));

        // empty e4 keeps its square color
        assert_eq!(center(&img, &config, 3, 4), square_color(3, 4));
    }

    #[test]
    fn test_example_fen_size() {
        let config = BoardConfig::default();
        let sprites = solid_sprites(config.square_size());
        let board = fen::parse("rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R").unwrap();
        let img = render(&config, &board, &sprites);
        assert_eq!(img.dimensions(), (360, 360));
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = BoardConfig::new(12).unwrap();
        let sprites = solid_sprites(12);
        let board = fen::parse(START).unwrap();
        let a = render(&config, &board, &sprites);
        let b = render(&config, &board, &sprites);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_unknown_symbol_leaves_square_bare() {
        let config = BoardConfig::new(6).unwrap();
        let sprites = solid_sprites(6);
        let board = fen::parse("x7/8/8/8/8/8/8/8").unwrap();
        let img = render(&config, &board, &sprites);
        assert_eq!(center(&img, &config, 7, 0), square_color(7, 0));
    }
}
