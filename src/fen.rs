//! FEN parser.
//! Reads only the piece-placement field; side to move, castling, en passant and
//! the move counters are accepted but ignored.
//! Any non-digit char is taken as a piece, so symbol legality is left to the
//! sprite lookup.

use crate::error::ParseError;
use std::fmt;

/// One square of the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Piece(char),
}

impl Cell {
    pub fn piece(self) -> Option<char> {
        match self {
            Cell::Empty => None,
            Cell::Piece(c) => Some(c),
        }
    }
}

/// 8x8 grid, `ranks[0]` is rank 1 (bottom), `ranks[7]` is rank 8 (top).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    ranks: [[Cell; 8]; 8],
}

impl Board {
    /// `rank` and `file` are 0-based, bottom-left origin. Panics if either is >= 8.
    pub fn cell(&self, rank: usize, file: usize) -> Cell {
        self.ranks[rank][file]
    }

    /// Ranks bottom-up.
    pub fn ranks(&self) -> impl Iterator<Item = &[Cell; 8]> {
        self.ranks.iter()
    }

    /// Occupied squares as `(rank, file, symbol)`.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.ranks.iter().enumerate().flat_map(|(r, rank)| {
            rank.iter()
                .enumerate()
                .filter_map(move |(f, cell)| cell.piece().map(|c| (r, f, c)))
        })
    }
}

impl fmt::Display for Board {
    /// Top rank first, `_` for empty squares.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in self.ranks.iter().rev() {
            let line: Vec<String> = rank
                .iter()
                .map(|cell| cell.piece().unwrap_or('_').to_string())
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Parses the placement field of `fen` into a [`Board`].
pub fn parse(fen: &str) -> Result<Board, ParseError> {
    // Literal split on ' ', so a leading space yields an empty placement field.
    let placement = fen.split(' ').next().unwrap_or("");

    let segments: Vec<&str> = if placement.is_empty() {
        Vec::new()
    } else {
        placement.split('/').collect()
    };
    if segments.len() != 8 {
        return Err(ParseError::BadRankCount {
            found: segments.len(),
        });
    }

    let mut ranks = [[Cell::Empty; 8]; 8];
    for (i, segment) in segments.iter().enumerate() {
        ranks[7 - i] = parse_rank(segment).map_err(|len| ParseError::BadRankLength {
            rank: 8 - i,
            len,
        })?;
    }

    Ok(Board { ranks })
}

/// Expands one rank; on failure returns the expanded length.
fn parse_rank(segment: &str) -> Result<[Cell; 8], usize> {
    let mut rank = [Cell::Empty; 8];
    let mut len = 0usize;

    for c in segment.chars() {
        match c.to_digit(10) {
            // '0' adds nothing and falls through to the length check
            Some(n) => {
                for _ in 0..n {
                    if len < 8 {
                        rank[len] = Cell::Empty;
                    }
                    len += 1;
                }
            }
            None => {
                if len < 8 {
                    rank[len] = Cell::Piece(c);
                }
                len += 1;
            }
        }
    }

    if len == 8 { Ok(rank) } else { Err(len) }
}
