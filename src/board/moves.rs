/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{anyhow, Result};
use arrayvec::ArrayVec;

use super::piece::Piece;
use super::position::Position;
use super::square::Square;

/// Upper bound on moves in any reachable position.
pub const MAX_NUM_MOVES: usize = 256;

/// A list of moves, allocated in place.
pub type MoveList = ArrayVec<Move, MAX_NUM_MOVES>;

/// A move, packed into a `u32`.
///
/// ```text
/// 0000 0000 0000 0000 0000 0111 1111 -> from square (7 bits, mailbox index)
/// 0000 0000 0000 0011 1111 1000 0000 -> to square (7 bits, mailbox index)
/// 0000 0000 0011 1100 0000 0000 0000 -> captured piece (4 bits, 0 = none)
/// 0000 0000 0100 0000 0000 0000 0000 -> en passant capture
/// 0000 0000 1000 0000 0000 0000 0000 -> double pawn push
/// 0000 1111 0000 0000 0000 0000 0000 -> promoted piece (4 bits, 0 = none)
/// 0001 0000 0000 0000 0000 0000 0000 -> castle
/// ```
/// Accessors are pure bit extraction; pieces are stored as `index + 1` so
/// that 0 can mean "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Move(u32);

impl Move {
    const TO_SHIFT: u32 = 7;
    const CAPTURED_SHIFT: u32 = 14;
    const PROMOTED_SHIFT: u32 = 20;
    const SQUARE_MASK: u32 = 0x7F;
    const PIECE_MASK: u32 = 0xF;

    /// No special behavior.
    pub const QUIET: u32 = 0;

    /// This move captures a pawn en passant.
    pub const EN_PASSANT: u32 = 1 << 18;

    /// This move is a double pawn push (creates an en passant square).
    pub const PAWN_START: u32 = 1 << 19;

    /// This move is a castle (also relocates a rook).
    pub const CASTLE: u32 = 1 << 24;

    /// Packs a move. `flags` is a union of the flag constants above.
    #[inline(always)]
    pub const fn new(
        from: Square,
        to: Square,
        captured: Option<Piece>,
        promoted: Option<Piece>,
        flags: u32,
    ) -> Self {
        Self(
            from.index() as u32
                | (to.index() as u32) << Self::TO_SHIFT
                | encode_piece(captured) << Self::CAPTURED_SHIFT
                | encode_piece(promoted) << Self::PROMOTED_SHIFT
                | flags,
        )
    }

    #[inline(always)]
    pub const fn from(self) -> Square {
        Square::from_index((self.0 & Self::SQUARE_MASK) as usize)
    }

    #[inline(always)]
    pub const fn to(self) -> Square {
        Square::from_index((self.0 >> Self::TO_SHIFT & Self::SQUARE_MASK) as usize)
    }

    /// The piece captured on the destination square, if any.
    ///
    /// En passant captures report `None` here; the victim square is not the
    /// destination, and the executor recovers the pawn from the flag alone.
    #[inline(always)]
    pub const fn captured(self) -> Option<Piece> {
        decode_piece(self.0 >> Self::CAPTURED_SHIFT & Self::PIECE_MASK)
    }

    #[inline(always)]
    pub const fn promoted(self) -> Option<Piece> {
        decode_piece(self.0 >> Self::PROMOTED_SHIFT & Self::PIECE_MASK)
    }

    #[inline(always)]
    pub const fn is_en_passant(self) -> bool {
        self.0 & Self::EN_PASSANT != 0
    }

    #[inline(always)]
    pub const fn is_pawn_start(self) -> bool {
        self.0 & Self::PAWN_START != 0
    }

    #[inline(always)]
    pub const fn is_castle(self) -> bool {
        self.0 & Self::CASTLE != 0
    }

    /// Returns `true` if a piece on the destination square is captured.
    #[inline(always)]
    pub const fn is_capture(self) -> bool {
        self.0 >> Self::CAPTURED_SHIFT & Self::PIECE_MASK != 0
    }

    /// Resolves a coordinate-notation string (`e2e4`, `e7e8q`) against the
    /// moves available in `position`.
    ///
    /// Matching against generated moves means the result always carries the
    /// correct capture/flag information, and malformed or impossible strings
    /// simply fail to resolve.
    pub fn from_uci(position: &Position, s: &str) -> Result<Self> {
        if s.len() < 4 || s.len() > 5 {
            return Err(anyhow!("invalid move string {s:?}"));
        }

        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = s.chars().nth(4);

        position
            .generate_all_moves()
            .into_iter()
            .find(|mv| {
                mv.from() == from
                    && mv.to() == to
                    && promotion == mv.promoted().map(|p| p.to_char().to_ascii_lowercase())
            })
            .ok_or_else(|| anyhow!("move {s:?} is not possible in this position"))
    }
}

impl fmt::Display for Move {
    /// Coordinate notation: source square, destination square, and a
    /// lowercase piece character when promoting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promoted) = self.promoted() {
            write!(f, "{}", promoted.to_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

#[inline(always)]
const fn encode_piece(piece: Option<Piece>) -> u32 {
    match piece {
        Some(piece) => piece.index() as u32 + 1,
        None => 0,
    }
}

#[inline(always)]
const fn decode_piece(bits: u32) -> Option<Piece> {
    if bits == 0 {
        None
    } else {
        Some(Piece::from_index(bits as usize - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::piece::{Color, PieceKind};

    #[test]
    fn test_packing_round_trip() {
        for from in [Square::A1, Square::E1, Square::H8] {
            for captured in [None, Some(Piece::BlackQueen), Some(Piece::WhitePawn)] {
                for promoted in [None, Some(Piece::WhiteQueen), Some(Piece::BlackKnight)] {
                    let to = from.offset(10);
                    let mv = Move::new(from, to, captured, promoted, Move::QUIET);
                    assert_eq!(mv.from(), from);
                    assert_eq!(mv.to(), to);
                    assert_eq!(mv.captured(), captured);
                    assert_eq!(mv.promoted(), promoted);
                    assert_eq!(mv.is_capture(), captured.is_some());
                    assert!(!mv.is_castle());
                    assert!(!mv.is_en_passant());
                }
            }
        }
    }

    #[test]
    fn test_flags_are_independent() {
        let ep = Move::new(Square::E1.offset(30), Square::D1.offset(40), None, None, Move::EN_PASSANT);
        assert!(ep.is_en_passant());
        assert!(!ep.is_pawn_start());
        assert!(!ep.is_capture(), "en passant does not capture on the destination");

        let castle = Move::new(Square::E1, Square::G1, None, None, Move::CASTLE);
        assert!(castle.is_castle());
        assert!(!castle.is_en_passant());
    }

    #[test]
    fn test_display() {
        let quiet = Move::new(Square::new(4, 1), Square::new(4, 3), None, None, Move::PAWN_START);
        assert_eq!(quiet.to_string(), "e2e4");

        let promo = Move::new(
            Square::new(0, 6),
            Square::new(0, 7),
            None,
            Some(Piece::new(Color::White, PieceKind::Queen)),
            Move::QUIET,
        );
        assert_eq!(promo.to_string(), "a7a8q");
    }
}
