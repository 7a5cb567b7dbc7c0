/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::piece::{Color, Piece};
use super::position::{Cell, Position};
use super::square::Square;

/// Mailbox offsets for knight jumps.
pub(crate) const KNIGHT_DIRS: [i32; 8] = [-8, -19, -21, -12, 8, 19, 21, 12];

/// Mailbox offsets for rook (and half of queen) rays.
pub(crate) const ROOK_DIRS: [i32; 4] = [-1, -10, 1, 10];

/// Mailbox offsets for bishop (and half of queen) rays.
pub(crate) const BISHOP_DIRS: [i32; 4] = [-9, -11, 11, 9];

/// Mailbox offsets for king steps.
pub(crate) const KING_DIRS: [i32; 8] = [-1, -10, 1, 10, -9, -11, 11, 9];

impl Position {
    /// Returns `true` if `by` attacks `square`.
    ///
    /// Checks jumpers by direct offset and sliders by walking rays until the
    /// first occupied or off-board cell; the border sentinels make explicit
    /// bounds checks unnecessary.
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        // Pawns attack diagonally toward the enemy
        let (pawn, pawn_dirs) = match by {
            Color::White => (Piece::WhitePawn, [-9, -11]),
            Color::Black => (Piece::BlackPawn, [9, 11]),
        };
        for dir in pawn_dirs {
            if self.piece_at_cell(square.offset(dir)) == Some(pawn) {
                return true;
            }
        }

        for dir in KNIGHT_DIRS {
            if let Some(piece) = self.piece_at_cell(square.offset(dir)) {
                if piece.is_knight() && piece.color() == by {
                    return true;
                }
            }
        }

        for dir in ROOK_DIRS {
            let mut target = square.offset(dir);
            loop {
                match self.squares[target.index()] {
                    Cell::Offboard => break,
                    Cell::Occupied(piece) => {
                        if piece.is_rook_or_queen() && piece.color() == by {
                            return true;
                        }
                        break;
                    }
                    Cell::Empty => target = target.offset(dir),
                }
            }
        }

        for dir in BISHOP_DIRS {
            let mut target = square.offset(dir);
            loop {
                match self.squares[target.index()] {
                    Cell::Offboard => break,
                    Cell::Occupied(piece) => {
                        if piece.is_bishop_or_queen() && piece.color() == by {
                            return true;
                        }
                        break;
                    }
                    Cell::Empty => target = target.offset(dir),
                }
            }
        }

        for dir in KING_DIRS {
            if let Some(piece) = self.piece_at_cell(square.offset(dir)) {
                if piece.is_king() && piece.color() == by {
                    return true;
                }
            }
        }

        false
    }

    /// Like [`Position::piece_at`], but safe to call on border cells.
    #[inline(always)]
    fn piece_at_cell(&self, square: Square) -> Option<Piece> {
        match self.squares[square.index()] {
            Cell::Occupied(piece) => Some(piece),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_attacks() {
        let pos = Position::default();

        // e2 pawn and g1 knight both cover f3
        let f3 = Square::from_algebraic("f3").unwrap();
        assert!(pos.is_square_attacked(f3, Color::White));
        assert!(!pos.is_square_attacked(f3, Color::Black));

        // Nothing reaches the middle of the board yet
        let e4 = Square::from_algebraic("e4").unwrap();
        assert!(!pos.is_square_attacked(e4, Color::White));
        assert!(!pos.is_square_attacked(e4, Color::Black));
    }

    #[test]
    fn test_slider_attacks_stop_at_blockers() {
        let pos = Position::from_fen("4k3/8/8/8/1R2p3/8/8/4K3 w - - 0 1").unwrap();
        let rank4 = |file| Square::new(file, 3);

        // The rook on b4 sweeps the rank up to and including the e4 pawn
        for file in [2, 3, 4] {
            assert!(pos.is_square_attacked(rank4(file), Color::White));
        }
        assert!(!pos.is_square_attacked(rank4(5), Color::White));

        // Vertically it runs the whole file
        assert!(pos.is_square_attacked(Square::from_algebraic("b8").unwrap(), Color::White));
    }

    #[test]
    fn test_pawn_and_king_attacks() {
        let pos = Position::from_fen("4k3/8/8/3p4/8/8/8/4K3 b - - 0 1").unwrap();

        // Black pawn on d5 attacks c4 and e4, not d4
        assert!(pos.is_square_attacked(Square::from_algebraic("c4").unwrap(), Color::Black));
        assert!(pos.is_square_attacked(Square::from_algebraic("e4").unwrap(), Color::Black));
        assert!(!pos.is_square_attacked(Square::from_algebraic("d4").unwrap(), Color::Black));

        // Kings attack their ring
        assert!(pos.is_square_attacked(Square::from_algebraic("d1").unwrap(), Color::White));
        assert!(pos.is_square_attacked(Square::from_algebraic("f2").unwrap(), Color::White));
        assert!(!pos.is_square_attacked(Square::from_algebraic("g3").unwrap(), Color::White));
    }
}
