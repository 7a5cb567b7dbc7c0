/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::attacks::{BISHOP_DIRS, KING_DIRS, KNIGHT_DIRS, ROOK_DIRS};
use super::moves::{Move, MoveList};
use super::piece::{Color, Piece, PieceKind};
use super::position::{CastlingRights, Cell, Position};
use super::square::{Square, RANK_2, RANK_7};

impl Position {
    /// Generates every pseudo-legal move for the side to move.
    ///
    /// Pseudo-legal means the geometry, occupancy, and castling-rights rules
    /// are all honored, but the mover's king may be left in check; the
    /// executor rejects those when the move is made.
    pub fn generate_all_moves(&self) -> MoveList {
        let mut list = MoveList::new();
        self.pawn_moves(&mut list, false);
        self.castling_moves(&mut list);
        self.piece_moves(&mut list, false);
        list
    }

    /// Generates only the pseudo-legal captures (en passant included), for
    /// quiescence search.
    pub fn generate_captures(&self) -> MoveList {
        let mut list = MoveList::new();
        self.pawn_moves(&mut list, true);
        self.piece_moves(&mut list, true);
        list
    }

    /// Returns `true` if `mv` is legal here.
    ///
    /// Used to validate cached best moves before walking a principal
    /// variation; the cache may hold a move from a colliding position.
    pub fn move_exists(&mut self, mv: Move) -> bool {
        for candidate in self.generate_all_moves() {
            if self.make_move(candidate) {
                self.undo_move();
                if candidate == mv {
                    return true;
                }
            }
        }
        false
    }

    fn pawn_moves(&self, list: &mut MoveList, captures_only: bool) {
        let us = self.side_to_move();
        let (pawn, forward, start_rank, promo_rank) = match us {
            Color::White => (Piece::WhitePawn, 10, RANK_2, RANK_7),
            Color::Black => (Piece::BlackPawn, -10, RANK_7, RANK_2),
        };

        for &from in self.piece_list(pawn) {
            let promoting = from.rank() == promo_rank;

            if !captures_only {
                let ahead = from.offset(forward);
                if self.squares[ahead.index()] == Cell::Empty {
                    push_pawn_moves(list, us, from, ahead, None, promoting);

                    let double = from.offset(forward * 2);
                    if from.rank() == start_rank && self.squares[double.index()] == Cell::Empty {
                        list.push(Move::new(from, double, None, None, Move::PAWN_START));
                    }
                }
            }

            for side_dir in [forward - 1, forward + 1] {
                let to = from.offset(side_dir);
                if let Cell::Occupied(victim) = self.squares[to.index()] {
                    if victim.color() != us {
                        push_pawn_moves(list, us, from, to, Some(victim), promoting);
                    }
                }
                if self.ep_square() == Some(to) {
                    list.push(Move::new(from, to, None, None, Move::EN_PASSANT));
                }
            }
        }
    }

    /// Knight, bishop, rook, queen, and king moves.
    fn piece_moves(&self, list: &mut MoveList, captures_only: bool) {
        let us = self.side_to_move();

        for (kind, dirs) in [
            (PieceKind::Knight, &KNIGHT_DIRS[..]),
            (PieceKind::King, &KING_DIRS[..]),
        ] {
            for &from in self.piece_list(Piece::new(us, kind)) {
                for &dir in dirs {
                    let to = from.offset(dir);
                    match self.squares[to.index()] {
                        Cell::Empty if !captures_only => {
                            list.push(Move::new(from, to, None, None, Move::QUIET));
                        }
                        Cell::Occupied(victim) if victim.color() != us => {
                            list.push(Move::new(from, to, Some(victim), None, Move::QUIET));
                        }
                        _ => {}
                    }
                }
            }
        }

        for (kind, dirs) in [
            (PieceKind::Bishop, &BISHOP_DIRS[..]),
            (PieceKind::Rook, &ROOK_DIRS[..]),
            (PieceKind::Queen, &KING_DIRS[..]),
        ] {
            for &from in self.piece_list(Piece::new(us, kind)) {
                for &dir in dirs {
                    let mut to = from.offset(dir);
                    loop {
                        match self.squares[to.index()] {
                            Cell::Offboard => break,
                            Cell::Occupied(victim) => {
                                if victim.color() != us {
                                    list.push(Move::new(from, to, Some(victim), None, Move::QUIET));
                                }
                                break;
                            }
                            Cell::Empty => {
                                if !captures_only {
                                    list.push(Move::new(from, to, None, None, Move::QUIET));
                                }
                                to = to.offset(dir);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Castling, gated on rights, empty squares between, and the king's
    /// start and transit squares being safe.
    ///
    /// The landing square is deliberately not checked here; the executor's
    /// legality check covers it like any other king move.
    fn castling_moves(&self, list: &mut MoveList) {
        let us = self.side_to_move();
        let them = us.opponent();

        let (kingside, queenside, rank) = match us {
            Color::White => (
                CastlingRights::WHITE_KINGSIDE,
                CastlingRights::WHITE_QUEENSIDE,
                0,
            ),
            Color::Black => (
                CastlingRights::BLACK_KINGSIDE,
                CastlingRights::BLACK_QUEENSIDE,
                7,
            ),
        };
        let home = |file| Square::new(file, rank);

        if self.castling_rights().contains(kingside)
            && self.squares[home(5).index()] == Cell::Empty
            && self.squares[home(6).index()] == Cell::Empty
            && !self.is_square_attacked(home(4), them)
            && !self.is_square_attacked(home(5), them)
        {
            list.push(Move::new(home(4), home(6), None, None, Move::CASTLE));
        }

        if self.castling_rights().contains(queenside)
            && self.squares[home(3).index()] == Cell::Empty
            && self.squares[home(2).index()] == Cell::Empty
            && self.squares[home(1).index()] == Cell::Empty
            && !self.is_square_attacked(home(4), them)
            && !self.is_square_attacked(home(3), them)
        {
            list.push(Move::new(home(4), home(2), None, None, Move::CASTLE));
        }
    }
}

/// Pushes one pawn move, fanned out to all four promotions on the last rank.
fn push_pawn_moves(
    list: &mut MoveList,
    us: Color,
    from: Square,
    to: Square,
    captured: Option<Piece>,
    promoting: bool,
) {
    if promoting {
        for kind in [
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
        ] {
            list.push(Move::new(
                from,
                to,
                captured,
                Some(Piece::new(us, kind)),
                Move::QUIET,
            ));
        }
    } else {
        list.push(Move::new(from, to, captured, None, Move::QUIET));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FEN_KIWIPETE;

    #[test]
    fn test_startpos_has_twenty_moves() {
        let moves = Position::default().generate_all_moves();
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().all(|mv| !mv.is_capture() && !mv.is_castle()));
        assert_eq!(moves.iter().filter(|mv| mv.is_pawn_start()).count(), 8);
    }

    #[test]
    fn test_kiwipete_move_counts() {
        let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let moves = pos.generate_all_moves();
        assert_eq!(moves.len(), 48);

        let captures = pos.generate_captures();
        assert!(captures
            .iter()
            .all(|mv| mv.is_capture() || mv.is_en_passant()));
        assert_eq!(captures.len(), 8);
    }

    #[test]
    fn test_castling_requires_safe_transit() {
        // White may castle both ways
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let castles: Vec<Move> = pos
            .generate_all_moves()
            .into_iter()
            .filter(|mv| mv.is_castle())
            .collect();
        assert_eq!(castles.len(), 2);

        // A rook eyeing f1 forbids kingside but not queenside
        let pos = Position::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castles: Vec<Move> = pos
            .generate_all_moves()
            .into_iter()
            .filter(|mv| mv.is_castle())
            .collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to(), Square::C1);
    }

    #[test]
    fn test_promotions_fan_out() {
        let pos = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let promotions: Vec<Move> = pos
            .generate_all_moves()
            .into_iter()
            .filter(|mv| mv.promoted().is_some())
            .collect();
        assert_eq!(promotions.len(), 4);
        assert!(promotions
            .iter()
            .any(|mv| mv.promoted() == Some(Piece::WhiteQueen)));
    }

    #[test]
    fn test_en_passant_generation() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let eps: Vec<Move> = pos
            .generate_all_moves()
            .into_iter()
            .filter(|mv| mv.is_en_passant())
            .collect();
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].to(), Square::from_algebraic("f6").unwrap());
    }
}
