/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::board::{
    Color, Piece, PieceKind, Position, Square, FILE_MASKS, ISOLATED_MASKS, PASSED_MASKS,
};
use crate::psqt;
use crate::score::Score;

const PAWN_ISOLATED: i32 = -10;

/// Passed-pawn bonus by the pawn's rank, from its own side's point of view.
const PAWN_PASSED: [i32; 8] = [0, 5, 10, 20, 35, 60, 100, 200];

const ROOK_OPEN_FILE: i32 = 10;
const ROOK_SEMI_OPEN_FILE: i32 = 5;
const QUEEN_OPEN_FILE: i32 = 5;
const QUEEN_SEMI_OPEN_FILE: i32 = 3;
const BISHOP_PAIR: i32 = 30;

/// Below this much enemy material (king included), the king switches to the
/// endgame table. One rook, two minors, and two pawns.
const ENDGAME_MATERIAL: i32 = 50_000 + 550 + 2 * 325 + 2 * 100;

/// Static evaluation of a single position.
///
/// Material, piece-square tables, pawn structure, file control for the heavy
/// pieces, and the bishop pair. The result is from the side to move's point
/// of view, which is what a negamax search consumes.
pub struct Evaluator<'a> {
    position: &'a Position,
}

impl<'a> Evaluator<'a> {
    #[inline(always)]
    pub const fn new(position: &'a Position) -> Self {
        Self { position }
    }

    pub fn eval(self) -> Score {
        let pos = self.position;

        // Insufficient mating material is a hard draw regardless of the terms
        // below, but only when no pawns can upset the balance
        if pos.pawns(Color::White).is_empty()
            && pos.pawns(Color::Black).is_empty()
            && self.is_material_draw()
        {
            return Score::DRAW;
        }

        let mut score = pos.material(Color::White) - pos.material(Color::Black);

        score += self.pawn_term(Color::White);
        score -= self.pawn_term(Color::Black);

        for (piece, table) in [
            (Piece::WhiteKnight, &psqt::KNIGHT_TABLE),
            (Piece::WhiteBishop, &psqt::BISHOP_TABLE),
            (Piece::WhiteRook, &psqt::ROOK_TABLE),
        ] {
            for &sq in pos.piece_list(piece) {
                score += table[sq.to64()];
            }
        }
        for (piece, table) in [
            (Piece::BlackKnight, &psqt::KNIGHT_TABLE),
            (Piece::BlackBishop, &psqt::BISHOP_TABLE),
            (Piece::BlackRook, &psqt::ROOK_TABLE),
        ] {
            for &sq in pos.piece_list(piece) {
                score -= table[mirror(sq)];
            }
        }

        score += self.file_term(Color::White);
        score -= self.file_term(Color::Black);

        score += self.king_term(Color::White);
        score -= self.king_term(Color::Black);

        if pos.piece_list(Piece::WhiteBishop).len() >= 2 {
            score += BISHOP_PAIR;
        }
        if pos.piece_list(Piece::BlackBishop).len() >= 2 {
            score -= BISHOP_PAIR;
        }

        if pos.side_to_move().is_white() {
            Score(score)
        } else {
            Score(-score)
        }
    }

    /// Piece-square, isolation, and passed-pawn terms for one side's pawns.
    fn pawn_term(&self, color: Color) -> i32 {
        let pos = self.position;
        let mut term = 0;

        for &sq in pos.piece_list(Piece::new(color, PieceKind::Pawn)) {
            let sq64 = sq.to64();
            let (table_index, rank) = match color {
                Color::White => (sq64, sq.rank()),
                Color::Black => (sq64 ^ 56, 7 - sq.rank()),
            };

            term += psqt::PAWN_TABLE[table_index];

            if !ISOLATED_MASKS[sq64].intersects(pos.pawns(color)) {
                term += PAWN_ISOLATED;
            }
            if !PASSED_MASKS[color.index()][sq64].intersects(pos.pawns(color.opponent())) {
                term += PAWN_PASSED[rank as usize];
            }
        }

        term
    }

    /// Open and semi-open file bonuses for one side's rooks and queens.
    ///
    /// A file is open with no pawns on it at all, and semi-open with none of
    /// the side's own.
    fn file_term(&self, color: Color) -> i32 {
        let pos = self.position;
        let mut term = 0;

        for &sq in pos.piece_list(Piece::new(color, PieceKind::Rook)) {
            let file = FILE_MASKS[sq.file() as usize];
            if !pos.all_pawns().intersects(file) {
                term += ROOK_OPEN_FILE;
            } else if !pos.pawns(color).intersects(file) {
                term += ROOK_SEMI_OPEN_FILE;
            }
        }

        for &sq in pos.piece_list(Piece::new(color, PieceKind::Queen)) {
            let file = FILE_MASKS[sq.file() as usize];
            if !pos.all_pawns().intersects(file) {
                term += QUEEN_OPEN_FILE;
            } else if !pos.pawns(color).intersects(file) {
                term += QUEEN_SEMI_OPEN_FILE;
            }
        }

        term
    }

    /// King placement, switching tables once the opponent is out of
    /// attacking material.
    fn king_term(&self, color: Color) -> i32 {
        let pos = self.position;
        let sq64 = pos.king_square(color).to64();
        let table_index = match color {
            Color::White => sq64,
            Color::Black => sq64 ^ 56,
        };

        if pos.material(color.opponent()) <= ENDGAME_MATERIAL {
            psqt::KING_ENDGAME[table_index]
        } else {
            psqt::KING_OPENING[table_index]
        }
    }

    /// Pawnless material combinations neither side can win from.
    fn is_material_draw(&self) -> bool {
        let count = |color, kind| self.position.piece_list(Piece::new(color, kind)).len();

        let (wn, bn) = (count(Color::White, PieceKind::Knight), count(Color::Black, PieceKind::Knight));
        let (wb, bb) = (count(Color::White, PieceKind::Bishop), count(Color::Black, PieceKind::Bishop));
        let (wr, br) = (count(Color::White, PieceKind::Rook), count(Color::Black, PieceKind::Rook));
        let (wq, bq) = (count(Color::White, PieceKind::Queen), count(Color::Black, PieceKind::Queen));

        if wr == 0 && br == 0 && wq == 0 && bq == 0 {
            if wb == 0 && bb == 0 {
                // Knights alone cannot force mate
                if wn < 3 && bn < 3 {
                    return true;
                }
            } else if wn == 0 && bn == 0 {
                if (wb as i32 - bb as i32).abs() < 2 {
                    return true;
                }
            } else if (wn < 3 && wb == 0) || (wb == 1 && wn == 0) {
                if (bn < 3 && bb == 0) || (bb == 1 && bn == 0) {
                    return true;
                }
            }
        } else if wq == 0 && bq == 0 {
            if wr == 1 && br == 1 {
                if wn + wb < 2 && bn + bb < 2 {
                    return true;
                }
            } else if wr == 1 && br == 0 {
                if wn + wb == 0 && (bn + bb == 1 || bn + bb == 2) {
                    return true;
                }
            } else if br == 1 && wr == 0 && bn + bb == 0 && (wn + wb == 1 || wn + wb == 2) {
                return true;
            }
        }

        false
    }
}

/// Vertical mirror into Black's half of a piece-square table.
#[inline(always)]
fn mirror(sq: Square) -> usize {
    sq.to64() ^ 56
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{BENCHMARK_FENS, FEN_STARTPOS};

    #[test]
    fn test_startpos_is_balanced() {
        let pos = Position::default();
        assert_eq!(Evaluator::new(&pos).eval(), Score::DRAW);
    }

    #[test]
    fn test_eval_is_color_symmetric() {
        // Side-relative scores are unchanged by mirroring the board
        for fen in BENCHMARK_FENS {
            let pos = Position::from_fen(fen).unwrap();
            let flipped = pos.color_flipped();
            assert_eq!(
                Evaluator::new(&pos).eval(),
                Evaluator::new(&flipped).eval(),
                "asymmetric eval for {fen}"
            );
        }
    }

    #[test]
    fn test_material_advantage_dominates() {
        // White is up a queen
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        assert!(Evaluator::new(&pos).eval() > Score(900));

        // Same position from Black's point of view
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 b - - 0 1").unwrap();
        assert!(Evaluator::new(&pos).eval() < Score(-900));
    }

    #[test]
    fn test_bare_minors_are_drawn() {
        for fen in [
            "4k3/8/8/8/8/8/8/4KB2 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",
            "3nk3/8/8/8/8/8/8/4KN2 w - - 0 1",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(Evaluator::new(&pos).eval(), Score::DRAW, "{fen} should be drawn");
        }

        // A lone rook is winning material
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4KR2 w - - 0 1").unwrap();
        assert!(Evaluator::new(&pos).eval() > Score(400));
    }

    #[test]
    fn test_passed_pawn_bonus_grows_with_rank() {
        let on_4th = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        let on_6th = Position::from_fen("4k3/8/4P3/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(Evaluator::new(&on_6th).eval() > Evaluator::new(&on_4th).eval());
    }

    #[test]
    fn test_rook_prefers_open_files() {
        // Identical except for the rook's file: open on a1, behind its own
        // pawn on b1. Both squares score the same in the rook table.
        let open = Position::from_fen("4k3/8/8/8/8/1P6/8/R3K3 w - - 0 1").unwrap();
        let blocked = Position::from_fen("4k3/8/8/8/8/1P6/8/1R2K3 w - - 0 1").unwrap();
        assert_eq!(
            Evaluator::new(&open).eval(),
            Evaluator::new(&blocked).eval() + 10
        );
    }

    #[test]
    fn test_startpos_symmetry_survives_mirror() {
        // The starting position is its own mirror image, apart from the turn
        let pos = Position::from_fen(FEN_STARTPOS).unwrap();
        assert_eq!(
            pos.color_flipped().to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(pos.color_flipped().color_flipped().to_fen(), FEN_STARTPOS);
    }
}
