/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::moves::Move;
use super::piece::{Color, Piece, PieceKind};
use super::position::{Cell, Position, Undo};
use super::square::Square;

/// Castling-rights masks by square.
///
/// Any move touching a king or rook home square strips the affected rights;
/// every other square keeps all 4 bits. Masking by both endpoints handles
/// moving the king or rook as well as capturing the rook.
const CASTLE_PERM: [u8; Square::COUNT] = {
    let mut table = [0xF; Square::COUNT];
    table[Square::A1.index()] = 0xD;
    table[Square::E1.index()] = 0xC;
    table[Square::H1.index()] = 0xE;
    table[Square::A8.index()] = 0x7;
    table[Square::E8.index()] = 0x3;
    table[Square::H8.index()] = 0xB;
    table
};

impl Position {
    /// Makes `mv`, returning `false` (with the position unchanged) if it
    /// would leave the mover's king in check.
    ///
    /// Every state change is mirrored into the hash key incrementally, so the
    /// key never needs recomputing during a game or search.
    pub fn make_move(&mut self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();

        self.history.push(Undo {
            mv: Some(mv),
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            key: self.key,
        });
        self.ply += 1;

        if mv.is_en_passant() {
            // The captured pawn sits behind the destination square
            let victim = match us {
                Color::White => to.offset(-10),
                Color::Black => to.offset(10),
            };
            self.clear_piece(victim);
        } else if mv.is_castle() {
            match to {
                Square::C1 => self.move_piece(Square::A1, Square::D1),
                Square::G1 => self.move_piece(Square::H1, Square::F1),
                Square::C8 => self.move_piece(Square::A8, Square::D8),
                Square::G8 => self.move_piece(Square::H8, Square::F8),
                _ => unreachable!("castle move cannot land on {to}"),
            }
        }

        if let Some(ep) = self.ep_square.take() {
            self.key.hash_ep_file(ep.file());
        }

        self.key.hash_castling(self.castling_rights);
        self.castling_rights = self
            .castling_rights
            .masked(CASTLE_PERM[from.index()])
            .masked(CASTLE_PERM[to.index()]);
        self.key.hash_castling(self.castling_rights);

        self.halfmove_clock += 1;

        if mv.is_capture() {
            self.clear_piece(to);
            self.halfmove_clock = 0;
        }

        let mover = self.piece_at(from).expect("move has a piece to move");
        if mover.is_pawn() {
            self.halfmove_clock = 0;
            if mv.is_pawn_start() {
                let ep = match us {
                    Color::White => from.offset(10),
                    Color::Black => from.offset(-10),
                };
                self.ep_square = Some(ep);
                self.key.hash_ep_file(ep.file());
            }
        }
        self.move_piece(from, to);

        if let Some(promoted) = mv.promoted() {
            self.clear_piece(to);
            self.add_piece(promoted, to);
        }

        if us == Color::Black {
            self.fullmove += 1;
        }
        self.side_to_move = them;
        self.key.hash_side();

        if self.is_square_attacked(self.king_squares[us.index()], them) {
            self.undo_move();
            return false;
        }

        self.debug_validate();
        true
    }

    /// Reverses the most recent move.
    ///
    /// Castling rights, the en passant square, the halfmove clock, and the
    /// hash key are restored wholesale from the undo record rather than
    /// re-derived.
    pub fn undo_move(&mut self) {
        let undo = self.history.pop().expect("undo_move called with no history");
        let mv = undo.mv.expect("undo_move cannot reverse a null move");

        self.ply -= 1;
        let us = self.side_to_move.opponent();
        self.side_to_move = us;
        if us == Color::Black {
            self.fullmove -= 1;
        }

        let from = mv.from();
        let to = mv.to();

        if mv.is_en_passant() {
            let victim = match us {
                Color::White => to.offset(-10),
                Color::Black => to.offset(10),
            };
            self.add_piece(Piece::new(us.opponent(), PieceKind::Pawn), victim);
        } else if mv.is_castle() {
            match to {
                Square::C1 => self.move_piece(Square::D1, Square::A1),
                Square::G1 => self.move_piece(Square::F1, Square::H1),
                Square::C8 => self.move_piece(Square::D8, Square::A8),
                Square::G8 => self.move_piece(Square::F8, Square::H8),
                _ => unreachable!("castle move cannot land on {to}"),
            }
        }

        self.move_piece(to, from);

        if let Some(victim) = mv.captured() {
            self.add_piece(victim, to);
        }

        if mv.promoted().is_some() {
            self.clear_piece(from);
            self.add_piece(Piece::new(us, PieceKind::Pawn), from);
        }

        self.castling_rights = undo.castling_rights;
        self.ep_square = undo.ep_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.key = undo.key;

        self.debug_validate();
    }

    /// Passes the turn without moving. Callers must not be in check.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.in_check(), "null move made while in check");

        self.history.push(Undo {
            mv: None,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            key: self.key,
        });
        self.ply += 1;

        if let Some(ep) = self.ep_square.take() {
            self.key.hash_ep_file(ep.file());
        }

        self.side_to_move = self.side_to_move.opponent();
        self.key.hash_side();
    }

    /// Reverses a null move.
    pub fn undo_null_move(&mut self) {
        let undo = self
            .history
            .pop()
            .expect("undo_null_move called with no history");
        debug_assert!(undo.mv.is_none(), "undo_null_move cannot reverse a move");

        self.ply -= 1;
        self.side_to_move = self.side_to_move.opponent();
        self.ep_square = undo.ep_square;
        self.key = undo.key;
    }

    /// Removes the piece on `square`, updating every redundant view.
    fn clear_piece(&mut self, square: Square) {
        let Cell::Occupied(piece) = self.squares[square.index()] else {
            unreachable!("clear_piece on empty square {square}");
        };

        self.key.hash_piece(piece, square);
        self.squares[square.index()] = Cell::Empty;

        let color = piece.color().index();
        self.material[color] -= piece.value();
        if piece.is_big() {
            self.big_pieces[color] -= 1;
        }
        if piece.is_major() {
            self.major_pieces[color] -= 1;
        }
        if piece.is_minor() {
            self.minor_pieces[color] -= 1;
        }
        if piece.is_pawn() {
            self.pawns[color].clear(square);
            self.pawns[2].clear(square);
        }

        let list = &mut self.piece_lists[piece.index()];
        let index = list
            .iter()
            .position(|&sq| sq == square)
            .expect("piece lists track every piece");
        list.swap_remove(index);
    }

    /// Places `piece` on `square`, updating every redundant view.
    fn add_piece(&mut self, piece: Piece, square: Square) {
        debug_assert_eq!(self.squares[square.index()], Cell::Empty);

        self.key.hash_piece(piece, square);
        self.squares[square.index()] = Cell::Occupied(piece);

        let color = piece.color().index();
        self.material[color] += piece.value();
        if piece.is_big() {
            self.big_pieces[color] += 1;
        }
        if piece.is_major() {
            self.major_pieces[color] += 1;
        }
        if piece.is_minor() {
            self.minor_pieces[color] += 1;
        }
        if piece.is_pawn() {
            self.pawns[color].set(square);
            self.pawns[2].set(square);
        }

        self.piece_lists[piece.index()].push(square);
    }

    /// Moves the piece on `from` to the empty square `to`.
    fn move_piece(&mut self, from: Square, to: Square) {
        let Cell::Occupied(piece) = self.squares[from.index()] else {
            unreachable!("move_piece from empty square {from}");
        };
        debug_assert_eq!(self.squares[to.index()], Cell::Empty);

        self.key.hash_piece(piece, from);
        self.squares[from.index()] = Cell::Empty;
        self.key.hash_piece(piece, to);
        self.squares[to.index()] = Cell::Occupied(piece);

        let color = piece.color().index();
        if piece.is_pawn() {
            self.pawns[color].clear(from);
            self.pawns[2].clear(from);
            self.pawns[color].set(to);
            self.pawns[2].set(to);
        }
        if piece.is_king() {
            self.king_squares[color] = to;
        }

        let list = &mut self.piece_lists[piece.index()];
        let index = list
            .iter()
            .position(|&sq| sq == from)
            .expect("piece lists track every piece");
        list[index] = to;
    }
}
