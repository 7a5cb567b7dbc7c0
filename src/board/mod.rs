/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The board representation: a 12x10 mailbox [`Position`] with redundant
//! piece lists and pawn bitboards, plus move generation, execution, and
//! Zobrist hashing.

mod attacks;
mod bitboard;
mod makemove;
mod movegen;
mod moves;
mod perft;
mod piece;
mod position;
mod square;
mod zobrist;

pub use bitboard::{Bitboard, FILE_MASKS, ISOLATED_MASKS, PASSED_MASKS};
pub use moves::{Move, MoveList, MAX_NUM_MOVES};
pub use perft::{perft, print_perft, splitperft};
pub use piece::{Color, Piece, PieceKind};
pub use position::{CastlingRights, Cell, Position, MAX_GAME_MOVES};
pub use square::Square;
pub use zobrist::ZobristKey;
