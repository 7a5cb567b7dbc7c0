/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::piece::Piece;
use super::position::Position;
use super::square::Square;

/// Hash keys for every hashable component of a position.
///
/// Built once, at compile time, from a fixed-seed PRNG, so keys are identical
/// across runs and builds.
const KEYS: ZobristKeys = ZobristKeys::new();

/// An incrementally maintained Zobrist hash of a [`Position`].
///
/// Every mutation of the board, side to move, castling rights, or en passant
/// square XORs the affected key out and/or in; the key is recomputed from
/// scratch only by the debug invariant check. Distinct positions colliding on
/// the same key is accepted as a calculated risk.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ZobristKey(u64);

impl ZobristKey {
    /// Computes the key of `position` from scratch.
    pub fn compute(position: &Position) -> Self {
        let mut key = Self::default();

        for sq in Square::iter() {
            if let Some(piece) = position.piece_at(sq) {
                key.hash_piece(piece, sq);
            }
        }

        if position.side_to_move().is_white() {
            key.hash_side();
        }

        key.hash_castling(position.castling_rights());

        if let Some(ep) = position.ep_square() {
            key.hash_ep_file(ep.file());
        }

        key
    }

    #[inline(always)]
    pub const fn inner(self) -> u64 {
        self.0
    }

    /// Adds or removes `piece` on `square`.
    #[inline(always)]
    pub fn hash_piece(&mut self, piece: Piece, square: Square) {
        self.0 ^= KEYS.pieces[piece.index()][square.index()];
    }

    /// Toggles the side-to-move key (the key belongs to White; hashing it on
    /// every flip keeps it present exactly when White is to move).
    #[inline(always)]
    pub fn hash_side(&mut self) {
        self.0 ^= KEYS.side;
    }

    /// Adds or removes the key for a castling-rights value.
    #[inline(always)]
    pub fn hash_castling(&mut self, rights: super::position::CastlingRights) {
        self.0 ^= KEYS.castling[rights.index()];
    }

    /// Adds or removes the en passant key for `file`.
    #[inline(always)]
    pub fn hash_ep_file(&mut self, file: u8) {
        self.0 ^= KEYS.en_passant[file as usize];
    }
}

impl fmt::Display for ZobristKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

struct ZobristKeys {
    /// One key per (piece, mailbox square). Border squares get keys too; they
    /// are simply never used.
    pieces: [[u64; Square::COUNT]; Piece::COUNT],

    /// Hashed in while White is to move.
    side: u64,

    /// One key per 4-bit castling-rights value.
    castling: [u64; 16],

    /// One key per en passant file.
    en_passant: [u64; 8],
}

impl ZobristKeys {
    const fn new() -> Self {
        let mut pieces = [[0; Square::COUNT]; Piece::COUNT];
        let mut castling = [0; 16];
        let mut en_passant = [0; 8];

        // xoshiro256** with fixed seeds; const-evaluable, stable across builds
        let mut state: [u64; 4] = [
            0x8e5e_146d_1e6f_8c1f,
            0x5b4f_92a7_33cd_19e4,
            0xd0c8_92b1_70a1_4baf,
            0x2f6e_9c05_8a73_de11,
        ];

        let mut piece = 0;
        while piece < Piece::COUNT {
            let mut sq = 0;
            while sq < Square::COUNT {
                let (key, s) = next(state);
                pieces[piece][sq] = key;
                state = s;
                sq += 1;
            }
            piece += 1;
        }

        let mut i = 0;
        while i < 16 {
            let (key, s) = next(state);
            castling[i] = key;
            state = s;
            i += 1;
        }

        i = 0;
        while i < 8 {
            let (key, s) = next(state);
            en_passant[i] = key;
            state = s;
            i += 1;
        }

        let (side, _) = next(state);

        Self {
            pieces,
            side,
            castling,
            en_passant,
        }
    }
}

/// One step of xoshiro256**.
const fn next(mut s: [u64; 4]) -> (u64, [u64; 4]) {
    let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);

    let t = s[1] << 17;
    s[2] ^= s[0];
    s[3] ^= s[1];
    s[1] ^= s[2];
    s[0] ^= s[3];
    s[2] ^= t;
    s[3] = s[3].rotate_left(45);

    (result, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_is_involutive() {
        let mut key = ZobristKey::default();
        key.hash_piece(Piece::BlackPawn, Square::D1.offset(30));
        assert_ne!(key, ZobristKey::default());

        key.hash_piece(Piece::BlackPawn, Square::D1.offset(30));
        assert_eq!(key, ZobristKey::default());
    }

    #[test]
    fn test_distinct_components_have_distinct_keys() {
        let mut a = ZobristKey::default();
        let mut b = ZobristKey::default();

        a.hash_piece(Piece::WhiteKnight, Square::B1);
        b.hash_piece(Piece::BlackKnight, Square::B1);
        assert_ne!(a, b);

        let mut c = ZobristKey::default();
        c.hash_ep_file(3);
        let mut d = ZobristKey::default();
        d.hash_ep_file(4);
        assert_ne!(c, d);
    }

    #[test]
    fn test_side_key_is_nonzero() {
        let mut key = ZobristKey::default();
        key.hash_side();
        assert_ne!(key.inner(), 0);
    }
}
