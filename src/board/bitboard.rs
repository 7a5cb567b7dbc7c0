/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use super::square::Square;

/// A 64-bit mask with one bit per playable square (`a1` = bit 0, `h8` = bit 63).
///
/// The position keeps pawns duplicated on bitboards so that the structural
/// pawn terms in evaluation (isolated/passed/open files) are mask
/// intersections instead of board scans.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Self = Self(0);

    /// Sets the bit for `square`.
    #[inline(always)]
    pub fn set(&mut self, square: Square) {
        self.0 |= 1 << square.to64();
    }

    /// Clears the bit for `square`.
    #[inline(always)]
    pub fn clear(&mut self, square: Square) {
        self.0 &= !(1 << square.to64());
    }

    /// Returns `true` if the bit for `square` is set.
    #[inline(always)]
    pub const fn contains(self, square: Square) -> bool {
        self.0 & (1 << square.to64()) != 0
    }

    /// Number of set bits.
    #[inline(always)]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Removes and returns the lowest set bit as a square.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(Square::from64(index))
    }
}

impl BitAnd for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOrAssign for Bitboard {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Display for Bitboard {
    /// Renders the mask as an 8x8 grid, rank 8 on top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let mark = if self.contains(Square::new(file, rank)) {
                    'X'
                } else {
                    '-'
                };
                write!(f, "{mark}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One mask per file.
pub const FILE_MASKS: [Bitboard; 8] = {
    let mut masks = [Bitboard::EMPTY; 8];
    let mut file = 0;
    while file < 8 {
        let mut rank = 0;
        let mut bits = 0u64;
        while rank < 8 {
            bits |= 1 << (rank * 8 + file);
            rank += 1;
        }
        masks[file] = Bitboard(bits);
        file += 1;
    }
    masks
};

/// Neighbor-file masks for isolated-pawn detection, indexed by 64-square.
///
/// A pawn is isolated when no friendly pawn sits on either adjacent file.
pub const ISOLATED_MASKS: [Bitboard; 64] = {
    let mut masks = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let file = sq % 8;
        let mut bits = 0u64;
        if file > 0 {
            bits |= FILE_MASKS[file - 1].0;
        }
        if file < 7 {
            bits |= FILE_MASKS[file + 1].0;
        }
        masks[sq] = Bitboard(bits);
        sq += 1;
    }
    masks
};

/// Passed-pawn masks, indexed by `[color][square64]`.
///
/// Covers the pawn's own file and both neighbor files, on every rank ahead of
/// the pawn from its color's point of view. A pawn is passed when this mask
/// contains no enemy pawn.
pub const PASSED_MASKS: [[Bitboard; 64]; 2] = {
    let mut masks = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0;
    while sq < 64 {
        let (file, rank) = (sq % 8, sq / 8);

        let mut white = 0u64;
        let mut ahead = rank + 1;
        while ahead < 8 {
            white |= span(file, ahead);
            ahead += 1;
        }

        let mut black = 0u64;
        let mut behind = 0;
        while behind < rank {
            black |= span(file, behind);
            behind += 1;
        }

        masks[0][sq] = Bitboard(white);
        masks[1][sq] = Bitboard(black);
        sq += 1;
    }
    masks
};

/// Bits on `rank` for `file` and its neighbors.
const fn span(file: usize, rank: usize) -> u64 {
    let mut bits = 1u64 << (rank * 8 + file);
    if file > 0 {
        bits |= 1 << (rank * 8 + file - 1);
    }
    if file < 7 {
        bits |= 1 << (rank * 8 + file + 1);
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clear_pop() {
        let mut bb = Bitboard::EMPTY;
        let e4 = Square::from_algebraic("e4").unwrap();
        let c7 = Square::from_algebraic("c7").unwrap();

        bb.set(e4);
        bb.set(c7);
        assert_eq!(bb.count(), 2);
        assert!(bb.contains(e4));

        // Pops lowest square first
        assert_eq!(bb.pop(), Some(e4));
        assert_eq!(bb.pop(), Some(c7));
        assert_eq!(bb.pop(), None);
        assert!(bb.is_empty());

        bb.set(e4);
        bb.clear(e4);
        assert!(bb.is_empty());
    }

    #[test]
    fn test_file_masks() {
        for file in 0..8u8 {
            assert_eq!(FILE_MASKS[file as usize].count(), 8);
            for rank in 0..8u8 {
                assert!(FILE_MASKS[file as usize].contains(Square::new(file, rank)));
            }
        }
    }

    #[test]
    fn test_passed_masks() {
        let e4 = Square::from_algebraic("e4").unwrap();

        // White pawn on e4: everything ahead on the d, e, and f files
        let white = PASSED_MASKS[0][e4.to64()];
        assert!(white.contains(Square::from_algebraic("e5").unwrap()));
        assert!(white.contains(Square::from_algebraic("d7").unwrap()));
        assert!(white.contains(Square::from_algebraic("f8").unwrap()));
        assert!(!white.contains(Square::from_algebraic("e3").unwrap()));
        assert!(!white.contains(Square::from_algebraic("c5").unwrap()));

        // Black pawn on e4 pushes the other way
        let black = PASSED_MASKS[1][e4.to64()];
        assert!(black.contains(Square::from_algebraic("e3").unwrap()));
        assert!(black.contains(Square::from_algebraic("d2").unwrap()));
        assert!(!black.contains(Square::from_algebraic("e5").unwrap()));
    }

    #[test]
    fn test_isolated_masks_exclude_own_file() {
        let a2 = Square::from_algebraic("a2").unwrap();
        let mask = ISOLATED_MASKS[a2.to64()];
        assert!(mask.contains(Square::from_algebraic("b5").unwrap()));
        assert!(!mask.contains(Square::from_algebraic("a5").unwrap()));
        assert!(!mask.contains(Square::from_algebraic("c5").unwrap()));
    }
}
