/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{anyhow, Result};

/// Ranks with special pawn behavior: double pushes start from 2 and 7, and
/// en passant targets land on 3 and 6.
pub const RANK_2: u8 = 1;
pub const RANK_3: u8 = 2;
pub const RANK_6: u8 = 5;
pub const RANK_7: u8 = 6;

/// A square on the 12x10 mailbox board.
///
/// The playing field occupies indices `21..=98`; everything else is the
/// off-board border that lets ray and offset generation run without bounds
/// checks. `a1` is index 21, `h8` is index 98, and moving one rank up adds 10.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// Number of cells on the mailbox board, border included.
    pub const COUNT: usize = 120;

    /// Number of playable squares.
    pub const PLAYABLE: usize = 64;

    pub const A1: Self = Self(21);
    pub const B1: Self = Self(22);
    pub const C1: Self = Self(23);
    pub const D1: Self = Self(24);
    pub const E1: Self = Self(25);
    pub const F1: Self = Self(26);
    pub const G1: Self = Self(27);
    pub const H1: Self = Self(28);
    pub const A8: Self = Self(91);
    pub const B8: Self = Self(92);
    pub const C8: Self = Self(93);
    pub const D8: Self = Self(94);
    pub const E8: Self = Self(95);
    pub const F8: Self = Self(96);
    pub const G8: Self = Self(97);
    pub const H8: Self = Self(98);

    /// Constructs a [`Square`] from a file and rank, both `0..8`.
    #[inline(always)]
    pub const fn new(file: u8, rank: u8) -> Self {
        Self(21 + file + 10 * rank)
    }

    /// Index into the 120-cell board array.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Constructs a [`Square`] from a raw mailbox index.
    #[inline(always)]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u8)
    }

    /// File of this square, `0..8`. Only meaningful for playable squares.
    #[inline(always)]
    pub const fn file(self) -> u8 {
        self.0 % 10 - 1
    }

    /// Rank of this square, `0..8`. Only meaningful for playable squares.
    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self.0 / 10 - 2
    }

    /// Returns `true` if this square lies on the 8x8 playing field.
    #[inline(always)]
    pub const fn is_playable(self) -> bool {
        let (file, rank) = (self.0 % 10, self.0 / 10);
        file >= 1 && file <= 8 && rank >= 2 && rank <= 9
    }

    /// Index into 64-entry tables (bitboards, piece-square tables).
    #[inline(always)]
    pub const fn to64(self) -> usize {
        (self.rank() * 8 + self.file()) as usize
    }

    /// Constructs a [`Square`] from a 64-based index.
    #[inline(always)]
    pub const fn from64(index: usize) -> Self {
        Self::new((index % 8) as u8, (index / 8) as u8)
    }

    /// The square `delta` mailbox cells away.
    ///
    /// Any single piece offset from a playable square stays inside the
    /// 120-cell array, so the result is always indexable (possibly a border
    /// cell).
    #[inline(always)]
    pub const fn offset(self, delta: i32) -> Self {
        Self((self.0 as i32 + delta) as u8)
    }

    /// Parses a square from coordinate notation, e.g. `e4`.
    pub fn from_algebraic(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let file_ch = chars.next().ok_or_else(|| anyhow!("empty square string"))?;
        let rank_ch = chars
            .next()
            .ok_or_else(|| anyhow!("square {s:?} is missing a rank"))?;

        if !('a'..='h').contains(&file_ch)
            || !('1'..='8').contains(&rank_ch)
            || chars.next().is_some()
        {
            return Err(anyhow!("invalid square {s:?}"));
        }

        Ok(Self::new(file_ch as u8 - b'a', rank_ch as u8 - b'1'))
    }

    /// Iterator over all 64 playable squares, `a1` first, `h8` last.
    #[inline(always)]
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::PLAYABLE).map(Self::from64)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_round_trips() {
        assert_eq!(Square::new(0, 0), Square::A1);
        assert_eq!(Square::new(7, 7), Square::H8);
        assert_eq!(Square::A1.index(), 21);
        assert_eq!(Square::H8.index(), 98);

        for sq in Square::iter() {
            assert!(sq.is_playable());
            assert_eq!(Square::from64(sq.to64()), sq);
            assert_eq!(Square::new(sq.file(), sq.rank()), sq);
            assert_eq!(Square::from_algebraic(&sq.to_string()).unwrap(), sq);
        }
    }

    #[test]
    fn test_borders_are_not_playable() {
        assert!(!Square::A1.offset(-10).is_playable());
        assert!(!Square::H1.offset(1).is_playable());
        assert!(!Square::A8.offset(-1).is_playable());
        assert!(!Square::H8.offset(21).is_playable());
    }

    #[test]
    fn test_algebraic_rejects_garbage() {
        assert!(Square::from_algebraic("").is_err());
        assert!(Square::from_algebraic("e9").is_err());
        assert!(Square::from_algebraic("i4").is_err());
        assert!(Square::from_algebraic("e44").is_err());
    }
}
