/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::ops::Neg;

use uci_parser::UciScore;

use crate::search::MAX_DEPTH;

/// A search score, in centipawns from the side to move's point of view.
///
/// Mate scores occupy a reserved band just below [`Score::INF`]; a mate found
/// at ply `n` scores `MATE - n`, so shorter mates compare higher and the
/// distance can be recovered from the score alone.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Largest representable score, used as the initial search window.
    pub const INF: Self = Self(i16::MAX as i32);

    /// Mate on this move.
    pub const MATE: Self = Self(Self::INF.0 - 1);

    /// An even position.
    pub const DRAW: Self = Self(0);

    /// The lowest score that still means "mate": a mate found at the deepest
    /// reachable ply.
    pub const LOWEST_MATE: Self = Self(Self::MATE.0 - MAX_DEPTH as i32);

    /// Returns `true` if this score means one side is getting mated.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::LOWEST_MATE.0
    }

    /// Number of plies until mate. Only meaningful if [`Score::is_mate`].
    #[inline(always)]
    pub const fn plies_to_mate(&self) -> i32 {
        Self::MATE.0 - self.0.abs()
    }

    /// Number of full moves until mate, negative when the side to move is
    /// the one getting mated.
    #[inline(always)]
    pub const fn moves_to_mate(&self) -> i32 {
        let moves = (self.plies_to_mate() + 1) / 2;
        if self.0 > 0 {
            moves
        } else {
            -moves
        }
    }

    /// Converts to the UCI `score` field: `mate <moves>` in the mate band,
    /// `cp <centipawns>` otherwise.
    #[inline(always)]
    pub fn into_uci(self) -> UciScore {
        if self.is_mate() {
            UciScore::mate(self.moves_to_mate())
        } else {
            UciScore::cp(self.0)
        }
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl PartialEq<i32> for Score {
    #[inline(always)]
    fn eq(&self, other: &i32) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<i32> for Score {
    #[inline(always)]
    fn partial_cmp(&self, other: &i32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_band() {
        // Mate in 1 for the winning side: found at ply 1
        let mate_in_1 = Score::MATE - 1;
        assert!(mate_in_1.is_mate());
        assert_eq!(mate_in_1.plies_to_mate(), 1);
        assert_eq!(mate_in_1.moves_to_mate(), 1);

        // Mated in 2 moves for the losing side: found at ply 4
        let mated_in_2 = -(Score::MATE - 4);
        assert!(mated_in_2.is_mate());
        assert_eq!(mated_in_2.moves_to_mate(), -2);

        assert!(!Score::DRAW.is_mate());
        assert!(!Score(500).is_mate());

        // Shorter mates compare higher
        assert!(Score::MATE - 1 > Score::MATE - 3);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(Score(10) + Score(5), Score(15));
        assert_eq!(Score(10) - 25, Score(-15));
        assert_eq!(-Score(42), Score(-42));
        assert!(Score(100) > 50);
    }
}
