/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{anyhow, Result};

/// The two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const COUNT: usize = 2;

    /// Index into color-keyed tables.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    #[inline(always)]
    pub const fn is_white(self) -> bool {
        matches!(self, Self::White)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "w"),
            Self::Black => write!(f, "b"),
        }
    }
}

/// The six kinds of chess piece, independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const COUNT: usize = 6;

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Material value in centipawns.
    ///
    /// The king's value is large enough that its presence dominates any
    /// combination of other pieces, which the endgame-threshold check in
    /// evaluation relies on.
    #[inline(always)]
    pub const fn value(self) -> i32 {
        match self {
            Self::Pawn => 100,
            Self::Knight => 325,
            Self::Bishop => 325,
            Self::Rook => 550,
            Self::Queen => 1000,
            Self::King => 50_000,
        }
    }
}

/// A colored piece.
///
/// Discriminants are laid out white-first so that `index()` can key the
/// piece lists, history table, and Zobrist keys directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Piece {
    WhitePawn,
    WhiteKnight,
    WhiteBishop,
    WhiteRook,
    WhiteQueen,
    WhiteKing,
    BlackPawn,
    BlackKnight,
    BlackBishop,
    BlackRook,
    BlackQueen,
    BlackKing,
}

impl Piece {
    pub const COUNT: usize = 12;

    /// All pieces, in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::WhitePawn,
        Self::WhiteKnight,
        Self::WhiteBishop,
        Self::WhiteRook,
        Self::WhiteQueen,
        Self::WhiteKing,
        Self::BlackPawn,
        Self::BlackKnight,
        Self::BlackBishop,
        Self::BlackRook,
        Self::BlackQueen,
        Self::BlackKing,
    ];

    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self::ALL[color.index() * PieceKind::COUNT + kind.index()]
    }

    #[inline(always)]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn color(self) -> Color {
        if (self as usize) < PieceKind::COUNT {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline(always)]
    pub const fn kind(self) -> PieceKind {
        match self {
            Self::WhitePawn | Self::BlackPawn => PieceKind::Pawn,
            Self::WhiteKnight | Self::BlackKnight => PieceKind::Knight,
            Self::WhiteBishop | Self::BlackBishop => PieceKind::Bishop,
            Self::WhiteRook | Self::BlackRook => PieceKind::Rook,
            Self::WhiteQueen | Self::BlackQueen => PieceKind::Queen,
            Self::WhiteKing | Self::BlackKing => PieceKind::King,
        }
    }

    #[inline(always)]
    pub const fn value(self) -> i32 {
        self.kind().value()
    }

    /// "Big" pieces are everything except pawns.
    #[inline(always)]
    pub const fn is_big(self) -> bool {
        !matches!(self.kind(), PieceKind::Pawn)
    }

    /// Major pieces: rooks, queens, and kings.
    #[inline(always)]
    pub const fn is_major(self) -> bool {
        matches!(self.kind(), PieceKind::Rook | PieceKind::Queen | PieceKind::King)
    }

    /// Minor pieces: knights and bishops.
    #[inline(always)]
    pub const fn is_minor(self) -> bool {
        matches!(self.kind(), PieceKind::Knight | PieceKind::Bishop)
    }

    #[inline(always)]
    pub const fn is_pawn(self) -> bool {
        matches!(self.kind(), PieceKind::Pawn)
    }

    #[inline(always)]
    pub const fn is_king(self) -> bool {
        matches!(self.kind(), PieceKind::King)
    }

    #[inline(always)]
    pub const fn is_knight(self) -> bool {
        matches!(self.kind(), PieceKind::Knight)
    }

    /// Attacks along rook lines (rook or queen).
    #[inline(always)]
    pub const fn is_rook_or_queen(self) -> bool {
        matches!(self.kind(), PieceKind::Rook | PieceKind::Queen)
    }

    /// Attacks along bishop lines (bishop or queen).
    #[inline(always)]
    pub const fn is_bishop_or_queen(self) -> bool {
        matches!(self.kind(), PieceKind::Bishop | PieceKind::Queen)
    }

    /// FEN character for this piece.
    #[inline(always)]
    pub const fn to_char(self) -> char {
        match self {
            Self::WhitePawn => 'P',
            Self::WhiteKnight => 'N',
            Self::WhiteBishop => 'B',
            Self::WhiteRook => 'R',
            Self::WhiteQueen => 'Q',
            Self::WhiteKing => 'K',
            Self::BlackPawn => 'p',
            Self::BlackKnight => 'n',
            Self::BlackBishop => 'b',
            Self::BlackRook => 'r',
            Self::BlackQueen => 'q',
            Self::BlackKing => 'k',
        }
    }

    /// Parses a FEN piece character.
    pub fn from_char(ch: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|piece| piece.to_char() == ch)
            .ok_or_else(|| anyhow!("invalid piece character {ch:?}"))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
