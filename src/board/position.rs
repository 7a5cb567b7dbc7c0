/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use arrayvec::ArrayVec;

use super::bitboard::Bitboard;
use super::moves::Move;
use super::piece::{Color, Piece, PieceKind};
use super::square::{Square, RANK_3, RANK_6};
use super::zobrist::ZobristKey;
use crate::utils::FEN_STARTPOS;

/// Upper bound on the length of a game, in plies.
pub const MAX_GAME_MOVES: usize = 2048;

/// Most copies of one piece that can exist at once (8 pawns promoting to the
/// two originals).
const MAX_PIECES_PER_KIND: usize = 10;

/// Contents of one mailbox cell.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Part of the border surrounding the playing field.
    #[default]
    Offboard,
    Empty,
    Occupied(Piece),
}

/// Castling availability, one bit per right.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: Self = Self(0);
    pub const WHITE_KINGSIDE: Self = Self(1);
    pub const WHITE_QUEENSIDE: Self = Self(2);
    pub const BLACK_KINGSIDE: Self = Self(4);
    pub const BLACK_QUEENSIDE: Self = Self(8);
    pub const ALL: Self = Self(15);

    #[inline(always)]
    pub const fn contains(self, rights: Self) -> bool {
        self.0 & rights.0 == rights.0
    }

    /// Keeps only the rights allowed by `mask`.
    #[inline(always)]
    pub const fn masked(self, mask: u8) -> Self {
        Self(self.0 & mask)
    }

    /// Index into the 16-entry Zobrist key table.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Parses the castling field of a FEN string.
    pub fn from_fen(s: &str) -> Result<Self> {
        if s == "-" {
            return Ok(Self::NONE);
        }

        let mut rights = Self::NONE;
        for ch in s.chars() {
            rights.0 |= match ch {
                'K' => Self::WHITE_KINGSIDE.0,
                'Q' => Self::WHITE_QUEENSIDE.0,
                'k' => Self::BLACK_KINGSIDE.0,
                'q' => Self::BLACK_QUEENSIDE.0,
                _ => bail!("invalid castling character {ch:?}"),
            };
        }
        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        for (right, ch) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.contains(right) {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

/// Everything needed to reverse one move (or null move).
#[derive(Debug, Clone, Copy)]
pub(in crate::board) struct Undo {
    /// `None` for a null move.
    pub mv: Option<Move>,
    pub castling_rights: CastlingRights,
    pub ep_square: Option<Square>,
    pub halfmove_clock: u16,
    /// Hash of the position the move was made from.
    pub key: ZobristKey,
}

/// A complete chess position.
///
/// The mailbox array is the source of truth; the pawn bitboards, piece lists,
/// material totals, and piece counts are redundant views maintained
/// incrementally by the move executor so that generation and evaluation never
/// have to scan all 120 cells. [`Position::debug_validate`] cross-checks every
/// redundant view against the board in debug builds.
#[derive(Debug, Clone)]
pub struct Position {
    pub(in crate::board) squares: [Cell; Square::COUNT],

    /// Pawn masks for White, Black, and both combined.
    pub(in crate::board) pawns: [Bitboard; 3],

    /// Squares occupied by each piece, in no particular order.
    pub(in crate::board) piece_lists: [ArrayVec<Square, MAX_PIECES_PER_KIND>; Piece::COUNT],

    /// Total material per color, kings included.
    pub(in crate::board) material: [i32; Color::COUNT],

    /// Counts of non-pawn pieces per color.
    pub(in crate::board) big_pieces: [u8; Color::COUNT],
    pub(in crate::board) major_pieces: [u8; Color::COUNT],
    pub(in crate::board) minor_pieces: [u8; Color::COUNT],

    pub(in crate::board) king_squares: [Square; Color::COUNT],
    pub(in crate::board) side_to_move: Color,
    pub(in crate::board) ep_square: Option<Square>,

    /// Plies since the last capture or pawn move.
    pub(in crate::board) halfmove_clock: u16,

    /// Distance from the search root, not from the start of the game.
    pub(in crate::board) ply: usize,

    pub(in crate::board) fullmove: u16,
    pub(in crate::board) castling_rights: CastlingRights,
    pub(in crate::board) key: ZobristKey,

    /// One record per move made since this position was set up.
    pub(in crate::board) history: Vec<Undo>,
}

impl Position {
    /// An empty board with no pieces and White to move.
    fn empty() -> Self {
        let mut squares = [Cell::Offboard; Square::COUNT];
        for sq in Square::iter() {
            squares[sq.index()] = Cell::Empty;
        }

        Self {
            squares,
            pawns: [Bitboard::EMPTY; 3],
            piece_lists: Default::default(),
            material: [0; Color::COUNT],
            big_pieces: [0; Color::COUNT],
            major_pieces: [0; Color::COUNT],
            minor_pieces: [0; Color::COUNT],
            king_squares: [Square::A1; Color::COUNT],
            side_to_move: Color::White,
            ep_square: None,
            halfmove_clock: 0,
            ply: 0,
            fullmove: 1,
            castling_rights: CastlingRights::NONE,
            key: ZobristKey::default(),
            history: Vec::with_capacity(MAX_GAME_MOVES),
        }
    }

    /// Parses a position from Forsyth-Edwards Notation.
    ///
    /// The halfmove and fullmove fields may be omitted.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut parts = fen.split_whitespace();
        let placement = parts.next().context("FEN string is empty")?;
        let side = parts.next().context("FEN is missing the side to move")?;
        let castling = parts.next().unwrap_or("-");
        let ep = parts.next().unwrap_or("-");
        let halfmove = parts.next().unwrap_or("0");
        let fullmove = parts.next().unwrap_or("1");

        let mut position = Self::empty();

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            bail!("FEN placement has {} ranks, expected 8", ranks.len());
        }

        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(ch)?;
                    if file >= 8 {
                        bail!("rank {} of FEN placement overflows the board", rank + 1);
                    }
                    position.squares[Square::new(file, rank).index()] = Cell::Occupied(piece);
                    file += 1;
                }
            }
            if file != 8 {
                bail!("rank {} of FEN placement covers {file} files", rank + 1);
            }
        }

        position.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => bail!("invalid side to move {side:?}"),
        };

        position.castling_rights = CastlingRights::from_fen(castling)?;

        if ep != "-" {
            let sq = Square::from_algebraic(ep)?;
            if sq.rank() != RANK_3 && sq.rank() != RANK_6 {
                bail!("en passant square {sq} is not on rank 3 or 6");
            }
            position.ep_square = Some(sq);
        }

        position.halfmove_clock = halfmove
            .parse()
            .with_context(|| format!("invalid halfmove clock {halfmove:?}"))?;
        position.fullmove = fullmove
            .parse()
            .with_context(|| format!("invalid fullmove counter {fullmove:?}"))?;

        position.recompute_aggregates();

        for color in [Color::White, Color::Black] {
            let king = Piece::new(color, PieceKind::King);
            if position.piece_lists[king.index()].len() != 1 {
                bail!("position does not have exactly one {king} king");
            }
        }

        position.key = ZobristKey::compute(&position);

        Ok(position)
    }

    /// Serializes this position to Forsyth-Edwards Notation.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push_str(&format!(
            " {} {} {} {} {}",
            self.side_to_move,
            self.castling_rights,
            self.ep_square
                .map_or_else(|| String::from("-"), |sq| sq.to_string()),
            self.halfmove_clock,
            self.fullmove,
        ));

        fen
    }

    /// Rebuilds every redundant view from the mailbox array.
    pub(in crate::board) fn recompute_aggregates(&mut self) {
        self.pawns = [Bitboard::EMPTY; 3];
        self.piece_lists = Default::default();
        self.material = [0; Color::COUNT];
        self.big_pieces = [0; Color::COUNT];
        self.major_pieces = [0; Color::COUNT];
        self.minor_pieces = [0; Color::COUNT];

        for sq in Square::iter() {
            if let Some(piece) = self.piece_at(sq) {
                let color = piece.color().index();
                self.piece_lists[piece.index()].push(sq);
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
                    self.pawns[color].set(sq);
                    self.pawns[2].set(sq);
                }
                if piece.is_king() {
                    self.king_squares[color] = sq;
                }
            }
        }
    }

    /// The piece on `square`, if any.
    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        match self.squares[square.index()] {
            Cell::Occupied(piece) => Some(piece),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline(always)]
    pub const fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.key
    }

    /// Distance from the search root.
    #[inline(always)]
    pub const fn ply(&self) -> usize {
        self.ply
    }

    /// Plies played since this position was set up.
    #[inline(always)]
    pub fn game_ply(&self) -> usize {
        self.history.len()
    }

    #[inline(always)]
    pub const fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    /// Total material for `color`, king included.
    #[inline(always)]
    pub const fn material(&self, color: Color) -> i32 {
        self.material[color.index()]
    }

    /// Number of non-pawn pieces for `color`.
    #[inline(always)]
    pub const fn big_pieces(&self, color: Color) -> u8 {
        self.big_pieces[color.index()]
    }

    /// Squares occupied by `piece`.
    #[inline(always)]
    pub fn piece_list(&self, piece: Piece) -> &[Square] {
        &self.piece_lists[piece.index()]
    }

    /// Pawn mask for one color.
    #[inline(always)]
    pub const fn pawns(&self, color: Color) -> Bitboard {
        self.pawns[color.index()]
    }

    /// Pawn mask for both colors combined.
    #[inline(always)]
    pub const fn all_pawns(&self) -> Bitboard {
        self.pawns[2]
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn in_check(&self) -> bool {
        self.is_square_attacked(
            self.king_squares[self.side_to_move.index()],
            self.side_to_move.opponent(),
        )
    }

    /// Returns `true` if the current position occurred before, within the
    /// window since the last irreversible move.
    ///
    /// Positions older than the halfmove clock cannot repeat, and the
    /// immediately preceding position differs by side to move.
    pub fn is_repetition(&self) -> bool {
        let len = self.history.len();
        let end = len.saturating_sub(1);
        let start = len.saturating_sub(self.halfmove_clock as usize).min(end);
        self.history[start..end].iter().any(|undo| undo.key == self.key)
    }

    /// Marks the current position as the search root.
    #[inline(always)]
    pub fn reset_ply(&mut self) {
        self.ply = 0;
    }

    /// The same position with colors swapped and the board mirrored
    /// vertically.
    ///
    /// Evaluation is symmetric under this transformation, which makes it a
    /// strong self-test for the evaluator.
    pub fn color_flipped(&self) -> Self {
        let mut flipped = Self::empty();

        for sq in Square::iter() {
            if let Some(piece) = self.piece_at(sq) {
                let mirror = Square::from64(sq.to64() ^ 56);
                flipped.squares[mirror.index()] =
                    Cell::Occupied(Piece::new(piece.color().opponent(), piece.kind()));
            }
        }

        flipped.side_to_move = self.side_to_move.opponent();
        flipped.halfmove_clock = self.halfmove_clock;
        flipped.fullmove = self.fullmove;
        flipped.ep_square = self.ep_square.map(|sq| Square::from64(sq.to64() ^ 56));

        let rights = self.castling_rights;
        for (from, to) in [
            (CastlingRights::WHITE_KINGSIDE, CastlingRights::BLACK_KINGSIDE),
            (CastlingRights::WHITE_QUEENSIDE, CastlingRights::BLACK_QUEENSIDE),
            (CastlingRights::BLACK_KINGSIDE, CastlingRights::WHITE_KINGSIDE),
            (CastlingRights::BLACK_QUEENSIDE, CastlingRights::WHITE_QUEENSIDE),
        ] {
            if rights.contains(from) {
                flipped.castling_rights.0 |= to.0;
            }
        }

        flipped.recompute_aggregates();
        flipped.key = ZobristKey::compute(&flipped);
        flipped
    }

    /// Cross-checks every redundant view against the mailbox array.
    ///
    /// Compiles to nothing in release builds.
    pub(in crate::board) fn debug_validate(&self) {
        #[cfg(debug_assertions)]
        {
            let mut check = self.clone();
            check.recompute_aggregates();

            debug_assert_eq!(self.pawns, check.pawns);
            debug_assert_eq!(self.material, check.material);
            debug_assert_eq!(self.big_pieces, check.big_pieces);
            debug_assert_eq!(self.major_pieces, check.major_pieces);
            debug_assert_eq!(self.minor_pieces, check.minor_pieces);
            debug_assert_eq!(self.king_squares, check.king_squares);

            for piece in Piece::ALL {
                let mut mine: Vec<Square> = self.piece_lists[piece.index()].to_vec();
                let mut rebuilt: Vec<Square> = check.piece_lists[piece.index()].to_vec();
                mine.sort_unstable();
                rebuilt.sort_unstable();
                debug_assert_eq!(mine, rebuilt, "piece list for {piece} is stale");
            }

            debug_assert_eq!(self.key, ZobristKey::compute(self), "hash key is stale");
        }
    }
}

impl Default for Position {
    /// The standard starting position.
    fn default() -> Self {
        Self::from_fen(FEN_STARTPOS).expect("startpos FEN is valid")
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    /// Renders the board with rank 8 on top, followed by the game state
    /// fields and the hash key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => write!(f, " {piece}")?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "\n   a b c d e f g h\n")?;
        writeln!(f, "     Side: {}", self.side_to_move)?;
        writeln!(
            f,
            "       EP: {}",
            self.ep_square
                .map_or_else(|| String::from("-"), |sq| sq.to_string())
        )?;
        writeln!(f, "   Castle: {}", self.castling_rights)?;
        write!(f, "      Key: {}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FEN_KIWIPETE;

    #[test]
    fn test_startpos() {
        let pos = Position::default();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert_eq!(pos.ep_square(), None);
        assert_eq!(pos.halfmove_clock(), 0);

        assert_eq!(pos.piece_at(Square::E1), Some(Piece::WhiteKing));
        assert_eq!(pos.king_square(Color::White), Square::E1);
        assert_eq!(pos.king_square(Color::Black), Square::E8);
        assert_eq!(pos.pawns(Color::White).count(), 8);
        assert_eq!(pos.all_pawns().count(), 16);

        // 2 minors of each kind, 2 rooks, 1 queen, 1 king per side
        assert_eq!(pos.big_pieces(Color::White), 8);
        assert_eq!(pos.material(Color::White), pos.material(Color::Black));
        assert!(!pos.in_check());
    }

    #[test]
    fn test_fen_round_trip() {
        for fen in [
            FEN_STARTPOS,
            FEN_KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.to_fen(), fen);
        }
    }

    #[test]
    fn test_fen_rejects_garbage() {
        assert!(Position::from_fen("").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(Position::from_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
    }

    #[test]
    fn test_hash_matches_recompute() {
        let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        assert_eq!(pos.key(), ZobristKey::compute(&pos));
    }

    #[test]
    fn test_repetition_detection() {
        let mut pos = Position::default();

        // A pawn move resets the halfmove clock while history is non-empty;
        // the scan window must stay in bounds
        let e4 = Move::from_uci(&pos, "e2e4").unwrap();
        assert!(pos.make_move(e4));
        assert!(!pos.is_repetition());

        let quiet = Move::from_uci(&pos, "b8c6").unwrap();
        assert!(pos.make_move(quiet));
        assert!(!pos.is_repetition());

        // Shuffling the knights out and back repeats the starting position
        let mut pos = Position::default();
        for mv_str in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            assert!(!pos.is_repetition());
            let mv = Move::from_uci(&pos, mv_str).unwrap();
            assert!(pos.make_move(mv));
        }
        assert!(pos.is_repetition());
    }

    #[test]
    fn test_color_flip_round_trip() {
        let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let flipped = pos.color_flipped();

        assert_eq!(flipped.side_to_move(), pos.side_to_move().opponent());
        assert_eq!(flipped.material(Color::White), pos.material(Color::Black));
        assert_eq!(flipped.color_flipped().to_fen(), pos.to_fen());
    }
}
