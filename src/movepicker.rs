/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use crate::board::{Move, MoveList, PieceKind, MAX_NUM_MOVES};

/// Yields moves best-score-first without sorting the whole list.
///
/// Scores are computed eagerly on construction; each call to `next` then
/// selection-picks the highest remaining score. Most nodes cut off after a
/// handful of moves, so the `O(n)` scan per move beats a full sort.
pub struct MovePicker {
    moves: MoveList,
    scores: ArrayVec<i32, MAX_NUM_MOVES>,
    current: usize,
}

impl MovePicker {
    pub fn new(moves: MoveList, mut score: impl FnMut(Move) -> i32) -> Self {
        let scores = moves.iter().map(|&mv| score(mv)).collect();
        Self {
            moves,
            scores,
            current: 0,
        }
    }
}

impl Iterator for MovePicker {
    type Item = (Move, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.moves.len() {
            return None;
        }

        let mut best = self.current;
        for i in self.current + 1..self.moves.len() {
            if self.scores[i] > self.scores[best] {
                best = i;
            }
        }
        self.moves.swap(self.current, best);
        self.scores.swap(self.current, best);

        let item = (self.moves[self.current], self.scores[self.current]);
        self.current += 1;
        Some(item)
    }
}

/// Most-valuable-victim / least-valuable-attacker ordering score.
///
/// The victim term spreads victims 100 apart; the attacker term breaks ties
/// within a victim class, cheapest attacker first.
#[inline(always)]
pub fn mvv_lva(victim: PieceKind, attacker: PieceKind) -> i32 {
    const VICTIM_SCORES: [i32; PieceKind::COUNT] = [100, 200, 300, 400, 500, 600];
    VICTIM_SCORES[victim.index()] + 6 - VICTIM_SCORES[attacker.index()] / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, Square};

    #[test]
    fn test_picks_highest_score_first() {
        let moves = Position::default().generate_all_moves();
        let count = moves.len();

        // Score by destination square so the expected order is known
        let picked: Vec<(Move, i32)> =
            MovePicker::new(moves, |mv| mv.to().index() as i32).collect();

        assert_eq!(picked.len(), count);
        for pair in picked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_empty_list() {
        let mut picker = MovePicker::new(MoveList::new(), |_| 0);
        assert!(picker.next().is_none());
    }

    #[test]
    fn test_mvv_lva_ordering() {
        // Taking a queen beats taking a rook, with any attacker
        assert!(mvv_lva(PieceKind::Queen, PieceKind::Queen) > mvv_lva(PieceKind::Rook, PieceKind::Pawn));
        // Within a victim class, the cheapest attacker wins
        assert!(mvv_lva(PieceKind::Queen, PieceKind::Pawn) > mvv_lva(PieceKind::Queen, PieceKind::Rook));
        // Pawn takes pawn
        assert_eq!(mvv_lva(PieceKind::Pawn, PieceKind::Pawn), 105);
    }

    #[test]
    fn test_square_used_in_scoring() {
        // Sanity-check the closure sees real move data
        let moves = Position::default().generate_all_moves();
        let (first, _) = MovePicker::new(moves, |mv| {
            if mv.from() == Square::new(4, 1) { 1 } else { 0 }
        })
        .next()
        .unwrap();
        assert_eq!(first.from(), Square::new(4, 1));
    }
}
