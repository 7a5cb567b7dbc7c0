/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use uci_parser::{UciInfo, UciResponse, UciSearchOptions};

use crate::board::{Move, Piece, Position, Square};
use crate::eval::Evaluator;
use crate::movepicker::{mvv_lva, MovePicker};
use crate::pvtable::PvTable;
use crate::score::Score;

/// Deepest ply the search will reach.
pub const MAX_DEPTH: usize = 64;

/// The clock, stop flag, and node cap are checked every this many nodes.
const POLL_INTERVAL: u64 = 2048;

/// Ordering score for the cached best move.
const PV_MOVE_SCORE: i32 = 2_000_000;

/// Captures order above everything except the cached move.
const CAPTURE_BONUS: i32 = 1_000_000;

/// Quiet moves that recently caused a beta cutoff at the same ply.
const FIRST_KILLER_SCORE: i32 = 900_000;
const SECOND_KILLER_SCORE: i32 = 800_000;

/// Null-move pruning shrinks the remaining depth by this much.
const NULL_MOVE_REDUCTION: usize = 4;

/// Everything that bounds a search.
///
/// The soft timeout stops iterative deepening between depths; the hard
/// timeout aborts mid-tree. Both derive from the UCI time controls.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_depth: usize,
    pub max_nodes: u64,
    pub starttime: Instant,
    pub soft_timeout: Duration,
    pub hard_timeout: Duration,
}

impl SearchConfig {
    /// Converts UCI `go` options into concrete limits for `game`.
    pub fn new(options: UciSearchOptions, game: &Position) -> Self {
        let mut config = Self::default();

        if let Some(depth) = options.depth {
            config.max_depth = depth as usize;
        }
        if let Some(nodes) = options.nodes {
            config.max_nodes = nodes as u64;
        }

        if let Some(movetime) = options.movetime {
            config.soft_timeout = movetime;
            config.hard_timeout = movetime;
        } else {
            let (time, inc) = if game.side_to_move().is_white() {
                (options.wtime, options.winc)
            } else {
                (options.btime, options.binc)
            };

            if let Some(time) = time {
                let inc = inc.unwrap_or(Duration::ZERO) / 2;
                config.soft_timeout = time / 20 + inc;
                config.hard_timeout = time / 5 + inc;
            }
        }

        config
    }
}

impl Default for SearchConfig {
    /// No limits beyond the maximum depth.
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_nodes: u64::MAX,
            starttime: Instant::now(),
            soft_timeout: Duration::MAX,
            hard_timeout: Duration::MAX,
        }
    }
}

/// What a search produced.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// The move to play. `None` only if the position has no legal moves.
    pub bestmove: Option<Move>,
    pub score: Score,
    pub depth: usize,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

/// One iterative-deepening search over a position.
pub struct Search {
    position: Position,
    config: SearchConfig,

    /// Cleared externally to stop the search.
    is_searching: Arc<AtomicBool>,

    pv_table: PvTable,

    /// Two quiet cutoff moves per ply.
    killers: [[Option<Move>; MAX_DEPTH]; 2],

    /// Quiet moves that raised alpha, indexed by piece and destination.
    history: [[i32; Square::COUNT]; Piece::COUNT],

    nodes: u64,

    /// Set when a limit is hit; every frame above unwinds immediately.
    stopped: bool,

    /// Move ordering quality: cutoffs, and cutoffs on the first move tried.
    fail_high: u64,
    fail_high_first: u64,

    result: SearchResult,
}

impl Search {
    pub fn new(position: Position, config: SearchConfig, is_searching: Arc<AtomicBool>) -> Self {
        Self {
            position,
            config,
            is_searching,
            pv_table: PvTable::new(),
            killers: [[None; MAX_DEPTH]; 2],
            history: [[0; Square::COUNT]; Piece::COUNT],
            nodes: 0,
            stopped: false,
            fail_high: 0,
            fail_high_first: 0,
            result: SearchResult::default(),
        }
    }

    /// Runs the search, prints `bestmove`, and clears the searching flag.
    pub fn start(mut self) -> SearchResult {
        self.position.reset_ply();

        // Fall back to any legal move in case not even depth 1 completes
        for mv in self.position.generate_all_moves() {
            if self.position.make_move(mv) {
                self.position.undo_move();
                self.result.bestmove = Some(mv);
                break;
            }
        }

        self.iterative_deepening();

        let response = UciResponse::<String>::BestMove {
            bestmove: self.result.bestmove.map(|mv| mv.to_string()),
            ponder: None,
        };
        println!("{response}");

        self.is_searching.store(false, Ordering::Relaxed);
        self.result
    }

    fn iterative_deepening(&mut self) {
        for depth in 1..=self.config.max_depth {
            if self.config.starttime.elapsed() >= self.config.soft_timeout
                || !self.is_searching.load(Ordering::Relaxed)
            {
                break;
            }

            let score = self.alpha_beta(-Score::INF, Score::INF, depth, true);

            // A cancelled iteration is torn; keep the previous one's result
            if self.stopped {
                break;
            }

            self.result.score = score;
            self.result.depth = depth;
            self.result.nodes = self.nodes;
            self.result.pv = self.pv_line(depth);
            if let Some(&first) = self.result.pv.first() {
                self.result.bestmove = Some(first);
            }

            self.send_info();
        }
    }

    /// Fail-hard alpha-beta negamax.
    fn alpha_beta(&mut self, mut alpha: Score, beta: Score, mut depth: usize, null_allowed: bool) -> Score {
        if depth == 0 {
            return self.quiescence(alpha, beta);
        }

        if self.nodes & (POLL_INTERVAL - 1) == 0 {
            self.check_limits();
        }
        if self.stopped {
            return Score::DRAW;
        }
        self.nodes += 1;

        let ply = self.position.ply();
        if ply > 0 && (self.position.is_repetition() || self.position.halfmove_clock() >= 100) {
            return Score::DRAW;
        }
        if ply > MAX_DEPTH - 1 {
            return Evaluator::new(&self.position).eval();
        }

        let in_check = self.position.in_check();
        if in_check {
            depth += 1;
        }

        if null_allowed
            && !in_check
            && ply > 0
            && depth >= NULL_MOVE_REDUCTION
            && self.position.big_pieces(self.position.side_to_move()) >= 2
        {
            self.position.make_null_move();
            let score = -self.alpha_beta(-beta, -beta + 1, depth - NULL_MOVE_REDUCTION, false);
            self.position.undo_null_move();

            if self.stopped {
                return Score::DRAW;
            }
            if score >= beta && !score.is_mate() {
                return beta;
            }
        }

        let pv_move = self.pv_table.probe(self.position.key());
        let moves = self.position.generate_all_moves();
        let picker = MovePicker::new(moves, |mv| self.order_score(mv, pv_move, ply));

        let old_alpha = alpha;
        let mut best_move = None;
        let mut legal = 0;

        for (mv, _) in picker {
            if !self.position.make_move(mv) {
                continue;
            }
            legal += 1;
            let score = -self.alpha_beta(-beta, -alpha, depth - 1, true);
            self.position.undo_move();

            if self.stopped {
                return Score::DRAW;
            }

            if score > alpha {
                if score >= beta {
                    if legal == 1 {
                        self.fail_high_first += 1;
                    }
                    self.fail_high += 1;

                    if !mv.is_capture() {
                        self.killers[1][ply] = self.killers[0][ply];
                        self.killers[0][ply] = Some(mv);
                    }
                    return beta;
                }

                alpha = score;
                best_move = Some(mv);

                if !mv.is_capture() {
                    let piece = self
                        .position
                        .piece_at(mv.from())
                        .expect("undone move has its piece back");
                    self.history[piece.index()][mv.to().index()] += depth as i32;
                }
            }
        }

        if legal == 0 {
            return if in_check {
                // Deeper mates score lower, so the shortest one wins
                -Score::MATE + ply as i32
            } else {
                Score::DRAW
            };
        }

        if alpha != old_alpha {
            self.pv_table.store(
                self.position.key(),
                best_move.expect("raised alpha implies a best move"),
            );
        }

        alpha
    }

    /// Searches captures until the position is quiet, so the horizon never
    /// lands mid-exchange.
    fn quiescence(&mut self, mut alpha: Score, beta: Score) -> Score {
        if self.nodes & (POLL_INTERVAL - 1) == 0 {
            self.check_limits();
        }
        if self.stopped {
            return Score::DRAW;
        }
        self.nodes += 1;

        if self.position.is_repetition() || self.position.halfmove_clock() >= 100 {
            return Score::DRAW;
        }

        let stand_pat = Evaluator::new(&self.position).eval();
        if self.position.ply() > MAX_DEPTH - 1 {
            return stand_pat;
        }

        // The side to move may decline every capture
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let moves = self.position.generate_captures();
        let picker = MovePicker::new(moves, |mv| self.capture_score(mv));

        let old_alpha = alpha;
        let mut best_move = None;
        let mut legal = 0;

        for (mv, _) in picker {
            if !self.position.make_move(mv) {
                continue;
            }
            legal += 1;
            let score = -self.quiescence(-beta, -alpha);
            self.position.undo_move();

            if self.stopped {
                return Score::DRAW;
            }

            if score > alpha {
                if score >= beta {
                    if legal == 1 {
                        self.fail_high_first += 1;
                    }
                    self.fail_high += 1;
                    return beta;
                }
                alpha = score;
                best_move = Some(mv);
            }
        }

        if alpha != old_alpha {
            self.pv_table.store(
                self.position.key(),
                best_move.expect("raised alpha implies a best move"),
            );
        }

        alpha
    }

    /// Ordering score for the full move list.
    fn order_score(&self, mv: Move, pv_move: Option<Move>, ply: usize) -> i32 {
        if pv_move == Some(mv) {
            return PV_MOVE_SCORE;
        }
        if mv.is_capture() || mv.is_en_passant() {
            return self.capture_score(mv);
        }
        if self.killers[0][ply] == Some(mv) {
            return FIRST_KILLER_SCORE;
        }
        if self.killers[1][ply] == Some(mv) {
            return SECOND_KILLER_SCORE;
        }

        let piece = self
            .position
            .piece_at(mv.from())
            .expect("generated move has a piece to move");
        self.history[piece.index()][mv.to().index()]
    }

    /// MVV-LVA score for a capture.
    fn capture_score(&self, mv: Move) -> i32 {
        let victim = match mv.captured() {
            Some(victim) => victim.kind(),
            // En passant: pawn takes pawn
            None => crate::board::PieceKind::Pawn,
        };
        let attacker = self
            .position
            .piece_at(mv.from())
            .expect("generated move has a piece to move")
            .kind();

        mvv_lva(victim, attacker) + CAPTURE_BONUS
    }

    /// Sets the stop flag once any hard limit is exceeded.
    fn check_limits(&mut self) {
        if self.config.starttime.elapsed() >= self.config.hard_timeout
            || self.nodes >= self.config.max_nodes
            || !self.is_searching.load(Ordering::Relaxed)
        {
            self.stopped = true;
        }
    }

    /// Walks cached best moves from the root to recover the principal
    /// variation, validating each against the actual legal moves.
    fn pv_line(&mut self, depth: usize) -> Vec<Move> {
        let mut line = Vec::with_capacity(depth);

        while line.len() < depth {
            let Some(mv) = self.pv_table.probe(self.position.key()) else {
                break;
            };
            if self.position.move_exists(mv) && self.position.make_move(mv) {
                line.push(mv);
            } else {
                break;
            }
        }

        for _ in 0..line.len() {
            self.position.undo_move();
        }

        line
    }

    /// Prints one `info` line for the depth just completed.
    fn send_info(&self) {
        let elapsed = self.config.starttime.elapsed();
        let info = UciInfo::new()
            .depth(self.result.depth)
            .score(self.result.score.into_uci())
            .nodes(self.nodes)
            .nps((self.nodes as f32 / elapsed.as_secs_f32()).trunc())
            .time(elapsed.as_millis())
            .pv(self.result.pv.iter().map(|mv| mv.to_string()));
        let response = UciResponse::<String>::Info(Box::new(info));
        println!("{response}");

        // Fraction of beta cutoffs that came from the first move tried; a
        // low value means move ordering is underperforming
        if self.fail_high > 0 {
            let ordering = self.fail_high_first as f32 / self.fail_high as f32;
            let info = UciInfo::new().string(format!("ordering {ordering:.2}"));
            let response = UciResponse::<String>::Info(Box::new(info));
            println!("{response}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_to_depth(fen: &str, depth: usize) -> SearchResult {
        let position = Position::from_fen(fen).unwrap();
        let config = SearchConfig {
            max_depth: depth,
            ..Default::default()
        };
        Search::new(position, config, Arc::new(AtomicBool::new(true))).start()
    }

    fn ensure_is_mate_in(fen: &str, depth: usize, moves: i32) -> SearchResult {
        let result = search_to_depth(fen, depth);
        assert!(
            result.score.is_mate(),
            "expected mate in {moves} on {fen}, got {}",
            result.score
        );
        assert_eq!(result.score.moves_to_mate(), moves, "wrong mate distance on {fen}");
        result
    }

    #[test]
    fn test_mate_in_1() {
        // Back-rank mate with the queen
        let result = ensure_is_mate_in("k7/8/KQ6/8/8/8/8/8 w - - 0 1", 4, 1);
        assert_eq!(result.bestmove.unwrap().to_string(), "b6b7");

        // Back-rank mate with the rook
        ensure_is_mate_in("6k1/5ppp/8/8/8/8/8/3R2K1 w - - 0 1", 4, 1);
    }

    #[test]
    fn test_mate_in_2() {
        // Two-rook ladder
        ensure_is_mate_in("7k/8/8/8/8/8/R7/1R5K w - - 0 1", 6, 2);
    }

    #[test]
    fn test_mated_side_sees_it_coming() {
        // Black to move; whatever Black plays, Rb8 is mate
        let result = search_to_depth("7k/R6p/8/8/8/8/8/1R4K1 b - - 0 1", 4);
        assert!(result.score.is_mate());
        assert_eq!(result.score.moves_to_mate(), -1);
    }

    #[test]
    fn test_stalemate_scores_zero() {
        // Black to move has no moves and is not in check
        let result = search_to_depth("k7/8/1Q6/8/8/8/8/7K b - - 0 1", 4);
        assert_eq!(result.score, Score::DRAW);
        assert!(result.bestmove.is_none());
    }

    #[test]
    fn test_finds_the_hanging_queen() {
        let result = search_to_depth("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", 3);
        assert_eq!(result.bestmove.unwrap().to_string(), "e4d5");
    }

    #[test]
    fn test_node_cap_stops_the_search() {
        let position = Position::default();
        let config = SearchConfig {
            max_nodes: 5000,
            ..Default::default()
        };
        let result = Search::new(position, config, Arc::new(AtomicBool::new(true))).start();

        // The fallback move is seeded before any limit applies
        assert!(result.bestmove.is_some());
        assert!(result.nodes <= 5000 + POLL_INTERVAL);
    }

    #[test]
    fn test_deeper_searches_stay_legal() {
        let fen = crate::utils::FEN_KIWIPETE;
        let mut last_nodes = 0;

        for depth in 1..=4 {
            let result = search_to_depth(fen, depth);

            // The reported best move is always one of the legal moves
            let best = result.bestmove.expect("position has legal moves");
            let mut position = Position::from_fen(fen).unwrap();
            assert!(
                position.move_exists(best),
                "{best} is not legal in {fen} (depth {depth})"
            );

            // Deepening only ever grows the tree
            assert!(result.nodes >= last_nodes, "node count shrank at depth {depth}");
            last_nodes = result.nodes;
        }
    }

    #[test]
    fn test_search_is_deterministic() {
        let a = search_to_depth(crate::utils::FEN_KIWIPETE, 4);
        let b = search_to_depth(crate::utils::FEN_KIWIPETE, 4);
        assert_eq!(a.bestmove, b.bestmove);
        assert_eq!(a.score, b.score);
        assert_eq!(a.nodes, b.nodes);
    }
}
