/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use sable::{perft, Position, FEN_KIWIPETE, FEN_STARTPOS};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let mut position = Position::from_fen(fen).unwrap();
    let nodes = perft(&mut position, depth);
    assert_eq!(nodes, expected, "PERFT({depth}) failed on {fen}");
}

#[cfg(test)]
mod startpos_perft {
    use super::*;

    #[test]
    fn test_startpos_perft_1() {
        test_perft_fen_nodes(1, FEN_STARTPOS, 20);
    }
    #[test]
    fn test_startpos_perft_2() {
        test_perft_fen_nodes(2, FEN_STARTPOS, 400);
    }
    #[test]
    fn test_startpos_perft_3() {
        test_perft_fen_nodes(3, FEN_STARTPOS, 8_902);
    }
    #[test]
    fn test_startpos_perft_4() {
        test_perft_fen_nodes(4, FEN_STARTPOS, 197_281);
    }
}

#[cfg(test)]
mod kiwipete_perft {
    use super::*;

    #[test]
    fn test_kiwipete_perft_1() {
        test_perft_fen_nodes(1, FEN_KIWIPETE, 48);
    }
    #[test]
    fn test_kiwipete_perft_2() {
        test_perft_fen_nodes(2, FEN_KIWIPETE, 2_039);
    }
    #[test]
    fn test_kiwipete_perft_3() {
        test_perft_fen_nodes(3, FEN_KIWIPETE, 97_862);
    }
}

#[cfg(test)]
mod promotion_perft {
    use super::*;

    const FEN_PROMOTIONS: &str = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";

    #[test]
    fn test_promotion_perft_1() {
        test_perft_fen_nodes(1, FEN_PROMOTIONS, 24);
    }
    #[test]
    fn test_promotion_perft_2() {
        test_perft_fen_nodes(2, FEN_PROMOTIONS, 496);
    }
    #[test]
    fn test_promotion_perft_3() {
        test_perft_fen_nodes(3, FEN_PROMOTIONS, 9_483);
    }
    #[test]
    fn test_promotion_perft_4() {
        test_perft_fen_nodes(4, FEN_PROMOTIONS, 182_838);
    }
}

/// Positions that stress en passant pins, castling through attacks, and
/// underpromotion checks.
#[cfg(test)]
mod tricky_perft {
    use super::*;

    #[test]
    fn test_endgame_perft() {
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
        test_perft_fen_nodes(1, fen, 14);
        test_perft_fen_nodes(2, fen, 191);
        test_perft_fen_nodes(3, fen, 2_812);
        test_perft_fen_nodes(4, fen, 43_238);
    }

    #[test]
    fn test_mirrored_promotion_perft() {
        let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
        test_perft_fen_nodes(1, fen, 6);
        test_perft_fen_nodes(2, fen, 264);
        test_perft_fen_nodes(3, fen, 9_467);
    }

    #[test]
    fn test_buggy_engine_catcher_perft() {
        let fen = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
        test_perft_fen_nodes(1, fen, 44);
        test_perft_fen_nodes(2, fen, 1_486);
        test_perft_fen_nodes(3, fen, 62_379);
    }

    #[test]
    fn test_steven_edwards_perft() {
        let fen = "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";
        test_perft_fen_nodes(1, fen, 46);
        test_perft_fen_nodes(2, fen, 2_079);
        test_perft_fen_nodes(3, fen, 89_890);
    }
}
