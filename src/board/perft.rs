/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Instant;

use super::position::Position;

/// Counts the leaf nodes of the legal move tree to `depth`.
///
/// Exercises generation, execution, and the legality filter together; any
/// discrepancy against published node counts pins down a move-handling bug.
pub fn perft(position: &mut Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for mv in position.generate_all_moves() {
        if position.make_move(mv) {
            nodes += perft(position, depth - 1);
            position.undo_move();
        }
    }
    nodes
}

/// Runs [`perft`] and prints the total with timing and throughput.
pub fn print_perft(position: &mut Position, depth: usize) -> u64 {
    let now = Instant::now();
    let nodes = perft(position, depth);
    let elapsed = now.elapsed();

    let nps = nodes as f64 / elapsed.as_secs_f64();
    println!(
        "perft({depth}): {nodes} nodes in {:.3}s ({:.0} nodes/sec)",
        elapsed.as_secs_f64(),
        nps
    );
    nodes
}

/// Prints the node count below each root move, then the total.
///
/// Comparing the per-move subtotals against another engine's isolates which
/// root move hides a bug.
pub fn splitperft(position: &mut Position, depth: usize) -> u64 {
    let mut total = 0;
    for mv in position.generate_all_moves() {
        if position.make_move(mv) {
            let nodes = perft(position, depth.saturating_sub(1));
            position.undo_move();
            println!("{mv}: {nodes}");
            total += nodes;
        }
    }
    println!("\n{total}");
    total
}
