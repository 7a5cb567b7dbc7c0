/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! A classical chess engine built on a 12x10 mailbox board, with a
//! hand-written evaluation and an iterative-deepening alpha-beta search.

/// The board representation, move generation, and move execution.
pub mod board;

/// Commands that can be sent to the engine.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Move ordering.
mod movepicker;

/// Piece-square tables.
mod psqt;

/// The best-move cache used to order searches and recover principal variations.
mod pvtable;

/// Search scores and the mate band.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Misc utility constants.
mod utils;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use movepicker::*;
pub use pvtable::*;
pub use score::*;
pub use search::*;
pub use utils::*;
