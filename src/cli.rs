/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;
use uci_parser::UciCommand;

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND> | <UCI COMMAND>")
)]
pub enum EngineCommand {
    /// Run a fixed-depth search on each benchmark position, printing total node count and speed.
    Bench {
        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print the static evaluation of the current position.
    Eval,

    /// Quit the engine.
    Exit {
        /// If set, the engine will await the completion of any search threads before exiting.
        #[arg(short, long, default_value = "false")]
        cleanup: bool,
    },

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Show all legal moves in the current position, or only those from a specific square.
    Moves { square: Option<String> },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Wrapper over UCI commands sent to the engine.
    #[command(skip)]
    Uci { cmd: UciCommand },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;

    /// Attempt to parse an [`EngineCommand`] from a string.
    ///
    /// If this fails, it will attempt to parse the string as a [`UciCommand`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::try_parse_from(s.split_ascii_whitespace()) {
            Ok(cmd) => Ok(cmd),
            Err(e) => {
                if let Ok(cmd) = UciCommand::new(s) {
                    Ok(Self::Uci { cmd })
                } else {
                    Err(e)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_engine_commands() {
        assert!(matches!(
            "perft 5".parse(),
            Ok(EngineCommand::Perft { depth: 5 })
        ));
        assert!(matches!("d".parse(), Ok(EngineCommand::Display)));
        assert!(matches!(
            "bench --depth 3".parse(),
            Ok(EngineCommand::Bench { depth: Some(3) })
        ));
    }

    #[test]
    fn test_falls_back_to_uci() {
        assert!(matches!(
            "isready".parse(),
            Ok(EngineCommand::Uci {
                cmd: UciCommand::IsReady
            })
        ));
        assert!(matches!(
            "go depth 4".parse(),
            Ok(EngineCommand::Uci {
                cmd: UciCommand::Go(_)
            })
        ));
        assert!(matches!(
            "position startpos moves e2e4 e7e5".parse(),
            Ok(EngineCommand::Uci {
                cmd: UciCommand::Position { .. }
            })
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(EngineCommand::from_str("frobnicate").is_err());
    }
}
