/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use uci_parser::{UciCommand, UciResponse};

use crate::board::{print_perft, splitperft, Move, Position, Square};
use crate::cli::EngineCommand;
use crate::eval::Evaluator;
use crate::search::{Search, SearchConfig, SearchResult};
use crate::utils::BENCHMARK_FENS;

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: usize = 6;

/// The chess engine: a position, a command channel, and a search thread.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    position: Position,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Atomic flag to determine whether a search is currently running.
    is_searching: Arc<AtomicBool>,

    /// Handle to the currently-running search thread, if one exists.
    search_thread: Option<JoinHandle<SearchResult>>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            position: Position::default(),
            sender,
            receiver,
            is_searching: Arc::default(),
            search_thread: None,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Returns a string of all authors of this engine.
    pub fn authors(&self) -> String {
        env!("CARGO_PKG_AUTHORS").replace(':', ", ").to_string()
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // The receiver lives as long as the engine itself
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits
    /// on received commands.
    pub fn run(&mut self) -> Result<()> {
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err}");
            }
        });

        while let Ok(cmd) = self.receiver.recv() {
            match cmd {
                EngineCommand::Bench { depth } => self.bench(depth),

                EngineCommand::Display => println!("{}", self.position),

                EngineCommand::Eval => {
                    println!("{}", Evaluator::new(&self.position).eval());
                }

                EngineCommand::Fen => println!("{}", self.position.to_fen()),

                EngineCommand::Moves { square } => {
                    if let Err(e) = self.moves(square) {
                        eprintln!("Error: {e}");
                    }
                }

                EngineCommand::Perft { depth } => {
                    print_perft(&mut self.position.clone(), depth);
                }

                EngineCommand::Splitperft { depth } => {
                    splitperft(&mut self.position.clone(), depth);
                }

                EngineCommand::Exit { cleanup } => {
                    // If requested, await the completion of any ongoing searches
                    if cleanup {
                        self.stop_search();
                    } else {
                        self.set_is_searching(false);
                    }
                    break;
                }

                EngineCommand::Uci { cmd } => {
                    // Keep running, even on error
                    if let Err(e) = self.handle_uci_command(cmd) {
                        eprintln!("Error: {e}");
                    }
                }
            };
        }

        Ok(())
    }

    /// Handle the execution of a single [`UciCommand`].
    fn handle_uci_command(&mut self, uci: UciCommand) -> Result<()> {
        use UciCommand::*;
        match uci {
            Uci => self.uci(),

            IsReady => println!("{}", UciResponse::<&str>::ReadyOk),

            SetOption { name, value: _ } => {
                bail!("{} has no option named {name:?}", self.name())
            }

            UciNewGame => self.new_game(),

            UciCommand::Position { fen, moves } => self.position(fen, moves)?,

            Go(options) => {
                if let Some(depth) = options.perft {
                    splitperft(&mut self.position.clone(), depth as usize);
                    return Ok(());
                }

                self.search_thread = self.start_search(SearchConfig::new(options, &self.position));
            }

            Stop => self.set_is_searching(false),

            Quit => self.send_command(EngineCommand::Exit { cleanup: false }),

            _ => bail!(
                "{} does not support UCI command {uci:?}",
                env!("CARGO_PKG_NAME")
            ),
        }

        Ok(())
    }

    /// Execute the `bench` command: a fixed search on a series of positions.
    fn bench(&mut self, depth: Option<usize>) {
        let config = SearchConfig {
            max_depth: depth.unwrap_or(BENCH_DEPTH),
            ..Default::default()
        };

        let num_tests = BENCHMARK_FENS.len();
        let mut nodes = 0;

        for (i, fen) in BENCHMARK_FENS.iter().enumerate() {
            println!("Benchmark position {}/{}: {fen}", i + 1, num_tests);

            // Benchmark FENs are all well-formed
            self.position = fen.parse().unwrap();
            self.search_thread = self.start_search(config);

            if let Some(res) = self.stop_search() {
                nodes += res.nodes;
            }
        }

        let elapsed = config.starttime.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        println!("{nodes} nodes {nps} nps");

        self.new_game();
    }

    /// Execute the `moves` command, listing the legal moves available here.
    fn moves(&mut self, square: Option<String>) -> Result<()> {
        let from = square.as_deref().map(Square::from_algebraic).transpose()?;

        let mut position = self.position.clone();
        let mut legal = Vec::new();
        for mv in position.generate_all_moves() {
            if from.is_some_and(|sq| mv.from() != sq) {
                continue;
            }
            if position.make_move(mv) {
                position.undo_move();
                legal.push(mv.to_string());
            }
        }

        if legal.is_empty() {
            println!("(none)");
        } else {
            println!("{}", legal.join(", "));
        }

        Ok(())
    }

    /// Set the position to the supplied FEN string (defaults to the standard
    /// startpos if not supplied), then apply `moves` one-by-one.
    fn position<T: AsRef<str>>(
        &mut self,
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        if let Some(fen) = fen {
            self.position = fen.as_ref().parse()?;
        } else {
            self.position = Position::default();
        }

        for mv_str in moves {
            let mv = Move::from_uci(&self.position, mv_str.as_ref())?;
            if !self.position.make_move(mv) {
                bail!("move {mv} leaves the king in check");
            }
        }

        self.position.reset_ply();
        Ok(())
    }

    /// Resets the engine's internal game state, cancelling any ongoing search.
    fn new_game(&mut self) {
        self.set_is_searching(false);
        self.position = Position::default();
    }

    /// Sets the search flag to signal that the engine is starting/stopping a search.
    fn set_is_searching(&mut self, status: bool) {
        self.is_searching.store(status, Ordering::Relaxed);
    }

    /// Returns `true` if the engine is currently executing a search.
    fn is_searching(&self) -> bool {
        self.is_searching.load(Ordering::Relaxed)
    }

    /// Starts a search on the current position, given the parameters in `config`.
    fn start_search(&mut self, config: SearchConfig) -> Option<JoinHandle<SearchResult>> {
        // Cannot start a search if one is already running
        if self.is_searching() {
            eprintln!("A search is already running");
            return None;
        }
        self.set_is_searching(true);

        let position = self.position.clone();
        let is_searching = Arc::clone(&self.is_searching);

        let handle = thread::spawn(move || Search::new(position, config, is_searching).start());

        Some(handle)
    }

    /// Awaits the current search thread, blocking until it finishes and
    /// returning its result.
    fn stop_search(&mut self) -> Option<SearchResult> {
        let handle = self.search_thread.take()?;

        self.set_is_searching(false);

        let id = handle.thread().id();
        let Ok(res) = handle.join() else {
            eprintln!("Failed to join on thread {id:?}");
            return None;
        };

        Some(res)
    }

    /// Called when the engine receives the `uci` command: prints the
    /// engine's ID and readiness.
    fn uci(&self) {
        println!("id name {}\nid author {}\n", self.name(), self.authors());
        println!("{}", UciResponse::<&str>::UciOk)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Loops endlessly to await input via `stdin`, sending all
/// successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing UCI commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit { cleanup: false })
                .context("Failed to send 'quit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();
        if buf.is_empty() {
            continue;
        }

        // UCI commands take precedence, since that's the primary use case
        match UciCommand::new(buf) {
            Ok(cmd) => sender
                .send(EngineCommand::Uci { cmd })
                .context("Failed to send UCI command to engine")?,

            // If it's not a UCI command, check if it's an engine-specific command
            Err(_) => match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
                Ok(cmd) => sender
                    .send(cmd)
                    .context("Failed to send command to engine")?,

                Err(err) => eprintln!("{err}"),
            },
        }
    }
}
