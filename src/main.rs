/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use sable::{Engine, EngineCommand};

fn main() {
    let mut engine = Engine::new();

    // Commands supplied as arguments execute before stdin is read, separated
    // by semicolons: `sable "position startpos; go depth 6"`
    let args = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    for input in args.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        match EngineCommand::from_str(input) {
            Ok(cmd) => engine.send_command(cmd),
            Err(e) => eprintln!("{e}"),
        }
    }

    if let Err(e) = engine.run() {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
    }
}
