/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::board::{Move, ZobristKey};

/// One cached best move, tagged with the full key of the position it
/// belongs to.
#[derive(Debug, Clone, Copy)]
struct PvEntry {
    key: ZobristKey,
    mv: Move,
}

/// A direct-mapped cache of best moves, keyed by position hash.
///
/// Collisions overwrite unconditionally; newer search results are worth more
/// than older ones, and a stale hit is filtered out by the key comparison on
/// probe. Probes can still return a move from a key-colliding position, so
/// callers validate the move before trusting it.
#[derive(Debug)]
pub struct PvTable {
    entries: Vec<Option<PvEntry>>,
}

impl PvTable {
    /// Default capacity, in entries.
    const DEFAULT_CAPACITY: usize = 1 << 17;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
        }
    }

    /// Drops every cached move.
    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Records `mv` as the best move found in the position hashing to `key`.
    #[inline(always)]
    pub fn store(&mut self, key: ZobristKey, mv: Move) {
        let index = key.inner() as usize % self.entries.len();
        self.entries[index] = Some(PvEntry { key, mv });
    }

    /// The cached best move for `key`, unless the slot was claimed by a
    /// different position.
    #[inline(always)]
    pub fn probe(&self, key: ZobristKey) -> Option<Move> {
        let index = key.inner() as usize % self.entries.len();
        self.entries[index]
            .filter(|entry| entry.key == key)
            .map(|entry| entry.mv)
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, Square};

    #[test]
    fn test_store_and_probe() {
        let pos = Position::default();
        let mv = pos.generate_all_moves()[0];

        let mut table = PvTable::with_capacity(16);
        assert_eq!(table.probe(pos.key()), None);

        table.store(pos.key(), mv);
        assert_eq!(table.probe(pos.key()), Some(mv));

        table.clear();
        assert_eq!(table.probe(pos.key()), None);
    }

    #[test]
    fn test_colliding_keys_do_not_alias() {
        // Capacity 1 forces every key into the same slot
        let mut table = PvTable::with_capacity(1);
        let mv = Move::new(Square::E1, Square::D1, None, None, Move::QUIET);

        let mut a = ZobristKey::default();
        a.hash_side();
        let mut b = ZobristKey::default();
        b.hash_ep_file(0);

        table.store(a, mv);
        assert_eq!(table.probe(a), Some(mv));
        assert_eq!(table.probe(b), None);

        // The newer entry evicts the older one
        table.store(b, mv);
        assert_eq!(table.probe(a), None);
        assert_eq!(table.probe(b), Some(mv));
    }
}
