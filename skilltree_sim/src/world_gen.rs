// Lazily generated world: node contents and locks for every coordinate.
//
// `WorldGen` owns the seed, the two factories, and one `LazyMap` per kind of
// generated data. Lookups generate on first access and are cached forever,
// so the infinite lattice costs memory only where the player has looked.
// `prewarm` fills many coordinates at once, generating the missing entries
// on the rayon pool and inserting them on the calling thread (the caches are
// not `Sync`; the factories are).
//
// A single `WorldGen` is shared by every `GameState` snapshot through `Rc`.
// It is transient: saves store the seed and rebuild it on load.
//
// See also: `contents.rs`, `lock.rs` for the factories, `status.rs` for the
// floods that prewarm newly revealed nodes.

use crate::config::{DEFAULT_SEED, GameConfig};
use crate::contents::{ContentsFactory, NodeContents};
use crate::lazy_map::LazyMap;
use crate::lock::{LockData, LockFactory};
use crate::types::HexCoord;
use rayon::prelude::*;

#[derive(Debug)]
pub struct WorldGen {
    seed: u32,
    contents_factory: ContentsFactory,
    lock_factory: LockFactory,
    contents: LazyMap<HexCoord, NodeContents>,
    locks: LazyMap<HexCoord, Option<LockData>>,
}

impl WorldGen {
    pub fn new(seed: u32, config: &GameConfig) -> Self {
        Self {
            seed,
            contents_factory: ContentsFactory::new(config.contents.clone()),
            lock_factory: LockFactory::new(config.locks.clone()),
            contents: LazyMap::new(),
            locks: LazyMap::new(),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn node_contents(&self, location: HexCoord) -> NodeContents {
        self.contents
            .get_or_compute(location, |c| self.contents_factory.create(self.seed, *c))
    }

    pub fn lock(&self, location: HexCoord) -> Option<LockData> {
        self.locks
            .get_or_compute(location, |c| self.lock_factory.create(self.seed, *c))
    }

    /// Make sure `location` is generated, without returning anything.
    pub fn precompute(&self, location: HexCoord) {
        self.node_contents(location);
        self.lock(location);
    }

    /// Generate every missing entry among `locations`.
    pub fn prewarm(&self, locations: &[HexCoord]) {
        let missing: Vec<HexCoord> = locations
            .iter()
            .copied()
            .filter(|c| !self.contents.contains(c) || !self.locks.contains(c))
            .collect();
        if missing.is_empty() {
            return;
        }

        let seed = self.seed;
        let contents_factory = &self.contents_factory;
        let lock_factory = &self.lock_factory;
        let generated: Vec<(HexCoord, NodeContents, Option<LockData>)> = missing
            .par_iter()
            .map(|&c| {
                (
                    c,
                    contents_factory.create(seed, c),
                    lock_factory.create(seed, c),
                )
            })
            .collect();

        log::debug!("prewarmed {} world-gen entries", generated.len());
        let mut contents = Vec::with_capacity(generated.len());
        let mut locks = Vec::with_capacity(generated.len());
        for (c, node, lock) in generated {
            contents.push((c, node));
            locks.push((c, lock));
        }
        self.contents.extend(contents);
        self.locks.extend(locks);
    }

    /// Every generated coordinate that has a lock, in coordinate order.
    pub fn known_locks(&self) -> Vec<(HexCoord, LockData)> {
        self.locks
            .entries()
            .into_iter()
            .filter_map(|(c, lock)| lock.map(|l| (c, l)))
            .collect()
    }

    /// Number of coordinates with generated contents.
    pub fn generated_len(&self) -> usize {
        self.contents.len()
    }
}

/// Placeholder for deserialized states; replaced by
/// `GameState::rebuild_transient_state`.
impl Default for WorldGen {
    fn default() -> Self {
        WorldGen::new(DEFAULT_SEED, &GameConfig::default())
    }
}
