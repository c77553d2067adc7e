// Lock generation.
//
// A lock sits on a node and blocks both allocating it and flooding through
// it. Locks are rolled independently per coordinate from a dedicated hash
// (`squirrel3(seed + x + y + squirrel3(seed + x + z))`), so they never
// correlate with node contents. Frequency depends on the node's distance
// from the origin: none at all inside the lock-free radius, a reduced rate
// inside the starter area, and the full rate elsewhere (0.47 by default,
// just under the triangular-lattice site percolation threshold of 0.5, so
// the open cluster stays large but winding).
//
// Generated locks start `Ticking`; the lock status map in `ComputedState`
// is the authority for whether a lock currently blocks.

use crate::config::LockParams;
use crate::types::{HexCoord, LockStatus};
use serde::{Deserialize, Serialize};
use skilltree_prng::{squirrel3, INTMAX32};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockData {
    pub short_text_target: String,
    pub short_text_timer: String,
    pub lock_status: LockStatus,
}

#[derive(Clone, Debug)]
pub struct LockFactory {
    params: LockParams,
}

impl LockFactory {
    pub fn new(params: LockParams) -> Self {
        Self { params }
    }

    /// The lock roll for `location`, in [0, 1).
    pub fn roll(seed: u32, location: HexCoord) -> f64 {
        let (x, y, z) = (location.x as u32, location.y as u32, location.z as u32);
        let inner = squirrel3(seed.wrapping_add(x).wrapping_add(z));
        let id = squirrel3(seed.wrapping_add(x).wrapping_add(y).wrapping_add(inner));
        id as f64 / INTMAX32
    }

    /// Lock probability at `location` before rolling.
    pub fn frequency_at(&self, location: HexCoord) -> f64 {
        let d = location.taxicab_distance();
        if location.is_origin() || d <= self.params.lock_free_radius {
            0.0
        } else if d <= self.params.starter_area_radius {
            self.params.starter_area_frequency
        } else {
            self.params.frequency
        }
    }

    pub fn create(&self, seed: u32, location: HexCoord) -> Option<LockData> {
        if Self::roll(seed, location) >= self.frequency_at(location) {
            return None;
        }
        Some(LockData {
            short_text_target: self.params.short_text_target.clone(),
            short_text_timer: String::new(),
            lock_status: LockStatus::Ticking,
        })
    }
}
