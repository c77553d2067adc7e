// Fog-of-war, reachability and accessibility floods.
//
// These are the `GameState` helpers the reducer calls after touching the
// player save. Each flood is a `within_distance` search (pathfinding.rs)
// computed up front against the current lock statuses, then written into the
// `ComputedState` maps:
//
// - `flow_from_taken(c)`: `c` becomes `Visible`; everything within
//   `available_distance` becomes `Available` and reachable; everything within
//   `fog_of_war_distance` (flooding around blocking locks, which are
//   themselves revealed) leaves `Hidden` for `Unreachable`. Returns how many
//   nodes left `Hidden`.
// - `mark_accessible_from(c)`: accessibility within `accessible_distance`,
//   locks blocking passage. Only called in exploration eras.
// - `unflow_reachable_around(c)`: after a deallocation, nodes near `c` with
//   no taken node within `available_distance` stop being reachable. Fog is
//   never lowered.
// - `reflood()`: clears reachability and floods again from every taken and
//   explored node, as era changes require.
// - `recompute_all()`: rebuild every map from the save (new game, load).
//
// Newly revealed nodes are prewarmed in one batch so their contents and locks
// are generated on the rayon pool instead of one lookup at a time.
//
// See also: `state.rs` for the reducer that calls these, `pathfinding.rs` for
// the searches, `world_gen.rs` for prewarming.
//
// **Critical constraint: determinism.** Floods are collected in BFS order
// before any map is written, and lock refreshes walk `known_locks()` in
// coordinate order.

use crate::pathfinding::{no_obstacles, within_distance};
use crate::state::{ComputedState, GameState};
use crate::types::*;

impl GameState {
    /// Rebuild every derived map from the player save.
    pub(crate) fn recompute_all(&mut self) {
        self.computed = ComputedState::default();
        self.reflood();
        if self.save.current_era.kind != EraKind::A {
            // Nodes explored in earlier exploration eras stay accessible.
            for c in self.save.explored_nodes() {
                self.mark_accessible_from(c);
            }
        }
    }

    /// Flood from every taken node and the fog disc of every explored node.
    /// Returns the number of nodes that left `Hidden`.
    pub(crate) fn reflood(&mut self) -> usize {
        self.computed.reachable_status_map.clear();
        let taken = self.save.taken_nodes();
        let mut revealed = 0;
        for &c in &taken {
            revealed += self.flow_from_taken(c);
        }
        for c in self.save.explored_nodes() {
            if !taken.contains(&c) {
                revealed += self.reveal_disc(c);
            }
        }
        if self.save.current_era.kind == EraKind::A {
            for c in self.save.explored_nodes().union(&taken) {
                self.mark_accessible_from(*c);
            }
        }
        self.refresh_lock_statuses();
        revealed
    }

    /// Bookkeeping for a node that has just been taken.
    pub(crate) fn flow_from_taken(&mut self, c: HexCoord) -> usize {
        self.computed
            .fog_of_war_status_map
            .entry(c)
            .or_default()
            .raise(FogOfWarStatus::Visible);
        self.flow_reachable_from(c);
        let revealed = self.reveal_disc(c);
        self.refresh_lock_statuses();
        revealed
    }

    fn flow_reachable_from(&mut self, c: HexCoord) {
        let near = within_distance(
            &self.topology,
            &[c],
            Some(self.config.available_distance),
            0,
            no_obstacles,
        );
        for n in near {
            self.computed
                .fog_of_war_status_map
                .entry(n)
                .or_default()
                .raise(FogOfWarStatus::Available);
            self.computed
                .reachable_status_map
                .insert(n, NodeReachableStatus { reachable: true });
        }
    }

    /// Raise everything within fog distance of `c` out of `Hidden`.
    fn reveal_disc(&mut self, c: HexCoord) -> usize {
        let disc = within_distance(
            &self.topology,
            &[c],
            Some(self.config.fog_of_war_distance),
            0,
            |n| self.lock_blocks(n),
        );
        let hidden: Vec<HexCoord> = disc
            .into_iter()
            .filter(|n| self.computed.fog(*n) == FogOfWarStatus::Hidden)
            .collect();
        if hidden.is_empty() {
            return 0;
        }
        self.world_gen().prewarm(&hidden);
        for n in &hidden {
            self.computed
                .fog_of_war_status_map
                .entry(*n)
                .or_default()
                .raise(FogOfWarStatus::Unreachable);
        }
        log::debug!("revealed {} nodes around {c}", hidden.len());
        hidden.len()
    }

    pub(crate) fn mark_accessible_from(&mut self, c: HexCoord) {
        let near = within_distance(
            &self.topology,
            &[c],
            Some(self.config.accessible_distance),
            0,
            |n| self.lock_blocks(n),
        );
        for n in near {
            self.computed
                .accessible_status_map
                .insert(n, NodeAccessibleStatus { accessible: true });
        }
    }

    /// Drop reachability for nodes near `c` that are no longer near any taken
    /// node.
    pub(crate) fn unflow_reachable_around(&mut self, c: HexCoord) {
        let distance = Some(self.config.available_distance);
        let near = within_distance(&self.topology, &[c], distance, 0, no_obstacles);
        for n in near {
            let still_reachable = within_distance(&self.topology, &[n], distance, 0, no_obstacles)
                .into_iter()
                .any(|m| self.save.is_taken(m));
            if !still_reachable {
                self.computed.reachable_status_map.remove(&n);
            }
        }
    }

    /// Copy the status of every generated lock into the computed map.
    /// Statuses already there are kept.
    fn refresh_lock_statuses(&mut self) {
        for (c, lock) in self.world_gen().known_locks() {
            self.computed
                .lock_status_map
                .entry(c)
                .or_insert(lock.lock_status);
        }
    }
}
