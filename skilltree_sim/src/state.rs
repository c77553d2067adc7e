// Core game state and the command reducer.
//
// `GameState` is one immutable-by-convention snapshot of the game. It owns
// the player's save data (`PlayerSave`: allocations, bookmarks, explored
// nodes, era, deallocation points), UI state the core cares about
// (`PlayerUi`: the cursor), and the derived maps (`ComputedState`: fog of
// war, reachability, accessibility, lock statuses). The world itself is a
// shared, lazily generated `WorldGen` behind an `Rc`, so cloning a snapshot
// copies the player's maps but never the world.
//
// All mutation goes through `apply_command`, the single reducer. It is only
// called by `UpdateQueue::flush` on a freshly cloned snapshot, which is what
// makes snapshots copy-on-write.
//
// ## Allocation bookkeeping
//
// Allocating node `c`:
//   1. marks it taken (and bookmarked + explored in an exploration era),
//   2. raises `c` to `Visible`,
//   3. raises everything within `available_distance` to `Available` and
//      marks it reachable,
//   4. reveals everything within `fog_of_war_distance` to `Unreachable`,
//      flooding around locks rather than through them,
//   5. refreshes lock statuses for every generated lock,
//   6. in an exploration era, marks nodes within `accessible_distance`
//      accessible.
// Fog only ever rises. Deallocating does not re-fog anything; it only
// clears reachability for nodes no longer next to a taken node.
//
// ## Save/load
//
// `GameState` derives `Serialize`/`Deserialize`. The derived maps, the
// topology and the `WorldGen` are `#[serde(skip)]` and rebuilt by
// `rebuild_transient_state()`. `to_json()` / `from_json()` handle the full
// cycle.
//
// See also: `status.rs` for the flood helpers, `event.rs` for the queue that
// calls the reducer, `action.rs` for the checks that guard it.
//
// **Critical constraint: determinism.** All maps are `BTreeMap`s keyed by
// `HexCoord`. Floods iterate in BFS order from sorted sources.

use crate::command::GameCommand;
use crate::config::GameConfig;
use crate::event::GameEventKind;
use crate::hex::HexTopology;
use crate::pathfinding;
use crate::types::*;
use crate::world_gen::WorldGen;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Player save
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSave {
    #[serde(with = "coord_map")]
    pub allocation_status_map: BTreeMap<HexCoord, NodeTakenStatus>,
    #[serde(with = "coord_map")]
    pub bookmarked_status_map: BTreeMap<HexCoord, NodeBookmarkedStatus>,
    #[serde(with = "coord_map")]
    pub explored_status_map: BTreeMap<HexCoord, NodeExploredStatus>,
    pub current_era: Era,
    pub deallocation_points: DeallocationPoints,
}

impl PlayerSave {
    pub fn is_taken(&self, c: HexCoord) -> bool {
        self.allocation_status_map.get(&c).is_some_and(|s| s.taken)
    }

    pub fn is_bookmarked(&self, c: HexCoord) -> bool {
        self.bookmarked_status_map.get(&c).is_some_and(|s| s.bookmarked)
    }

    pub fn is_explored(&self, c: HexCoord) -> bool {
        self.explored_status_map.get(&c).is_some_and(|s| s.explored)
    }

    pub fn taken_nodes(&self) -> BTreeSet<HexCoord> {
        self.allocation_status_map
            .iter()
            .filter(|(_, s)| s.taken)
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn explored_nodes(&self) -> BTreeSet<HexCoord> {
        self.explored_status_map
            .iter()
            .filter(|(_, s)| s.explored)
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn taken_count(&self) -> usize {
        self.allocation_status_map.values().filter(|s| s.taken).count()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUi {
    pub cursored_node: Option<HexCoord>,
}

// ---------------------------------------------------------------------------
// Computed (derived) state
// ---------------------------------------------------------------------------

/// Maps derived from the player save and the world. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedState {
    pub fog_of_war_status_map: BTreeMap<HexCoord, FogOfWarStatus>,
    pub reachable_status_map: BTreeMap<HexCoord, NodeReachableStatus>,
    pub accessible_status_map: BTreeMap<HexCoord, NodeAccessibleStatus>,
    pub lock_status_map: BTreeMap<HexCoord, LockStatus>,
}

impl ComputedState {
    pub fn fog(&self, c: HexCoord) -> FogOfWarStatus {
        self.fog_of_war_status_map.get(&c).copied().unwrap_or_default()
    }

    pub fn is_reachable(&self, c: HexCoord) -> bool {
        self.reachable_status_map.get(&c).is_some_and(|s| s.reachable)
    }

    pub fn is_accessible(&self, c: HexCoord) -> bool {
        self.accessible_status_map.get(&c).is_some_and(|s| s.accessible)
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Number of flushes applied so far.
    pub tick: u64,
    /// Bumped by every flush that applied at least one command.
    pub revision: u64,
    pub seed: u32,
    pub config: GameConfig,
    pub save: PlayerSave,
    pub ui: PlayerUi,

    #[serde(skip)]
    pub computed: ComputedState,
    #[serde(skip)]
    pub(crate) topology: HexTopology,
    /// Lazily generated world, shared by every snapshot cloned from this one.
    #[serde(skip)]
    pub(crate) world_gen: Rc<WorldGen>,
}

impl GameState {
    /// A fresh game: the origin taken and the world revealed around it.
    pub fn new(seed: u32, config: GameConfig) -> Self {
        let mut save = PlayerSave::default();
        save.allocation_status_map.insert(
            HexCoord::ORIGIN,
            NodeTakenStatus {
                taken: true,
                previously_taken: false,
            },
        );
        save.explored_status_map
            .insert(HexCoord::ORIGIN, NodeExploredStatus { explored: true });

        let mut state = Self {
            tick: 0,
            revision: 0,
            seed,
            topology: HexTopology::from_config(&config),
            world_gen: Rc::new(WorldGen::new(seed, &config)),
            config,
            save,
            ui: PlayerUi::default(),
            computed: ComputedState::default(),
        };
        state.recompute_all();
        state
    }

    pub fn world_gen(&self) -> &WorldGen {
        &self.world_gen
    }

    pub fn topology(&self) -> &HexTopology {
        &self.topology
    }

    /// Rebuild all transient (`#[serde(skip)]`) fields after
    /// deserialization: topology and world from config + seed, then every
    /// derived map from the player save.
    pub fn rebuild_transient_state(&mut self) {
        self.topology = HexTopology::from_config(&self.config);
        self.world_gen = Rc::new(WorldGen::new(self.seed, &self.config));
        self.computed = ComputedState::default();
        self.recompute_all();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut state: GameState = serde_json::from_str(json)?;
        state.rebuild_transient_state();
        Ok(state)
    }

    /// Lock status at `c`: the computed status if known, otherwise the
    /// generated lock's own status. `None` if `c` has no lock.
    pub fn lock_status(&self, c: HexCoord) -> Option<LockStatus> {
        if let Some(status) = self.computed.lock_status_map.get(&c) {
            return Some(*status);
        }
        self.world_gen.lock(c).map(|l| l.lock_status)
    }

    /// True if a lock at `c` currently blocks allocation and flooding.
    pub fn lock_blocks(&self, c: HexCoord) -> bool {
        self.lock_status(c).is_some_and(LockStatus::blocks)
    }

    /// Allocation points still unspent, or `None` when unlimited.
    ///
    /// Points granted up to the current era index, minus every taken node
    /// other than the origin.
    pub fn allocation_points_remaining(&self) -> Option<u32> {
        let granted = self
            .config
            .cumulative_era_points(self.save.current_era.index)?;
        let spent = self.save.taken_count().saturating_sub(1) as u32;
        Some(granted.saturating_sub(spent))
    }

    // -----------------------------------------------------------------------
    // Reducer
    // -----------------------------------------------------------------------

    /// Apply one command in place and return the events it produced.
    pub fn apply_command(&mut self, command: &GameCommand) -> Vec<GameEventKind> {
        match command {
            GameCommand::AllocateNode { location } => self.allocate(*location),
            GameCommand::DeallocateNode { location } => self.deallocate(*location),
            GameCommand::ProgressEra => self.progress_era(),
            GameCommand::SetCursor { location } => {
                self.ui.cursored_node = *location;
                vec![GameEventKind::CursorMoved {
                    location: *location,
                }]
            }
            GameCommand::MoveCursor { direction } => {
                let from = self.ui.cursored_node.unwrap_or(HexCoord::ORIGIN);
                let to = self.topology.neighbor(from, *direction).unwrap_or(from);
                self.ui.cursored_node = Some(to);
                vec![GameEventKind::CursorMoved { location: Some(to) }]
            }
        }
    }

    fn allocate(&mut self, c: HexCoord) -> Vec<GameEventKind> {
        if self.save.is_taken(c) {
            return Vec::new();
        }
        let entry = self.save.allocation_status_map.entry(c).or_default();
        entry.taken = true;

        let exploring = self.save.current_era.kind == EraKind::A;
        if exploring {
            self.save
                .bookmarked_status_map
                .insert(c, NodeBookmarkedStatus { bookmarked: true });
            self.save
                .explored_status_map
                .insert(c, NodeExploredStatus { explored: true });
        }

        let revealed = self.flow_from_taken(c);
        if exploring {
            self.mark_accessible_from(c);
        }
        log::info!("allocated {c} ({revealed} nodes revealed)");

        let mut events = vec![GameEventKind::NodeAllocated { location: c }];
        if revealed > 0 {
            events.push(GameEventKind::NodesRevealed { count: revealed });
        }
        events
    }

    fn deallocate(&mut self, c: HexCoord) -> Vec<GameEventKind> {
        if c.is_origin() || !self.save.is_taken(c) {
            return Vec::new();
        }
        self.save.allocation_status_map.insert(
            c,
            NodeTakenStatus {
                taken: false,
                previously_taken: true,
            },
        );
        self.save.bookmarked_status_map.remove(&c);
        if self.save.current_era.kind == EraKind::B {
            let points = &mut self.save.deallocation_points;
            points.remaining = points.remaining.saturating_sub(1);
        }
        self.unflow_reachable_around(c);
        log::info!("deallocated {c}");
        vec![GameEventKind::NodeDeallocated { location: c }]
    }

    fn progress_era(&mut self) -> Vec<GameEventKind> {
        let leaving = self.save.current_era;
        let entering = leaving.next();

        if leaving.kind == EraKind::A {
            let taken = self.save.taken_nodes();
            self.save
                .bookmarked_status_map
                .retain(|c, _| !taken.contains(c));
        }
        if entering.kind == EraKind::B {
            let provided = self.config.deallocation_points_per_era;
            self.save.deallocation_points = DeallocationPoints {
                provided,
                remaining: provided,
            };
        }
        self.save.current_era = entering;

        let revealed = self.reflood();
        log::info!("era {leaving} -> {entering}");

        let mut events = vec![GameEventKind::EraChanged { era: entering }];
        if revealed > 0 {
            events.push(GameEventKind::NodesRevealed { count: revealed });
        }
        events
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Check the structural invariants of the snapshot.
    ///
    /// - the origin is taken,
    /// - taken nodes form one connected group containing the origin,
    /// - every taken node is reachable and `Visible`,
    /// - every reachable node is at least `Available`,
    /// - allocations beyond the origin fit the era's allocation budget,
    /// - no more deallocation points remain than were provided.
    pub fn check_invariants(&self) -> Result<(), String> {
        if !self.save.is_taken(HexCoord::ORIGIN) {
            return Err("origin is not taken".to_string());
        }
        let taken = self.save.taken_nodes();
        if !pathfinding::all_connected(&taken, HexCoord::ORIGIN) {
            return Err("taken nodes are not connected to the origin".to_string());
        }
        for c in &taken {
            if !self.computed.is_reachable(*c) {
                return Err(format!("taken node {c} is not reachable"));
            }
            if self.computed.fog(*c) != FogOfWarStatus::Visible {
                return Err(format!(
                    "taken node {c} has fog {:?}",
                    self.computed.fog(*c)
                ));
            }
        }
        for (c, status) in &self.computed.reachable_status_map {
            if status.reachable && self.computed.fog(*c) < FogOfWarStatus::Available {
                return Err(format!("reachable node {c} is still fogged"));
            }
        }
        let spent = taken.len().saturating_sub(1) as u64;
        if let Some(granted) = self
            .config
            .cumulative_era_points(self.save.current_era.index)
        {
            if spent > u64::from(granted) {
                return Err(format!(
                    "{spent} allocation points spent, only {granted} granted"
                ));
            }
        }
        let points = self.save.deallocation_points;
        if points.remaining > points.provided {
            return Err(format!(
                "{} deallocation points remaining, only {} provided",
                points.remaining, points.provided
            ));
        }
        Ok(())
    }
}
