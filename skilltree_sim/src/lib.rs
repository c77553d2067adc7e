// skilltree_sim — procedurally generated hex-grid skill tree.
//
// This crate contains all game logic for the skill tree: an infinite hex
// lattice whose node contents and locks are generated from a seed on demand,
// the player's allocations on it, the fog of war they push back, and the
// era cycle that alternates exploration with optimization. It has no UI
// dependencies; a frontend holds a `GameSession`, feeds it intents, and
// renders `NodeView`s.
//
// Module overview:
// - `types.rs`:       HexCoord, Direction, attributes, fog/lock/era enums, status records.
// - `hex.rs`:         HexTopology — lattice adjacency (lateral, optionally vertical).
// - `pathfinding.rs`: Layered BFS floods, all-shortest-paths search, connectivity checks.
// - `config.rs`:      GameConfig — distances, era budgets, lock and content parameters.
// - `contents.rs`:    NodeContents + ContentsFactory (weighted decision tree).
// - `lock.rs`:        LockData + LockFactory.
// - `lazy_map.rs`:    Append-only memoizing map.
// - `world_gen.rs`:   WorldGen — lazily generated, shared world data.
// - `state.rs`:       GameState snapshot and the command reducer.
// - `status.rs`:      Fog-of-war / reachability / accessibility floods.
// - `command.rs`:     GameCommand — all state mutations.
// - `event.rs`:       UpdateQueue (copy-on-write batching) + GameEvents.
// - `action.rs`:      Checked player actions (allocate, deallocate, next era).
// - `intent.rs`:      IntentQueue — key presses collected per tick.
// - `session.rs`:     GameSession — snapshot + queues, ticked by the frontend.
// - `view.rs`:        NodeView — what one hex cell discloses.
// - `stats.rs`:       Per-attribute totals over taken nodes.
// - `persistence.rs`: SavedGame + SaveStore (memory, file).
// - `error.rs`:       Parse, config and persistence errors.
// - `prng`:           Re-exported from `skilltree_prng` — squirrel3 hashing and weighted rolls.
//
// **Critical constraint: determinism.** World generation is a pure function
// of `(seed, coordinate, config)`, built on the squirrel3 hash. No system
// time, no OS entropy, no `HashMap` iteration. Use `BTreeMap` for anything
// whose order is observable.

pub mod action;
pub mod command;
pub mod config;
pub mod contents;
pub mod error;
pub mod event;
pub mod hex;
pub mod intent;
pub mod lazy_map;
pub mod lock;
pub mod pathfinding;
pub mod persistence;
pub use skilltree_prng as prng;
pub mod session;
pub mod state;
pub mod stats;
mod status;
pub mod types;
pub mod view;
pub mod world_gen;
