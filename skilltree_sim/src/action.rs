// Player actions: checked wrappers around `GameCommand`s.
//
// An `Action` pairs a pure precondition (`check`) with the command it
// enqueues. `run` checks against the current snapshot and enqueues only on
// success; `enqueue_action` skips the up-front check (tests, replays), though
// the re-check at flush time still applies. The result of a failed check is
// an ordinary value the UI can show, never an error.
//
// Checks see the snapshot as of the start of the tick, so two actions run in
// the same tick can each pass against it and still conflict (two releases
// that together split the tree, two allocations against the last point).
// `UpdateQueue::flush` therefore re-runs each command's check through
// `recheck` against the working copy, after the commands queued before it
// have applied, and drops the ones that no longer pass.
//
// See also: `command.rs` for the commands, `session.rs` which runs actions
// from intents and from its public methods.

use crate::command::GameCommand;
use crate::event::UpdateQueue;
use crate::hex;
use crate::pathfinding;
use crate::state::GameState;
use crate::types::{EraKind, HexCoord};
use std::fmt;

pub trait Action {
    type Input;
    type Check: ActionCheck;

    fn check(input: &Self::Input, state: &GameState) -> Self::Check;

    fn enqueue_action(input: &Self::Input, queue: &mut UpdateQueue);

    fn check_action(input: &Self::Input, state: &GameState) -> bool {
        Self::check(input, state).is_yes()
    }

    /// Check, then enqueue if allowed. Returns whether anything was enqueued.
    fn run(input: &Self::Input, state: &GameState, queue: &mut UpdateQueue) -> bool {
        let check = Self::check(input, state);
        if !check.is_yes() {
            log::debug!("action refused: {check}");
            return false;
        }
        Self::enqueue_action(input, queue);
        true
    }
}

pub trait ActionCheck: fmt::Display {
    fn is_yes(&self) -> bool;
}

/// Re-run the check behind a queued command against `state`. Returns the
/// refusal, or `None` if the command may apply. Cursor and era commands
/// always pass.
pub fn recheck(command: &GameCommand, state: &GameState) -> Option<String> {
    match command {
        GameCommand::AllocateNode { location } => refusal::<AllocateNodeAction>(location, state),
        GameCommand::DeallocateNode { location } => {
            refusal::<DeallocateNodeAction>(location, state)
        }
        GameCommand::ProgressEra
        | GameCommand::SetCursor { .. }
        | GameCommand::MoveCursor { .. } => None,
    }
}

fn refusal<A: Action>(input: &A::Input, state: &GameState) -> Option<String> {
    let check = A::check(input, state);
    (!check.is_yes()).then(|| check.to_string())
}

// ---------------------------------------------------------------------------
// Allocate
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocateCheck {
    Yes,
    AlreadyAllocated,
    NotConnected,
    Locked,
    NotEnoughPoints,
}

impl AllocateCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            AllocateCheck::Yes => "yes",
            AllocateCheck::AlreadyAllocated => "already allocated",
            AllocateCheck::NotConnected => "not connected",
            AllocateCheck::Locked => "locked",
            AllocateCheck::NotEnoughPoints => "not enough points",
        }
    }
}

impl fmt::Display for AllocateCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ActionCheck for AllocateCheck {
    fn is_yes(&self) -> bool {
        *self == AllocateCheck::Yes
    }
}

pub struct AllocateNodeAction;

impl Action for AllocateNodeAction {
    type Input = HexCoord;
    type Check = AllocateCheck;

    fn check(location: &HexCoord, state: &GameState) -> AllocateCheck {
        let location = *location;
        if state.save.is_taken(location) {
            return AllocateCheck::AlreadyAllocated;
        }
        if state.allocation_points_remaining() == Some(0) {
            return AllocateCheck::NotEnoughPoints;
        }
        let connected = hex::lateral_neighbors(location)
            .iter()
            .any(|(_, n)| state.save.is_taken(*n));
        if !connected {
            return AllocateCheck::NotConnected;
        }
        if state.lock_blocks(location) {
            return AllocateCheck::Locked;
        }
        AllocateCheck::Yes
    }

    fn enqueue_action(location: &HexCoord, queue: &mut UpdateQueue) {
        queue.enqueue(GameCommand::AllocateNode {
            location: *location,
        });
    }
}

// ---------------------------------------------------------------------------
// Deallocate
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeallocateCheck {
    Yes,
    NotAllocated,
    IsOrigin,
    /// In an exploration era only nodes taken during that era can be undone.
    NotBookmarked,
    NoDeallocationPoints,
    /// Releasing the node would split the taken nodes.
    WouldDisconnect,
}

impl DeallocateCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            DeallocateCheck::Yes => "yes",
            DeallocateCheck::NotAllocated => "not allocated",
            DeallocateCheck::IsOrigin => "is origin",
            DeallocateCheck::NotBookmarked => "not bookmarked",
            DeallocateCheck::NoDeallocationPoints => "no deallocation points",
            DeallocateCheck::WouldDisconnect => "would disconnect",
        }
    }
}

impl fmt::Display for DeallocateCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ActionCheck for DeallocateCheck {
    fn is_yes(&self) -> bool {
        *self == DeallocateCheck::Yes
    }
}

pub struct DeallocateNodeAction;

impl Action for DeallocateNodeAction {
    type Input = HexCoord;
    type Check = DeallocateCheck;

    fn check(location: &HexCoord, state: &GameState) -> DeallocateCheck {
        let location = *location;
        if location.is_origin() {
            return DeallocateCheck::IsOrigin;
        }
        if !state.save.is_taken(location) {
            return DeallocateCheck::NotAllocated;
        }
        match state.save.current_era.kind {
            EraKind::A if !state.save.is_bookmarked(location) => {
                return DeallocateCheck::NotBookmarked;
            }
            EraKind::B if state.save.deallocation_points.remaining == 0 => {
                return DeallocateCheck::NoDeallocationPoints;
            }
            _ => {}
        }
        let taken = state.save.taken_nodes();
        if !pathfinding::stays_connected_without(&taken, location) {
            return DeallocateCheck::WouldDisconnect;
        }
        DeallocateCheck::Yes
    }

    fn enqueue_action(location: &HexCoord, queue: &mut UpdateQueue) {
        queue.enqueue(GameCommand::DeallocateNode {
            location: *location,
        });
    }
}

// ---------------------------------------------------------------------------
// Progress era
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlwaysYes;

impl fmt::Display for AlwaysYes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("yes")
    }
}

impl ActionCheck for AlwaysYes {
    fn is_yes(&self) -> bool {
        true
    }
}

pub struct ProgressNextEraAction;

impl Action for ProgressNextEraAction {
    type Input = ();
    type Check = AlwaysYes;

    fn check(_: &(), _: &GameState) -> AlwaysYes {
        AlwaysYes
    }

    fn enqueue_action(_: &(), queue: &mut UpdateQueue) {
        queue.enqueue(GameCommand::ProgressEra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_SEED, GameConfig};

    fn c(x: i32, y: i32) -> HexCoord {
        HexCoord::new(x, y, 0)
    }

    fn fresh() -> GameState {
        GameState::new(DEFAULT_SEED, GameConfig::default())
    }

    /// Run one action and flush, returning the new snapshot.
    fn step(state: &GameState, f: impl FnOnce(&GameState, &mut UpdateQueue) -> bool) -> GameState {
        let mut queue = UpdateQueue::new();
        assert!(f(state, &mut queue));
        queue.flush(state).state
    }

    #[test]
    fn allocate_first_ring_succeeds() {
        let state = fresh();
        assert_eq!(AllocateNodeAction::check(&c(1, 0), &state), AllocateCheck::Yes);
        let mut queue = UpdateQueue::new();
        assert!(AllocateNodeAction::run(&c(1, 0), &state, &mut queue));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn allocate_far_node_is_not_connected() {
        let state = fresh();
        let mut queue = UpdateQueue::new();
        assert_eq!(
            AllocateNodeAction::check(&c(5, 5), &state),
            AllocateCheck::NotConnected
        );
        assert!(!AllocateNodeAction::run(&c(5, 5), &state, &mut queue));
        assert!(queue.is_empty());
    }

    #[test]
    fn allocate_twice_is_already_allocated() {
        let state = step(&fresh(), |s, q| AllocateNodeAction::run(&c(1, 0), s, q));
        assert_eq!(
            AllocateNodeAction::check(&c(1, 0), &state),
            AllocateCheck::AlreadyAllocated
        );
        assert_eq!(
            AllocateNodeAction::check(&HexCoord::ORIGIN, &state),
            AllocateCheck::AlreadyAllocated
        );
    }

    #[test]
    fn allocate_locked_node_is_refused() {
        // (3, 0) is locked at the default seed; walk up to it first.
        let mut state = fresh();
        for location in [c(1, 0), c(2, 0)] {
            state = step(&state, |s, q| AllocateNodeAction::run(&location, s, q));
        }
        assert_eq!(AllocateNodeAction::check(&c(3, 0), &state), AllocateCheck::Locked);
        assert_eq!(AllocateCheck::Locked.to_string(), "locked");
    }

    #[test]
    fn allocate_without_points() {
        let mut config = GameConfig::default();
        config.era_allocation_points = Some(vec![1]);
        let state = GameState::new(DEFAULT_SEED, config);
        let state = step(&state, |s, q| AllocateNodeAction::run(&c(1, 0), s, q));
        assert_eq!(
            AllocateNodeAction::check(&c(2, 0), &state),
            AllocateCheck::NotEnoughPoints
        );
    }

    #[test]
    fn deallocate_checks() {
        let state = fresh();
        assert_eq!(
            DeallocateNodeAction::check(&HexCoord::ORIGIN, &state),
            DeallocateCheck::IsOrigin
        );
        assert_eq!(
            DeallocateNodeAction::check(&c(1, 0), &state),
            DeallocateCheck::NotAllocated
        );

        let mut state = state;
        for location in [c(1, 0), c(2, 0)] {
            state = step(&state, |s, q| AllocateNodeAction::run(&location, s, q));
        }
        assert_eq!(
            DeallocateNodeAction::check(&c(1, 0), &state),
            DeallocateCheck::WouldDisconnect
        );
        assert_eq!(DeallocateNodeAction::check(&c(2, 0), &state), DeallocateCheck::Yes);
    }

    #[test]
    fn deallocate_in_exploration_needs_bookmark() {
        let mut state = fresh();
        state = step(&state, |s, q| AllocateNodeAction::run(&c(1, 0), s, q));
        // Leaving era A clears the bookmark, entering the next A keeps it cleared.
        state = step(&state, |s, q| ProgressNextEraAction::run(&(), s, q));
        state = step(&state, |s, q| ProgressNextEraAction::run(&(), s, q));
        assert_eq!(
            DeallocateNodeAction::check(&c(1, 0), &state),
            DeallocateCheck::NotBookmarked
        );
    }

    #[test]
    fn deallocate_in_optimization_spends_points() {
        let mut config = GameConfig::default();
        config.deallocation_points_per_era = 1;
        let mut state = GameState::new(DEFAULT_SEED, config);
        for location in [c(1, 0), c(-1, 0)] {
            state = step(&state, |s, q| AllocateNodeAction::run(&location, s, q));
        }
        state = step(&state, |s, q| ProgressNextEraAction::run(&(), s, q));
        state = step(&state, |s, q| DeallocateNodeAction::run(&c(1, 0), s, q));
        assert_eq!(state.save.deallocation_points.remaining, 0);
        assert_eq!(
            DeallocateNodeAction::check(&c(-1, 0), &state),
            DeallocateCheck::NoDeallocationPoints
        );
    }

    #[test]
    fn recheck_sees_commands_applied_before_it() {
        let mut working = step(&fresh(), |s, q| AllocateNodeAction::run(&c(1, 0), s, q));
        let release = GameCommand::DeallocateNode { location: c(1, 0) };
        assert_eq!(recheck(&release, &working), None);

        working.apply_command(&GameCommand::AllocateNode { location: c(2, 0) });
        assert_eq!(recheck(&release, &working).as_deref(), Some("would disconnect"));
        assert_eq!(
            recheck(&GameCommand::AllocateNode { location: c(2, 0) }, &working).as_deref(),
            Some("already allocated")
        );
        assert_eq!(recheck(&GameCommand::ProgressEra, &working), None);
    }

    #[test]
    fn vertical_neighbors_do_not_connect_allocations() {
        let mut config = GameConfig::default();
        config.vertical_neighbors = true;
        let state = GameState::new(DEFAULT_SEED, config);
        // Directly above and below the origin, but no lateral taken neighbor.
        assert_eq!(
            AllocateNodeAction::check(&HexCoord::new(0, 0, 1), &state),
            AllocateCheck::NotConnected
        );
        assert_eq!(
            AllocateNodeAction::check(&HexCoord::new(0, 0, -1), &state),
            AllocateCheck::NotConnected
        );
    }

    #[test]
    fn progress_era_is_always_allowed() {
        assert!(ProgressNextEraAction::check_action(&(), &fresh()));
    }
}
