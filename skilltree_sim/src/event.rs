// Update batching and game events.
//
// This file defines two related but distinct concepts:
// - `UpdateQueue`: the FIFO of `GameCommand`s waiting to be applied. Actions
//   enqueue into it during a tick; `flush` applies the whole batch as one
//   state transition.
// - `GameEvent`: what happened, emitted as output for the UI / event log.
//
// `flush` is copy-on-write: it clones the current snapshot once, applies
// every queued command in enqueue order (each command sees the result of
// the previous one), bumps `tick`, bumps `revision` if anything was applied,
// and hands back the new snapshot. The old snapshot is left untouched, so
// observers can compare `revision`s to detect change.
//
// Actions check against the snapshot from the start of the tick, so a batch
// can hold commands that only conflict with each other. Before applying a
// command, `flush` re-runs its check (`action::recheck`) on the working
// copy. A command that no longer passes is dropped with a `CommandRejected`
// event and a warning; it does not count as applied.
//
// See also: `command.rs` for the commands, `state.rs` for the reducer,
// `session.rs` which flushes once per tick.
//
// **Critical constraint: determinism.** Commands apply strictly in
// `sequence` order.

use crate::action;
use crate::command::GameCommand;
use crate::state::GameState;
use crate::types::{Era, HexCoord};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Update queue
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueuedUpdate {
    /// Monotonic enqueue order.
    pub sequence: u64,
    pub command: GameCommand,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateQueue {
    pending: VecDeque<QueuedUpdate>,
    next_sequence: u64,
}

/// Output of `UpdateQueue::flush`.
#[derive(Debug)]
pub struct FlushResult {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    /// Number of commands that passed their re-check and were applied.
    pub applied: usize,
    /// Number of commands dropped because their check no longer passed.
    pub rejected: usize,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, command: GameCommand) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.push_back(QueuedUpdate { sequence, command });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending commands, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &GameCommand> {
        self.pending.iter().map(|u| &u.command)
    }

    /// Apply every pending command to a copy of `state` as one transition.
    pub fn flush(&mut self, state: &GameState) -> FlushResult {
        let mut next = state.clone();
        next.tick += 1;
        let tick = next.tick;
        let mut applied = 0;
        let mut rejected = 0;
        let mut events = Vec::new();
        for update in self.pending.drain(..) {
            if let Some(reason) = action::recheck(&update.command, &next) {
                log::warn!(
                    "dropping update #{} {:?} at tick {tick}: {reason}",
                    update.sequence,
                    update.command
                );
                rejected += 1;
                events.push(GameEvent {
                    tick,
                    kind: GameEventKind::CommandRejected {
                        command: update.command,
                        reason,
                    },
                });
                continue;
            }
            applied += 1;
            events.extend(
                next.apply_command(&update.command)
                    .into_iter()
                    .map(|kind| GameEvent { tick, kind }),
            );
        }
        if applied > 0 {
            next.revision += 1;
        }
        if applied + rejected > 0 {
            log::debug!(
                "flushed {applied} updates ({rejected} rejected) at tick {tick} ({} events)",
                events.len()
            );
        }
        FlushResult {
            state: next,
            events,
            applied,
            rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// Events (output)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub tick: u64,
    pub kind: GameEventKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventKind {
    NodeAllocated { location: HexCoord },
    NodeDeallocated { location: HexCoord },
    /// Nodes that left `Hidden` because of the preceding command.
    NodesRevealed { count: usize },
    EraChanged { era: Era },
    CursorMoved { location: Option<HexCoord> },
    /// A queued command failed its check against the state it would have
    /// applied to.
    CommandRejected { command: GameCommand, reason: String },
}
