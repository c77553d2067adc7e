// Commands that mutate game state.
//
// Every change to a `GameState` is a `GameCommand` applied by the single
// reducer `GameState::apply_command` (in `state.rs`). Outside code never
// edits the maps directly.
//
// The full flow for a player action:
//   UI key press -> `IntentQueue` (intent.rs) -> `GameSession::tick`
//   (session.rs) runs an action's check -> the action enqueues a
//   `GameCommand` on the `UpdateQueue` (event.rs) -> the queue is flushed
//   once per tick into a new snapshot.
//
// Current commands:
// - `AllocateNode` / `DeallocateNode`: take or release one node, with the
//   fog/reachability/accessibility bookkeeping that follows.
// - `ProgressEra`: advance the exploration/optimization era cycle.
// - `SetCursor` / `MoveCursor`: move the UI cursor the interact intent
//   acts on.
//
// The reducer itself does not validate. Validation lives in the action
// layer (`action.rs`), which checks before enqueueing, and again when
// `UpdateQueue::flush` re-checks each command against the state it is about
// to apply to. The reducer only treats allocating twice and releasing the
// origin as no-ops.
//
// See also: `state.rs` for the reducer, `event.rs` for the queue and the
// events each command emits.

use crate::types::{Direction, HexCoord};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCommand {
    AllocateNode { location: HexCoord },
    DeallocateNode { location: HexCoord },
    ProgressEra,
    SetCursor { location: Option<HexCoord> },
    /// Step the cursor to a neighbor. A missing cursor starts at the origin.
    MoveCursor { direction: Direction },
}
