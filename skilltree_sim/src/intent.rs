// Player intents: named inputs collected between ticks.
//
// The UI translates raw key events into `IntentName` presses and releases
// and pushes them into an `IntentQueue`. Once per tick the session calls
// `take_tick()`, which reports which intents are held (`active`), which were
// pressed since the last tick (`new`), and which were released (`ended`).
// A press and release inside one tick shows up in both `new` and `ended`
// but not in `active`, so quick taps are never lost.
//
// Only `new` intents drive the game. Pan and toggle intents are carried for
// the UI and ignored by the core.
//
// See also: `session.rs` for the mapping from intents to actions.

use crate::types::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntentName {
    PanNorth,
    PanSouth,
    PanWest,
    PanEast,
    MoveCursorWest,
    MoveCursorEast,
    MoveCursorNorthwest,
    MoveCursorNortheast,
    MoveCursorSouthwest,
    MoveCursorSoutheast,
    InteractWithNode,
    MaybeProgressNextEra,
    ToggleStrategicView,
    ToggleSidebar,
}

impl IntentName {
    /// The cursor step for a `MoveCursor*` intent.
    pub fn cursor_direction(self) -> Option<Direction> {
        match self {
            IntentName::MoveCursorWest => Some(Direction::West),
            IntentName::MoveCursorEast => Some(Direction::East),
            IntentName::MoveCursorNorthwest => Some(Direction::Northwest),
            IntentName::MoveCursorNortheast => Some(Direction::Northeast),
            IntentName::MoveCursorSouthwest => Some(Direction::Southwest),
            IntentName::MoveCursorSoutheast => Some(Direction::Southeast),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerIntentState {
    pub active: BTreeSet<IntentName>,
    pub new: BTreeSet<IntentName>,
    pub ended: BTreeSet<IntentName>,
}

#[derive(Clone, Debug, Default)]
pub struct IntentQueue {
    held: BTreeSet<IntentName>,
    pressed: BTreeSet<IntentName>,
    released: BTreeSet<IntentName>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, intent: IntentName) {
        // Key repeat delivers presses for keys already held.
        if self.held.insert(intent) {
            self.pressed.insert(intent);
        }
    }

    pub fn release(&mut self, intent: IntentName) {
        if self.held.remove(&intent) {
            self.released.insert(intent);
        }
    }

    /// Intent state for the tick that just ended. Resets `new`/`ended`.
    pub fn take_tick(&mut self) -> PlayerIntentState {
        PlayerIntentState {
            active: self.held.clone(),
            new: std::mem::take(&mut self.pressed),
            ended: std::mem::take(&mut self.released),
        }
    }
}
