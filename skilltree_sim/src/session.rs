// Game session: the current snapshot plus the queues that advance it.
//
// `GameSession` is what a frontend holds. It owns the current `GameState`,
// the `UpdateQueue` that actions enqueue into, and the `IntentQueue` that
// key events feed. One call to `tick()`:
//   1. takes the intents collected since the last tick,
//   2. turns each newly pressed intent into an action run against the
//      snapshot as of the start of the tick,
//   3. flushes the update queue into the next snapshot,
//   4. returns the events that flush produced.
//
// `allocate` / `deallocate` / `progress_era` run actions directly (mouse
// clicks, scripted play); their commands wait for the next `tick()` like
// intent-driven ones.
//
// Intent mapping:
// - `MoveCursor*` -> `MoveCursor` command.
// - `InteractWithNode` -> deallocate if the cursored node is taken,
//   otherwise allocate. Does nothing without a cursor.
// - `MaybeProgressNextEra` -> `ProgressEra`.
// - Pan / toggle intents belong to the UI and are ignored here.
//
// See also: `action.rs`, `intent.rs`, `event.rs`, `persistence.rs`.

use crate::action::{
    Action, AllocateCheck, AllocateNodeAction, DeallocateCheck, DeallocateNodeAction,
    ProgressNextEraAction,
};
use crate::command::GameCommand;
use crate::config::GameConfig;
use crate::error::PersistError;
use crate::event::{GameEvent, UpdateQueue};
use crate::intent::{IntentName, IntentQueue, PlayerIntentState};
use crate::pathfinding::{self, PathSearch};
use crate::persistence::{self, SaveStore};
use crate::state::GameState;
use crate::types::HexCoord;
use crate::view::{self, NodeView};

pub struct GameSession {
    state: GameState,
    updates: UpdateQueue,
    intents: IntentQueue,
}

impl GameSession {
    pub fn new(seed: u32, config: GameConfig) -> Self {
        Self::from_state(GameState::new(seed, config))
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            updates: UpdateQueue::new(),
            intents: IntentQueue::new(),
        }
    }

    /// Restore from `store`, or start fresh if there is no usable save.
    pub fn load_or_new(store: &dyn SaveStore, seed: u32, config: GameConfig) -> Self {
        Self::from_state(persistence::restore_or_new(store, seed, config))
    }

    pub fn save(&self, store: &mut dyn SaveStore) -> Result<(), PersistError> {
        persistence::save_state(store, &self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Commands enqueued for the next tick.
    pub fn pending_updates(&self) -> usize {
        self.updates.len()
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub fn allocate(&mut self, location: HexCoord) -> AllocateCheck {
        let check = AllocateNodeAction::check(&location, &self.state);
        if check == AllocateCheck::Yes {
            AllocateNodeAction::enqueue_action(&location, &mut self.updates);
        }
        check
    }

    pub fn deallocate(&mut self, location: HexCoord) -> DeallocateCheck {
        let check = DeallocateNodeAction::check(&location, &self.state);
        if check == DeallocateCheck::Yes {
            DeallocateNodeAction::enqueue_action(&location, &mut self.updates);
        }
        check
    }

    pub fn progress_era(&mut self) {
        ProgressNextEraAction::run(&(), &self.state, &mut self.updates);
    }

    // -----------------------------------------------------------------------
    // Intents and ticking
    // -----------------------------------------------------------------------

    pub fn press(&mut self, intent: IntentName) {
        self.intents.press(intent);
    }

    pub fn release(&mut self, intent: IntentName) {
        self.intents.release(intent);
    }

    /// Advance one tick and return the events it produced.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let intents = self.intents.take_tick();
        self.handle_intents(&intents);
        let result = self.updates.flush(&self.state);
        self.state = result.state;
        result.events
    }

    fn handle_intents(&mut self, intents: &PlayerIntentState) {
        for &intent in &intents.new {
            if let Some(direction) = intent.cursor_direction() {
                self.updates.enqueue(GameCommand::MoveCursor { direction });
                continue;
            }
            match intent {
                IntentName::InteractWithNode => self.interact(),
                IntentName::MaybeProgressNextEra => self.progress_era(),
                _ => {}
            }
        }
    }

    fn interact(&mut self) {
        let Some(location) = self.state.ui.cursored_node else {
            return;
        };
        if self.state.save.is_taken(location) {
            let check = self.deallocate(location);
            if check != DeallocateCheck::Yes {
                log::debug!("cannot deallocate {location}: {check}");
            }
        } else {
            let check = self.allocate(location);
            if check != AllocateCheck::Yes {
                log::debug!("cannot allocate {location}: {check}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every node on a shortest route from `target` back to the taken nodes,
    /// routing around blocking locks. Empty if there is no route within
    /// `path_search_limit` hops.
    pub fn highlight_path(&self, target: HexCoord) -> PathSearch {
        let state = &self.state;
        let taken = state.save.taken_nodes();
        pathfinding::bfs_all_paths(
            state.topology(),
            target,
            &taken,
            |c| state.lock_blocks(c),
            state.config.path_search_limit,
        )
    }

    pub fn node_view(&self, location: HexCoord) -> NodeView {
        view::node_view(&self.state, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SEED;
    use crate::event::GameEventKind;
    use crate::persistence::MemoryStore;

    fn c(x: i32, y: i32) -> HexCoord {
        HexCoord::new(x, y, 0)
    }

    fn session() -> GameSession {
        GameSession::new(DEFAULT_SEED, GameConfig::default())
    }

    #[test]
    fn allocate_applies_on_tick() {
        let mut s = session();
        assert_eq!(s.allocate(c(1, 0)), AllocateCheck::Yes);
        assert!(!s.state().save.is_taken(c(1, 0)));
        assert_eq!(s.pending_updates(), 1);
        let events = s.tick();
        assert!(s.state().save.is_taken(c(1, 0)));
        assert_eq!(
            events[0].kind,
            GameEventKind::NodeAllocated { location: c(1, 0) }
        );
    }

    #[test]
    fn refused_allocation_enqueues_nothing() {
        let mut s = session();
        let before = s.state().revision;
        assert_eq!(s.allocate(c(5, 5)), AllocateCheck::NotConnected);
        assert!(s.tick().is_empty());
        assert_eq!(s.state().revision, before);
        assert_eq!(s.state().save.taken_count(), 1);
    }

    #[test]
    fn interact_intent_toggles_allocation() {
        let mut s = session();
        s.press(IntentName::MoveCursorEast);
        s.release(IntentName::MoveCursorEast);
        s.tick();
        assert_eq!(s.state().ui.cursored_node, Some(c(1, 0)));

        s.press(IntentName::InteractWithNode);
        s.tick();
        assert!(s.state().save.is_taken(c(1, 0)));

        // Still held: no new press, nothing happens.
        s.tick();
        assert!(s.state().save.is_taken(c(1, 0)));

        s.release(IntentName::InteractWithNode);
        s.press(IntentName::InteractWithNode);
        s.tick();
        assert!(!s.state().save.is_taken(c(1, 0)));
    }

    #[test]
    fn interact_without_cursor_does_nothing() {
        let mut s = session();
        s.press(IntentName::InteractWithNode);
        s.tick();
        assert_eq!(s.state().save.taken_count(), 1);
    }

    #[test]
    fn era_intent() {
        let mut s = session();
        s.press(IntentName::MaybeProgressNextEra);
        let events = s.tick();
        assert!(matches!(events[0].kind, GameEventKind::EraChanged { .. }));
    }

    #[test]
    fn highlight_path_to_taken_nodes() {
        let s = session();
        let path = s.highlight_path(c(2, 0));
        assert_eq!(path.distance, Some(2));
        assert_eq!(
            path.nodes.into_iter().collect::<Vec<_>>(),
            vec![HexCoord::ORIGIN, c(1, 0), c(2, 0)]
        );

        // Two tied routes, through (0, -1) and through (1, 0).
        let path = s.highlight_path(c(1, -1));
        assert_eq!(path.distance, Some(2));
        assert_eq!(path.nodes.len(), 4);
        assert!(path.nodes.contains(&c(0, -1)));
        assert!(path.nodes.contains(&c(1, 0)));

        let origin = s.highlight_path(HexCoord::ORIGIN);
        assert_eq!(origin.distance, Some(0));
    }

    #[test]
    fn save_and_reload() {
        let mut s = session();
        s.allocate(c(1, 0));
        s.tick();
        let mut store = MemoryStore::new();
        s.save(&mut store).unwrap();
        let loaded = GameSession::load_or_new(&store, 1, GameConfig::default());
        assert_eq!(loaded.state().save, s.state().save);
    }
}
