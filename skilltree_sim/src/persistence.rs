// Save/load of player progress.
//
// What gets persisted is a `SavedGame`: the world seed, the config, the
// player save (allocations, bookmarks, explored nodes, era, deallocation
// points) and the UI cursor. Everything else (world contents, locks, fog,
// reachability, accessibility) is rebuilt from those on load, so the save
// stays small and never disagrees with world generation.
//
// Where the JSON goes is a `SaveStore`: `MemoryStore` for tests and
// embedders, `FileStore` for a single save file on disk. Stores deal in
// strings; (de)serialization lives here.
//
// There is no format version field. A save written by an incompatible build
// fails to parse and `restore_or_new` falls back to a fresh game. The same
// happens to a save that parses but describes an impossible game (origin not
// taken, taken nodes split apart, points overspent): `into_state` runs
// `GameState::check_invariants` on the rebuilt snapshot.
//
// See also: `state.rs` for `GameState::rebuild_transient_state`,
// `session.rs` for `GameSession::save` / `load_or_new`.

use crate::config::GameConfig;
use crate::error::PersistError;
use crate::state::{GameState, PlayerSave, PlayerUi};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedGame {
    pub seed: u32,
    pub config: GameConfig,
    pub player_save: PlayerSave,
    pub player_ui: PlayerUi,
}

impl SavedGame {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            seed: state.seed,
            config: state.config.clone(),
            player_save: state.save.clone(),
            player_ui: state.ui.clone(),
        }
    }

    /// A playable snapshot with every derived map rebuilt, or
    /// `PersistError::Inconsistent` if the rebuilt game breaks an invariant.
    pub fn into_state(self) -> Result<GameState, PersistError> {
        let mut state = GameState::new(self.seed, self.config);
        state.save = self.player_save;
        state.ui = self.player_ui;
        state.rebuild_transient_state();
        state.check_invariants().map_err(PersistError::Inconsistent)?;
        Ok(state)
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a saved game.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let saved: SavedGame = serde_json::from_str(json)?;
        saved.config.validate()?;
        Ok(saved)
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

pub trait SaveStore {
    /// The stored JSON, or `None` if nothing has been saved.
    fn load(&self) -> Result<Option<String>, PersistError>;
    fn store(&mut self, json: &str) -> Result<(), PersistError>;
    fn clear(&mut self) -> Result<(), PersistError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(json: impl Into<String>) -> Self {
        Self {
            data: Some(json.into()),
        }
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, PersistError> {
        Ok(self.data.clone())
    }

    fn store(&mut self, json: &str) -> Result<(), PersistError> {
        self.data = Some(json.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        self.data = None;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SaveStore for FileStore {
    fn load(&self) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, json: &str) -> Result<(), PersistError> {
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Save / restore
// ---------------------------------------------------------------------------

pub fn save_state(store: &mut dyn SaveStore, state: &GameState) -> Result<(), PersistError> {
    let json = SavedGame::from_state(state).to_json()?;
    store.store(&json)?;
    log::info!(
        "saved game ({} nodes taken, era {})",
        state.save.taken_count(),
        state.save.current_era
    );
    Ok(())
}

/// Load the stored game, or start a fresh one if there is none or it cannot
/// be read. Never fails; problems are logged.
pub fn restore_or_new(store: &dyn SaveStore, seed: u32, config: GameConfig) -> GameState {
    let restored = match store.load() {
        Ok(Some(json)) => SavedGame::from_json(&json).and_then(SavedGame::into_state),
        Ok(None) => {
            log::info!("no save found, starting a new game");
            return GameState::new(seed, config);
        }
        Err(e) => Err(e),
    };
    match restored {
        Ok(state) => {
            log::info!(
                "loaded save (seed={}, {} nodes taken)",
                state.seed,
                state.save.taken_count()
            );
            state
        }
        Err(e) => {
            log::warn!("failed to load save, starting a new game: {e}");
            GameState::new(seed, config)
        }
    }
}
