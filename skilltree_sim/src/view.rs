// Read-only per-node view for the UI.
//
// `node_view` folds the save, the derived maps and the world into what one
// hex cell shows: its display status, lock, bookmark, and, when the player
// is allowed to see them, its contents. Contents are disclosed only for
// nodes whose fog disclosure is `Revealed` and that are accessible; fogged
// or out-of-reach nodes show at most their lock and a short text.
//
// Building a view may generate world data for coordinates the player can
// at least partly see (world generation is lazy), but never changes the
// snapshot. Obscured nodes generate nothing.

use crate::contents::NodeContents;
use crate::lock::LockData;
use crate::state::GameState;
use crate::types::{Disclosure, EraKind, HexCoord};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NodeDisplayStatus {
    /// Taken, or bookmarked during an exploration era.
    TakenOrMarked,
    Available,
    Unreachable,
    Hidden,
}

impl fmt::Display for NodeDisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeDisplayStatus::TakenOrMarked => "taken",
            NodeDisplayStatus::Available => "available",
            NodeDisplayStatus::Unreachable => "unreachable",
            NodeDisplayStatus::Hidden => "hidden",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub location: HexCoord,
    pub status: NodeDisplayStatus,
    pub locked: bool,
    pub bookmarked: bool,
    pub accessible: bool,
    pub lock: Option<LockData>,
    pub contents: Option<NodeContents>,
    pub short_text: String,
}

const ORIGIN_SHORT_TEXT: &str = "🚩";

pub fn node_view(state: &GameState, location: HexCoord) -> NodeView {
    let save = &state.save;
    let computed = &state.computed;
    let fog = computed.fog(location);
    let bookmarked = save.is_bookmarked(location);
    let accessible = computed.is_accessible(location);

    let status = if save.is_taken(location)
        || (save.current_era.kind == EraKind::A && bookmarked)
    {
        NodeDisplayStatus::TakenOrMarked
    } else if computed.is_reachable(location) {
        NodeDisplayStatus::Available
    } else if fog.disclosure() != Disclosure::Obscured {
        NodeDisplayStatus::Unreachable
    } else {
        NodeDisplayStatus::Hidden
    };

    let disclosure = fog.disclosure();
    let world = state.world_gen();
    let lock = match disclosure {
        Disclosure::Obscured => None,
        Disclosure::Hinted | Disclosure::Revealed => world.lock(location),
    };
    let node_contents = match disclosure {
        Disclosure::Obscured => None,
        Disclosure::Hinted | Disclosure::Revealed => Some(world.node_contents(location)),
    };
    let short_text = if location.is_origin() {
        ORIGIN_SHORT_TEXT.to_string()
    } else {
        node_contents.as_ref().map(short_text).unwrap_or_default()
    };
    let contents = node_contents.filter(|_| disclosure == Disclosure::Revealed && accessible);
    let locked = disclosure != Disclosure::Obscured && state.lock_blocks(location);

    NodeView {
        location,
        status,
        locked,
        bookmarked,
        accessible,
        lock,
        contents,
        short_text,
    }
}

/// Compact cell label: modifier and attribute symbols of the first line, the
/// second line's attribute if it differs, then `-<attribute>` for a spend
/// condition on its own line.
pub fn short_text(contents: &NodeContents) -> String {
    let mut text = String::new();
    if let Some(first) = contents.lines.first() {
        text.push_str(first.modifier.symbol());
        text.push_str(first.attribute.symbol());
        if let Some(second) = contents.lines.get(1) {
            if second.attribute != first.attribute {
                text.push_str(second.attribute.symbol());
            }
        }
    }
    if let Some(condition) = &contents.condition {
        text.push('\n');
        text.push('-');
        text.push_str(condition.attribute.symbol());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::GameCommand;
    use crate::config::{DEFAULT_SEED, GameConfig};
    use crate::contents::{NodeContentsCondition, NodeContentsLine};
    use crate::types::{Attribute, ConditionKind, Modifier};
    use smallvec::smallvec;

    fn c(x: i32, y: i32) -> HexCoord {
        HexCoord::new(x, y, 0)
    }

    #[test]
    fn origin_view() {
        let state = GameState::new(DEFAULT_SEED, GameConfig::default());
        let view = node_view(&state, HexCoord::ORIGIN);
        assert_eq!(view.status, NodeDisplayStatus::TakenOrMarked);
        assert_eq!(view.short_text, "🚩");
        assert!(!view.locked);
        assert_eq!(view.contents, Some(NodeContents::empty()));
    }

    #[test]
    fn statuses_by_distance() {
        let state = GameState::new(DEFAULT_SEED, GameConfig::default());
        assert_eq!(node_view(&state, c(1, 0)).status, NodeDisplayStatus::Available);
        assert_eq!(node_view(&state, c(2, 0)).status, NodeDisplayStatus::Unreachable);
        let far = node_view(&state, c(9, 9));
        assert_eq!(far.status, NodeDisplayStatus::Hidden);
        assert_eq!(far.contents, None);
        assert_eq!(far.lock, None);
        assert_eq!(far.short_text, "");
        assert!(!far.locked);
    }

    #[test]
    fn obscured_nodes_generate_nothing() {
        let state = GameState::new(DEFAULT_SEED, GameConfig::default());
        let before = state.world_gen().generated_len();
        node_view(&state, c(20, -20));
        node_view(&state, c(-15, 3));
        assert_eq!(state.world_gen().generated_len(), before);

        // A hinted node shows the label of its generated contents.
        let view = node_view(&state, c(2, 0));
        assert_eq!(
            view.short_text,
            short_text(&state.world_gen().node_contents(c(2, 0)))
        );
    }

    #[test]
    fn locked_node_shows_lock() {
        let state = GameState::new(DEFAULT_SEED, GameConfig::default());
        let view = node_view(&state, c(3, 0));
        assert!(view.locked);
        assert_eq!(
            view.lock.map(|l| l.short_text_target),
            Some("🔒".to_string())
        );
        // Hinted only: contents stay hidden.
        assert_eq!(view.contents, None);
    }

    #[test]
    fn contents_need_accessibility() {
        let mut state = GameState::new(DEFAULT_SEED, GameConfig::default());
        state.apply_command(&GameCommand::ProgressEra);
        state.apply_command(&GameCommand::AllocateNode { location: c(-1, 0) });
        // Within reach of the origin's exploration.
        let view = node_view(&state, c(-2, 0));
        assert_eq!(view.status, NodeDisplayStatus::Available);
        assert!(view.accessible);
        assert!(view.contents.is_some());

        // Revealed by an optimization-era allocation, never explored.
        let view = node_view(&state, c(-4, 0));
        assert_eq!(view.status, NodeDisplayStatus::Unreachable);
        assert!(!view.accessible);
        assert_eq!(view.contents, None);
    }

    #[test]
    fn short_text_forms() {
        let contents = NodeContents {
            lines: smallvec![
                NodeContentsLine {
                    attribute: Attribute::Red0,
                    modifier: Modifier::Flat,
                    amount: 22,
                },
                NodeContentsLine {
                    attribute: Attribute::Red2,
                    modifier: Modifier::Flat,
                    amount: 8,
                },
            ],
            condition: Some(NodeContentsCondition {
                kind: ConditionKind::Spend,
                attribute: Attribute::Red1,
                amount: 12,
            }),
        };
        assert_eq!(short_text(&contents), "+🔴🔵\n-🟢");
        assert_eq!(short_text(&NodeContents::empty()), "");
    }
}
