// Core types shared across the skill-lattice simulation.
//
// Defines the lattice coordinate (`HexCoord`), the six lateral and two
// vertical adjacency directions, the node vocabulary (attributes, modifiers,
// lock and fog-of-war statuses, eras), and the small per-node status records
// stored in the player-save and computed maps. All types derive `Serialize`
// and `Deserialize` for save/load.
//
// Coordinate-keyed maps are `BTreeMap<HexCoord, _>` everywhere. JSON requires
// string map keys, so the `coord_map` serde adapter writes them with the
// canonical `"[x, y, z]"` key and parses it back on load.
//
// See also: `hex.rs` for neighbor enumeration, `state.rs` for the maps that
// use these records.
//
// **Critical constraint: determinism.** `HexCoord` orders lexicographically
// by `(x, y, z)`; every map iteration in the sim relies on that order.

use crate::error::ParseCoordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A node position on the layered hex lattice.
///
/// `x` and `y` are axial hex coordinates within a layer: `+x` is east, `+y`
/// is north-west, and `+x+y` is north-east. `z` selects the layer; layer 0
/// holds the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }

    /// Shift by `(dx, dy, dz)`, saturating at the edges of `i32`.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// Hex distance from the origin of this coordinate's layer, ignoring `z`.
    ///
    /// Treats `(x, y)` as the three cube components `(x, y, 0)`, normalizes
    /// by subtracting the smallest, and returns the largest remainder.
    pub fn taxicab_distance(self) -> u32 {
        let (a, b, c) = (self.x as i64, self.y as i64, 0i64);
        let min = a.min(b).min(c);
        (a - min).max(b - min).max(c - min) as u32
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

impl FromStr for HexCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordError {
            input: s.to_string(),
        };
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(err)?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<i32>());
        let (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        Ok(Self::new(x, y, z))
    }
}

/// Serde adapter for `BTreeMap<HexCoord, V>` that uses the `"[x, y, z]"`
/// string as the map key.
pub mod coord_map {
    use super::HexCoord;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<V, S>(map: &BTreeMap<HexCoord, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(k, v)| (k.to_string(), v)))
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<BTreeMap<HexCoord, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| k.parse::<HexCoord>().map(|c| (c, v)).map_err(D::Error::custom))
            .collect()
    }
}

/// Adjacency directions. The six lateral directions come first, in the order
/// neighbors are always enumerated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    East,
    West,
    Northwest,
    Southeast,
    Northeast,
    Southwest,
    Down,
    Up,
}

impl Direction {
    pub const LATERAL: [Direction; 6] = [
        Direction::East,
        Direction::West,
        Direction::Northwest,
        Direction::Southeast,
        Direction::Northeast,
        Direction::Southwest,
    ];

    /// `(dx, dy)` for lateral directions, `None` for `Up`/`Down`.
    pub fn lateral_offset(self) -> Option<(i32, i32)> {
        match self {
            Direction::East => Some((1, 0)),
            Direction::West => Some((-1, 0)),
            Direction::Northwest => Some((0, 1)),
            Direction::Southeast => Some((0, -1)),
            Direction::Northeast => Some((1, 1)),
            Direction::Southwest => Some((-1, -1)),
            Direction::Down | Direction::Up => None,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Northwest => Direction::Southeast,
            Direction::Southeast => Direction::Northwest,
            Direction::Northeast => Direction::Southwest,
            Direction::Southwest => Direction::Northeast,
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        }
    }
}

// ---------------------------------------------------------------------------
// Node vocabulary
// ---------------------------------------------------------------------------

/// The six resource attributes a node line can grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    Red0,
    Red1,
    Red2,
    Del0,
    Del1,
    Del2,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Red0,
        Attribute::Red1,
        Attribute::Red2,
        Attribute::Del0,
        Attribute::Del1,
        Attribute::Del2,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Attribute::Red0 => "🔴",
            Attribute::Red1 => "🟢",
            Attribute::Red2 => "🔵",
            Attribute::Del0 => "⚔️",
            Attribute::Del1 => "🛡",
            Attribute::Del2 => "✨",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Attribute::Red0 => "Red",
            Attribute::Red1 => "Green",
            Attribute::Red2 => "Blue",
            Attribute::Del0 => "Offense",
            Attribute::Del1 => "Defense",
            Attribute::Del2 => "Magic",
        }
    }
}

/// How a line's amount applies to its attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Modifier {
    /// Added directly.
    Flat,
    /// Percentage multiplier on the flat total.
    Increased,
}

impl Modifier {
    pub fn symbol(self) -> &'static str {
        match self {
            Modifier::Flat => "+",
            Modifier::Increased => "%",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Allocating the node consumes some of an attribute.
    Spend,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LockStatus {
    Closed,
    Ticking,
    Open,
}

impl LockStatus {
    /// Anything short of `Open` blocks allocation and BFS passage.
    pub fn blocks(self) -> bool {
        self != LockStatus::Open
    }
}

/// Per-node visibility, ordered from least to most visible.
///
/// Writes through `raise` only ever move a node up this order, which is how
/// the sim keeps fog from regressing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FogOfWarStatus {
    #[default]
    Hidden,
    Unreachable,
    Available,
    Visible,
}

impl FogOfWarStatus {
    /// Upgrade in place; returns true if the status changed.
    pub fn raise(&mut self, to: FogOfWarStatus) -> bool {
        if to > *self {
            *self = to;
            true
        } else {
            false
        }
    }

    pub fn disclosure(self) -> Disclosure {
        match self {
            FogOfWarStatus::Hidden => Disclosure::Obscured,
            FogOfWarStatus::Unreachable => Disclosure::Hinted,
            FogOfWarStatus::Available | FogOfWarStatus::Visible => Disclosure::Revealed,
        }
    }
}

/// How much of a node the UI may show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Disclosure {
    /// Nothing; the node is fogged.
    Obscured,
    /// Its existence and lock, but not its contents.
    Hinted,
    Revealed,
}

// ---------------------------------------------------------------------------
// Eras
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EraKind {
    /// Exploration: allocations also bookmark and explore nodes.
    A,
    /// Optimization: allocations only take nodes.
    B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Era {
    pub kind: EraKind,
    pub index: u32,
}

impl Era {
    pub const INITIAL: Era = Era {
        kind: EraKind::A,
        index: 0,
    };

    /// A -> B keeps the index; B -> A starts the next index.
    pub fn next(self) -> Era {
        match self.kind {
            EraKind::A => Era {
                kind: EraKind::B,
                index: self.index,
            },
            EraKind::B => Era {
                kind: EraKind::A,
                index: self.index + 1,
            },
        }
    }
}

impl Default for Era {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{}", self.kind, self.index)
    }
}

// ---------------------------------------------------------------------------
// Per-node status records
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTakenStatus {
    pub taken: bool,
    pub previously_taken: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBookmarkedStatus {
    pub bookmarked: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExploredStatus {
    pub explored: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReachableStatus {
    pub reachable: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAccessibleStatus {
    pub accessible: bool,
}

/// Budget for undoing allocations during an optimization era.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeallocationPoints {
    pub provided: u32,
    pub remaining: u32,
}
