// Node contents: what allocating a node grants, and the factory that rolls
// it from `(seed, coordinate)`.
//
// A node holds zero to two lines (`+22 🔴 (Red)`, `5% increased 🔵 (Blue)`)
// and optionally a spend condition. `ContentsFactory::create` walks a fixed
// decision tree of weighted rolls:
//
//   root:   Empty | NoSpend | Spend
//   lines:  Single | Double        (Spend = NoSpend lines + a condition)
//   line:   attribute, modifier, amount from the modifier's tier
//
// Each roll hashes its own seed derived from the world seed plus
// `location_seed(coordinate)`, so nodes are independent of each other and of
// generation order. Double-line nodes always use two distinct attributes.
//
// See also: `config.rs` for `ContentParams` (weights and amount tiers),
// `world_gen.rs` for the lazy cache that calls this factory.
//
// **Critical constraint: determinism.** `create` is a pure function of the
// seed, the coordinate and the config.

use crate::config::ContentParams;
use crate::types::{Attribute, ConditionKind, HexCoord, Modifier};
use serde::{Deserialize, Serialize};
use skilltree_prng::{random_dice, squirrel3, unit_float};
use smallvec::SmallVec;
use std::fmt;

/// Top-level content roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Empty,
    NoSpend,
    Spend,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineCount {
    Single,
    Double,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContentsLine {
    pub attribute: Attribute,
    pub modifier: Modifier,
    pub amount: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContentsCondition {
    pub kind: ConditionKind,
    pub attribute: Attribute,
    pub amount: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContents {
    pub lines: SmallVec<[NodeContentsLine; 2]>,
    pub condition: Option<NodeContentsCondition>,
}

impl NodeContents {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.condition.is_none()
    }
}

impl fmt::Display for NodeContentsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.attribute.symbol();
        let desc = self.attribute.description();
        match self.modifier {
            Modifier::Flat => write!(f, "+{} {} ({})", self.amount, symbol, desc),
            Modifier::Increased => write!(f, "{}% increased {} ({})", self.amount, symbol, desc),
        }
    }
}

impl fmt::Display for NodeContentsCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConditionKind::Spend => {
                write!(f, "SPEND: {} {}", self.amount, self.attribute.description())
            }
        }
    }
}

/// One line of text per content line, then the condition if any.
impl fmt::Display for NodeContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for line in &self.lines {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
            first = false;
        }
        if let Some(condition) = &self.condition {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

/// Mix a coordinate into a single seed: `x + squirrel3(y + squirrel3(z))`.
pub fn location_seed(c: HexCoord) -> u32 {
    (c.x as u32).wrapping_add(squirrel3((c.y as u32).wrapping_add(squirrel3(c.z as u32))))
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ContentsFactory {
    params: ContentParams,
}

impl ContentsFactory {
    pub fn new(params: ContentParams) -> Self {
        Self { params }
    }

    pub fn create(&self, seed: u32, location: HexCoord) -> NodeContents {
        if location.is_origin() {
            return NodeContents::empty();
        }
        let loc = location_seed(location);
        let starter = location.taxicab_distance() <= self.params.starter_area_radius;

        let (kind, s) = self.params.root_weights.switch(seed.wrapping_add(loc));
        match kind {
            ContentKind::Empty => NodeContents::empty(),
            ContentKind::NoSpend => self.no_spend(s, loc, starter),
            ContentKind::Spend => {
                let mut contents = self.no_spend(s, loc, starter);
                contents.condition = Some(NodeContentsCondition {
                    kind: ConditionKind::Spend,
                    attribute: *self.params.spend_attribute_weights.pick(s.wrapping_add(1)),
                    amount: random_dice(
                        s.wrapping_add(2),
                        self.params.spend_dice,
                        self.params.spend_plus,
                    ),
                });
                contents
            }
        }
    }

    fn no_spend(&self, seed: u32, loc: u32, starter: bool) -> NodeContents {
        let p = &self.params;
        let (count, s) = p.line_count_weights.switch(seed);
        let modifiers = if starter {
            &p.starter_modifier_weights
        } else {
            &p.modifier_weights
        };

        let attribute = *p.attribute_weights.pick(s);
        let modifier = *modifiers.pick(s.wrapping_add(1));
        let tiers = p.tiers(modifier);
        let amount_seed = s.wrapping_add(2).wrapping_add(loc);

        let second = match count {
            LineCount::Single => None,
            LineCount::Double => p
                .attribute_weights
                .without(&attribute)
                .map(|rest| *rest.pick(s)),
        };

        let mut lines = SmallVec::new();
        match second {
            None => lines.push(NodeContentsLine {
                attribute,
                modifier,
                amount: tiers.primary.sample(amount_seed),
            }),
            Some(second) => {
                let large = unit_float(s.wrapping_add(4).wrapping_add(loc)) < p.large_node_chance;
                let (first_range, second_range) = if large {
                    (tiers.large_primary, tiers.large_secondary)
                } else {
                    (tiers.primary, tiers.secondary)
                };
                lines.push(NodeContentsLine {
                    attribute,
                    modifier,
                    amount: first_range.sample(amount_seed),
                });
                lines.push(NodeContentsLine {
                    attribute: second,
                    modifier,
                    amount: second_range.sample(s.wrapping_add(3).wrapping_add(loc)),
                });
            }
        }
        NodeContents {
            lines,
            condition: None,
        }
    }
}
