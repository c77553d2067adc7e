// Per-attribute totals over the taken nodes, for the stats panel.

use crate::contents::NodeContents;
use crate::state::GameState;
use crate::types::{Attribute, ConditionKind, Modifier};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AttributeTotal {
    pub flat: i32,
    /// Percent.
    pub increased: i32,
    pub spent: i32,
    /// Filled in by `attribute_totals`; see `net`.
    pub total: f64,
}

impl AttributeTotal {
    /// `flat * (1 + increased / 100) - spent`, from the current components.
    pub fn net(&self) -> f64 {
        f64::from(self.flat) * (1.0 + f64::from(self.increased) / 100.0) - f64::from(self.spent)
    }

    fn add_contents(totals: &mut BTreeMap<Attribute, AttributeTotal>, contents: &NodeContents) {
        for line in &contents.lines {
            let entry = totals.entry(line.attribute).or_default();
            match line.modifier {
                Modifier::Flat => entry.flat += line.amount,
                Modifier::Increased => entry.increased += line.amount,
            }
        }
        if let Some(condition) = &contents.condition {
            match condition.kind {
                ConditionKind::Spend => {
                    totals.entry(condition.attribute).or_default().spent += condition.amount;
                }
            }
        }
    }
}

/// Totals for every attribute granted or spent by a taken node. Attributes
/// no taken node mentions are absent.
pub fn attribute_totals(state: &GameState) -> BTreeMap<Attribute, AttributeTotal> {
    let mut totals = BTreeMap::new();
    let world = state.world_gen();
    for c in state.save.taken_nodes() {
        AttributeTotal::add_contents(&mut totals, &world.node_contents(c));
    }
    for total in totals.values_mut() {
        total.total = total.net();
    }
    totals
}
