// Breadth-first search over the hex lattice.
//
// Three searches live here:
// - `within_distance`: multi-source layered BFS that returns every node
//   within a hop range. Disallowed nodes can be arrived at but not passed
//   through, which is how locks stop fog from spreading while still being
//   revealed themselves.
// - `bfs_all_paths`: shortest-path search from one node to the nearest of a
//   set of destinations, returning the union of every tied shortest path
//   (used to highlight how a target connects to the player's tree).
// - `stays_connected_without`: whether removing one node from a connected
//   set would split it (used by the deallocation check).
//
// The lattice is infinite, so every search either has a hop limit or walks
// a finite node set. `within_distance` with `max_distance: None` only
// terminates when disallowed nodes enclose the sources.
//
// See also: `hex.rs` for the topology being searched, `status.rs` which
// floods fog/reachability with `within_distance`.
//
// **Critical constraint: determinism.** The `touched` set is an
// `FxHashSet` used only for membership. Output order comes from the
// frontier `Vec`s, which are filled in fixed neighbor order.

use crate::hex::{HexTopology, lateral_neighbors};
use crate::types::HexCoord;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// Predicate for `within_distance` when nothing blocks passage.
pub fn no_obstacles(_: HexCoord) -> bool {
    false
}

/// All nodes whose BFS hop distance from `sources` is in
/// `min_distance..=max_distance`, followed by every disallowed node the
/// search arrived at (regardless of its distance).
///
/// Nodes for which `is_disallowed` returns true are never expanded.
/// Sources are always distance 0, even if disallowed.
pub fn within_distance<F>(
    topology: &HexTopology,
    sources: &[HexCoord],
    max_distance: Option<u32>,
    min_distance: u32,
    is_disallowed: F,
) -> Vec<HexCoord>
where
    F: Fn(HexCoord) -> bool,
{
    let max_distance = max_distance.unwrap_or(u32::MAX);
    let mut touched: FxHashSet<HexCoord> = FxHashSet::default();
    let mut disallowed_but_touched: Vec<HexCoord> = Vec::new();

    let mut base_layer = Vec::with_capacity(sources.len());
    for &s in sources {
        if touched.insert(s) {
            base_layer.push(s);
        }
    }
    let mut layers: Vec<Vec<HexCoord>> = vec![base_layer];

    for _ in 1..=max_distance {
        let mut next = Vec::new();
        if let Some(prev) = layers.last() {
            for &c in prev {
                for (_, n) in topology.neighbors(c) {
                    if !touched.insert(n) {
                        continue;
                    }
                    if is_disallowed(n) {
                        disallowed_but_touched.push(n);
                    } else {
                        next.push(n);
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        layers.push(next);
    }

    layers
        .into_iter()
        .skip(min_distance as usize)
        .flatten()
        .chain(disallowed_but_touched)
        .collect()
}

/// Result of `bfs_all_paths`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathSearch {
    /// Every node on some shortest path, including the source and the
    /// destinations reached. Empty if no path was found.
    pub nodes: BTreeSet<HexCoord>,
    /// Hop count of the shortest path, `Some(0)` if the source is itself a
    /// destination, `None` if nothing was reached within the limit.
    pub distance: Option<u32>,
}

/// Union of all tied shortest paths from `source` to its nearest members of
/// `destinations`, searching at most `max_distance` hops.
///
/// Disallowed nodes are recorded as touched but never expanded and never
/// count as a reached destination.
pub fn bfs_all_paths<F>(
    topology: &HexTopology,
    source: HexCoord,
    destinations: &BTreeSet<HexCoord>,
    is_disallowed: F,
    max_distance: u32,
) -> PathSearch
where
    F: Fn(HexCoord) -> bool,
{
    if destinations.contains(&source) {
        return PathSearch {
            nodes: BTreeSet::from([source]),
            distance: Some(0),
        };
    }

    let mut distance: BTreeMap<HexCoord, u32> = BTreeMap::new();
    let mut predecessors: BTreeMap<HexCoord, SmallVec<[HexCoord; 3]>> = BTreeMap::new();
    distance.insert(source, 0);

    let mut frontier = vec![source];
    let mut d = 0;
    while !frontier.is_empty() && d < max_distance {
        let mut next = Vec::new();
        let mut found = Vec::new();
        for &c in &frontier {
            for (_, n) in topology.neighbors(c) {
                if let Some(&dn) = distance.get(&n) {
                    // Tied route: remember the extra predecessor.
                    if dn == d + 1 {
                        predecessors.entry(n).or_default().push(c);
                    }
                    continue;
                }
                distance.insert(n, d + 1);
                predecessors.entry(n).or_default().push(c);
                if is_disallowed(n) {
                    continue;
                }
                if destinations.contains(&n) {
                    found.push(n);
                } else {
                    next.push(n);
                }
            }
        }
        d += 1;

        if !found.is_empty() {
            let mut nodes = BTreeSet::new();
            let mut considering: BTreeSet<HexCoord> = found.into_iter().collect();
            while !considering.is_empty() {
                let mut upstream = BTreeSet::new();
                for c in considering {
                    if nodes.insert(c) {
                        if let Some(preds) = predecessors.get(&c) {
                            upstream.extend(preds.iter().copied());
                        }
                    }
                }
                considering = upstream;
            }
            return PathSearch {
                nodes,
                distance: Some(d),
            };
        }
        frontier = next;
    }

    log::debug!("bfs_all_paths: no path from {source} within {max_distance} hops");
    PathSearch::default()
}

/// True if every member of `nodes` adjacent to `removed` can still reach
/// every other such member through `nodes` without passing `removed`.
///
/// Adjacency is lateral only (`HexTopology::FLAT`): vertical links never
/// hold a group of taken nodes together. `nodes` must be finite (it is
/// searched exhaustively).
pub fn stays_connected_without(nodes: &BTreeSet<HexCoord>, removed: HexCoord) -> bool {
    let adjacent: Vec<HexCoord> = lateral_neighbors(removed)
        .into_iter()
        .map(|(_, n)| n)
        .filter(|n| nodes.contains(n))
        .collect();
    if adjacent.len() <= 1 {
        return true;
    }

    let reached: BTreeSet<HexCoord> =
        within_distance(&HexTopology::FLAT, &adjacent[..1], None, 0, |c| {
            c == removed || !nodes.contains(&c)
        })
        .into_iter()
        .filter(|c| *c != removed && nodes.contains(c))
        .collect();

    adjacent.iter().all(|n| reached.contains(n))
}

/// True if every member of `nodes` is laterally connected to `root` through
/// `nodes`.
pub fn all_connected(nodes: &BTreeSet<HexCoord>, root: HexCoord) -> bool {
    if !nodes.contains(&root) {
        return nodes.is_empty();
    }
    let reached = within_distance(&HexTopology::FLAT, &[root], None, 0, |c| {
        !nodes.contains(&c)
    })
    .into_iter()
    .filter(|c| nodes.contains(c))
    .count();
    reached == nodes.len()
}
