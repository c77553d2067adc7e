// Hex lattice adjacency.
//
// `HexTopology` answers "who are my neighbors" for any coordinate. Within a
// layer there are always six lateral neighbors. When vertical neighbors are
// enabled, each node also has a `Down` neighbor on the finer layer below
// (coordinates scaled by `z_scale_factor`), and nodes whose `x` and `y` are
// both multiples of the scale have an `Up` neighbor on the coarser layer
// above.
//
// Neighbor order is fixed (EAST, WEST, NORTHWEST, SOUTHEAST, NORTHEAST,
// SOUTHWEST, then DOWN, UP) so BFS frontiers come out in the same order on
// every run.
//
// See also: `types.rs` for `Direction`, `pathfinding.rs` for the BFS that
// walks this topology.

use crate::config::GameConfig;
use crate::types::{Direction, HexCoord};
use smallvec::SmallVec;

pub type NeighborList = SmallVec<[(Direction, HexCoord); 8]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HexTopology {
    pub vertical: bool,
    pub z_scale_factor: i32,
}

impl Default for HexTopology {
    fn default() -> Self {
        Self::FLAT
    }
}

impl HexTopology {
    /// Same-layer adjacency only. Allocation connectivity is always judged
    /// on this topology.
    pub const FLAT: HexTopology = HexTopology {
        vertical: false,
        z_scale_factor: 4,
    };

    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            vertical: config.vertical_neighbors,
            z_scale_factor: config.z_scale_factor,
        }
    }

    /// The neighbor in `direction`, or `None` for an `Up` that does not
    /// exist or any vertical direction while vertical neighbors are off.
    pub fn neighbor(&self, base: HexCoord, direction: Direction) -> Option<HexCoord> {
        if let Some((dx, dy)) = direction.lateral_offset() {
            return Some(base.offset(dx, dy, 0));
        }
        if !self.vertical {
            return None;
        }
        let s = self.z_scale_factor;
        match direction {
            Direction::Down => Some(HexCoord::new(
                base.x.saturating_mul(s),
                base.y.saturating_mul(s),
                base.z.saturating_sub(1),
            )),
            Direction::Up if base.x % s == 0 && base.y % s == 0 => Some(HexCoord::new(
                base.x / s,
                base.y / s,
                base.z.saturating_add(1),
            )),
            _ => None,
        }
    }

    pub fn neighbors(&self, base: HexCoord) -> NeighborList {
        let mut out: NeighborList = lateral_neighbors(base);
        if self.vertical {
            for direction in [Direction::Down, Direction::Up] {
                if let Some(n) = self.neighbor(base, direction) {
                    out.push((direction, n));
                }
            }
        }
        out
    }
}

/// The six same-layer neighbors, regardless of topology settings.
pub fn lateral_neighbors(base: HexCoord) -> NeighborList {
    Direction::LATERAL
        .iter()
        .filter_map(|&d| d.lateral_offset().map(|(dx, dy)| (d, base.offset(dx, dy, 0))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lateral_order_is_fixed() {
        let n = lateral_neighbors(HexCoord::ORIGIN);
        let coords: Vec<HexCoord> = n.iter().map(|(_, c)| *c).collect();
        assert_eq!(
            coords,
            vec![
                HexCoord::new(1, 0, 0),
                HexCoord::new(-1, 0, 0),
                HexCoord::new(0, 1, 0),
                HexCoord::new(0, -1, 0),
                HexCoord::new(1, 1, 0),
                HexCoord::new(-1, -1, 0),
            ]
        );
    }

    #[test]
    fn default_topology_is_flat() {
        let topo = HexTopology::default();
        assert_eq!(topo.neighbors(HexCoord::new(4, 8, 0)).len(), 6);
        assert_eq!(topo.neighbor(HexCoord::ORIGIN, Direction::Up), None);
        assert_eq!(topo.neighbor(HexCoord::ORIGIN, Direction::Down), None);
    }

    #[test]
    fn vertical_neighbors_scale() {
        let topo = HexTopology {
            vertical: true,
            z_scale_factor: 4,
        };
        let base = HexCoord::new(4, -8, 0);
        assert_eq!(
            topo.neighbor(base, Direction::Down),
            Some(HexCoord::new(16, -32, -1))
        );
        assert_eq!(
            topo.neighbor(base, Direction::Up),
            Some(HexCoord::new(1, -2, 1))
        );
        assert_eq!(topo.neighbors(base).len(), 8);
    }

    #[test]
    fn up_requires_divisible_coords() {
        let topo = HexTopology {
            vertical: true,
            z_scale_factor: 4,
        };
        let base = HexCoord::new(3, 4, 0);
        assert_eq!(topo.neighbor(base, Direction::Up), None);
        // Down always exists.
        assert_eq!(topo.neighbors(base).len(), 7);
    }

    #[test]
    fn extreme_coordinates_saturate() {
        let topo = HexTopology {
            vertical: true,
            z_scale_factor: 4,
        };
        let edge = HexCoord::new(i32::MAX, i32::MIN, i32::MIN);
        assert_eq!(
            topo.neighbor(edge, Direction::Down),
            Some(HexCoord::new(i32::MAX, i32::MIN, i32::MIN))
        );
        assert_eq!(
            topo.neighbor(edge, Direction::East),
            Some(HexCoord::new(i32::MAX, i32::MIN, i32::MIN))
        );
        assert_eq!(lateral_neighbors(edge).len(), 6);
    }

    #[test]
    fn down_then_up_returns_home() {
        let topo = HexTopology {
            vertical: true,
            z_scale_factor: 4,
        };
        let base = HexCoord::new(-3, 7, 2);
        let down = topo.neighbor(base, Direction::Down).unwrap();
        assert_eq!(topo.neighbor(down, Direction::Up), Some(base));
    }
}
