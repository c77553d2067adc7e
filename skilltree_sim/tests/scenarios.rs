// Scripted play-throughs at the default seed (0x19283).
//
// Each test drives a `GameSession` the way a frontend would (actions, then
// `tick()`) and checks the resulting snapshot. Coordinates referenced here
// depend on the default lock layout: (3, 0) is locked, the first ring is
// always free.

use skilltree_sim::action::{Action, AllocateCheck, AllocateNodeAction, DeallocateCheck};
use skilltree_sim::config::{DEFAULT_SEED, GameConfig};
use skilltree_sim::event::GameEventKind;
use skilltree_sim::hex::{HexTopology, lateral_neighbors};
use skilltree_sim::pathfinding::{no_obstacles, within_distance};
use skilltree_sim::session::GameSession;
use skilltree_sim::types::{Era, EraKind, FogOfWarStatus, HexCoord};

fn c(x: i32, y: i32) -> HexCoord {
    HexCoord::new(x, y, 0)
}

fn session() -> GameSession {
    GameSession::new(DEFAULT_SEED, GameConfig::default())
}

fn allocate(s: &mut GameSession, location: HexCoord) {
    assert_eq!(s.allocate(location), AllocateCheck::Yes, "allocating {location}");
    s.tick();
}

#[test]
fn first_allocation_opens_its_neighbors() {
    let mut s = session();
    let before: Vec<(HexCoord, FogOfWarStatus)> = lateral_neighbors(c(1, 0))
        .into_iter()
        .map(|(_, n)| (n, s.state().computed.fog(n)))
        .collect();

    allocate(&mut s, c(1, 0));

    for (n, fog) in before {
        let after = s.state().computed.fog(n);
        if fog == FogOfWarStatus::Unreachable {
            assert_eq!(after, FogOfWarStatus::Available, "{n}");
        }
        assert!(after >= fog);
    }
    assert_eq!(s.state().computed.fog(c(1, 0)), FogOfWarStatus::Visible);
    s.state().check_invariants().unwrap();
}

#[test]
fn distant_allocation_is_rejected_without_mutation() {
    let mut s = session();
    let before = s.state().to_json().unwrap();
    assert_eq!(s.allocate(c(5, 5)), AllocateCheck::NotConnected);
    assert_eq!(s.pending_updates(), 0);
    assert_eq!(s.state().to_json().unwrap(), before);
}

#[test]
fn second_allocation_is_already_allocated() {
    let mut s = session();
    allocate(&mut s, c(1, 0));
    assert_eq!(s.allocate(c(1, 0)), AllocateCheck::AlreadyAllocated);
    assert_eq!(AllocateCheck::AlreadyAllocated.to_string(), "already allocated");
}

#[test]
fn first_ring_has_six_nodes() {
    let topology = HexTopology::default();
    let ring = within_distance(&topology, &[HexCoord::ORIGIN], Some(1), 1, no_obstacles);
    assert_eq!(ring.len(), 6);
    let disk = within_distance(&topology, &[HexCoord::ORIGIN], Some(1), 0, no_obstacles);
    assert_eq!(disk.len(), 7);
    assert_eq!(disk[0], HexCoord::ORIGIN);
}

#[test]
fn every_first_ring_node_is_allocatable() {
    for seed in [0, 1, DEFAULT_SEED, 0xdead_beef] {
        let s = GameSession::new(seed, GameConfig::default());
        for (_, n) in lateral_neighbors(HexCoord::ORIGIN) {
            assert!(
                AllocateNodeAction::check_action(&n, s.state()),
                "seed {seed:#x}, {n}"
            );
        }
    }
}

#[test]
fn walk_into_a_lock() {
    let mut s = session();
    allocate(&mut s, c(1, 0));
    allocate(&mut s, c(2, 0));
    assert_eq!(s.allocate(c(3, 0)), AllocateCheck::Locked);

    // The highlighted route to the far side goes around the lock.
    let path = s.highlight_path(c(4, 0));
    assert!(!path.nodes.contains(&c(3, 0)));
    assert!(path.distance.is_some_and(|d| d > 2));
}

#[test]
fn era_cycle() {
    let mut s = session();
    allocate(&mut s, c(1, 0));
    allocate(&mut s, c(2, 0));
    assert!(s.state().save.is_bookmarked(c(2, 0)));

    s.progress_era();
    let events = s.tick();
    assert_eq!(
        events[0].kind,
        GameEventKind::EraChanged {
            era: Era {
                kind: EraKind::B,
                index: 0
            }
        }
    );
    let state = s.state();
    assert!(!state.save.is_bookmarked(c(1, 0)));
    assert!(!state.save.is_bookmarked(c(2, 0)));
    assert_eq!(state.save.deallocation_points.provided, 3);
    assert_eq!(state.save.deallocation_points.remaining, 3);

    // Optimization era: undo costs a point.
    assert_eq!(s.deallocate(c(1, 0)), DeallocateCheck::WouldDisconnect);
    assert_eq!(s.deallocate(c(2, 0)), DeallocateCheck::Yes);
    s.tick();
    assert_eq!(s.state().save.deallocation_points.remaining, 2);

    s.progress_era();
    s.tick();
    assert_eq!(
        s.state().save.current_era,
        Era {
            kind: EraKind::A,
            index: 1
        }
    );
    // Taken before this exploration started: cannot be undone now.
    assert_eq!(s.deallocate(c(1, 0)), DeallocateCheck::NotBookmarked);
    s.state().check_invariants().unwrap();
}

#[test]
fn same_tick_releases_cannot_split_the_tree() {
    let mut s = session();
    for location in [c(1, 0), c(1, 1), c(2, 1)] {
        allocate(&mut s, location);
    }
    // Both pass against the current snapshot; together they would strand
    // (2, 1).
    assert_eq!(s.deallocate(c(1, 0)), DeallocateCheck::Yes);
    assert_eq!(s.deallocate(c(1, 1)), DeallocateCheck::Yes);
    let events = s.tick();

    assert!(events.iter().any(|e| e.kind
        == GameEventKind::NodeDeallocated {
            location: c(1, 0)
        }));
    assert!(events.iter().any(|e| matches!(
        &e.kind,
        GameEventKind::CommandRejected { reason, .. } if reason == "would disconnect"
    )));
    let state = s.state();
    assert!(state.save.is_taken(c(1, 1)));
    assert!(state.save.is_taken(c(2, 1)));
    state.check_invariants().unwrap();
}

#[test]
fn same_tick_allocations_respect_the_budget() {
    let mut config = GameConfig::default();
    config.era_allocation_points = Some(vec![1]);
    let mut s = GameSession::new(DEFAULT_SEED, config);
    assert_eq!(s.allocate(c(1, 0)), AllocateCheck::Yes);
    assert_eq!(s.allocate(c(-1, 0)), AllocateCheck::Yes);
    let events = s.tick();

    assert!(events.iter().any(|e| matches!(
        &e.kind,
        GameEventKind::CommandRejected { reason, .. } if reason == "not enough points"
    )));
    let state = s.state();
    assert_eq!(state.save.taken_count(), 2);
    assert_eq!(state.allocation_points_remaining(), Some(0));
    state.check_invariants().unwrap();
}

#[test]
fn deallocation_never_refogs() {
    let mut s = session();
    allocate(&mut s, c(1, 0));
    allocate(&mut s, c(2, 0));
    let fog_before = s.state().computed.fog_of_war_status_map.clone();
    assert_eq!(s.deallocate(c(2, 0)), DeallocateCheck::Yes);
    s.tick();
    assert_eq!(s.state().computed.fog_of_war_status_map, fog_before);
    assert!(!s.state().computed.is_reachable(c(3, 1)));
}
