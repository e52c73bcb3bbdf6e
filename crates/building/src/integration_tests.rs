//! Integration tests for the placement core.
//!
//! Direct tests drive [`BuildingGrid`] without an app; plugin tests use the
//! `TestGrid` harness to go through request events and Bevy time.


use bevy::math::Vec3;

use crate::building_grid::{BuildingGrid, PlacementRequest, TargetSpec};
use crate::cell::Slot;
use crate::coords::{CellCoord, Corner, Direction};
use crate::events::{PlacementRequested, RemoveRequested};
use crate::objects::{AreaPolicyFlags, ObjectDescriptor, ObjectId, PrefabVariant};
use crate::params::PlacementParams;
use crate::policy::{AreaPolicies, AreaRegion, GlobalAreaPolicy, MoveState, RegionAreaPolicy};
use crate::results::{PlacementError, PlacementOutcome};
use crate::test_harness::TestGrid;

fn small_grid() -> BuildingGrid {
    BuildingGrid::new(PlacementParams {
        width: 8,
        length: 8,
        ..Default::default()
    })
}

fn wall() -> ObjectDescriptor {
    ObjectDescriptor::new("wall", "wall")
}

fn placed(result: Result<PlacementOutcome, PlacementError>) -> ObjectId {
    match result {
        Ok(PlacementOutcome::Placed(id)) => id,
        other => panic!("expected a placement, got {other:?}"),
    }
}

// ===========================================================================
// 1. Single placements
// ===========================================================================

#[test]
fn test_filling_placement_occupies_footprint() {
    let mut grid = small_grid();
    let house = ObjectDescriptor::new("house", "building").with_size(2, 3);
    let id = placed(grid.place_filling(0, CellCoord::new(1, 1), &house, Direction::East, None));
    // East facing swaps the footprint to 3x2.
    for x in 1..=3 {
        for z in 1..=2 {
            assert_eq!(
                grid.occupant(0, CellCoord::new(x, z), Slot::Base, &house.category),
                Some(id)
            );
        }
    }
    assert!(grid.cell_occupancy(0, CellCoord::new(1, 3)).is_empty());
    assert_eq!(grid.object(id).unwrap().footprint.len(), 6);
}

#[test]
fn test_occupied_slot_rejects_without_mutation() {
    let mut grid = small_grid();
    let cell = CellCoord::new(2, 2);
    let first = placed(grid.place_filling(0, cell, &wall(), Direction::North, None));
    let before = grid.cell_occupancy(0, cell).record;
    let history = grid.history().undo_stack.len();

    let other = ObjectDescriptor::new("brick wall", "wall");
    let err = grid
        .place_filling(0, cell, &other, Direction::North, None)
        .unwrap_err();
    assert_eq!(err, PlacementError::Occupied { cell, occupant: first });
    assert_eq!(grid.cell_occupancy(0, cell).record, before);
    assert_eq!(grid.history().undo_stack.len(), history);
}

#[test]
fn test_different_categories_share_a_cell() {
    let mut grid = small_grid();
    let cell = CellCoord::new(0, 0);
    placed(grid.place_filling(0, cell, &wall(), Direction::North, None));
    let rug = ObjectDescriptor::new("rug", "decor");
    placed(grid.place_filling(0, cell, &rug, Direction::North, None));
    assert_eq!(grid.cell_occupancy(0, cell).record.base.len(), 2);
}

#[test]
fn test_out_of_bounds_and_unknown_layer() {
    let mut grid = small_grid();
    assert_eq!(
        grid.place_filling(0, CellCoord::new(8, 0), &wall(), Direction::North, None),
        Err(PlacementError::OutOfBounds {
            cell: CellCoord::new(8, 0)
        })
    );
    // A 2x1 object hanging off the east edge.
    let bench = ObjectDescriptor::new("bench", "prop").with_size(2, 1);
    assert!(matches!(
        grid.place_filling(0, CellCoord::new(7, 0), &bench, Direction::North, None),
        Err(PlacementError::OutOfBounds { .. })
    ));
    assert_eq!(
        grid.place_filling(5, CellCoord::new(0, 0), &wall(), Direction::North, None),
        Err(PlacementError::UnknownLayer(5))
    );
    assert_eq!(grid.objects().live_count(), 0);
}

#[test]
fn test_oversized_footprint_is_out_of_bounds() {
    let mut grid = small_grid();
    let catalog = ObjectDescriptor::catalog_from_json(
        r#"[{ "name": "estate", "category": "building", "size": [70000, 70000],
              "variants": [ { "name": "estate", "weight": 1.0 } ] }]"#,
    )
    .unwrap();
    for direction in Direction::ALL {
        assert!(matches!(
            grid.place_filling(0, CellCoord::new(0, 0), &catalog[0], direction, None),
            Err(PlacementError::OutOfBounds { .. })
        ));
    }
    assert_eq!(grid.objects().live_count(), 0);
    assert!(grid.cell_occupancy(0, CellCoord::new(0, 0)).is_empty());
    assert!(grid.history().undo_stack.is_empty());
}

#[test]
fn test_repeating_an_identical_placement_is_a_no_op() {
    let mut grid = small_grid();
    let cell = CellCoord::new(3, 3);
    placed(grid.place_filling(0, cell, &wall(), Direction::North, None));
    assert_eq!(
        grid.place_filling(0, cell, &wall(), Direction::North, None),
        Ok(PlacementOutcome::NoOp)
    );
    assert_eq!(grid.history().undo_stack.len(), 1);
}

#[test]
fn test_re_placement_with_the_other_flip_is_validated() {
    let mut grid = small_grid();
    let fence = ObjectDescriptor::new("fence", "fence");
    let cell = CellCoord::new(2, 2);
    let id = placed(grid.place_edge(0, cell, Direction::North, &fence, None));
    let flipped = PlacementRequest::new(
        0,
        TargetSpec::Edge {
            cell,
            direction: Direction::North,
            flipped: true,
        },
        fence.clone(),
    );
    assert!(matches!(
        grid.place(&flipped),
        Err(PlacementError::Occupied { occupant, .. }) if occupant == id
    ));
    assert!(!grid.object(id).unwrap().flipped);
    assert_eq!(grid.history().undo_stack.len(), 1);
}

#[test]
fn test_re_placement_outside_shrunk_bounds_is_rejected() {
    let mut grid = small_grid();
    let cell = CellCoord::new(6, 6);
    placed(grid.place_filling(0, cell, &wall(), Direction::North, None));
    grid.set_size(4, 4);
    assert_eq!(
        grid.place_filling(0, cell, &wall(), Direction::North, None),
        Err(PlacementError::OutOfBounds { cell })
    );
    assert_eq!(grid.history().undo_stack.len(), 1);
}

#[test]
fn test_edge_placement_is_mirrored_across_the_edge() {
    let mut grid = small_grid();
    let fence = ObjectDescriptor::new("fence", "fence");
    let id = placed(grid.place_edge(0, CellCoord::new(2, 2), Direction::East, &fence, None));
    assert_eq!(
        grid.occupant(0, CellCoord::new(3, 2), Slot::Edge(Direction::West), &fence.category),
        Some(id)
    );
    // The neighbor's side of the same edge is taken.
    assert!(matches!(
        grid.place_edge(0, CellCoord::new(3, 2), Direction::West, &fence, None),
        Err(PlacementError::Occupied { .. })
    ));
    // Border edges have no neighbor to mirror into.
    let border = placed(grid.place_edge(0, CellCoord::new(0, 0), Direction::West, &fence, None));
    assert_eq!(grid.object(border).unwrap().footprint.len(), 1);
}

#[test]
fn test_corner_placement_occupies_all_sharing_cells() {
    let mut grid = small_grid();
    let post = ObjectDescriptor::new("post", "post");
    let id = placed(grid.place_corner(0, CellCoord::new(1, 1), Corner::NorthEast, &post, None));
    let expected = [
        (CellCoord::new(1, 1), Corner::NorthEast),
        (CellCoord::new(2, 1), Corner::NorthWest),
        (CellCoord::new(1, 2), Corner::SouthEast),
        (CellCoord::new(2, 2), Corner::SouthWest),
    ];
    for (cell, corner) in expected {
        assert_eq!(
            grid.occupant(0, cell, Slot::Corner(corner), &post.category),
            Some(id)
        );
    }
    assert!(matches!(
        grid.place_corner(0, CellCoord::new(2, 2), Corner::SouthWest, &post, None),
        Err(PlacementError::Occupied { .. })
    ));

    let edge = placed(grid.place_corner(0, CellCoord::new(0, 0), Corner::SouthWest, &post, None));
    assert_eq!(grid.object(edge).unwrap().footprint.len(), 1);
}

#[test]
fn test_free_objects_stack_in_one_cell() {
    let mut grid = small_grid();
    let lamp = ObjectDescriptor::new("lamp", "light");
    let a = placed(grid.place_free(Vec3::new(1.2, 0.0, 1.5), &lamp, None));
    let b = placed(grid.place_free(Vec3::new(1.7, 0.0, 1.1), &lamp, None));
    let record = grid.cell_occupancy(0, CellCoord::new(0, 0)).record;
    assert_eq!(record.free, vec![a, b]);
    assert_eq!(
        grid.object(a).unwrap().world_position,
        Vec3::new(1.2, 0.0, 1.5)
    );
}

#[test]
fn test_free_placement_picks_layer_from_height() {
    let mut grid = small_grid();
    let lamp = ObjectDescriptor::new("lamp", "light");
    let id = placed(grid.place_free(Vec3::new(0.5, 3.5, 0.5), &lamp, None));
    assert_eq!(grid.object(id).unwrap().layer, 1);
}

#[test]
fn test_free_placement_clamps_height_into_the_layer_range() {
    let mut grid = small_grid();
    let lamp = ObjectDescriptor::new("lamp", "light");
    let low = placed(grid.place_free(Vec3::new(0.5, -40.0, 0.5), &lamp, None));
    let high = placed(grid.place_free(Vec3::new(0.5, 1.0e6, 0.5), &lamp, None));
    assert_eq!(grid.object(low).unwrap().layer, 0);
    assert_eq!(grid.object(high).unwrap().layer, 1);
}

#[test]
fn test_world_queries_resolve_cells_corners_and_edges() {
    let grid = small_grid();
    // Cell size is 2.
    assert_eq!(
        grid.locate(Vec3::new(3.0, 0.0, 5.0)),
        Some((0, CellCoord::new(1, 2)))
    );
    assert_eq!(
        grid.corner_at(0, Vec3::new(3.8, 0.0, 5.9)),
        Some((CellCoord::new(1, 2), Corner::NorthEast))
    );
    assert_eq!(
        grid.edge_at(0, Vec3::new(2.1, 0.0, 5.0)),
        Some((CellCoord::new(1, 2), Direction::West))
    );
    assert_eq!(grid.corner_at(9, Vec3::ZERO), None);
}

// ===========================================================================
// 2. Replacement and area policies
// ===========================================================================

#[test]
fn test_replaceable_occupant_is_destroyed_and_restored_on_undo() {
    let mut grid = small_grid();
    let cell = CellCoord::new(4, 4);
    let grass = ObjectDescriptor::new("grass", "ground").replaceable();
    let old = placed(grid.place_filling(0, cell, &grass, Direction::North, None));
    let path = ObjectDescriptor::new("path", "ground");
    let new = placed(grid.place_filling(0, cell, &path, Direction::North, None));

    assert!(grid.object(old).is_none());
    assert_eq!(grid.occupant(0, cell, Slot::Base, &path.category), Some(new));

    grid.undo();
    assert_eq!(grid.occupant(0, cell, Slot::Base, &grass.category), Some(old));
    assert!(grid.object(old).is_some());
}

#[test]
fn test_ignore_replacement_treats_occupant_as_blocking() {
    let mut grid = small_grid();
    let cell = CellCoord::new(4, 4);
    let grass = ObjectDescriptor::new("grass", "ground").replaceable();
    placed(grid.place_filling(0, cell, &grass, Direction::North, None));
    let request = PlacementRequest::new(
        0,
        TargetSpec::Filling {
            cell,
            direction: Direction::North,
        },
        ObjectDescriptor::new("path", "ground"),
    )
    .ignoring_replacement();
    assert!(matches!(
        grid.place(&request),
        Err(PlacementError::Occupied { .. })
    ));
}

#[test]
fn test_replacement_needs_a_destroyer() {
    let mut grid = small_grid();
    grid.set_destroyer(None);
    let cell = CellCoord::new(1, 1);
    let grass = ObjectDescriptor::new("grass", "ground").replaceable();
    placed(grid.place_filling(0, cell, &grass, Direction::North, None));
    assert!(grid
        .place_filling(0, cell, &ObjectDescriptor::new("path", "ground"), Direction::North, None)
        .is_err());
}

#[test]
fn test_disabler_blocks_and_enabler_overrides() {
    let mut grid = small_grid();
    grid.policies = AreaPolicies {
        basic_disabler: Some(Box::new(GlobalAreaPolicy::active())),
        basic_enabler: Some(Box::new(RegionAreaPolicy::new(vec![AreaRegion::new(
            0,
            CellCoord::new(0, 0),
            CellCoord::new(2, 2),
        )]))),
        ..Default::default()
    };
    let tree = ObjectDescriptor::new("tree", "nature").with_area_policies(AreaPolicyFlags::ALL);
    placed(grid.place_filling(0, CellCoord::new(1, 1), &tree, Direction::North, None));
    assert_eq!(
        grid.place_filling(0, CellCoord::new(5, 5), &tree, Direction::North, None),
        Err(PlacementError::BlockedByAreaPolicy {
            cell: CellCoord::new(5, 5)
        })
    );
    // Objects that do not respond to policies ignore them.
    placed(grid.place_filling(0, CellCoord::new(5, 5), &wall(), Direction::North, None));
}

#[test]
fn test_move_mode_skips_area_policies_and_replacement() {
    let mut grid = small_grid();
    grid.policies.basic_disabler = Some(Box::new(GlobalAreaPolicy::active()));
    let tree = ObjectDescriptor::new("tree", "nature")
        .replaceable()
        .with_area_policies(AreaPolicyFlags::ALL);
    grid.set_mover(Some(Box::new(MoveState {
        moving: Some(ObjectId(99)),
    })));
    let cell = CellCoord::new(3, 3);
    placed(grid.place_filling(0, cell, &tree, Direction::South, None));
    let other = ObjectDescriptor::new("oak", "nature").with_area_policies(AreaPolicyFlags::ALL);
    assert!(matches!(
        grid.place_filling(0, cell, &other, Direction::North, None),
        Err(PlacementError::Occupied { .. })
    ));
}

// ===========================================================================
// 3. Variants
// ===========================================================================

#[test]
fn test_variant_selection_is_deterministic_per_seed() {
    let crate_descriptor = ObjectDescriptor::new("crate", "prop").with_variants(vec![
        PrefabVariant::new("crate_a", 1.0),
        PrefabVariant::new("crate_b", 1.0),
        PrefabVariant::new("crate_c", 1.0),
    ]);
    let run = || {
        let mut grid = small_grid();
        (0..8)
            .map(|x| {
                let id = placed(grid.place_filling(
                    0,
                    CellCoord::new(x, 0),
                    &crate_descriptor,
                    Direction::North,
                    None,
                ));
                grid.object(id).unwrap().variant.clone()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_zero_weight_variants_fail_without_mutation() {
    let mut grid = small_grid();
    let ghost = ObjectDescriptor::new("ghost", "prop")
        .with_variants(vec![PrefabVariant::new("ghost_a", 0.0)]);
    assert_eq!(
        grid.place_filling(0, CellCoord::new(0, 0), &ghost, Direction::North, None),
        Err(PlacementError::NoVariantSelectable)
    );
    let id = placed(grid.place_filling(0, CellCoord::new(0, 0), &ghost, Direction::North, Some(0)));
    assert_eq!(grid.object(id).unwrap().variant, "ghost_a");
    assert_eq!(
        grid.place_filling(0, CellCoord::new(1, 0), &ghost, Direction::North, Some(3)),
        Err(PlacementError::NoVariantSelectable)
    );
}

// ===========================================================================
// 4. Grid maintenance
// ===========================================================================

#[test]
fn test_shrinking_keeps_records_but_blocks_building() {
    let mut grid = small_grid();
    let cell = CellCoord::new(6, 6);
    placed(grid.place_filling(0, cell, &wall(), Direction::North, None));
    grid.set_size(4, 4);
    assert!(!grid.in_bounds(0, cell));
    assert!(matches!(
        grid.place_filling(0, cell, &ObjectDescriptor::new("rug", "decor"), Direction::North, None),
        Err(PlacementError::OutOfBounds { .. })
    ));
    assert!(!grid.cell_occupancy(0, cell).is_empty());
}

#[test]
fn test_modifiers_are_not_occupancy() {
    let mut grid = small_grid();
    let cell = CellCoord::new(1, 2);
    grid.set_modifier(0, cell, "fertility", 0.8).unwrap();
    assert_eq!(grid.modifier(0, cell, "fertility"), 0.8);
    assert_eq!(grid.modifier(0, cell, "heat"), 0.0);
    assert!(grid.cell_occupancy(0, cell).is_empty());
    placed(grid.place_filling(0, cell, &wall(), Direction::North, None));
    assert_eq!(
        grid.set_modifier(7, cell, "fertility", 1.0),
        Err(PlacementError::UnknownLayer(7))
    );
}

#[test]
fn test_snapshot_encodes_stored_records() {
    let mut grid = small_grid();
    let id = placed(grid.place_filling(0, CellCoord::new(2, 3), &wall(), Direction::North, None));
    let snapshot = grid.snapshot();
    let decoded = crate::snapshot::GridSnapshot::decode(&snapshot.encode()).unwrap();
    assert_eq!(decoded, snapshot);
    let record = decoded.cell(0, CellCoord::new(2, 3)).unwrap();
    assert_eq!(record.occupant(Slot::Base, &wall().category), Some(id));

    let json = serde_json::to_string(&snapshot).unwrap();
    let from_json: crate::snapshot::GridSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(from_json.layers, snapshot.layers);
}

// ===========================================================================
// 5. Plugin
// ===========================================================================

#[test]
fn test_placement_request_event_places_and_reports() {
    let mut app = TestGrid::new();
    app.send(PlacementRequested(PlacementRequest::new(
        0,
        TargetSpec::Filling {
            cell: CellCoord::new(2, 2),
            direction: Direction::North,
        },
        wall(),
    )));
    app.tick(1);
    app.assert_occupied(0, CellCoord::new(2, 2), Slot::Base, "wall");
    let successes = app.drain_successes();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].descriptor, "wall");
    assert_eq!(app.log().len(), 1);
}

#[test]
fn test_failed_request_emits_failure_event() {
    let mut app = TestGrid::new();
    app.send(PlacementRequested(PlacementRequest::new(
        0,
        TargetSpec::Filling {
            cell: CellCoord::new(-1, 2),
            direction: Direction::North,
        },
        wall(),
    )));
    app.tick(1);
    let failures = app.drain_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0].error,
        PlacementError::OutOfBounds {
            cell: CellCoord::new(-1, 2)
        }
    );
    assert_eq!(app.log().failures().count(), 1);
    assert_eq!(app.live_objects(), 0);
}

#[test]
fn test_policies_installed_through_the_harness_apply() {
    let mut app = TestGrid::new().with_policies(AreaPolicies {
        scoped_disabler: Some(Box::new(GlobalAreaPolicy::active())),
        ..Default::default()
    });
    let tree = ObjectDescriptor::new("tree", "nature").with_area_policies(AreaPolicyFlags::ALL);
    app.send(PlacementRequested(PlacementRequest::new(
        0,
        TargetSpec::Filling {
            cell: CellCoord::new(1, 1),
            direction: Direction::North,
        },
        tree,
    )));
    app.tick(1);
    assert!(matches!(
        app.drain_failures()[0].error,
        PlacementError::BlockedByAreaPolicy { .. }
    ));
}

#[test]
fn test_remove_request_clears_the_object() {
    let mut app = TestGrid::new();
    let id = placed(app.grid_mut().place_filling(
        0,
        CellCoord::new(5, 5),
        &wall(),
        Direction::North,
        None,
    ));
    app.send(RemoveRequested(id));
    app.tick(1);
    app.assert_empty(0, CellCoord::new(5, 5));
    assert!(app.grid().object(id).is_none());
}
