//! # TestGrid: headless harness for placement tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` and [`PlacementPlugin`] so
//! tests can send request events, advance time in fixed steps and assert on
//! the resulting grid state.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::building_grid::BuildingGrid;
use crate::cell::Slot;
use crate::coords::CellCoord;
use crate::events::{PlacementFailed, PlacementSucceeded};
use crate::objects::{Category, ObjectId};
use crate::params::PlacementParams;
use crate::plugin::{ActiveDrags, PlacementPlugin};
use crate::policy::AreaPolicies;
use crate::result_log::PlacementLog;

/// Seconds of virtual time that pass per [`TestGrid::tick`].
pub const TICK_SECONDS: f32 = 0.1;

/// A headless Bevy App running the placement systems.
pub struct TestGrid {
    app: App,
}

impl Default for TestGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TestGrid {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// A 16x16, two-layer grid with a one-second drag interval.
    pub fn new() -> Self {
        Self::with_params(PlacementParams {
            width: 16,
            length: 16,
            placement_interval: 1.0,
            ..Default::default()
        })
    }

    pub fn with_params(params: PlacementParams) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(
            Duration::from_secs_f32(TICK_SECONDS),
        ));
        app.insert_resource(params);
        app.add_plugins(PlacementPlugin);
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Setup (builder pattern: consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_policies(mut self, policies: AreaPolicies) -> Self {
        self.grid_mut().policies = policies;
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Run `n` frames, each advancing time by [`TICK_SECONDS`].
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    pub fn send<E: Event>(&mut self, event: E) {
        self.app.world_mut().send_event(event);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn grid(&self) -> &BuildingGrid {
        self.app.world().resource::<BuildingGrid>()
    }

    pub fn grid_mut(&mut self) -> Mut<'_, BuildingGrid> {
        self.app.world_mut().resource_mut::<BuildingGrid>()
    }

    pub fn log(&self) -> &PlacementLog {
        self.app.world().resource::<PlacementLog>()
    }

    pub fn active_drags(&self) -> usize {
        self.app.world().resource::<ActiveDrags>().len()
    }

    pub fn live_objects(&self) -> usize {
        self.grid().objects().live_count()
    }

    pub fn occupant(&self, layer: usize, cell: CellCoord, slot: Slot, category: &str) -> Option<ObjectId> {
        self.grid()
            .occupant(layer, cell, slot, &Category::new(category))
    }

    /// Every `PlacementSucceeded` sent since the last drain.
    pub fn drain_successes(&mut self) -> Vec<PlacementSucceeded> {
        self.app
            .world_mut()
            .resource_mut::<Events<PlacementSucceeded>>()
            .drain()
            .collect()
    }

    /// Every `PlacementFailed` sent since the last drain.
    pub fn drain_failures(&mut self) -> Vec<PlacementFailed> {
        self.app
            .world_mut()
            .resource_mut::<Events<PlacementFailed>>()
            .drain()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_occupied(&self, layer: usize, cell: CellCoord, slot: Slot, category: &str) {
        assert!(
            self.occupant(layer, cell, slot, category).is_some(),
            "expected {category} in {slot:?} of {cell:?} on layer {layer}"
        );
    }

    pub fn assert_empty(&self, layer: usize, cell: CellCoord) {
        let snapshot = self.grid().cell_occupancy(layer, cell);
        assert!(
            snapshot.is_empty(),
            "expected {cell:?} on layer {layer} to be empty, found {:?}",
            snapshot.record
        );
    }
}
