//! Request and result events exchanged with the host app.

use bevy::prelude::*;

use crate::building_grid::PlacementRequest;
use crate::objects::ObjectId;
use crate::results::PlacementError;
use crate::sequence::DragRequest;

/// Place a single object.
#[derive(Event, Debug, Clone)]
pub struct PlacementRequested(pub PlacementRequest);

/// Start a paced drag placement.
#[derive(Event, Debug, Clone)]
pub struct DragRequested(pub DragRequest);

/// Stop every running drag. Targets already placed stay placed.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct DragCancelled;

/// Whether the grid accepts placement requests.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GridMode {
    #[default]
    Build,
    Disabled,
}

/// Switch the grid mode. Any change cancels running drags.
#[derive(Event, Debug, Clone, Copy)]
pub struct GridModeChanged(pub GridMode);

#[derive(Event, Debug, Clone, Copy)]
pub struct RemoveRequested(pub ObjectId);

/// Marker event: revert the most recent edit.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct UndoRequested;

/// Marker event: re-apply the most recently undone edit.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RedoRequested;

#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlacementSucceeded {
    pub object: ObjectId,
    pub descriptor: String,
    pub layer: usize,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlacementFailed {
    pub descriptor: String,
    pub layer: usize,
    pub error: PlacementError,
}
