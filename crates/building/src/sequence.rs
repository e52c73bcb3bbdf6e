//! Paced, cancellable execution of drag patterns.
//!
//! A [`PlacementSequence`] owns the precomputed target list of one drag and
//! hands out batches over time: the first batch immediately, each following
//! batch once `interval` seconds have accumulated. Cancelling drops whatever
//! is left; targets already handed out stay placed.

use serde::{Deserialize, Serialize};

use crate::building_grid::TargetSpec;
use crate::coords::{CellCoord, CellRect, Corner, Direction};
use crate::objects::ObjectDescriptor;
use crate::shape::{
    expand_cells_within, expand_corners_within, expand_edges_within, PlacementPattern,
};

/// What kind of slot each cell of a drag targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragTopology {
    Filling { direction: Direction },
    Edge { direction: Direction },
    Corner { corner: Corner },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragRequest {
    pub layer: usize,
    pub pattern: PlacementPattern,
    pub topology: DragTopology,
    pub origin: CellCoord,
    pub end: Option<CellCoord>,
    pub endpoints_only: bool,
    pub descriptor: ObjectDescriptor,
    /// Explicit variant index; weighted random selection when `None`.
    pub variant: Option<usize>,
    pub ignore_replacement: bool,
}

impl DragRequest {
    pub fn new(
        layer: usize,
        pattern: PlacementPattern,
        topology: DragTopology,
        origin: CellCoord,
        end: CellCoord,
        descriptor: ObjectDescriptor,
    ) -> Self {
        Self {
            layer,
            pattern,
            topology,
            origin,
            end: Some(end),
            endpoints_only: false,
            descriptor,
            variant: None,
            ignore_replacement: false,
        }
    }

    pub fn endpoints_only(mut self) -> Self {
        self.endpoints_only = true;
        self
    }

    /// Ordered placement targets for this drag.
    pub fn targets(&self) -> Vec<TargetSpec> {
        self.targets_within(&CellRect::UNBOUNDED)
    }

    /// Ordered placement targets that fall inside `clip`.
    pub fn targets_within(&self, clip: &CellRect) -> Vec<TargetSpec> {
        match self.topology {
            DragTopology::Filling { direction } => expand_cells_within(
                self.pattern,
                self.origin,
                self.end,
                self.endpoints_only,
                clip,
            )
            .into_iter()
            .map(|cell| TargetSpec::Filling { cell, direction })
            .collect(),
            DragTopology::Edge { direction } => expand_edges_within(
                self.pattern,
                self.origin,
                self.end,
                self.endpoints_only,
                direction,
                clip,
            )
            .into_iter()
            .map(|t| TargetSpec::Edge {
                cell: t.cell,
                direction: t.direction,
                flipped: t.flipped,
            })
            .collect(),
            DragTopology::Corner { corner } => expand_corners_within(
                self.pattern,
                self.origin,
                self.end,
                self.endpoints_only,
                corner,
                clip,
            )
            .into_iter()
            .map(|t| TargetSpec::Corner {
                cell: t.cell,
                corner: t.corner,
            })
            .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacementSequence {
    request: DragRequest,
    targets: Vec<TargetSpec>,
    cursor: usize,
    interval: f32,
    batch_size: usize,
    elapsed: f32,
    started: bool,
    cancelled: bool,
}

impl PlacementSequence {
    pub fn new(request: DragRequest, interval: f32, batch_size: usize) -> Self {
        Self::clipped(request, &CellRect::UNBOUNDED, interval, batch_size)
    }

    /// A sequence over the targets of `request` that fall inside `clip`.
    pub fn clipped(
        request: DragRequest,
        clip: &CellRect,
        interval: f32,
        batch_size: usize,
    ) -> Self {
        let targets = request.targets_within(clip);
        Self {
            request,
            targets,
            cursor: 0,
            interval: interval.max(0.0),
            batch_size: batch_size.max(1),
            elapsed: 0.0,
            started: false,
            cancelled: false,
        }
    }

    pub fn request(&self) -> &DragRequest {
        &self.request
    }

    pub fn targets(&self) -> &[TargetSpec] {
        &self.targets
    }

    fn take_batch(&mut self, count: usize) -> &[TargetSpec] {
        let start = self.cursor;
        self.cursor = (start + count).min(self.targets.len());
        &self.targets[start..self.cursor]
    }

    /// Advance the clock by `dt` seconds and return the targets now due.
    pub fn advance(&mut self, dt: f32) -> Vec<TargetSpec> {
        if self.is_finished() {
            return Vec::new();
        }
        if self.interval <= 0.0 {
            self.started = true;
            let remaining = self.remaining();
            return self.take_batch(remaining).to_vec();
        }
        if !self.started {
            self.started = true;
            return self.take_batch(self.batch_size).to_vec();
        }

        self.elapsed += dt.max(0.0);
        let mut due = Vec::new();
        while self.elapsed >= self.interval && self.remaining() > 0 {
            self.elapsed -= self.interval;
            due.extend_from_slice(self.take_batch(self.batch_size));
        }
        due
    }

    /// Drop every target not yet handed out.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.cancelled || self.cursor >= self.targets.len()
    }

    pub fn remaining(&self) -> usize {
        if self.cancelled {
            0
        } else {
            self.targets.len() - self.cursor
        }
    }

    pub fn placed(&self) -> usize {
        self.cursor
    }
}
