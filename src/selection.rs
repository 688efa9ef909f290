//! Pointer-driven row/column selection.
//!
//! The cubelet under the pointer decides the index; the direction from the
//! camera to that cubelet decides whether a row or a column is meant.

use nalgebra::{Point2, Vector3};
use rand::Rng;

use crate::cube::GRID_DIM;
use crate::scene::SceneHost;
use crate::slice::slice_index;

/// Outcome of a resolved pointer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selected {
    Row(i32),
    Column(i32),
}

/// Currently selected row and column plus the two indicator flags shown in
/// the control pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectionState {
    pub(crate) row: i32,
    pub(crate) column: i32,
    pub(crate) row_indicator: bool,
    pub(crate) column_indicator: bool,
}

impl SelectionState {
    /// Pick a row or column from the cubelet under `ndc`.
    ///
    /// A miss leaves the selection untouched and returns `None`.
    pub(crate) fn resolve(&mut self, scene: &impl SceneHost, ndc: Point2<f32>) -> Option<Selected> {
        let hit = scene.intersect(ndc)?;

        let direction = (hit.world_position - scene.camera().eye).normalize();
        let angle_x = direction.angle(&Vector3::x());
        let angle_y = direction.angle(&Vector3::y());

        let pitch = scene.grid().pitch();
        let selected = if angle_x < angle_y {
            self.column = slice_index(hit.local_position.x, pitch);
            self.column_indicator = !self.column_indicator;
            Selected::Column(self.column)
        } else {
            self.row = slice_index(hit.local_position.y, pitch);
            self.row_indicator = !self.row_indicator;
            Selected::Row(self.row)
        };

        log::debug!("cubelet {} at {:.2} selected {:?}", hit.id, hit.distance, selected);
        Some(selected)
    }

    /// Jump to a random row and column and flip both indicators.
    pub(crate) fn randomize(&mut self, rng: &mut impl Rng) {
        let dim = i32::from(GRID_DIM);
        self.row = rng.gen_range(0..dim);
        self.column = rng.gen_range(0..dim);
        self.row_indicator = !self.row_indicator;
        self.column_indicator = !self.column_indicator;
        log::debug!("randomized selection to row {} column {}", self.row, self.column);
    }
}
