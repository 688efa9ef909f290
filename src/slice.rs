//! Row and column turns.
//!
//! A slice is picked by the live, rounded position of each cubelet rather than
//! its creation identity. Rows turn about the world Y axis and columns about
//! the world X axis.

use std::f32::consts::FRAC_PI_2;

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::cube::{CubeGrid, GRID_CENTER};

/// Which family of slices a turn addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SliceAxis {
    /// Cubelets sharing a rounded y, turned about Y.
    Row,
    /// Cubelets sharing a rounded x, turned about X.
    Column,
}

impl SliceAxis {
    fn rotation_axis(self) -> nalgebra::Unit<Vector3<f32>> {
        match self {
            SliceAxis::Row => Vector3::y_axis(),
            SliceAxis::Column => Vector3::x_axis(),
        }
    }
}

/// A single quarter turn of one slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SliceTurn {
    pub(crate) axis: SliceAxis,
    pub(crate) index: i32,
    pub(crate) clockwise: bool,
}

impl SliceTurn {
    pub(crate) fn row(index: i32, clockwise: bool) -> Self {
        Self {
            axis: SliceAxis::Row,
            index,
            clockwise,
        }
    }

    pub(crate) fn column(index: i32, clockwise: bool) -> Self {
        Self {
            axis: SliceAxis::Column,
            index,
            clockwise,
        }
    }

    /// World-space rotation this turn applies.
    pub(crate) fn rotation(&self) -> UnitQuaternion<f32> {
        let angle = if self.clockwise { FRAC_PI_2 } else { -FRAC_PI_2 };
        UnitQuaternion::from_axis_angle(&self.axis.rotation_axis(), angle)
    }
}

/// What a turn does to the cubelets it selects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TurnMode {
    /// Each cubelet spins about its own centre; positions never change.
    #[default]
    InPlace,
    /// Cubelets also orbit the rotation axis and land on the neighbouring
    /// lattice site, like a physical slice turn.
    Orbit,
}

/// Slice index of a centre coordinate on a lattice of spacing `pitch`:
/// `round(coord / pitch + 1.5)`.
pub(crate) fn slice_index(coord: f32, pitch: f32) -> i32 {
    (coord / pitch + GRID_CENTER).round() as i32
}

impl CubeGrid {
    /// Turn every cubelet whose rounded y equals `row` a quarter turn about Y.
    ///
    /// Returns how many cubelets moved. An index that matches nothing is a no-op.
    pub(crate) fn rotate_row(&mut self, row: i32, clockwise: bool, mode: TurnMode) -> usize {
        self.apply_turn(SliceTurn::row(row, clockwise), mode)
    }

    /// Turn every cubelet whose rounded x equals `column` a quarter turn about X.
    pub(crate) fn rotate_column(&mut self, column: i32, clockwise: bool, mode: TurnMode) -> usize {
        self.apply_turn(SliceTurn::column(column, clockwise), mode)
    }

    pub(crate) fn apply_turn(&mut self, turn: SliceTurn, mode: TurnMode) -> usize {
        let rotation = turn.rotation();
        let pitch = self.pitch();
        let mut turned = 0;

        for cubelet in &mut self.cubelets {
            let coord = match turn.axis {
                SliceAxis::Row => cubelet.position.y,
                SliceAxis::Column => cubelet.position.x,
            };
            if slice_index(coord, pitch) != turn.index {
                continue;
            }

            cubelet.orientation = rotation * cubelet.orientation;
            cubelet.orientation.renormalize();
            if mode == TurnMode::Orbit {
                cubelet.position = snap_to_lattice(rotation * cubelet.position, pitch);
            }
            turned += 1;
        }

        log::debug!(
            "{:?} {} turned {} ({} cubelets)",
            turn.axis,
            turn.index,
            if turn.clockwise { "clockwise" } else { "counterclockwise" },
            turned
        );
        turned
    }
}

/// Pull a rotated position back onto the nearest grid site.
fn snap_to_lattice(position: Vector3<f32>, pitch: f32) -> Vector3<f32> {
    position.map(|coord| pitch * ((coord / pitch + GRID_CENTER).round() - GRID_CENTER))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::CubeSettings;
    use crate::cube::{CubeletId, CUBELET_COUNT};

    fn grid() -> CubeGrid {
        CubeGrid::new(&CubeSettings::default())
    }

    fn orientations(grid: &CubeGrid) -> Vec<UnitQuaternion<f32>> {
        grid.cubelets.iter().map(|c| c.orientation).collect()
    }

    fn same_orientations(a: &[UnitQuaternion<f32>], b: &[UnitQuaternion<f32>]) -> bool {
        a.iter().zip(b).all(|(qa, qb)| qa.angle_to(qb) < 1e-4)
    }

    #[test]
    fn rest_positions_snap_to_their_logical_index() {
        let grid = grid();
        for cubelet in &grid.cubelets {
            let id = cubelet.id();
            assert_eq!(slice_index(cubelet.position.x, grid.pitch()), i32::from(id.x));
            assert_eq!(slice_index(cubelet.position.y, grid.pitch()), i32::from(id.y));
        }
    }

    #[test]
    fn wide_pitch_turns_whole_layers() {
        let settings = CubeSettings {
            cubelet_size: 2.0,
            spacing: 0.5,
            ..CubeSettings::default()
        };
        let mut grid = CubeGrid::new(&settings);
        for cubelet in &grid.cubelets {
            let id = cubelet.id();
            assert_eq!(slice_index(cubelet.position.y, grid.pitch()), i32::from(id.y));
        }
        for index in 0..4 {
            assert_eq!(grid.rotate_row(index, true, TurnMode::InPlace), 16);
            assert_eq!(grid.rotate_column(index, true, TurnMode::Orbit), 16);
        }
        assert_eq!(grid.rotate_row(4, true, TurnMode::InPlace), 0);
    }

    #[test]
    fn row_turn_touches_one_layer_about_y() {
        let mut grid = grid();
        let turned = grid.rotate_row(2, true, TurnMode::InPlace);
        assert_eq!(turned, 16);

        let expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        for cubelet in &grid.cubelets {
            if cubelet.id().y == 2 {
                assert!(cubelet.orientation.angle_to(&expected) < 1e-5);
            } else {
                assert_eq!(cubelet.orientation, UnitQuaternion::identity());
            }
        }
    }

    #[test]
    fn column_turn_uses_x_axis_and_negative_angle() {
        let mut grid = grid();
        assert_eq!(grid.rotate_column(0, false, TurnMode::InPlace), 16);

        let expected = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2);
        let cubelet = grid.find(CubeletId::new(0, 3, 1)).unwrap();
        assert!(cubelet.orientation.angle_to(&expected) < 1e-5);
    }

    #[test]
    fn turns_compose_onto_existing_orientation() {
        let mut grid = grid();
        grid.rotate_row(1, true, TurnMode::InPlace);
        grid.rotate_column(1, true, TurnMode::InPlace);

        let row = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let column = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
        let both = grid.find(CubeletId::new(1, 1, 0)).unwrap();
        assert!(both.orientation.angle_to(&(column * row)) < 1e-5);
    }

    #[test]
    fn in_place_turns_never_move_cubelets() {
        let mut grid = grid();
        let before: Vec<_> = grid.cubelets.iter().map(|c| c.position).collect();
        for index in 0..4 {
            grid.rotate_row(index, true, TurnMode::InPlace);
            grid.rotate_column(index, false, TurnMode::InPlace);
        }
        let after: Vec<_> = grid.cubelets.iter().map(|c| c.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn orbit_turn_moves_cubelets_to_lattice_sites() {
        let mut grid = grid();
        assert_eq!(grid.rotate_row(3, true, TurnMode::Orbit), 16);

        // +90 degrees about Y sends +x to -z.
        let cubelet = grid.find(CubeletId::new(3, 3, 3)).unwrap();
        assert!((cubelet.position - Vector3::new(1.65, 1.65, -1.65)).norm() < 1e-5);
        let moved = grid.find(CubeletId::new(3, 3, 0)).unwrap();
        assert!((moved.position - Vector3::new(-1.65, 1.65, -1.65)).norm() < 1e-5);

        for cubelet in &grid.cubelets {
            assert_eq!(slice_index(cubelet.position.y, grid.pitch()), i32::from(cubelet.id().y));
        }
    }

    #[test]
    fn four_orbit_turns_restore_positions() {
        let mut grid = grid();
        let before: Vec<_> = grid.cubelets.iter().map(|c| c.position).collect();
        for _ in 0..4 {
            grid.rotate_column(1, true, TurnMode::Orbit);
        }
        for (cubelet, start) in grid.cubelets.iter().zip(&before) {
            assert!((cubelet.position - start).norm() < 1e-5);
        }
    }

    #[test]
    fn shuffle_range_index_four_is_a_no_op() {
        let mut grid = grid();
        let before = orientations(&grid);
        assert_eq!(grid.rotate_column(4, false, TurnMode::InPlace), 0);
        assert_eq!(grid.rotate_row(4, true, TurnMode::Orbit), 0);
        assert_eq!(orientations(&grid), before);
    }

    proptest! {
        #[test]
        fn opposite_turn_restores_orientation(
            index in 0i32..4,
            column in any::<bool>(),
            clockwise in any::<bool>(),
            warmup in proptest::collection::vec((0i32..4, any::<bool>(), any::<bool>()), 0..8),
        ) {
            let mut grid = grid();
            for (i, is_column, cw) in warmup {
                let axis_turn = if is_column { SliceTurn::column(i, cw) } else { SliceTurn::row(i, cw) };
                grid.apply_turn(axis_turn, TurnMode::InPlace);
            }
            let before = orientations(&grid);

            let forward = if column { SliceTurn::column(index, clockwise) } else { SliceTurn::row(index, clockwise) };
            let backward = SliceTurn { clockwise: !clockwise, ..forward };
            prop_assert_eq!(grid.apply_turn(forward, TurnMode::InPlace), 16);
            grid.apply_turn(backward, TurnMode::InPlace);

            prop_assert!(same_orientations(&orientations(&grid), &before));
        }

        #[test]
        fn out_of_range_index_changes_nothing(
            index in prop_oneof![-100i32..0, 4i32..100],
            column in any::<bool>(),
            clockwise in any::<bool>(),
        ) {
            let mut grid = grid();
            let before_orientations = orientations(&grid);
            let before_positions: Vec<_> = grid.cubelets.iter().map(|c| c.position).collect();

            let turned = if column {
                grid.rotate_column(index, clockwise, TurnMode::Orbit)
            } else {
                grid.rotate_row(index, clockwise, TurnMode::Orbit)
            };

            prop_assert_eq!(turned, 0);
            prop_assert_eq!(grid.cubelets.len(), CUBELET_COUNT);
            prop_assert_eq!(orientations(&grid), before_orientations);
            let after_positions: Vec<_> = grid.cubelets.iter().map(|c| c.position).collect();
            prop_assert_eq!(after_positions, before_positions);
        }
    }
}
