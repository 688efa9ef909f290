//! Cubelet grid data structures and geometry.
//!
//! The puzzle is a 4x4x4 arrangement of cubelets hung under one aggregate
//! transform. Cubelets keep the identity they were created with; only their
//! orientation (and, in orbit mode, their position) changes afterwards.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3, Vector4};

use crate::config::CubeSettings;

/// Cubelets along each edge of the grid.
pub(crate) const GRID_DIM: u8 = 4;

/// Total number of cubelets in the grid.
pub(crate) const CUBELET_COUNT: usize = (GRID_DIM as usize).pow(3);

/// Offset that centres grid coordinates on the origin.
pub(crate) const GRID_CENTER: f32 = (GRID_DIM as f32 - 1.0) / 2.0;

/// Sticker colours. Every cubelet carries all six.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    White,
}

/// Face colours in +x, -x, +y, -y, +z, -z order.
pub(crate) const FACE_COLORS: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Orange,
    Color::White,
];

/// Outward normals matching [`FACE_COLORS`].
pub(crate) const FACE_NORMALS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

impl From<Color> for Vector4<f32> {
    fn from(color: Color) -> Self {
        match color {
            Color::Red => Vector4::new(1.0, 0.0, 0.0, 1.0),
            Color::Green => Vector4::new(0.0, 1.0, 0.0, 1.0),
            Color::Blue => Vector4::new(0.0, 0.0, 1.0, 1.0),
            Color::Yellow => Vector4::new(1.0, 1.0, 0.0, 1.0),
            Color::Orange => Vector4::new(1.0, 0.4, 0.0, 1.0),
            Color::White => Vector4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// Logical grid coordinate of a cubelet, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct CubeletId {
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) z: u8,
}

impl CubeletId {
    pub(crate) fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Rest position of this cubelet for a given centre-to-centre pitch.
    pub(crate) fn rest_position(self, pitch: f32) -> Vector3<f32> {
        Vector3::new(
            pitch * (f32::from(self.x) - GRID_CENTER),
            pitch * (f32::from(self.y) - GRID_CENTER),
            pitch * (f32::from(self.z) - GRID_CENTER),
        )
    }
}

impl std::fmt::Display for CubeletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One block of the puzzle.
#[derive(Clone, Debug)]
pub(crate) struct Cubelet {
    id: CubeletId,
    /// Position relative to the aggregate transform.
    pub(crate) position: Vector3<f32>,
    /// Accumulated slice turns.
    pub(crate) orientation: UnitQuaternion<f32>,
}

impl Cubelet {
    fn new(id: CubeletId, pitch: f32) -> Self {
        Self {
            id,
            position: id.rest_position(pitch),
            orientation: UnitQuaternion::identity(),
        }
    }

    pub(crate) fn id(&self) -> CubeletId {
        self.id
    }

    /// Transform relative to the aggregate.
    pub(crate) fn local_transform(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
    }

    /// World transform: aggregate transform composed with this cubelet's own.
    pub(crate) fn world_transform(&self, aggregate: &Aggregate) -> Isometry3<f32> {
        aggregate.transform() * self.local_transform()
    }
}

/// Whole-grid transform used for dragging and the intro animation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Aggregate {
    pub(crate) position: Vector3<f32>,
    pub(crate) orientation: UnitQuaternion<f32>,
}

impl Aggregate {
    pub(crate) fn transform(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
    }
}

impl Default for Aggregate {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }
}

/// The 64 cubelets plus their shared aggregate transform.
#[derive(Clone, Debug)]
pub(crate) struct CubeGrid {
    pub(crate) cubelets: Vec<Cubelet>,
    pub(crate) aggregate: Aggregate,
    cubelet_size: f32,
    pitch: f32,
}

impl CubeGrid {
    /// Builds the full grid in x, y, z nesting order with every cubelet at rest.
    pub(crate) fn new(settings: &CubeSettings) -> Self {
        let pitch = settings.pitch();
        let mut cubelets = Vec::with_capacity(CUBELET_COUNT);
        for x in 0..GRID_DIM {
            for y in 0..GRID_DIM {
                for z in 0..GRID_DIM {
                    cubelets.push(Cubelet::new(CubeletId::new(x, y, z), pitch));
                }
            }
        }

        Self {
            cubelets,
            aggregate: Aggregate::default(),
            cubelet_size: settings.cubelet_size,
            pitch,
        }
    }

    pub(crate) fn cubelet_size(&self) -> f32 {
        self.cubelet_size
    }

    pub(crate) fn pitch(&self) -> f32 {
        self.pitch
    }

    #[cfg(test)]
    pub(crate) fn find(&self, id: CubeletId) -> Option<&Cubelet> {
        self.cubelets.iter().find(|cubelet| cubelet.id == id)
    }
}

/// 36 vertices of a cube spanning [-1, 1], two triangles per face,
/// faces in [`FACE_COLORS`] order.
#[rustfmt::skip]
pub(crate) const CUBE_VERTICES: [[f32; 3]; 36] = [
    // +x
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    // -x
    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0],
    // +y
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],
    // -y
    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
    // +z
    [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],
    // -z
    [ 1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],
];
