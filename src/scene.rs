//! The scene the interaction layer talks to.
//!
//! [`SceneHost`] is the seam between input handling and whatever owns the
//! camera and the cubelets. [`CubeScene`] is the CPU-side host backing the
//! renderer: it keeps the grid, the camera and the intro animation, and
//! answers pointer-ray queries by casting against the grid.

use std::time::Duration;

use nalgebra::{Point2, Point3, Vector3};

use crate::camera::{Camera, Projection};
use crate::config::CubeSettings;
use crate::cube::{CubeGrid, CubeletId};
use crate::ray_casting::{calculate_mouse_ray, find_intersected_cubelet};
use crate::tween::{Easing, Tween};

/// Nearest cubelet under a pointer ray.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Hit {
    pub(crate) id: CubeletId,
    /// Cubelet centre in world space.
    pub(crate) world_position: Point3<f32>,
    /// Cubelet centre relative to the aggregate transform.
    pub(crate) local_position: Vector3<f32>,
    pub(crate) distance: f32,
}

pub(crate) trait SceneHost {
    fn camera(&self) -> &Camera;
    fn camera_mut(&mut self) -> &mut Camera;
    fn grid(&self) -> &CubeGrid;
    fn grid_mut(&mut self) -> &mut CubeGrid;
    /// Cast a ray through `ndc` and return the nearest cubelet, if any.
    fn intersect(&self, ndc: Point2<f32>) -> Option<Hit>;
}

#[derive(Debug, Clone)]
pub(crate) struct CubeScene {
    pub(crate) grid: CubeGrid,
    pub(crate) camera: Camera,
    pub(crate) projection: Projection,
    intro: Option<Tween>,
}

impl CubeScene {
    /// Fresh scene with the grid dropped below the origin, ready to animate in.
    pub(crate) fn new(settings: &CubeSettings) -> Self {
        let mut grid = CubeGrid::new(settings);
        let start = Vector3::new(0.0, -settings.intro_drop, 0.0);
        grid.aggregate.position = start;

        Self {
            grid,
            camera: Camera::looking_at_origin(settings.camera_distance),
            projection: Projection::from_settings(settings, 1.0),
            intro: Some(Tween::new(
                start,
                Vector3::zeros(),
                settings.intro_duration(),
                Easing::ExponentialOut,
            )),
        }
    }

    /// Scene with the grid already at rest, skipping the intro.
    #[cfg(test)]
    pub(crate) fn settled(settings: &CubeSettings) -> Self {
        let mut scene = Self::new(settings);
        scene.grid.aggregate.position = Vector3::zeros();
        scene.intro = None;
        scene
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.intro.is_some()
    }

    /// Advance owned interpolations by one frame.
    pub(crate) fn advance_frame(&mut self, dt: Duration) {
        if let Some(intro) = &mut self.intro {
            self.grid.aggregate.position = intro.advance(dt);
            if intro.is_finished() {
                log::debug!("intro animation finished");
                self.intro = None;
            }
        }
    }
}

impl SceneHost for CubeScene {
    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn grid(&self) -> &CubeGrid {
        &self.grid
    }

    fn grid_mut(&mut self) -> &mut CubeGrid {
        &mut self.grid
    }

    fn intersect(&self, ndc: Point2<f32>) -> Option<Hit> {
        let ray = match calculate_mouse_ray(ndc, &self.camera, &self.projection) {
            Ok(ray) => ray,
            Err(err) => {
                log::warn!("cannot cast pointer ray: {err}");
                return None;
            }
        };

        let (index, distance) = find_intersected_cubelet(&ray, &self.grid)?;
        let cubelet = &self.grid.cubelets[index];
        let world = cubelet.world_transform(&self.grid.aggregate);
        Some(Hit {
            id: cubelet.id(),
            world_position: Point3::from(world.translation.vector),
            local_position: cubelet.position,
            distance,
        })
    }
}
