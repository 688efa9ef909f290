//! Ray casting for pointer-based cubelet picking.
//!
//! Pointer positions are unprojected into a world-space ray, which is then
//! tested against every cubelet as an oriented box: the ray is carried into
//! the cubelet's local frame and checked against an axis-aligned box there.

use nalgebra::{Point2, Point3, Vector3, Vector4};

use crate::camera::{Camera, Projection};
use crate::cube::CubeGrid;
use crate::error::{CubeError, Result};

/// 3D ray for intersection testing
#[derive(Debug, Clone)]
pub(crate) struct Ray {
    pub(crate) origin: Point3<f32>,
    /// Normalized direction.
    pub(crate) direction: Vector3<f32>,
}

/// Axis-aligned bounding box in 3D space
#[derive(Debug, Clone)]
pub(crate) struct Aabb {
    pub(crate) min: Point3<f32>,
    pub(crate) max: Point3<f32>,
}

impl Aabb {
    /// Create an AABB centered at a point with given edge length
    pub(crate) fn from_center_size(center: Point3<f32>, size: f32) -> Self {
        let half = Vector3::repeat(size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }
}

/// Convert a pointer position in pixels to normalized device coordinates.
pub(crate) fn pointer_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(2.0 * x / width - 1.0, 1.0 - 2.0 * y / height)
}

/// Calculate the world-space ray under a point given in normalized device coordinates
pub(crate) fn calculate_mouse_ray(
    ndc: Point2<f32>,
    camera: &Camera,
    projection: &Projection,
) -> Result<Ray> {
    let view_proj = projection.build_projection_matrix() * camera.build_view_matrix();
    let inv_view_proj = view_proj.try_inverse().ok_or(CubeError::Unprojectable)?;

    let near = inv_view_proj * Vector4::new(ndc.x, ndc.y, -1.0, 1.0);
    let far = inv_view_proj * Vector4::new(ndc.x, ndc.y, 1.0, 1.0);

    let near = Point3::from_homogeneous(near).ok_or(CubeError::Unprojectable)?;
    let far = Point3::from_homogeneous(far).ok_or(CubeError::Unprojectable)?;

    let direction = (far - near).normalize();
    if !direction.iter().chain(near.coords.iter()).all(|c| c.is_finite()) {
        return Err(CubeError::Unprojectable);
    }

    Ok(Ray {
        origin: near,
        direction,
    })
}

/// Slab test. Returns the distance along the ray to the box, if it is hit.
///
/// A ray starting inside the box reports its exit distance.
pub(crate) fn ray_aabb_intersection(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = ray.direction.map(|d| 1.0 / d);

    let t1 = (aabb.min - ray.origin).component_mul(&inv_dir);
    let t2 = (aabb.max - ray.origin).component_mul(&inv_dir);

    let tmin = t1.x.min(t2.x).max(t1.y.min(t2.y)).max(t1.z.min(t2.z));
    let tmax = t1.x.max(t2.x).min(t1.y.max(t2.y)).min(t1.z.max(t2.z));

    if !tmin.is_finite() || !tmax.is_finite() || tmax < 0.0 || tmin > tmax {
        None
    } else if tmin >= 0.0 {
        Some(tmin)
    } else {
        Some(tmax)
    }
}

/// Nearest cubelet hit by the ray, as `(index into grid.cubelets, distance)`.
pub(crate) fn find_intersected_cubelet(ray: &Ray, grid: &CubeGrid) -> Option<(usize, f32)> {
    let local_box = Aabb::from_center_size(Point3::origin(), grid.cubelet_size());

    grid.cubelets
        .iter()
        .enumerate()
        .filter_map(|(index, cubelet)| {
            let world = cubelet.world_transform(&grid.aggregate);
            // Isometries preserve length, so the local hit distance is the world one.
            let local_ray = Ray {
                origin: world.inverse_transform_point(&ray.origin),
                direction: world.inverse_transform_vector(&ray.direction),
            };
            ray_aabb_intersection(&local_ray, &local_box).map(|distance| (index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
