use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::CubeSettings;

/// Converts nalgebra's OpenGL clip space (z in -1..1) to wgpu's (z in 0..1).
#[rustfmt::skip]
fn opengl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[derive(Debug, Clone)]
pub(crate) struct Camera {
    pub(crate) eye: Point3<f32>,
    pub(crate) target: Point3<f32>,
    pub(crate) up: Vector3<f32>,
}

impl Camera {
    /// Camera on the +z axis looking at the origin.
    pub(crate) fn looking_at_origin(distance: f32) -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, distance),
            target: Point3::origin(),
            up: Vector3::y(),
        }
    }

    pub(crate) fn build_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye, &self.target, &self.up)
    }

    /// Slide the camera along z by `delta`, keeping z within `[min, max]`.
    pub(crate) fn dolly(&mut self, delta: f32, min: f32, max: f32) {
        self.eye.z = (self.eye.z + delta).clamp(min, max);
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Projection {
    pub(crate) aspect: f32,
    /// Vertical field of view in degrees.
    pub(crate) fovy: f32,
    pub(crate) znear: f32,
    pub(crate) zfar: f32,
}

impl Projection {
    pub(crate) fn from_settings(settings: &CubeSettings, aspect: f32) -> Self {
        Self {
            aspect,
            fovy: settings.fov_degrees,
            znear: settings.znear,
            zfar: settings.zfar,
        }
    }

    /// OpenGL-convention perspective matrix, used for unprojecting pointer rays.
    pub(crate) fn build_projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fovy.to_radians(), self.znear, self.zfar)
    }

    pub(crate) fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CameraUniform {
    pub(crate) view_proj: [[f32; 4]; 4],
    /// Eye position, w unused.
    pub(crate) eye: [f32; 4],
}

impl CameraUniform {
    pub(crate) fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            eye: [0.0; 4],
        }
    }

    pub(crate) fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (opengl_to_wgpu()
            * projection.build_projection_matrix()
            * camera.build_view_matrix())
        .into();
        self.eye = [camera.eye.x, camera.eye.y, camera.eye.z, 1.0];
    }
}
