//! Perspective projection with change tracking.

use glam::Mat4;

use crate::abs::Gl;

/// Perspective camera. The projection is recomputed and pushed to the
/// backend only when a parameter actually changed.
#[derive(Debug, Clone)]
pub struct Camera {
    fov_y_degrees: f32,
    aspect_ratio: f32,
    z_near: f32,
    z_far: f32,
    dirty: bool,
}

impl Camera {
    pub fn new(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y_degrees,
            aspect_ratio,
            z_near,
            z_far,
            dirty: true,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if self.aspect_ratio != aspect_ratio {
            self.aspect_ratio = aspect_ratio;
            self.dirty = true;
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.z_near,
            self.z_far,
        )
    }

    /// Uploads the projection if it changed since the last call.
    pub fn apply(&mut self, gl: &dyn Gl) {
        if self.dirty {
            gl.set_projection_matrix(self.matrix());
            self.dirty = false;
        }
    }
}
