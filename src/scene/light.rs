//! Point light on a circular orbit.

use glam::{Mat4, Vec3, Vec4};

use crate::abs::{Gl, GpuMesh, ShadingProgram};

/// Snapshot of a light handed to drawables each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightInfo {
    pub position: Vec3,
    pub color: Vec4,
}

/// Colored point light orbiting a center, drawn as a small marker sphere.
#[derive(Debug, Clone)]
pub struct Light {
    color: Vec3,
    center: Vec3,
    radius: f32,
    height: f32,
    angle: f32,
}

impl Light {
    pub fn new() -> Self {
        Self {
            color: Vec3::ONE,
            center: Vec3::ZERO,
            radius: 1.0,
            height: 0.0,
            angle: 0.0,
        }
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    pub fn spin_degrees(&mut self, degrees: f32) {
        self.angle += degrees.to_radians();
    }

    pub fn position(&self) -> Vec3 {
        self.center
            + Vec3::new(
                self.radius * self.angle.sin(),
                self.height,
                self.radius * self.angle.cos(),
            )
    }

    pub fn color(&self) -> Vec4 {
        self.color.extend(1.0)
    }

    pub fn info(&self) -> LightInfo {
        LightInfo {
            position: self.position(),
            color: self.color(),
        }
    }

    /// Draws the marker sphere at the light's position in its color.
    pub fn draw_marker(&self, gl: &dyn Gl, program: &mut ShadingProgram, sphere: &GpuMesh) {
        program.set_uniform("marker_color", self.color());
        gl.push_model_matrix(Mat4::from_translation(self.position()));
        sphere.draw();
        gl.pop_model_matrix();
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}
