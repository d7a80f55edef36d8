//! Orbiting eye point.
//!
//! The eye rides a circle of configurable radius around the look-at
//! point, with a vertical lift. Spinning and lifting mark the view dirty;
//! the view matrix is rebuilt and uploaded only when something changed.

use glam::{Mat4, Vec3};

use crate::abs::Gl;

#[derive(Debug, Clone)]
pub struct View {
    initial_eye: Vec3,
    at: Vec3,
    up: Vec3,
    radius: f32,
    angle: f32,
    height: f32,
    dirty: bool,
}

impl View {
    pub fn new(eye: Vec3, at: Vec3, up: Vec3) -> Self {
        let mut view = Self {
            initial_eye: eye,
            at,
            up,
            radius: 0.0,
            angle: 0.0,
            height: 0.0,
            dirty: true,
        };
        view.reset();
        view
    }

    /// Returns the orbit to its starting pose: the radius is the distance
    /// from the initial eye to the look-at point, angle and lift are zero.
    pub fn reset(&mut self) {
        self.radius = self.initial_eye.distance(self.at);
        self.angle = 0.0;
        self.height = 0.0;
        self.dirty = true;
    }

    pub fn spin_degrees(&mut self, degrees: f32) {
        self.angle += degrees.to_radians();
        self.dirty = true;
    }

    pub fn lift(&mut self, height: f32) {
        self.height += height;
        self.dirty = true;
    }

    /// Moves the eye along the orbit radius. The radius never collapses
    /// onto the look-at point.
    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius - delta).max(0.5);
        self.dirty = true;
    }

    pub fn at(&self) -> Vec3 {
        self.at
    }

    pub fn eye_position(&self) -> Vec3 {
        self.at
            + Vec3::new(
                self.radius * self.angle.sin(),
                self.height,
                self.radius * self.angle.cos(),
            )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.at, self.up)
    }

    /// Uploads the view matrix if the orbit moved since the last call.
    pub fn apply(&mut self, gl: &dyn Gl) {
        if self.dirty {
            gl.set_view_matrix(self.matrix());
            self.dirty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::trace::TraceGl;
    use std::rc::Rc;

    fn default_view() -> View {
        View::new(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO, Vec3::Y)
    }

    #[test]
    fn orbit_radius_is_the_full_initial_distance() {
        let view = default_view();
        let expected = (1.0f32 + 25.0).sqrt();
        assert!((view.eye_position() - Vec3::new(0.0, 0.0, expected)).length() < 1e-5);
    }

    #[test]
    fn spinning_a_quarter_turn_moves_the_eye_onto_the_x_axis() {
        let mut view = default_view();
        view.spin_degrees(90.0);
        let eye = view.eye_position();
        let radius = (26.0f32).sqrt();
        assert!((eye.x - radius).abs() < 1e-4);
        assert!(eye.z.abs() < 1e-4);
        assert_eq!(eye.y, 0.0);
    }

    #[test]
    fn lift_raises_the_eye_without_changing_the_orbit() {
        let mut view = default_view();
        view.lift(0.4);
        view.lift(0.4);
        let eye = view.eye_position();
        assert!((eye.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zoom_shortens_the_radius_but_never_reaches_the_target() {
        let mut view = default_view();
        view.zoom(1.0);
        let radius = (26.0f32).sqrt() - 1.0;
        assert!((view.eye_position().z - radius).abs() < 1e-5);

        view.zoom(1000.0);
        assert!((view.eye_position().z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn reset_restores_the_pose_and_forces_a_reupload() {
        let gl = Rc::new(TraceGl::new());
        let program = gl.create_program().unwrap();
        gl.use_program(Some(program));

        let mut view = default_view();
        view.apply(gl.as_ref());
        view.spin_degrees(45.0);
        view.lift(1.0);
        view.apply(gl.as_ref());
        gl.clear_log();

        view.reset();
        view.apply(gl.as_ref());
        let uploads = gl
            .uniform_events()
            .iter()
            .filter(|e| e.name == "view")
            .count();
        assert_eq!(uploads, 1);
        assert_eq!(view.eye_position().y, 0.0);
    }

    #[test]
    fn clean_view_uploads_nothing() {
        let gl = Rc::new(TraceGl::new());
        let program = gl.create_program().unwrap();
        gl.use_program(Some(program));

        let mut view = default_view();
        view.apply(gl.as_ref());
        gl.clear_log();
        view.apply(gl.as_ref());
        assert!(gl.uniform_events().is_empty());
    }
}
