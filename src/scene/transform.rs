//! Object placement with a cached inverse.

use glam::Mat4;

/// Model-to-world transform. The inverse is computed at most once per
/// change, on demand; drawables use it to move the eye and light into
/// object space every frame.
#[derive(Debug, Clone)]
pub struct Transform {
    matrix: Mat4,
    inverse: Option<Mat4>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            inverse: None,
        }
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            matrix,
            inverse: None,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn set_matrix(&mut self, m: Mat4) {
        self.matrix = m;
        self.inverse = None;
    }

    /// Post-multiplies the current matrix by `m`.
    pub fn mult_matrix(&mut self, m: Mat4) {
        self.matrix *= m;
        self.inverse = None;
    }

    pub fn load_identity(&mut self) {
        self.set_matrix(Mat4::IDENTITY);
    }

    /// Inverse of the current matrix, cached until the next mutation.
    pub fn inverse(&mut self) -> Mat4 {
        match self.inverse {
            Some(inverse) => inverse,
            None => {
                let inverse = self.matrix.inverse();
                self.inverse = Some(inverse);
                inverse
            }
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
