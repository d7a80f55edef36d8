//! GPU textures: 2D decals, derived normal maps and cube maps.

use std::path::Path;
use std::rc::Rc;

use glam::Vec3;
use image::{DynamicImage, GrayImage, RgbaImage};

use super::gl::{Gl, TextureId};

/// RGBA image uploaded to the GPU with mipmaps and repeat wrapping.
pub struct Texture2D {
    gl: Rc<dyn Gl>,
    id: TextureId,
}

impl Texture2D {
    pub fn from_file(gl: Rc<dyn Gl>, path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| format!("failed to load image `{}`: {e}", path.display()))?;
        Self::from_image(gl, &image)
    }

    pub fn from_image(gl: Rc<dyn Gl>, image: &DynamicImage) -> Result<Self, String> {
        let rgba = image.to_rgba8();
        Self::from_rgba(gl, rgba.width(), rgba.height(), rgba.as_raw())
    }

    pub fn from_rgba(gl: Rc<dyn Gl>, width: u32, height: u32, data: &[u8]) -> Result<Self, String> {
        let id = gl.create_texture()?;
        gl.upload_texture_2d(id, width, height, data);
        Ok(Self { gl, id })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Binds the texture to the given texture unit.
    pub fn bind_to_unit(&self, unit: u32) {
        self.gl.bind_texture_2d(unit, Some(self.id));
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.gl.delete_texture(self.id);
    }
}

/// Converts a grayscale height field into a tangent-space normal map.
///
/// Slopes come from central differences with wrap-around at the borders,
/// scaled by `strength`. RGB packs the unit normal into `[0, 255]`; alpha
/// keeps the raw height so one lookup serves bump and parallax shading.
pub fn derive_normal_map(height: &GrayImage, strength: f32) -> RgbaImage {
    let (w, h) = height.dimensions();
    let sample = |x: u32, y: u32| height.get_pixel(x % w, y % h).0[0] as f32 / 255.0;

    let mut out = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let dx = (sample(x + 1, y) - sample(x + w - 1, y)) * strength;
            let dy = (sample(x, y + 1) - sample(x, y + h - 1)) * strength;
            let n = Vec3::new(-dx, -dy, 1.0).normalize();
            let pack = |v: f32| ((v * 0.5 + 0.5) * 255.0) as u8;
            let height_byte = (sample(x, y) * 255.0).round() as u8;
            out.put_pixel(
                x,
                y,
                image::Rgba([pack(n.x), pack(n.y), pack(n.z), height_byte]),
            );
        }
    }
    out
}

/// Normal map derived from a height-field image at load time.
pub struct NormalMap {
    texture: Texture2D,
}

impl NormalMap {
    pub fn from_file(gl: Rc<dyn Gl>, path: impl AsRef<Path>, strength: f32) -> Result<Self, String> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| format!("failed to load height field `{}`: {e}", path.display()))?;
        let normals = derive_normal_map(&image.to_luma8(), strength);
        let texture = Texture2D::from_rgba(gl, normals.width(), normals.height(), normals.as_raw())?;
        Ok(Self { texture })
    }

    pub fn bind_to_unit(&self, unit: u32) {
        self.texture.bind_to_unit(unit);
    }
}

/// File-name suffixes for the six cube faces, in +X, -X, +Y, -Y, +Z, -Z
/// attachment order.
pub const FACE_SUFFIXES: [&str; 6] = ["rt", "lf", "up", "dn", "bk", "ft"];

/// Substitutes a face suffix into a `%s` pattern such as
/// `tga/cloudyhills_%s.tga`.
pub fn expand_pattern(pattern: &str, suffix: &str) -> String {
    pattern.replacen("%s", suffix, 1)
}

/// Six-faced environment texture loaded from a file-name pattern.
pub struct CubeMap {
    gl: Rc<dyn Gl>,
    id: TextureId,
}

impl CubeMap {
    pub fn from_pattern(
        gl: Rc<dyn Gl>,
        base: impl AsRef<Path>,
        pattern: &str,
    ) -> Result<Self, String> {
        let id = gl.create_texture()?;
        let cube = Self { gl, id };
        for (face, suffix) in FACE_SUFFIXES.iter().enumerate() {
            let path = base.as_ref().join(expand_pattern(pattern, suffix));
            let image = image::open(&path)
                .map_err(|e| format!("failed to load cube face `{}`: {e}", path.display()))?;
            let rgba = image.to_rgba8();
            cube.gl
                .upload_cube_face(cube.id, face as u32, rgba.width(), rgba.height(), rgba.as_raw());
        }
        Ok(cube)
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn bind_to_unit(&self, unit: u32) {
        self.gl.bind_texture_cube(unit, Some(self.id));
    }
}

impl Drop for CubeMap {
    fn drop(&mut self) {
        self.gl.delete_texture(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::trace::TraceGl;

    #[test]
    fn flat_height_field_yields_straight_up_normals() {
        let height = GrayImage::from_pixel(4, 4, image::Luma([90]));
        let normals = derive_normal_map(&height, 8.0);
        let p = normals.get_pixel(2, 2).0;
        assert_eq!([p[0], p[1], p[2]], [127, 127, 255]);
        assert_eq!(p[3], 90);
    }

    #[test]
    fn ramp_tilts_normals_against_the_slope() {
        let height = GrayImage::from_fn(8, 8, |x, _| image::Luma([(x * 16) as u8]));
        let normals = derive_normal_map(&height, 8.0);
        let p = normals.get_pixel(4, 4).0;
        // Rising along +x pushes the normal toward -x; y stays level.
        assert!(p[0] < 127, "red channel {} should tilt negative", p[0]);
        assert_eq!(p[1], 127);
    }

    #[test]
    fn pattern_expansion_substitutes_the_face_suffix() {
        assert_eq!(
            expand_pattern("tga/cloudyhills_%s.tga", "rt"),
            "tga/cloudyhills_rt.tga"
        );
        assert_eq!(FACE_SUFFIXES.len(), 6);
    }

    #[test]
    fn texture_frees_its_handle_on_drop() {
        let gl = Rc::new(TraceGl::new());
        {
            let tex = Texture2D::from_rgba(gl.clone(), 2, 2, &[0u8; 16]).unwrap();
            tex.bind_to_unit(1);
            assert_eq!(gl.live_textures(), 1);
        }
        assert_eq!(gl.live_textures(), 0);
    }
}
