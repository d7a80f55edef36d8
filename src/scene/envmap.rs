//! Sky box drawn from the environment cube map.

use std::path::Path;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::abs::{CubeMap, DrawMode, Gl, GpuMesh, ShadingProgram, inward_cube};

use super::light::LightInfo;
use super::material::ENV_MAP_UNIT;
use super::{Drawable, FrameState};

/// Inward-wound cube scaled up around the viewer. Its program samples the
/// cube map by model-space position, so the cube's size never shows; it
/// only has to stay inside the far plane. Drawn last, after every opaque
/// surface.
pub struct EnvMap {
    gl: Rc<dyn Gl>,
    program: ShadingProgram,
    cube_mesh: GpuMesh,
    cube_map: Rc<CubeMap>,
    size: f32,
}

impl EnvMap {
    pub fn new(
        gl: Rc<dyn Gl>,
        shader_dir: &Path,
        cube_map: Rc<CubeMap>,
        size: f32,
    ) -> Result<Self, String> {
        let mut program = ShadingProgram::build(
            gl.clone(),
            shader_dir.join("sky.vert"),
            shader_dir.join("sky.frag"),
        )?;
        program.set_sampler("envmap", ENV_MAP_UNIT as i32);

        let (vertices, indices) = inward_cube(1.0);
        let cube_mesh = GpuMesh::new(gl.clone(), &vertices, &indices, DrawMode::Triangles)?;

        Ok(Self {
            gl,
            program,
            cube_mesh,
            cube_map,
            size,
        })
    }

    pub fn cube_map(&self) -> &Rc<CubeMap> {
        &self.cube_map
    }
}

impl Drawable for EnvMap {
    fn draw(&mut self, _frame: &FrameState, _light: &LightInfo) {
        self.program.bind();
        self.cube_map.bind_to_unit(ENV_MAP_UNIT);
        self.gl
            .push_model_matrix(Mat4::from_scale(Vec3::splat(self.size)));
        self.cube_mesh.draw();
        self.gl.pop_model_matrix();
    }
}
