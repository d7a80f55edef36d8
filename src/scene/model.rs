//! Loaded OBJ model with switchable shading modes.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::{Mat3, Vec2, Vec3};

use crate::abs::{
    DepthFunc, DrawMode, Face, Gl, GpuMesh, ModelVertex, PolygonMode, RenderTarget, ShadingProgram,
    Texture2D, fullscreen_quad,
};
use crate::loader::{self, Shape};

use super::light::LightInfo;
use super::material::{
    DECAL_UNIT, ENV_MAP_UNIT, HEIGHT_FIELD_UNIT, NORMAL_MAP_UNIT, SharedMaterial,
};
use super::transform::Transform;
use super::{Drawable, FrameState, world_to_object};

/// Exactly one shading mode is active at a time. Every variant except
/// [`GodRay`](ShadingMode::GodRay) can additionally be drawn as an
/// outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingMode {
    Normal,
    Explosion,
    Explosion2,
    Random,
    GodRay,
}

/// Texcoords beyond this magnitude are garbage from degenerate exports
/// and get pinned to zero.
const UV_LIMIT: f32 = 1e16;

fn clamp_uv(v: f32) -> f32 {
    if v > UV_LIMIT || v < -UV_LIMIT { 0.0 } else { v }
}

fn upload_shape(gl: &Rc<dyn Gl>, shape: &Shape) -> Result<GpuMesh, String> {
    let count = shape.mesh.positions.len() / 3;
    let mut vertices = Vec::with_capacity(count);
    for i in 0..count {
        let position = Vec3::new(
            shape.mesh.positions[3 * i],
            shape.mesh.positions[3 * i + 1],
            shape.mesh.positions[3 * i + 2],
        );
        // Files without normals get a constant stand-in; files without
        // texcoords get the origin.
        let normal = if shape.mesh.normals.len() >= 3 * (i + 1) {
            Vec3::new(
                shape.mesh.normals[3 * i],
                shape.mesh.normals[3 * i + 1],
                shape.mesh.normals[3 * i + 2],
            )
        } else {
            Vec3::Z
        };
        let uv = if shape.mesh.texcoords.len() >= 2 * (i + 1) {
            Vec2::new(
                clamp_uv(shape.mesh.texcoords[2 * i]),
                clamp_uv(shape.mesh.texcoords[2 * i + 1]),
            )
        } else {
            Vec2::ZERO
        };
        vertices.push(ModelVertex { position, normal, uv });
    }
    GpuMesh::new(gl.clone(), &vertices, &shape.mesh.indices, DrawMode::Triangles)
}

/// Builds a fresh program pair and swaps it into `slot` only once it is
/// known good. On failure the slot keeps whatever it held before.
fn rebuild(gl: &Rc<dyn Gl>, slot: &mut ShadingProgram, vertex: &Path, fragment: &Path) -> bool {
    match ShadingProgram::build(gl.clone(), vertex, fragment) {
        Ok(mut fresh) => {
            fresh.set_sampler("normal_map", NORMAL_MAP_UNIT as i32);
            fresh.set_sampler("decal", DECAL_UNIT as i32);
            fresh.set_sampler("height_field", HEIGHT_FIELD_UNIT as i32);
            fresh.set_sampler("envmap", ENV_MAP_UNIT as i32);
            slot.swap(&mut fresh);
            true
        }
        Err(e) => {
            log::error!("{e}");
            false
        }
    }
}

/// One parsed model and the full set of programs its shading modes use.
///
/// The parsed shapes stay resident on the CPU side; each becomes one GPU
/// mesh at construction. Mode activations rebuild the corresponding
/// program from source, so a shader edited on disk is picked up the next
/// time its mode is selected.
pub struct LoadedModel {
    gl: Rc<dyn Gl>,
    shader_dir: PathBuf,
    shapes: Vec<Shape>,
    meshes: Vec<GpuMesh>,
    quad: GpuMesh,
    transform: Transform,
    material: SharedMaterial,
    mode: ShadingMode,
    outline: bool,
    fragment_file: PathBuf,
    program: ShadingProgram,
    explosion_program: ShadingProgram,
    explosion2_program: ShadingProgram,
    random_program: ShadingProgram,
    lighting: ShadingProgram,
    rays: ShadingProgram,
    outline_program: ShadingProgram,
    god_ray_offscreen: bool,
    god_ray_target: Option<RenderTarget>,
}

impl LoadedModel {
    /// Parses `file_name` under `media_dir` and builds the model around
    /// it. A parse failure is returned to the caller so the previous
    /// model can stay on screen; shader failures are only logged and the
    /// affected mode draws nothing until its sources are fixed.
    pub fn from_file(
        gl: Rc<dyn Gl>,
        shader_dir: &Path,
        media_dir: &Path,
        file_name: &str,
        material: SharedMaterial,
        god_ray_offscreen: bool,
    ) -> Result<Self, String> {
        log::info!("loading model `{file_name}`");
        let shapes = loader::load_obj(&media_dir.join(file_name))?;
        let mut model = Self::from_shapes(gl, shader_dir, shapes, material, god_ray_offscreen)?;
        model.load_decal(media_dir);
        Ok(model)
    }

    /// Builds the model from already-parsed shapes.
    pub fn from_shapes(
        gl: Rc<dyn Gl>,
        shader_dir: &Path,
        shapes: Vec<Shape>,
        material: SharedMaterial,
        god_ray_offscreen: bool,
    ) -> Result<Self, String> {
        let meshes = shapes
            .iter()
            .map(|shape| upload_shape(&gl, shape))
            .collect::<Result<Vec<_>, _>>()?;
        let (quad_vertices, quad_indices) = fullscreen_quad();
        let quad = GpuMesh::new(gl.clone(), &quad_vertices, &quad_indices, DrawMode::Triangles)?;

        let fragment_file = shader_dir.join("phong.frag");
        let empty = |vertex: &str, fragment: &str| {
            ShadingProgram::new(gl.clone(), shader_dir.join(vertex), shader_dir.join(fragment))
        };
        let mut model = Self {
            program: empty("model.vert", "phong.frag"),
            explosion_program: empty("explosion.vert", "explosion.frag"),
            explosion2_program: empty("explosion2.vert", "phong.frag"),
            random_program: empty("random.vert", "phong.frag"),
            lighting: empty("lighting.vert", "lighting.frag"),
            rays: empty("gods_ray.vert", "gods_ray.frag"),
            outline_program: empty("outline.vert", "outline.frag"),
            gl,
            shader_dir: shader_dir.to_path_buf(),
            shapes,
            meshes,
            quad,
            transform: Transform::new(),
            material,
            mode: ShadingMode::Normal,
            outline: false,
            fragment_file,
            god_ray_offscreen,
            god_ray_target: None,
        };
        model.rebuild_main();
        model.rebuild_outline();
        model.material.borrow().bind_textures();
        Ok(model)
    }

    /// Loads the first shape's diffuse texture into the shared material.
    /// Missing or unreadable images leave the material as it was.
    fn load_decal(&mut self, media_dir: &Path) {
        let Some(name) = self
            .shapes
            .first()
            .map(|shape| shape.material.diffuse_texture.clone())
        else {
            return;
        };
        if name.is_empty() {
            log::warn!("model has no diffuse texture");
            return;
        }
        match Texture2D::from_file(self.gl.clone(), media_dir.join(&name)) {
            Ok(texture) => {
                self.material.borrow_mut().decal = Some(Rc::new(texture));
                self.material.borrow().bind_textures();
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn mode(&self) -> ShadingMode {
        self.mode
    }

    pub fn outline(&self) -> bool {
        self.outline
    }

    pub fn toggle_outline(&mut self) {
        self.outline = !self.outline;
    }

    fn rebuild_main(&mut self) -> bool {
        let vertex = self.shader_dir.join("model.vert");
        let fragment = self.fragment_file.clone();
        rebuild(&self.gl, &mut self.program, &vertex, &fragment)
    }

    fn rebuild_outline(&mut self) -> bool {
        let vertex = self.shader_dir.join("outline.vert");
        let fragment = self.shader_dir.join("outline.frag");
        rebuild(&self.gl, &mut self.outline_program, &vertex, &fragment)
    }

    /// Selects a fragment program for the plain path by file name and
    /// rebuilds it. Leaving god-ray mode this way falls back to normal
    /// shading; the explosion and random modes keep running and pick the
    /// new fragment up on their next activation.
    pub fn set_fragment(&mut self, file: &str) {
        if self.mode == ShadingMode::GodRay {
            self.mode = ShadingMode::Normal;
        }
        self.fragment_file = self.shader_dir.join(file);
        self.rebuild_main();
        self.material.borrow().bind_textures();
    }

    /// Activates a shading mode, rebuilding its program pair from source.
    /// The mode switches even when the build fails; a mode whose program
    /// never built draws nothing.
    pub fn set_mode(&mut self, mode: ShadingMode) {
        match mode {
            ShadingMode::Normal => {
                self.rebuild_main();
            }
            ShadingMode::Explosion => {
                let vertex = self.shader_dir.join("explosion.vert");
                let fragment = self.shader_dir.join("explosion.frag");
                rebuild(&self.gl, &mut self.explosion_program, &vertex, &fragment);
            }
            ShadingMode::Explosion2 => {
                let vertex = self.shader_dir.join("explosion2.vert");
                let fragment = self.fragment_file.clone();
                rebuild(&self.gl, &mut self.explosion2_program, &vertex, &fragment);
            }
            ShadingMode::Random => {
                let vertex = self.shader_dir.join("random.vert");
                let fragment = self.fragment_file.clone();
                if rebuild(&self.gl, &mut self.random_program, &vertex, &fragment) {
                    // A fresh perturbation seed per activation.
                    self.random_program
                        .set_uniform("seed", rand::random_range(0.0_f32..100.0));
                }
            }
            ShadingMode::GodRay => {
                // The plain program is torn down for the duration; leaving
                // god-ray mode rebuilds it.
                self.program.reset();
                let vertex = self.shader_dir.join("lighting.vert");
                let fragment = self.shader_dir.join("lighting.frag");
                rebuild(&self.gl, &mut self.lighting, &vertex, &fragment);
                let vertex = self.shader_dir.join("gods_ray.vert");
                let fragment = self.shader_dir.join("gods_ray.frag");
                if rebuild(&self.gl, &mut self.rays, &vertex, &fragment) {
                    self.rays.set_sampler("scene_color", 0);
                }
            }
        }
        self.mode = mode;
    }

    fn active_program(&mut self) -> &mut ShadingProgram {
        match self.mode {
            ShadingMode::Normal => &mut self.program,
            ShadingMode::Explosion => &mut self.explosion_program,
            ShadingMode::Explosion2 => &mut self.explosion2_program,
            ShadingMode::Random => &mut self.random_program,
            ShadingMode::GodRay => &mut self.lighting,
        }
    }

    fn draw_triangles(&self) {
        for mesh in &self.meshes {
            for triangle in 0..mesh.index_count() / 3 {
                mesh.draw_range(triangle * 3, 3);
            }
        }
    }

    /// Silhouette pass: front faces culled, triangles as thin blended
    /// lines, depth test relaxed so lines at the surface survive.
    fn draw_outline(&mut self) {
        if self.outline_program.handle().is_none() {
            return;
        }
        self.outline_program.bind();
        self.outline_program
            .set_uniform("outline_color", Vec3::splat(255.0));

        self.gl.set_blend(true);
        self.gl.set_polygon_mode(PolygonMode::Line);
        self.gl.set_line_width(0.3);
        self.gl.set_cull(Some(Face::Front));
        self.gl.set_depth_func(DepthFunc::LessEqual);

        self.draw_triangles();

        self.gl.set_depth_func(DepthFunc::Less);
        self.gl.set_cull(Some(Face::Back));
        self.gl.set_polygon_mode(PolygonMode::Fill);
        self.gl.set_line_width(1.0);
        self.gl.set_blend(false);
    }

    fn ensure_god_ray_target(&mut self, viewport: (i32, i32)) {
        let (width, height) = viewport;
        if width <= 0 || height <= 0 {
            return;
        }
        let stale = match &self.god_ray_target {
            Some(target) => target.size() != viewport,
            None => true,
        };
        if stale {
            match RenderTarget::new(self.gl.clone(), width, height, true) {
                Ok(target) => self.god_ray_target = Some(target),
                Err(e) => log::error!("god-ray target: {e}"),
            }
        }
    }

    /// Two-pass god-ray path: geometry through the lighting program,
    /// optionally into an offscreen target that a full-screen ray pass
    /// then samples.
    fn draw_god_ray(&mut self, frame: &FrameState) {
        if self.lighting.handle().is_none() {
            return;
        }
        let offscreen = self.god_ray_offscreen;
        if offscreen {
            self.ensure_god_ray_target(frame.viewport);
        }
        let use_target = offscreen && self.god_ray_target.is_some();
        if use_target {
            if let Some(target) = &self.god_ray_target {
                target.bind();
            }
            self.gl.clear(0.0, 0.0, 0.0, 1.0);
        }

        self.gl.push_model_matrix(self.transform.matrix());
        self.lighting.bind();
        self.draw_triangles();
        self.gl.use_program(None);

        if use_target {
            if let Some(target) = &self.god_ray_target {
                target.unbind();
                target.bind_color_to_unit(0);
            }
            if self.rays.handle().is_some() {
                self.rays.bind();
                self.quad.draw();
                self.gl.use_program(None);
            }
            self.gl.bind_texture_2d(0, None);
        }
        self.gl.pop_model_matrix();
    }
}

impl Drawable for LoadedModel {
    fn draw(&mut self, frame: &FrameState, light: &LightInfo) {
        if self.mode == ShadingMode::GodRay {
            self.draw_god_ray(frame);
            return;
        }

        let inverse = self.transform.inverse();
        let eye = world_to_object(inverse, frame.eye_position);
        let light_position = world_to_object(inverse, light.position);
        let (lm_ambient, lm_diffuse, lm_specular, shininess) = {
            let material = self.material.borrow();
            (
                material.ambient * light.color,
                material.diffuse * light.color,
                material.specular * light.color,
                material.shininess,
            )
        };
        let object_to_world = Mat3::from_mat4(self.transform.matrix());

        let program = self.active_program();
        if program.handle().is_none() {
            return;
        }
        program.bind();
        program.set_uniform("eye_position", eye);
        program.set_uniform("light_position", light_position);
        program.set_uniform("lm_ambient", lm_ambient);
        program.set_uniform("lm_diffuse", lm_diffuse);
        program.set_uniform("lm_specular", lm_specular);
        program.set_uniform("shininess", shininess);
        program.set_uniform("object_to_world", object_to_world);
        program.set_uniform("time_previous_frame", frame.time_previous_frame);
        program.set_uniform("time_current_frame", frame.time_current_frame);

        self.gl.push_model_matrix(self.transform.matrix());
        if self.outline {
            self.draw_outline();
        } else {
            self.draw_triangles();
        }
        self.gl.pop_model_matrix();
    }
}
