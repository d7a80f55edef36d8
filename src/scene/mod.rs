//! Scene graph: drawables, lights, camera and per-frame orchestration.
//!
//! The scene owns everything it renders except the shared [`Material`],
//! which drawables reference through an `Rc<RefCell<_>>` so menu-driven
//! edits show up on every holder's next draw. Draw order is fixed: the
//! generic object list first, then the loaded model, then the light
//! markers, then the environment cube.

pub mod camera;
pub mod envmap;
pub mod light;
pub mod material;
pub mod model;
pub mod torus;
pub mod transform;
pub mod view;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::abs::{
    CubeMap, DrawMode, Gl, GpuMesh, NormalMap, ShadingProgram, Texture2D, uv_sphere,
};

pub use camera::Camera;
pub use envmap::EnvMap;
pub use light::{Light, LightInfo};
pub use material::{Material, SharedMaterial};
pub use model::{LoadedModel, ShadingMode};
pub use torus::Torus;
pub use view::View;

/// Degrees per second the view orbits while animation runs.
const VIEW_SPIN_RATE: f32 = 15.0;
/// Degrees per second the lights orbit while animation runs.
const LIGHT_SPIN_RATE: f32 = 40.0;
/// Half-extent of the environment cube.
const ENV_CUBE_SIZE: f32 = 10.0;
/// Where the procedural torus sits so it does not overlap the model.
const TORUS_OFFSET: Vec3 = Vec3::new(-3.0, 0.0, 0.0);

/// Per-frame values handed to every drawable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameState {
    pub eye_position: Vec3,
    pub time_previous_frame: f32,
    pub time_current_frame: f32,
    pub viewport: (i32, i32),
}

/// Anything the scene renders during its per-frame pass.
pub trait Drawable {
    fn draw(&mut self, frame: &FrameState, light: &LightInfo);
}

/// Carries a world-space point into object space through the inverse
/// model matrix, dividing out the homogeneous coordinate.
pub(crate) fn world_to_object(inverse: Mat4, point: Vec3) -> Vec3 {
    let v = inverse * point.extend(1.0);
    v.truncate() / v.w
}

/// Everything on screen plus the camera and view that frame it.
///
/// The light list is never empty: the constructor installs one orbiting
/// light, and the first entry is the only one that feeds shading.
pub struct Scene {
    gl: Rc<dyn Gl>,
    shader_dir: PathBuf,
    media_dir: PathBuf,
    camera: Camera,
    view: View,
    objects: Vec<Box<dyn Drawable>>,
    lights: Vec<Light>,
    model: Option<LoadedModel>,
    env: Option<EnvMap>,
    material: SharedMaterial,
    marker_program: ShadingProgram,
    marker_sphere: GpuMesh,
    god_ray_offscreen: bool,
    spinning: bool,
    viewport: (i32, i32),
}

impl Scene {
    pub fn new(
        gl: Rc<dyn Gl>,
        shader_dir: &Path,
        media_dir: &Path,
        viewport: (i32, i32),
        god_ray_offscreen: bool,
    ) -> Result<Self, String> {
        let material = Material::new().shared();

        let mut torus = Torus::new(gl.clone(), shader_dir, material.clone())?;
        torus
            .transform_mut()
            .mult_matrix(Mat4::from_translation(TORUS_OFFSET));

        let marker_program = ShadingProgram::build(
            gl.clone(),
            shader_dir.join("marker.vert"),
            shader_dir.join("marker.frag"),
        )?;
        let (vertices, indices) = uv_sphere(0.1, 20, 20);
        let marker_sphere = GpuMesh::new(gl.clone(), &vertices, &indices, DrawMode::Triangles)?;

        let mut light = Light::new();
        light.set_radius(4.0);
        light.set_height(2.5);

        let aspect = viewport.0 as f32 / viewport.1.max(1) as f32;
        let mut scene = Self {
            camera: Camera::new(50.0, aspect, 0.1, 100.0),
            view: View::new(Vec3::new(0.0, 1.5, 8.0), Vec3::ZERO, Vec3::Y),
            objects: Vec::new(),
            lights: vec![light],
            model: None,
            env: None,
            material,
            marker_program,
            marker_sphere,
            shader_dir: shader_dir.to_path_buf(),
            media_dir: media_dir.to_path_buf(),
            god_ray_offscreen,
            spinning: true,
            viewport,
            gl,
        };
        scene.add_object(Box::new(torus));
        Ok(scene)
    }

    pub fn material(&self) -> &SharedMaterial {
        &self.material
    }

    pub fn model_mut(&mut self) -> Option<&mut LoadedModel> {
        self.model.as_mut()
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn primary_light_mut(&mut self) -> &mut Light {
        &mut self.lights[0]
    }

    pub fn add_object(&mut self, object: Box<dyn Drawable>) {
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn stop_spinning(&mut self) {
        self.spinning = false;
    }

    pub fn toggle_spinning(&mut self) {
        self.spinning = !self.spinning;
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    /// Advances the idle animation. `dt` is in seconds.
    pub fn tick(&mut self, dt: f32) {
        if !self.spinning {
            return;
        }
        self.view.spin_degrees(VIEW_SPIN_RATE * dt);
        for light in &mut self.lights {
            light.spin_degrees(LIGHT_SPIN_RATE * dt);
        }
    }

    /// Forwards a window resize to the camera and the offscreen passes.
    pub fn set_viewport(&mut self, width: i32, height: i32) {
        self.viewport = (width, height);
        if height > 0 {
            self.camera.set_aspect_ratio(width as f32 / height as f32);
        }
    }

    /// Draws one frame: objects, then the model, then light markers, then
    /// the environment cube. Only the first light feeds shading.
    pub fn draw(&mut self, time_previous_frame: f32, time_current_frame: f32) {
        self.camera.apply(self.gl.as_ref());
        self.view.apply(self.gl.as_ref());

        let frame = FrameState {
            eye_position: self.view.eye_position(),
            time_previous_frame,
            time_current_frame,
            viewport: self.viewport,
        };
        let primary = self.lights[0].info();

        for object in &mut self.objects {
            object.draw(&frame, &primary);
        }
        if let Some(model) = self.model.as_mut() {
            model.draw(&frame, &primary);
        }
        for light in &self.lights {
            light.draw_marker(self.gl.as_ref(), &mut self.marker_program, &self.marker_sphere);
        }
        if let Some(env) = self.env.as_mut() {
            env.draw(&frame, &primary);
        }
    }

    /// Replaces the current model with one loaded from `file_name` under
    /// the media directory. The new model is built first; on failure the
    /// previous one stays current.
    pub fn change_model(&mut self, file_name: &str) {
        match LoadedModel::from_file(
            self.gl.clone(),
            &self.shader_dir,
            &self.media_dir,
            file_name,
            self.material.clone(),
            self.god_ray_offscreen,
        ) {
            Ok(model) => self.model = Some(model),
            Err(err) => log::error!("keeping the current model, {file_name} failed to load: {err}"),
        }
    }

    /// Loads a cube map from a `%s` face pattern and installs it both as
    /// the sky cube and as the material's reflection map.
    pub fn set_env_map(&mut self, pattern: &str) {
        let cube = match CubeMap::from_pattern(self.gl.clone(), &self.media_dir, pattern) {
            Ok(cube) => Rc::new(cube),
            Err(err) => {
                log::error!("keeping the current environment map: {err}");
                return;
            }
        };
        match EnvMap::new(self.gl.clone(), &self.shader_dir, cube.clone(), ENV_CUBE_SIZE) {
            Ok(env) => {
                self.material.borrow_mut().env_map = Some(cube);
                self.material.borrow().bind_textures();
                self.env = Some(env);
            }
            Err(err) => log::error!("keeping the current environment map: {err}"),
        }
    }

    /// Loads `file` as both a height field and a derived normal map. On
    /// any failure the material keeps its previous pair.
    pub fn set_bump_map(&mut self, file: &str, strength: f32) {
        let path = self.media_dir.join(file);
        let normal_map = match NormalMap::from_file(self.gl.clone(), &path, strength) {
            Ok(map) => Rc::new(map),
            Err(err) => {
                log::error!("keeping the current bump map: {err}");
                return;
            }
        };
        let height_field = match Texture2D::from_file(self.gl.clone(), &path) {
            Ok(tex) => Rc::new(tex),
            Err(err) => {
                log::error!("keeping the current bump map: {err}");
                return;
            }
        };
        {
            let mut material = self.material.borrow_mut();
            material.normal_map = Some(normal_map);
            material.height_field = Some(height_field);
        }
        self.material.borrow().bind_textures();
    }

    /// Loads `file` as the decal texture.
    pub fn set_decal(&mut self, file: &str) {
        let path = self.media_dir.join(file);
        match Texture2D::from_file(self.gl.clone(), &path) {
            Ok(tex) => {
                self.material.borrow_mut().decal = Some(Rc::new(tex));
                self.material.borrow().bind_textures();
            }
            Err(err) => log::error!("keeping the current decal texture: {err}"),
        }
    }
}
