//! Procedural torus rendered from a parametric grid.

use std::path::Path;
use std::rc::Rc;

use glam::{Mat3, Vec2};

use crate::abs::{Gl, Mesh2D, ShadingProgram};

use super::light::LightInfo;
use super::material::{
    DECAL_UNIT, ENV_MAP_UNIT, HEIGHT_FIELD_UNIT, NORMAL_MAP_UNIT, SharedMaterial,
};
use super::transform::Transform;
use super::{Drawable, FrameState, world_to_object};

/// Major and minor radius fed to the vertex program.
const TORUS_INFO: Vec2 = Vec2::new(1.5, 0.5);
const GRID_STEPS: (u32, u32) = (80, 40);

/// The torus keeps one fixed program pair for its whole lifetime; shading
/// selections elsewhere in the scene never touch it. The vertex program
/// reads a bare parametric coordinate through attribute zero and places
/// the surface itself.
pub struct Torus {
    gl: Rc<dyn Gl>,
    program: ShadingProgram,
    grid: Mesh2D,
    transform: Transform,
    material: SharedMaterial,
}

impl Torus {
    pub fn new(gl: Rc<dyn Gl>, shader_dir: &Path, material: SharedMaterial) -> Result<Self, String> {
        let mut program = ShadingProgram::new(
            gl.clone(),
            shader_dir.join("torus.vert"),
            shader_dir.join("red.frag"),
        );
        program.bind_attrib(0, "parametric");
        program.validate()?;

        // Static inputs, set once on the freshly linked program.
        program.set_uniform("torus_info", TORUS_INFO);
        program.set_sampler("normal_map", NORMAL_MAP_UNIT as i32);
        program.set_sampler("decal", DECAL_UNIT as i32);
        program.set_sampler("height_field", HEIGHT_FIELD_UNIT as i32);
        program.set_sampler("envmap", ENV_MAP_UNIT as i32);

        let grid = Mesh2D::new(gl.clone(), Vec2::ZERO, Vec2::ONE, GRID_STEPS)?;

        Ok(Self {
            gl,
            program,
            grid,
            transform: Transform::new(),
            material,
        })
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl Drawable for Torus {
    fn draw(&mut self, frame: &FrameState, light: &LightInfo) {
        self.program.bind();

        // Lighting happens in object space; both positions come along for
        // the ride through the inverse model transform.
        let inverse = self.transform.inverse();
        self.program
            .set_uniform("eye_position", world_to_object(inverse, frame.eye_position));
        self.program
            .set_uniform("light_position", world_to_object(inverse, light.position));

        let material = self.material.borrow();
        self.program
            .set_uniform("lm_ambient", material.ambient * light.color);
        self.program
            .set_uniform("lm_diffuse", material.diffuse * light.color);
        self.program
            .set_uniform("lm_specular", material.specular * light.color);
        self.program.set_uniform("shininess", material.shininess);
        self.program
            .set_uniform("object_to_world", Mat3::from_mat4(self.transform.matrix()));

        self.gl.push_model_matrix(self.transform.matrix());
        self.grid.draw();
        self.gl.pop_model_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::trace::TraceGl;
    use crate::scene::Material;
    use crate::scene::light::Light;
    use glam::{Mat4, Vec3, Vec4};
    use std::path::PathBuf;

    fn shader_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("shaders")
    }

    fn build(gl: Rc<TraceGl>) -> Torus {
        Torus::new(gl, &shader_dir(), Material::new().shared()).unwrap()
    }

    #[test]
    fn static_inputs_are_set_once_at_build() {
        let gl = Rc::new(TraceGl::new());
        let _torus = build(gl.clone());

        assert_eq!(gl.compile_count(), 2);
        assert_eq!(gl.link_count(), 1);
        assert_eq!(
            gl.last_uniform("torus_info").unwrap().as_vec2(),
            Some(TORUS_INFO)
        );
        assert_eq!(gl.last_uniform("normal_map").unwrap().as_i32(), Some(0));
        assert_eq!(gl.last_uniform("decal").unwrap().as_i32(), Some(1));
        assert_eq!(gl.last_uniform("height_field").unwrap().as_i32(), Some(2));
        assert_eq!(gl.last_uniform("envmap").unwrap().as_i32(), Some(3));

        let bindings = gl.attrib_bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].1, 0);
        assert_eq!(bindings[0].2, "parametric");
    }

    #[test]
    fn draw_moves_the_light_into_object_space() {
        let gl = Rc::new(TraceGl::new());
        let mut torus = build(gl.clone());
        torus
            .transform_mut()
            .set_matrix(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));

        let mut light = Light::new();
        light.set_center(Vec3::new(5.0, 0.0, 0.0));
        light.set_radius(0.0);

        let frame = FrameState {
            eye_position: Vec3::new(0.0, 0.0, 6.0),
            ..FrameState::default()
        };
        torus.draw(&frame, &light.info());

        let sent = gl.last_uniform("light_position").unwrap().as_vec3().unwrap();
        assert!(sent.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
        let eye = gl.last_uniform("eye_position").unwrap().as_vec3().unwrap();
        assert!(eye.abs_diff_eq(Vec3::new(-2.0, 0.0, 6.0), 1e-5));
    }

    #[test]
    fn draw_wraps_the_grid_in_its_model_matrix() {
        let gl = Rc::new(TraceGl::new());
        let mut torus = build(gl.clone());
        let placed = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        torus.transform_mut().set_matrix(placed);

        gl.clear_log();
        torus.draw(&FrameState::default(), &Light::new().info());

        assert_eq!(gl.draw_events().len(), GRID_STEPS.1 as usize);
        let models: Vec<_> = gl
            .uniform_events()
            .iter()
            .filter(|e| e.name == "model")
            .filter_map(|e| e.value.as_mat4())
            .collect();
        let n = models.len();
        assert!(n >= 2);
        assert_eq!(models[n - 2], placed);
        assert_eq!(models[n - 1], Mat4::IDENTITY);
    }

    #[test]
    fn shared_material_edits_show_up_in_the_next_draw() {
        let gl = Rc::new(TraceGl::new());
        let material = Material::new().shared();
        let mut torus =
            Torus::new(gl.clone(), &shader_dir(), material.clone()).unwrap();

        material.borrow_mut().set_phong(
            Vec3::new(0.1, 0.0, 0.0),
            Vec3::new(0.5, 0.4, 0.3),
            Vec3::ONE,
            64.0,
        );
        torus.draw(&FrameState::default(), &Light::new().info());

        assert_eq!(
            gl.last_uniform("lm_diffuse").unwrap().as_vec4(),
            Some(Vec4::new(0.5, 0.4, 0.3, 1.0))
        );
        assert_eq!(gl.last_uniform("shininess").unwrap().as_f32(), Some(64.0));
    }
}
