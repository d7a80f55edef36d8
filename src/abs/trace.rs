//! Recording graphics backend for tests.
//!
//! [`TraceGl`] implements [`Gl`](super::gl::Gl) without touching a real
//! driver. It hands out fresh handles, tracks which are still live (and
//! panics on double deletes or use-after-delete), counts compiles and
//! links, and keeps an ordered log of program binds, uniform writes and
//! draw calls so tests can assert on what a frame actually did.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use super::gl::{
    BufferId, DepthFunc, DrawMode, Face, FramebufferId, Gl, MatrixStack, PolygonMode, ProgramId,
    StageId, StageKind, TexFormat, TextureId, VertexArrayId,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    I32(i32),
    F32(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            UniformValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<Vec4> {
        match self {
            UniformValue::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            UniformValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            UniformValue::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            UniformValue::Mat4(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniformEvent {
    pub program: ProgramId,
    pub name: String,
    pub value: UniformValue,
}

/// One `draw_elements` call plus the render state it ran under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawEvent {
    pub program: Option<ProgramId>,
    pub mode: DrawMode,
    pub count: i32,
    pub offset_bytes: i32,
    pub polygon_mode: PolygonMode,
    pub cull: Option<Face>,
    pub depth_func: DepthFunc,
    pub blend: bool,
    pub line_width: f32,
    pub framebuffer: Option<FramebufferId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureBind {
    pub unit: u32,
    pub tex: Option<TextureId>,
    pub cube: bool,
}

#[derive(Default)]
struct TraceState {
    next_handle: u32,
    live_stages: HashSet<StageId>,
    live_programs: HashSet<ProgramId>,
    live_buffers: HashSet<BufferId>,
    live_vertex_arrays: HashSet<VertexArrayId>,
    live_textures: HashSet<TextureId>,
    live_framebuffers: HashSet<FramebufferId>,
    failed_stages: HashSet<StageId>,
    failed_programs: HashSet<ProgramId>,
    fail_next_compile: bool,
    fail_next_link: bool,
    compile_count: usize,
    link_count: usize,
    missing_uniforms: HashSet<String>,
    stage_sources: HashMap<StageId, String>,
    attached: HashMap<ProgramId, Vec<StageId>>,
    attrib_bindings: Vec<(ProgramId, u32, String)>,
    bound_program: Option<ProgramId>,
    use_order: Vec<Option<ProgramId>>,
    uniforms: Vec<UniformEvent>,
    draws: Vec<DrawEvent>,
    texture_binds: Vec<TextureBind>,
    array_uploads: Vec<usize>,
    element_uploads: Vec<usize>,
    bound_framebuffer: Option<FramebufferId>,
    framebuffer_binds: Vec<Option<FramebufferId>>,
    clears: Vec<[f32; 4]>,
    depth_func: Option<DepthFunc>,
    cull: Option<Face>,
    blend: bool,
    polygon_mode: Option<PolygonMode>,
    line_width: f32,
}

pub struct TraceGl {
    state: RefCell<TraceState>,
    matrices: RefCell<MatrixStack>,
}

impl TraceGl {
    pub fn new() -> Self {
        let state = TraceState {
            next_handle: 1,
            line_width: 1.0,
            ..TraceState::default()
        };
        Self {
            state: RefCell::new(state),
            matrices: RefCell::new(MatrixStack::new()),
        }
    }

    fn alloc(state: &mut TraceState) -> NonZeroU32 {
        let id = NonZeroU32::new(state.next_handle).unwrap();
        state.next_handle += 1;
        id
    }

    /// Next compile reports failure, as a broken shader source would.
    pub fn fail_next_compile(&self) {
        self.state.borrow_mut().fail_next_compile = true;
    }

    /// Next link reports failure.
    pub fn fail_next_link(&self) {
        self.state.borrow_mut().fail_next_link = true;
    }

    /// Treat `name` as a uniform no linked program exposes.
    pub fn deny_uniform(&self, name: &str) {
        self.state.borrow_mut().missing_uniforms.insert(name.to_owned());
    }

    pub fn compile_count(&self) -> usize {
        self.state.borrow().compile_count
    }

    pub fn link_count(&self) -> usize {
        self.state.borrow().link_count
    }

    pub fn live_stages(&self) -> usize {
        self.state.borrow().live_stages.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().live_programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().live_buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().live_vertex_arrays.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().live_textures.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().live_framebuffers.len()
    }

    pub fn is_program_live(&self, program: ProgramId) -> bool {
        self.state.borrow().live_programs.contains(&program)
    }

    pub fn is_stage_live(&self, stage: StageId) -> bool {
        self.state.borrow().live_stages.contains(&stage)
    }

    pub fn use_order(&self) -> Vec<Option<ProgramId>> {
        self.state.borrow().use_order.clone()
    }

    pub fn uniform_events(&self) -> Vec<UniformEvent> {
        self.state.borrow().uniforms.clone()
    }

    /// Last value written to `name` on any program.
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniforms
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.value)
    }

    /// Last value written to `name` on a specific program.
    pub fn last_uniform_on(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniforms
            .iter()
            .rev()
            .find(|e| e.program == program && e.name == name)
            .map(|e| e.value)
    }

    pub fn draw_events(&self) -> Vec<DrawEvent> {
        self.state.borrow().draws.clone()
    }

    pub fn texture_bind_events(&self) -> Vec<TextureBind> {
        self.state.borrow().texture_binds.clone()
    }

    pub fn attrib_bindings(&self) -> Vec<(ProgramId, u32, String)> {
        self.state.borrow().attrib_bindings.clone()
    }

    pub fn array_uploads(&self) -> Vec<usize> {
        self.state.borrow().array_uploads.clone()
    }

    pub fn element_uploads(&self) -> Vec<usize> {
        self.state.borrow().element_uploads.clone()
    }

    pub fn framebuffer_binds(&self) -> Vec<Option<FramebufferId>> {
        self.state.borrow().framebuffer_binds.clone()
    }

    pub fn clears(&self) -> Vec<[f32; 4]> {
        self.state.borrow().clears.clone()
    }

    pub fn stage_source_of(&self, stage: StageId) -> Option<String> {
        self.state.borrow().stage_sources.get(&stage).cloned()
    }

    /// Drop accumulated logs; live-handle tracking is kept.
    pub fn clear_log(&self) {
        let mut state = self.state.borrow_mut();
        state.use_order.clear();
        state.uniforms.clear();
        state.draws.clear();
        state.texture_binds.clear();
        state.framebuffer_binds.clear();
        state.clears.clear();
        state.array_uploads.clear();
        state.element_uploads.clear();
    }

    fn record_uniform(&self, program: ProgramId, name: &str, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_programs.contains(&program),
            "uniform `{name}` set on dead program {program:?}"
        );
        if state.missing_uniforms.contains(name) {
            return;
        }
        state.uniforms.push(UniformEvent {
            program,
            name: name.to_owned(),
            value,
        });
    }

    fn upload_matrix(&self, name: &str, m: Mat4) {
        let program = self.state.borrow().bound_program;
        if let Some(program) = program {
            self.record_uniform(program, name, UniformValue::Mat4(m));
        }
    }

    fn upload_all_matrices(&self) {
        let (projection, view, model) = {
            let matrices = self.matrices.borrow();
            (matrices.projection(), matrices.view(), matrices.current())
        };
        self.upload_matrix("projection", projection);
        self.upload_matrix("view", view);
        self.upload_matrix("model", model);
    }
}

impl Default for TraceGl {
    fn default() -> Self {
        Self::new()
    }
}

impl Gl for TraceGl {
    fn create_stage(&self, _kind: StageKind) -> Result<StageId, String> {
        let mut state = self.state.borrow_mut();
        let id = StageId(Self::alloc(&mut state));
        state.live_stages.insert(id);
        Ok(id)
    }

    fn stage_source(&self, stage: StageId, source: &str) {
        let mut state = self.state.borrow_mut();
        assert!(state.live_stages.contains(&stage), "source on dead stage");
        state.stage_sources.insert(stage, source.to_owned());
    }

    fn compile_stage(&self, stage: StageId) {
        let mut state = self.state.borrow_mut();
        assert!(state.live_stages.contains(&stage), "compile of dead stage");
        state.compile_count += 1;
        if state.fail_next_compile {
            state.fail_next_compile = false;
            state.failed_stages.insert(stage);
        } else {
            state.failed_stages.remove(&stage);
        }
    }

    fn stage_compile_ok(&self, stage: StageId) -> bool {
        !self.state.borrow().failed_stages.contains(&stage)
    }

    fn stage_info_log(&self, stage: StageId) -> String {
        if self.state.borrow().failed_stages.contains(&stage) {
            "0:1: forced compile failure".to_owned()
        } else {
            String::new()
        }
    }

    fn delete_stage(&self, stage: StageId) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_stages.remove(&stage),
            "stage {stage:?} deleted twice or never created"
        );
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let mut state = self.state.borrow_mut();
        let id = ProgramId(Self::alloc(&mut state));
        state.live_programs.insert(id);
        Ok(id)
    }

    fn attach_stage(&self, program: ProgramId, stage: StageId) {
        let mut state = self.state.borrow_mut();
        assert!(state.live_programs.contains(&program), "attach to dead program");
        assert!(state.live_stages.contains(&stage), "attach of dead stage");
        state.attached.entry(program).or_default().push(stage);
    }

    fn detach_stage(&self, program: ProgramId, stage: StageId) {
        let mut state = self.state.borrow_mut();
        if let Some(list) = state.attached.get_mut(&program) {
            list.retain(|s| *s != stage);
        }
    }

    fn bind_attrib_location(&self, program: ProgramId, index: u32, name: &str) {
        let mut state = self.state.borrow_mut();
        assert!(state.live_programs.contains(&program), "bind attrib on dead program");
        state.attrib_bindings.push((program, index, name.to_owned()));
    }

    fn link_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        assert!(state.live_programs.contains(&program), "link of dead program");
        state.link_count += 1;
        if state.fail_next_link {
            state.fail_next_link = false;
            state.failed_programs.insert(program);
        } else {
            state.failed_programs.remove(&program);
        }
    }

    fn program_link_ok(&self, program: ProgramId) -> bool {
        !self.state.borrow().failed_programs.contains(&program)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        if self.state.borrow().failed_programs.contains(&program) {
            "forced link failure".to_owned()
        } else {
            String::new()
        }
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_programs.remove(&program),
            "program {program:?} deleted twice or never created"
        );
        if state.bound_program == Some(program) {
            state.bound_program = None;
        }
        state.attached.remove(&program);
        state.failed_programs.remove(&program);
    }

    fn use_program(&self, program: Option<ProgramId>) {
        {
            let mut state = self.state.borrow_mut();
            if let Some(program) = program {
                assert!(
                    state.live_programs.contains(&program),
                    "use of dead program {program:?}"
                );
            }
            state.bound_program = program;
            state.use_order.push(program);
        }
        if program.is_some() {
            self.upload_all_matrices();
        }
    }

    fn set_uniform_i32(&self, program: ProgramId, name: &str, v: i32) {
        self.record_uniform(program, name, UniformValue::I32(v));
    }

    fn set_uniform_f32(&self, program: ProgramId, name: &str, v: f32) {
        self.record_uniform(program, name, UniformValue::F32(v));
    }

    fn set_uniform_vec2(&self, program: ProgramId, name: &str, v: Vec2) {
        self.record_uniform(program, name, UniformValue::Vec2(v));
    }

    fn set_uniform_vec3(&self, program: ProgramId, name: &str, v: Vec3) {
        self.record_uniform(program, name, UniformValue::Vec3(v));
    }

    fn set_uniform_vec4(&self, program: ProgramId, name: &str, v: Vec4) {
        self.record_uniform(program, name, UniformValue::Vec4(v));
    }

    fn set_uniform_mat3(&self, program: ProgramId, name: &str, v: Mat3) {
        self.record_uniform(program, name, UniformValue::Mat3(v));
    }

    fn set_uniform_mat4(&self, program: ProgramId, name: &str, v: Mat4) {
        self.record_uniform(program, name, UniformValue::Mat4(v));
    }

    fn set_projection_matrix(&self, m: Mat4) {
        self.matrices.borrow_mut().set_projection(m);
        self.upload_matrix("projection", m);
    }

    fn set_view_matrix(&self, m: Mat4) {
        self.matrices.borrow_mut().set_view(m);
        self.upload_matrix("view", m);
    }

    fn push_model_matrix(&self, m: Mat4) {
        let top = {
            let mut matrices = self.matrices.borrow_mut();
            matrices.push(m);
            matrices.current()
        };
        self.upload_matrix("model", top);
    }

    fn pop_model_matrix(&self) {
        let top = {
            let mut matrices = self.matrices.borrow_mut();
            matrices.pop();
            matrices.current()
        };
        self.upload_matrix("model", top);
    }

    fn model_matrix(&self) -> Mat4 {
        self.matrices.borrow().current()
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let mut state = self.state.borrow_mut();
        let id = VertexArrayId(Self::alloc(&mut state));
        state.live_vertex_arrays.insert(id);
        Ok(id)
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        let mut state = self.state.borrow_mut();
        let id = BufferId(Self::alloc(&mut state));
        state.live_buffers.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, _vao: Option<VertexArrayId>) {}

    fn bind_array_buffer(&self, _buffer: Option<BufferId>) {}

    fn bind_element_buffer(&self, _buffer: Option<BufferId>) {}

    fn array_buffer_data(&self, data: &[u8]) {
        self.state.borrow_mut().array_uploads.push(data.len());
    }

    fn element_buffer_data(&self, data: &[u8]) {
        self.state.borrow_mut().element_uploads.push(data.len());
    }

    fn vertex_attrib_f32(&self, _index: u32, _size: i32, _stride: i32, _offset: i32) {}

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_vertex_arrays.remove(&vao),
            "vertex array {vao:?} deleted twice or never created"
        );
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_buffers.remove(&buffer),
            "buffer {buffer:?} deleted twice or never created"
        );
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, offset_bytes: i32) {
        let mut state = self.state.borrow_mut();
        let event = DrawEvent {
            program: state.bound_program,
            mode,
            count,
            offset_bytes,
            polygon_mode: state.polygon_mode.unwrap_or(PolygonMode::Fill),
            cull: state.cull,
            depth_func: state.depth_func.unwrap_or(DepthFunc::Less),
            blend: state.blend,
            line_width: state.line_width,
            framebuffer: state.bound_framebuffer,
        };
        state.draws.push(event);
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        let mut state = self.state.borrow_mut();
        let id = TextureId(Self::alloc(&mut state));
        state.live_textures.insert(id);
        Ok(id)
    }

    fn upload_texture_2d(&self, tex: TextureId, _width: u32, _height: u32, _rgba: &[u8]) {
        assert!(
            self.state.borrow().live_textures.contains(&tex),
            "upload to dead texture"
        );
    }

    fn upload_cube_face(&self, tex: TextureId, face: u32, _width: u32, _height: u32, _rgba: &[u8]) {
        assert!(face < 6, "cube face index out of range");
        assert!(
            self.state.borrow().live_textures.contains(&tex),
            "upload to dead texture"
        );
    }

    fn alloc_texture_2d(&self, tex: TextureId, _width: i32, _height: i32, _format: TexFormat) {
        assert!(
            self.state.borrow().live_textures.contains(&tex),
            "alloc of dead texture"
        );
    }

    fn bind_texture_2d(&self, unit: u32, tex: Option<TextureId>) {
        let mut state = self.state.borrow_mut();
        if let Some(tex) = tex {
            assert!(state.live_textures.contains(&tex), "bind of dead texture");
        }
        state.texture_binds.push(TextureBind { unit, tex, cube: false });
    }

    fn bind_texture_cube(&self, unit: u32, tex: Option<TextureId>) {
        let mut state = self.state.borrow_mut();
        if let Some(tex) = tex {
            assert!(state.live_textures.contains(&tex), "bind of dead texture");
        }
        state.texture_binds.push(TextureBind { unit, tex, cube: true });
    }

    fn delete_texture(&self, tex: TextureId) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_textures.remove(&tex),
            "texture {tex:?} deleted twice or never created"
        );
    }

    fn create_framebuffer(&self) -> Result<FramebufferId, String> {
        let mut state = self.state.borrow_mut();
        let id = FramebufferId(Self::alloc(&mut state));
        state.live_framebuffers.insert(id);
        Ok(id)
    }

    fn bind_framebuffer(&self, fbo: Option<FramebufferId>) {
        let mut state = self.state.borrow_mut();
        if let Some(fbo) = fbo {
            assert!(
                state.live_framebuffers.contains(&fbo),
                "bind of dead framebuffer"
            );
        }
        state.bound_framebuffer = fbo;
        state.framebuffer_binds.push(fbo);
    }

    fn attach_color_texture(&self, tex: TextureId) {
        assert!(
            self.state.borrow().live_textures.contains(&tex),
            "attach of dead texture"
        );
    }

    fn attach_depth_texture(&self, tex: TextureId) {
        assert!(
            self.state.borrow().live_textures.contains(&tex),
            "attach of dead texture"
        );
    }

    fn framebuffer_complete(&self) -> bool {
        true
    }

    fn delete_framebuffer(&self, fbo: FramebufferId) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.live_framebuffers.remove(&fbo),
            "framebuffer {fbo:?} deleted twice or never created"
        );
        if state.bound_framebuffer == Some(fbo) {
            state.bound_framebuffer = None;
        }
    }

    fn set_viewport(&self, _x: i32, _y: i32, _width: i32, _height: i32) {}

    fn clear(&self, r: f32, g: f32, b: f32, a: f32) {
        self.state.borrow_mut().clears.push([r, g, b, a]);
    }

    fn set_depth_test(&self, _on: bool) {}

    fn set_depth_func(&self, func: DepthFunc) {
        self.state.borrow_mut().depth_func = Some(func);
    }

    fn set_cull(&self, face: Option<Face>) {
        self.state.borrow_mut().cull = face;
    }

    fn set_blend(&self, on: bool) {
        self.state.borrow_mut().blend = on;
    }

    fn set_polygon_mode(&self, mode: PolygonMode) {
        self.state.borrow_mut().polygon_mode = Some(mode);
    }

    fn set_line_width(&self, width: f32) {
        self.state.borrow_mut().line_width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_tracked() {
        let gl = TraceGl::new();
        let s = gl.create_stage(StageKind::Vertex).unwrap();
        let p = gl.create_program().unwrap();
        assert_ne!(s.0, p.0);
        assert_eq!(gl.live_stages(), 1);
        assert_eq!(gl.live_programs(), 1);

        gl.delete_stage(s);
        gl.delete_program(p);
        assert_eq!(gl.live_stages(), 0);
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    #[should_panic(expected = "deleted twice")]
    fn double_delete_panics() {
        let gl = TraceGl::new();
        let s = gl.create_stage(StageKind::Fragment).unwrap();
        gl.delete_stage(s);
        gl.delete_stage(s);
    }

    #[test]
    fn forced_compile_failure_applies_once() {
        let gl = TraceGl::new();
        let s = gl.create_stage(StageKind::Vertex).unwrap();
        gl.fail_next_compile();
        gl.compile_stage(s);
        assert!(!gl.stage_compile_ok(s));
        assert!(!gl.stage_info_log(s).is_empty());

        gl.compile_stage(s);
        assert!(gl.stage_compile_ok(s));
        assert_eq!(gl.compile_count(), 2);
    }

    #[test]
    fn denied_uniform_is_not_recorded() {
        let gl = TraceGl::new();
        let p = gl.create_program().unwrap();
        gl.deny_uniform("shininess");
        gl.set_uniform_f32(p, "shininess", 32.0);
        gl.set_uniform_f32(p, "seed", 1.0);
        assert!(gl.last_uniform("shininess").is_none());
        assert_eq!(gl.last_uniform("seed").unwrap().as_f32(), Some(1.0));
    }

    #[test]
    fn binding_a_program_uploads_the_matrix_state() {
        let gl = TraceGl::new();
        let p = gl.create_program().unwrap();
        let view = Mat4::look_at_rh(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO, Vec3::Y);
        gl.set_view_matrix(view);
        gl.use_program(Some(p));

        let uploaded = gl.last_uniform_on(p, "view").unwrap();
        assert_eq!(uploaded, UniformValue::Mat4(view));
        assert_eq!(gl.use_order(), vec![Some(p)]);
    }
}
