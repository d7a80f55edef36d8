//! Graphics backend facade.
//!
//! Every GPU call in the viewer goes through the [`Gl`] trait so the
//! resource and state model stays independent of the concrete API. The
//! production implementation is [`GlowGl`], a thin wrapper over a
//! [`glow::Context`]. Tests use a recording backend instead.
//!
//! The facade also owns the per-frame matrix state: the projection and view
//! matrices plus a model matrix stack. Whenever a program is bound or the
//! stack changes, the current `projection`, `view` and `model` uniforms are
//! delivered to the bound program.

use std::cell::RefCell;
use std::num::NonZeroU32;
use std::sync::Arc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

/// Handle to a compiled shading stage object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(pub(crate) NonZeroU32);

/// Handle to a linked program object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub(crate) NonZeroU32);

/// Handle to a GPU buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub(crate) NonZeroU32);

/// Handle to a vertex array object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub(crate) NonZeroU32);

/// Handle to a texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) NonZeroU32);

/// Handle to a framebuffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub(crate) NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Triangles,
    TriangleStrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    LessEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexFormat {
    Rgba8,
    Depth24,
}

/// Narrow graphics-API surface the viewer renders through.
pub trait Gl {
    // Shading stages and programs.
    fn create_stage(&self, kind: StageKind) -> Result<StageId, String>;
    fn stage_source(&self, stage: StageId, source: &str);
    fn compile_stage(&self, stage: StageId);
    fn stage_compile_ok(&self, stage: StageId) -> bool;
    fn stage_info_log(&self, stage: StageId) -> String;
    fn delete_stage(&self, stage: StageId);

    fn create_program(&self) -> Result<ProgramId, String>;
    fn attach_stage(&self, program: ProgramId, stage: StageId);
    fn detach_stage(&self, program: ProgramId, stage: StageId);
    fn bind_attrib_location(&self, program: ProgramId, index: u32, name: &str);
    fn link_program(&self, program: ProgramId);
    fn program_link_ok(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn delete_program(&self, program: ProgramId);
    fn use_program(&self, program: Option<ProgramId>);

    // Uniform delivery. A name the linked program does not expose is
    // silently ignored.
    fn set_uniform_i32(&self, program: ProgramId, name: &str, v: i32);
    fn set_uniform_f32(&self, program: ProgramId, name: &str, v: f32);
    fn set_uniform_vec2(&self, program: ProgramId, name: &str, v: Vec2);
    fn set_uniform_vec3(&self, program: ProgramId, name: &str, v: Vec3);
    fn set_uniform_vec4(&self, program: ProgramId, name: &str, v: Vec4);
    fn set_uniform_mat3(&self, program: ProgramId, name: &str, v: Mat3);
    fn set_uniform_mat4(&self, program: ProgramId, name: &str, v: Mat4);

    // Per-frame matrix state.
    fn set_projection_matrix(&self, m: Mat4);
    fn set_view_matrix(&self, m: Mat4);
    fn push_model_matrix(&self, m: Mat4);
    fn pop_model_matrix(&self);
    fn model_matrix(&self) -> Mat4;

    // Geometry.
    fn create_vertex_array(&self) -> Result<VertexArrayId, String>;
    fn create_buffer(&self) -> Result<BufferId, String>;
    fn bind_vertex_array(&self, vao: Option<VertexArrayId>);
    fn bind_array_buffer(&self, buffer: Option<BufferId>);
    fn bind_element_buffer(&self, buffer: Option<BufferId>);
    fn array_buffer_data(&self, data: &[u8]);
    fn element_buffer_data(&self, data: &[u8]);
    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, offset: i32);
    fn delete_vertex_array(&self, vao: VertexArrayId);
    fn delete_buffer(&self, buffer: BufferId);
    fn draw_elements(&self, mode: DrawMode, count: i32, offset_bytes: i32);

    // Textures.
    fn create_texture(&self) -> Result<TextureId, String>;
    fn upload_texture_2d(&self, tex: TextureId, width: u32, height: u32, rgba: &[u8]);
    fn upload_cube_face(&self, tex: TextureId, face: u32, width: u32, height: u32, rgba: &[u8]);
    fn alloc_texture_2d(&self, tex: TextureId, width: i32, height: i32, format: TexFormat);
    fn bind_texture_2d(&self, unit: u32, tex: Option<TextureId>);
    fn bind_texture_cube(&self, unit: u32, tex: Option<TextureId>);
    fn delete_texture(&self, tex: TextureId);

    // Framebuffers.
    fn create_framebuffer(&self) -> Result<FramebufferId, String>;
    fn bind_framebuffer(&self, fbo: Option<FramebufferId>);
    fn attach_color_texture(&self, tex: TextureId);
    fn attach_depth_texture(&self, tex: TextureId);
    fn framebuffer_complete(&self) -> bool;
    fn delete_framebuffer(&self, fbo: FramebufferId);

    // Fixed render state.
    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear(&self, r: f32, g: f32, b: f32, a: f32);
    fn set_depth_test(&self, on: bool);
    fn set_depth_func(&self, func: DepthFunc);
    fn set_cull(&self, face: Option<Face>);
    fn set_blend(&self, on: bool);
    fn set_polygon_mode(&self, mode: PolygonMode);
    fn set_line_width(&self, width: f32);
}

/// Projection, view and model-stack state shared by every backend.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    projection: Mat4,
    view: Mat4,
    stack: Vec<Mat4>,
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            stack: Vec::new(),
        }
    }

    pub fn set_projection(&mut self, m: Mat4) {
        self.projection = m;
    }

    pub fn set_view(&mut self, m: Mat4) {
        self.view = m;
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Pushes `current * m` so nested drawables compose their transforms.
    pub fn push(&mut self, m: Mat4) {
        let top = self.current();
        self.stack.push(top * m);
    }

    pub fn pop(&mut self) {
        debug_assert!(!self.stack.is_empty(), "model matrix stack underflow");
        self.stack.pop();
    }

    pub fn current(&self) -> Mat4 {
        self.stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Production backend over a real OpenGL 3.3 core context.
pub struct GlowGl {
    gl: Arc<glow::Context>,
    matrices: RefCell<MatrixStack>,
    bound_program: RefCell<Option<ProgramId>>,
}

impl GlowGl {
    pub fn new(gl: Arc<glow::Context>) -> Self {
        unsafe {
            gl.front_face(glow::CCW);
        }
        Self {
            gl,
            matrices: RefCell::new(MatrixStack::new()),
            bound_program: RefCell::new(None),
        }
    }

    fn raw_stage(stage: StageId) -> glow::NativeShader {
        glow::NativeShader(stage.0)
    }

    fn raw_program(program: ProgramId) -> glow::NativeProgram {
        glow::NativeProgram(program.0)
    }

    fn raw_buffer(buffer: BufferId) -> glow::NativeBuffer {
        glow::NativeBuffer(buffer.0)
    }

    fn raw_vertex_array(vao: VertexArrayId) -> glow::NativeVertexArray {
        glow::NativeVertexArray(vao.0)
    }

    fn raw_texture(tex: TextureId) -> glow::NativeTexture {
        glow::NativeTexture(tex.0)
    }

    fn raw_framebuffer(fbo: FramebufferId) -> glow::NativeFramebuffer {
        glow::NativeFramebuffer(fbo.0)
    }

    fn upload_matrix(&self, name: &str, m: Mat4) {
        if let Some(program) = *self.bound_program.borrow() {
            self.set_uniform_mat4(program, name, m);
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

impl Gl for GlowGl {
    fn create_stage(&self, kind: StageKind) -> Result<StageId, String> {
        let raw = match kind {
            StageKind::Vertex => glow::VERTEX_SHADER,
            StageKind::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.gl.create_shader(raw).map(|s| StageId(s.0)) }
    }

    fn stage_source(&self, stage: StageId, source: &str) {
        unsafe {
            self.gl.shader_source(Self::raw_stage(stage), source);
        }
    }

    fn compile_stage(&self, stage: StageId) {
        unsafe {
            self.gl.compile_shader(Self::raw_stage(stage));
        }
    }

    fn stage_compile_ok(&self, stage: StageId) -> bool {
        unsafe { self.gl.get_shader_compile_status(Self::raw_stage(stage)) }
    }

    fn stage_info_log(&self, stage: StageId) -> String {
        unsafe { self.gl.get_shader_info_log(Self::raw_stage(stage)) }
    }

    fn delete_stage(&self, stage: StageId) {
        unsafe {
            self.gl.delete_shader(Self::raw_stage(stage));
        }
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        unsafe { self.gl.create_program().map(|p| ProgramId(p.0)) }
    }

    fn attach_stage(&self, program: ProgramId, stage: StageId) {
        unsafe {
            self.gl
                .attach_shader(Self::raw_program(program), Self::raw_stage(stage));
        }
    }

    fn detach_stage(&self, program: ProgramId, stage: StageId) {
        unsafe {
            self.gl
                .detach_shader(Self::raw_program(program), Self::raw_stage(stage));
        }
    }

    fn bind_attrib_location(&self, program: ProgramId, index: u32, name: &str) {
        unsafe {
            self.gl
                .bind_attrib_location(Self::raw_program(program), index, name);
        }
    }

    fn link_program(&self, program: ProgramId) {
        unsafe {
            self.gl.link_program(Self::raw_program(program));
        }
    }

    fn program_link_ok(&self, program: ProgramId) -> bool {
        unsafe { self.gl.get_program_link_status(Self::raw_program(program)) }
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(Self::raw_program(program)) }
    }

    fn delete_program(&self, program: ProgramId) {
        if *self.bound_program.borrow() == Some(program) {
            *self.bound_program.borrow_mut() = None;
        }
        unsafe {
            self.gl.delete_program(Self::raw_program(program));
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe {
            self.gl.use_program(program.map(Self::raw_program));
        }
        *self.bound_program.borrow_mut() = program;
        if program.is_some() {
            self.upload_all_matrices();
        }
    }

    fn set_uniform_i32(&self, program: ProgramId, name: &str, v: i32) {
        unsafe {
            let program = Self::raw_program(program);
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_1_i32(Some(&loc), v);
            }
        }
    }

    fn set_uniform_f32(&self, program: ProgramId, name: &str, v: f32) {
        unsafe {
            let program = Self::raw_program(program);
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_1_f32(Some(&loc), v);
            }
        }
    }

    fn set_uniform_vec2(&self, program: ProgramId, name: &str, v: Vec2) {
        unsafe {
            let program = Self::raw_program(program);
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_2_f32(Some(&loc), v.x, v.y);
            }
        }
    }

    fn set_uniform_vec3(&self, program: ProgramId, name: &str, v: Vec3) {
        unsafe {
            let program = Self::raw_program(program);
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_3_f32(Some(&loc), v.x, v.y, v.z);
            }
        }
    }

    fn set_uniform_vec4(&self, program: ProgramId, name: &str, v: Vec4) {
        unsafe {
            let program = Self::raw_program(program);
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl.uniform_4_f32(Some(&loc), v.x, v.y, v.z, v.w);
            }
        }
    }

    fn set_uniform_mat3(&self, program: ProgramId, name: &str, v: Mat3) {
        unsafe {
            let program = Self::raw_program(program);
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl
                    .uniform_matrix_3_f32_slice(Some(&loc), false, v.as_ref());
            }
        }
    }

    fn set_uniform_mat4(&self, program: ProgramId, name: &str, v: Mat4) {
        unsafe {
            let program = Self::raw_program(program);
            if let Some(loc) = self.gl.get_uniform_location(program, name) {
                self.gl
                    .uniform_matrix_4_f32_slice(Some(&loc), false, v.as_ref());
            }
        }
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
        unsafe { self.gl.create_vertex_array().map(|v| VertexArrayId(v.0)) }
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        unsafe { self.gl.create_buffer().map(|b| BufferId(b.0)) }
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        unsafe {
            self.gl.bind_vertex_array(vao.map(Self::raw_vertex_array));
        }
    }

    fn bind_array_buffer(&self, buffer: Option<BufferId>) {
        unsafe {
            self.gl
                .bind_buffer(glow::ARRAY_BUFFER, buffer.map(Self::raw_buffer));
        }
    }

    fn bind_element_buffer(&self, buffer: Option<BufferId>) {
        unsafe {
            self.gl
                .bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer.map(Self::raw_buffer));
        }
    }

    fn array_buffer_data(&self, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
        }
    }

    fn element_buffer_data(&self, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, data, glow::STATIC_DRAW);
        }
    }

    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset);
            self.gl.enable_vertex_attrib_array(index);
        }
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        unsafe {
            self.gl.delete_vertex_array(Self::raw_vertex_array(vao));
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe {
            self.gl.delete_buffer(Self::raw_buffer(buffer));
        }
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, offset_bytes: i32) {
        let mode = match mode {
            DrawMode::Triangles => glow::TRIANGLES,
            DrawMode::TriangleStrip => glow::TRIANGLE_STRIP,
        };
        unsafe {
            self.gl
                .draw_elements(mode, count, glow::UNSIGNED_INT, offset_bytes);
        }
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        unsafe { self.gl.create_texture().map(|t| TextureId(t.0)) }
    }

    fn upload_texture_2d(&self, tex: TextureId, width: u32, height: u32, rgba: &[u8]) {
        unsafe {
            self.gl
                .bind_texture(glow::TEXTURE_2D, Some(Self::raw_texture(tex)));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(rgba)),
            );
            self.gl.generate_mipmap(glow::TEXTURE_2D);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn upload_cube_face(&self, tex: TextureId, face: u32, width: u32, height: u32, rgba: &[u8]) {
        unsafe {
            self.gl
                .bind_texture(glow::TEXTURE_CUBE_MAP, Some(Self::raw_texture(tex)));
            self.gl.tex_image_2d(
                glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(rgba)),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_WRAP_R,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_CUBE_MAP,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            self.gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
        }
    }

    fn alloc_texture_2d(&self, tex: TextureId, width: i32, height: i32, format: TexFormat) {
        let (internal, layout, ty, filter) = match format {
            TexFormat::Rgba8 => (
                glow::RGBA8 as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::LINEAR as i32,
            ),
            TexFormat::Depth24 => (
                glow::DEPTH_COMPONENT24 as i32,
                glow::DEPTH_COMPONENT,
                glow::UNSIGNED_INT,
                glow::NEAREST as i32,
            ),
        };
        unsafe {
            self.gl
                .bind_texture(glow::TEXTURE_2D, Some(Self::raw_texture(tex)));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                width,
                height,
                0,
                layout,
                ty,
                glow::PixelUnpackData::Slice(None),
            );
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn bind_texture_2d(&self, unit: u32, tex: Option<TextureId>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl
                .bind_texture(glow::TEXTURE_2D, tex.map(Self::raw_texture));
        }
    }

    fn bind_texture_cube(&self, unit: u32, tex: Option<TextureId>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl
                .bind_texture(glow::TEXTURE_CUBE_MAP, tex.map(Self::raw_texture));
        }
    }

    fn delete_texture(&self, tex: TextureId) {
        unsafe {
            self.gl.delete_texture(Self::raw_texture(tex));
        }
    }

    fn create_framebuffer(&self) -> Result<FramebufferId, String> {
        unsafe { self.gl.create_framebuffer().map(|f| FramebufferId(f.0)) }
    }

    fn bind_framebuffer(&self, fbo: Option<FramebufferId>) {
        unsafe {
            self.gl
                .bind_framebuffer(glow::FRAMEBUFFER, fbo.map(Self::raw_framebuffer));
        }
    }

    fn attach_color_texture(&self, tex: TextureId) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(Self::raw_texture(tex)),
                0,
            );
        }
    }

    fn attach_depth_texture(&self, tex: TextureId) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(Self::raw_texture(tex)),
                0,
            );
        }
    }

    fn framebuffer_complete(&self) -> bool {
        unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) == glow::FRAMEBUFFER_COMPLETE }
    }

    fn delete_framebuffer(&self, fbo: FramebufferId) {
        unsafe {
            self.gl.delete_framebuffer(Self::raw_framebuffer(fbo));
        }
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe {
            self.gl.viewport(x, y, width, height);
        }
    }

    fn clear(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn set_depth_test(&self, on: bool) {
        unsafe {
            if on {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn set_depth_func(&self, func: DepthFunc) {
        let func = match func {
            DepthFunc::Less => glow::LESS,
            DepthFunc::LessEqual => glow::LEQUAL,
        };
        unsafe {
            self.gl.depth_func(func);
        }
    }

    fn set_cull(&self, face: Option<Face>) {
        unsafe {
            match face {
                Some(face) => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(match face {
                        Face::Front => glow::FRONT,
                        Face::Back => glow::BACK,
                    });
                }
                None => self.gl.disable(glow::CULL_FACE),
            }
        }
    }

    fn set_blend(&self, on: bool) {
        unsafe {
            if on {
                self.gl.enable(glow::BLEND);
                self.gl
                    .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            } else {
                self.gl.disable(glow::BLEND);
            }
        }
    }

    fn set_polygon_mode(&self, mode: PolygonMode) {
        let mode = match mode {
            PolygonMode::Fill => glow::FILL,
            PolygonMode::Line => glow::LINE,
        };
        unsafe {
            self.gl.polygon_mode(glow::FRONT_AND_BACK, mode);
        }
    }

    fn set_line_width(&self, width: f32) {
        unsafe {
            self.gl.line_width(width);
        }
    }
}
