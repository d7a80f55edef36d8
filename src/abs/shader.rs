//! Shading stages and programs with validate-on-demand lifetimes.
//!
//! A [`ShaderStage`] or [`ShadingProgram`] never talks to the GPU at
//! construction time. Each tracks a dirty flag; [`validate`](ShadingProgram::validate)
//! (re)creates, compiles and links only when the flag is set or the handle
//! is missing, and is a no-op otherwise. Changing a source path just marks
//! the object dirty, so the cost is paid at the next use, once.
//!
//! Compile and link failures are cached alongside the flag: a broken
//! program keeps returning the same error until something marks it dirty
//! again, instead of hitting the compiler every frame.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use super::gl::{Gl, ProgramId, StageId, StageKind};

/// Value that can be delivered to a named program uniform.
pub trait UniformValue {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str);
}

impl UniformValue for i32 {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str) {
        gl.set_uniform_i32(program, name, *self);
    }
}

impl UniformValue for f32 {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str) {
        gl.set_uniform_f32(program, name, *self);
    }
}

impl UniformValue for Vec2 {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str) {
        gl.set_uniform_vec2(program, name, *self);
    }
}

impl UniformValue for Vec3 {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str) {
        gl.set_uniform_vec3(program, name, *self);
    }
}

impl UniformValue for Vec4 {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str) {
        gl.set_uniform_vec4(program, name, *self);
    }
}

impl UniformValue for Mat3 {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str) {
        gl.set_uniform_mat3(program, name, *self);
    }
}

impl UniformValue for Mat4 {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str) {
        gl.set_uniform_mat4(program, name, *self);
    }
}

impl<T: UniformValue> UniformValue for &T {
    fn set_uniform(&self, gl: &dyn Gl, program: ProgramId, name: &str) {
        (*self).set_uniform(gl, program, name);
    }
}

/// One compilation unit (vertex or fragment) loaded from a source file.
pub struct ShaderStage {
    gl: Rc<dyn Gl>,
    kind: StageKind,
    path: PathBuf,
    handle: Option<StageId>,
    dirty: bool,
    error: Option<String>,
}

impl ShaderStage {
    pub fn new(gl: Rc<dyn Gl>, kind: StageKind, path: impl Into<PathBuf>) -> Self {
        Self {
            gl,
            kind,
            path: path.into(),
            handle: None,
            dirty: true,
            error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Points the stage at a different source file and marks it dirty.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn handle(&self) -> Option<StageId> {
        self.handle
    }

    /// Recompiles if dirty or never compiled, otherwise returns the cached
    /// handle (or the cached failure).
    pub fn validate(&mut self) -> Result<StageId, String> {
        if !self.dirty {
            if let Some(error) = &self.error {
                return Err(error.clone());
            }
            if let Some(handle) = self.handle {
                return Ok(handle);
            }
        }

        let handle = match self.handle {
            Some(handle) => handle,
            None => {
                let handle = self.gl.create_stage(self.kind)?;
                self.handle = Some(handle);
                handle
            }
        };

        // The flag clears whether or not the compile succeeds; a broken
        // source is not retried until something marks the stage dirty.
        self.dirty = false;

        let source = match fs::read_to_string(&self.path) {
            Ok(source) => source,
            Err(e) => {
                let error = format!("failed to read shader `{}`: {e}", self.path.display());
                self.error = Some(error.clone());
                return Err(error);
            }
        };
        self.gl.stage_source(handle, &source);
        self.gl.compile_stage(handle);

        if self.gl.stage_compile_ok(handle) {
            // Drivers park warnings in the log of a successful compile.
            let warnings = self.gl.stage_info_log(handle);
            if !warnings.is_empty() {
                log::debug!("compiling `{}`:\n{warnings}", self.path.display());
            }
            self.error = None;
            Ok(handle)
        } else {
            let error = format!(
                "failed to compile `{}`:\n{}",
                self.path.display(),
                self.gl.stage_info_log(handle)
            );
            self.error = Some(error.clone());
            Err(error)
        }
    }

    /// Forgets the handle without deleting it. The caller takes over the
    /// GPU object; the stage rebuilds on its next validate.
    pub fn release(&mut self) -> Option<StageId> {
        self.handle.take()
    }

    /// Deletes the handle and marks the stage dirty.
    pub fn reset(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.gl.delete_stage(handle);
        }
        self.dirty = true;
        self.error = None;
    }
}

impl Drop for ShaderStage {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.gl.delete_stage(handle);
        }
    }
}

/// Linked vertex + fragment pair, validated on demand.
pub struct ShadingProgram {
    gl: Rc<dyn Gl>,
    vertex: ShaderStage,
    fragment: ShaderStage,
    attribs: Vec<(u32, String)>,
    handle: Option<ProgramId>,
    dirty: bool,
    error: Option<String>,
}

impl ShadingProgram {
    pub fn new(
        gl: Rc<dyn Gl>,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
    ) -> Self {
        let vertex = ShaderStage::new(gl.clone(), StageKind::Vertex, vertex_path);
        let fragment = ShaderStage::new(gl.clone(), StageKind::Fragment, fragment_path);
        Self {
            gl,
            vertex,
            fragment,
            attribs: Vec::new(),
            handle: None,
            dirty: true,
            error: None,
        }
    }

    /// Builds a fresh program eagerly. On failure the partial object is
    /// dropped (freeing whatever it created) and the error is returned, so
    /// callers can swap the result in only once it is known good.
    pub fn build(
        gl: Rc<dyn Gl>,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
    ) -> Result<Self, String> {
        let mut program = Self::new(gl, vertex_path, fragment_path);
        program.validate()?;
        Ok(program)
    }

    pub fn vertex_path(&self) -> &Path {
        self.vertex.path()
    }

    pub fn fragment_path(&self) -> &Path {
        self.fragment.path()
    }

    pub fn set_vertex_path(&mut self, path: impl Into<PathBuf>) {
        self.vertex.set_path(path);
        self.dirty = true;
    }

    pub fn set_fragment_path(&mut self, path: impl Into<PathBuf>) {
        self.fragment.set_path(path);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.vertex.is_dirty() || self.fragment.is_dirty()
    }

    pub fn handle(&self) -> Option<ProgramId> {
        self.handle
    }

    /// Revalidates both stages and relinks if anything is dirty or the
    /// program object is missing. Clean and linked means no GPU traffic.
    pub fn validate(&mut self) -> Result<ProgramId, String> {
        if !self.is_dirty() {
            if let Some(error) = &self.error {
                return Err(error.clone());
            }
            if let Some(handle) = self.handle {
                return Ok(handle);
            }
        }

        let vertex = match self.vertex.validate() {
            Ok(handle) => handle,
            Err(e) => {
                self.dirty = false;
                self.error = Some(e.clone());
                return Err(e);
            }
        };
        let fragment = match self.fragment.validate() {
            Ok(handle) => handle,
            Err(e) => {
                self.dirty = false;
                self.error = Some(e.clone());
                return Err(e);
            }
        };

        let handle = match self.handle {
            Some(handle) => handle,
            None => {
                let handle = self.gl.create_program()?;
                self.handle = Some(handle);
                handle
            }
        };

        self.gl.attach_stage(handle, vertex);
        self.gl.attach_stage(handle, fragment);
        // Attribute bindings only take effect at link time, so they are
        // replayed on every relink.
        for (index, name) in &self.attribs {
            self.gl.bind_attrib_location(handle, *index, name);
        }
        self.gl.link_program(handle);
        self.dirty = false;
        let linked = self.gl.program_link_ok(handle);
        self.gl.detach_stage(handle, vertex);
        self.gl.detach_stage(handle, fragment);

        if linked {
            let warnings = self.gl.program_info_log(handle);
            if !warnings.is_empty() {
                log::debug!(
                    "linking `{}` + `{}`:\n{warnings}",
                    self.vertex.path().display(),
                    self.fragment.path().display()
                );
            }
            self.error = None;
            Ok(handle)
        } else {
            let error = format!(
                "failed to link `{}` + `{}`:\n{}",
                self.vertex.path().display(),
                self.fragment.path().display(),
                self.gl.program_info_log(handle)
            );
            self.error = Some(error.clone());
            Err(error)
        }
    }

    /// Validates and returns the program handle.
    pub fn get(&mut self) -> Result<ProgramId, String> {
        self.validate()
    }

    /// Makes the program current, validating first. A validation failure is
    /// logged and the last linked binary stays bound; a program that never
    /// reached the GPU at all is a caller bug and panics.
    pub fn bind(&mut self) -> ProgramId {
        if let Err(e) = self.validate() {
            log::error!("{e}");
        }
        let handle = self
            .handle
            .expect("use of a shading program that never compiled");
        self.gl.use_program(Some(handle));
        handle
    }

    /// Binds the program and writes one named uniform. Unknown names are
    /// ignored, so programs only declare the inputs they read.
    pub fn set_uniform<T: UniformValue>(&mut self, name: &str, value: T) {
        let handle = self.bind();
        value.set_uniform(self.gl.as_ref(), handle, name);
    }

    /// Assigns a sampler uniform to a texture unit.
    pub fn set_sampler(&mut self, name: &str, unit: i32) {
        self.set_uniform(name, unit);
    }

    /// Pins a vertex attribute to a fixed index. Takes effect at the next
    /// link, so the program is marked dirty.
    pub fn bind_attrib(&mut self, index: u32, name: impl Into<String>) {
        self.attribs.push((index, name.into()));
        self.dirty = true;
    }

    /// Exchanges complete identities with `other`: handles, source paths,
    /// dirty flags and cached errors all switch places. Nothing is created
    /// or destroyed.
    pub fn swap(&mut self, other: &mut ShadingProgram) {
        std::mem::swap(&mut self.vertex, &mut other.vertex);
        std::mem::swap(&mut self.fragment, &mut other.fragment);
        std::mem::swap(&mut self.attribs, &mut other.attribs);
        std::mem::swap(&mut self.handle, &mut other.handle);
        std::mem::swap(&mut self.dirty, &mut other.dirty);
        std::mem::swap(&mut self.error, &mut other.error);
    }

    /// Forgets the program handle without deleting it; the stages keep
    /// theirs. Returns the handle the caller now owns, if any.
    pub fn release(&mut self) -> Option<ProgramId> {
        self.handle.take()
    }

    /// Deletes the program object and both stage objects, leaving the
    /// source paths in place and everything dirty.
    pub fn reset(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.gl.delete_program(handle);
        }
        self.vertex.reset();
        self.fragment.reset();
        self.dirty = true;
        self.error = None;
    }
}

impl Drop for ShadingProgram {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.gl.delete_program(handle);
        }
    }
}
