//! This module contains the core graphics components for the viewer,
//! including application setup, the backend facade, shader lifetimes,
//! meshes, textures and render targets.

pub mod app;
pub mod framebuffer;
pub mod gl;
pub mod mesh;
pub mod shader;
pub mod texture;
#[cfg(test)]
pub mod trace;

pub use app::*;
pub use framebuffer::*;
pub use gl::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
