//! Off-screen render targets.
//!
//! A [`RenderTarget`] bundles a framebuffer with an RGBA color texture and
//! an optional 24-bit depth texture, sized once and reused frame after
//! frame. The color side can be bound as a plain texture for full-screen
//! post passes.

use std::rc::Rc;

use super::gl::{FramebufferId, Gl, TexFormat, TextureId};

pub struct RenderTarget {
    gl: Rc<dyn Gl>,
    fbo: FramebufferId,
    color: TextureId,
    depth: Option<TextureId>,
    width: i32,
    height: i32,
}

impl RenderTarget {
    pub fn new(gl: Rc<dyn Gl>, width: i32, height: i32, use_depth: bool) -> Result<Self, String> {
        let fbo = gl.create_framebuffer()?;
        gl.bind_framebuffer(Some(fbo));

        let color = gl.create_texture()?;
        gl.alloc_texture_2d(color, width, height, TexFormat::Rgba8);
        gl.attach_color_texture(color);

        let depth = if use_depth {
            let tex = gl.create_texture()?;
            gl.alloc_texture_2d(tex, width, height, TexFormat::Depth24);
            gl.attach_depth_texture(tex);
            Some(tex)
        } else {
            None
        };

        let complete = gl.framebuffer_complete();
        gl.bind_framebuffer(None);
        if !complete {
            gl.delete_texture(color);
            if let Some(tex) = depth {
                gl.delete_texture(tex);
            }
            gl.delete_framebuffer(fbo);
            return Err("framebuffer incomplete".to_owned());
        }

        Ok(Self {
            gl,
            fbo,
            color,
            depth,
            width,
            height,
        })
    }

    /// Binds the framebuffer for rendering.
    pub fn bind(&self) {
        self.gl.bind_framebuffer(Some(self.fbo));
    }

    /// Unbinds the framebuffer, reverting to the default framebuffer.
    pub fn unbind(&self) {
        self.gl.bind_framebuffer(None);
    }

    /// Binds the color attachment as an ordinary 2D texture.
    pub fn bind_color_to_unit(&self, unit: u32) {
        self.gl.bind_texture_2d(unit, Some(self.color));
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        self.gl.delete_texture(self.color);
        if let Some(tex) = self.depth.take() {
            self.gl.delete_texture(tex);
        }
        self.gl.delete_framebuffer(self.fbo);
    }
}
