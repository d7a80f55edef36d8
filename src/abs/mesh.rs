//! Mesh management module.
//!
//! [`GpuMesh`] owns a vertex array plus its two buffers and knows how to
//! draw all or part of its index range. Vertex layouts implement the
//! [`Vertex`] trait. Geometry generators live here as plain functions so
//! they can be checked without a GPU.

use std::rc::Rc;

use glam::{Vec2, Vec3};

use super::gl::{BufferId, DrawMode, Gl, VertexArrayId};

/// Trait that defines the attribute layout of a vertex.
pub trait Vertex {
    /// Sets up the vertex attribute pointers for the vertex.
    fn vertex_attribs(gl: &dyn Gl);
}

/// Full model vertex: position, normal and texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex for ModelVertex {
    fn vertex_attribs(gl: &dyn Gl) {
        let stride = std::mem::size_of::<ModelVertex>() as i32;
        gl.vertex_attrib_f32(0, 3, stride, 0);
        gl.vertex_attrib_f32(1, 3, stride, 12);
        gl.vertex_attrib_f32(2, 2, stride, 24);
    }
}

/// Two-component parametric coordinate; the vertex program turns it into a
/// surface point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricVertex {
    pub parametric: Vec2,
}

impl Vertex for ParametricVertex {
    fn vertex_attribs(gl: &dyn Gl) {
        gl.vertex_attrib_f32(0, 2, std::mem::size_of::<ParametricVertex>() as i32, 0);
    }
}

/// Bare position, for flat-colored helpers like markers and the sky box.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionVertex {
    pub position: Vec3,
}

impl Vertex for PositionVertex {
    fn vertex_attribs(gl: &dyn Gl) {
        gl.vertex_attrib_f32(0, 3, std::mem::size_of::<PositionVertex>() as i32, 0);
    }
}

/// Screen-space position plus texture coordinate for full-screen passes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadVertex {
    pub position: Vec2,
    pub uv: Vec2,
}

impl Vertex for QuadVertex {
    fn vertex_attribs(gl: &dyn Gl) {
        let stride = std::mem::size_of::<QuadVertex>() as i32;
        gl.vertex_attrib_f32(0, 2, stride, 0);
        gl.vertex_attrib_f32(1, 2, stride, 8);
    }
}

fn as_bytes<V>(slice: &[V]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice))
    }
}

/// Represents a mesh stored on the GPU side.
pub struct GpuMesh {
    gl: Rc<dyn Gl>,
    mode: DrawMode,
    vao: VertexArrayId,
    vbo: BufferId,
    ebo: BufferId,
    index_count: usize,
}

impl GpuMesh {
    /// Creates a new mesh from the given vertex and index data.
    pub fn new<V: Vertex>(
        gl: Rc<dyn Gl>,
        vertices: &[V],
        indices: &[u32],
        mode: DrawMode,
    ) -> Result<Self, String> {
        let vao = gl.create_vertex_array()?;
        let vbo = gl.create_buffer()?;
        let ebo = gl.create_buffer()?;

        gl.bind_vertex_array(Some(vao));
        gl.bind_array_buffer(Some(vbo));
        gl.array_buffer_data(as_bytes(vertices));
        gl.bind_element_buffer(Some(ebo));
        gl.element_buffer_data(as_bytes(indices));
        V::vertex_attribs(gl.as_ref());
        gl.bind_vertex_array(None);
        gl.bind_array_buffer(None);
        gl.bind_element_buffer(None);

        Ok(Self {
            gl,
            mode,
            vao,
            vbo,
            ebo,
            index_count: indices.len(),
        })
    }

    /// Draws the whole index range.
    pub fn draw(&self) {
        self.draw_range(0, self.index_count);
    }

    /// Draws `count` indices starting at index `first`.
    pub fn draw_range(&self, first: usize, count: usize) {
        let offset = (first * std::mem::size_of::<u32>()) as i32;
        self.gl.bind_vertex_array(Some(self.vao));
        self.gl.draw_elements(self.mode, count as i32, offset);
        self.gl.bind_vertex_array(None);
    }

    /// Returns the amount of indices used in the mesh.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.vbo);
        self.gl.delete_buffer(self.ebo);
        self.gl.delete_vertex_array(self.vao);
    }
}

/// Regular grid over `[min, max]` with `steps = (sx, sy)` cells, laid out
/// row-major bottom-to-top. The far edges land exactly on `max` so closed
/// parametric surfaces meet themselves. Indices come in strip order, one
/// strip of `2 * (sx + 1)` entries per row.
pub fn parametric_grid(min: Vec2, max: Vec2, steps: (u32, u32)) -> (Vec<ParametricVertex>, Vec<u32>) {
    let (sx, sy) = steps;
    let dx = (max.x - min.x) / sx as f32;
    let dy = (max.y - min.y) / sy as f32;

    let mut vertices = Vec::with_capacity(((sx + 1) * (sy + 1)) as usize);
    for i in 0..=sy {
        let v = if i == sy { max.y } else { min.y + i as f32 * dy };
        for j in 0..=sx {
            let u = if j == sx { max.x } else { min.x + j as f32 * dx };
            vertices.push(ParametricVertex {
                parametric: Vec2::new(u, v),
            });
        }
    }

    let mut indices = Vec::with_capacity((2 * (sx + 1) * sy) as usize);
    for i in 0..sy {
        for j in 0..=sx {
            indices.push(i * (sx + 1) + j);
            indices.push((i + 1) * (sx + 1) + j);
        }
    }
    (vertices, indices)
}

/// Parametric grid on the GPU, drawn as one triangle strip per row.
pub struct Mesh2D {
    mesh: GpuMesh,
    rows: u32,
    row_indices: usize,
}

impl Mesh2D {
    pub fn new(gl: Rc<dyn Gl>, min: Vec2, max: Vec2, steps: (u32, u32)) -> Result<Self, String> {
        let (vertices, indices) = parametric_grid(min, max, steps);
        let mesh = GpuMesh::new(gl, &vertices, &indices, DrawMode::TriangleStrip)?;
        Ok(Self {
            mesh,
            rows: steps.1,
            row_indices: 2 * (steps.0 as usize + 1),
        })
    }

    pub fn draw(&self) {
        for row in 0..self.rows as usize {
            self.mesh.draw_range(row * self.row_indices, self.row_indices);
        }
    }
}

/// Latitude-longitude sphere around the origin.
pub fn uv_sphere(radius: f32, slices: u32, stacks: u32) -> (Vec<PositionVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);
    for i in 0..=stacks {
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = std::f32::consts::TAU * j as f32 / slices as f32;
            vertices.push(PositionVertex {
                position: Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.sin(),
                ),
            });
        }
    }

    let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let row = i * (slices + 1);
            let next = (i + 1) * (slices + 1);
            indices.extend_from_slice(&[
                row + j,
                next + j,
                row + j + 1,
                row + j + 1,
                next + j,
                next + j + 1,
            ]);
        }
    }
    (vertices, indices)
}

/// Axis-aligned cube of half-extent `size`, faces wound to be seen from
/// the inside.
pub fn inward_cube(size: f32) -> (Vec<PositionVertex>, Vec<u32>) {
    let s = size;
    let corners = [
        Vec3::new(-s, -s, -s),
        Vec3::new(s, -s, -s),
        Vec3::new(s, s, -s),
        Vec3::new(-s, s, -s),
        Vec3::new(-s, -s, s),
        Vec3::new(s, -s, s),
        Vec3::new(s, s, s),
        Vec3::new(-s, s, s),
    ];
    let vertices = corners
        .iter()
        .map(|&position| PositionVertex { position })
        .collect();

    // Each face as two triangles, counter-clockwise when viewed from the
    // cube's center.
    let indices = vec![
        0, 2, 1, 0, 3, 2, // -z
        4, 5, 6, 4, 6, 7, // +z
        0, 7, 3, 0, 4, 7, // -x
        1, 2, 6, 1, 6, 5, // +x
        3, 6, 2, 3, 7, 6, // +y
        0, 1, 5, 0, 5, 4, // -y
    ];
    (vertices, indices)
}

/// Two-triangle quad covering the whole viewport in clip space.
pub fn fullscreen_quad() -> (Vec<QuadVertex>, Vec<u32>) {
    let vertices = vec![
        QuadVertex {
            position: Vec2::new(-1.0, -1.0),
            uv: Vec2::new(0.0, 0.0),
        },
        QuadVertex {
            position: Vec2::new(1.0, -1.0),
            uv: Vec2::new(1.0, 0.0),
        },
        QuadVertex {
            position: Vec2::new(1.0, 1.0),
            uv: Vec2::new(1.0, 1.0),
        },
        QuadVertex {
            position: Vec2::new(-1.0, 1.0),
            uv: Vec2::new(0.0, 1.0),
        },
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (vertices, indices)
}
