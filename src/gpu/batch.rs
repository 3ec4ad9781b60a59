//! CPU-side tessellation of a frame into a triangle list.
//!
//! Every primitive becomes one quad (two triangles) in pixel space. The
//! vertex shader maps pixels to clip space.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::canvas::{Canvas, Rgba};
use crate::star::Bounds;

/// One vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Surface pixels, origin top-left.
    pub position: [f32; 2],
    /// Straight (non-premultiplied) RGBA, clamped to 0.0-1.0.
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A [`Canvas`] that records a frame as triangles.
#[derive(Debug, Default, Clone)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    fn push_quad(&mut self, corners: [Vec2; 4], color: [f32; 4]) {
        let [a, b, c, d] = corners.map(|p| Vertex {
            position: p.to_array(),
            color,
        });
        self.vertices.extend_from_slice(&[a, b, c, a, c, d]);
    }
}

fn clamped(color: Rgba) -> [f32; 4] {
    [
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        color.a.clamp(0.0, 1.0),
    ]
}

impl Canvas for VertexBatch {
    fn clear(&mut self, _bounds: Bounds) {
        self.vertices.clear();
    }

    fn fill_square(&mut self, center: Vec2, size: f32, color: Rgba) {
        if !center.is_finite() {
            return;
        }
        let h = size / 2.0;
        self.push_quad(
            [
                center + Vec2::new(-h, -h),
                center + Vec2::new(h, -h),
                center + Vec2::new(h, h),
                center + Vec2::new(-h, h),
            ],
            clamped(color),
        );
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        let dir = to - from;
        let length = dir.length();
        if !length.is_finite() || length == 0.0 {
            return;
        }

        // Sub-pixel lines are drawn one pixel wide with proportional
        // coverage, the way a 2D canvas antialiases hairlines.
        let (width, coverage) = if width < 1.0 {
            (1.0, width.max(0.0))
        } else {
            (width, 1.0)
        };

        let mut rgba = clamped(color);
        rgba[3] *= coverage;

        let offset = Vec2::new(-dir.y, dir.x) / length * (width / 2.0);
        self.push_quad([from + offset, to + offset, to - offset, from - offset], rgba);
    }
}
