//! Line segment objects used by debug helpers.

use crate::math::{Aabb, Vec3};
use bytemuck::{Pod, Zeroable};

/// Line vertex with position and color.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LineVertex {
    /// Position.
    pub position: [f32; 3],
    /// Color (RGBA).
    pub color: [f32; 4],
}

impl LineVertex {
    /// Create a new line vertex.
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    /// Create from Vec3 and color.
    pub fn from_vec3(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    /// Get the vertex buffer layout.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];
}

/// Disconnected line segments; every two vertices form one segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSegments {
    vertices: Vec<LineVertex>,
}

impl LineSegments {
    /// Create an empty segment list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a vertex list.
    pub fn from_vertices(vertices: Vec<LineVertex>) -> Self {
        Self { vertices }
    }

    /// Append one segment.
    pub fn push_segment(&mut self, from: Vec3, to: Vec3, color: [f32; 4]) {
        self.vertices.push(LineVertex::from_vec3(from, color));
        self.vertices.push(LineVertex::from_vec3(to, color));
    }

    /// Get the vertices.
    #[inline]
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    /// Number of segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }

    /// Local bounds of all vertices.
    pub fn bounding_box(&self) -> Aabb {
        let points: Vec<Vec3> = self
            .vertices
            .iter()
            .map(|v| Vec3::from_array(v.position))
            .collect();
        Aabb::from_points(&points)
    }
}
