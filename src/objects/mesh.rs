//! Mesh objects produced by the glTF loader.

use crate::material::StandardMaterial;
use crate::math::Aabb;

/// One drawable part of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Local bounds from the POSITION accessor.
    pub bounds: Aabb,
    /// Surface material; `None` until normalized.
    pub material: Option<StandardMaterial>,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of indices, 0 for non-indexed primitives.
    pub index_count: usize,
}

impl Primitive {
    /// Create a primitive without a material.
    pub fn new(bounds: Aabb, vertex_count: usize) -> Self {
        Self {
            bounds,
            material: None,
            vertex_count,
            index_count: 0,
        }
    }

    /// Builder: set the material.
    pub fn with_material(mut self, material: StandardMaterial) -> Self {
        self.material = Some(material);
        self
    }

    /// Number of triangles drawn.
    pub fn triangle_count(&self) -> usize {
        if self.index_count > 0 {
            self.index_count / 3
        } else {
            self.vertex_count / 3
        }
    }
}

/// A mesh is a set of primitives sharing one node transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Mesh name.
    pub name: String,
    /// Drawable parts.
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    /// Create a mesh from primitives.
    pub fn new(name: impl Into<String>, primitives: Vec<Primitive>) -> Self {
        Self {
            name: name.into(),
            primitives,
        }
    }

    /// Union of primitive bounds in mesh-local space.
    pub fn bounding_box(&self) -> Aabb {
        self.primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union(&p.bounds))
    }

    /// Total triangle count.
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(Primitive::triangle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn test_mesh_bounds_union() {
        let mesh = Mesh::new(
            "m",
            vec![
                Primitive::new(Aabb::new(Vec3::ZERO, Vec3::ONE), 3),
                Primitive::new(Aabb::new(Vec3::splat(-1.0), Vec3::ZERO), 6),
            ],
        );
        assert_eq!(mesh.bounding_box(), Aabb::new(Vec3::splat(-1.0), Vec3::ONE));
        assert_eq!(mesh.triangle_count(), 3);
    }
}
