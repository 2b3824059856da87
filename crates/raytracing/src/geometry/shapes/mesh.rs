use std::sync::Arc;

use crate::accel::BoundingVolumeHierarchy;
use crate::geometry::{Vec2, Vec3, Vec3u, AABB};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub texture_coordinates: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, texture_coordinates: Vec2) -> Vertex {
        Vertex { position, normal, texture_coordinates }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Triangle {
    pub a: Vertex,
    pub b: Vertex,
    pub c: Vertex,
}

impl Triangle {
    pub fn new(a: Vertex, b: Vertex, c: Vertex) -> Triangle {
        Triangle { a, b, c }
    }

    pub fn vertices(&self) -> [Vertex; 3] {
        [self.a, self.b, self.c]
    }

    pub fn bounds(&self) -> AABB {
        AABB::from_triangle(self.a.position, self.b.position, self.c.position)
    }

    pub fn centroid(&self) -> Vec3 {
        (self.a.position + self.b.position + self.c.position) / 3.0
    }

    pub fn area(&self) -> f32 {
        Vec3::cross(self.b.position - self.a.position, self.c.position - self.a.position).length() / 2.0
    }
}

/// An ordered collection of triangles sharing one primitive (and thus one surface).
///
/// Triangle storage is shared, so cloning a mesh into several primitives
/// (instancing) is cheap. Equality is structural over the triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    triangles: Arc<[Triangle]>,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<Triangle>) -> TriangleMesh {
        TriangleMesh { triangles: triangles.into() }
    }

    /// Builds a mesh from indexed vertex data.
    /// `uvs` may be empty, in which case every texture coordinate is zero.
    ///
    /// # Panics
    /// If an index in `tris` is out of range for `vertices` or `normals`.
    pub fn from_indexed(vertices: &[Vec3], normals: &[Vec3], uvs: &[Vec2], tris: &[Vec3u]) -> TriangleMesh {
        let vertex = |i: u32| {
            let i = i as usize;
            Vertex {
                position: vertices[i],
                normal: normals[i],
                texture_coordinates: uvs.get(i).copied().unwrap_or_default(),
            }
        };

        let triangles = tris
            .iter()
            .map(|tri| Triangle::new(vertex(tri.0), vertex(tri.1), vertex(tri.2)))
            .collect();

        TriangleMesh::new(triangles)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounds(&self) -> Option<AABB> {
        AABB::union_all(self.triangles.iter().map(Triangle::bounds))
    }

    pub fn area(&self) -> f32 {
        self.triangles.iter().map(Triangle::area).sum()
    }

    pub fn bounding_volume_hierarchy(&self, max_triangles_per_leaf: usize) -> BoundingVolumeHierarchy {
        BoundingVolumeHierarchy::build(&self.triangles, max_triangles_per_leaf)
    }
}
