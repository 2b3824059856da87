//! Walks a scene once and lists every entity each primitive references,
//! duplicates included.

use crate::accel::BoundingVolumeHierarchy;
use crate::compiler::dedup::distinct;
use crate::compiler::keys::{Key, StructuralKey};
use crate::geometry::{Plane, Shape, Sphere, Terrain, Triangle, TriangleMesh, Vec2, Vec3};
use crate::materials::{Surface, Texture};
use crate::scene::{Primitive, Scene};

/// A unique mesh together with the hierarchy built over its triangles.
/// Identity is the mesh's.
#[derive(Debug, Clone)]
pub struct MeshHierarchy {
    pub mesh: TriangleMesh,
    pub bvh: BoundingVolumeHierarchy,
}

impl StructuralKey for MeshHierarchy {
    fn append_key(&self, key: &mut Key) {
        self.mesh.append_key(key);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub primitives: Vec<Primitive>,
    pub primitives_emitting_light: Vec<Primitive>,
    pub planes: Vec<Plane>,
    pub spheres: Vec<Sphere>,
    pub terrains: Vec<Terrain>,
    pub triangles: Vec<Triangle>,
    pub triangle_meshes: Vec<TriangleMesh>,
    pub bounding_volume_hierarchies: Vec<MeshHierarchy>,
    pub surfaces: Vec<Surface>,
    pub textures: Vec<Texture>,
    pub point2fs: Vec<Vec2>,
    pub point3fs: Vec<Vec3>,
    pub vector3fs: Vec<Vec3>,
}

impl Extraction {
    /// Hierarchies are built once per structurally distinct mesh, so a mesh
    /// instanced by several primitives contributes a single hierarchy.
    pub fn from_scene(scene: &Scene, max_triangles_per_leaf: usize) -> Extraction {
        let mut extraction = Extraction::default();

        for primitive in scene.primitives() {
            extraction.primitives.push(primitive.clone());
            if primitive.is_emissive() {
                extraction.primitives_emitting_light.push(primitive.clone());
            }

            match &primitive.shape {
                Shape::Plane(plane) => extraction.add_plane(plane),
                Shape::Sphere(sphere) => extraction.add_sphere(sphere),
                Shape::Terrain(terrain) => extraction.terrains.push(*terrain),
                Shape::Triangle(triangle) => extraction.add_triangle(triangle),
                Shape::TriangleMesh(mesh) => {
                    extraction.triangle_meshes.push(mesh.clone());
                    for triangle in mesh.triangles() {
                        extraction.add_triangle(triangle);
                    }
                }
            }

            extraction.surfaces.push(primitive.surface.clone());
            extraction
                .textures
                .extend(primitive.surface.textures().into_iter().cloned());
        }

        for mesh in distinct(&extraction.triangle_meshes) {
            let bvh = mesh.bounding_volume_hierarchy(max_triangles_per_leaf);
            for node in bvh.nodes() {
                extraction.point3fs.push(node.bounds.minimum);
                extraction.point3fs.push(node.bounds.maximum);
            }
            extraction.bounding_volume_hierarchies.push(MeshHierarchy { mesh, bvh });
        }

        extraction
    }

    fn add_plane(&mut self, plane: &Plane) {
        self.planes.push(*plane);
        self.point3fs.extend_from_slice(&[plane.a, plane.b, plane.c]);
        self.vector3fs.push(plane.surface_normal);
    }

    fn add_sphere(&mut self, sphere: &Sphere) {
        self.spheres.push(*sphere);
        self.point3fs.push(sphere.position);
    }

    fn add_triangle(&mut self, triangle: &Triangle) {
        self.triangles.push(*triangle);
        for vertex in triangle.vertices() {
            self.point3fs.push(vertex.position);
            self.vector3fs.push(vertex.normal);
            self.point2fs.push(vertex.texture_coordinates);
        }
    }

    /// Every list collapsed to its structurally distinct elements
    pub fn deduplicated(&self) -> Extraction {
        Extraction {
            primitives: distinct(&self.primitives),
            primitives_emitting_light: distinct(&self.primitives_emitting_light),
            planes: distinct(&self.planes),
            spheres: distinct(&self.spheres),
            terrains: distinct(&self.terrains),
            triangles: distinct(&self.triangles),
            triangle_meshes: distinct(&self.triangle_meshes),
            bounding_volume_hierarchies: distinct(&self.bounding_volume_hierarchies),
            surfaces: distinct(&self.surfaces),
            textures: distinct(&self.textures),
            point2fs: distinct(&self.point2fs),
            point3fs: distinct(&self.point3fs),
            vector3fs: distinct(&self.vector3fs),
        }
    }
}
