//! Canonical keys for structural deduplication.
//!
//! Two entities are the same exactly when every field is equal, so a key is
//! the sequence of 32-bit words of all fields. Floats contribute their bit
//! patterns: `-0.0` and `0.0` are different keys, while every NaN collapses to
//! one canonical NaN so that a NaN field still compares equal to itself.

use crate::geometry::{Matrix4x4, Plane, Shape, Sphere, Terrain, Transform, Triangle, TriangleMesh, Vec2, Vec3, Vertex};
use crate::materials::{Surface, Texture};
use crate::scene::Primitive;

const CANONICAL_NAN: u32 = 0x7fc0_0000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Key(Vec<u32>);

impl Key {
    pub fn float(&mut self, value: f32) {
        self.0.push(if value.is_nan() { CANONICAL_NAN } else { value.to_bits() });
    }

    pub fn floats(&mut self, values: &[f32]) {
        for &value in values {
            self.float(value);
        }
    }

    pub fn word(&mut self, value: u32) {
        self.0.push(value);
    }

    pub fn tag(&mut self, value: i32) {
        self.0.push(value as u32);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub trait StructuralKey {
    fn append_key(&self, key: &mut Key);

    fn structural_key(&self) -> Key {
        let mut key = Key::default();
        self.append_key(&mut key);
        key
    }
}

impl<T: StructuralKey + ?Sized> StructuralKey for &T {
    fn append_key(&self, key: &mut Key) {
        (**self).append_key(key)
    }
}

impl StructuralKey for Vec2 {
    fn append_key(&self, key: &mut Key) {
        key.floats(&self.to_array());
    }
}

impl StructuralKey for Vec3 {
    fn append_key(&self, key: &mut Key) {
        key.floats(&self.to_array());
    }
}

impl StructuralKey for Vertex {
    fn append_key(&self, key: &mut Key) {
        self.position.append_key(key);
        self.normal.append_key(key);
        self.texture_coordinates.append_key(key);
    }
}

impl StructuralKey for Triangle {
    fn append_key(&self, key: &mut Key) {
        for vertex in self.vertices() {
            vertex.append_key(key);
        }
    }
}

impl StructuralKey for TriangleMesh {
    fn append_key(&self, key: &mut Key) {
        // length prefix keeps a mesh key from being a prefix of another entity's
        key.word(self.len() as u32);
        for triangle in self.triangles() {
            triangle.append_key(key);
        }
    }
}

impl StructuralKey for Plane {
    fn append_key(&self, key: &mut Key) {
        for point in [self.a, self.b, self.c, self.surface_normal] {
            point.append_key(key);
        }
    }
}

impl StructuralKey for Sphere {
    fn append_key(&self, key: &mut Key) {
        self.position.append_key(key);
        key.float(self.radius);
    }
}

impl StructuralKey for Terrain {
    fn append_key(&self, key: &mut Key) {
        key.floats(&[self.frequency, self.gain, self.minimum, self.maximum]);
        key.word(self.octaves);
    }
}

impl StructuralKey for Shape {
    fn append_key(&self, key: &mut Key) {
        key.tag(self.shape_type() as i32);
        match self {
            Shape::Plane(plane) => plane.append_key(key),
            Shape::Sphere(sphere) => sphere.append_key(key),
            Shape::Terrain(terrain) => terrain.append_key(key),
            Shape::Triangle(triangle) => triangle.append_key(key),
            Shape::TriangleMesh(mesh) => mesh.append_key(key),
        }
    }
}

// the compiled record is self-describing (type and size lead), so it is a
// complete and unambiguous description of the texture
impl StructuralKey for Texture {
    fn append_key(&self, key: &mut Key) {
        key.floats(&self.compile());
    }
}

impl StructuralKey for Surface {
    fn append_key(&self, key: &mut Key) {
        key.tag(self.material as i32);
        for texture in self.textures() {
            texture.append_key(key);
        }
        key.floats(&[self.noise_amount, self.noise_scale]);
    }
}

impl StructuralKey for Matrix4x4 {
    fn append_key(&self, key: &mut Key) {
        key.floats(&self.to_row_major());
    }
}

impl StructuralKey for Transform {
    fn append_key(&self, key: &mut Key) {
        self.object_to_world().append_key(key);
    }
}

impl StructuralKey for Primitive {
    fn append_key(&self, key: &mut Key) {
        self.shape.append_key(key);
        self.surface.append_key(key);
        self.transform.append_key(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_bits_decide_equality() {
        assert_eq!(Vec3(1.0, 2.0, 3.0).structural_key(), Vec3(1.0, 2.0, 3.0).structural_key());
        assert_ne!(Vec3(0.0, 0.0, 0.0).structural_key(), Vec3(-0.0, 0.0, 0.0).structural_key());
        assert_eq!(
            Vec2(f32::NAN, 1.0).structural_key(),
            Vec2(-f32::NAN, 1.0).structural_key()
        );
    }

    #[test]
    fn shape_kind_is_part_of_the_key() {
        let sphere = Shape::Sphere(Sphere::new(Vec3::zero(), 1.0));
        let other = Shape::Sphere(Sphere::new(Vec3::zero(), 2.0));
        assert_ne!(sphere.structural_key(), other.structural_key());

        let key = sphere.structural_key();
        assert_eq!(key.len(), 1 + 3 + 1);
    }

    #[test]
    fn textures_of_different_kinds_differ() {
        assert_ne!(
            Texture::UV.structural_key(),
            Texture::SurfaceNormal { tangent_space: false }.structural_key()
        );
        assert_eq!(Texture::black().structural_key(), Texture::constant(Vec3::zero()).structural_key());
    }
}
