//! Primitives are the basic unit of rendering, a convention adopted from PBRT.
//! Each one binds a shape to the surface it is shaded with and places it in
//! the world through a transform.
//!
//! - Individual triangles may be primitives, but the expected unit is an
//! entire triangle mesh sharing one surface
//! - Several primitives may hold the same mesh (instancing); the mesh storage
//! is shared and compiled only once

use crate::geometry::{Shape, Transform};
use crate::materials::Surface;

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub surface: Surface,
    pub transform: Transform,
}

impl Primitive {
    pub fn new(shape: impl Into<Shape>, surface: Surface, transform: Transform) -> Primitive {
        Primitive { shape: shape.into(), surface, transform }
    }

    /// Primitive placed in the world without any transformation
    pub fn untransformed(shape: impl Into<Shape>, surface: Surface) -> Primitive {
        Primitive::new(shape, surface, Transform::identity())
    }

    pub fn is_emissive(&self) -> bool {
        self.surface.is_emissive()
    }
}
