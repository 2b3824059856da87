//! The closed set of shapes a primitive may reference.
//!
//! Shapes are stored in object space; placement in the world is the job of the
//! owning primitive's transform.

use crate::geometry::Vec3;

pub mod mesh;

pub use mesh::{Triangle, TriangleMesh, Vertex};

/// Tag written as the first element of a compiled primitive record.
/// It selects which compiled array the primitive's shape offset points into.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Plane = 1,
    Sphere = 2,
    Terrain = 3,
    Triangle = 4,
    TriangleMesh = 5,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Plane(Plane),
    Sphere(Sphere),
    Terrain(Terrain),
    Triangle(Triangle),
    TriangleMesh(TriangleMesh),
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Plane(_) => ShapeType::Plane,
            Shape::Sphere(_) => ShapeType::Sphere,
            Shape::Terrain(_) => ShapeType::Terrain,
            Shape::Triangle(_) => ShapeType::Triangle,
            Shape::TriangleMesh(_) => ShapeType::TriangleMesh,
        }
    }
}

/// Infinite plane through three points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub surface_normal: Vec3,
}

impl Plane {
    /// Normal follows the counterclockwise winding of a, b, c
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Plane {
        let surface_normal = Vec3::normalized(Vec3::cross(b - a, c - a));
        Plane { a, b, c, surface_normal }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub position: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(position: Vec3, radius: f32) -> Sphere {
        Sphere { position, radius }
    }
}

/// Procedural heightfield driven by fractional Brownian motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terrain {
    pub frequency: f32,
    pub gain: f32,
    pub minimum: f32,
    pub maximum: f32,
    pub octaves: u32,
}

impl From<Plane> for Shape {
    fn from(value: Plane) -> Self {
        Shape::Plane(value)
    }
}

impl From<Sphere> for Shape {
    fn from(value: Sphere) -> Self {
        Shape::Sphere(value)
    }
}

impl From<Terrain> for Shape {
    fn from(value: Terrain) -> Self {
        Shape::Terrain(value)
    }
}

impl From<Triangle> for Shape {
    fn from(value: Triangle) -> Self {
        Shape::Triangle(value)
    }
}

impl From<TriangleMesh> for Shape {
    fn from(value: TriangleMesh) -> Self {
        Shape::TriangleMesh(value)
    }
}
