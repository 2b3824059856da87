//! Output of `SceneCompiler`: flat arrays cross-referenced by element offsets.
//!
//! Every record is found by offset alone; see the record length constants in
//! `compiler` and the layouts documented on `accel::flatten`,
//! `materials::Texture` and `scene::Camera::to_array`.

mod io;

pub use io::{read_f32_array, read_i32_array, read_utf, write_f32_array, write_i32_array, write_utf};

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScene {
    pub(crate) name: String,
    pub(crate) point2fs: Vec<f32>,
    pub(crate) point3fs: Vec<f32>,
    pub(crate) vector3fs: Vec<f32>,
    pub(crate) planes: Vec<i32>,
    pub(crate) spheres: Vec<f32>,
    pub(crate) terrains: Vec<f32>,
    pub(crate) triangles: Vec<i32>,
    pub(crate) bounding_volume_hierarchies: Vec<i32>,
    pub(crate) textures: Vec<f32>,
    pub(crate) surfaces: Vec<f32>,
    pub(crate) primitives: Vec<i32>,
    pub(crate) primitives_object_to_world: Vec<f32>,
    pub(crate) primitives_world_to_object: Vec<f32>,
    pub(crate) camera: Vec<f32>,
    pub(crate) primitives_emitting_light: Option<Vec<i32>>,
}

impl CompiledScene {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn point2fs(&self) -> &[f32] {
        &self.point2fs
    }

    pub fn point3fs(&self) -> &[f32] {
        &self.point3fs
    }

    pub fn vector3fs(&self) -> &[f32] {
        &self.vector3fs
    }

    pub fn planes(&self) -> &[i32] {
        &self.planes
    }

    pub fn spheres(&self) -> &[f32] {
        &self.spheres
    }

    pub fn terrains(&self) -> &[f32] {
        &self.terrains
    }

    pub fn triangles(&self) -> &[i32] {
        &self.triangles
    }

    pub fn bounding_volume_hierarchies(&self) -> &[i32] {
        &self.bounding_volume_hierarchies
    }

    pub fn textures(&self) -> &[f32] {
        &self.textures
    }

    pub fn surfaces(&self) -> &[f32] {
        &self.surfaces
    }

    pub fn primitives(&self) -> &[i32] {
        &self.primitives
    }

    pub fn primitives_object_to_world(&self) -> &[f32] {
        &self.primitives_object_to_world
    }

    pub fn primitives_world_to_object(&self) -> &[f32] {
        &self.primitives_world_to_object
    }

    pub fn camera(&self) -> &[f32] {
        &self.camera
    }

    /// Offsets into `primitives` of every primitive with an emissive surface.
    /// `None` when the scene was compiled without this array.
    pub fn primitives_emitting_light(&self) -> Option<&[i32]> {
        self.primitives_emitting_light.as_deref()
    }

    /// Name and element count of every array, in serialization order
    pub fn array_lengths(&self) -> Vec<(&'static str, usize)> {
        let mut lengths = vec![
            ("point2fs", self.point2fs.len()),
            ("point3fs", self.point3fs.len()),
            ("vector3fs", self.vector3fs.len()),
            ("planes", self.planes.len()),
            ("spheres", self.spheres.len()),
            ("terrains", self.terrains.len()),
            ("triangles", self.triangles.len()),
            ("bounding_volume_hierarchies", self.bounding_volume_hierarchies.len()),
            ("textures", self.textures.len()),
            ("surfaces", self.surfaces.len()),
            ("primitives", self.primitives.len()),
            ("primitives_object_to_world", self.primitives_object_to_world.len()),
            ("primitives_world_to_object", self.primitives_world_to_object.len()),
            ("camera", self.camera.len()),
        ];
        if let Some(lights) = &self.primitives_emitting_light {
            lengths.push(("primitives_emitting_light", lights.len()));
        }
        lengths
    }
}
