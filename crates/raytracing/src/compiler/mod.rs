//! Scene compilation.
//!
//! A `Scene` is a graph of shared, possibly duplicated values. Compiling it
//! extracts every referenced entity, collapses structurally equal entities,
//! assigns each survivor an element offset in the array of its category and
//! emits flat arrays in which every cross reference is such an offset. Triangle
//! meshes are compiled to stackless BVH records (see `accel::flatten`).

use std::fmt;
use std::time::Instant;

use crate::accel::flatten::{flatten, flattened_len};
use crate::compiled::CompiledScene;
use crate::error::CompileError;
use crate::geometry::Shape;
use crate::scene::Scene;
use crate::settings::CompileSettings;

mod dedup;
mod extract;
mod keys;
mod observer;

pub use dedup::{distinct, OffsetTable, MAX_FLOAT_OFFSET};
pub use extract::{Extraction, MeshHierarchy};
pub use keys::{Key, StructuralKey};
pub use observer::{
    CategoryCount, CompileObserver, CompileReport, ComparisonReport, RecordingObserver, TracingObserver,
};

pub const PLANE_RECORD_LEN: usize = 4;
pub const SPHERE_RECORD_LEN: usize = 2;
pub const TERRAIN_RECORD_LEN: usize = 5;
pub const TRIANGLE_RECORD_LEN: usize = 9;
pub const PRIMITIVE_RECORD_LEN: usize = 3;
pub const SURFACE_RECORD_LEN: usize = 6;
pub const POINT2_RECORD_LEN: usize = 2;
pub const POINT3_RECORD_LEN: usize = 3;
pub const VECTOR3_RECORD_LEN: usize = 3;
pub const TRANSFORM_RECORD_LEN: usize = 16;

/// Kinds of entity the compiler deduplicates, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    BoundingVolumeHierarchies,
    Planes,
    Spheres,
    Terrains,
    Triangles,
    TriangleMeshes,
    Surfaces,
    Textures,
    Point2Fs,
    Point3Fs,
    Vector3Fs,
    Primitives,
    PrimitivesEmittingLight,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::BoundingVolumeHierarchies,
        Category::Planes,
        Category::Spheres,
        Category::Terrains,
        Category::Triangles,
        Category::TriangleMeshes,
        Category::Surfaces,
        Category::Textures,
        Category::Point2Fs,
        Category::Point3Fs,
        Category::Vector3Fs,
        Category::Primitives,
        Category::PrimitivesEmittingLight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::BoundingVolumeHierarchies => "bounding_volume_hierarchies",
            Category::Planes => "planes",
            Category::Spheres => "spheres",
            Category::Terrains => "terrains",
            Category::Triangles => "triangles",
            Category::TriangleMeshes => "triangle_meshes",
            Category::Surfaces => "surfaces",
            Category::Textures => "textures",
            Category::Point2Fs => "point2fs",
            Category::Point3Fs => "point3fs",
            Category::Vector3Fs => "vector3fs",
            Category::Primitives => "primitives",
            Category::PrimitivesEmittingLight => "primitives_emitting_light",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Offsets of every distinct entity, per category
struct OffsetTables {
    bounding_volume_hierarchies: OffsetTable,
    planes: OffsetTable,
    spheres: OffsetTable,
    terrains: OffsetTable,
    triangles: OffsetTable,
    surfaces: OffsetTable,
    textures: OffsetTable,
    point2fs: OffsetTable,
    point3fs: OffsetTable,
    vector3fs: OffsetTable,
    primitives: OffsetTable,
}

impl OffsetTables {
    fn build(unique: &Extraction) -> Result<OffsetTables, CompileError> {
        Ok(OffsetTables {
            bounding_volume_hierarchies: OffsetTable::with_sizes(
                Category::BoundingVolumeHierarchies,
                unique
                    .bounding_volume_hierarchies
                    .iter()
                    .map(|hierarchy| (&hierarchy.mesh, flattened_len(&hierarchy.bvh))),
            )?,
            planes: OffsetTable::with_fixed_size(Category::Planes, &unique.planes, PLANE_RECORD_LEN)?,
            spheres: OffsetTable::with_fixed_size(Category::Spheres, &unique.spheres, SPHERE_RECORD_LEN)?,
            terrains: OffsetTable::with_fixed_size(Category::Terrains, &unique.terrains, TERRAIN_RECORD_LEN)?,
            triangles: OffsetTable::with_fixed_size(Category::Triangles, &unique.triangles, TRIANGLE_RECORD_LEN)?,
            surfaces: OffsetTable::with_fixed_size(Category::Surfaces, &unique.surfaces, SURFACE_RECORD_LEN)?,
            textures: OffsetTable::with_sizes(
                Category::Textures,
                unique.textures.iter().map(|texture| (texture, texture.size())),
            )?,
            point2fs: OffsetTable::with_fixed_size(Category::Point2Fs, &unique.point2fs, POINT2_RECORD_LEN)?,
            point3fs: OffsetTable::with_fixed_size(Category::Point3Fs, &unique.point3fs, POINT3_RECORD_LEN)?,
            vector3fs: OffsetTable::with_fixed_size(Category::Vector3Fs, &unique.vector3fs, VECTOR3_RECORD_LEN)?,
            primitives: OffsetTable::with_fixed_size(Category::Primitives, &unique.primitives, PRIMITIVE_RECORD_LEN)?,
        })
    }
}

/// Turns a `Scene` into a `CompiledScene`.
///
/// The compiler holds only its settings, so one instance can compile any
/// number of scenes; compiling the same scene twice gives identical output.
#[derive(Debug, Clone, Default)]
pub struct SceneCompiler {
    settings: CompileSettings,
}

impl SceneCompiler {
    pub fn new(settings: CompileSettings) -> SceneCompiler {
        SceneCompiler { settings }
    }

    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    pub fn compile(&self, scene: &Scene) -> Result<CompiledScene, CompileError> {
        self.compile_with_observers(scene, &mut [])
    }

    pub fn compile_with_observers(
        &self,
        scene: &Scene,
        observers: &mut [&mut dyn CompileObserver],
    ) -> Result<CompiledScene, CompileError> {
        let start = Instant::now();
        for observer in observers.iter_mut() {
            observer.on_compile_start(scene.name());
        }

        let all = Extraction::from_scene(scene, self.settings.max_triangles_per_leaf);
        let unique = all.deduplicated();
        let counts = category_counts(&all, &unique);

        let comparison = ComparisonReport {
            scene_name: scene.name().to_owned(),
            counts: counts.clone(),
            elapsed: start.elapsed(),
        };
        for observer in observers.iter_mut() {
            observer.on_compare(&comparison);
        }

        let tables = OffsetTables::build(&unique)?;
        let (object_to_world, world_to_object) = compile_transforms(&unique)?;
        // every entry is a valid primitive offset, so this one is never padded
        let primitives_emitting_light = if self.settings.light_emitting_primitives {
            Some(compile_primitives_emitting_light(&unique, &tables)?)
        } else {
            None
        };

        let compiled = CompiledScene {
            name: scene.name().to_owned(),
            point2fs: self.pad(compile_point2fs(&unique)),
            point3fs: self.pad(compile_point3fs(&unique)),
            vector3fs: self.pad(compile_vector3fs(&unique)),
            planes: self.pad(compile_planes(&unique, &tables)?),
            spheres: self.pad(compile_spheres(&unique, &tables)?),
            terrains: self.pad(compile_terrains(&unique)),
            triangles: self.pad(compile_triangles(&unique, &tables)?),
            bounding_volume_hierarchies: self.pad(compile_bounding_volume_hierarchies(&unique, &tables)?),
            textures: self.pad(compile_textures(&unique)),
            surfaces: self.pad(compile_surfaces(&unique, &tables)?),
            primitives: self.pad(compile_primitives(&unique, &tables)?),
            primitives_object_to_world: self.pad(object_to_world),
            primitives_world_to_object: self.pad(world_to_object),
            camera: scene.camera().to_array().to_vec(),
            primitives_emitting_light,
        };

        let report = CompileReport {
            scene_name: scene.name().to_owned(),
            counts,
            array_lengths: compiled.array_lengths(),
            elapsed: start.elapsed(),
        };
        for observer in observers.iter_mut() {
            observer.on_compile_end(&report);
        }

        Ok(compiled)
    }

    fn pad<T: Default>(&self, mut array: Vec<T>) -> Vec<T> {
        if self.settings.pad_empty_arrays && array.is_empty() {
            array.push(T::default());
        }
        array
    }
}

fn category_counts(all: &Extraction, unique: &Extraction) -> Vec<CategoryCount> {
    let lens = |extraction: &Extraction, category: Category| match category {
        Category::BoundingVolumeHierarchies => extraction.bounding_volume_hierarchies.len(),
        Category::Planes => extraction.planes.len(),
        Category::Spheres => extraction.spheres.len(),
        Category::Terrains => extraction.terrains.len(),
        Category::Triangles => extraction.triangles.len(),
        Category::TriangleMeshes => extraction.triangle_meshes.len(),
        Category::Surfaces => extraction.surfaces.len(),
        Category::Textures => extraction.textures.len(),
        Category::Point2Fs => extraction.point2fs.len(),
        Category::Point3Fs => extraction.point3fs.len(),
        Category::Vector3Fs => extraction.vector3fs.len(),
        Category::Primitives => extraction.primitives.len(),
        Category::PrimitivesEmittingLight => extraction.primitives_emitting_light.len(),
    };

    Category::ALL
        .iter()
        .map(|&category| CategoryCount {
            category,
            all: lens(all, category),
            unique: lens(unique, category),
        })
        .collect()
}

fn compile_point2fs(unique: &Extraction) -> Vec<f32> {
    unique.point2fs.iter().flat_map(|point| point.to_array()).collect()
}

fn compile_point3fs(unique: &Extraction) -> Vec<f32> {
    unique.point3fs.iter().flat_map(|point| point.to_array()).collect()
}

fn compile_vector3fs(unique: &Extraction) -> Vec<f32> {
    unique.vector3fs.iter().flat_map(|vector| vector.to_array()).collect()
}

fn compile_planes(unique: &Extraction, tables: &OffsetTables) -> Result<Vec<i32>, CompileError> {
    let mut planes = Vec::with_capacity(unique.planes.len() * PLANE_RECORD_LEN);
    for plane in &unique.planes {
        planes.extend_from_slice(&[
            tables.point3fs.offset_of(&plane.a)?,
            tables.point3fs.offset_of(&plane.b)?,
            tables.point3fs.offset_of(&plane.c)?,
            tables.vector3fs.offset_of(&plane.surface_normal)?,
        ]);
    }
    Ok(planes)
}

fn compile_spheres(unique: &Extraction, tables: &OffsetTables) -> Result<Vec<f32>, CompileError> {
    let mut spheres = Vec::with_capacity(unique.spheres.len() * SPHERE_RECORD_LEN);
    for sphere in &unique.spheres {
        let position = tables.point3fs.float_offset_of(&sphere.position)?;
        spheres.extend_from_slice(&[position, sphere.radius]);
    }
    Ok(spheres)
}

fn compile_terrains(unique: &Extraction) -> Vec<f32> {
    unique
        .terrains
        .iter()
        .flat_map(|terrain| {
            [
                terrain.frequency,
                terrain.gain,
                terrain.minimum,
                terrain.maximum,
                terrain.octaves as f32,
            ]
        })
        .collect()
}

fn compile_triangles(unique: &Extraction, tables: &OffsetTables) -> Result<Vec<i32>, CompileError> {
    let mut triangles = Vec::with_capacity(unique.triangles.len() * TRIANGLE_RECORD_LEN);
    for triangle in &unique.triangles {
        let vertices = triangle.vertices();
        for vertex in &vertices {
            triangles.push(tables.point3fs.offset_of(&vertex.position)?);
        }
        for vertex in &vertices {
            triangles.push(tables.vector3fs.offset_of(&vertex.normal)?);
        }
        for vertex in &vertices {
            triangles.push(tables.point2fs.offset_of(&vertex.texture_coordinates)?);
        }
    }
    Ok(triangles)
}

fn compile_bounding_volume_hierarchies(unique: &Extraction, tables: &OffsetTables) -> Result<Vec<i32>, CompileError> {
    let mut records = Vec::with_capacity(tables.bounding_volume_hierarchies.len());
    for hierarchy in &unique.bounding_volume_hierarchies {
        let base = tables.bounding_volume_hierarchies.offset_of(&hierarchy.mesh)? as usize;
        debug_assert_eq!(base, records.len());
        let flattened = flatten(
            &hierarchy.bvh,
            base,
            |point| tables.point3fs.offset_of(&point),
            |triangle| tables.triangles.offset_of(triangle),
        )?;
        records.extend(flattened);
    }
    Ok(records)
}

fn compile_textures(unique: &Extraction) -> Vec<f32> {
    unique.textures.iter().flat_map(|texture| texture.compile()).collect()
}

fn compile_surfaces(unique: &Extraction, tables: &OffsetTables) -> Result<Vec<f32>, CompileError> {
    let mut surfaces = Vec::with_capacity(unique.surfaces.len() * SURFACE_RECORD_LEN);
    for surface in &unique.surfaces {
        surfaces.extend_from_slice(&[
            surface.material as i32 as f32,
            tables.textures.float_offset_of(&surface.albedo)?,
            tables.textures.float_offset_of(&surface.emission)?,
            tables.textures.float_offset_of(&surface.normal)?,
            surface.noise_amount,
            surface.noise_scale,
        ]);
    }
    Ok(surfaces)
}

fn compile_primitives(unique: &Extraction, tables: &OffsetTables) -> Result<Vec<i32>, CompileError> {
    let mut primitives = Vec::with_capacity(unique.primitives.len() * PRIMITIVE_RECORD_LEN);
    for primitive in &unique.primitives {
        let shape_offset = match &primitive.shape {
            Shape::Plane(plane) => tables.planes.offset_of(plane)?,
            Shape::Sphere(sphere) => tables.spheres.offset_of(sphere)?,
            Shape::Terrain(terrain) => tables.terrains.offset_of(terrain)?,
            Shape::Triangle(triangle) => tables.triangles.offset_of(triangle)?,
            // meshes are reached through the root record of their hierarchy
            Shape::TriangleMesh(mesh) => tables.bounding_volume_hierarchies.offset_of(mesh)?,
        };
        primitives.extend_from_slice(&[
            primitive.shape.shape_type() as i32,
            shape_offset,
            tables.surfaces.offset_of(&primitive.surface)?,
        ]);
    }
    Ok(primitives)
}

/// Row-major object-to-world and world-to-object matrices, one of each per
/// compiled primitive record
fn compile_transforms(unique: &Extraction) -> Result<(Vec<f32>, Vec<f32>), CompileError> {
    let mut object_to_world = Vec::with_capacity(unique.primitives.len() * TRANSFORM_RECORD_LEN);
    let mut world_to_object = Vec::with_capacity(unique.primitives.len() * TRANSFORM_RECORD_LEN);
    for (index, primitive) in unique.primitives.iter().enumerate() {
        let inverse = primitive
            .transform
            .world_to_object()
            .ok_or(CompileError::SingularTransform { primitive: index })?;
        object_to_world.extend_from_slice(&primitive.transform.object_to_world().to_row_major());
        world_to_object.extend_from_slice(&inverse.to_row_major());
    }
    Ok((object_to_world, world_to_object))
}

fn compile_primitives_emitting_light(unique: &Extraction, tables: &OffsetTables) -> Result<Vec<i32>, CompileError> {
    unique
        .primitives_emitting_light
        .iter()
        .map(|primitive| tables.primitives.offset_of(primitive))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Matrix4x4, Sphere, Transform, Vec3};
    use crate::materials::{Surface, Texture};
    use crate::scene::test_scenes::{cornell_box_scene, duplicate_triangles_scene, empty_scene, spheres_scene};
    use crate::scene::{Camera, Primitive};

    #[test]
    fn category_names() {
        assert_eq!(Category::Point3Fs.to_string(), "point3fs");
        assert_eq!(Category::ALL.len(), 13);
        assert_eq!(Category::ALL[0], Category::BoundingVolumeHierarchies);
    }

    #[test]
    fn spheres_share_one_record() {
        let compiled = SceneCompiler::default().compile(&spheres_scene()).unwrap();
        assert_eq!(compiled.spheres().len(), SPHERE_RECORD_LEN);

        let sphere_offsets: Vec<i32> = compiled
            .primitives()
            .chunks(PRIMITIVE_RECORD_LEN)
            .filter(|record| record[0] == crate::geometry::ShapeType::Sphere as i32)
            .map(|record| record[1])
            .collect();
        assert_eq!(sphere_offsets, vec![0; 5]);
    }

    #[test]
    fn empty_scene_is_padded() {
        let compiled = SceneCompiler::default().compile(&empty_scene()).unwrap();
        assert_eq!(compiled.point3fs(), &[0.0]);
        assert_eq!(compiled.primitives(), &[0]);
        assert_eq!(compiled.bounding_volume_hierarchies(), &[0]);
        assert_eq!(compiled.camera().len(), 19);
        assert_eq!(compiled.primitives_emitting_light(), Some(&[][..]));

        let unpadded = SceneCompiler::new(CompileSettings {
            pad_empty_arrays: false,
            light_emitting_primitives: false,
            ..Default::default()
        })
        .compile(&empty_scene())
        .unwrap();
        assert!(unpadded.point3fs().is_empty());
        assert!(unpadded.primitives_emitting_light().is_none());
    }

    #[test]
    fn observers_see_counts() {
        let mut recorder = RecordingObserver::default();
        let mut tracing_observer = TracingObserver;
        let mut observers: [&mut dyn CompileObserver; 2] = [&mut recorder, &mut tracing_observer];
        SceneCompiler::default()
            .compile_with_observers(&duplicate_triangles_scene(), &mut observers)
            .unwrap();

        assert_eq!(recorder.started, vec!["duplicate_triangles".to_owned()]);
        let triangles = recorder.comparisons[0].count(Category::Triangles).unwrap();
        assert_eq!((triangles.all, triangles.unique), (3, 2));
        assert_eq!(recorder.compiles.len(), 1);
        assert_eq!(recorder.compiles[0].count(Category::TriangleMeshes).unwrap().unique, 1);
    }

    #[test]
    fn singular_transform_is_reported() {
        let mut scene = Scene::new("singular", Camera::default());
        let surface = Surface::lambertian(Texture::constant(Vec3(1.0, 1.0, 1.0)));
        scene.add_primitive(Primitive::untransformed(Sphere::new(Vec3::zero(), 1.0), surface.clone()));
        scene.add_primitive(Primitive::new(
            Sphere::new(Vec3::zero(), 1.0),
            surface,
            Transform::from(Matrix4x4::scale(Vec3(1.0, 0.0, 1.0))),
        ));

        let result = SceneCompiler::default().compile(&scene);
        assert_eq!(result.err(), Some(CompileError::SingularTransform { primitive: 1 }));
    }

    #[test]
    fn scene_without_emission_has_no_lights() {
        let compiled = SceneCompiler::default().compile(&spheres_scene()).unwrap();
        assert!(!compiled.primitives().is_empty());
        assert_eq!(compiled.primitives_emitting_light(), Some(&[][..]));
    }

    #[test]
    fn lights_point_at_emissive_primitives() {
        let compiled = SceneCompiler::default().compile(&cornell_box_scene()).unwrap();
        let lights = compiled.primitives_emitting_light().unwrap();
        assert_eq!(lights.len(), 1);

        let record = &compiled.primitives()[lights[0] as usize..][..PRIMITIVE_RECORD_LEN];
        let surface = &compiled.surfaces()[record[2] as usize..][..SURFACE_RECORD_LEN];
        let emission = &compiled.textures()[surface[2] as usize..];
        assert_eq!(&emission[..5], &[1.0, 5.0, 15.0, 15.0, 15.0]);
    }
}
