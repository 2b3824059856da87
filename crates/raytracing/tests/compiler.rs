use std::collections::{HashSet, VecDeque};

use raytracing::{
    accel::flatten::{NODE_TYPE_LEAF, NODE_TYPE_TREE, NO_NEXT_NODE, RECORD_HEADER_LEN},
    compiler::{
        Category, CompileObserver, RecordingObserver, PLANE_RECORD_LEN, PRIMITIVE_RECORD_LEN, SPHERE_RECORD_LEN,
        SURFACE_RECORD_LEN, TERRAIN_RECORD_LEN, TRIANGLE_RECORD_LEN,
    },
    geometry::{ShapeType, Sphere, Transform, Vec3},
    materials::{Surface, Texture, TextureType},
    scene::{test_scenes, Camera, Primitive, Scene},
    CompileSettings, CompiledScene, SceneCompiler,
};

fn check_point(offset: i32, array: &[f32], stride: usize) {
    assert!(offset >= 0, "negative offset {offset}");
    let offset = offset as usize;
    assert_eq!(offset % stride, 0, "offset {offset} not aligned to {stride}");
    assert!(offset + stride <= array.len(), "offset {offset} out of bounds {}", array.len());
}

fn check_record(offset: i32, array_len: usize, stride: usize) {
    assert!(offset >= 0);
    let offset = offset as usize;
    assert_eq!(offset % stride, 0);
    assert!(offset + stride <= array_len);
}

fn check_bvh(compiled: &CompiledScene, root: i32) {
    let records = compiled.bounding_volume_hierarchies();
    let mut pending = VecDeque::from([root]);
    let mut seen = HashSet::new();

    while let Some(at) = pending.pop_front() {
        if at == NO_NEXT_NODE || !seen.insert(at) {
            continue;
        }
        assert!(at >= 0);
        let at = at as usize;
        assert!(at + RECORD_HEADER_LEN <= records.len());
        let record = &records[at..];

        check_point(record[2], compiled.point3fs(), 3);
        check_point(record[3], compiled.point3fs(), 3);
        pending.push_back(record[1]);

        match record[0] {
            NODE_TYPE_TREE => {
                assert_eq!(record[4] as usize, at + RECORD_HEADER_LEN);
                pending.push_back(record[4]);
            }
            NODE_TYPE_LEAF => {
                let count = record[4] as usize;
                for &triangle in &record[RECORD_HEADER_LEN..RECORD_HEADER_LEN + count] {
                    check_record(triangle, compiled.triangles().len(), TRIANGLE_RECORD_LEN);
                }
            }
            other => panic!("unknown node type {other} at {at}"),
        }
    }
}

/// Every offset stored in `compiled` points at the start of a record of the
/// array it refers to
fn check_offsets(compiled: &CompiledScene) {
    for plane in compiled.planes().chunks_exact(PLANE_RECORD_LEN) {
        for &point in &plane[..3] {
            check_point(point, compiled.point3fs(), 3);
        }
        check_point(plane[3], compiled.vector3fs(), 3);
    }

    for triangle in compiled.triangles().chunks_exact(TRIANGLE_RECORD_LEN) {
        for &position in &triangle[0..3] {
            check_point(position, compiled.point3fs(), 3);
        }
        for &normal in &triangle[3..6] {
            check_point(normal, compiled.vector3fs(), 3);
        }
        for &uv in &triangle[6..9] {
            check_point(uv, compiled.point2fs(), 2);
        }
    }

    for surface in compiled.surfaces().chunks_exact(SURFACE_RECORD_LEN) {
        assert!((1.0..=5.0).contains(&surface[0]));
        for &texture in &surface[1..4] {
            let offset = texture as usize;
            let texture_type = compiled.textures()[offset];
            let size = compiled.textures()[offset + 1] as usize;
            assert!((1.0..=5.0).contains(&texture_type));
            assert!(offset + size <= compiled.textures().len());
        }
    }

    let primitive_count = compiled.primitives().len() / PRIMITIVE_RECORD_LEN;
    assert_eq!(compiled.primitives_object_to_world().len(), primitive_count * 16);
    assert_eq!(compiled.primitives_world_to_object().len(), primitive_count * 16);

    for primitive in compiled.primitives().chunks_exact(PRIMITIVE_RECORD_LEN) {
        let shape = primitive[1];
        match primitive[0] {
            t if t == ShapeType::Plane as i32 => check_record(shape, compiled.planes().len(), PLANE_RECORD_LEN),
            t if t == ShapeType::Sphere as i32 => {
                check_record(shape, compiled.spheres().len(), SPHERE_RECORD_LEN);
                check_point(compiled.spheres()[shape as usize] as i32, compiled.point3fs(), 3);
            }
            t if t == ShapeType::Terrain as i32 => check_record(shape, compiled.terrains().len(), TERRAIN_RECORD_LEN),
            t if t == ShapeType::Triangle as i32 => {
                check_record(shape, compiled.triangles().len(), TRIANGLE_RECORD_LEN)
            }
            t if t == ShapeType::TriangleMesh as i32 => check_bvh(compiled, shape),
            other => panic!("unknown shape type {other}"),
        }
        check_record(primitive[2], compiled.surfaces().len(), SURFACE_RECORD_LEN);
    }

    if let Some(lights) = compiled.primitives_emitting_light() {
        for &light in lights {
            check_record(light, compiled.primitives().len(), PRIMITIVE_RECORD_LEN);
        }
    }
}

#[test]
fn all_test_scenes_compile() {
    for test_scene_descriptor in test_scenes::all_test_scenes() {
        let scene = (test_scene_descriptor.scene_func)();
        let compiled = SceneCompiler::default().compile(&scene).unwrap();

        assert_eq!(compiled.name(), test_scene_descriptor.name);
        assert_eq!(compiled.camera(), &scene.camera().to_array()[..]);
        if !scene.primitives().is_empty() {
            check_offsets(&compiled);
        }
    }
}

#[test]
fn offsets_stay_valid_with_small_leaves() {
    let compiler = SceneCompiler::new(CompileSettings {
        max_triangles_per_leaf: 1,
        ..Default::default()
    });
    for name in ["cube", "cornell_box", "duplicate_triangles"] {
        let scene = (test_scenes::find_test_scene(name).unwrap().scene_func)();
        check_offsets(&compiler.compile(&scene).unwrap());
    }
}

#[test]
fn compiling_twice_is_byte_identical() {
    let compiler = SceneCompiler::default();
    for test_scene_descriptor in test_scenes::all_test_scenes() {
        let scene = (test_scene_descriptor.scene_func)();
        let first = compiler.compile(&scene).unwrap().to_bytes().unwrap();
        let second = compiler.compile(&scene).unwrap().to_bytes().unwrap();
        assert_eq!(first, second, "{} differs between compiles", test_scene_descriptor.name);
    }
}

#[test]
fn shared_sphere_is_stored_once() {
    let mut scene = Scene::new("shared", Camera::default());
    let sphere = Sphere::new(Vec3(1.0, 2.0, 3.0), 0.75);
    let surface = Surface::lambertian(Texture::constant(Vec3(0.5, 0.5, 0.5)));
    for i in 0..8 {
        scene.add_primitive(Primitive::new(
            sphere,
            surface.clone(),
            Transform::translate(Vec3(0.0, i as f32, 0.0)),
        ));
    }

    let compiled = SceneCompiler::default().compile(&scene).unwrap();
    assert_eq!(compiled.spheres().len(), 2);
    assert_eq!(compiled.spheres()[1], 0.75);

    let position = compiled.spheres()[0] as usize;
    assert_eq!(&compiled.point3fs()[position..position + 3], &[1.0, 2.0, 3.0]);

    let records: Vec<&[i32]> = compiled.primitives().chunks_exact(PRIMITIVE_RECORD_LEN).collect();
    assert_eq!(records.len(), 8);
    assert!(records.iter().all(|record| record[1] == 0 && record[2] == 0));
}

#[test]
fn duplicate_triangles_share_a_record() {
    let mut recorder = RecordingObserver::default();
    let mut observers: [&mut dyn CompileObserver; 1] = [&mut recorder];
    let compiled = SceneCompiler::default()
        .compile_with_observers(&test_scenes::duplicate_triangles_scene(), &mut observers)
        .unwrap();

    let triangles = recorder.comparisons[0].count(Category::Triangles).unwrap();
    assert_eq!(triangles.all, 3);
    assert_eq!(triangles.unique, 2);
    assert_eq!(compiled.triangles().len(), 2 * TRIANGLE_RECORD_LEN);

    // three triangles fit one leaf
    let root = compiled.primitives()[1] as usize;
    let leaf = &compiled.bounding_volume_hierarchies()[root..];
    assert_eq!(leaf[0], NODE_TYPE_LEAF);
    assert_eq!(leaf[1], NO_NEXT_NODE);
    assert_eq!(leaf[4], 3);
    assert_eq!(&leaf[5..8], &[0, 0, 9]);
}

#[test]
fn duplicate_triangles_in_separate_leaves() {
    let compiled = SceneCompiler::new(CompileSettings {
        max_triangles_per_leaf: 1,
        ..Default::default()
    })
    .compile(&test_scenes::duplicate_triangles_scene())
    .unwrap();

    let records = compiled.bounding_volume_hierarchies();
    let mut leaf_triangles = Vec::new();
    let mut at = 0;
    while at < records.len() {
        match records[at] {
            NODE_TYPE_TREE => at += RECORD_HEADER_LEN,
            NODE_TYPE_LEAF => {
                let count = records[at + 4] as usize;
                leaf_triangles.extend_from_slice(&records[at + RECORD_HEADER_LEN..at + RECORD_HEADER_LEN + count]);
                at += RECORD_HEADER_LEN + count;
            }
            other => panic!("unknown node type {other}"),
        }
    }
    leaf_triangles.sort();
    assert_eq!(leaf_triangles, vec![0, 0, 9]);
}

#[test]
fn empty_scene_arrays_hold_one_placeholder() {
    let compiled = SceneCompiler::default().compile(&test_scenes::empty_scene()).unwrap();
    for (name, len) in compiled.array_lengths() {
        if name == "camera" {
            assert_eq!(len, 19);
        } else if name == "primitives_emitting_light" {
            assert_eq!(len, 0);
        } else {
            assert_eq!(len, 1, "{name} should be padded");
        }
    }
}

#[test]
fn light_array_lists_every_emissive_primitive() {
    let scene = test_scenes::terrain_scene();
    let compiled = SceneCompiler::default().compile(&scene).unwrap();
    let lights = compiled.primitives_emitting_light().unwrap();
    assert_eq!(lights.len(), 1);
    assert_eq!(compiled.primitives()[lights[0] as usize], ShapeType::Sphere as i32);

    let without = SceneCompiler::new(CompileSettings {
        light_emitting_primitives: false,
        ..Default::default()
    })
    .compile(&scene)
    .unwrap();
    assert!(without.primitives_emitting_light().is_none());
}

// colour channels of a compiled texture record, by texture type
fn emits_light(texture: &[f32]) -> bool {
    let size = texture[1] as usize;
    let channels = match texture[0] as i32 {
        t if t == TextureType::Constant as i32 => &texture[2..5],
        t if t == TextureType::Checkerboard as i32 => &texture[2..8],
        t if t == TextureType::Image as i32 => &texture[8..size],
        _ => &[][..],
    };
    channels.iter().any(|&channel| channel > 0.0)
}

#[test]
fn light_array_only_names_emissive_primitives() {
    for test_scene in test_scenes::all_test_scenes() {
        let compiled = SceneCompiler::default().compile(&(test_scene.scene_func)()).unwrap();
        let lights = compiled.primitives_emitting_light().unwrap();
        for &light in lights {
            check_record(light, compiled.primitives().len(), PRIMITIVE_RECORD_LEN);
            let record = &compiled.primitives()[light as usize..][..PRIMITIVE_RECORD_LEN];
            let surface = &compiled.surfaces()[record[2] as usize..][..SURFACE_RECORD_LEN];
            let emission = &compiled.textures()[surface[2] as usize..];
            assert!(
                emits_light(emission),
                "{}: light {light} is not emissive",
                test_scene.name
            );
        }
    }

    let compiled = SceneCompiler::default().compile(&test_scenes::spheres_scene()).unwrap();
    assert!(!compiled.primitives().is_empty());
    assert_eq!(compiled.primitives_emitting_light(), Some(&[][..]));
}
