use raytracing::{scene::test_scenes, CompileSettings, CompiledScene, CompiledSceneError, SceneCompiler};

#[test]
fn every_test_scene_survives_disk() {
    let dir = tempfile::tempdir().unwrap();

    for test_scene_descriptor in test_scenes::all_test_scenes() {
        let scene = (test_scene_descriptor.scene_func)();
        let compiled = SceneCompiler::default().compile(&scene).unwrap();

        let path = dir.path().join(format!("{}.scene", test_scene_descriptor.name));
        compiled.write_to_path(&path).unwrap();
        let read = CompiledScene::read_from_path(&path).unwrap();

        assert_eq!(read, compiled, "{} changed on disk", test_scene_descriptor.name);
        assert_eq!(read.to_bytes().unwrap(), compiled.to_bytes().unwrap());
    }
}

#[test]
fn scene_without_light_array_round_trips() {
    let compiled = SceneCompiler::new(CompileSettings {
        light_emitting_primitives: false,
        ..Default::default()
    })
    .compile(&test_scenes::cornell_box_scene())
    .unwrap();

    let bytes = compiled.to_bytes().unwrap();
    let read = CompiledScene::read(&mut bytes.as_slice()).unwrap();
    assert!(read.primitives_emitting_light().is_none());
    assert_eq!(read, compiled);
}

#[test]
fn light_array_is_the_trailing_section() {
    let scene = test_scenes::cornell_box_scene();
    let with_lights = SceneCompiler::default().compile(&scene).unwrap().to_bytes().unwrap();
    let without_lights = SceneCompiler::new(CompileSettings {
        light_emitting_primitives: false,
        ..Default::default()
    })
    .compile(&scene)
    .unwrap()
    .to_bytes()
    .unwrap();

    // one light: an i32 length and a single i32 offset
    assert_eq!(with_lights.len(), without_lights.len() + 8);
    assert_eq!(&with_lights[..without_lights.len()], &without_lights[..]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = CompiledScene::read_from_path(dir.path().join("does_not_exist.scene"));
    assert!(matches!(result, Err(CompiledSceneError::Io(_))));
}
