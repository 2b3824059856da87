//! Builtin scenes used as fixtures by the compiler tests and by `raytracing-cli compile`.
//!
//! Each one exercises a different part of the compiler: shared instances,
//! duplicated geometry, meshes large enough to need a real BVH, emissive
//! surfaces and every shape kind.

use crate::{
    geometry::{Plane, Sphere, Terrain, Transform, Triangle, TriangleMesh, Vec2, Vec3, Vec3u, Vertex},
    materials::{ImageTexture, Material, Surface, Texture},
    scene::{Camera, Lens, Primitive, Scene},
};

// (normal, tangent u, tangent v) of each cube face, vertices are laid out
// counterclockwise seen from outside
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3(1.0, 0.0, 0.0), Vec3(0.0, 0.0, -1.0), Vec3(0.0, 1.0, 0.0)),
    (Vec3(-1.0, 0.0, 0.0), Vec3(0.0, 0.0, 1.0), Vec3(0.0, 1.0, 0.0)),
    (Vec3(0.0, 1.0, 0.0), Vec3(1.0, 0.0, 0.0), Vec3(0.0, 0.0, -1.0)),
    (Vec3(0.0, -1.0, 0.0), Vec3(1.0, 0.0, 0.0), Vec3(0.0, 0.0, 1.0)),
    (Vec3(0.0, 0.0, 1.0), Vec3(1.0, 0.0, 0.0), Vec3(0.0, 1.0, 0.0)),
    (Vec3(0.0, 0.0, -1.0), Vec3(-1.0, 0.0, 0.0), Vec3(0.0, 1.0, 0.0)),
];

/// Axis-aligned cube centered on the origin, 12 triangles with flat normals.
/// `subdivisions` splits every face into a grid of quads, which gives the BVH
/// builder more to do.
pub fn make_cube(side_length: f32, subdivisions: u32) -> TriangleMesh {
    let h = side_length / 2.0;
    let n = subdivisions.max(1);
    let step = side_length / n as f32;

    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut tris = Vec::new();

    for (normal, tangent_u, tangent_v) in CUBE_FACES {
        let origin = normal * h - tangent_u * h - tangent_v * h;
        let base = vertices.len() as u32;
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(origin + tangent_u * (step * i as f32) + tangent_v * (step * j as f32));
                normals.push(normal);
                uvs.push(Vec2(i as f32 / n as f32, j as f32 / n as f32));
            }
        }
        let row = n + 1;
        for j in 0..n {
            for i in 0..n {
                let corner = base + j * row + i;
                tris.push(Vec3u(corner, corner + 1, corner + row + 1));
                tris.push(Vec3u(corner, corner + row + 1, corner + row));
            }
        }
    }

    TriangleMesh::from_indexed(&vertices, &normals, &uvs, &tris)
}

fn white_lambertian() -> Surface {
    Surface::lambertian(Texture::constant(Vec3(0.8, 0.8, 0.8)))
}

pub fn empty_scene() -> Scene {
    Scene::new("empty", Camera::default())
}

// five primitives sharing a single sphere, placed by their transforms
pub fn spheres_scene() -> Scene {
    let camera = Camera::lookat_camera(
        Vec3(0.0, 1.0, 6.0),
        Vec3::zero(),
        Vec3(0.0, 1.0, 0.0),
        (60.0_f32).to_radians(),
        640,
        360,
    );
    let mut scene = Scene::new("spheres", camera);

    let sphere = Sphere::new(Vec3::zero(), 0.5);
    let red = Surface::lambertian(Texture::constant(Vec3(0.7, 0.1, 0.1)));
    for i in 0..5 {
        let x = (i as f32 - 2.0) * 1.25;
        scene.add_primitive(Primitive::new(sphere, red.clone(), Transform::translate(Vec3(x, 0.0, 0.0))));
    }

    let ground = Plane::new(Vec3(0.0, -0.5, 0.0), Vec3(1.0, -0.5, 0.0), Vec3(0.0, -0.5, -1.0));
    scene.add_primitive(Primitive::untransformed(ground, white_lambertian()));

    scene
}

// one mesh of three triangles, two of which are identical
pub fn duplicate_triangles_scene() -> Scene {
    let n = Vec3(0.0, 0.0, 1.0);
    let triangle = |x: f32| {
        Triangle::new(
            Vertex::new(Vec3(x, 0.0, 0.0), n, Vec2(0.0, 0.0)),
            Vertex::new(Vec3(x + 1.0, 0.0, 0.0), n, Vec2(1.0, 0.0)),
            Vertex::new(Vec3(x, 1.0, 0.0), n, Vec2(0.0, 1.0)),
        )
    };
    let mesh = TriangleMesh::new(vec![triangle(0.0), triangle(0.0), triangle(2.0)]);

    let camera = Camera::lookat_camera(
        Vec3(1.5, 0.5, 4.0),
        Vec3(1.5, 0.5, 0.0),
        Vec3(0.0, 1.0, 0.0),
        (45.0_f32).to_radians(),
        400,
        400,
    );
    let mut scene = Scene::new("duplicate_triangles", camera);
    scene.add_primitive(Primitive::untransformed(mesh, white_lambertian()));
    scene
}

// two instances of one subdivided cube
pub fn cube_scene() -> Scene {
    let camera = Camera::lookat_camera(
        Vec3(1.0, 0.75, -1.0),
        Vec3(0.0, 0.0, -3.0),
        Vec3(0.0, 1.0, 0.0),
        (45.0_f32).to_radians(),
        400,
        400,
    );
    let mut scene = Scene::new("cube", camera);

    let cube = make_cube(1.0, 3);
    let checker = Surface::lambertian(Texture::checkerboard(
        Vec3(0.9, 0.9, 0.9),
        Vec3(0.1, 0.1, 0.1),
        4.0,
        4.0,
    ));

    scene.add_primitive(Primitive::new(cube.clone(), checker.clone(), Transform::translate(Vec3(0.0, 0.0, -3.0))));
    scene.add_primitive(Primitive::new(
        cube,
        checker,
        Transform::rotate((30.0_f32).to_radians(), Vec3(0.0, 1.0, 0.0)).compose(Transform::translate(Vec3(
            1.5, 0.0, -4.0,
        ))),
    ));

    scene
}

#[rustfmt::skip]
pub fn cornell_box_scene() -> Scene {
    // Dimensions: width=2, height=2, depth=2, y-up, open towards +z
    let (left, right) = (-1.0, 1.0);
    let (bottom, top) = (0.0, 2.0);
    let back = -1.0;

    let camera = Camera::lookat_camera(
        Vec3(0.0, 1.0, 3.4),
        Vec3(0.0, 1.0, 0.0),
        Vec3(0.0, 1.0, 0.0),
        (40.0_f32).to_radians(),
        500,
        500,
    )
    .with_aperture(0.02, 3.4);
    let mut scene = Scene::new("cornell_box", camera);

    let white = white_lambertian();
    let red   = Surface::lambertian(Texture::constant(Vec3(0.6, 0.1, 0.1)));
    let green = Surface::lambertian(Texture::constant(Vec3(0.1, 0.6, 0.1)));

    // normals point into the box
    let floor      = Plane::new(Vec3(0.0, bottom, 0.0), Vec3(0.0, bottom, 1.0), Vec3(1.0, bottom, 0.0));
    let ceiling    = Plane::new(Vec3(0.0, top, 0.0), Vec3(1.0, top, 0.0), Vec3(0.0, top, 1.0));
    let back_wall  = Plane::new(Vec3(0.0, 0.0, back), Vec3(1.0, 0.0, back), Vec3(0.0, 1.0, back));
    let left_wall  = Plane::new(Vec3(left, 0.0, 0.0), Vec3(left, 0.0, -1.0), Vec3(left, 1.0, 0.0));
    let right_wall = Plane::new(Vec3(right, 0.0, 0.0), Vec3(right, 1.0, 0.0), Vec3(right, 0.0, -1.0));

    scene.add_primitive(Primitive::untransformed(floor, white.clone()));
    scene.add_primitive(Primitive::untransformed(ceiling, white.clone()));
    scene.add_primitive(Primitive::untransformed(back_wall, white.clone()));
    scene.add_primitive(Primitive::untransformed(left_wall, red));
    scene.add_primitive(Primitive::untransformed(right_wall, green));

    let glass = Surface::new(Material::Glass, Texture::constant(Vec3(1.0, 1.0, 1.0)));
    let mirror = Surface::new(Material::Mirror, Texture::constant(Vec3(0.95, 0.95, 0.95)));
    let coated = Surface::new(Material::ClearCoat, Texture::constant(Vec3(0.2, 0.3, 0.7))).with_noise(0.1, 8.0);
    scene.add_primitive(Primitive::untransformed(Sphere::new(Vec3(-0.45, 0.35, -0.3), 0.35), glass));
    scene.add_primitive(Primitive::untransformed(Sphere::new(Vec3(0.45, 0.35, 0.2), 0.35), mirror));

    let block = make_cube(0.5, 1);
    scene.add_primitive(Primitive::new(block, coated, Transform::translate(Vec3(0.0, 0.25, -0.6))));

    // small spherical lamp just below the ceiling
    let lamp = white.with_emission(Texture::constant(Vec3(15.0, 15.0, 15.0)));
    scene.add_primitive(Primitive::untransformed(Sphere::new(Vec3(0.0, top - 0.1, 0.0), 0.05), lamp));

    scene
}

// procedural heightfield lit by an image-textured sky sphere
pub fn terrain_scene() -> Scene {
    let camera = Camera::lookat_camera(
        Vec3(0.0, 40.0, 120.0),
        Vec3(0.0, 10.0, 0.0),
        Vec3(0.0, 1.0, 0.0),
        (70.0_f32).to_radians(),
        960,
        540,
    );
    let mut scene = Scene::new("terrain", camera);

    let terrain = Terrain {
        frequency: 0.01,
        gain: 0.5,
        minimum: -10.0,
        maximum: 30.0,
        octaves: 8,
    };
    let rock = Surface::new(Material::Phong, Texture::constant(Vec3(0.45, 0.4, 0.35)))
        .with_normal(Texture::SurfaceNormal { tangent_space: true })
        .with_noise(0.25, 0.05);
    scene.add_primitive(Primitive::untransformed(terrain, rock));

    // 2x2 sky gradient, brighter towards the zenith
    let sky = ImageTexture::new(
        2,
        2,
        vec![Vec3(0.6, 0.7, 1.0), Vec3(0.6, 0.7, 1.0), Vec3(0.3, 0.4, 0.6), Vec3(0.3, 0.4, 0.6)],
    );
    let sky_texture = match sky {
        Some(image) => Texture::image(image),
        None => Texture::constant(Vec3(0.5, 0.6, 0.8)),
    };
    let sky_surface = Surface::new(Material::Lambertian, Texture::black()).with_emission(sky_texture);
    scene.add_primitive(Primitive::untransformed(Sphere::new(Vec3::zero(), 1000.0), sky_surface));

    scene
}

// the spheres scene seen through a fisheye lens, plus a uv-textured mirror ball
pub fn fisheye_scene() -> Scene {
    let spheres = spheres_scene();
    let mut scene = Scene::new("fisheye", spheres.camera().with_lens(Lens::Fisheye));
    for primitive in spheres.primitives() {
        scene.add_primitive(primitive.clone());
    }
    scene.add_primitive(Primitive::untransformed(
        Sphere::new(Vec3(0.0, 0.0, 0.0), 0.25),
        Surface::new(Material::Mirror, Texture::UV),
    ));
    scene
}

pub struct TestScene {
    pub name: &'static str,
    pub scene_func: fn() -> Scene,
}

pub const fn all_test_scenes() -> &'static [TestScene] {
    &[
        TestScene {
            name: "empty",
            scene_func: empty_scene,
        },
        TestScene {
            name: "spheres",
            scene_func: spheres_scene,
        },
        TestScene {
            name: "duplicate_triangles",
            scene_func: duplicate_triangles_scene,
        },
        TestScene {
            name: "cube",
            scene_func: cube_scene,
        },
        TestScene {
            name: "cornell_box",
            scene_func: cornell_box_scene,
        },
        TestScene {
            name: "terrain",
            scene_func: terrain_scene,
        },
        TestScene {
            name: "fisheye",
            scene_func: fisheye_scene,
        },
    ]
}

pub fn find_test_scene(name: &str) -> Option<&'static TestScene> {
    all_test_scenes().iter().find(|test_scene| test_scene.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_flat_faces() {
        let cube = make_cube(2.0, 1);
        assert_eq!(cube.len(), 12);
        assert!((cube.area() - 24.0).abs() < 1e-4);
        let bounds = cube.bounds().unwrap();
        assert_eq!(bounds.minimum, Vec3(-1.0, -1.0, -1.0));
        assert_eq!(bounds.maximum, Vec3(1.0, 1.0, 1.0));

        for triangle in cube.triangles() {
            let winding = Vec3::cross(triangle.b.position - triangle.a.position, triangle.c.position - triangle.a.position);
            assert!(Vec3::dot(winding, triangle.a.normal) > 0.0);
        }

        assert_eq!(make_cube(1.0, 3).len(), 6 * 9 * 2);
    }

    #[test]
    fn registry_names_match_scenes() {
        for test_scene in all_test_scenes() {
            let scene = (test_scene.scene_func)();
            assert_eq!(scene.name(), test_scene.name);
        }
        assert!(find_test_scene("cornell_box").is_some());
        assert!(find_test_scene("missing").is_none());
    }
}
