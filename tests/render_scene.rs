use image::Rgb;
use whitted::prelude::*;
use whitted::render;
use whitted::scene::SceneConfig;

const SCENE: &str = r#"
name: lit sphere over a floor
camera:
  position: [0, 0, 10]
  v_to: [0, 0, -1]
  v_up: [0, 1, 0]
  vp_size: [4, 4]
  vp_distance: 5
background: [0, 0, 0.5]
ambient:
  intensity: [1, 1, 1]
  ka: [0.1, 0.1, 0.1]
geometries:
  - type: Sphere
    center: [0, 0, 0]
    radius: 1
    emission: [0.1, 0, 0]
    material:
      kd: 0.5
      ks: 0.5
      shininess: 20
  - type: Group
    objects:
      - type: Triangle
        vertices: [[-100, -100, -5], [100, -100, -5], [0, 100, -5]]
        material:
          kd: [0.2, 0.6, 0.2]
lights:
  - type: Directional
    intensity: [1, 1, 1]
    direction: [0, 0, -1]
"#;

fn load() -> (Camera, Scene) {
    let config: SceneConfig = serde_yaml::from_str(SCENE).unwrap();
    let camera = Camera::from_config(config.camera.clone()).unwrap();
    (camera, Scene::from_config(config).unwrap())
}

#[test]
fn renders_sphere_floor_and_background() {
    let (camera, scene) = load();
    let tracer = RayTracer::new(&scene);
    let img = render::render(&camera, &tracer, 5, 5).unwrap();

    // Head-on at the sphere: emission + diffuse + specular + ambient, clamped
    assert_eq!(*img.get_pixel(2, 2), Rgb([255, 255, 255]));

    // Off the sphere the floor is lit straight on: 0.1 + kd
    let floor = Rgb([76, 179, 76]);
    assert_eq!(*img.get_pixel(0, 2), floor);
    assert_eq!(*img.get_pixel(4, 2), floor);
}

#[test]
fn rays_past_everything_see_background() {
    let (camera, scene) = load();
    let tracer = RayTracer::new(&scene);
    let ray = Ray::new(camera.position(), Vec3::new(0.0, 0.0, 1.0)).unwrap();
    assert_eq!(tracer.trace_ray(&ray), Color::new(0.0, 0.0, 0.5));
}

#[test]
fn sphere_shadows_the_floor() {
    let (_, scene) = load();
    let tracer = RayTracer::new(&scene);

    // Straight down the axis past the sphere's edge lands in its shadow
    let ray = Ray::new(Point::new(0.5, 0.0, -2.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
    approx::assert_relative_eq!(tracer.trace_ray(&ray), Color::repeat(0.1));
}

#[test]
fn bad_geometry_fails_to_load() {
    let yaml = SCENE.replace(
        "vertices: [[-100, -100, -5], [100, -100, -5], [0, 100, -5]]",
        "vertices: [[0, 0, -5], [1, 1, -5], [2, 2, -5]]",
    );
    let config: SceneConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(matches!(
        Scene::from_config(config),
        Err(Error::Construction(_))
    ));
}

#[test]
fn bundled_scene_loads_and_renders() {
    let config: SceneConfig =
        serde_yaml::from_str(include_str!("../scenes/mirrors.yaml")).unwrap();
    let camera = Camera::from_config(config.camera.clone()).unwrap();
    let scene = Scene::from_config(config).unwrap();
    assert_eq!(scene.lights.len(), 3);

    let img = render::render(&camera, &RayTracer::new(&scene), 8, 8).unwrap();
    assert_eq!(img.dimensions(), (8, 8));
}
