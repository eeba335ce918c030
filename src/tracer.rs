//! Recursive Whitted shading
//!
//! Every call reads the scene through a shared borrow and keeps no state of
//! its own, so rays can be traced from any number of threads at once.

use crate::{
    lights::LightSource,
    objects::{HitRecord, Intersectable},
    scene::Scene,
    utils, Color, Ray, UnitVec, Vec3,
};

/// Recursion depth of a top-level trace
pub const MAX_CALC_COLOR_LEVEL: u32 = 10;
/// Contributions attenuated below this on every channel are dropped
pub const MIN_CALC_COLOR_K: f64 = 0.001;
/// Attenuation a top-level ray starts with, on every channel
pub const INITIAL_K: f64 = 1.0;

/// True when every channel of `k` is negligible
fn lower_than_min(k: &Vec3) -> bool {
    k.iter().all(|&c| c < MIN_CALC_COLOR_K)
}

/// Whitted ray tracer over a borrowed scene
#[derive(Clone, Copy)]
pub struct RayTracer<'a> {
    scene: &'a Scene,
}
impl<'a> RayTracer<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Color seen along `ray`
    ///
    /// A ray that misses everything sees exactly the background. Otherwise the
    /// ambient light is added once on top of the recursive shading.
    pub fn trace_ray(&self, ray: &Ray) -> Color {
        match self.closest_hit(ray) {
            None => self.scene.background,
            Some(hit) => {
                self.calc_color(&hit, ray, MAX_CALC_COLOR_LEVEL, Vec3::repeat(INITIAL_K))
                    + self.scene.ambient.intensity()
            }
        }
    }

    /// Nearest hit along `ray` in the whole scene
    pub fn closest_hit(&self, ray: &Ray) -> Option<HitRecord<'a>> {
        ray.closest_hit(self.scene.geometries.intersections(ray))
    }

    fn calc_color(&self, hit: &HitRecord<'_>, ray: &Ray, level: u32, k: Vec3) -> Color {
        let n = hit.geometry.normal_at(&hit.p);
        let nv = utils::align_zero(n.dot(&*ray.dir));
        let color = hit.geometry.emission();
        // Grazing
        if nv == 0.0 {
            return color;
        }

        let color = color + self.calc_local_effects(hit, ray, &n, nv, k);
        if level == 1 {
            return color;
        }
        color + self.calc_global_effects(hit, ray, &n, level, k)
    }

    fn calc_local_effects(
        &self,
        hit: &HitRecord<'_>,
        ray: &Ray,
        n: &UnitVec,
        nv: f64,
        k: Vec3,
    ) -> Color {
        let material = hit.geometry.material();
        let mut color = Color::zeros();
        for light in &self.scene.lights {
            let Some(l) = light.direction_at(&hit.p) else {
                continue;
            };
            let nl = utils::align_zero(n.dot(&*l));
            // Light and viewer on opposite sides of the surface
            if nl * nv <= 0.0 {
                continue;
            }

            let ktr = self.transparency(&**light, &l, n, hit);
            if lower_than_min(&ktr.component_mul(&k)) {
                continue;
            }

            let il = light.intensity_at(&hit.p).component_mul(&ktr);
            let diffuse = material.kd * nl.abs();
            let specular = calc_specular(material.ks, &l, n, nl, ray, material.shininess);
            color += il.component_mul(&(diffuse + specular));
        }
        color
    }

    fn calc_global_effects(
        &self,
        hit: &HitRecord<'_>,
        ray: &Ray,
        n: &UnitVec,
        level: u32,
        k: Vec3,
    ) -> Color {
        let material = hit.geometry.material();

        let reflected = UnitVec::new_normalize(utils::reflect(&ray.dir, n));
        let reflected = Ray::offset(hit.p, reflected, n);
        let refracted = Ray::offset(hit.p, ray.dir, n);

        self.calc_global_effect(&reflected, level, material.kr, k)
            + self.calc_global_effect(&refracted, level, material.kt, k)
    }

    fn calc_global_effect(&self, ray: &Ray, level: u32, kx: Vec3, k: Vec3) -> Color {
        let kkx = kx.component_mul(&k);
        if lower_than_min(&kkx) {
            return Color::zeros();
        }
        match self.closest_hit(ray) {
            None => self.scene.background.component_mul(&kx),
            Some(hit) => self
                .calc_color(&hit, ray, level - 1, kkx)
                .component_mul(&kx),
        }
    }

    /// How much of `light` gets through to `hit`
    ///
    /// `l` points from the light to the hit. Each occluder strictly closer than
    /// the light scales the result by its transparency.
    pub fn transparency(
        &self,
        light: &dyn LightSource,
        l: &UnitVec,
        n: &UnitVec,
        hit: &HitRecord<'_>,
    ) -> Vec3 {
        let to_light = UnitVec::new_unchecked(-l.into_inner());
        let light_ray = Ray::offset(hit.p, to_light, n);
        let max_distance = light.distance_to(&hit.p);

        let mut ktr = Vec3::repeat(1.0);
        for occluder in self.scene.geometries.try_hit(&light_ray, max_distance) {
            ktr.component_mul_assign(&occluder.geometry.material().kt);
            if lower_than_min(&ktr) {
                return Vec3::zeros();
            }
        }
        ktr
    }
}

/// Phong highlight, `r` is `l` mirrored about `n`
fn calc_specular(ks: Vec3, l: &UnitVec, n: &UnitVec, nl: f64, ray: &Ray, shininess: i32) -> Vec3 {
    let r = l.into_inner() - 2.0 * nl * n.into_inner();
    let minus_vr = -utils::align_zero(r.dot(&*ray.dir));
    if minus_vr <= 0.0 {
        return Vec3::zeros();
    }
    ks * minus_vr.powi(shininess)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lights::{AmbientLight, DirectionalLight, PointLight},
        materials::Material,
        objects::{Plane, Sphere},
        polygons::Polygon,
        Point,
    };
    use approx::assert_relative_eq;
    use rand::seq::SliceRandom;

    fn ray(o: [f64; 3], d: [f64; 3]) -> Ray {
        Ray::new(Point::from(o), Vec3::from(d)).unwrap()
    }

    fn hit_on<'a>(geometry: &'a Plane, ray: &Ray) -> HitRecord<'a> {
        let t = geometry.hit_distance(ray, f64::INFINITY).unwrap();
        HitRecord::new(geometry, ray, t)
    }

    /// A square in the plane z = `z`, centered on the z axis
    fn square(z: f64, half: f64, kt: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(-half, -half, z),
            Point::new(half, -half, z),
            Point::new(half, half, z),
            Point::new(-half, half, z),
        ])
        .unwrap()
        .with_material(Material::new().with_kt(Vec3::repeat(kt)))
    }

    #[test]
    fn miss_returns_background() {
        let mut scene = Scene::new("miss")
            .with_background(Color::new(0.2, 0.3, 0.4))
            .with_ambient(AmbientLight::new(Color::repeat(1.0), Vec3::repeat(0.5)));
        scene.add_geometry(Box::new(Sphere::new(Point::new(0.0, 0.0, -5.0), 1.0).unwrap()));
        scene.add_light(Box::new(PointLight::new(
            Color::repeat(1.0),
            Point::new(0.0, 10.0, 0.0),
        )));

        let tracer = RayTracer::new(&scene);
        let color = tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]));
        assert_eq!(color, Color::new(0.2, 0.3, 0.4));
    }

    #[test]
    fn ambient_and_emission_on_unlit_hit() {
        let mut scene = Scene::new("ambient")
            .with_ambient(AmbientLight::new(Color::repeat(1.0), Vec3::repeat(0.1)));
        scene.add_geometry(Box::new(
            Sphere::new(Point::new(0.0, 0.0, -5.0), 1.0).unwrap().with_emission(Color::new(0.2, 0.0, 0.0)),
        ));

        let tracer = RayTracer::new(&scene);
        let color = tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]));
        assert_relative_eq!(color, Color::new(0.3, 0.1, 0.1));
    }

    #[test]
    fn diffuse_and_specular_from_a_light_behind_the_eye() {
        let mut scene = Scene::new("phong");
        scene.add_geometry(Box::new(
            Plane::new(Point::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0))
                .unwrap()
                .with_material(
                    Material::new()
                        .with_kd(Vec3::repeat(0.5))
                        .with_ks(Vec3::repeat(0.25))
                        .with_shininess(3),
                ),
        ));
        scene.add_light(Box::new(
            DirectionalLight::new(Color::repeat(1.0), Vec3::new(0.0, 0.0, -1.0)).unwrap(),
        ));

        // Head on: |nl| = 1 and the reflection points straight back at the eye
        let tracer = RayTracer::new(&scene);
        let color = tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]));
        assert_relative_eq!(color, Color::repeat(0.75));
    }

    #[test]
    fn light_on_far_side_contributes_nothing() {
        let mut scene = Scene::new("backlit");
        scene.add_geometry(Box::new(
            Plane::new(Point::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0))
                .unwrap()
                .with_material(Material::new().with_kd(Vec3::repeat(1.0))),
        ));
        scene.add_light(Box::new(PointLight::new(
            Color::repeat(1.0),
            Point::new(0.0, 0.0, -10.0),
        )));

        let tracer = RayTracer::new(&scene);
        let color = tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]));
        assert_eq!(color, Color::zeros());
    }

    #[test]
    fn transparency_is_one_without_occluders() {
        let floor = Plane::new(Point::zeros(), Vec3::new(0.0, 0.0, 1.0)).unwrap();
        let light = PointLight::new(Color::repeat(1.0), Point::new(0.0, 0.0, 5.0));
        let mut scene = Scene::new("open sky");
        // Behind the light, so outside the shadow ray's reach
        scene.add_geometry(Box::new(square(8.0, 1.0, 0.0)));

        let tracer = RayTracer::new(&scene);
        let view = ray([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
        let hit = hit_on(&floor, &view);
        let l = light.direction_at(&hit.p).unwrap();
        let n = floor.normal();
        assert_eq!(tracer.transparency(&light, &l, &n, &hit), Vec3::repeat(1.0));
    }

    #[test]
    fn transparency_drops_with_each_occluder() {
        let floor = Plane::new(Point::zeros(), Vec3::new(0.0, 0.0, 1.0)).unwrap();
        let light = PointLight::new(Color::repeat(1.0), Point::new(0.0, 0.0, 5.0));
        let view = ray([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
        let hit = hit_on(&floor, &view);
        let l = light.direction_at(&hit.p).unwrap();
        let n = floor.normal();

        let mut previous = Vec3::repeat(1.0);
        for layers in 1..=3 {
            let mut scene = Scene::new("layers");
            for z in 1..=layers {
                scene.add_geometry(Box::new(square(f64::from(z), 1.0, 0.5)));
            }
            let ktr = RayTracer::new(&scene).transparency(&light, &l, &n, &hit);
            assert_relative_eq!(ktr, Vec3::repeat(0.5f64.powi(layers)));
            assert!(ktr.iter().zip(previous.iter()).all(|(a, b)| a <= b));
            previous = ktr;
        }

        let mut scene = Scene::new("opaque");
        for z in 1..=3 {
            scene.add_geometry(Box::new(square(f64::from(z), 1.0, 0.5)));
        }
        scene.add_geometry(Box::new(square(4.0, 1.0, 0.0)));
        let tracer = RayTracer::new(&scene);
        assert_eq!(tracer.transparency(&light, &l, &n, &hit), Vec3::zeros());
    }

    #[test]
    fn shadowed_point_sees_only_ambient() {
        let mut scene = Scene::new("shadow")
            .with_ambient(AmbientLight::new(Color::repeat(1.0), Vec3::repeat(0.05)));
        scene.add_geometry(Box::new(
            Plane::new(Point::zeros(), Vec3::new(0.0, 0.0, 1.0))
                .unwrap()
                .with_material(Material::new().with_kd(Vec3::repeat(1.0))),
        ));
        scene.add_geometry(Box::new(square(2.0, 1.0, 0.0)));
        scene.add_light(Box::new(PointLight::new(
            Color::repeat(1.0),
            Point::new(0.0, 0.0, 5.0),
        )));

        let tracer = RayTracer::new(&scene);
        // Comes in from the side, under the square
        let color = tracer.trace_ray(&ray([3.0, 0.0, 1.0], [-3.0, 0.0, -1.0]));
        assert_relative_eq!(color, Color::repeat(0.05));
    }

    #[test]
    fn closest_hit_ignores_insertion_order() {
        let mut spheres: Vec<Sphere> = (0..8)
            .map(|i| Sphere::new(Point::new(0.0, 0.0, -3.0 * (i as f64 + 2.0)), 1.0).unwrap())
            .collect();
        let mut rng = rand::thread_rng();
        let view = ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]);

        for _ in 0..10 {
            spheres.shuffle(&mut rng);
            let mut scene = Scene::new("shuffled");
            for sphere in &spheres {
                scene.add_geometry(Box::new(sphere.clone()));
            }
            let hit = RayTracer::new(&scene).closest_hit(&view).unwrap();
            assert_relative_eq!(hit.p, Point::new(0.0, 0.0, -5.0));
        }
    }

    #[test]
    fn facing_mirrors_terminate() {
        let mirror = Material::new().with_kr(Vec3::repeat(1.0));
        let mut scene = Scene::new("hall of mirrors").with_background(Color::repeat(1.0));
        scene.add_geometry(Box::new(
            Plane::new(Point::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0))
                .unwrap()
                .with_material(mirror)
                .with_emission(Color::repeat(0.01)),
        ));
        scene.add_geometry(Box::new(
            Plane::new(Point::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0))
                .unwrap()
                .with_material(mirror)
                .with_emission(Color::repeat(0.01)),
        ));

        // Bounces back and forth until the depth runs out
        let color = RayTracer::new(&scene).trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]));
        assert_relative_eq!(
            color,
            Color::repeat(0.01 * MAX_CALC_COLOR_LEVEL as f64),
            epsilon = 1e-12
        );
    }

    #[test]
    fn refraction_passes_straight_through() {
        let glass = Material::new().with_kt(Vec3::repeat(0.5));
        let mut scene = Scene::new("window").with_background(Color::new(0.0, 0.0, 1.0));
        scene.add_geometry(Box::new(square(-2.0, 1.0, 0.5).with_material(glass)));

        let color = RayTracer::new(&scene).trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]));
        assert_relative_eq!(color, Color::new(0.0, 0.0, 0.5));
    }

    /// Head-on view of a mirror at z = -5 over a white background
    fn mirror_scene(kr: f64) -> Scene {
        let mut scene = Scene::new("faint mirror")
            .with_background(Color::repeat(1.0))
            .with_ambient(AmbientLight::new(Color::repeat(1.0), Vec3::repeat(0.5)));
        scene.add_geometry(Box::new(
            Plane::new(Point::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0))
                .unwrap()
                .with_emission(Color::new(0.25, 0.0, 0.0))
                .with_material(Material::new().with_kr(Vec3::repeat(kr))),
        ));
        scene
    }

    #[test]
    fn negligible_reflection_is_not_traced() {
        let view = ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]);

        // kr below the cutoff: emission and ambient only, no background term
        let scene = mirror_scene(0.0005);
        assert_eq!(
            RayTracer::new(&scene).trace_ray(&view),
            Color::new(0.75, 0.5, 0.5)
        );

        // Just above it the reflected miss brings in the background
        let scene = mirror_scene(0.002);
        assert_relative_eq!(
            RayTracer::new(&scene).trace_ray(&view),
            Color::new(0.752, 0.502, 0.502),
            epsilon = 1e-12
        );
    }

    #[test]
    fn negligible_light_is_dropped_deep_in_the_recursion() {
        let floor = Plane::new(Point::zeros(), Vec3::new(0.0, 0.0, 1.0))
            .unwrap()
            .with_material(Material::new().with_kd(Vec3::repeat(1.0)));
        let mut scene = Scene::new("filtered light");
        scene.add_geometry(Box::new(square(2.0, 1.0, 0.5)));
        scene.add_light(Box::new(
            DirectionalLight::new(Color::repeat(1.0), Vec3::new(0.0, 0.0, -1.0)).unwrap(),
        ));

        let tracer = RayTracer::new(&scene);
        let view = ray([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
        let hit = hit_on(&floor, &view);

        // ktr = 0.5 through the square
        assert_relative_eq!(
            tracer.calc_color(&hit, &view, 1, Vec3::repeat(INITIAL_K)),
            Color::repeat(0.5)
        );
        assert_relative_eq!(
            tracer.calc_color(&hit, &view, 1, Vec3::repeat(0.003)),
            Color::repeat(0.5)
        );
        // ktr * k = 0.00075
        assert_eq!(
            tracer.calc_color(&hit, &view, 1, Vec3::repeat(0.0015)),
            Color::zeros()
        );
    }

    #[test]
    fn threshold_needs_every_channel_below() {
        assert!(lower_than_min(&Vec3::repeat(0.0005)));
        assert!(!lower_than_min(&Vec3::new(0.0005, 0.0005, 0.002)));
    }
}
