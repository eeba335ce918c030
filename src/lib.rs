//! Whitted-style Ray Tracing Library
//!
//! Analytic ray/surface intersection over a composite scene, and a recursive
//! shading integrator with shadows, partial transparency, reflection and
//! refraction. All scene data is immutable once built, so any number of
//! [`tracer::RayTracer::trace_ray`] calls may run concurrently on one scene.

use nalgebra::{Unit, Vector3};

pub mod cameras;
pub mod error;
pub mod lights;
pub mod materials;
pub mod objects;
pub mod polygons;
pub mod render;
pub mod scene;
pub mod tracer;
pub mod tubes;
pub mod utils;

use error::Result;
use objects::HitRecord;

pub type Vec3 = Vector3<f64>;
pub type Point = Vec3;
pub type Color = Vec3;
/// A direction that can never be the zero vector
pub type UnitVec = Unit<Vec3>;

/// Values closer than this to zero are treated as zero
pub const EPSILON: f64 = 1e-10;
/// How far secondary rays are pushed off the surface they leave
pub const DELTA: f64 = 0.1;

/// Prelude
pub mod prelude {
    pub use crate::cameras::Camera;
    pub use crate::error::{Error, Result};
    pub use crate::lights::{AmbientLight, DirectionalLight, LightSource, PointLight, SpotLight};
    pub use crate::materials::Material;
    pub use crate::objects::{Geometries, Geometry, HitRecord, Intersectable, Plane, Sphere};
    pub use crate::polygons::{Polygon, Triangle};
    pub use crate::scene::Scene;
    pub use crate::tracer::RayTracer;
    pub use crate::tubes::{Cylinder, Tube};
    pub use crate::{Color, Point, Ray, UnitVec, Vec3};
}

/// The ray in ray tracing
///
/// The direction is always unit length, so the ray parameter `t` is also the
/// distance from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub orig: Point,
    pub dir: UnitVec,
}
impl Ray {
    pub fn new(orig: Point, dir: Vec3) -> Result<Self> {
        Ok(Self::from_unit(orig, utils::try_normalize(dir)?))
    }

    pub fn from_unit(orig: Point, dir: UnitVec) -> Self {
        Self { orig, dir }
    }

    /// A ray leaving a surface
    ///
    /// The origin is moved `DELTA` along the normal, to whichever side `dir`
    /// points into, so the ray does not hit the surface it starts on.
    pub fn offset(point: Point, dir: UnitVec, normal: &UnitVec) -> Self {
        let delta = if normal.dot(&*dir) < 0.0 {
            -DELTA
        } else {
            DELTA
        };
        Self::from_unit(point + delta * normal.into_inner(), dir)
    }

    pub fn get(&self, t: f64) -> Point {
        if utils::is_zero(t) {
            return self.orig;
        }
        self.orig + t * self.dir.into_inner()
    }

    pub fn distance_to(&self, p: &Point) -> f64 {
        (p - self.orig).norm()
    }

    /// The point nearest to the origin, first one wins on ties
    pub fn closest_point(&self, points: &[Point]) -> Option<Point> {
        let mut closest = None;
        let mut min_distance = f64::INFINITY;
        for p in points {
            let distance = self.distance_to(p);
            if distance < min_distance {
                min_distance = distance;
                closest = Some(*p);
            }
        }
        closest
    }

    /// The hit nearest to the origin, first one wins on ties
    pub fn closest_hit<'a>(
        &self,
        hits: impl IntoIterator<Item = HitRecord<'a>>,
    ) -> Option<HitRecord<'a>> {
        let mut closest = None;
        let mut min_distance = f64::INFINITY;
        for hr in hits {
            let distance = self.distance_to(&hr.p);
            if distance < min_distance {
                min_distance = distance;
                closest = Some(hr);
            }
        }
        closest
    }
}
