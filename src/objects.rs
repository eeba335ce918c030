//! Objects
use std::fmt;

use crate::{
    error::{Error, Result},
    materials::{Material, MaterialConfig},
    polygons::{Polygon, PolygonConfig, Triangle, TriangleConfig},
    tubes::{Cylinder, CylinderConfig, Tube, TubeConfig},
    utils::{self, SerdeVector},
    Color, Point, Ray, UnitVec, Vec3,
};
use serde::{Deserialize, Serialize};

pub type IntersectableObj = Box<dyn Intersectable + Send + Sync>;

/// Anything a ray can be tested against
pub trait Intersectable {
    /// All hits with `0 < t <= max_distance`, empty when there are none
    fn try_hit(&self, ray: &Ray, max_distance: f64) -> Vec<HitRecord<'_>>;

    fn intersections(&self, ray: &Ray) -> Vec<HitRecord<'_>> {
        self.try_hit(ray, f64::INFINITY)
    }
}

/// A shaded surface
pub trait Geometry: Intersectable {
    /// Unit outward normal, `p` is assumed to lie on the surface
    fn normal_at(&self, p: &Point) -> UnitVec;

    fn emission(&self) -> Color;

    fn material(&self) -> &Material;
}

/// Represents a hit
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// The geometry that was hit
    pub geometry: &'a dyn Geometry,
    /// Point of intersection
    pub p: Point,
    /// Distance from the ray origin
    pub t: f64,
}
impl<'a> HitRecord<'a> {
    pub fn new(geometry: &'a dyn Geometry, ray: &Ray, t: f64) -> Self {
        Self {
            geometry,
            p: ray.get(t),
            t,
        }
    }
}
impl fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitRecord")
            .field("p", &self.p)
            .field("t", &self.t)
            .finish()
    }
}

/// Emission and material shared by every primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub emission: Color,
    pub material: Material,
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            emission: Color::zeros(),
            material: Material::default(),
        }
    }
}
impl Surface {
    pub fn from_config(emission: Option<SerdeVector>, material: MaterialConfig) -> Self {
        Self {
            emission: emission.map(Color::from).unwrap_or_else(Color::zeros),
            material: Material::from_config(material),
        }
    }
}

/// Composite of geometries and other composites
#[derive(Default)]
pub struct Geometries(pub Vec<IntersectableObj>);
impl Geometries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, boxed_obj: IntersectableObj) {
        self.0.push(boxed_obj)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_config(config: GeometriesConfig) -> Result<Self> {
        let mut s = Self::default();
        for obj_cfg in config.objects {
            s.add(Generator::from_config(obj_cfg)?);
        }
        Ok(s)
    }
}
impl Intersectable for Geometries {
    fn try_hit(&self, ray: &Ray, max_distance: f64) -> Vec<HitRecord<'_>> {
        self.0
            .iter()
            .flat_map(|obj| obj.try_hit(ray, max_distance))
            .collect()
    }
}

/// Geometries Config
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeometriesConfig {
    #[serde(default)]
    pub objects: Vec<GeometryConfig>,
}

/// Config for any geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryConfig {
    Plane(PlaneConfig),
    Sphere(SphereConfig),
    Polygon(PolygonConfig),
    Triangle(TriangleConfig),
    Tube(TubeConfig),
    Cylinder(CylinderConfig),
    Group(GeometriesConfig),
}

/// Generator from config
pub struct Generator;
impl Generator {
    pub fn from_config(config: GeometryConfig) -> Result<IntersectableObj> {
        Ok(match config {
            GeometryConfig::Plane(c) => Box::new(Plane::from_config(c)?),
            GeometryConfig::Sphere(c) => Box::new(Sphere::from_config(c)?),
            GeometryConfig::Polygon(c) => Box::new(Polygon::from_config(c)?),
            GeometryConfig::Triangle(c) => Box::new(Triangle::from_config(c)?),
            GeometryConfig::Tube(c) => Box::new(Tube::from_config(c)?),
            GeometryConfig::Cylinder(c) => Box::new(Cylinder::from_config(c)?),
            GeometryConfig::Group(c) => Box::new(Geometries::from_config(c)?),
        })
    }
}

/// Infinite plane through `q0`
#[derive(Debug, Clone)]
pub struct Plane {
    q0: Point,
    normal: UnitVec,
    surface: Surface,
}
impl Plane {
    pub fn new(q0: Point, normal: Vec3) -> Result<Self> {
        let normal = utils::try_normalize(normal)
            .map_err(|_| Error::construction("plane normal is the zero vector"))?;
        Ok(Self::from_unit(q0, normal))
    }

    pub fn from_unit(q0: Point, normal: UnitVec) -> Self {
        Self {
            q0,
            normal,
            surface: Surface::default(),
        }
    }

    /// Plane through three points, oriented by `(p2 - p1) x (p3 - p1)`
    pub fn from_points(p1: Point, p2: Point, p3: Point) -> Result<Self> {
        let normal = utils::try_normalize((p2 - p1).cross(&(p3 - p1))).map_err(|_| {
            Error::construction("plane points must be distinct and not on one line")
        })?;
        Ok(Self::from_unit(p1, normal))
    }

    pub fn from_config(config: PlaneConfig) -> Result<Self> {
        Ok(Self::new(config.point.into(), config.normal.into())?
            .with_surface(Surface::from_config(config.emission, config.material)))
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.surface.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.surface.material = material;
        self
    }

    pub(crate) fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    pub fn q0(&self) -> Point {
        self.q0
    }

    pub fn normal(&self) -> UnitVec {
        self.normal
    }

    /// Distance along `ray` to the plane, if it lies in `(0, max_distance]`
    ///
    /// `t = n.(q0 - O) / n.D`; a ray parallel to the plane never hits it.
    pub fn hit_distance(&self, ray: &Ray, max_distance: f64) -> Option<f64> {
        let nv = self.normal.dot(&*ray.dir);
        if utils::is_zero(nv) {
            return None;
        }
        let t = utils::align_zero(self.normal.dot(&(self.q0 - ray.orig)) / nv);
        if t <= 0.0 || utils::align_zero(t - max_distance) > 0.0 {
            return None;
        }
        Some(t)
    }
}
impl Intersectable for Plane {
    fn try_hit(&self, ray: &Ray, max_distance: f64) -> Vec<HitRecord<'_>> {
        self.hit_distance(ray, max_distance)
            .map(|t| HitRecord::new(self, ray, t))
            .into_iter()
            .collect()
    }
}
impl Geometry for Plane {
    fn normal_at(&self, _p: &Point) -> UnitVec {
        self.normal
    }

    fn emission(&self) -> Color {
        self.surface.emission
    }

    fn material(&self) -> &Material {
        &self.surface.material
    }
}

/// Plane config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneConfig {
    pub point: SerdeVector,
    pub normal: SerdeVector,
    #[serde(default)]
    pub emission: Option<SerdeVector>,
    #[serde(default)]
    pub material: MaterialConfig,
}

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point,
    pub radius: f64,
    surface: Surface,
}
impl Sphere {
    pub fn new(center: Point, radius: f64) -> Result<Self> {
        if radius <= 0.0 {
            return Err(Error::construction("sphere radius must be positive"));
        }
        Ok(Self {
            center,
            radius,
            surface: Surface::default(),
        })
    }

    pub fn from_config(config: SphereConfig) -> Result<Self> {
        Ok(Self::new(config.center.into(), config.radius)?
            .with_surface(Surface::from_config(config.emission, config.material)))
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.surface.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.surface.material = material;
        self
    }

    pub(crate) fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }
}
impl Intersectable for Sphere {
    fn try_hit(&self, ray: &Ray, max_distance: f64) -> Vec<HitRecord<'_>> {
        // The origin may sit on the center, so u is used raw and never normalized
        let u = self.center - ray.orig;
        let tm = utils::align_zero(u.dot(&*ray.dir));
        let d_squared = utils::align_zero(u.norm_squared() - tm * tm);
        let r_squared = self.radius * self.radius;
        // A tangent ray does not count as a hit
        if d_squared >= r_squared {
            return Vec::new();
        }

        let th = utils::align_zero((r_squared - d_squared).sqrt());
        [tm - th, tm + th]
            .into_iter()
            .filter(|&t| t > 0.0 && utils::align_zero(t - max_distance) <= 0.0)
            .map(|t| HitRecord::new(self, ray, t))
            .collect()
    }
}
impl Geometry for Sphere {
    fn normal_at(&self, p: &Point) -> UnitVec {
        utils::direction(&self.center, p).unwrap_or_else(|_| Vec3::z_axis())
    }

    fn emission(&self) -> Color {
        self.surface.emission
    }

    fn material(&self) -> &Material {
        &self.surface.material
    }
}

/// Sphere config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereConfig {
    pub center: SerdeVector,
    pub radius: f64,
    #[serde(default)]
    pub emission: Option<SerdeVector>,
    #[serde(default)]
    pub material: MaterialConfig,
}
