//! Convex planar polygons and triangles

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    materials::{Material, MaterialConfig},
    objects::{Geometry, HitRecord, Intersectable, Plane, Surface},
    utils::{self, SerdeVector},
    Color, Point, Ray, UnitVec, Vec3,
};

/// Convex polygon, vertices given in order around the boundary
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Point>,
    plane: Plane,
    surface: Surface,
}
impl Polygon {
    /// Build a polygon, checking that the vertices describe a convex planar shape
    pub fn new(vertices: Vec<Point>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::construction(
                "a polygon can't have less than 3 vertices",
            ));
        }
        let size = vertices.len();
        for i in 0..size {
            let prev = vertices[(i + size - 1) % size];
            if utils::is_zero((vertices[i] - prev).norm()) {
                return Err(Error::construction(
                    "consecutive polygon vertices must be distinct",
                ));
            }
        }

        // The first three vertices fix the plane and its normal
        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])?;
        if size > 3 {
            Self::check_convex(&vertices, &plane.normal().into_inner())?;
        }

        Ok(Self {
            vertices,
            plane,
            surface: Surface::default(),
        })
    }

    /// Every vertex must be in the plane and every corner must turn the same way
    fn check_convex(vertices: &[Point], n: &Vec3) -> Result<()> {
        let size = vertices.len();
        let mut edge1 = vertices[size - 1] - vertices[size - 2];
        let mut edge2 = vertices[0] - vertices[size - 1];
        let positive = edge1.cross(&edge2).dot(n) > 0.0;

        for i in 1..size {
            if !utils::is_zero((vertices[i] - vertices[0]).dot(n)) {
                return Err(Error::construction(
                    "all vertices of a polygon must lay in the same plane",
                ));
            }
            edge1 = edge2;
            edge2 = vertices[i] - vertices[i - 1];
            let turn = utils::align_zero(edge1.cross(&edge2).dot(n));
            if turn == 0.0 {
                return Err(Error::construction(
                    "three consecutive polygon vertices lay on one line",
                ));
            }
            if positive != (turn > 0.0) {
                return Err(Error::construction(
                    "polygon vertices must be ordered and the polygon must be convex",
                ));
            }
        }
        Ok(())
    }

    pub fn from_config(config: PolygonConfig) -> Result<Self> {
        let vertices = config.vertices.into_iter().map(Point::from).collect();
        Ok(Self::new(vertices)?.with_surface(Surface::from_config(config.emission, config.material)))
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

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }
}
impl Intersectable for Polygon {
    fn try_hit(&self, ray: &Ray, max_distance: f64) -> Vec<HitRecord<'_>> {
        match self.plane.hit_distance(ray, max_distance) {
            Some(t) if edges_enclose(&self.vertices, ray) => vec![HitRecord::new(self, ray, t)],
            _ => Vec::new(),
        }
    }
}
impl Geometry for Polygon {
    fn normal_at(&self, _p: &Point) -> UnitVec {
        self.plane.normal()
    }

    fn emission(&self) -> Color {
        self.surface.emission
    }

    fn material(&self) -> &Material {
        &self.surface.material
    }
}

/// Whether the ray passes strictly inside the (convex) vertex loop
///
/// Every edge, seen from the ray origin, spans a side face of a pyramid; the
/// ray is inside when `D.((v_i - O) x (v_i+1 - O))` has the same sign for all
/// edges. A zero on any edge means the ray grazes an edge or vertex, which
/// counts as a miss.
fn edges_enclose(vertices: &[Point], ray: &Ray) -> bool {
    let mut positive = None;
    for (i, vertex) in vertices.iter().enumerate() {
        let next = vertices[(i + 1) % vertices.len()];
        let v1 = vertex - ray.orig;
        let v2 = next - ray.orig;
        let sign = utils::align_zero(ray.dir.dot(&v1.cross(&v2)));
        if sign == 0.0 {
            return false;
        }
        match positive {
            None => positive = Some(sign > 0.0),
            Some(p) if p != (sign > 0.0) => return false,
            _ => {}
        }
    }
    true
}

/// Polygon config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonConfig {
    pub vertices: Vec<SerdeVector>,
    #[serde(default)]
    pub emission: Option<SerdeVector>,
    #[serde(default)]
    pub material: MaterialConfig,
}

/// Triangle, the three-vertex polygon
#[derive(Debug, Clone)]
pub struct Triangle(Polygon);
impl Triangle {
    pub fn new(a: Point, b: Point, c: Point) -> Result<Self> {
        Ok(Self(Polygon::new(vec![a, b, c])?))
    }

    pub fn from_config(config: TriangleConfig) -> Result<Self> {
        let [a, b, c] = config.vertices;
        let polygon = Polygon::new(vec![a.into(), b.into(), c.into()])?;
        Ok(Self(polygon.with_surface(Surface::from_config(
            config.emission,
            config.material,
        ))))
    }

    pub fn with_emission(self, emission: Color) -> Self {
        Self(self.0.with_emission(emission))
    }

    pub fn with_material(self, material: Material) -> Self {
        Self(self.0.with_material(material))
    }

    pub fn vertices(&self) -> &[Point] {
        self.0.vertices()
    }
}
impl Intersectable for Triangle {
    fn try_hit(&self, ray: &Ray, max_distance: f64) -> Vec<HitRecord<'_>> {
        // The edge test is cheaper to reject on than the plane
        if !edges_enclose(self.vertices(), ray) {
            return Vec::new();
        }
        self.0
            .plane
            .hit_distance(ray, max_distance)
            .map(|t| HitRecord::new(self, ray, t))
            .into_iter()
            .collect()
    }
}
impl Geometry for Triangle {
    fn normal_at(&self, p: &Point) -> UnitVec {
        self.0.normal_at(p)
    }

    fn emission(&self) -> Color {
        self.0.emission()
    }

    fn material(&self) -> &Material {
        self.0.material()
    }
}

/// Triangle config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleConfig {
    pub vertices: [SerdeVector; 3],
    #[serde(default)]
    pub emission: Option<SerdeVector>,
    #[serde(default)]
    pub material: MaterialConfig,
}
