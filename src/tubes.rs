//! Tubes and cylinders

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    materials::{Material, MaterialConfig},
    objects::{Geometry, HitRecord, Intersectable, Plane, Surface},
    utils::{self, SerdeVector},
    Color, Point, Ray, UnitVec,
};

/// Infinite tube of constant radius around an axis
#[derive(Debug, Clone)]
pub struct Tube {
    pub axis: Ray,
    pub radius: f64,
    surface: Surface,
}
impl Tube {
    pub fn new(axis: Ray, radius: f64) -> Result<Self> {
        if radius <= 0.0 {
            return Err(Error::construction("tube radius must be positive"));
        }
        Ok(Self {
            axis,
            radius,
            surface: Surface::default(),
        })
    }

    pub fn from_config(config: TubeConfig) -> Result<Self> {
        let axis = axis_from_config(config.axis_origin, config.axis_direction)?;
        Ok(Self::new(axis, config.radius)?
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

    /// Signed distance of the projection of `p` along the axis
    fn axial_offset(&self, p: &Point) -> f64 {
        utils::align_zero((p - self.axis.orig).dot(&*self.axis.dir))
    }

    /// Distances to the lateral surface in `(0, max_distance]`, nearest first
    ///
    /// Only the parts of the ray direction and of the origin offset that are
    /// perpendicular to the axis matter, giving `a t^2 + b t + c = 0` with
    /// `|D_perp t + dP_perp|^2 = r^2`. Both parts are kept as raw vectors, so
    /// an origin lying on the axis (`dP_perp = 0`, `b = 0`) needs no normalizing.
    fn hit_distances(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        let va = self.axis.dir.into_inner();
        let d = ray.dir.into_inner();
        let dp = ray.orig - self.axis.orig;

        let d_perp = d - d.dot(&va) * va;
        let dp_perp = dp - dp.dot(&va) * va;

        let a = utils::align_zero(d_perp.norm_squared());
        // Parallel to the axis: no lateral crossing
        if a == 0.0 {
            return Vec::new();
        }
        let b = utils::align_zero(2.0 * d_perp.dot(&dp_perp));
        let c = utils::align_zero(dp_perp.norm_squared() - self.radius * self.radius);

        let discriminant = utils::align_zero(b * b - 4.0 * a * c);
        // Grazing the side counts as a miss, as for spheres
        if discriminant <= 0.0 {
            return Vec::new();
        }
        let sqrtd = discriminant.sqrt();
        [(-b - sqrtd) / (2.0 * a), (-b + sqrtd) / (2.0 * a)]
            .into_iter()
            .map(utils::align_zero)
            .filter(|&t| t > 0.0 && utils::align_zero(t - max_distance) <= 0.0)
            .collect()
    }
}
impl Intersectable for Tube {
    fn try_hit(&self, ray: &Ray, max_distance: f64) -> Vec<HitRecord<'_>> {
        self.hit_distances(ray, max_distance)
            .into_iter()
            .map(|t| HitRecord::new(self, ray, t))
            .collect()
    }
}
impl Geometry for Tube {
    fn normal_at(&self, p: &Point) -> UnitVec {
        let o = self.axis.get(self.axial_offset(p));
        // A point on the axis has no radial direction
        utils::direction(&o, p).unwrap_or(self.axis.dir)
    }

    fn emission(&self) -> Color {
        self.surface.emission
    }

    fn material(&self) -> &Material {
        &self.surface.material
    }
}

fn axis_from_config(origin: SerdeVector, direction: SerdeVector) -> Result<Ray> {
    Ray::new(origin.into(), direction.into())
        .map_err(|_| Error::construction("axis direction is the zero vector"))
}

/// Tube config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TubeConfig {
    pub axis_origin: SerdeVector,
    pub axis_direction: SerdeVector,
    pub radius: f64,
    #[serde(default)]
    pub emission: Option<SerdeVector>,
    #[serde(default)]
    pub material: MaterialConfig,
}

/// Tube cut to `height` along its axis and closed by two caps
#[derive(Debug, Clone)]
pub struct Cylinder {
    tube: Tube,
    height: f64,
    base: Plane,
    top: Plane,
}
impl Cylinder {
    /// The base cap is centered on the axis origin, the top cap `height` along the axis
    pub fn new(axis: Ray, radius: f64, height: f64) -> Result<Self> {
        if height <= 0.0 {
            return Err(Error::construction("cylinder height must be positive"));
        }
        let base = Plane::from_unit(axis.orig, axis.dir);
        let top = Plane::from_unit(axis.get(height), axis.dir);
        Ok(Self {
            tube: Tube::new(axis, radius)?,
            height,
            base,
            top,
        })
    }

    pub fn from_config(config: CylinderConfig) -> Result<Self> {
        let axis = axis_from_config(config.axis_origin, config.axis_direction)?;
        let mut cylinder = Self::new(axis, config.radius, config.height)?;
        cylinder.tube = cylinder
            .tube
            .with_surface(Surface::from_config(config.emission, config.material));
        Ok(cylinder)
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.tube = self.tube.with_emission(emission);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.tube = self.tube.with_material(material);
        self
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Cap hit distance, kept only inside the disk (or exactly at its center)
    fn cap_distance(&self, cap: &Plane, ray: &Ray, max_distance: f64) -> Option<f64> {
        let t = cap.hit_distance(ray, max_distance)?;
        let offset = ray.get(t) - cap.q0();
        let radius = self.tube.radius;
        if utils::is_zero(offset.norm()) || offset.norm_squared() < radius * radius {
            Some(t)
        } else {
            None
        }
    }
}
impl Intersectable for Cylinder {
    fn try_hit(&self, ray: &Ray, max_distance: f64) -> Vec<HitRecord<'_>> {
        // Side hits on a rim count only for rays crossing the cap planes, a ray
        // lying in a cap plane merely grazes the solid
        let crosses_caps = !utils::is_zero(ray.dir.dot(&*self.tube.axis.dir));
        let mut ts: Vec<f64> = self
            .tube
            .hit_distances(ray, max_distance)
            .into_iter()
            .filter(|&t| {
                let s = self.tube.axial_offset(&ray.get(t));
                let top = utils::align_zero(s - self.height);
                if s == 0.0 || top == 0.0 {
                    return crosses_caps;
                }
                s > 0.0 && top < 0.0
            })
            .collect();
        ts.extend(self.cap_distance(&self.base, ray, max_distance));
        ts.extend(self.cap_distance(&self.top, ray, max_distance));

        ts.sort_by(f64::total_cmp);
        // A hit on the rim can be reported by both a cap and the side
        ts.dedup_by(|a, b| utils::is_zero(*a - *b));
        // A line crosses a convex solid at most twice: keep entry and exit
        if ts.len() > 2 {
            ts.drain(1..ts.len() - 1);
        }

        ts.into_iter()
            .map(|t| HitRecord::new(self, ray, t))
            .collect()
    }
}
impl Geometry for Cylinder {
    fn normal_at(&self, p: &Point) -> UnitVec {
        let t = self.tube.axial_offset(p);
        // Both caps share the axis direction as their normal
        if t == 0.0 || utils::is_zero(self.height - t) {
            return self.tube.axis.dir;
        }
        self.tube.normal_at(p)
    }

    fn emission(&self) -> Color {
        self.tube.emission()
    }

    fn material(&self) -> &Material {
        self.tube.material()
    }
}

/// Cylinder config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CylinderConfig {
    pub axis_origin: SerdeVector,
    pub axis_direction: SerdeVector,
    pub radius: f64,
    pub height: f64,
    #[serde(default)]
    pub emission: Option<SerdeVector>,
    #[serde(default)]
    pub material: MaterialConfig,
}
