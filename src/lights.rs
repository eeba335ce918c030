//! Light sources
//!
//! Directions returned by [`LightSource::direction_at`] point the way the light
//! travels, from the source toward the lit point.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    utils::{self, SerdeVector},
    Color, Point, UnitVec, Vec3,
};

pub type LightObj = Box<dyn LightSource + Send + Sync>;

/// Fill light that reaches every point equally
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    intensity: Color,
}
impl AmbientLight {
    /// `i_a` scaled per channel by the attenuation `k_a`
    pub fn new(i_a: Color, k_a: Vec3) -> Self {
        Self {
            intensity: i_a.component_mul(&k_a),
        }
    }

    /// No ambient light at all
    pub fn none() -> Self {
        Self {
            intensity: Color::zeros(),
        }
    }

    pub fn intensity(&self) -> Color {
        self.intensity
    }

    pub fn from_config(config: AmbientLightConfig) -> Self {
        Self::new(config.intensity.into(), config.ka.into())
    }
}
impl Default for AmbientLight {
    fn default() -> Self {
        Self::none()
    }
}

/// Ambient light config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientLightConfig {
    pub intensity: SerdeVector,
    #[serde(default = "unit_attenuation")]
    pub ka: SerdeVector,
}

fn unit_attenuation() -> SerdeVector {
    SerdeVector([1.0, 1.0, 1.0])
}

/// A light that shines on the scene from somewhere
pub trait LightSource {
    /// Intensity arriving at `p`
    fn intensity_at(&self, p: &Point) -> Color;

    /// Direction from the light toward `p`, `None` when `p` is the light itself
    fn direction_at(&self, p: &Point) -> Option<UnitVec>;

    /// How far the light is from `p`
    fn distance_to(&self, p: &Point) -> f64;
}

/// Light from infinitely far away, same direction and intensity everywhere
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    intensity: Color,
    direction: UnitVec,
}
impl DirectionalLight {
    pub fn new(intensity: Color, direction: Vec3) -> Result<Self> {
        Ok(Self {
            intensity,
            direction: utils::try_normalize(direction)?,
        })
    }
}
impl LightSource for DirectionalLight {
    fn intensity_at(&self, _p: &Point) -> Color {
        self.intensity
    }

    fn direction_at(&self, _p: &Point) -> Option<UnitVec> {
        Some(self.direction)
    }

    fn distance_to(&self, _p: &Point) -> f64 {
        f64::INFINITY
    }
}

/// Omnidirectional light at a position, fading as `1 / (kc + kl d + kq d^2)`
#[derive(Debug, Clone)]
pub struct PointLight {
    intensity: Color,
    position: Point,
    kc: f64,
    kl: f64,
    kq: f64,
}
impl PointLight {
    pub fn new(intensity: Color, position: Point) -> Self {
        Self {
            intensity,
            position,
            kc: 1.0,
            kl: 0.0,
            kq: 0.0,
        }
    }

    pub fn with_kc(self, kc: f64) -> Self {
        Self { kc, ..self }
    }

    pub fn with_kl(self, kl: f64) -> Self {
        Self { kl, ..self }
    }

    pub fn with_kq(self, kq: f64) -> Self {
        Self { kq, ..self }
    }

    pub fn position(&self) -> Point {
        self.position
    }
}
impl LightSource for PointLight {
    fn intensity_at(&self, p: &Point) -> Color {
        let d = self.distance_to(p);
        self.intensity / (self.kc + self.kl * d + self.kq * d * d)
    }

    fn direction_at(&self, p: &Point) -> Option<UnitVec> {
        utils::direction(&self.position, p).ok()
    }

    fn distance_to(&self, p: &Point) -> f64 {
        (p - self.position).norm()
    }
}

/// Point light that only shines toward one side, strongest along its axis
#[derive(Debug, Clone)]
pub struct SpotLight {
    point: PointLight,
    direction: UnitVec,
}
impl SpotLight {
    pub fn new(intensity: Color, position: Point, direction: Vec3) -> Result<Self> {
        Ok(Self {
            point: PointLight::new(intensity, position),
            direction: utils::try_normalize(direction)?,
        })
    }

    pub fn with_kc(self, kc: f64) -> Self {
        Self {
            point: self.point.with_kc(kc),
            ..self
        }
    }

    pub fn with_kl(self, kl: f64) -> Self {
        Self {
            point: self.point.with_kl(kl),
            ..self
        }
    }

    pub fn with_kq(self, kq: f64) -> Self {
        Self {
            point: self.point.with_kq(kq),
            ..self
        }
    }
}
impl LightSource for SpotLight {
    fn intensity_at(&self, p: &Point) -> Color {
        let cos = self
            .direction_at(p)
            .map_or(0.0, |l| self.direction.dot(&*l).max(0.0));
        self.point.intensity_at(p) * cos
    }

    fn direction_at(&self, p: &Point) -> Option<UnitVec> {
        self.point.direction_at(p)
    }

    fn distance_to(&self, p: &Point) -> f64 {
        self.point.distance_to(p)
    }
}

/// Config for any light source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LightConfig {
    Directional {
        intensity: SerdeVector,
        direction: SerdeVector,
    },
    Point {
        intensity: SerdeVector,
        position: SerdeVector,
        #[serde(default)]
        attenuation: AttenuationConfig,
    },
    Spot {
        intensity: SerdeVector,
        position: SerdeVector,
        direction: SerdeVector,
        #[serde(default)]
        attenuation: AttenuationConfig,
    },
}

/// Distance falloff coefficients
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AttenuationConfig {
    pub kc: f64,
    pub kl: f64,
    pub kq: f64,
}
impl Default for AttenuationConfig {
    fn default() -> Self {
        Self {
            kc: 1.0,
            kl: 0.0,
            kq: 0.0,
        }
    }
}

/// Generator from config
pub struct Generator;
impl Generator {
    pub fn from_config(config: LightConfig) -> Result<LightObj> {
        let degenerate = |_| Error::construction("light direction is the zero vector");
        Ok(match config {
            LightConfig::Directional {
                intensity,
                direction,
            } => Box::new(
                DirectionalLight::new(intensity.into(), direction.into()).map_err(degenerate)?,
            ),
            LightConfig::Point {
                intensity,
                position,
                attenuation,
            } => Box::new(
                PointLight::new(intensity.into(), position.into())
                    .with_kc(attenuation.kc)
                    .with_kl(attenuation.kl)
                    .with_kq(attenuation.kq),
            ),
            LightConfig::Spot {
                intensity,
                position,
                direction,
                attenuation,
            } => Box::new(
                SpotLight::new(intensity.into(), position.into(), direction.into())
                    .map_err(degenerate)?
                    .with_kc(attenuation.kc)
                    .with_kl(attenuation.kl)
                    .with_kq(attenuation.kq),
            ),
        })
    }
}
