//! Implementation of materials

use serde::{Deserialize, Serialize};

use crate::{utils::SerdeVector, Vec3};

/// Phong shading coefficients
///
/// Every coefficient is a per-channel attenuation. Nothing forces
/// `kd + ks + kt + kr <= 1`; keeping materials physically plausible is up to
/// whoever writes the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Diffuse
    pub kd: Vec3,
    /// Specular
    pub ks: Vec3,
    /// Transparency
    pub kt: Vec3,
    /// Reflection
    pub kr: Vec3,
    pub shininess: i32,
}
impl Default for Material {
    fn default() -> Self {
        Self {
            kd: Vec3::zeros(),
            ks: Vec3::zeros(),
            kt: Vec3::zeros(),
            kr: Vec3::zeros(),
            shininess: 0,
        }
    }
}
impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kd(self, kd: Vec3) -> Self {
        Self { kd, ..self }
    }

    pub fn with_ks(self, ks: Vec3) -> Self {
        Self { ks, ..self }
    }

    pub fn with_kt(self, kt: Vec3) -> Self {
        Self { kt, ..self }
    }

    pub fn with_kr(self, kr: Vec3) -> Self {
        Self { kr, ..self }
    }

    pub fn with_shininess(self, shininess: i32) -> Self {
        Self { shininess, ..self }
    }

    pub fn from_config(config: MaterialConfig) -> Self {
        Self {
            kd: config.kd.into(),
            ks: config.ks.into(),
            kt: config.kt.into(),
            kr: config.kr.into(),
            shininess: config.shininess,
        }
    }
}

/// A coefficient is either the same for all channels or given per channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coefficient {
    Uniform(f64),
    Rgb(SerdeVector),
}
impl Default for Coefficient {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}
impl From<Coefficient> for Vec3 {
    fn from(c: Coefficient) -> Self {
        match c {
            Coefficient::Uniform(k) => Vec3::repeat(k),
            Coefficient::Rgb(v) => v.into(),
        }
    }
}

/// Material Config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub kd: Coefficient,
    pub ks: Coefficient,
    pub kt: Coefficient,
    pub kr: Coefficient,
    pub shininess: i32,
}
