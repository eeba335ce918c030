//! The scene a tracer renders
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    cameras::CameraConfig,
    error::Result,
    lights::{self, AmbientLight, AmbientLightConfig, LightConfig, LightObj},
    objects::{Geometries, GeometriesConfig, GeometryConfig, IntersectableObj},
    utils::SerdeVector,
    Color,
};

/// Everything that is rendered, read-only while tracing
pub struct Scene {
    pub name: String,
    pub background: Color,
    pub ambient: AmbientLight,
    pub geometries: Geometries,
    pub lights: Vec<LightObj>,
}
impl Scene {
    /// Empty scene with a black background and no ambient light
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: Color::zeros(),
            ambient: AmbientLight::none(),
            geometries: Geometries::new(),
            lights: Vec::new(),
        }
    }

    pub fn with_background(self, background: Color) -> Self {
        Self { background, ..self }
    }

    pub fn with_ambient(self, ambient: AmbientLight) -> Self {
        Self { ambient, ..self }
    }

    pub fn with_geometries(self, geometries: Geometries) -> Self {
        Self { geometries, ..self }
    }

    pub fn with_lights(self, lights: Vec<LightObj>) -> Self {
        Self { lights, ..self }
    }

    pub fn add_geometry(&mut self, obj: IntersectableObj) {
        self.geometries.add(obj);
    }

    pub fn add_light(&mut self, light: LightObj) {
        self.lights.push(light);
    }

    /// Build the scene part of a config, the camera is left to the caller
    pub fn from_config(config: SceneConfig) -> Result<Self> {
        let geometries = Geometries::from_config(GeometriesConfig {
            objects: config.geometries,
        })?;
        let lights = config
            .lights
            .into_iter()
            .map(lights::Generator::from_config)
            .collect::<Result<Vec<_>>>()?;
        let scene = Self::new(config.name)
            .with_background(config.background.into())
            .with_ambient(
                config
                    .ambient
                    .map(AmbientLight::from_config)
                    .unwrap_or_default(),
            )
            .with_geometries(geometries)
            .with_lights(lights);
        info!(
            "Scene {:?}: {} top-level geometries, {} lights",
            scene.name,
            scene.geometries.len(),
            scene.lights.len()
        );
        Ok(scene)
    }
}

/// Scene Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub name: String,
    pub camera: CameraConfig,
    #[serde(default = "black")]
    pub background: SerdeVector,
    #[serde(default)]
    pub ambient: Option<AmbientLightConfig>,
    #[serde(default)]
    pub geometries: Vec<GeometryConfig>,
    #[serde(default)]
    pub lights: Vec<LightConfig>,
}

fn black() -> SerdeVector {
    SerdeVector([0.0, 0.0, 0.0])
}
