//! Cameras and configs for cameras
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::{self, SerdeVector};
use crate::{Point, Ray, UnitVec, Vec3};

/// Camera Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: SerdeVector,
    pub v_to: SerdeVector,
    pub v_up: SerdeVector,
    /// View plane width and height
    pub vp_size: [f64; 2],
    pub vp_distance: f64,
}

/// Pinhole camera looking through a rectangular view plane
#[derive(Debug, Clone)]
pub struct Camera {
    position: Point,
    v_to: UnitVec,
    v_up: UnitVec,
    v_right: UnitVec,
    width: f64,
    height: f64,
    distance: f64,
}
impl Camera {
    /// `v_to` and `v_up` must be perpendicular, `v_right` is derived from them
    pub fn new(position: Point, v_to: Vec3, v_up: Vec3) -> Result<Self> {
        let v_to = utils::try_normalize(v_to)?;
        let v_up = utils::try_normalize(v_up)?;
        if !utils::is_zero(v_to.dot(&*v_up)) {
            return Err(Error::Orthogonality);
        }
        let v_right = utils::try_normalize(v_to.cross(&*v_up))?;
        Ok(Self {
            position,
            v_to,
            v_up,
            v_right,
            width: 1.0,
            height: 1.0,
            distance: 1.0,
        })
    }

    pub fn with_vp_size(self, width: f64, height: f64) -> Result<Self> {
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::construction("view plane size must be positive"));
        }
        Ok(Self {
            width,
            height,
            ..self
        })
    }

    pub fn with_vp_distance(self, distance: f64) -> Result<Self> {
        if distance <= 0.0 {
            return Err(Error::construction("view plane distance must be positive"));
        }
        Ok(Self { distance, ..self })
    }

    pub fn from_config(config: CameraConfig) -> Result<Self> {
        let [width, height] = config.vp_size;
        Self::new(config.position.into(), config.v_to.into(), config.v_up.into())?
            .with_vp_size(width, height)?
            .with_vp_distance(config.vp_distance)
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Ray through the center of pixel `(j, i)` of an `nx` by `ny` grid
    ///
    /// `j` counts columns left to right, `i` counts rows top to bottom.
    pub fn construct_ray(&self, nx: u32, ny: u32, j: u32, i: u32) -> Result<Ray> {
        if j >= nx || i >= ny {
            return Err(Error::PixelOutOfRange { j, i, nx, ny });
        }
        let pc = self.position + self.distance * self.v_to.into_inner();

        let ry = self.height / f64::from(ny);
        let rx = self.width / f64::from(nx);

        let yi = -(f64::from(i) - f64::from(ny - 1) / 2.0) * ry;
        let xj = (f64::from(j) - f64::from(nx - 1) / 2.0) * rx;

        let mut pij = pc;
        if !utils::is_zero(xj) {
            pij += xj * self.v_right.into_inner();
        }
        if !utils::is_zero(yi) {
            pij += yi * self.v_up.into_inner();
        }

        Ray::new(self.position, pij - self.position)
    }
}
