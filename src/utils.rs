//! Utils

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    Color, Point, UnitVec, Vec3, EPSILON,
};

/// Snap values within `EPSILON` of zero to exactly zero
pub fn align_zero(val: f64) -> f64 {
    if is_zero(val) {
        0.0
    } else {
        val
    }
}

pub fn is_zero(val: f64) -> bool {
    val.abs() < EPSILON
}

/// Normalize a vector, refusing (near-)zero vectors
pub fn try_normalize(v: Vec3) -> Result<UnitVec> {
    UnitVec::try_new(v, EPSILON).ok_or(Error::DegenerateVector)
}

/// Unit direction pointing from `from` to `to`
pub fn direction(from: &Point, to: &Point) -> Result<UnitVec> {
    try_normalize(to - from)
}

/// Mirror `v` about the normal `n`: `v - 2(v.n)n`
pub fn reflect(v: &Vec3, n: &Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Convert a linear color to an 8-bit pixel, clamping each channel to [0, 1]
pub fn get_pixel(color: &Color) -> Rgb<u8> {
    Rgb([
        scale_color(color[0]),
        scale_color(color[1]),
        scale_color(color[2]),
    ])
}

/// scale the color to between 0 and 255
fn scale_color(val: f64) -> u8 {
    (256.0 * val.min(0.999).max(0.0)) as u8
}

/// A vector written as `[x, y, z]` in config files
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerdeVector(pub [f64; 3]);
impl From<SerdeVector> for Vec3 {
    fn from(v: SerdeVector) -> Self {
        Vec3::new(v.0[0], v.0[1], v.0[2])
    }
}
impl From<Vec3> for SerdeVector {
    fn from(v: Vec3) -> Self {
        Self([v[0], v[1], v[2]])
    }
}
