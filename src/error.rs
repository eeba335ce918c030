//! Errors

/// Everything that can go wrong while building or rendering a scene
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A direction would have to be built from a zero-length vector
    #[error("zero vector cannot be used as a direction")]
    DegenerateVector,
    /// A geometry was described with invalid parameters
    #[error("invalid geometry: {0}")]
    Construction(String),
    /// Camera basis vectors must be perpendicular
    #[error("camera vectors v_to and v_up are not orthogonal")]
    Orthogonality,
    #[error("pixel ({j}, {i}) is outside the {nx}x{ny} grid")]
    PixelOutOfRange { j: u32, i: u32, nx: u32, ny: u32 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
