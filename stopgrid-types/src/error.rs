use thiserror::Error;

/// Construction errors for geodetic values.
///
/// Every variant is raised at construction time; no value type is ever built
/// in a partially valid state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("Bad scale: {lat}/{lon}, divisions must be positive")]
    InvalidScale { lat: i64, lon: i64 },

    #[error("Invalid distance: {0}")]
    InvalidDistance(String),

    #[error("Too many digits, <={max} allowed: {digits}")]
    TooManyDigits { digits: u32, max: u32 },

    #[error("Region does not fit coded points: {0}")]
    CoderOverflow(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

pub type Result<T> = std::result::Result<T, GeoError>;
