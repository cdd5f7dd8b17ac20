//! Database configuration
//!
//! This module provides the serializable settings a [`Database`](crate::Database)
//! is built with: the indexing resolution, the covered region and the cell
//! ceiling for oversized entities.
use crate::validation::validate_region;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use stopgrid_types::coder::MAX_DIGITS;
use stopgrid_types::{BoundingBox, Point, PointCoder, Scale};

/// A geographic region given by its corners in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Region {
    /// Mainland Norway with its coastal waters.
    pub const NORWAY: Region = Region {
        min_lat: 57.0,
        min_lon: 4.0,
        max_lat: 72.0,
        max_lon: 32.0,
    };

    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// The region as a box of float corners, taken as given.
    pub fn to_box(&self) -> BoundingBox {
        Point::float(self.min_lat, self.min_lon).box_to(&Point::float(self.max_lat, self.max_lon))
    }

    fn validate(&self) -> Result<(), String> {
        let corners = [self.min_lat, self.min_lon, self.max_lat, self.max_lon];
        if corners.iter().any(|c| !c.is_finite()) {
            return Err("Region corners must be finite".to_string());
        }
        if self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(format!(
                "Region minimum ({}, {}) is not south-west of maximum ({}, {})",
                self.min_lat, self.min_lon, self.max_lat, self.max_lon
            ));
        }
        let region = self.to_box();
        validate_region(&region).map_err(|e| e.to_string())?;
        PointCoder::new(MAX_DIGITS, &region).map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::NORWAY
    }
}

/// Database configuration
///
/// # Example
///
/// ```rust
/// use stopgrid::{Config, Scale};
///
/// let config = Config::default();
/// assert_eq!(config.scale, Scale::DEFAULT);
///
/// let json = r#"{
///     "scale": { "lat": 200, "lon": 100 },
///     "max_cells_per_entity": 1024
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.scale, Scale::of(200, 100).unwrap());
/// assert!(config.region.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Most grid cells one entity may occupy before it is checked on every
    /// query instead of being bucketed.
    #[serde(default = "Config::default_max_cells_per_entity")]
    pub max_cells_per_entity: u64,

    /// Indexing resolution (default: 100 x 50 divisions per degree)
    #[serde(default)]
    pub scale: Scale,

    /// Covered region, [`Region::NORWAY`] when absent
    #[serde(default)]
    pub region: Option<Region>,
}

impl Config {
    const fn default_max_cells_per_entity() -> u64 {
        65_536
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_max_cells_per_entity(mut self, max_cells: u64) -> Self {
        self.max_cells_per_entity = max_cells;
        self
    }

    /// The configured region, or the default one.
    pub fn region_or_default(&self) -> Region {
        self.region.unwrap_or_default()
    }

    pub fn region_box(&self) -> BoundingBox {
        self.region_or_default().to_box()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_cells_per_entity == 0 {
            return Err("Max cells per entity must be greater than zero".to_string());
        }

        if let Some(region) = &self.region {
            region.validate()?;
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cells_per_entity: Self::default_max_cells_per_entity(),
            scale: Scale::default(),
            region: None,
        }
    }
}
