//! Database builder for flexible configuration
//!
//! This module provides a builder pattern for collecting the entities of a
//! network and the settings it is indexed with, optionally seeded from a
//! snapshot file.

use crate::config::{Config, Region};
use crate::db::Database;
use crate::entity::Entity;
use crate::error::Result;
#[cfg(feature = "snapshot")]
use crate::snapshot::SnapshotFile;
#[cfg(feature = "snapshot")]
use std::path::PathBuf;
use stopgrid_types::Scale;

/// Builder for a [`Database`].
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    #[cfg(feature = "snapshot")]
    snapshot_path: Option<PathBuf>,
    config: Config,
    entities: Vec<Entity>,
}

impl DatabaseBuilder {
    /// Create a new builder with the default configuration and no entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the whole configuration, replacing earlier settings.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.config.region = Some(region);
        self
    }

    pub fn max_cells_per_entity(mut self, max_cells: u64) -> Self {
        self.config.max_cells_per_entity = max_cells;
        self
    }

    pub fn entity(mut self, entity: impl Into<Entity>) -> Self {
        self.entities.push(entity.into());
        self
    }

    pub fn entities<I>(mut self, entities: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Entity>,
    {
        self.entities.extend(entities.into_iter().map(Into::into));
        self
    }

    /// Seed the database from a snapshot file. Entities from the snapshot
    /// come before the ones added to the builder. A missing or empty file
    /// adds nothing.
    #[cfg(feature = "snapshot")]
    pub fn snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Build the database. Loads the snapshot first if one is configured.
    pub fn build(self) -> Result<Database> {
        #[cfg(feature = "snapshot")]
        if let Some(path) = &self.snapshot_path {
            let mut entities = SnapshotFile::new(path).load()?.entities;
            entities.extend(self.entities);
            return Database::new(self.config, entities);
        }

        Database::new(self.config, self.entities)
    }
}
