//! Snapshot persistence.
//!
//! A snapshot holds every entity of a database and the scale it was indexed
//! at. Indexes and derived geometry are not stored; they are rebuilt when a
//! snapshot is loaded. Snapshots are written to a temporary file and renamed
//! over the previous one.

use crate::config::Config;
use crate::db::Database;
use crate::entity::Entity;
use crate::error::{Result, StopgridError};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use stopgrid_types::Scale;

const SNAPSHOT_MAGIC: &[u8] = b"STOPGRID_SNAPSHOT";
const SNAPSHOT_VERSION: u8 = 1;

/// What a snapshot file holds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotContents {
    pub scale: Scale,
    pub entities: Vec<Entity>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    scale: Scale,
    entities: &'a [Entity],
}

pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the snapshot. A missing or empty file holds no entities.
    pub fn load(&self) -> Result<SnapshotContents> {
        if !self.exists() {
            return Ok(SnapshotContents::default());
        }

        let file = File::open(&self.path)?;
        let metadata = file.metadata()?;
        if metadata.len() == 0 {
            return Ok(SnapshotContents::default());
        }

        let mut reader = BufReader::new(file);

        let mut magic = vec![0u8; SNAPSHOT_MAGIC.len()];
        reader.read_exact(&mut magic)?;
        if magic != SNAPSHOT_MAGIC {
            return Err(StopgridError::InvalidFormat);
        }

        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;
        if version[0] != SNAPSHOT_VERSION {
            return Err(StopgridError::InvalidFormat);
        }

        let contents: SnapshotContents = bincode::deserialize_from(&mut reader)?;
        Ok(contents)
    }

    pub fn save(&self, scale: Scale, entities: &[Entity]) -> Result<()> {
        let temp_path = self.temp_path();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let mut writer = BufWriter::new(file);

        writer.write_all(SNAPSHOT_MAGIC)?;
        writer.write_all(&[SNAPSHOT_VERSION])?;
        bincode::serialize_into(&mut writer, &SnapshotRef { scale, entities })?;

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp_path, &self.path)?;
        self.sync_parent_dir()?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        if let Some(name) = temp.file_name() {
            let mut new_name = name.to_string_lossy().into_owned();
            new_name.push_str(".tmp");
            temp.set_file_name(new_name);
        }
        temp
    }

    fn sync_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
        Ok(())
    }
}

impl Database {
    /// Write every entity to a snapshot file.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let entities: Vec<Entity> = self.entities().cloned().collect();
        SnapshotFile::new(path).save(self.scale(), &entities)?;
        info!("Saved {} entities to snapshot", entities.len());
        Ok(())
    }

    /// Rebuild a database from a snapshot file with `config`.
    pub fn load_snapshot<P: AsRef<Path>>(path: P, config: Config) -> Result<Database> {
        let snapshot = SnapshotFile::new(path);
        let contents = snapshot.load()?;
        if contents.scale != config.scale {
            info!(
                "Snapshot {} was indexed at {}, reindexing at {}",
                snapshot.path().display(),
                contents.scale,
                config.scale
            );
        }
        Database::new(config, contents.entities)
    }
}
