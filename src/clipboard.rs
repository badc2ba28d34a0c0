use crate::asset::SnapshotAsset;
use crate::sync::SyncEngine;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Single fixed file slot for copy/paste of snapshot values.
#[derive(Debug, Clone)]
pub struct ClipboardStore {
    path: PathBuf,
}

impl ClipboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores `source`'s values in the slot and returns the slot's asset.
    ///
    /// A source that already has its own file is first copied into a fresh
    /// container so the slot never shares identity or storage with it.
    pub fn put(&self, engine: &SyncEngine, source: &SnapshotAsset) -> Result<SnapshotAsset> {
        let mut staged = if source.is_persisted() {
            let mut fresh = engine.stage(SnapshotAsset::new(source.meta.name.clone()));
            engine.copy(&source.settings, &mut fresh, None)?;
            fresh
        } else {
            engine.stage(source.clone())
        };
        staged
            .persist_at(&self.path)
            .with_context(|| format!("Storing clipboard snapshot at {}", self.path.display()))?;
        info!(source = %source.meta.name, slot = %self.path.display(), "copied snapshot values to clipboard");
        Ok(staged.into_inner())
    }

    /// Loads the slot. `None` when the slot is empty or holds some other kind
    /// of file.
    pub fn get(&self) -> Result<Option<SnapshotAsset>> {
        if !self.has_snapshot() {
            debug!(slot = %self.path.display(), "clipboard holds no snapshot");
            return Ok(None);
        }
        SnapshotAsset::load_from_path(&self.path).map(Some)
    }

    pub fn has_snapshot(&self) -> bool {
        SnapshotAsset::is_snapshot_file(&self.path)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Removing clipboard snapshot {}", self.path.display()))?;
        }
        Ok(())
    }
}
