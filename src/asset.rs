use crate::snapshot::EnvironmentSnapshot;
use crate::transaction::{CapturedState, RecordTarget};
use anyhow::{bail, Context, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Tag written into every snapshot file so other JSON assets are never
/// mistaken for one.
pub const SNAPSHOT_KIND: &str = "scene_environment_lighting";

pub const SNAPSHOT_EXTENSION: &str = "json";

bitflags! {
    /// Host visibility flags carried by an asset but not part of its settings.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HideFlags: u32 {
        const HIDE_IN_HIERARCHY = 1;
        const HIDE_IN_INSPECTOR = 1 << 1;
        const DONT_SAVE_IN_EDITOR = 1 << 2;
        const NOT_EDITABLE = 1 << 3;
        const DONT_SAVE_IN_BUILD = 1 << 4;
        const DONT_UNLOAD_UNUSED_ASSET = 1 << 5;
    }
}

mod hide_flags_bits {
    use super::HideFlags;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flags: &HideFlags, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(flags.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HideFlags, D::Error> {
        u32::deserialize(deserializer).map(HideFlags::from_bits_truncate)
    }
}

/// Identity and storage metadata. Survives `Copy` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMeta {
    pub id: Uuid,
    pub name: String,
    #[serde(default, with = "hide_flags_bits")]
    pub hide_flags: HideFlags,
}

impl AssetMeta {
    pub fn fresh(name: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), hide_flags: HideFlags::empty() }
    }
}

/// A snapshot container: settings plus identity, optionally bound to a file.
#[derive(Debug, Clone)]
pub struct SnapshotAsset {
    pub meta: AssetMeta,
    pub settings: EnvironmentSnapshot,
    storage: Option<PathBuf>,
}

#[derive(Serialize)]
struct SnapshotRecordRef<'a> {
    kind: &'a str,
    meta: &'a AssetMeta,
    settings: &'a EnvironmentSnapshot,
}

#[derive(Deserialize)]
struct SnapshotRecord {
    kind: String,
    meta: AssetMeta,
    #[serde(default)]
    settings: EnvironmentSnapshot,
}

#[derive(Deserialize)]
struct KindProbe {
    #[serde(default)]
    kind: Option<String>,
}

impl SnapshotAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_settings(name, EnvironmentSnapshot::default())
    }

    pub fn with_settings(name: impl Into<String>, settings: EnvironmentSnapshot) -> Self {
        Self { meta: AssetMeta::fresh(name), settings, storage: None }
    }

    /// Whether the asset has its own backing file.
    pub fn is_persisted(&self) -> bool {
        self.storage.is_some()
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage.as_deref()
    }

    pub fn record_target(&self) -> RecordTarget {
        RecordTarget::Asset { id: self.meta.id, path: self.storage.clone() }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading snapshot file {}", path.display()))?;
        let record = serde_json::from_slice::<SnapshotRecord>(&bytes)
            .with_context(|| format!("Parsing snapshot file {}", path.display()))?;
        if record.kind != SNAPSHOT_KIND {
            bail!("{} holds a '{}' asset, not an environment snapshot", path.display(), record.kind);
        }
        Ok(Self { meta: record.meta, settings: record.settings, storage: Some(path.to_path_buf()) })
    }

    /// True when `path` is a readable file tagged as an environment snapshot.
    pub fn is_snapshot_file(path: impl AsRef<Path>) -> bool {
        let Ok(bytes) = fs::read(path.as_ref()) else {
            return false;
        };
        serde_json::from_slice::<KindProbe>(&bytes)
            .ok()
            .and_then(|probe| probe.kind)
            .is_some_and(|kind| kind == SNAPSHOT_KIND)
    }

    /// Writes to the bound file. Fails for assets that were never persisted.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.storage.as_deref() else {
            bail!("snapshot '{}' has no backing file", self.meta.name);
        };
        self.write_file(path)
    }

    /// Binds the asset to `path`, naming it after the file, and writes it.
    /// The binding only changes once the file is fully written.
    pub fn persist_at(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let previous_name = self.meta.name.clone();
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            self.meta.name = stem.to_string();
        }
        if let Err(err) = self.write_file(path) {
            self.meta.name = previous_name;
            return Err(err);
        }
        self.storage = Some(path.to_path_buf());
        Ok(())
    }

    fn write_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating snapshot directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.record())
            .with_context(|| format!("Encoding snapshot '{}'", self.meta.name))?;
        let staging = path.with_extension("json.tmp");
        if let Err(err) = fs::write(&staging, json.as_bytes()) {
            let _ = fs::remove_file(&staging);
            return Err(err).with_context(|| format!("Writing snapshot file {}", staging.display()));
        }
        if let Err(err) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(err).with_context(|| format!("Replacing snapshot file {}", path.display()));
        }
        Ok(())
    }

    fn record(&self) -> SnapshotRecordRef<'_> {
        SnapshotRecordRef { kind: SNAPSHOT_KIND, meta: &self.meta, settings: &self.settings }
    }

    pub fn capture_state(&self) -> Result<CapturedState> {
        let state = serde_json::to_value(self.record())
            .with_context(|| format!("Capturing snapshot '{}'", self.meta.name))?;
        Ok(CapturedState { target: self.record_target(), state })
    }

    /// Puts back metadata and settings captured by `capture_state`.
    pub fn restore_state(&mut self, state: &serde_json::Value) -> Result<()> {
        let record = SnapshotRecord::deserialize(state)
            .with_context(|| format!("Restoring snapshot '{}'", self.meta.name))?;
        self.meta = record.meta;
        self.settings = record.settings;
        Ok(())
    }
}

/// First free `<folder>/<stem>[ N].<ext>` path.
pub fn unique_asset_path(folder: &Path, file_name: &str) -> PathBuf {
    let candidate = folder.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let as_path = Path::new(file_name);
    let stem = as_path.file_stem().and_then(|s| s.to_str()).unwrap_or("EnvironmentLighting");
    let ext = as_path.extension().and_then(|e| e.to_str()).unwrap_or(SNAPSHOT_EXTENSION);
    (1u32..)
        .map(|n| folder.join(format!("{stem} {n}.{ext}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    pub name: String,
    pub path: PathBuf,
}

/// Snapshot files found directly under one folder.
pub struct AssetLibrary {
    root: PathBuf,
    entries: Vec<AssetDescriptor>,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), entries: Vec::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[AssetDescriptor] {
        &self.entries
    }

    pub fn refresh(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            bail!("{} is not a folder", self.root.display());
        }
        let mut grouped: BTreeMap<String, AssetDescriptor> = BTreeMap::new();
        for entry in
            fs::read_dir(&self.root).with_context(|| format!("Scanning snapshots under {}", self.root.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if !SnapshotAsset::is_snapshot_file(&path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            grouped.insert(name.to_lowercase(), AssetDescriptor { name: name.to_string(), path: path.clone() });
        }
        self.entries = grouped.into_values().collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_names_asset_after_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut asset = SnapshotAsset::new("scratch");
        assert!(!asset.is_persisted());
        asset.persist_at(dir.path().join("Sunset.json")).expect("persist");
        assert_eq!(asset.meta.name, "Sunset");
        assert!(asset.is_persisted());
        assert!(!dir.path().join("Sunset.json.tmp").exists());

        let loaded = SnapshotAsset::load_from_path(dir.path().join("Sunset.json")).expect("load");
        assert_eq!(loaded.meta, asset.meta);
        assert_eq!(loaded.settings, asset.settings);
    }

    #[test]
    fn foreign_json_is_not_a_snapshot() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("other.json");
        fs::write(&path, r#"{ "kind": "prefab", "meta": { "id": "00000000-0000-0000-0000-000000000000", "name": "x" } }"#)
            .unwrap();
        assert!(!SnapshotAsset::is_snapshot_file(&path));
        let err = SnapshotAsset::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("not an environment snapshot"));
        assert!(!SnapshotAsset::is_snapshot_file(dir.path().join("missing.json")));
    }

    #[test]
    fn unique_path_appends_counter() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = unique_asset_path(dir.path(), "EnvironmentLighting.json");
        assert_eq!(first, dir.path().join("EnvironmentLighting.json"));
        fs::write(&first, "{}").unwrap();
        let second = unique_asset_path(dir.path(), "EnvironmentLighting.json");
        assert_eq!(second, dir.path().join("EnvironmentLighting 1.json"));
    }

    #[test]
    fn hide_flags_persist_as_bits() {
        let mut meta = AssetMeta::fresh("Night");
        meta.hide_flags = HideFlags::NOT_EDITABLE | HideFlags::HIDE_IN_HIERARCHY;
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["hide_flags"], 9);
        let parsed: AssetMeta = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn library_lists_only_snapshots() {
        let dir = tempfile::tempdir().expect("temp dir");
        SnapshotAsset::new("a").persist_at(dir.path().join("Noon.json")).unwrap();
        SnapshotAsset::new("b").persist_at(dir.path().join("dusk.json")).unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();
        let mut library = AssetLibrary::new(dir.path());
        library.refresh().expect("scan");
        let names: Vec<_> = library.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["dusk", "Noon"]);
    }
}
