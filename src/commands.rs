//! The command surface a host menu binds to: import/export between the live
//! state and snapshot assets, and copy/paste through the clipboard slot.

use crate::asset::{unique_asset_path, SnapshotAsset};
use crate::clipboard::ClipboardStore;
use crate::config::ToolConfig;
use crate::live_state::LiveStateAdapter;
use crate::sync::SyncEngine;
use crate::transaction::{CapturedState, RecordTarget, UndoHistory};
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvCommand {
    Import,
    ExportNew,
    Overwrite,
    CopyAsset,
    PasteAsset,
    CopyFromLive,
    PasteToLive,
}

impl EnvCommand {
    pub fn label(self) -> &'static str {
        match self {
            EnvCommand::Import => "Import to Scene",
            EnvCommand::ExportNew => "Export new from Scene",
            EnvCommand::Overwrite => "Overwrite from Scene",
            EnvCommand::CopyAsset => "Copy Values",
            EnvCommand::PasteAsset => "Paste Values",
            EnvCommand::CopyFromLive => "Copy Values from Scene",
            EnvCommand::PasteToLive => "Paste Values to Scene",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied(String),
    /// Preconditions not met; nothing was touched.
    Unavailable(&'static str),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub live_dirty: bool,
    pub assets_saved: Vec<PathBuf>,
}

/// Live state, clipboard, selection and undo history for one editing session.
pub struct Workspace<L: LiveStateAdapter> {
    engine: SyncEngine,
    live: L,
    clipboard: ClipboardStore,
    history: UndoHistory,
    export_file_name: String,
    selection: Option<PathBuf>,
    open_assets: BTreeMap<Uuid, SnapshotAsset>,
}

impl<L: LiveStateAdapter> Workspace<L> {
    pub fn new(live: L, config: &ToolConfig) -> Self {
        Self {
            engine: SyncEngine::new(),
            live,
            clipboard: ClipboardStore::new(config.clipboard.slot_path()),
            history: UndoHistory::new(config.undo.history_limit),
            export_file_name: config.export.file_name.clone(),
            selection: None,
            open_assets: BTreeMap::new(),
        }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn live(&self) -> &L {
        &self.live
    }

    pub fn live_mut(&mut self) -> &mut L {
        &mut self.live
    }

    pub fn clipboard(&self) -> &ClipboardStore {
        &self.clipboard
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn select(&mut self, path: Option<PathBuf>) {
        self.selection = path;
    }

    pub fn selection(&self) -> Option<&Path> {
        self.selection.as_deref()
    }

    /// The selected folder, or the folder holding the selected file.
    pub fn selected_folder(&self) -> Option<PathBuf> {
        let path = self.selection.as_deref()?;
        if path.is_dir() {
            return Some(path.to_path_buf());
        }
        path.parent().filter(|parent| parent.is_dir()).map(Path::to_path_buf)
    }

    pub fn selected_asset_path(&self) -> Option<&Path> {
        self.selection.as_deref().filter(|path| SnapshotAsset::is_snapshot_file(path))
    }

    pub fn is_enabled(&self, command: EnvCommand) -> bool {
        self.precondition(command).is_none()
    }

    fn precondition(&self, command: EnvCommand) -> Option<&'static str> {
        let has_asset = self.selected_asset_path().is_some();
        let has_clipboard = self.clipboard.has_snapshot();
        match command {
            EnvCommand::ExportNew if self.selected_folder().is_none() => Some("no folder selected"),
            EnvCommand::Import | EnvCommand::Overwrite | EnvCommand::CopyAsset if !has_asset => {
                Some("no snapshot asset selected")
            }
            EnvCommand::PasteAsset if !has_asset => Some("no snapshot asset selected"),
            EnvCommand::PasteAsset | EnvCommand::PasteToLive if !has_clipboard => {
                Some("clipboard holds no snapshot")
            }
            _ => None,
        }
    }

    pub fn execute(&mut self, command: EnvCommand) -> Result<CommandOutcome> {
        if let Some(reason) = self.precondition(command) {
            debug!(command = command.label(), reason, "command unavailable");
            return Ok(CommandOutcome::Unavailable(reason));
        }
        let summary = match command {
            EnvCommand::Import => self.import()?,
            EnvCommand::ExportNew => self.export_new()?,
            EnvCommand::Overwrite => self.overwrite()?,
            EnvCommand::CopyAsset => self.copy_asset()?,
            EnvCommand::PasteAsset => match self.paste_asset()? {
                Some(summary) => summary,
                None => return Ok(CommandOutcome::Unavailable("clipboard holds no snapshot")),
            },
            EnvCommand::CopyFromLive => self.copy_from_live()?,
            EnvCommand::PasteToLive => match self.paste_to_live()? {
                Some(summary) => summary,
                None => return Ok(CommandOutcome::Unavailable("clipboard holds no snapshot")),
            },
        };
        info!(command = command.label(), "{summary}");
        Ok(CommandOutcome::Applied(summary))
    }

    /// Selected asset, preferring the in-memory copy when one is pending save.
    fn selected_asset(&self) -> Result<SnapshotAsset> {
        let Some(path) = self.selected_asset_path() else {
            bail!("no snapshot asset selected");
        };
        let pending = self.open_assets.values().find(|asset| asset.storage_path() == Some(path));
        match pending {
            Some(asset) => Ok(asset.clone()),
            None => SnapshotAsset::load_from_path(path),
        }
    }

    fn import(&mut self) -> Result<String> {
        let asset = self.selected_asset()?;
        self.engine.write(&asset.settings, &mut self.live, Some(&mut self.history))?;
        Ok(format!("applied '{}' to the scene", asset.meta.name))
    }

    fn export_new(&mut self) -> Result<String> {
        let Some(folder) = self.selected_folder() else {
            bail!("no folder selected");
        };
        let snapshot = self.engine.read(&self.live);
        let mut staged = self.engine.stage(SnapshotAsset::with_settings("EnvironmentLighting", snapshot));
        let path = unique_asset_path(&folder, &self.export_file_name);
        staged.persist_at(&path)?;
        let asset = staged.into_inner();
        self.selection = Some(path.clone());
        Ok(format!("exported scene settings as '{}' to {}", asset.meta.name, path.display()))
    }

    fn overwrite(&mut self) -> Result<String> {
        let mut asset = self.selected_asset()?;
        let snapshot = self.engine.read(&self.live);
        self.engine.copy(&snapshot, &mut asset, Some(&mut self.history))?;
        let summary = format!("replaced '{}' with scene settings", asset.meta.name);
        self.open_assets.insert(asset.meta.id, asset);
        Ok(summary)
    }

    fn copy_asset(&mut self) -> Result<String> {
        let asset = self.selected_asset()?;
        self.clipboard.put(&self.engine, &asset)?;
        Ok(format!("copied '{}' to the clipboard", asset.meta.name))
    }

    fn paste_asset(&mut self) -> Result<Option<String>> {
        let Some(clip) = self.clipboard.get()? else {
            return Ok(None);
        };
        let mut asset = self.selected_asset()?;
        self.engine.copy(&clip.settings, &mut asset, Some(&mut self.history))?;
        let summary = format!("pasted clipboard values into '{}'", asset.meta.name);
        self.open_assets.insert(asset.meta.id, asset);
        Ok(Some(summary))
    }

    fn copy_from_live(&mut self) -> Result<String> {
        let snapshot = self.engine.read(&self.live);
        let staged = self.engine.stage(SnapshotAsset::with_settings("EnvironmentLighting", snapshot));
        self.clipboard.put(&self.engine, &staged)?;
        Ok("copied scene settings to the clipboard".to_string())
    }

    fn paste_to_live(&mut self) -> Result<Option<String>> {
        let Some(clip) = self.clipboard.get()? else {
            return Ok(None);
        };
        self.engine.write(&clip.settings, &mut self.live, Some(&mut self.history))?;
        Ok(Some("pasted clipboard values to the scene".to_string()))
    }

    pub fn undo(&mut self) -> Result<Option<String>> {
        let live = &mut self.live;
        let open_assets = &mut self.open_assets;
        self.history.undo(|states| restore_states(live, open_assets, states))
    }

    pub fn redo(&mut self) -> Result<Option<String>> {
        let live = &mut self.live;
        let open_assets = &mut self.open_assets;
        self.history.redo(|states| restore_states(live, open_assets, states))
    }

    /// Saves every dirty asset. Dirty live state is reported back: persisting
    /// the scene is the host's job.
    ///
    /// A target is only cleared once its save succeeds, so a failed flush
    /// keeps the pending edits for the next one.
    pub fn flush_dirty(&mut self) -> Result<FlushReport> {
        let mut report = FlushReport::default();
        let mut live_targets = Vec::new();
        for target in self.history.dirty_targets() {
            match &target {
                RecordTarget::RenderSettings | RecordTarget::LightmapSettings => {
                    report.live_dirty = true;
                    live_targets.push(target);
                    continue;
                }
                RecordTarget::Asset { id, .. } => {
                    if let Some(asset) = self.open_assets.get(id) {
                        asset.save()?;
                        if let Some(path) = asset.storage_path() {
                            report.assets_saved.push(path.to_path_buf());
                        }
                        self.open_assets.remove(id);
                    }
                }
            }
            self.history.clear_dirty(&target);
        }
        for target in &live_targets {
            self.history.clear_dirty(target);
        }
        Ok(report)
    }
}

fn restore_states<L: LiveStateAdapter>(
    live: &mut L,
    open_assets: &mut BTreeMap<Uuid, SnapshotAsset>,
    states: &[CapturedState],
) -> Result<Vec<CapturedState>> {
    let mut replaced = Vec::with_capacity(states.len());
    for captured in states {
        match &captured.target {
            RecordTarget::Asset { id, path } => {
                let mut asset = match (open_assets.remove(id), path) {
                    (Some(asset), _) => asset,
                    (None, Some(path)) => SnapshotAsset::load_from_path(path)?,
                    (None, None) => bail!("snapshot {id} has no backing file to restore"),
                };
                replaced.push(asset.capture_state()?);
                asset.restore_state(&captured.state)?;
                open_assets.insert(*id, asset);
            }
            _ => replaced.push(live.restore_backing(captured)?),
        }
    }
    Ok(replaced)
}
