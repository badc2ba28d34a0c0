use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct ClipboardConfig {
    #[serde(default = "ClipboardConfig::default_directory")]
    pub directory: PathBuf,
    #[serde(default = "ClipboardConfig::default_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "ExportConfig::default_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UndoConfig {
    #[serde(default = "UndoConfig::default_history_limit")]
    pub history_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub clipboard: ClipboardConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub undo: UndoConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ToolConfigOverrides {
    pub clipboard_directory: Option<PathBuf>,
}

impl ClipboardConfig {
    fn default_directory() -> PathBuf {
        PathBuf::from("assets/environment")
    }

    fn default_file_name() -> String {
        "EnvironmentLighting_Clipboard.json".to_string()
    }

    pub fn slot_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self { directory: Self::default_directory(), file_name: Self::default_file_name() }
    }
}

impl ExportConfig {
    fn default_file_name() -> String {
        "EnvironmentLighting.json".to_string()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { file_name: Self::default_file_name() }
    }
}

impl UndoConfig {
    const fn default_history_limit() -> usize {
        64
    }
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self { history_limit: Self::default_history_limit() }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            clipboard: ClipboardConfig::default(),
            export: ExportConfig::default(),
            undo: UndoConfig::default(),
        }
    }
}

impl ToolConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ToolConfigOverrides) {
        if let Some(directory) = &overrides.clipboard_directory {
            self.clipboard.directory = directory.clone();
        }
    }
}

impl ToolConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.clipboard_directory.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.clipboard_directory.is_some() {
            fields.push("clipboard.directory");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: ToolConfig = serde_json::from_str(r#"{ "undo": { "history_limit": 8 } }"#).expect("parse");
        assert_eq!(cfg.undo.history_limit, 8);
        assert_eq!(cfg.export.file_name, "EnvironmentLighting.json");
        assert_eq!(cfg.clipboard.slot_path(), PathBuf::from("assets/environment/EnvironmentLighting_Clipboard.json"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = ToolConfig::load_or_default("does/not/exist.json");
        assert_eq!(cfg.undo.history_limit, 64);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("envlight.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ToolConfig::load(&path).is_err());
        let cfg = ToolConfig::load_or_default(&path);
        assert_eq!(cfg.export.file_name, "EnvironmentLighting.json");
    }

    #[test]
    fn overrides_replace_selected_fields() {
        let mut cfg = ToolConfig::default();
        let overrides =
            ToolConfigOverrides { clipboard_directory: Some(PathBuf::from("/tmp/clip")) };
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.clipboard.directory, PathBuf::from("/tmp/clip"));
        assert_eq!(overrides.applied_fields(), vec!["clipboard.directory"]);
        assert!(!overrides.is_empty());
    }
}
