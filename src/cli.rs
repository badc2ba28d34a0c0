use crate::commands::EnvCommand;
use crate::config::ToolConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/envlight.json";

#[derive(Parser, Debug)]
#[command(name = "envlight_tool")]
#[command(about = "Copy scene environment lighting between scenes and snapshot files")]
#[command(version)]
pub struct Cli {
    /// Tool config (JSON). Missing files fall back to defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Folder holding the clipboard slot
    #[arg(long)]
    pub clipboard_dir: Option<PathBuf>,

    /// trace, debug, info, warn or error. Falls back to `LOG_LEVEL`, then info.
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: ToolCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ToolCommand {
    /// Apply a snapshot to a scene
    Import {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long)]
        asset: PathBuf,
    },
    /// Save a scene's settings as a new snapshot in a folder
    Export {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long)]
        folder: PathBuf,
    },
    /// Replace a snapshot's values with a scene's settings
    Overwrite {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long)]
        asset: PathBuf,
    },
    /// Copy a snapshot's values to the clipboard slot
    CopyAsset {
        #[arg(long)]
        asset: PathBuf,
    },
    /// Paste the clipboard slot into a snapshot
    PasteAsset {
        #[arg(long)]
        asset: PathBuf,
    },
    /// Copy a scene's settings to the clipboard slot
    CopyScene {
        #[arg(long)]
        scene: PathBuf,
    },
    /// Apply the clipboard slot to a scene
    PasteScene {
        #[arg(long)]
        scene: PathBuf,
    },
    /// List the fields a snapshot would have corrected before being applied
    Validate {
        #[arg(long)]
        asset: PathBuf,
    },
    /// Print a snapshot with its fingerprint
    Show {
        #[arg(long)]
        asset: PathBuf,
    },
    /// List snapshot files in a folder
    List {
        #[arg(long)]
        folder: PathBuf,
    },
}

impl Cli {
    pub fn overrides(&self) -> ToolConfigOverrides {
        ToolConfigOverrides { clipboard_directory: self.clipboard_dir.clone() }
    }
}

impl ToolCommand {
    /// The workspace command this maps to, with its scene and selection.
    pub fn env_command(&self) -> Option<(EnvCommand, Option<&PathBuf>, Option<&PathBuf>)> {
        match self {
            ToolCommand::Import { scene, asset } => Some((EnvCommand::Import, Some(scene), Some(asset))),
            ToolCommand::Export { scene, folder } => Some((EnvCommand::ExportNew, Some(scene), Some(folder))),
            ToolCommand::Overwrite { scene, asset } => Some((EnvCommand::Overwrite, Some(scene), Some(asset))),
            ToolCommand::CopyAsset { asset } => Some((EnvCommand::CopyAsset, None, Some(asset))),
            ToolCommand::PasteAsset { asset } => Some((EnvCommand::PasteAsset, None, Some(asset))),
            ToolCommand::CopyScene { scene } => Some((EnvCommand::CopyFromLive, Some(scene), None)),
            ToolCommand::PasteScene { scene } => Some((EnvCommand::PasteToLive, Some(scene), None)),
            ToolCommand::Validate { .. } | ToolCommand::Show { .. } | ToolCommand::List { .. } => None,
        }
    }
}
