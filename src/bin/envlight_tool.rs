use anyhow::{Context, Result};
use clap::Parser;
use kestrel_envlight::asset::{AssetLibrary, SnapshotAsset};
use kestrel_envlight::cli::{Cli, ToolCommand};
use kestrel_envlight::commands::{CommandOutcome, Workspace};
use kestrel_envlight::config::ToolConfig;
use kestrel_envlight::memory_host::SceneEnvironment;
use kestrel_envlight::validation;
use std::path::Path;
use std::process;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.clone().or_else(|| std::env::var("LOG_LEVEL").ok()))?;
    let mut config = ToolConfig::load_or_default(&cli.config);
    let overrides = cli.overrides();
    config.apply_overrides(&overrides);
    if !overrides.is_empty() {
        info!(fields = ?overrides.applied_fields(), "applied command line overrides");
    }

    match cli.command.env_command() {
        Some((command, scene_path, selection)) => {
            let live = match scene_path {
                Some(path) => SceneEnvironment::load_from_path(path)?,
                None => SceneEnvironment::default(),
            };
            let mut workspace = Workspace::new(live, &config);
            workspace.select(selection.cloned());
            match workspace.execute(command)? {
                CommandOutcome::Applied(summary) => println!("{summary}"),
                CommandOutcome::Unavailable(reason) => {
                    println!("'{}' unavailable: {reason}", command.label());
                    return Ok(());
                }
            }
            let report = workspace.flush_dirty()?;
            for path in &report.assets_saved {
                println!("saved {}", path.display());
            }
            if let (true, Some(path)) = (report.live_dirty, scene_path) {
                workspace.live().save_to_path(path)?;
                println!("saved {}", path.display());
            }
            Ok(())
        }
        None => match &cli.command {
            ToolCommand::Validate { asset } => cmd_validate(asset),
            ToolCommand::Show { asset } => cmd_show(asset),
            ToolCommand::List { folder } => cmd_list(folder),
            _ => Ok(()),
        },
    }
}

fn init_logging(level: Option<String>) -> Result<()> {
    let log_level = match level.unwrap_or_else(|| "info".to_string()).to_ascii_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).context("Installing log subscriber")?;
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    let asset = SnapshotAsset::load_from_path(path)?;
    let fields = validation::deviations(&asset.settings)?;
    if fields.is_empty() {
        println!("'{}' is valid as authored.", asset.meta.name);
    } else {
        println!("'{}' will be corrected before applying:", asset.meta.name);
        for field in fields {
            println!("  - {field}");
        }
    }
    Ok(())
}

fn cmd_show(path: &Path) -> Result<()> {
    let asset = SnapshotAsset::load_from_path(path)?;
    println!("{:<12} {}", "Name", asset.meta.name);
    println!("{:<12} {}", "Id", asset.meta.id);
    println!("{:<12} {:?}", "Hide flags", asset.meta.hide_flags);
    println!("{:<12} {}", "Fingerprint", asset.settings.fingerprint()?.to_hex());
    for (group, description) in asset.settings.summary() {
        println!("{group:<12} {description}");
    }
    println!("{}", serde_json::to_string_pretty(&asset.settings)?);
    Ok(())
}

fn cmd_list(folder: &Path) -> Result<()> {
    let mut library = AssetLibrary::new(folder);
    library.refresh()?;
    println!("Snapshots in {}", library.root().display());
    println!("{:<32} {}", "Name", "Path");
    println!("{}", "-".repeat(72));
    for entry in library.entries() {
        println!("{:<32} {}", entry.name, entry.path.display());
    }
    Ok(())
}
