pub mod asset;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod live_state;
pub mod memory_host;
pub mod modes;
pub mod path_resolver;
pub mod scene_graph;
pub mod scratch;
pub mod snapshot;
pub mod sync;
pub mod transaction;
pub mod validation;

pub use commands::{CommandOutcome, EnvCommand, Workspace};
pub use live_state::{FieldAccess, LiveStateAdapter};
pub use snapshot::EnvironmentSnapshot;
pub use sync::SyncEngine;
