use crate::asset::SnapshotAsset;
use crate::live_state::LiveStateAdapter;
use crate::path_resolver::{object_path, resolve_sun};
use crate::scratch::{Scratch, ScratchPool};
use crate::snapshot::EnvironmentSnapshot;
use crate::transaction::TransactionRecorder;
use crate::validation;
use anyhow::Result;
use tracing::{debug, trace, Level};

pub const APPLY_LABEL: &str = "Apply Scene Environment Lighting";
pub const REPLACE_LABEL: &str = "Replace Scene Environment Lighting";

/// Moves settings between the live state and snapshots.
///
/// Passing a recorder opts a call into undo capture; `None` mutates silently.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    scratch: ScratchPool,
}

impl SyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scratch_pool(&self) -> &ScratchPool {
        &self.scratch
    }

    /// Temporary snapshot container released on every exit path.
    pub fn stage(&self, asset: SnapshotAsset) -> Scratch<SnapshotAsset> {
        self.scratch.acquire(asset)
    }

    /// Fresh snapshot populated from the live state. The live state is
    /// trusted, so nothing is validated here.
    pub fn read(&self, adapter: &dyn LiveStateAdapter) -> EnvironmentSnapshot {
        let mut snapshot = EnvironmentSnapshot::default();
        self.read_into(adapter, &mut snapshot);
        snapshot
    }

    /// Populates `snapshot` group by group. Fields behind an unsupported
    /// channel keep whatever `snapshot` already held.
    pub fn read_into(&self, adapter: &dyn LiveStateAdapter, snapshot: &mut EnvironmentSnapshot) {
        snapshot.fog = adapter.fog();
        snapshot.ambient = adapter.ambient();
        snapshot.reflection = adapter.reflection();
        snapshot.effects.set_levels(adapter.effect_levels());
        snapshot.sun_path = object_path(adapter.scene(), adapter.sun()).unwrap_or_default();

        match adapter.halo_texture().value() {
            Some(texture) => snapshot.effects.halo_texture = texture,
            None => debug!("halo texture channel unavailable, keeping previous value"),
        }
        match adapter.spot_cookie().value() {
            Some(texture) => snapshot.effects.spot_cookie = texture,
            None => debug!("spot cookie channel unavailable, keeping previous value"),
        }
    }

    /// Applies a validated copy of `snapshot` to the live state. `snapshot`
    /// itself is never modified, so out-of-range authored values survive.
    pub fn write(
        &self,
        snapshot: &EnvironmentSnapshot,
        adapter: &mut dyn LiveStateAdapter,
        mut recorder: Option<&mut dyn TransactionRecorder>,
    ) -> Result<()> {
        let mut working = self.scratch.acquire(snapshot.clone());
        validation::validate(&mut working);
        if tracing::enabled!(Level::DEBUG) {
            match validation::deviations(snapshot) {
                Ok(fields) if !fields.is_empty() => debug!(?fields, "normalized snapshot before applying"),
                _ => {}
            }
        }

        if let Some(recorder) = recorder.as_deref_mut() {
            recorder.capture(APPLY_LABEL, adapter.capture_backing()?);
        }

        adapter.set_fog(&working.fog)?;
        adapter.set_ambient(&working.ambient)?;
        adapter.set_reflection(&working.reflection)?;
        adapter.set_effect_levels(working.effects.levels())?;

        let sun = resolve_sun(adapter.scene(), &working.sun_path);
        if sun.is_none() && !working.sun_path.is_empty() {
            debug!(path = %working.sun_path, "sun path does not resolve to a light, clearing sun");
        }
        adapter.set_sun(sun)?;

        if !adapter.set_halo_texture(working.effects.halo_texture.as_ref())?.is_supported() {
            debug!("halo texture channel unavailable, value dropped");
        }
        if !adapter.set_spot_cookie(working.effects.spot_cookie.as_ref())?.is_supported() {
            debug!("spot cookie channel unavailable, value dropped");
        }

        if let Some(recorder) = recorder {
            let targets = adapter.backing_targets();
            trace!(objects = targets.len(), "marking live state dirty");
            recorder.mark_dirty(&targets);
        }
        Ok(())
    }

    /// Replaces `dest`'s settings with `source`, keeping `dest`'s identity
    /// and storage binding. No validation: this is a raw copy.
    pub fn copy(
        &self,
        source: &EnvironmentSnapshot,
        dest: &mut SnapshotAsset,
        recorder: Option<&mut dyn TransactionRecorder>,
    ) -> Result<()> {
        match recorder {
            Some(recorder) => {
                recorder.capture(REPLACE_LABEL, vec![dest.capture_state()?]);
                dest.settings = source.clone();
                recorder.mark_dirty(&[dest.record_target()]);
            }
            None => dest.settings = source.clone(),
        }
        trace!(dest = %dest.meta.name, "copied snapshot values");
        Ok(())
    }
}
