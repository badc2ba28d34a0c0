use crate::scene_graph::{SceneGraph, SceneObjectId};
use crate::snapshot::{AmbientSettings, AssetRef, EffectsSettings, FogSettings, ReflectionSettings};
use crate::transaction::{CapturedState, RecordTarget};
use anyhow::Result;

/// Result of touching a field the host may not expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAccess<T> {
    Value(T),
    Unsupported,
}

impl<T> FieldAccess<T> {
    pub fn is_supported(&self) -> bool {
        matches!(self, FieldAccess::Value(_))
    }

    pub fn value(self) -> Option<T> {
        match self {
            FieldAccess::Value(value) => Some(value),
            FieldAccess::Unsupported => None,
        }
    }
}

/// Halo and flare levels, the always-available part of the effects group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectLevels {
    pub halo_strength: f32,
    pub flare_strength: f32,
    pub flare_fade_speed: f32,
}

impl EffectsSettings {
    pub fn levels(&self) -> EffectLevels {
        EffectLevels {
            halo_strength: self.halo_strength,
            flare_strength: self.flare_strength,
            flare_fade_speed: self.flare_fade_speed,
        }
    }

    pub fn set_levels(&mut self, levels: EffectLevels) {
        self.halo_strength = levels.halo_strength;
        self.flare_strength = levels.flare_strength;
        self.flare_fade_speed = levels.flare_fade_speed;
    }
}

/// The host's live environment state, group by group.
///
/// Getters report what the host holds right now; the live state is trusted to
/// be valid. Setters may fail, and failures propagate to the caller as is.
pub trait LiveStateAdapter {
    fn fog(&self) -> FogSettings;
    fn set_fog(&mut self, fog: &FogSettings) -> Result<()>;

    fn ambient(&self) -> AmbientSettings;
    fn set_ambient(&mut self, ambient: &AmbientSettings) -> Result<()>;

    fn reflection(&self) -> ReflectionSettings;
    fn set_reflection(&mut self, reflection: &ReflectionSettings) -> Result<()>;

    fn effect_levels(&self) -> EffectLevels;
    fn set_effect_levels(&mut self, levels: EffectLevels) -> Result<()>;

    fn scene(&self) -> &dyn SceneGraph;
    fn sun(&self) -> Option<SceneObjectId>;
    fn set_sun(&mut self, sun: Option<SceneObjectId>) -> Result<()>;

    fn halo_texture(&self) -> FieldAccess<Option<AssetRef>> {
        FieldAccess::Unsupported
    }

    fn set_halo_texture(&mut self, _texture: Option<&AssetRef>) -> Result<FieldAccess<()>> {
        Ok(FieldAccess::Unsupported)
    }

    fn spot_cookie(&self) -> FieldAccess<Option<AssetRef>> {
        FieldAccess::Unsupported
    }

    fn set_spot_cookie(&mut self, _texture: Option<&AssetRef>) -> Result<FieldAccess<()>> {
        Ok(FieldAccess::Unsupported)
    }

    /// Objects that hold the live state, in the order they should be captured.
    fn backing_targets(&self) -> Vec<RecordTarget>;

    /// Full current state of every backing object, for undo capture.
    fn capture_backing(&self) -> Result<Vec<CapturedState>>;

    /// Puts back one captured backing object and returns the state it replaced.
    fn restore_backing(&mut self, captured: &CapturedState) -> Result<CapturedState>;
}
