use crate::live_state::{EffectLevels, FieldAccess, LiveStateAdapter};
use crate::modes::{AmbientMode, DefaultReflectionMode, EnumValue, FogMode, ReflectionCubemapCompression};
use crate::scene_graph::{SceneGraph, SceneObjectId, SceneTree};
use crate::snapshot::{
    AmbientProbe, AmbientSettings, AssetRef, ColorData, EffectsSettings, FogSettings, ReflectionSettings,
};
use crate::transaction::{CapturedState, RecordTarget};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Render settings object of a scene, as the host stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettingsState {
    pub fog: bool,
    pub fog_start_distance: f32,
    pub fog_end_distance: f32,
    pub fog_mode: FogMode,
    pub fog_color: ColorData,
    pub fog_density: f32,
    pub ambient_mode: AmbientMode,
    pub ambient_sky_color: ColorData,
    pub ambient_equator_color: ColorData,
    pub ambient_ground_color: ColorData,
    pub ambient_intensity: f32,
    pub ambient_light: ColorData,
    pub ambient_probe: AmbientProbe,
    pub subtractive_shadow_color: ColorData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skybox: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun: Option<SceneObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_reflection: Option<AssetRef>,
    pub reflection_intensity: f32,
    pub reflection_bounces: i32,
    pub default_reflection_mode: DefaultReflectionMode,
    pub default_reflection_resolution: i32,
    pub halo_strength: f32,
    pub flare_strength: f32,
    pub flare_fade_speed: f32,
    /// Serialized-only fields. `None` when the host build does not expose them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<HiddenRenderSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HiddenRenderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo_texture: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_cookie: Option<AssetRef>,
}

impl Default for RenderSettingsState {
    fn default() -> Self {
        let fog = FogSettings::default();
        let ambient = AmbientSettings::default();
        let reflection = ReflectionSettings::default();
        let effects = EffectsSettings::default();
        Self {
            fog: fog.enabled,
            fog_start_distance: fog.start_distance,
            fog_end_distance: fog.end_distance,
            fog_mode: fog.mode.resolve(),
            fog_color: fog.color,
            fog_density: fog.density,
            ambient_mode: ambient.mode.resolve(),
            ambient_sky_color: ambient.sky_color,
            ambient_equator_color: ambient.equator_color,
            ambient_ground_color: ambient.ground_color,
            ambient_intensity: ambient.intensity,
            ambient_light: ambient.flat_color,
            ambient_probe: ambient.probe,
            subtractive_shadow_color: ambient.subtractive_shadow_color,
            skybox: None,
            sun: None,
            custom_reflection: None,
            reflection_intensity: reflection.intensity,
            reflection_bounces: reflection.bounces,
            default_reflection_mode: reflection.mode.resolve(),
            default_reflection_resolution: reflection.resolution,
            halo_strength: effects.halo_strength,
            flare_strength: effects.flare_strength,
            flare_fade_speed: effects.flare_fade_speed,
            hidden: Some(HiddenRenderSettings::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightmapSettingsState {
    pub reflection_cubemap_compression: ReflectionCubemapCompression,
}

impl Default for LightmapSettingsState {
    fn default() -> Self {
        Self { reflection_cubemap_compression: ReflectionCubemapCompression::Auto }
    }
}

/// In-process live state: one scene's render and lightmap settings plus its
/// object hierarchy. Stands in for the host when driving the engine from
/// tools and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneEnvironment {
    #[serde(default)]
    pub render_settings: RenderSettingsState,
    #[serde(default)]
    pub lightmap_settings: LightmapSettingsState,
    #[serde(default)]
    pub scene: SceneTree,
}

impl SceneEnvironment {
    pub fn new(scene: SceneTree) -> Self {
        Self { scene, ..Self::default() }
    }

    /// Models a host build that does not expose the serialized-only fields.
    pub fn without_hidden_channel(mut self) -> Self {
        self.render_settings.hidden = None;
        self
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading scene environment {}", path.display()))?;
        let environment = serde_json::from_slice::<SceneEnvironment>(&bytes)
            .with_context(|| format!("Parsing scene environment {}", path.display()))?;
        environment
            .scene
            .validate()
            .with_context(|| format!("Validating scene hierarchy in {}", path.display()))?;
        Ok(environment)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating scene directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json.as_bytes())
            .with_context(|| format!("Writing scene environment {}", path.display()))?;
        Ok(())
    }

    fn capture(&self, target: &RecordTarget) -> Result<CapturedState> {
        let state = match target {
            RecordTarget::RenderSettings => serde_json::to_value(&self.render_settings)?,
            RecordTarget::LightmapSettings => serde_json::to_value(&self.lightmap_settings)?,
            RecordTarget::Asset { .. } => bail!("assets are not part of the scene environment"),
        };
        Ok(CapturedState { target: target.clone(), state })
    }

    /// Puts back a captured object and returns the state it replaced.
    pub fn restore(&mut self, captured: &CapturedState) -> Result<CapturedState> {
        let replaced = self.capture(&captured.target)?;
        match captured.target {
            RecordTarget::RenderSettings => {
                self.render_settings = RenderSettingsState::deserialize(&captured.state)
                    .context("Restoring render settings")?;
            }
            RecordTarget::LightmapSettings => {
                self.lightmap_settings = LightmapSettingsState::deserialize(&captured.state)
                    .context("Restoring lightmap settings")?;
            }
            RecordTarget::Asset { .. } => bail!("assets are not part of the scene environment"),
        }
        Ok(replaced)
    }
}

impl LiveStateAdapter for SceneEnvironment {
    fn fog(&self) -> FogSettings {
        let rs = &self.render_settings;
        FogSettings {
            enabled: rs.fog,
            start_distance: rs.fog_start_distance,
            end_distance: rs.fog_end_distance,
            mode: EnumValue::from(rs.fog_mode),
            color: rs.fog_color,
            density: rs.fog_density,
        }
    }

    fn set_fog(&mut self, fog: &FogSettings) -> Result<()> {
        let rs = &mut self.render_settings;
        rs.fog = fog.enabled;
        rs.fog_start_distance = fog.start_distance;
        rs.fog_end_distance = fog.end_distance;
        rs.fog_mode = fog.mode.resolve();
        rs.fog_color = fog.color;
        rs.fog_density = fog.density;
        Ok(())
    }

    fn ambient(&self) -> AmbientSettings {
        let rs = &self.render_settings;
        AmbientSettings {
            mode: EnumValue::from(rs.ambient_mode),
            sky_color: rs.ambient_sky_color,
            equator_color: rs.ambient_equator_color,
            ground_color: rs.ambient_ground_color,
            intensity: rs.ambient_intensity,
            flat_color: rs.ambient_light,
            probe: rs.ambient_probe,
            subtractive_shadow_color: rs.subtractive_shadow_color,
        }
    }

    fn set_ambient(&mut self, ambient: &AmbientSettings) -> Result<()> {
        let rs = &mut self.render_settings;
        rs.ambient_mode = ambient.mode.resolve();
        rs.ambient_sky_color = ambient.sky_color;
        rs.ambient_equator_color = ambient.equator_color;
        rs.ambient_ground_color = ambient.ground_color;
        rs.ambient_intensity = ambient.intensity;
        rs.ambient_light = ambient.flat_color;
        rs.subtractive_shadow_color = ambient.subtractive_shadow_color;
        rs.ambient_probe = ambient.probe;
        Ok(())
    }

    fn reflection(&self) -> ReflectionSettings {
        let rs = &self.render_settings;
        ReflectionSettings {
            skybox: rs.skybox.clone(),
            custom_cubemap: rs.custom_reflection.clone(),
            intensity: rs.reflection_intensity,
            bounces: rs.reflection_bounces,
            mode: EnumValue::from(rs.default_reflection_mode),
            resolution: rs.default_reflection_resolution,
            compression: EnumValue::from(self.lightmap_settings.reflection_cubemap_compression),
        }
    }

    fn set_reflection(&mut self, reflection: &ReflectionSettings) -> Result<()> {
        let rs = &mut self.render_settings;
        rs.skybox = reflection.skybox.clone();
        rs.custom_reflection = reflection.custom_cubemap.clone();
        rs.reflection_intensity = reflection.intensity;
        rs.reflection_bounces = reflection.bounces;
        rs.default_reflection_mode = reflection.mode.resolve();
        rs.default_reflection_resolution = reflection.resolution;
        self.lightmap_settings.reflection_cubemap_compression = reflection.compression.resolve();
        Ok(())
    }

    fn effect_levels(&self) -> EffectLevels {
        let rs = &self.render_settings;
        EffectLevels {
            halo_strength: rs.halo_strength,
            flare_strength: rs.flare_strength,
            flare_fade_speed: rs.flare_fade_speed,
        }
    }

    fn set_effect_levels(&mut self, levels: EffectLevels) -> Result<()> {
        let rs = &mut self.render_settings;
        rs.halo_strength = levels.halo_strength;
        rs.flare_strength = levels.flare_strength;
        rs.flare_fade_speed = levels.flare_fade_speed;
        Ok(())
    }

    fn scene(&self) -> &dyn SceneGraph {
        &self.scene
    }

    fn sun(&self) -> Option<SceneObjectId> {
        self.render_settings.sun
    }

    fn set_sun(&mut self, sun: Option<SceneObjectId>) -> Result<()> {
        if let Some(id) = sun {
            if !self.scene.contains(id) {
                bail!("sun object {} is not in the scene", id.0);
            }
        }
        self.render_settings.sun = sun;
        Ok(())
    }

    fn halo_texture(&self) -> FieldAccess<Option<AssetRef>> {
        match &self.render_settings.hidden {
            Some(hidden) => FieldAccess::Value(hidden.halo_texture.clone()),
            None => FieldAccess::Unsupported,
        }
    }

    fn set_halo_texture(&mut self, texture: Option<&AssetRef>) -> Result<FieldAccess<()>> {
        Ok(match &mut self.render_settings.hidden {
            Some(hidden) => {
                hidden.halo_texture = texture.cloned();
                FieldAccess::Value(())
            }
            None => FieldAccess::Unsupported,
        })
    }

    fn spot_cookie(&self) -> FieldAccess<Option<AssetRef>> {
        match &self.render_settings.hidden {
            Some(hidden) => FieldAccess::Value(hidden.spot_cookie.clone()),
            None => FieldAccess::Unsupported,
        }
    }

    fn set_spot_cookie(&mut self, texture: Option<&AssetRef>) -> Result<FieldAccess<()>> {
        Ok(match &mut self.render_settings.hidden {
            Some(hidden) => {
                hidden.spot_cookie = texture.cloned();
                FieldAccess::Value(())
            }
            None => FieldAccess::Unsupported,
        })
    }

    fn backing_targets(&self) -> Vec<RecordTarget> {
        vec![RecordTarget::RenderSettings, RecordTarget::LightmapSettings]
    }

    fn capture_backing(&self) -> Result<Vec<CapturedState>> {
        self.backing_targets().iter().map(|target| self.capture(target)).collect()
    }

    fn restore_backing(&mut self, captured: &CapturedState) -> Result<CapturedState> {
        self.restore(captured)
    }
}
