use crate::modes::{
    AmbientMode, DefaultReflectionMode, EnumValue, FogMode, ReflectionCubemapCompression, ReflectionResolution,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Every value on the host's environment lighting panel, as one plain value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    #[serde(default)]
    pub fog: FogSettings,
    #[serde(default)]
    pub ambient: AmbientSettings,
    #[serde(default)]
    pub reflection: ReflectionSettings,
    #[serde(default)]
    pub effects: EffectsSettings,
    /// Absolute scene path of the sun light. Looked up by name whenever it is used.
    #[serde(default)]
    pub sun_path: String,
}

impl EnvironmentSnapshot {
    /// Hash of the canonical JSON encoding. Two snapshots with the same
    /// fingerprint hold the same settings bit for bit.
    pub fn fingerprint(&self) -> Result<blake3::Hash> {
        let bytes = serde_json::to_vec(self).context("Encoding snapshot for fingerprint")?;
        Ok(blake3::hash(&bytes))
    }

    /// One display row per settings group, with enum codes spelled out.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let fog = &self.fog;
        let ambient = &self.ambient;
        let reflection = &self.reflection;
        let effects = &self.effects;
        let resolution = match ReflectionResolution::from_pixels(reflection.resolution) {
            Some(res) => format!("{} px", res.pixels()),
            None => format!("{} px (not a power of two)", reflection.resolution),
        };
        vec![
            (
                "Fog",
                format!(
                    "{} {}, density {}, {}..{}",
                    if fog.enabled { "on" } else { "off" },
                    fog.mode.describe(),
                    fog.density,
                    fog.start_distance,
                    fog.end_distance
                ),
            ),
            ("Ambient", format!("{}, intensity {}", ambient.mode.describe(), ambient.intensity)),
            (
                "Reflection",
                format!(
                    "{}, {resolution}, {} compression, intensity {}, {} bounces",
                    reflection.mode.describe(),
                    reflection.compression.describe(),
                    reflection.intensity,
                    reflection.bounces
                ),
            ),
            (
                "Effects",
                format!(
                    "halo {}, flare {} (fade {})",
                    effects.halo_strength, effects.flare_strength, effects.flare_fade_speed
                ),
            ),
            ("Sun", if self.sun_path.is_empty() { "(none)".to_string() } else { self.sun_path.clone() }),
        ]
    }
}

fn default_fog_end() -> f32 {
    300.0
}

fn default_fog_color() -> ColorData {
    ColorData::rgb(0.5, 0.5, 0.5)
}

const fn default_fog_density() -> f32 {
    0.01
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub start_distance: f32,
    #[serde(default = "default_fog_end")]
    pub end_distance: f32,
    #[serde(default)]
    pub mode: EnumValue<FogMode>,
    #[serde(default = "default_fog_color")]
    pub color: ColorData,
    #[serde(default = "default_fog_density")]
    pub density: f32,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            start_distance: 0.0,
            end_distance: default_fog_end(),
            mode: EnumValue::from(FogMode::ExponentialSquared),
            color: default_fog_color(),
            density: default_fog_density(),
        }
    }
}

fn default_sky_color() -> ColorData {
    ColorData::rgb(0.212, 0.227, 0.259)
}

fn default_equator_color() -> ColorData {
    ColorData::rgb(0.114, 0.125, 0.133)
}

fn default_ground_color() -> ColorData {
    ColorData::rgb(0.047, 0.043, 0.035)
}

fn default_shadow_color() -> ColorData {
    ColorData::rgb(0.42, 0.478, 0.627)
}

const fn default_ambient_intensity() -> f32 {
    1.0
}

fn default_probe() -> AmbientProbe {
    AmbientProbe::uniform(default_sky_color().rgb_vec())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientSettings {
    #[serde(default)]
    pub mode: EnumValue<AmbientMode>,
    #[serde(default = "default_sky_color")]
    pub sky_color: ColorData,
    #[serde(default = "default_equator_color")]
    pub equator_color: ColorData,
    #[serde(default = "default_ground_color")]
    pub ground_color: ColorData,
    #[serde(default = "default_ambient_intensity")]
    pub intensity: f32,
    #[serde(default = "default_sky_color")]
    pub flat_color: ColorData,
    /// Echoed from the live state; the host recomputes it when other fields change.
    #[serde(default = "default_probe")]
    pub probe: AmbientProbe,
    #[serde(default = "default_shadow_color")]
    pub subtractive_shadow_color: ColorData,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            mode: EnumValue::from(AmbientMode::Skybox),
            sky_color: default_sky_color(),
            equator_color: default_equator_color(),
            ground_color: default_ground_color(),
            intensity: default_ambient_intensity(),
            flat_color: default_sky_color(),
            probe: default_probe(),
            subtractive_shadow_color: default_shadow_color(),
        }
    }
}

const fn default_reflection_intensity() -> f32 {
    1.0
}

const fn default_reflection_bounces() -> i32 {
    1
}

fn default_reflection_resolution() -> i32 {
    ReflectionResolution::default().pixels()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skybox: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_cubemap: Option<AssetRef>,
    #[serde(default = "default_reflection_intensity")]
    pub intensity: f32,
    #[serde(default = "default_reflection_bounces")]
    pub bounces: i32,
    #[serde(default)]
    pub mode: EnumValue<DefaultReflectionMode>,
    /// Cubemap edge in pixels. Kept raw so hand-edited values survive until validation.
    #[serde(default = "default_reflection_resolution")]
    pub resolution: i32,
    #[serde(default)]
    pub compression: EnumValue<ReflectionCubemapCompression>,
}

impl Default for ReflectionSettings {
    fn default() -> Self {
        Self {
            skybox: None,
            custom_cubemap: None,
            intensity: default_reflection_intensity(),
            bounces: default_reflection_bounces(),
            mode: EnumValue::from(DefaultReflectionMode::Skybox),
            resolution: default_reflection_resolution(),
            compression: EnumValue::from(ReflectionCubemapCompression::Auto),
        }
    }
}

const fn default_halo_strength() -> f32 {
    0.5
}

const fn default_flare_strength() -> f32 {
    1.0
}

const fn default_flare_fade_speed() -> f32 {
    3.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectsSettings {
    #[serde(default = "default_halo_strength")]
    pub halo_strength: f32,
    #[serde(default = "default_flare_strength")]
    pub flare_strength: f32,
    #[serde(default = "default_flare_fade_speed")]
    pub flare_fade_speed: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo_texture: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_cookie: Option<AssetRef>,
}

impl Default for EffectsSettings {
    fn default() -> Self {
        Self {
            halo_strength: default_halo_strength(),
            flare_strength: default_flare_strength(),
            flare_fade_speed: default_flare_fade_speed(),
            halo_texture: None,
            spot_cookie: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorData {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorData {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgb_vec(self) -> glam::Vec3 {
        glam::Vec3::new(self.r, self.g, self.b)
    }
}

impl Default for ColorData {
    fn default() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }
    }
}


/// Order-2 spherical harmonics, nine coefficients per colour channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AmbientProbe {
    pub coefficients: [[f32; 9]; 3],
}

impl AmbientProbe {
    /// Constant ambient term: only the DC coefficient of each channel is set.
    pub fn uniform(color: glam::Vec3) -> Self {
        let mut coefficients = [[0.0; 9]; 3];
        coefficients[0][0] = color.x;
        coefficients[1][0] = color.y;
        coefficients[2][0] = color.z;
        Self { coefficients }
    }
}

/// Reference to a host asset (material, cubemap, texture) by key, with an
/// optional source path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AssetRefRepr", into = "AssetRefRepr")]
pub struct AssetRef {
    key: String,
    path: Option<String>,
}

impl AssetRef {
    pub fn new(key: impl Into<String>, path: Option<String>) -> Self {
        Self { key: key.into(), path }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AssetRefRepr {
    Key(String),
    Detailed {
        key: String,
        #[serde(default)]
        path: Option<String>,
    },
}

impl From<AssetRef> for AssetRefRepr {
    fn from(asset: AssetRef) -> Self {
        if let Some(path) = asset.path {
            AssetRefRepr::Detailed { key: asset.key, path: Some(path) }
        } else {
            AssetRefRepr::Key(asset.key)
        }
    }
}

impl From<AssetRefRepr> for AssetRef {
    fn from(repr: AssetRefRepr) -> Self {
        match repr {
            AssetRefRepr::Key(key) => AssetRef::new(key, None),
            AssetRefRepr::Detailed { key, path } => AssetRef::new(key, path),
        }
    }
}
