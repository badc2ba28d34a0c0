use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A settings enum with stable integer codes, as stored by the host.
pub trait SettingEnum: Copy + Eq + fmt::Debug + 'static {
    /// Value an undefined or disallowed code resolves to.
    const FALLBACK: Self;
    /// Defined values that are still rejected by validation.
    const DISALLOWED: &'static [Self] = &[];

    fn from_code(code: i32) -> Option<Self>;
    fn code(self) -> i32;
    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FogMode {
    Linear,
    Exponential,
    ExponentialSquared,
}

impl SettingEnum for FogMode {
    const FALLBACK: Self = FogMode::ExponentialSquared;

    fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(FogMode::Linear),
            2 => Some(FogMode::Exponential),
            3 => Some(FogMode::ExponentialSquared),
            _ => None,
        }
    }

    fn code(self) -> i32 {
        match self {
            FogMode::Linear => 1,
            FogMode::Exponential => 2,
            FogMode::ExponentialSquared => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FogMode::Linear => "Linear",
            FogMode::Exponential => "Exponential",
            FogMode::ExponentialSquared => "Exponential Squared",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientMode {
    Skybox,
    Gradient,
    Color,
    Custom,
}

impl SettingEnum for AmbientMode {
    const FALLBACK: Self = AmbientMode::Skybox;
    const DISALLOWED: &'static [Self] = &[AmbientMode::Custom];

    fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AmbientMode::Skybox),
            1 => Some(AmbientMode::Gradient),
            3 => Some(AmbientMode::Color),
            4 => Some(AmbientMode::Custom),
            _ => None,
        }
    }

    fn code(self) -> i32 {
        match self {
            AmbientMode::Skybox => 0,
            AmbientMode::Gradient => 1,
            AmbientMode::Color => 3,
            AmbientMode::Custom => 4,
        }
    }

    fn label(self) -> &'static str {
        match self {
            AmbientMode::Skybox => "Skybox",
            AmbientMode::Gradient => "Gradient",
            AmbientMode::Color => "Color",
            AmbientMode::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReflectionMode {
    Skybox,
    Custom,
}

impl SettingEnum for DefaultReflectionMode {
    const FALLBACK: Self = DefaultReflectionMode::Skybox;

    fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(DefaultReflectionMode::Skybox),
            1 => Some(DefaultReflectionMode::Custom),
            _ => None,
        }
    }

    fn code(self) -> i32 {
        match self {
            DefaultReflectionMode::Skybox => 0,
            DefaultReflectionMode::Custom => 1,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DefaultReflectionMode::Skybox => "Skybox",
            DefaultReflectionMode::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionCubemapCompression {
    Off,
    On,
    Auto,
}

impl SettingEnum for ReflectionCubemapCompression {
    const FALLBACK: Self = ReflectionCubemapCompression::Auto;

    fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ReflectionCubemapCompression::Off),
            1 => Some(ReflectionCubemapCompression::On),
            2 => Some(ReflectionCubemapCompression::Auto),
            _ => None,
        }
    }

    fn code(self) -> i32 {
        match self {
            ReflectionCubemapCompression::Off => 0,
            ReflectionCubemapCompression::On => 1,
            ReflectionCubemapCompression::Auto => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ReflectionCubemapCompression::Off => "Uncompressed",
            ReflectionCubemapCompression::On => "Compressed",
            ReflectionCubemapCompression::Auto => "Auto",
        }
    }
}

/// Cubemap edge length in pixels. Only powers of two between 16 and 2048.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReflectionResolution {
    R16,
    R32,
    R64,
    R128,
    R256,
    R512,
    R1024,
    R2048,
}

impl ReflectionResolution {
    pub const MIN_PIXELS: i32 = 16;
    pub const MAX_PIXELS: i32 = 2048;

    pub const ALL: [ReflectionResolution; 8] = [
        ReflectionResolution::R16,
        ReflectionResolution::R32,
        ReflectionResolution::R64,
        ReflectionResolution::R128,
        ReflectionResolution::R256,
        ReflectionResolution::R512,
        ReflectionResolution::R1024,
        ReflectionResolution::R2048,
    ];

    pub fn pixels(self) -> i32 {
        match self {
            ReflectionResolution::R16 => 16,
            ReflectionResolution::R32 => 32,
            ReflectionResolution::R64 => 64,
            ReflectionResolution::R128 => 128,
            ReflectionResolution::R256 => 256,
            ReflectionResolution::R512 => 512,
            ReflectionResolution::R1024 => 1024,
            ReflectionResolution::R2048 => 2048,
        }
    }

    /// Exact match only; use `validation::floor_power_of_two` to coerce.
    pub fn from_pixels(pixels: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|res| res.pixels() == pixels)
    }
}

impl Default for ReflectionResolution {
    fn default() -> Self {
        ReflectionResolution::R128
    }
}

/// Raw enum slot as persisted. Holds the host's integer code, which may name
/// no defined value until the snapshot is validated.
pub struct EnumValue<T> {
    code: i32,
    marker: PhantomData<T>,
}

impl<T: SettingEnum> EnumValue<T> {
    pub fn from_code(code: i32) -> Self {
        Self { code, marker: PhantomData }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    /// The defined value, if the code names one.
    pub fn known(&self) -> Option<T> {
        T::from_code(self.code)
    }

    /// The value validation would settle on.
    pub fn resolve(&self) -> T {
        match self.known() {
            Some(value) if !T::DISALLOWED.contains(&value) => value,
            _ => T::FALLBACK,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.known().is_some_and(|value| !T::DISALLOWED.contains(&value))
    }

    /// Display label, or the raw code when it names no value.
    pub fn describe(&self) -> String {
        match self.known() {
            Some(value) => value.label().to_string(),
            None => format!("undefined ({})", self.code),
        }
    }
}

impl<T: SettingEnum> From<T> for EnumValue<T> {
    fn from(value: T) -> Self {
        Self::from_code(value.code())
    }
}

impl<T: SettingEnum> Default for EnumValue<T> {
    fn default() -> Self {
        Self::from(T::FALLBACK)
    }
}

impl<T> Clone for EnumValue<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EnumValue<T> {}

impl<T> PartialEq for EnumValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl<T> Eq for EnumValue<T> {}

impl<T: SettingEnum> fmt::Debug for EnumValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known() {
            Some(value) => write!(f, "{value:?}"),
            None => write!(f, "Undefined({})", self.code),
        }
    }
}

impl<T> Serialize for EnumValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code)
    }
}

impl<'de, T: SettingEnum> Deserialize<'de> for EnumValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::from_code)
    }
}
