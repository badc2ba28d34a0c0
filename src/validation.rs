use crate::modes::{EnumValue, ReflectionResolution, SettingEnum};
use crate::snapshot::EnvironmentSnapshot;
use anyhow::{Context, Result};
use serde_json::Value;

pub const FOG_DENSITY_RANGE: (f32, f32) = (0.0, 1.0);
pub const AMBIENT_INTENSITY_RANGE: (f32, f32) = (0.0, 8.0);
pub const REFLECTION_INTENSITY_RANGE: (f32, f32) = (0.0, 1.0);
pub const REFLECTION_BOUNCES_RANGE: (i32, i32) = (1, 5);
pub const HALO_STRENGTH_RANGE: (f32, f32) = (0.0, 1.0);
pub const FLARE_STRENGTH_RANGE: (f32, f32) = (0.0, 1.0);

/// Normalizes `snapshot` in place so every ranged, enum, and resolution
/// field holds a value the host accepts. Never fails and is idempotent.
pub fn validate(snapshot: &mut EnvironmentSnapshot) {
    let fog = &mut snapshot.fog;
    fog.density = clamp_range(fog.density, FOG_DENSITY_RANGE);
    fog.mode = settle(fog.mode);

    let ambient = &mut snapshot.ambient;
    ambient.intensity = clamp_range(ambient.intensity, AMBIENT_INTENSITY_RANGE);
    ambient.mode = settle(ambient.mode);

    let reflection = &mut snapshot.reflection;
    reflection.intensity = clamp_range(reflection.intensity, REFLECTION_INTENSITY_RANGE);
    reflection.bounces = reflection.bounces.clamp(REFLECTION_BOUNCES_RANGE.0, REFLECTION_BOUNCES_RANGE.1);
    reflection.resolution = floor_power_of_two(
        reflection.resolution,
        ReflectionResolution::MIN_PIXELS,
        ReflectionResolution::MAX_PIXELS,
    );
    reflection.mode = settle(reflection.mode);
    reflection.compression = settle(reflection.compression);

    let effects = &mut snapshot.effects;
    effects.halo_strength = clamp_range(effects.halo_strength, HALO_STRENGTH_RANGE);
    effects.flare_strength = clamp_range(effects.flare_strength, FLARE_STRENGTH_RANGE);
}

/// Returns a normalized copy, leaving `snapshot` untouched.
pub fn validated(snapshot: &EnvironmentSnapshot) -> EnvironmentSnapshot {
    let mut copy = snapshot.clone();
    validate(&mut copy);
    copy
}

/// Floors `value` to a power of two in `[lower, upper]`. Both bounds must be
/// powers of two. Values below `lower` land on `lower`.
pub fn floor_power_of_two(value: i32, lower: i32, upper: i32) -> i32 {
    let mut x = lower;
    while x < upper {
        if value < x.saturating_mul(2) {
            return x;
        }
        x = x.saturating_mul(2);
    }
    upper
}

/// Clamps into `[min, max]`. NaN lands on `min`.
pub fn clamp_range(value: f32, (min, max): (f32, f32)) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

fn settle<T: SettingEnum>(value: EnumValue<T>) -> EnumValue<T> {
    if value.is_valid() {
        value
    } else {
        EnumValue::from(value.resolve())
    }
}

/// Dotted paths of every field `validate` would change, e.g. `fog.density`.
pub fn deviations(snapshot: &EnvironmentSnapshot) -> Result<Vec<String>> {
    let before = serde_json::to_value(snapshot).context("Encoding snapshot for validation report")?;
    let after =
        serde_json::to_value(validated(snapshot)).context("Encoding validated snapshot for validation report")?;
    let mut changed = Vec::new();
    collect_changes("", &before, &after, &mut changed);
    Ok(changed)
}

fn collect_changes(prefix: &str, before: &Value, after: &Value, out: &mut Vec<String>) {
    match (before, after) {
        (Value::Object(lhs), Value::Object(rhs)) => {
            for (key, rhs_value) in rhs {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                match lhs.get(key) {
                    Some(lhs_value) => collect_changes(&path, lhs_value, rhs_value, out),
                    None => out.push(path),
                }
            }
        }
        _ if before != after => out.push(prefix.to_string()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::{AmbientMode, FogMode};

    #[test]
    fn floor_table_matches_power_of_two_steps() {
        assert_eq!(floor_power_of_two(-5, 16, 2048), 16);
        assert_eq!(floor_power_of_two(0, 16, 2048), 16);
        assert_eq!(floor_power_of_two(31, 16, 2048), 16);
        assert_eq!(floor_power_of_two(32, 16, 2048), 32);
        assert_eq!(floor_power_of_two(63, 16, 2048), 32);
        assert_eq!(floor_power_of_two(100, 16, 2048), 64);
        assert_eq!(floor_power_of_two(1024, 16, 2048), 1024);
        assert_eq!(floor_power_of_two(2047, 16, 2048), 1024);
        assert_eq!(floor_power_of_two(2048, 16, 2048), 2048);
        assert_eq!(floor_power_of_two(i32::MAX, 16, 2048), 2048);
    }

    #[test]
    fn nan_clamps_to_lower_bound() {
        assert_eq!(clamp_range(f32::NAN, (0.0, 8.0)), 0.0);
        assert_eq!(clamp_range(f32::INFINITY, (0.0, 8.0)), 8.0);
        assert_eq!(clamp_range(-0.5, (0.0, 1.0)), 0.0);
    }

    #[test]
    fn validate_coerces_every_invariant() {
        let mut snapshot = EnvironmentSnapshot::default();
        snapshot.fog.density = 4.0;
        snapshot.fog.mode = EnumValue::from_code(99);
        snapshot.ambient.mode = EnumValue::from(AmbientMode::Custom);
        snapshot.ambient.intensity = 12.0;
        snapshot.reflection.bounces = 0;
        snapshot.reflection.resolution = 700;
        snapshot.effects.flare_strength = -1.0;
        snapshot.fog.start_distance = -50.0;

        validate(&mut snapshot);

        assert_eq!(snapshot.fog.density, 1.0);
        assert_eq!(snapshot.fog.mode.known(), Some(FogMode::ExponentialSquared));
        assert_eq!(snapshot.ambient.mode.known(), Some(AmbientMode::Skybox));
        assert_eq!(snapshot.ambient.intensity, 8.0);
        assert_eq!(snapshot.reflection.bounces, 1);
        assert_eq!(snapshot.reflection.resolution, 512);
        assert_eq!(snapshot.effects.flare_strength, 0.0);
        assert_eq!(snapshot.fog.start_distance, -50.0, "unranged fields pass through");
    }

    #[test]
    fn deviations_list_changed_fields_only() {
        let mut snapshot = EnvironmentSnapshot::default();
        assert!(deviations(&snapshot).unwrap().is_empty());

        snapshot.fog.density = 2.0;
        snapshot.reflection.resolution = 20;
        let changed = deviations(&snapshot).unwrap();
        assert_eq!(changed, vec!["fog.density".to_string(), "reflection.resolution".to_string()]);
        assert_eq!(snapshot.fog.density, 2.0, "report must not mutate");
    }

    #[test]
    fn unranged_nan_is_not_a_deviation() {
        let mut snapshot = EnvironmentSnapshot::default();
        snapshot.fog.start_distance = f32::NAN;
        assert!(validated(&snapshot) != snapshot);
        assert!(deviations(&snapshot).unwrap().is_empty());

        snapshot.fog.density = f32::NAN;
        assert_eq!(deviations(&snapshot).unwrap(), vec!["fog.density".to_string()]);
    }
}
