use anyhow::{anyhow, Result};
use kestrel_envlight::live_state::{EffectLevels, FieldAccess, LiveStateAdapter};
use kestrel_envlight::memory_host::SceneEnvironment;
use kestrel_envlight::modes::{EnumValue, FogMode};
use kestrel_envlight::scene_graph::{SceneGraph, SceneObjectId, SceneTree};
use kestrel_envlight::snapshot::{AmbientSettings, AssetRef, ColorData, FogSettings, ReflectionSettings};
use kestrel_envlight::sync::{SyncEngine, APPLY_LABEL};
use kestrel_envlight::transaction::{CapturedState, RecordTarget, TransactionRecorder, UndoHistory};

fn lit_scene() -> (SceneTree, SceneObjectId) {
    let mut tree = SceneTree::new();
    let env = tree.spawn("Environment", None).expect("spawn environment");
    tree.spawn("Props", None).expect("spawn props");
    let sun = tree.spawn_light("Sun", Some(env)).expect("spawn sun");
    (tree, sun)
}

fn authored_host() -> SceneEnvironment {
    let (tree, sun) = lit_scene();
    let mut host = SceneEnvironment::new(tree);
    let rs = &mut host.render_settings;
    rs.fog = true;
    rs.fog_mode = FogMode::Linear;
    rs.fog_color = ColorData::rgb(0.2, 0.3, 0.4);
    rs.fog_density = 0.25;
    rs.ambient_intensity = 2.5;
    rs.reflection_bounces = 3;
    rs.default_reflection_resolution = 512;
    rs.halo_strength = 0.75;
    rs.skybox = Some(AssetRef::new("sky_noon", Some("materials/sky_noon.json".to_string())));
    rs.sun = Some(sun);
    if let Some(hidden) = rs.hidden.as_mut() {
        hidden.halo_texture = Some(AssetRef::new("halo_soft", None));
    }
    host
}

#[test]
fn write_of_read_is_a_fixed_point() {
    let engine = SyncEngine::new();
    let source = authored_host();
    let snapshot = engine.read(&source);
    assert_eq!(snapshot.sun_path, "/Environment/Sun");
    assert_eq!(snapshot.effects.halo_texture.as_ref().map(AssetRef::key), Some("halo_soft"));

    let (tree, sun) = lit_scene();
    let mut target = SceneEnvironment::new(tree);
    engine.write(&snapshot, &mut target, None).expect("write");

    assert_eq!(target.render_settings, source.render_settings);
    assert_eq!(target.lightmap_settings, source.lightmap_settings);
    assert_eq!(target.sun(), Some(sun));
    assert_eq!(engine.read(&target), snapshot);
    assert_eq!(engine.scratch_pool().outstanding(), 0);
}

#[test]
fn write_never_mutates_the_snapshot() {
    let engine = SyncEngine::new();
    let mut snapshot = engine.read(&authored_host());
    snapshot.fog.density = 5.0;
    snapshot.reflection.resolution = 300;
    snapshot.fog.mode = EnumValue::from_code(0);
    let before = snapshot.fingerprint().expect("fingerprint");

    let mut host = authored_host();
    engine.write(&snapshot, &mut host, None).expect("write");

    assert_eq!(snapshot.fingerprint().expect("fingerprint"), before);
    assert_eq!(snapshot.fog.density, 5.0);
    assert_eq!(host.render_settings.fog_density, 1.0);
    assert_eq!(host.render_settings.default_reflection_resolution, 256);
    assert_eq!(host.render_settings.fog_mode, FogMode::ExponentialSquared);
}

#[test]
fn unresolved_sun_clears_the_live_reference() {
    let engine = SyncEngine::new();
    let mut snapshot = engine.read(&authored_host());
    let mut host = authored_host();

    snapshot.sun_path = "/Props".to_string();
    engine.write(&snapshot, &mut host, None).expect("write without light");
    assert_eq!(host.sun(), None);

    snapshot.sun_path = "Environment/Sun".to_string();
    engine.write(&snapshot, &mut host, None).expect("write relative path");
    assert_eq!(host.sun(), None);
}

#[test]
fn missing_hidden_channel_is_skipped() {
    let engine = SyncEngine::new();
    let snapshot = engine.read(&authored_host());

    let mut host = authored_host().without_hidden_channel();
    engine.write(&snapshot, &mut host, None).expect("write");
    assert_eq!(host.halo_texture(), FieldAccess::Unsupported);
    assert_eq!(host.render_settings.halo_strength, 0.75);

    let mut previous = snapshot.clone();
    previous.effects.spot_cookie = Some(AssetRef::new("cookie", None));
    engine.read_into(&host, &mut previous);
    assert_eq!(previous.effects.spot_cookie.as_ref().map(AssetRef::key), Some("cookie"));
    assert_eq!(previous.effects.halo_texture.as_ref().map(AssetRef::key), Some("halo_soft"));
}

#[test]
fn recorder_captures_before_and_marks_after() {
    let engine = SyncEngine::new();
    let snapshot = engine.read(&authored_host());
    let mut host = SceneEnvironment::new(lit_scene().0);
    let mut history = UndoHistory::new(8);

    engine.write(&snapshot, &mut host, Some(&mut history)).expect("write");

    assert_eq!(history.last_label(), Some(APPLY_LABEL));
    assert!(history.is_dirty(&RecordTarget::RenderSettings));
    assert!(history.is_dirty(&RecordTarget::LightmapSettings));

    let applied = host.render_settings.clone();
    let restored = history.undo(|states| states.iter().map(|state| host.restore(state)).collect()).expect("undo");
    assert_eq!(restored.as_deref(), Some(APPLY_LABEL));
    assert_eq!(host.render_settings, SceneEnvironment::new(lit_scene().0).render_settings);

    history.redo(|states| states.iter().map(|state| host.restore(state)).collect()).expect("redo");
    assert_eq!(host.render_settings, applied);
}

#[derive(Default)]
struct CountingRecorder {
    captures: Vec<(String, usize)>,
    dirty: Vec<RecordTarget>,
}

impl TransactionRecorder for CountingRecorder {
    fn capture(&mut self, label: &str, states: Vec<CapturedState>) {
        self.captures.push((label.to_string(), states.len()));
    }

    fn mark_dirty(&mut self, targets: &[RecordTarget]) {
        self.dirty.extend_from_slice(targets);
    }
}

#[test]
fn recording_does_not_change_the_result() {
    let engine = SyncEngine::new();
    let snapshot = engine.read(&authored_host());

    let mut silent = SceneEnvironment::new(lit_scene().0);
    engine.write(&snapshot, &mut silent, None).expect("silent write");

    let mut recorded = SceneEnvironment::new(lit_scene().0);
    let mut recorder = CountingRecorder::default();
    engine.write(&snapshot, &mut recorded, Some(&mut recorder)).expect("recorded write");

    assert_eq!(silent.render_settings, recorded.render_settings);
    assert_eq!(recorder.captures, vec![(APPLY_LABEL.to_string(), 2)]);
    assert_eq!(recorder.dirty.len(), 2);
}

/// Delegates to an in-memory scene but rejects ambient writes.
struct RejectingHost {
    inner: SceneEnvironment,
}

impl LiveStateAdapter for RejectingHost {
    fn fog(&self) -> FogSettings {
        self.inner.fog()
    }

    fn set_fog(&mut self, fog: &FogSettings) -> Result<()> {
        self.inner.set_fog(fog)
    }

    fn ambient(&self) -> AmbientSettings {
        self.inner.ambient()
    }

    fn set_ambient(&mut self, _ambient: &AmbientSettings) -> Result<()> {
        Err(anyhow!("ambient settings are locked"))
    }

    fn reflection(&self) -> ReflectionSettings {
        self.inner.reflection()
    }

    fn set_reflection(&mut self, reflection: &ReflectionSettings) -> Result<()> {
        self.inner.set_reflection(reflection)
    }

    fn effect_levels(&self) -> EffectLevels {
        self.inner.effect_levels()
    }

    fn set_effect_levels(&mut self, levels: EffectLevels) -> Result<()> {
        self.inner.set_effect_levels(levels)
    }

    fn scene(&self) -> &dyn SceneGraph {
        self.inner.scene()
    }

    fn sun(&self) -> Option<SceneObjectId> {
        self.inner.sun()
    }

    fn set_sun(&mut self, sun: Option<SceneObjectId>) -> Result<()> {
        self.inner.set_sun(sun)
    }

    fn backing_targets(&self) -> Vec<RecordTarget> {
        self.inner.backing_targets()
    }

    fn capture_backing(&self) -> Result<Vec<CapturedState>> {
        self.inner.capture_backing()
    }

    fn restore_backing(&mut self, captured: &CapturedState) -> Result<CapturedState> {
        self.inner.restore_backing(captured)
    }
}

#[test]
fn adapter_failure_propagates_and_releases_working_copy() {
    let engine = SyncEngine::new();
    let snapshot = engine.read(&authored_host());
    let mut host = RejectingHost { inner: SceneEnvironment::new(lit_scene().0) };
    let mut history = UndoHistory::new(8);

    let err = engine.write(&snapshot, &mut host, Some(&mut history)).unwrap_err();

    assert!(err.to_string().contains("locked"));
    assert_eq!(engine.scratch_pool().outstanding(), 0);
    assert!(history.can_undo());
    assert!(!history.has_dirty());
    assert_eq!(host.halo_texture(), FieldAccess::Unsupported);
}
