use kestrel_envlight::live_state::LiveStateAdapter;
use kestrel_envlight::memory_host::SceneEnvironment;
use kestrel_envlight::path_resolver::{object_path, resolve_path, resolve_sun};
use kestrel_envlight::scene_graph::SceneTree;
use kestrel_envlight::sync::SyncEngine;

#[test]
fn paths_resolve_both_ways() {
    let mut tree = SceneTree::new();
    let a = tree.spawn("A", None).expect("spawn A");
    let b = tree.spawn("B", Some(a)).expect("spawn B");
    let c = tree.spawn_light("C", Some(b)).expect("spawn C");

    assert_eq!(object_path(&tree, Some(b)).as_deref(), Some("/A/B"));
    assert_eq!(resolve_path(&tree, "/A/B"), Some(b));
    assert_eq!(resolve_path(&tree, "/A/B/C"), Some(c));
    assert_eq!(resolve_path(&tree, "/A/X"), None);
    assert_eq!(resolve_path(&tree, "/"), None);
    assert_eq!(object_path(&tree, None), None);
    assert_eq!(resolve_sun(&tree, "/A/B"), None);
    assert_eq!(resolve_sun(&tree, "/A/B/C"), Some(c));
}

#[test]
fn first_matching_branch_wins_and_backtracks() {
    let mut tree = SceneTree::new();
    let first = tree.spawn("Lights", None).expect("first root");
    tree.spawn("Fill", Some(first)).expect("fill");
    let second = tree.spawn("Lights", None).expect("second root");
    let key = tree.spawn_light("Key", Some(second)).expect("key");

    assert_eq!(resolve_path(&tree, "/Lights"), Some(first));
    assert_eq!(resolve_path(&tree, "/Lights/Key"), Some(key));
}

#[test]
fn renaming_breaks_the_stored_reference() {
    let mut tree = SceneTree::new();
    let env = tree.spawn("Environment", None).expect("env");
    let sun = tree.spawn_light("Sun", Some(env)).expect("sun");
    let mut host = SceneEnvironment::new(tree);
    host.render_settings.sun = Some(sun);

    let engine = SyncEngine::new();
    let snapshot = engine.read(&host);
    assert_eq!(snapshot.sun_path, "/Environment/Sun");

    host.scene.rename(env, "Lighting").expect("rename");
    engine.write(&snapshot, &mut host, None).expect("write");
    assert_eq!(host.sun(), None);

    host.scene.rename(env, "Environment").expect("rename back");
    engine.write(&snapshot, &mut host, None).expect("write");
    assert_eq!(host.sun(), Some(sun));
}

#[test]
fn reparenting_breaks_the_stored_reference() {
    let mut tree = SceneTree::new();
    let env = tree.spawn("Environment", None).expect("env");
    let sun = tree.spawn_light("Sun", Some(env)).expect("sun");
    let path = object_path(&tree, Some(sun)).expect("path");

    tree.reparent(sun, None).expect("reparent");
    assert_eq!(resolve_path(&tree, &path), None);
    assert_eq!(resolve_path(&tree, "/Sun"), Some(sun));
    assert!(tree.reparent(env, Some(env)).is_err());
}
