use kestrel_envlight::asset::{HideFlags, SnapshotAsset};
use kestrel_envlight::clipboard::ClipboardStore;
use kestrel_envlight::sync::{SyncEngine, REPLACE_LABEL};
use kestrel_envlight::transaction::UndoHistory;

#[test]
fn clipboard_never_aliases_the_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let engine = SyncEngine::new();
    let mut source = SnapshotAsset::new("Dusk");
    source.settings.fog.density = 0.4;
    source.persist_at(dir.path().join("Dusk.json")).expect("persist source");

    let clipboard = ClipboardStore::new(dir.path().join("EnvironmentLighting_Clipboard.json"));
    clipboard.put(&engine, &source).expect("put");

    source.settings.fog.density = 0.9;
    source.save().expect("save source");

    let clip = clipboard.get().expect("get").expect("clipboard snapshot");
    assert_eq!(clip.settings.fog.density, 0.4);
    assert_ne!(clip.meta.id, source.meta.id);
    assert_eq!(clip.meta.name, "EnvironmentLighting_Clipboard");

    let reloaded = SnapshotAsset::load_from_path(dir.path().join("Dusk.json")).expect("reload source");
    assert_eq!(reloaded.settings.fog.density, 0.9);
    assert_eq!(reloaded.meta.name, "Dusk");
}

#[test]
fn paste_keeps_destination_identity() {
    let dir = tempfile::tempdir().expect("temp dir");
    let engine = SyncEngine::new();
    let clipboard = ClipboardStore::new(dir.path().join("clip.json"));

    let mut source = SnapshotAsset::new("Noon");
    source.settings.ambient.intensity = 3.0;
    source.settings.sun_path = "/Environment/Sun".to_string();
    clipboard.put(&engine, &source).expect("put");

    let mut dest = SnapshotAsset::new("Night");
    dest.meta.hide_flags = HideFlags::DONT_SAVE_IN_BUILD;
    dest.persist_at(dir.path().join("Night.json")).expect("persist dest");
    let dest_id = dest.meta.id;

    let clip = clipboard.get().expect("get").expect("clipboard snapshot");
    let mut history = UndoHistory::new(4);
    engine.copy(&clip.settings, &mut dest, Some(&mut history)).expect("paste");

    assert_eq!(dest.settings, source.settings);
    assert_eq!(dest.meta.id, dest_id);
    assert_eq!(dest.meta.name, "Night");
    assert_eq!(dest.meta.hide_flags, HideFlags::DONT_SAVE_IN_BUILD);
    assert_eq!(history.last_label(), Some(REPLACE_LABEL));
    assert!(history.is_dirty(&dest.record_target()));
}
