//! Integration tests: editor session + snapshot history (pl-editor).
//!
//! Drives the `Editor` the way the canvas host does and checks that every
//! committed edit is captured and that undo/redo replay whole scenes.

use pl_core::config::EditorConfig;
use pl_core::model::*;
use pl_editor::{Editor, History, ShortcutAction, ShortcutMap};
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn poster() -> Scene {
    Scene::from_json(include_str!("fixtures/poster.json")).unwrap()
}

// ─── Snapshot scenario ──────────────────────────────────────────────────

#[test]
fn capture_undo_capture_discards_redo_branch() {
    init_logger();
    let s0 = Scene::default();
    let mut s1 = s0.clone();
    s1.add(SceneObject::new(
        pl_core::ObjectId::intern("s1_rect"),
        ObjectKind::Rect {
            width: 10.0,
            height: 10.0,
        },
    ));
    let mut s2 = s1.clone();
    s2.background = Color::BLACK;
    let mut s3 = s1.clone();
    s3.width = 1024;

    let mut history = History::new(s0.clone());
    history.capture(s1.clone());
    history.capture(s2);
    assert_eq!(history.undo(), Some(&s1));
    assert_eq!(history.cursor(), 1);

    history.capture(s3.clone());
    assert_eq!(history.entries(), &[s0, s1, s3]);
    assert_eq!(history.cursor(), 2);
    assert_eq!(history.redo(), None);
    assert_eq!(history.cursor(), 2);
}

#[test]
fn every_edit_is_one_snapshot() {
    init_logger();
    let mut editor = Editor::default();
    let rect = editor.add_rect();
    editor.add_text();
    editor.select(rect);
    editor.duplicate_selected();
    editor.move_selected(30.0, 0.0);
    editor.delete_selected();

    let history = editor.history();
    assert_eq!(history.len(), 6);
    assert_eq!(history.cursor(), history.len() - 1);
    assert_eq!(history.current(), editor.scene());

    let counts: Vec<usize> = history.entries().iter().map(Scene::len).collect();
    assert_eq!(counts, vec![0, 1, 2, 3, 3, 2]);
}

#[test]
fn undo_all_then_redo_all() {
    init_logger();
    let mut editor = Editor::default();
    editor.add_rect();
    editor.add_circle();
    editor.add_triangle();
    let final_scene = editor.snapshot();

    let mut undos = 0;
    while editor.undo() {
        undos += 1;
    }
    assert_eq!(undos, 3);
    assert!(editor.scene().is_empty());
    assert!(!editor.can_undo());
    assert!(editor.can_redo());

    while editor.redo() {}
    assert_eq!(editor.scene(), &final_scene);
    assert!(!editor.can_redo());
}

#[test]
fn new_edit_after_undo_drops_future() {
    init_logger();
    let mut editor = Editor::default();
    editor.add_rect();
    editor.add_circle();
    editor.add_triangle();
    editor.undo();
    editor.undo();
    let kept: Vec<Scene> = editor.history().entries()[..=editor.history().cursor()].to_vec();

    editor.add_text();
    let entries = editor.history().entries();
    assert_eq!(entries.len(), kept.len() + 1);
    assert_eq!(&entries[..kept.len()], kept.as_slice());
    assert!(!editor.can_redo());
    assert!(matches!(
        editor.scene().objects.last().map(|o| &o.kind),
        Some(ObjectKind::Text { .. })
    ));
}

// ─── Loaded documents ───────────────────────────────────────────────────

#[test]
fn loaded_scene_survives_undo_redo() {
    init_logger();
    let mut editor = Editor::default();
    let doc = poster();
    editor.load_scene(doc.clone());

    editor.select(pl_core::ObjectId::intern("banner"));
    assert!(editor.set_selected_opacity(0.25));
    assert!(editor.undo());
    assert_eq!(editor.scene(), &doc);
    assert!(editor.redo());
    let banner = editor
        .scene()
        .get(pl_core::ObjectId::intern("banner"))
        .unwrap();
    assert_eq!(banner.transform.opacity, 0.25);
}

#[test]
fn poster_fixture_roundtrips() {
    let doc = poster();
    assert_eq!(doc.len(), 4);
    let badge = &doc.objects[2];
    assert_eq!(badge.transform.scale_x, 1.0);
    assert_eq!(badge.transform.angle, 15.0);
    assert_eq!(badge.style.fill, Some(Color::rgba(0xEF, 0x44, 0x44, 0x80)));

    let back = Scene::from_json(&doc.to_json().unwrap()).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn duplicate_of_loaded_object_gets_fresh_id() {
    let mut editor = Editor::default();
    editor.load_scene(poster());
    editor.select(pl_core::ObjectId::intern("arrow"));
    let copy = editor.duplicate_selected().unwrap();
    assert_ne!(copy.as_str(), "arrow");
    assert_eq!(editor.scene().len(), 5);
}

// ─── Keyboard-driven session ────────────────────────────────────────────

#[test]
fn keyboard_session() {
    init_logger();
    let mut editor = Editor::new(EditorConfig::default());
    let keys = [
        ("r", false, false),
        ("d", true, false),
        ("Delete", false, false),
        ("z", true, false),
        ("z", true, true),
        ("Escape", false, false),
    ];
    for (key, cmd, shift) in keys {
        let action = ShortcutMap::resolve(key, cmd, shift, false, false).unwrap();
        editor.dispatch(action);
    }
    assert_eq!(editor.scene().len(), 1);
    assert_eq!(editor.selected(), None);
    assert_eq!(
        ShortcutMap::resolve("s", false, false, false, true),
        Some(ShortcutAction::SaveProject)
    );
}
