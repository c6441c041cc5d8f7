//! WASM bridge for PixelLab: exposes the editor session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM
//! (toolbar, file input, project dialog); everything stateful lives here.

mod logger;
mod render2d;
mod storage;

use pl_core::config::EditorConfig;
use pl_core::id::ObjectId;
use pl_core::model::Scene;
use pl_editor::{Editor, ImageTicket, ProjectStore, ShortcutMap};
use pl_render::export::{ExportFormat, encode_rgba, to_data_url};
use render2d::ImageCache;
use storage::{JsClock, LocalStorage, js_error_message};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// An in-progress pointer drag of the selected object.
struct Drag {
    last: (f32, f32),
    moved: bool,
}

impl Drag {
    /// Advance to `(x, y)` and return the offset from the last position.
    /// `None` when the pointer did not move or the position is not finite.
    fn step(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let (dx, dy) = (x - self.last.0, y - self.last.1);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        self.last = (x, y);
        self.moved = true;
        Some((dx, dy))
    }
}

/// The main WASM-facing canvas controller.
///
/// Holds the editor session and the project store. All interaction from the
/// page goes through this struct.
#[wasm_bindgen]
pub struct PixelCanvas {
    editor: Editor,
    projects: ProjectStore<Scene, LocalStorage, JsClock>,
    images: ImageCache,
    drag: Option<Drag>,
}

#[wasm_bindgen]
impl PixelCanvas {
    /// Create an editor with the default configuration at the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Self {
        let config = EditorConfig {
            canvas_width: width.max(1),
            canvas_height: height.max(1),
            ..EditorConfig::default()
        };
        Self::with_config(config)
    }

    /// Create an editor from a JSON config. Falls back to the defaults (and
    /// logs) when the JSON is invalid.
    pub fn from_config(json: &str) -> Self {
        let config = EditorConfig::from_json(json).unwrap_or_else(|e| {
            log::error!("{e}; using default configuration");
            EditorConfig::default()
        });
        Self::with_config(config)
    }

    /// Change the console log level (`"error"` … `"trace"`).
    pub fn set_log_level(&self, level: &str) -> bool {
        match logger::parse_level(level) {
            Some(filter) => {
                log::set_max_level(filter);
                true
            }
            None => false,
        }
    }

    pub fn width(&self) -> u32 {
        self.editor.scene().width
    }

    pub fn height(&self) -> u32 {
        self.editor.scene().height
    }

    /// Render the scene, with selection chrome, to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        render2d::render_scene(ctx, self.editor.scene(), self.editor.selected(), &self.images);
    }

    /// True once every image element has decoded; until then the page
    /// should keep re-rendering.
    pub fn images_ready(&self) -> bool {
        self.images.all_loaded()
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Select the topmost object under the pointer and start dragging it.
    /// Returns true if the selection changed or a drag started.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> bool {
        if !(x.is_finite() && y.is_finite()) {
            return false;
        }
        let before = self.editor.selected();
        let hit = self.editor.select_at(x, y);
        self.drag = hit.map(|_| Drag {
            last: (x, y),
            moved: false,
        });
        hit.is_some() || before.is_some()
    }

    /// Move the dragged object. Returns true if it moved.
    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        let Some((dx, dy)) = self.drag.as_mut().and_then(|drag| drag.step(x, y)) else {
            return false;
        };
        self.editor.preview_move(dx, dy)
    }

    /// End a drag. A drag that moved the object commits one snapshot.
    pub fn handle_pointer_up(&mut self) -> bool {
        match self.drag.take() {
            Some(Drag { moved: true, .. }) => {
                self.editor.commit();
                true
            }
            _ => false,
        }
    }

    // ─── Insert ──────────────────────────────────────────────────────────

    pub fn add_text(&mut self) -> String {
        self.editor.add_text().to_string()
    }

    pub fn add_rect(&mut self) -> String {
        self.editor.add_rect().to_string()
    }

    pub fn add_circle(&mut self) -> String {
        self.editor.add_circle().to_string()
    }

    pub fn add_triangle(&mut self) -> String {
        self.editor.add_triangle().to_string()
    }

    /// Start an image upload. Returns a ticket for `finish_image_load`, or
    /// `undefined` after `dispose`.
    pub fn begin_image_load(&mut self) -> Option<u32> {
        let ticket = self.editor.begin_image_load()?;
        u32::try_from(ticket.raw()).ok()
    }

    /// Hand over the uploaded file bytes. Returns the new object id, or an
    /// empty string if the file could not be decoded or the load was
    /// cancelled.
    pub fn finish_image_load(&mut self, ticket: u32, bytes: &[u8]) -> String {
        match self
            .editor
            .finish_image_load(ImageTicket::from_raw(ticket as u64), bytes)
        {
            Ok(Some(id)) => id.to_string(),
            Ok(None) => String::new(),
            Err(e) => {
                log::error!("image upload failed: {e}");
                String::new()
            }
        }
    }

    pub fn cancel_image_load(&mut self, ticket: u32) -> bool {
        self.editor.cancel_image_load(ImageTicket::from_raw(ticket as u64))
    }

    // ─── Edit ────────────────────────────────────────────────────────────

    pub fn delete_selected(&mut self) -> bool {
        self.editor.delete_selected()
    }

    /// Returns the id of the duplicate, or an empty string.
    pub fn duplicate_selected(&mut self) -> String {
        self.editor
            .duplicate_selected()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Replace a text object's content after in-place editing.
    pub fn set_object_text(&mut self, id: &str, text: &str) -> bool {
        self.editor.set_object_text(ObjectId::intern(id), text)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn get_selected_id(&self) -> String {
        self.editor
            .selected()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub fn select_by_id(&mut self, id: &str) -> bool {
        self.editor.select(ObjectId::intern(id))
    }

    pub fn clear_selection(&mut self) -> bool {
        self.editor.clear_selection()
    }

    // ─── Tool settings ───────────────────────────────────────────────────

    /// Current tool settings as JSON.
    pub fn get_tool_settings(&self) -> String {
        serde_json::to_string(self.editor.tools()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn set_text(&mut self, text: &str) -> bool {
        self.editor.set_text(text)
    }

    pub fn set_font_family(&mut self, family: &str) -> bool {
        self.editor.set_font_family(family)
    }

    pub fn set_font_size(&mut self, size: f32) -> bool {
        self.editor.set_font_size(size)
    }

    pub fn set_font_color(&mut self, hex: &str) -> bool {
        self.editor.set_font_color(hex)
    }

    pub fn set_fill_color(&mut self, hex: &str) -> bool {
        self.editor.set_fill_color(hex)
    }

    pub fn set_stroke_color(&mut self, hex: &str) -> bool {
        self.editor.set_stroke_color(hex)
    }

    pub fn set_stroke_width(&mut self, width: f32) -> bool {
        self.editor.set_stroke_width(width)
    }

    // ─── Property panel ──────────────────────────────────────────────────

    /// Properties of the selected object as JSON, `{}` with no selection.
    pub fn get_selected_props(&self) -> String {
        self.editor
            .selected_props()
            .and_then(|p| serde_json::to_string(&p).ok())
            .unwrap_or_else(|| "{}".to_string())
    }

    /// Set one property of the selected object. `key` is one of `width`,
    /// `height`, `angle`, `opacity`.
    pub fn set_selected_prop(&mut self, key: &str, value: f32) -> bool {
        match key {
            "width" => self.editor.set_selected_width(value),
            "height" => self.editor.set_selected_height(value),
            "angle" => self.editor.set_selected_angle(value),
            "opacity" => self.editor.set_selected_opacity(value),
            _ => {
                log::warn!("unknown property {key:?}");
                false
            }
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool, "action":"<action_name>"}`. `saveProject` is
    /// reported back for the page to open its dialog.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };
        let changed = self.editor.dispatch(action);
        serde_json::json!({ "changed": changed, "action": action.name() }).to_string()
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Draw the scene without selection chrome onto `ctx` (a canvas of the
    /// scene's size) and return it encoded as a `data:` URL. `format` is
    /// `"png"` or `"jpeg"`. Returns an empty string on failure.
    pub fn export_image(&self, ctx: &CanvasRenderingContext2d, format: &str) -> String {
        let Some(format) = ExportFormat::parse(format) else {
            log::error!("unsupported export format {format:?}");
            return String::new();
        };
        let scene = self.editor.scene();
        render2d::render_scene(ctx, scene, None, &self.images);

        let (w, h) = (scene.width, scene.height);
        let data = match ctx.get_image_data(0.0, 0.0, w as f64, h as f64) {
            Ok(data) => data,
            Err(e) => {
                log::error!("export: cannot read canvas pixels: {}", js_error_message(&e));
                return String::new();
            }
        };
        match encode_rgba(data.data().0, w, h, scene.background, format) {
            Ok(bytes) => to_data_url(&bytes, format),
            Err(e) => {
                log::error!("export failed: {e}");
                String::new()
            }
        }
    }

    /// Suggested download name for `format` (`design.png`, `design.jpg`).
    pub fn export_file_name(format: &str) -> String {
        ExportFormat::parse(format)
            .map(|f| f.file_name())
            .unwrap_or_default()
    }

    // ─── Projects ────────────────────────────────────────────────────────

    /// Saved projects as a JSON array of `{id, name, timestamp, savedOn}`.
    pub fn list_projects(&self) -> String {
        let list: Vec<serde_json::Value> = self
            .projects
            .list()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "timestamp": p.timestamp,
                    "savedOn": p.saved_on(),
                })
            })
            .collect();
        serde_json::Value::Array(list).to_string()
    }

    /// Save the current scene under `name`. Returns the new project id, or
    /// an empty string if storage rejected the write.
    pub fn save_project(&mut self, name: &str) -> String {
        match self.projects.save(name, self.editor.snapshot()) {
            Ok(record) => record.id,
            Err(e) => {
                log::error!("save project {name:?} failed: {e}");
                String::new()
            }
        }
    }

    /// Load a saved project into the editor. Returns false for unknown ids.
    pub fn open_project(&mut self, id: &str) -> bool {
        let Some(record) = self.projects.get(id) else {
            return false;
        };
        self.drag = None;
        self.editor.load_scene(record.snapshot);
        true
    }

    /// Overwrite a saved project with the current scene.
    pub fn update_project(&mut self, id: &str) -> bool {
        match self.projects.update(id, self.editor.snapshot()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("update project {id} failed: {e}");
                false
            }
        }
    }

    pub fn delete_project(&mut self, id: &str) -> bool {
        match self.projects.delete(id) {
            Ok(()) => true,
            Err(e) => {
                log::error!("delete project {id} failed: {e}");
                false
            }
        }
    }

    /// Scene as JSON (the same document stored in projects).
    pub fn get_scene_json(&self) -> String {
        self.editor.scene().to_json().unwrap_or_else(|e| {
            log::error!("{e}");
            String::new()
        })
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Tear down: pending image loads are cancelled and their results
    /// ignored if they still arrive.
    pub fn dispose(&mut self) {
        self.drag = None;
        self.editor.dispose();
    }
}

impl PixelCanvas {
    fn with_config(config: EditorConfig) -> Self {
        console_setup();
        let projects = ProjectStore::new(LocalStorage::new(), JsClock, config.storage_key.clone());
        Self {
            editor: Editor::new(config),
            projects,
            images: ImageCache::default(),
            drag: None,
        }
    }
}

fn console_setup() {
    logger::console_error_panic_hook_setup();
    logger::init(log::LevelFilter::Warn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drag_step_reports_offsets() {
        let mut drag = Drag {
            last: (10.0, 10.0),
            moved: false,
        };
        assert_eq!(drag.step(10.0, 10.0), None);
        assert!(!drag.moved);
        assert_eq!(drag.step(15.0, 7.0), Some((5.0, -3.0)));
        assert_eq!(drag.step(20.0, 7.0), Some((5.0, 0.0)));
        assert!(drag.moved);
    }

    #[test]
    fn drag_step_ignores_non_finite_positions() {
        let mut drag = Drag {
            last: (10.0, 10.0),
            moved: false,
        };
        assert_eq!(drag.step(f32::NAN, 12.0), None);
        assert_eq!(drag.step(12.0, f32::INFINITY), None);
        assert_eq!(drag.last, (10.0, 10.0));
        assert!(!drag.moved);

        // The next real position is measured from the last finite one.
        assert_eq!(drag.step(12.0, 12.0), Some((2.0, 2.0)));
    }
}
