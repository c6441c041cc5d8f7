//! Editor session: the live scene, its history, selection and toolbar state.
//!
//! Every committed mutation clones the scene into the `History`. Undo and
//! redo replace the live scene with the snapshot the history hands back.
//! Hosts (the WASM bridge, tests) drive the editor only through this type.

use crate::history::History;
use crate::shortcuts::ShortcutAction;
use pl_core::config::{EditorConfig, ToolSettings};
use pl_core::id::ObjectId;
use pl_core::model::{Color, FontSpec, ObjectKind, Scene, SceneObject, Stroke, Transform};
use pl_render::export::{ExportError, ExportFormat, export_scene};
use pl_render::hit::hit_test;
use pl_render::image_src::{self, ImageLoadError};
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_RECT_SIZE: (f32, f32) = (150.0, 100.0);
pub const DEFAULT_CIRCLE_RADIUS: f32 = 50.0;
pub const DEFAULT_TRIANGLE_SIZE: (f32, f32) = (100.0, 100.0);

/// Handle for an image decode started with [`Editor::begin_image_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTicket(u64);

impl ImageTicket {
    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Property-panel view of the selected object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectProps {
    pub kind: &'static str,
    /// Scaled width, rounded to whole canvas units.
    pub width: f32,
    pub height: f32,
    /// Degrees, rounded.
    pub angle: f32,
    /// Rounded to two decimals.
    pub opacity: f32,
}

pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    history: History<Scene>,
    selection: Option<ObjectId>,
    tools: ToolSettings,
    pending_images: HashSet<ImageTicket>,
    next_ticket: u64,
    disposed: bool,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let mut scene = Scene::new(config.canvas_width, config.canvas_height);
        scene.background = config.background;
        let history = match config.history_limit {
            Some(max) => History::with_max_depth(scene.clone(), max),
            None => History::new(scene.clone()),
        };
        Self {
            config,
            scene,
            history,
            selection: None,
            tools: ToolSettings::default(),
            pending_images: HashSet::new(),
            next_ticket: 1,
            disposed: false,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    pub fn history(&self) -> &History<Scene> {
        &self.history
    }

    /// Clone of the live scene, e.g. for saving as a project.
    pub fn snapshot(&self) -> Scene {
        self.scene.clone()
    }

    /// Record the live scene as a new history entry.
    ///
    /// Mutating methods call this themselves. Hosts call it directly after
    /// an uncommitted edit such as [`Editor::preview_move`] finishes.
    pub fn commit(&mut self) {
        self.history.capture(self.scene.clone());
    }

    // ─── Insertion ───────────────────────────────────────────────────────

    pub fn add_text(&mut self) -> ObjectId {
        let kind = ObjectKind::Text {
            content: self.tools.text.clone(),
            font: FontSpec {
                family: self.tools.font_family.clone(),
                size: self.tools.font_size,
            },
        };
        let mut object = self.new_object(kind);
        object.style.fill = Some(self.tools.font_color);
        self.insert(object)
    }

    pub fn add_rect(&mut self) -> ObjectId {
        let (width, height) = DEFAULT_RECT_SIZE;
        self.insert_shape(ObjectKind::Rect { width, height })
    }

    pub fn add_circle(&mut self) -> ObjectId {
        self.insert_shape(ObjectKind::Circle {
            radius: DEFAULT_CIRCLE_RADIUS,
        })
    }

    pub fn add_triangle(&mut self) -> ObjectId {
        let (width, height) = DEFAULT_TRIANGLE_SIZE;
        self.insert_shape(ObjectKind::Triangle { width, height })
    }

    fn insert_shape(&mut self, kind: ObjectKind) -> ObjectId {
        let mut object = self.new_object(kind);
        object.style.fill = Some(self.tools.fill_color);
        object.style.stroke = Some(self.tool_stroke());
        self.insert(object)
    }

    fn new_object(&self, kind: ObjectKind) -> SceneObject {
        let id = ObjectId::with_prefix(kind.name());
        let mut object = SceneObject::new(id, kind);
        object.transform = Transform::at(self.config.insert_x, self.config.insert_y);
        object
    }

    fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = self.scene.add(object);
        self.selection = Some(id);
        self.commit();
        log::debug!("added {id}");
        id
    }

    fn tool_stroke(&self) -> Stroke {
        Stroke {
            color: self.tools.stroke_color,
            width: self.tools.stroke_width,
        }
    }

    // ─── Delete / Duplicate ──────────────────────────────────────────────

    /// Remove the selected object. Returns `false` with nothing selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.take() else {
            return false;
        };
        if self.scene.remove(id).is_none() {
            return false;
        }
        self.commit();
        true
    }

    /// Clone the selected object, offset by the configured duplicate offset,
    /// and select the clone.
    pub fn duplicate_selected(&mut self) -> Option<ObjectId> {
        let id = self.selection?;
        let offset = self.config.duplicate_offset;
        let copy = self.scene.duplicate(id, offset, offset)?;
        self.selection = Some(copy);
        self.commit();
        Some(copy)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<ObjectId> {
        self.selection
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.scene.get(self.selection?)
    }

    /// Select an object by id. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: ObjectId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.selection = Some(id);
        true
    }

    /// Select the topmost object under a canvas point, or clear the
    /// selection when the point hits nothing.
    pub fn select_at(&mut self, x: f32, y: f32) -> Option<ObjectId> {
        self.selection = hit_test(&self.scene, x, y);
        self.selection
    }

    pub fn clear_selection(&mut self) -> bool {
        self.selection.take().is_some()
    }

    // ─── Tool settings ───────────────────────────────────────────────────

    pub fn set_text(&mut self, text: &str) -> bool {
        self.tools.text = text.to_string();
        self.restyle_selected(|obj, tools| {
            if let ObjectKind::Text { content, .. } = &mut obj.kind {
                *content = tools.text.clone();
            }
        })
    }

    pub fn set_font_family(&mut self, family: &str) -> bool {
        self.tools.font_family = family.to_string();
        self.restyle_selected(|obj, tools| {
            if let ObjectKind::Text { font, .. } = &mut obj.kind {
                font.family = tools.font_family.clone();
            }
        })
    }

    /// Set the font size, clamped to the allowed range.
    pub fn set_font_size(&mut self, size: f32) -> bool {
        self.tools.font_size = ToolSettings::clamp_font_size(size);
        self.restyle_selected(|obj, tools| {
            if let ObjectKind::Text { font, .. } = &mut obj.kind {
                font.size = tools.font_size;
            }
        })
    }

    pub fn set_font_color(&mut self, hex: &str) -> bool {
        let Some(color) = Color::from_hex(hex) else {
            log::warn!("ignoring invalid font color {hex:?}");
            return false;
        };
        self.tools.font_color = color;
        self.restyle_selected(|obj, tools| {
            if matches!(obj.kind, ObjectKind::Text { .. }) {
                obj.style.fill = Some(tools.font_color);
            }
        })
    }

    pub fn set_fill_color(&mut self, hex: &str) -> bool {
        let Some(color) = Color::from_hex(hex) else {
            log::warn!("ignoring invalid fill color {hex:?}");
            return false;
        };
        self.tools.fill_color = color;
        self.restyle_selected(|obj, tools| {
            if is_shape(&obj.kind) {
                obj.style.fill = Some(tools.fill_color);
            }
        })
    }

    pub fn set_stroke_color(&mut self, hex: &str) -> bool {
        let Some(color) = Color::from_hex(hex) else {
            log::warn!("ignoring invalid stroke color {hex:?}");
            return false;
        };
        self.tools.stroke_color = color;
        self.restyle_selected(|obj, tools| {
            if is_shape(&obj.kind) {
                let stroke = obj.style.stroke.get_or_insert_with(Stroke::default);
                stroke.color = tools.stroke_color;
            }
        })
    }

    /// Set the stroke width, clamped to the allowed range.
    pub fn set_stroke_width(&mut self, width: f32) -> bool {
        self.tools.stroke_width = ToolSettings::clamp_stroke_width(width);
        self.restyle_selected(|obj, tools| {
            if is_shape(&obj.kind) {
                let stroke = obj.style.stroke.get_or_insert_with(Stroke::default);
                stroke.width = tools.stroke_width;
            }
        })
    }

    /// Push the current tool settings onto the selected object. Returns
    /// `true` and captures only if the object actually changed.
    fn restyle_selected(&mut self, apply: impl FnOnce(&mut SceneObject, &ToolSettings)) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        let Some(object) = self.scene.get_mut(id) else {
            return false;
        };
        let before = object.clone();
        apply(object, &self.tools);
        if *object == before {
            return false;
        }
        self.commit();
        true
    }

    // ─── Property panel ──────────────────────────────────────────────────

    pub fn selected_props(&self) -> Option<ObjectProps> {
        let object = self.selected_object()?;
        let (width, height) = object.scaled_size();
        Some(ObjectProps {
            kind: object.kind.name(),
            width: width.round(),
            height: height.round(),
            angle: object.transform.angle.round(),
            opacity: (object.transform.opacity * 100.0).round() / 100.0,
        })
    }

    /// Rescale the selected object so its width becomes `width`.
    pub fn set_selected_width(&mut self, width: f32) -> bool {
        if !(width.is_finite() && width > 0.0) {
            return false;
        }
        self.modify_selected(|obj| {
            let (natural, _) = obj.natural_size();
            if natural > 0.0 {
                obj.transform.scale_x = width / natural;
            }
        })
    }

    /// Rescale the selected object so its height becomes `height`.
    pub fn set_selected_height(&mut self, height: f32) -> bool {
        if !(height.is_finite() && height > 0.0) {
            return false;
        }
        self.modify_selected(|obj| {
            let (_, natural) = obj.natural_size();
            if natural > 0.0 {
                obj.transform.scale_y = height / natural;
            }
        })
    }

    pub fn set_selected_angle(&mut self, degrees: f32) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        self.modify_selected(|obj| obj.transform.angle = degrees)
    }

    pub fn set_selected_opacity(&mut self, opacity: f32) -> bool {
        if opacity.is_nan() {
            return false;
        }
        self.modify_selected(|obj| obj.transform.opacity = opacity.clamp(0.0, 1.0))
    }

    // ─── External modification ───────────────────────────────────────────

    /// Apply an arbitrary edit to the selected object and capture it once.
    /// Returns `false` with nothing selected.
    pub fn modify_selected(&mut self, edit: impl FnOnce(&mut SceneObject)) -> bool {
        let Some(object) = self.selection.and_then(|id| self.scene.get_mut(id)) else {
            return false;
        };
        edit(object);
        self.commit();
        true
    }

    pub fn move_selected(&mut self, dx: f32, dy: f32) -> bool {
        if !(dx.is_finite() && dy.is_finite()) {
            return false;
        }
        self.modify_selected(|obj| {
            obj.transform.left += dx;
            obj.transform.top += dy;
        })
    }

    /// Move the selected object without capturing. Used for live dragging;
    /// the host calls [`Editor::commit`] when the drag ends.
    pub fn preview_move(&mut self, dx: f32, dy: f32) -> bool {
        if !(dx.is_finite() && dy.is_finite()) {
            return false;
        }
        let Some(object) = self.selection.and_then(|id| self.scene.get_mut(id)) else {
            return false;
        };
        object.transform.left += dx;
        object.transform.top += dy;
        true
    }

    /// Replace the content of a text object after in-place editing.
    pub fn set_object_text(&mut self, id: ObjectId, text: &str) -> bool {
        let Some(ObjectKind::Text { content, .. }) = self.scene.get_mut(id).map(|o| &mut o.kind)
        else {
            return false;
        };
        if content.as_str() == text {
            return false;
        }
        *content = text.to_string();
        self.commit();
        true
    }

    // ─── Undo / Redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.scene = snapshot.clone();
        self.drop_stale_selection();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.scene = snapshot.clone();
        self.drop_stale_selection();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selection
            && !self.scene.contains(id)
        {
            self.selection = None;
        }
    }

    // ─── Projects / Export ───────────────────────────────────────────────

    /// Replace the live scene with a loaded project and capture it.
    pub fn load_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.selection = None;
        self.commit();
        log::debug!("loaded scene with {} objects", self.scene.len());
    }

    /// Rasterize the live scene and encode it. Reads state only.
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        export_scene(&self.scene, format)
    }

    // ─── Image loading ───────────────────────────────────────────────────

    /// Register a pending image decode. Returns `None` once disposed.
    pub fn begin_image_load(&mut self) -> Option<ImageTicket> {
        if self.disposed {
            return None;
        }
        let ticket = ImageTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending_images.insert(ticket);
        Some(ticket)
    }

    /// Complete a pending decode with the uploaded file bytes.
    ///
    /// Returns `Ok(None)` if the ticket was cancelled (or the editor
    /// disposed) in the meantime; the scene is left untouched. On a decode
    /// failure nothing is inserted and nothing is captured.
    pub fn finish_image_load(
        &mut self,
        ticket: ImageTicket,
        bytes: &[u8],
    ) -> Result<Option<ObjectId>, ImageLoadError> {
        if !self.pending_images.remove(&ticket) {
            log::debug!("image ticket {} no longer pending, dropping result", ticket.0);
            return Ok(None);
        }
        let decoded = match image_src::decode(bytes) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("image upload rejected: {e}");
                return Err(e);
            }
        };
        let kind = ObjectKind::Image {
            src: image_src::to_data_url(bytes, decoded.mime),
            width: decoded.width,
            height: decoded.height,
        };
        let mut object = self.new_object(kind);
        object.transform.scale_x = self.config.image_scale;
        object.transform.scale_y = self.config.image_scale;
        Ok(Some(self.insert(object)))
    }

    pub fn cancel_image_load(&mut self, ticket: ImageTicket) -> bool {
        self.pending_images.remove(&ticket)
    }

    pub fn pending_image_loads(&self) -> usize {
        self.pending_images.len()
    }

    /// Tear the session down: every pending image load is cancelled and no
    /// new one can start.
    pub fn dispose(&mut self) {
        if !self.pending_images.is_empty() {
            log::debug!("dispose: cancelling {} image loads", self.pending_images.len());
        }
        self.pending_images.clear();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Execute an edit action. Returns `true` if the scene or selection
    /// changed. `SaveProject` belongs to the host and returns `false`.
    pub fn dispatch(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::AddText => {
                self.add_text();
                true
            }
            ShortcutAction::AddRect => {
                self.add_rect();
                true
            }
            ShortcutAction::AddCircle => {
                self.add_circle();
                true
            }
            ShortcutAction::AddTriangle => {
                self.add_triangle();
                true
            }
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::Duplicate => self.duplicate_selected().is_some(),
            ShortcutAction::Deselect => self.clear_selection(),
            ShortcutAction::SaveProject => false,
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

fn is_shape(kind: &ObjectKind) -> bool {
    matches!(
        kind,
        ObjectKind::Rect { .. } | ObjectKind::Circle { .. } | ObjectKind::Triangle { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 0, 255]));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn new_editor_has_single_empty_snapshot() {
        let editor = Editor::default();
        assert!(editor.scene().is_empty());
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
    }

    #[test]
    fn config_shapes_initial_scene() {
        let config = EditorConfig {
            canvas_width: 320,
            canvas_height: 240,
            background: Color::BLACK,
            ..EditorConfig::default()
        };
        let editor = Editor::new(config);
        assert_eq!((editor.scene().width, editor.scene().height), (320, 240));
        assert_eq!(editor.scene().background, Color::BLACK);
    }

    #[test]
    fn add_shapes_use_defaults_and_capture() {
        let mut editor = Editor::default();
        let rect = editor.add_rect();
        let circle = editor.add_circle();
        let tri = editor.add_triangle();
        assert_eq!(editor.history().len(), 4);
        assert_eq!(editor.selected(), Some(tri));

        let r = editor.scene().get(rect).unwrap();
        assert_eq!(
            r.kind,
            ObjectKind::Rect {
                width: 150.0,
                height: 100.0
            }
        );
        assert_eq!((r.transform.left, r.transform.top), (100.0, 100.0));
        assert_eq!(r.style.fill, Some(Color::rgb(0x3B, 0x82, 0xF6)));
        assert_eq!(r.style.stroke, Some(Stroke::default()));

        let c = editor.scene().get(circle).unwrap();
        assert_eq!(c.kind, ObjectKind::Circle { radius: 50.0 });
    }

    #[test]
    fn add_text_takes_font_settings() {
        let mut editor = Editor::default();
        editor.set_text("Hello");
        editor.set_font_family("Georgia");
        editor.set_font_size(40.0);
        editor.set_font_color("#ff0000");
        assert_eq!(editor.history().len(), 1, "no selection, no capture");

        let id = editor.add_text();
        let obj = editor.scene().get(id).unwrap();
        assert_eq!(
            obj.kind,
            ObjectKind::Text {
                content: "Hello".into(),
                font: FontSpec {
                    family: "Georgia".into(),
                    size: 40.0
                }
            }
        );
        assert_eq!(obj.style.fill, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn delete_requires_selection() {
        let mut editor = Editor::default();
        assert!(!editor.delete_selected());

        editor.add_rect();
        assert!(editor.delete_selected());
        assert!(editor.scene().is_empty());
        assert_eq!(editor.selected(), None);
        assert_eq!(editor.history().len(), 3);
        assert!(!editor.delete_selected());
    }

    #[test]
    fn duplicate_offsets_and_selects_clone() {
        let mut editor = Editor::default();
        let src = editor.add_circle();
        let copy = editor.duplicate_selected().unwrap();
        assert_ne!(src, copy);
        assert_eq!(editor.selected(), Some(copy));
        let t = editor.scene().get(copy).unwrap().transform;
        assert_eq!((t.left, t.top), (110.0, 110.0));
        assert_eq!(editor.history().len(), 3);

        editor.clear_selection();
        assert_eq!(editor.duplicate_selected(), None);
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn select_at_picks_topmost() {
        let mut editor = Editor::default();
        let first = editor.add_rect();
        let second = editor.add_rect();
        editor.clear_selection();

        assert_eq!(editor.select_at(150.0, 150.0), Some(second));
        assert_eq!(editor.select_at(5.0, 5.0), None);
        assert!(editor.select(first));
        assert!(!editor.select(ObjectId::intern("nothing_here")));
        assert_eq!(editor.selected(), Some(first));
    }

    #[test]
    fn restyle_selected_shape_captures_once() {
        let mut editor = Editor::default();
        let id = editor.add_rect();
        assert!(editor.set_fill_color("#00ff00"));
        assert!(editor.set_stroke_width(4.0));
        assert_eq!(editor.history().len(), 4);

        let obj = editor.scene().get(id).unwrap();
        assert_eq!(obj.style.fill, Some(Color::rgb(0, 255, 0)));
        assert_eq!(obj.style.stroke.as_ref().map(|s| s.width), Some(4.0));

        // Same value again: no change, no capture.
        assert!(!editor.set_fill_color("#00FF00"));
        // Font settings don't apply to shapes.
        assert!(!editor.set_font_size(50.0));
        assert_eq!(editor.history().len(), 4);
    }

    #[test]
    fn invalid_color_is_ignored() {
        let mut editor = Editor::default();
        editor.add_rect();
        assert!(!editor.set_fill_color("blue"));
        assert_eq!(editor.tools().fill_color, Color::rgb(0x3B, 0x82, 0xF6));
    }

    #[test]
    fn clamped_tool_values() {
        let mut editor = Editor::default();
        editor.set_font_size(500.0);
        editor.set_stroke_width(-3.0);
        assert_eq!(editor.tools().font_size, 100.0);
        assert_eq!(editor.tools().stroke_width, 0.0);
    }

    #[test]
    fn props_panel_roundtrip() {
        let mut editor = Editor::default();
        assert_eq!(editor.selected_props(), None);
        editor.add_rect();

        assert!(editor.set_selected_width(300.0));
        assert!(editor.set_selected_height(50.0));
        assert!(editor.set_selected_angle(45.4));
        assert!(editor.set_selected_opacity(1.7));

        assert_eq!(
            editor.selected_props(),
            Some(ObjectProps {
                kind: "rect",
                width: 300.0,
                height: 50.0,
                angle: 45.0,
                opacity: 1.0,
            })
        );
        assert!(!editor.set_selected_width(0.0));
        assert!(!editor.set_selected_opacity(f32::NAN));
        assert_eq!(editor.history().len(), 6);
    }

    #[test]
    fn undo_restores_previous_scene() {
        let mut editor = Editor::default();
        editor.add_rect();
        let after_rect = editor.snapshot();
        editor.add_circle();

        assert!(editor.undo());
        assert_eq!(editor.scene(), &after_rect);
        assert!(editor.can_redo());
        assert!(editor.redo());
        assert_eq!(editor.scene().len(), 2);
        assert!(!editor.redo());
    }

    #[test]
    fn undo_clears_vanished_selection() {
        let mut editor = Editor::default();
        editor.add_rect();
        let circle = editor.add_circle();
        assert_eq!(editor.selected(), Some(circle));
        editor.undo();
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn move_and_preview_move() {
        let mut editor = Editor::default();
        let id = editor.add_triangle();
        assert!(editor.move_selected(5.0, -5.0));
        assert_eq!(editor.history().len(), 3);

        assert!(editor.preview_move(10.0, 0.0));
        assert!(editor.preview_move(10.0, 0.0));
        assert_eq!(editor.history().len(), 3);
        editor.commit();
        assert_eq!(editor.history().len(), 4);
        let t = editor.scene().get(id).unwrap().transform;
        assert_eq!((t.left, t.top), (125.0, 95.0));
    }

    #[test]
    fn non_finite_moves_are_rejected() {
        let mut editor = Editor::default();
        let id = editor.add_rect();
        let before = editor.scene().get(id).unwrap().transform;
        let depth = editor.history().len();

        for (dx, dy) in [(f32::NAN, 0.0), (0.0, f32::INFINITY), (f32::NEG_INFINITY, 1.0)] {
            assert!(!editor.move_selected(dx, dy));
            assert!(!editor.preview_move(dx, dy));
        }
        assert_eq!(editor.history().len(), depth);
        assert_eq!(editor.scene().get(id).unwrap().transform, before);

        // The scene still serializes to a loadable snapshot.
        let json = editor.scene().to_json().unwrap();
        assert_eq!(Scene::from_json(&json).unwrap(), *editor.scene());
    }

    #[test]
    fn set_object_text_only_for_text() {
        let mut editor = Editor::default();
        let text = editor.add_text();
        let rect = editor.add_rect();
        assert!(editor.set_object_text(text, "Edited"));
        assert!(!editor.set_object_text(text, "Edited"));
        assert!(!editor.set_object_text(rect, "nope"));
        assert_eq!(editor.history().len(), 4);
    }

    #[test]
    fn load_scene_captures_and_clears_selection() {
        let mut editor = Editor::default();
        editor.add_rect();
        let mut loaded = Scene::new(100, 100);
        loaded.add(SceneObject::new(
            ObjectId::intern("loaded_circle"),
            ObjectKind::Circle { radius: 5.0 },
        ));
        editor.load_scene(loaded.clone());
        assert_eq!(editor.scene(), &loaded);
        assert_eq!(editor.selected(), None);
        assert_eq!(editor.history().len(), 3);
        assert!(editor.undo());
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn history_limit_from_config() {
        let mut editor = Editor::new(EditorConfig {
            history_limit: Some(3),
            ..EditorConfig::default()
        });
        for _ in 0..5 {
            editor.add_circle();
        }
        assert_eq!(editor.history().len(), 3);
        assert!(editor.undo());
        assert!(editor.undo());
        assert!(!editor.undo());
        assert_eq!(editor.scene().len(), 3);
    }

    #[test]
    fn image_load_inserts_scaled_image() {
        let mut editor = Editor::default();
        let ticket = editor.begin_image_load().unwrap();
        let id = editor
            .finish_image_load(ticket, &png(40, 20))
            .unwrap()
            .unwrap();
        assert_eq!(editor.selected(), Some(id));
        assert_eq!(editor.history().len(), 2);

        let obj = editor.scene().get(id).unwrap();
        assert_eq!(obj.scaled_size(), (20.0, 10.0));
        let ObjectKind::Image { src, .. } = &obj.kind else {
            panic!("expected image, got {:?}", obj.kind);
        };
        assert!(src.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn image_decode_failure_changes_nothing() {
        let mut editor = Editor::default();
        let ticket = editor.begin_image_load().unwrap();
        assert!(editor.finish_image_load(ticket, b"not an image").is_err());
        assert!(editor.scene().is_empty());
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.pending_image_loads(), 0);
    }

    #[test]
    fn cancelled_and_disposed_loads_are_dropped() {
        let mut editor = Editor::default();
        let cancelled = editor.begin_image_load().unwrap();
        assert!(editor.cancel_image_load(cancelled));
        assert_eq!(editor.finish_image_load(cancelled, &png(2, 2)).unwrap(), None);

        let pending = editor.begin_image_load().unwrap();
        editor.dispose();
        assert!(editor.is_disposed());
        assert_eq!(editor.finish_image_load(pending, &png(2, 2)).unwrap(), None);
        assert!(editor.begin_image_load().is_none());
        assert!(editor.scene().is_empty());
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn dispatch_edit_actions() {
        let mut editor = Editor::default();
        assert!(editor.dispatch(ShortcutAction::AddRect));
        assert!(editor.dispatch(ShortcutAction::Duplicate));
        assert!(editor.dispatch(ShortcutAction::Delete));
        assert_eq!(editor.scene().len(), 1);
        assert!(editor.dispatch(ShortcutAction::Undo));
        assert_eq!(editor.scene().len(), 2);
        assert!(editor.dispatch(ShortcutAction::Redo));
        assert!(!editor.dispatch(ShortcutAction::Deselect));
        assert!(!editor.dispatch(ShortcutAction::SaveProject));
    }

    #[test]
    fn export_reads_state_only() {
        let mut editor = Editor::new(EditorConfig {
            canvas_width: 50,
            canvas_height: 40,
            ..EditorConfig::default()
        });
        editor.add_circle();
        let before = editor.history().len();
        let bytes = editor.export(ExportFormat::Png).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(editor.history().len(), before);
    }
}
