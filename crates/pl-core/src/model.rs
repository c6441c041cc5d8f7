//! Scene data model for PixelLab documents.
//!
//! A scene is a flat, ordered list of objects on a fixed-size canvas.
//! Paint order is list order: the last object is drawn on top. Each object
//! carries its own transform (position, scale, rotation, opacity) and style.
//!
//! `Scene` is the snapshot type stored by undo history and by saved
//! projects. Everything here serializes to JSON without loss.

use crate::id::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// 8-bit RGBA color. Serialized as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional, which matches what `<input type=color>` hands over.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let mut c = [255u8; 4];
                for (slot, &digit) in c.iter_mut().zip(bytes) {
                    *slot = hex_val(digit)? * 17;
                }
                Some(Self::rgba(c[0], c[1], c[2], c[3]))
            }
            6 | 8 => {
                let mut c = [255u8; 4];
                for (slot, pair) in c.iter_mut().zip(bytes.chunks(2)) {
                    *slot = hex_val(pair[0])? << 4 | hex_val(pair[1])?;
                }
                Some(Self::rgba(c[0], c[1], c[2], c[3]))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// CSS color string for Canvas2D style setters.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            self.to_hex()
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Stroke / Font ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".into(),
            size: 24.0,
        }
    }
}

/// Line height multiplier used when measuring text boxes.
pub const TEXT_LINE_HEIGHT: f32 = 1.16;

/// Average glyph advance as a fraction of the font size.
/// Text measurement without a font context is an estimate.
pub const TEXT_CHAR_WIDTH: f32 = 0.6;

// ─── Styling ─────────────────────────────────────────────────────────────

/// Paint attributes of an object. Text uses `fill` as its glyph color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

// ─── Transform ───────────────────────────────────────────────────────────

/// Placement of an object on the canvas.
///
/// The origin is the object's top-left corner: the object is scaled,
/// then rotated by `angle` degrees about that corner, then moved to
/// `(left, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub left: f32,
    pub top: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub angle: f32,
    pub opacity: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            opacity: 1.0,
        }
    }
}

impl Transform {
    pub fn at(left: f32, top: f32) -> Self {
        Self {
            left,
            top,
            ..Self::default()
        }
    }
}

// ─── Objects ─────────────────────────────────────────────────────────────

/// The kind of a canvas object together with its unscaled geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Text {
        content: String,
        font: FontSpec,
    },
    Rect {
        width: f32,
        height: f32,
    },
    Circle {
        radius: f32,
    },
    /// Isosceles triangle pointing up, inscribed in its `width × height` box.
    Triangle {
        width: f32,
        height: f32,
    },
    /// Raster image. `src` is a `data:` URL holding the encoded file;
    /// `width`/`height` are the decoded pixel dimensions.
    Image {
        src: String,
        width: u32,
        height: u32,
    },
}

impl ObjectKind {
    /// Short lowercase name, as shown in the property panel.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Text { .. } => "text",
            ObjectKind::Rect { .. } => "rect",
            ObjectKind::Circle { .. } => "circle",
            ObjectKind::Triangle { .. } => "triangle",
            ObjectKind::Image { .. } => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub style: Style,
}

impl SceneObject {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            transform: Transform::default(),
            style: Style::default(),
        }
    }

    /// Size before scaling, in canvas units.
    pub fn natural_size(&self) -> (f32, f32) {
        match &self.kind {
            ObjectKind::Text { content, font } => {
                let lines: Vec<&str> = content.split('\n').collect();
                let widest = lines
                    .iter()
                    .map(|l| l.chars().count())
                    .max()
                    .unwrap_or(0);
                (
                    widest as f32 * font.size * TEXT_CHAR_WIDTH,
                    lines.len() as f32 * font.size * TEXT_LINE_HEIGHT,
                )
            }
            ObjectKind::Rect { width, height } | ObjectKind::Triangle { width, height } => {
                (*width, *height)
            }
            ObjectKind::Circle { radius } => (radius * 2.0, radius * 2.0),
            ObjectKind::Image { width, height, .. } => (*width as f32, *height as f32),
        }
    }

    /// Size after scaling (rotation not applied).
    pub fn scaled_size(&self) -> (f32, f32) {
        let (w, h) = self.natural_size();
        (w * self.transform.scale_x, h * self.transform.scale_y)
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// The whole editable document at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Empty scene with the given canvas size and a white background.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Color::WHITE,
            objects: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Append an object on top of everything else.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    /// Remove an object, returning it if it existed.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.index_of(id)?;
        Some(self.objects.remove(idx))
    }

    /// Clone an object under a fresh ID, shifted by `(dx, dy)`, and place
    /// the clone on top. Returns the new ID.
    pub fn duplicate(&mut self, id: ObjectId, dx: f32, dy: f32) -> Option<ObjectId> {
        let mut clone = self.get(id)?.clone();
        clone.id = ObjectId::with_prefix(clone.kind.name());
        clone.transform.left += dx;
        clone.transform.top += dy;
        Some(self.add(clone))
    }

    /// Serialize to the JSON document stored in history exports and projects.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Scene serialization error: {e}"))
    }

    /// Parse a scene from its JSON document.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Scene parse error: {e}"))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}
