//! Editor configuration and tool settings.
//!
//! `EditorConfig` is fixed for the lifetime of an editor session and can be
//! supplied as JSON by the host page. `ToolSettings` is the mutable state of
//! the toolbar (current text, font, colors) that new objects are built from.

use crate::model::{Color, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for an editor session. Every field has a default, so a
/// partial JSON object (or `{}`) is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: Color,

    /// Where newly added objects are placed. Default: **(100, 100)**.
    pub insert_x: f32,
    pub insert_y: f32,

    /// Offset of a duplicate from its source, on both axes. Default: **10**.
    pub duplicate_offset: f32,

    /// Initial scale applied to inserted images. Default: **0.5**.
    pub image_scale: f32,

    /// Maximum number of undo snapshots kept. `None` keeps every snapshot.
    pub history_limit: Option<usize>,

    /// Key under which the project collection is persisted.
    pub storage_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            background: Color::WHITE,
            insert_x: 100.0,
            insert_y: 100.0,
            duplicate_offset: 10.0,
            image_scale: 0.5,
            history_limit: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

pub const DEFAULT_STORAGE_KEY: &str = "pixellab_projects";

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns a message if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("Config parse error: {e}"))?;
        if config.canvas_width == 0 || config.canvas_height == 0 {
            return Err("Config error: canvas size must be non-zero".to_string());
        }
        Ok(config)
    }
}

// ─── Tool settings ────────────────────────────────────────────────────────

pub const FONT_FAMILIES: &[&str] = &[
    "Arial",
    "Georgia",
    "Times New Roman",
    "Courier New",
    "Verdana",
];

pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 100.0;
pub const MIN_STROKE_WIDTH: f32 = 0.0;
pub const MAX_STROKE_WIDTH: f32 = 10.0;

/// Toolbar state: the values new objects are created with, and the values
/// pushed onto the selected object when the user changes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub text: String,
    pub font_family: String,
    pub font_size: f32,
    pub font_color: Color,
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            text: "Add text".to_string(),
            font_family: FONT_FAMILIES[0].to_string(),
            font_size: 24.0,
            font_color: Color::BLACK,
            fill_color: Color::rgb(0x3B, 0x82, 0xF6),
            stroke_color: Color::BLACK,
            stroke_width: 1.0,
        }
    }
}

impl ToolSettings {
    pub fn clamp_font_size(size: f32) -> f32 {
        if size.is_nan() {
            return MIN_FONT_SIZE;
        }
        size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    }

    pub fn clamp_stroke_width(width: f32) -> f32 {
        if width.is_nan() {
            return MIN_STROKE_WIDTH;
        }
        width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
    }
}
