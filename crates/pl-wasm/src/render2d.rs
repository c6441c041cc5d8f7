//! Canvas2D renderer.
//!
//! Walks the scene in paint order and draws to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. Each object is drawn in its local frame after
//! applying its transform, so geometry matches `pl_render::hit`.

use pl_core::id::ObjectId;
use pl_core::model::*;
use pl_render::hit::object_bounds;
use std::cell::RefCell;
use std::collections::HashMap;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

const SELECTION_COLOR: &str = "#4FC3F7";

/// Decoded `<img>` elements for image objects, keyed by object id.
///
/// The browser decodes asynchronously: an image that is not `complete` yet
/// is skipped and appears on a later frame.
#[derive(Default)]
pub struct ImageCache {
    elements: RefCell<HashMap<ObjectId, HtmlImageElement>>,
}

impl ImageCache {
    fn get_or_load(&self, id: ObjectId, src: &str) -> Option<HtmlImageElement> {
        let mut elements = self.elements.borrow_mut();
        if let Some(img) = elements.get(&id) {
            return Some(img.clone());
        }
        let img = match HtmlImageElement::new() {
            Ok(img) => img,
            Err(e) => {
                log::warn!("cannot create <img> for {id}: {e:?}");
                return None;
            }
        };
        img.set_src(src);
        elements.insert(id, img.clone());
        Some(img)
    }

    /// Drop elements whose object left the scene.
    fn retain_scene(&self, scene: &Scene) {
        self.elements.borrow_mut().retain(|id, _| scene.contains(*id));
    }

    /// True when every image element created so far has finished loading.
    pub fn all_loaded(&self) -> bool {
        self.elements.borrow().values().all(|img| img.complete())
    }
}

/// Render the whole scene. `selected` gets a bounding box with handles;
/// pass `None` for export.
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    selected: Option<ObjectId>,
    images: &ImageCache,
) {
    let (w, h) = (scene.width as f64, scene.height as f64);
    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str(&scene.background.to_css());
    ctx.fill_rect(0.0, 0.0, w, h);

    images.retain_scene(scene);
    for object in &scene.objects {
        render_object(ctx, object, images);
    }

    if let Some(object) = selected.and_then(|id| scene.get(id)) {
        draw_selection(ctx, object);
    }
}

fn render_object(ctx: &CanvasRenderingContext2d, object: &SceneObject, images: &ImageCache) {
    let t = &object.transform;
    if t.opacity <= 0.0 {
        return;
    }

    ctx.save();
    let _ = ctx.translate(t.left as f64, t.top as f64);
    let _ = ctx.rotate((t.angle as f64).to_radians());
    let _ = ctx.scale(t.scale_x as f64, t.scale_y as f64);
    ctx.set_global_alpha(t.opacity.clamp(0.0, 1.0) as f64);

    match &object.kind {
        ObjectKind::Text { content, font } => draw_text(ctx, content, font, &object.style),
        ObjectKind::Rect { width, height } => {
            ctx.begin_path();
            ctx.rect(0.0, 0.0, *width as f64, *height as f64);
            fill_and_stroke(ctx, &object.style);
        }
        ObjectKind::Circle { radius } => {
            let r = *radius as f64;
            ctx.begin_path();
            let _ = ctx.ellipse(r, r, r, r, 0.0, 0.0, std::f64::consts::TAU);
            fill_and_stroke(ctx, &object.style);
        }
        ObjectKind::Triangle { width, height } => {
            let (w, h) = (*width as f64, *height as f64);
            ctx.begin_path();
            ctx.move_to(w / 2.0, 0.0);
            ctx.line_to(w, h);
            ctx.line_to(0.0, h);
            ctx.close_path();
            fill_and_stroke(ctx, &object.style);
        }
        ObjectKind::Image { src, width, height } => {
            if let Some(img) = images.get_or_load(object.id, src)
                && img.complete()
            {
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    &img,
                    0.0,
                    0.0,
                    *width as f64,
                    *height as f64,
                );
            }
        }
    }

    ctx.restore();
}

fn fill_and_stroke(ctx: &CanvasRenderingContext2d, style: &Style) {
    if let Some(fill) = style.fill {
        ctx.set_fill_style_str(&fill.to_css());
        ctx.fill();
    }
    if let Some(stroke) = &style.stroke
        && stroke.width > 0.0
    {
        ctx.set_stroke_style_str(&stroke.color.to_css());
        ctx.set_line_width(stroke.width as f64);
        ctx.stroke();
    }
}

fn draw_text(ctx: &CanvasRenderingContext2d, content: &str, font: &FontSpec, style: &Style) {
    let size = font.size as f64;
    ctx.set_font(&format!("{size}px {}", font.family));
    ctx.set_text_baseline("top");
    ctx.set_fill_style_str(&style.fill.unwrap_or(Color::BLACK).to_css());

    let line_height = size * TEXT_LINE_HEIGHT as f64;
    for (i, line) in content.split('\n').enumerate() {
        let _ = ctx.fill_text(line, 0.0, i as f64 * line_height);
    }
}

/// Axis-aligned bounding box of the (possibly rotated) object plus corner
/// handles.
fn draw_selection(ctx: &CanvasRenderingContext2d, object: &SceneObject) {
    let b = object_bounds(object);
    let (x, y, w, h) = (b.x0, b.y0, b.width(), b.height());

    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(x, y, w, h);

    let handle_size = 6.0;
    let half = handle_size / 2.0;
    ctx.set_fill_style_str("#FFFFFF");
    ctx.set_line_width(1.5);
    let corners = [
        (x - half, y - half),
        (x + w - half, y - half),
        (x - half, y + h - half),
        (x + w - half, y + h - half),
    ];
    for (hx, hy) in corners {
        ctx.fill_rect(hx, hy, handle_size, handle_size);
        ctx.stroke_rect(hx, hy, handle_size, handle_size);
    }
    ctx.restore();
}
