//! Scene → tiny-skia pixmap.
//!
//! CPU rasterizer used for headless export. Walks the object list in paint
//! order and fills/strokes each shape under its object transform. Text is
//! set in the embedded DejaVu Sans regardless of the requested family. The
//! browser build renders through Canvas2D instead and only shares the
//! encoder.

use crate::hit::object_affine;
use crate::image_src::decode_data_url;
use ab_glyph::{Font, FontRef, ScaleFont, point};
use pl_core::model::{Color, FontSpec, ObjectKind, Scene, SceneObject, TEXT_LINE_HEIGHT};
use std::sync::LazyLock;
use tiny_skia::{
    ColorU8, FillRule, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

static FONT: LazyLock<Option<FontRef<'static>>> = LazyLock::new(|| {
    FontRef::try_from_slice(include_bytes!("../assets/DejaVuSans.ttf"))
        .map_err(|e| log::error!("embedded font failed to load: {e}"))
        .ok()
});

/// Rasterize a scene at 1:1 scale. Returns `None` for a zero-sized canvas.
pub fn rasterize(scene: &Scene) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(scene.width, scene.height)?;
    let bg = scene.background;
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

    for object in &scene.objects {
        paint_object(&mut pixmap, object);
    }
    Some(pixmap)
}

/// Straight (non-premultiplied) RGBA bytes, row-major.
pub fn to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

fn paint_object(pixmap: &mut Pixmap, object: &SceneObject) {
    let ts = to_skia(object);
    let opacity = object.transform.opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }

    match &object.kind {
        ObjectKind::Text { content, font } => {
            let color = object.style.fill.unwrap_or(Color::BLACK);
            paint_text(pixmap, content, font, color, opacity, ts);
        }
        ObjectKind::Rect { width, height } => {
            if let Some(rect) = Rect::from_xywh(0.0, 0.0, *width, *height) {
                paint_shape(pixmap, &PathBuilder::from_rect(rect), object, opacity, ts);
            }
        }
        ObjectKind::Circle { radius } => {
            if let Some(path) = PathBuilder::from_circle(*radius, *radius, *radius) {
                paint_shape(pixmap, &path, object, opacity, ts);
            }
        }
        ObjectKind::Triangle { width, height } => {
            let mut pb = PathBuilder::new();
            pb.move_to(width / 2.0, 0.0);
            pb.line_to(*width, *height);
            pb.line_to(0.0, *height);
            pb.close();
            if let Some(path) = pb.finish() {
                paint_shape(pixmap, &path, object, opacity, ts);
            }
        }
        ObjectKind::Image { src, .. } => paint_image(pixmap, object, src, opacity, ts),
    }
}

fn paint_shape(pixmap: &mut Pixmap, path: &Path, object: &SceneObject, opacity: f32, ts: Transform) {
    if let Some(fill) = object.style.fill {
        let paint = solid(fill, opacity);
        pixmap.fill_path(path, &paint, FillRule::Winding, ts, None);
    }
    if let Some(stroke) = &object.style.stroke
        && stroke.width > 0.0
    {
        let paint = solid(stroke.color, opacity);
        let style = Stroke {
            width: stroke.width,
            ..Stroke::default()
        };
        pixmap.stroke_path(path, &paint, &style, ts, None);
    }
}

fn paint_image(pixmap: &mut Pixmap, object: &SceneObject, src: &str, opacity: f32, ts: Transform) {
    let decoded = match decode_data_url(src) {
        Ok(d) => d,
        Err(e) => {
            log::warn!("Skipping image {} during export: {e}", object.id);
            return;
        }
    };
    let Some(mut image) = Pixmap::new(decoded.width, decoded.height) else {
        return;
    };
    for (dst, px) in image.pixels_mut().iter_mut().zip(decoded.pixels.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    let paint = PixmapPaint {
        opacity,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, ts, None);
}

/// Lay out `content` line by line into a coverage layer in the object's
/// local frame, then composite it like an image.
fn paint_text(
    pixmap: &mut Pixmap,
    content: &str,
    spec: &FontSpec,
    color: Color,
    opacity: f32,
    ts: Transform,
) {
    let Some(font) = FONT.as_ref() else {
        return;
    };
    if !(spec.size.is_finite() && spec.size > 0.0) {
        return;
    }
    let scaled = font.as_scaled(spec.size);
    let line_height = spec.size * TEXT_LINE_HEIGHT;
    let lines: Vec<&str> = content.split('\n').collect();

    let advance = |line: &str| {
        let mut width = 0.0;
        let mut prev = None;
        for c in line.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    };
    let width = lines.iter().map(|&l| advance(l)).fold(0.0_f32, f32::max);
    let height = lines.len() as f32 * line_height;
    let Some(mut layer) = Pixmap::new(width.ceil() as u32 + 2, height.ceil() as u32 + 2) else {
        return;
    };
    let (layer_w, layer_h) = (layer.width() as i32, layer.height() as i32);
    let pixels = layer.pixels_mut();

    for (row, line) in lines.iter().enumerate() {
        let baseline = row as f32 * line_height + scaled.ascent();
        let mut caret = 0.0;
        let mut prev = None;
        for c in line.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scaled.scale(), point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outline) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= layer_w || y >= layer_h {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * color.a as f32).round() as u8;
                let px = &mut pixels[(y * layer_w + x) as usize];
                if alpha > px.alpha() {
                    *px = ColorU8::from_rgba(color.r, color.g, color.b, alpha).premultiply();
                }
            });
        }
    }

    let paint = PixmapPaint {
        opacity,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, ts, None);
}

fn solid(color: Color, opacity: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    let alpha = (color.a as f32 * opacity).round() as u8;
    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
    paint.anti_alias = true;
    paint
}

fn to_skia(object: &SceneObject) -> Transform {
    let a = object_affine(object).as_coeffs();
    Transform::from_row(
        a[0] as f32,
        a[1] as f32,
        a[2] as f32,
        a[3] as f32,
        a[4] as f32,
        a[5] as f32,
    )
}
