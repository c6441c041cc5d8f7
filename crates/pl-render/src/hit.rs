//! Hit testing: point → object lookup.
//!
//! Walks the object list back to front (last painted = topmost) and maps the
//! pointer into each object's local space, so rotated and scaled objects are
//! hit on their actual outline rather than on an axis-aligned box.

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape};
use pl_core::model::{ObjectKind, Scene, SceneObject};
use pl_core::ObjectId;

/// Local → canvas transform of an object.
pub fn object_affine(object: &SceneObject) -> Affine {
    let t = &object.transform;
    Affine::translate((t.left as f64, t.top as f64))
        * Affine::rotate((t.angle as f64).to_radians())
        * Affine::scale_non_uniform(t.scale_x as f64, t.scale_y as f64)
}

/// Axis-aligned bounding box of an object on the canvas.
pub fn object_bounds(object: &SceneObject) -> Rect {
    let (w, h) = object.natural_size();
    object_affine(object).transform_rect_bbox(Rect::new(0.0, 0.0, w as f64, h as f64))
}

/// Find the topmost object at canvas position (px, py).
/// Returns `None` when the point is over the background.
pub fn hit_test(scene: &Scene, px: f32, py: f32) -> Option<ObjectId> {
    let point = Point::new(px as f64, py as f64);
    scene
        .objects
        .iter()
        .rev()
        .find(|object| contains(object, point))
        .map(|object| object.id)
}

/// Whether a canvas point lies on an object's outline or inside it.
pub fn contains(object: &SceneObject, point: Point) -> bool {
    let affine = object_affine(object);
    // A zero scale collapses the object; nothing to hit.
    if affine.determinant().abs() < f64::EPSILON {
        return false;
    }
    let local = affine.inverse() * point;
    let (w, h) = object.natural_size();
    let (w, h) = (w as f64, h as f64);

    match &object.kind {
        ObjectKind::Text { .. } | ObjectKind::Rect { .. } | ObjectKind::Image { .. } => {
            // Inclusive on every edge, unlike `Rect::contains`.
            (0.0..=w).contains(&local.x) && (0.0..=h).contains(&local.y)
        }
        ObjectKind::Circle { radius } => {
            let r = *radius as f64;
            Circle::new((r, r), r).contains(local)
        }
        ObjectKind::Triangle { .. } => triangle_path(w, h).contains(local),
    }
}

/// Outline of an up-pointing triangle inscribed in a `w × h` box.
pub fn triangle_path(w: f64, h: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((w / 2.0, 0.0));
    path.line_to((w, h));
    path.line_to((0.0, h));
    path.close_path();
    path
}
