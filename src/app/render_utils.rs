use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2, pos2, vec2};

use crate::util::stable_pair;

const STAR_COUNT: usize = 140;
const STAR_LAYERS: usize = 3;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (alpha.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Deep-space background: theme fill plus a hashed starfield. Star layers
/// drift with pan at different rates for parallax and twinkle on a slow
/// sine.
pub(super) fn draw_background(
    painter: &Painter,
    rect: Rect,
    pan: Vec2,
    time: f64,
    background: Color32,
    star_color: Color32,
) {
    painter.rect_filled(rect, 0.0, background);

    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }

    for layer in 0..STAR_LAYERS {
        let parallax = 0.08 + layer as f32 * 0.07;
        let stars_in_layer = STAR_COUNT / STAR_LAYERS;

        for index in 0..stars_in_layer {
            let (ux, uy) = stable_pair(&format!("star-{layer}-{index}"));
            let base_x = (ux * 0.5 + 0.5) * rect.width();
            let base_y = (uy * 0.5 + 0.5) * rect.height();

            let x = (base_x + pan.x * parallax).rem_euclid(rect.width()) + rect.left();
            let y = (base_y + pan.y * parallax).rem_euclid(rect.height()) + rect.top();

            let twinkle =
                ((time * (0.6 + layer as f64 * 0.3) + index as f64 * 1.7).sin() * 0.5 + 0.5) as f32;
            let alpha = 0.25 + twinkle * 0.45;
            let size = 0.6 + layer as f32 * 0.5 + twinkle * 0.4;

            painter.circle_filled(pos2(x, y), size, with_alpha(star_color, alpha));
        }
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Cull test for a connection by the bounding box of its chord plus the
/// curve bulge.
pub(super) fn connection_visible(rect: Rect, start: Pos2, end: Pos2, bulge: f32) -> bool {
    let min_x = start.x.min(end.x) - bulge;
    let max_x = start.x.max(end.x) + bulge;
    let min_y = start.y.min(end.y) - bulge;
    let max_y = start.y.max(end.y) + bulge;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Control point for a parent-child connection: the chord midpoint pushed
/// perpendicular by a distance-proportional, capped amount.
pub(super) fn connection_control_point(start: Pos2, end: Pos2, max_bulge: f32) -> Pos2 {
    let chord = end - start;
    let length = chord.length();
    if length <= f32::EPSILON {
        return start;
    }

    let mid = start + chord * 0.5;
    let perpendicular = vec2(-chord.y, chord.x) / length;
    mid + perpendicular * (length * 0.18).min(max_bulge)
}

pub(super) fn quad_bezier_point(start: Pos2, control: Pos2, end: Pos2, t: f32) -> Pos2 {
    let t = t.clamp(0.0, 1.0);
    let inverse = 1.0 - t;
    let x = inverse * inverse * start.x + 2.0 * inverse * t * control.x + t * t * end.x;
    let y = inverse * inverse * start.y + 2.0 * inverse * t * control.y + t * t * end.y;
    pos2(x, y)
}
