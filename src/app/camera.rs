use eframe::egui::Vec2;

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 3.0;

const ANIMATION_SECS: f64 = 0.6;
// Forcibly ends the animation if the frame driver stalls.
const ANIMATION_GRACE_SECS: f64 = 0.1;

const FOCUS_SCALE_BOOST: f32 = 1.5;
const FOCUS_SCALE_MIN: f32 = 1.8;
const FOCUS_SCALE_MAX: f32 = 2.2;

const INERTIA_DECAY: f32 = 0.95;
const INERTIA_STOP: f32 = 0.1;

/// The pan/zoom transform between world and screen space. Screen position
/// of a world point is `canvas_center + offset + world * scale`.
///
/// Time is injected as seconds so transitions stay testable; egui's
/// `ctx.input(|i| i.time)` feeds it in the app.
pub struct Camera {
    pub scale: f32,
    pub offset: Vec2,
    target_scale: f32,
    target_offset: Vec2,
    start_scale: f32,
    start_offset: Vec2,
    animating: bool,
    animation_start: f64,
    dragging: bool,
    velocity: Vec2,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            target_scale: 1.0,
            target_offset: Vec2::ZERO,
            start_scale: 1.0,
            start_offset: Vec2::ZERO,
            animating: false,
            animation_start: 0.0,
            dragging: false,
            velocity: Vec2::ZERO,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Manual drag. User input wins over an in-flight focus animation.
    /// The recorded velocity stays latent until `release_drag`; `tick`
    /// must not apply it while the pointer still holds the drag.
    pub fn pan(&mut self, delta: Vec2) {
        self.cancel_animation();
        self.offset += delta;
        self.velocity = delta;
        self.dragging = true;
    }

    /// Multiplicative zoom anchored at the canvas center, clamped. The
    /// offset scales by the factor actually applied so the world point
    /// under the center stays put.
    pub fn zoom_by(&mut self, factor: f32) {
        self.cancel_animation();
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.offset *= new_scale / self.scale;
        self.scale = new_scale;
    }

    /// Hand off a finished drag to inertia. A slow release stops dead.
    pub fn release_drag(&mut self) {
        self.dragging = false;
        if self.velocity.x.abs() < INERTIA_STOP && self.velocity.y.abs() < INERTIA_STOP {
            self.velocity = Vec2::ZERO;
        }
    }

    /// Start an eased transition that centers `world_pos` on screen at a
    /// zoomed-in scale.
    pub fn focus_on(&mut self, world_pos: Vec2, now: f64) {
        let target_scale = (self.scale * FOCUS_SCALE_BOOST)
            .clamp(FOCUS_SCALE_MIN, FOCUS_SCALE_MAX)
            .clamp(MIN_SCALE, MAX_SCALE);

        self.start_scale = self.scale;
        self.start_offset = self.offset;
        self.target_scale = target_scale;
        self.target_offset = -world_pos * target_scale;
        self.animating = true;
        self.animation_start = now;
        self.velocity = Vec2::ZERO;
    }

    pub fn reset(&mut self, now: f64, animated: bool) {
        self.dragging = false;
        if animated {
            self.start_scale = self.scale;
            self.start_offset = self.offset;
            self.target_scale = 1.0;
            self.target_offset = Vec2::ZERO;
            self.animating = true;
            self.animation_start = now;
            self.velocity = Vec2::ZERO;
        } else {
            self.cancel_animation();
            self.scale = 1.0;
            self.offset = Vec2::ZERO;
            self.velocity = Vec2::ZERO;
        }
    }

    pub fn cancel_animation(&mut self) {
        self.animating = false;
    }

    /// Advance animation or inertia. Returns true while the camera is
    /// still moving and another frame should be scheduled.
    pub fn tick(&mut self, now: f64) -> bool {
        if self.animating {
            let elapsed = now - self.animation_start;
            let timed_out = elapsed >= ANIMATION_SECS + ANIMATION_GRACE_SECS;
            let t = ((elapsed / ANIMATION_SECS).min(1.0)).max(0.0) as f32;

            if t >= 1.0 || timed_out {
                self.scale = self.target_scale;
                self.offset = self.target_offset;
                self.animating = false;
                return false;
            }

            let eased = ease_out_cubic(t);
            self.scale = self.start_scale + (self.target_scale - self.start_scale) * eased;
            self.offset = self.start_offset + (self.target_offset - self.start_offset) * eased;
            return true;
        }

        // An active drag already moved the offset via `pan` this frame.
        if self.dragging {
            return false;
        }

        if self.velocity.x.abs() < INERTIA_STOP && self.velocity.y.abs() < INERTIA_STOP {
            self.velocity = Vec2::ZERO;
            return false;
        }

        self.offset += self.velocity;
        self.velocity *= INERTIA_DECAY;
        true
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Browser-style wheel mapping: a positive deltaY notch zooms out, a
/// negative one zooms in.
pub fn zoom_for_scroll(delta_y: f32) -> f32 {
    if delta_y > 0.0 { 0.9 } else { 1.1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    #[test]
    fn zoom_stays_clamped_under_repetition() {
        let mut camera = Camera::new();
        for _ in 0..200 {
            camera.zoom_by(1.1);
        }
        assert!(camera.scale <= MAX_SCALE);

        for _ in 0..400 {
            camera.zoom_by(0.9);
        }
        assert!(camera.scale >= MIN_SCALE);
    }

    #[test]
    fn wheel_notches_map_to_fixed_factors() {
        let mut camera = Camera::new();
        camera.zoom_by(zoom_for_scroll(100.0));
        assert!((camera.scale - 0.9).abs() < 1e-6);

        let mut camera = Camera::new();
        camera.zoom_by(zoom_for_scroll(-100.0));
        assert!((camera.scale - 1.1).abs() < 1e-6);
    }

    #[test]
    fn drag_accumulates_into_offset() {
        let mut camera = Camera::new();
        // Pointer travels from (100,100) to (150,130).
        camera.pan(vec2(50.0, 30.0));
        camera.release_drag();
        assert_eq!(camera.offset, vec2(50.0, 30.0));
    }

    #[test]
    fn mid_drag_ticks_do_not_double_pan() {
        let mut camera = Camera::new();

        // The frame loop ticks after every pan; a (100,100)->(150,130)
        // drag split across two frames must still land on (50,30), with
        // inertia deferred until release.
        camera.pan(vec2(30.0, 18.0));
        camera.tick(0.016);
        camera.pan(vec2(20.0, 12.0));
        camera.tick(0.033);
        assert_eq!(camera.offset, vec2(50.0, 30.0));

        camera.release_drag();
        assert!(camera.tick(0.050));
        assert!(camera.offset.x > 50.0);
    }

    #[test]
    fn pan_cancels_focus_animation() {
        let mut camera = Camera::new();
        camera.focus_on(vec2(100.0, 0.0), 0.0);
        assert!(camera.is_animating());

        camera.pan(vec2(5.0, 0.0));
        assert!(!camera.is_animating());
    }

    #[test]
    fn focus_completes_exactly_on_target() {
        let mut camera = Camera::new();
        camera.focus_on(vec2(40.0, -25.0), 0.0);

        camera.tick(0.3);
        assert!(camera.is_animating());

        camera.tick(0.6);
        assert!(!camera.is_animating());

        let expected_scale = 1.8; // 1.0 * 1.5 clamped up to the focus band
        assert_eq!(camera.scale, expected_scale);
        assert_eq!(camera.offset, vec2(-40.0, 25.0) * expected_scale);
    }

    #[test]
    fn stalled_driver_hits_safety_timeout() {
        let mut camera = Camera::new();
        camera.focus_on(vec2(10.0, 10.0), 0.0);

        // First tick long after the duration plus grace.
        let moving = camera.tick(5.0);
        assert!(!moving);
        assert!(!camera.is_animating());
        assert_eq!(camera.scale, camera.target_scale);
        assert_eq!(camera.offset, camera.target_offset);
    }

    #[test]
    fn inertia_decays_to_a_full_stop() {
        let mut camera = Camera::new();
        camera.pan(vec2(20.0, 8.0));
        camera.release_drag();

        let mut frames = 0;
        while camera.tick(0.0) {
            frames += 1;
            assert!(frames < 1_000, "inertia never settled");
        }

        assert!(camera.velocity.x.abs() < INERTIA_STOP);
        assert!(camera.velocity.y.abs() < INERTIA_STOP);
        // Offset moved past the raw drag delta while gliding.
        assert!(camera.offset.x > 20.0);
    }

    #[test]
    fn slow_release_does_not_glide() {
        let mut camera = Camera::new();
        camera.pan(vec2(0.05, 0.05));
        camera.release_drag();
        assert!(!camera.tick(0.0));
        assert_eq!(camera.offset, vec2(0.05, 0.05));
    }

    #[test]
    fn reset_returns_to_defaults() {
        let mut camera = Camera::new();
        camera.zoom_by(1.1);
        camera.pan(vec2(33.0, -7.0));

        camera.reset(0.0, false);
        assert_eq!(camera.scale, 1.0);
        assert_eq!(camera.offset, Vec2::ZERO);

        camera.focus_on(vec2(5.0, 5.0), 0.0);
        camera.reset(1.0, true);
        camera.tick(2.0);
        assert_eq!(camera.scale, 1.0);
        assert_eq!(camera.offset, Vec2::ZERO);
    }
}
