use eframe::egui::{self, Pos2, Ui};

use super::super::ViewModel;
use super::super::camera::zoom_for_scroll;

/// Hit test in screen space against the radii actually drawn this frame
/// (hover/selection scaling and entrance progress included, so the hit
/// area always matches what is visible). Later draw order wins overlaps,
/// keeping hits consistent with what is painted on top. An unrevealed
/// node has radius 0 and can never be hit.
pub(in crate::app) fn hit_test(
    draw_order: &[usize],
    screen_positions: &[Pos2],
    screen_radii: &[f32],
    pointer: Pos2,
) -> Option<usize> {
    draw_order.iter().rev().copied().find(|&index| {
        let radius = screen_radii[index];
        radius > 0.0 && screen_positions[index].distance(pointer) <= radius
    })
}

impl ViewModel {
    pub(in crate::app) fn handle_wheel_zoom(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        // egui reports scroll-up as positive; the wheel mapping speaks
        // browser deltaY, so flip the sign.
        self.camera.zoom_by(zoom_for_scroll(-scroll));
        log::trace!("camera scale -> {:.3}", self.camera.scale);
    }

    /// Primary-button drag pans the camera, but only when the gesture
    /// started on empty space; a press on a node stays a click.
    pub(in crate::app) fn handle_drag(
        &mut self,
        response: &egui::Response,
        pressed_node: Option<usize>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.drag_on_node = pressed_node.is_some();
        }

        if response.dragged_by(egui::PointerButton::Primary) && !self.drag_on_node {
            self.camera.pan(response.drag_delta());
            log::trace!(
                "camera offset -> ({:.1}, {:.1})",
                self.camera.offset.x,
                self.camera.offset.y
            );
        }

        if response.drag_stopped_by(egui::PointerButton::Primary) {
            if !self.drag_on_node {
                self.camera.release_drag();
            }
            self.drag_on_node = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn center_always_hits() {
        let order = vec![0];
        let positions = vec![pos2(100.0, 100.0)];
        let radii = vec![12.0];
        assert_eq!(hit_test(&order, &positions, &radii, pos2(100.0, 100.0)), Some(0));
    }

    #[test]
    fn just_outside_never_hits() {
        let order = vec![0];
        let positions = vec![pos2(100.0, 100.0)];
        let radii = vec![12.0];
        assert_eq!(hit_test(&order, &positions, &radii, pos2(112.5, 100.0)), None);
        assert_eq!(hit_test(&order, &positions, &radii, pos2(112.0, 100.0)), Some(0));
    }

    #[test]
    fn unrevealed_nodes_are_transparent_to_hits() {
        let order = vec![0];
        let positions = vec![pos2(50.0, 50.0)];
        let radii = vec![0.0];
        assert_eq!(hit_test(&order, &positions, &radii, pos2(50.0, 50.0)), None);
    }

    #[test]
    fn topmost_drawn_node_wins_overlaps() {
        // Node 1 draws after node 0, so it is on top.
        let order = vec![0, 1];
        let positions = vec![pos2(100.0, 100.0), pos2(104.0, 100.0)];
        let radii = vec![10.0, 10.0];
        assert_eq!(hit_test(&order, &positions, &radii, pos2(101.0, 100.0)), Some(1));

        // Outside node 1 but inside node 0 still falls through.
        assert_eq!(hit_test(&order, &positions, &radii, pos2(91.0, 100.0)), Some(0));
    }
}
