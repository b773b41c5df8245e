use eframe::egui::{self, Color32, Painter, Rect, Sense, Stroke, Ui, Vec2, pos2, vec2};

use super::super::ViewModel;
use super::super::render_utils::{screen_to_world, with_alpha};

const MINIMAP_SIZE: Vec2 = vec2(190.0, 140.0);
const MINIMAP_MARGIN: f32 = 12.0;
const MINIMAP_PADDING: f32 = 10.0;

impl ViewModel {
    /// Corner overview: every revealed node as a dot over the world
    /// bounds, plus the current viewport rectangle. Clicking or dragging
    /// inside it recenters the camera.
    pub(in crate::app) fn draw_minimap(&mut self, ui: &mut Ui, canvas: Rect, painter: &Painter) {
        if !self.show_minimap {
            return;
        }
        let Some(scene) = self.scene.as_ref() else {
            return;
        };

        let map_rect = Rect::from_min_size(
            pos2(
                canvas.right() - MINIMAP_SIZE.x - MINIMAP_MARGIN,
                canvas.bottom() - MINIMAP_SIZE.y - MINIMAP_MARGIN,
            ),
            MINIMAP_SIZE,
        );

        painter.rect_filled(map_rect, 4.0, Color32::from_rgba_unmultiplied(10, 12, 20, 215));
        painter.rect_stroke(
            map_rect,
            4.0,
            Stroke::new(1.0, Color32::from_gray(95)),
            egui::StrokeKind::Inside,
        );

        let bounds = scene.world_bounds;
        let inner = map_rect.shrink(MINIMAP_PADDING);
        let map_scale = (inner.width() / bounds.width().max(1.0))
            .min(inner.height() / bounds.height().max(1.0));
        let to_map =
            |world: Vec2| inner.center() + (world - bounds.center().to_vec2()) * map_scale;

        let progress_known =
            scene.view_scratch.reveal_progress.len() == scene.nodes.len();
        for (index, node) in scene.nodes.iter().enumerate() {
            if progress_known && scene.view_scratch.reveal_progress[index] <= 0.0 {
                continue;
            }
            let dot = to_map(node.pos);
            let size = if self.selected.as_deref() == Some(node.id.as_str()) {
                2.6
            } else {
                1.4
            };
            painter.circle_filled(dot, size, with_alpha(self.theme.depth_color(node.depth), 0.9));
        }

        // Viewport rectangle in world terms, projected onto the map.
        let view_min = screen_to_world(canvas, self.camera.offset, self.camera.scale, canvas.min);
        let view_max = screen_to_world(canvas, self.camera.offset, self.camera.scale, canvas.max);
        let view_rect = Rect::from_min_max(
            to_map(view_min).min(to_map(view_max)),
            to_map(view_min).max(to_map(view_max)),
        )
        .intersect(map_rect);
        if view_rect.is_positive() {
            painter.rect_stroke(
                view_rect,
                0.0,
                Stroke::new(1.0, with_alpha(self.theme.accent(), 0.85)),
                egui::StrokeKind::Inside,
            );
        }

        let response = ui.interact(
            map_rect,
            egui::Id::new("galaxy_minimap"),
            Sense::click_and_drag(),
        );
        if (response.clicked() || response.dragged())
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let world =
                bounds.center().to_vec2() + (pointer - inner.center()) / map_scale.max(1e-6);
            self.camera.cancel_animation();
            self.camera.offset = -world * self.camera.scale;
            log::trace!("minimap navigation to world ({:.0}, {:.0})", world.x, world.y);
        }
    }
}
