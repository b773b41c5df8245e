use eframe::egui::{self, Align2, Color32, Context, Pos2, Rect, RichText, Vec2, pos2, vec2};

use super::super::ViewModel;
use super::super::render_utils::world_to_screen;

pub(in crate::app) const OVERLAY_MARGIN: f32 = 20.0;
const OVERLAY_GAP: f32 = 14.0;
const OVERLAY_SIZE: Vec2 = vec2(300.0, 250.0);

/// Screen placement for the inspector: to the right of the node, flipped
/// left when it would clip the right canvas edge, vertically clamped with
/// a fixed margin.
pub(in crate::app) fn overlay_position(
    anchor: Pos2,
    node_radius: f32,
    size: Vec2,
    canvas: Rect,
) -> Pos2 {
    let mut x = anchor.x + node_radius + OVERLAY_GAP;
    if x + size.x > canvas.right() - OVERLAY_MARGIN {
        x = anchor.x - node_radius - OVERLAY_GAP - size.x;
    }

    let min_y = canvas.top() + OVERLAY_MARGIN;
    let max_y = (canvas.bottom() - OVERLAY_MARGIN - size.y).max(min_y);
    let y = (anchor.y - size.y * 0.5).clamp(min_y, max_y);

    pos2(x, y)
}

/// Remembers where the overlay last sat so the displayed position only
/// moves when the computed one actually differs.
pub(in crate::app) struct OverlayAnchor {
    last: Option<Pos2>,
}

impl OverlayAnchor {
    pub(in crate::app) fn new() -> Self {
        Self { last: None }
    }

    pub(in crate::app) fn clear(&mut self) {
        self.last = None;
    }

    pub(in crate::app) fn resolve(&mut self, computed: Pos2) -> Pos2 {
        match self.last {
            Some(last) if last.distance(computed) < 0.5 => last,
            _ => {
                self.last = Some(computed);
                computed
            }
        }
    }
}

enum NavAction {
    Select(String),
    Focus,
    Close,
}

impl ViewModel {
    pub(in crate::app) fn draw_overlay(&mut self, ctx: &Context, canvas: Rect) {
        let Some(selected_id) = self.selected.clone() else {
            self.overlay_anchor.clear();
            return;
        };

        let mut action = None;
        let mut focus_target = None;

        {
            let Some(scene) = self.scene.as_ref() else {
                self.overlay_anchor.clear();
                return;
            };
            let Some(&index) = scene.index_by_id.get(&selected_id) else {
                // Selection survives scene rebuilds by id; a node filtered
                // out of the snapshot simply loses its overlay.
                self.overlay_anchor.clear();
                return;
            };

            let node = &scene.nodes[index];
            focus_target = Some(node.pos);

            let screen = world_to_screen(canvas, self.camera.offset, self.camera.scale, node.pos);
            let radius = scene
                .view_scratch
                .screen_radii
                .get(index)
                .copied()
                .unwrap_or(node.base_radius * self.camera.scale);

            let computed = overlay_position(screen, radius, OVERLAY_SIZE, canvas);
            let position = self.overlay_anchor.resolve(computed);

            let parent = node.parent.map(|parent| scene.nodes[parent].id.clone());
            let (prev_sibling, next_sibling) = node
                .parent
                .map(|parent| {
                    let siblings = &scene.nodes[parent].children;
                    let at = siblings.iter().position(|&child| child == index);
                    let prev = at
                        .and_then(|at| at.checked_sub(1))
                        .map(|at| scene.nodes[siblings[at]].id.clone());
                    let next = at
                        .and_then(|at| siblings.get(at + 1))
                        .map(|&sibling| scene.nodes[sibling].id.clone());
                    (prev, next)
                })
                .unwrap_or((None, None));

            egui::Area::new(egui::Id::new("note_inspector"))
                .fixed_pos(position)
                .pivot(Align2::LEFT_TOP)
                .show(ctx, |ui| {
                    egui::Frame::window(&ctx.style()).show(ui, |ui| {
                        ui.set_width(OVERLAY_SIZE.x);
                        ui.set_max_height(OVERLAY_SIZE.y);

                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&node.title).strong());
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.small_button("✕").clicked() {
                                        action = Some(NavAction::Close);
                                    }
                                },
                            );
                        });
                        if !node.tags.is_empty() {
                            ui.small(node.tags.join(", "));
                        }
                        ui.separator();

                        egui::ScrollArea::vertical()
                            .max_height(140.0)
                            .auto_shrink([false, true])
                            .show(ui, |ui| {
                                if node.content.is_empty() {
                                    ui.label(
                                        RichText::new("Still generating...")
                                            .color(Color32::from_gray(140)),
                                    );
                                } else {
                                    ui.label(node.content.as_str());
                                }
                            });

                        ui.separator();
                        ui.horizontal(|ui| {
                            let parent_button =
                                ui.add_enabled(parent.is_some(), egui::Button::new("Parent"));
                            if parent_button.clicked()
                                && let Some(parent_id) = parent.clone()
                            {
                                action = Some(NavAction::Select(parent_id));
                            }

                            let prev_button = ui
                                .add_enabled(prev_sibling.is_some(), egui::Button::new("< Prev"));
                            if prev_button.clicked()
                                && let Some(prev_id) = prev_sibling.clone()
                            {
                                action = Some(NavAction::Select(prev_id));
                            }

                            let next_button = ui
                                .add_enabled(next_sibling.is_some(), egui::Button::new("Next >"));
                            if next_button.clicked()
                                && let Some(next_id) = next_sibling.clone()
                            {
                                action = Some(NavAction::Select(next_id));
                            }

                            if ui.button("Focus").clicked() {
                                action = Some(NavAction::Focus);
                            }
                        });
                    });
                });
        }

        match action {
            Some(NavAction::Select(id)) => {
                self.overlay_anchor.clear();
                self.set_selected(Some(id));
            }
            Some(NavAction::Focus) => {
                if let Some(world_pos) = focus_target {
                    let time = ctx.input(|input| input.time);
                    self.camera.focus_on(world_pos, time);
                }
            }
            Some(NavAction::Close) => {
                self.overlay_anchor.clear();
                self.set_selected(None);
            }
            None => {}
        }
    }
}
