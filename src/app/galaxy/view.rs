use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::truncate_label;

use super::super::render_utils::{
    blend_color, circle_visible, connection_control_point, connection_visible, dim_color,
    draw_background, quad_bezier_point, with_alpha, world_to_screen,
};
use super::super::{GalaxyScene, SearchMatchCache, ViewModel};
use super::hit_test;

const ENTRANCE_SECS: f64 = 0.5;
const LABEL_MIN_SCALE: f32 = 0.5;
const SELECTED_RADIUS_SCALE: f32 = 1.8;
const HOVERED_RADIUS_SCALE: f32 = 1.4;
const MAX_CONNECTION_BULGE: f32 = 48.0;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// The selected node's ancestors and descendants; everything else dims in
/// focus mode.
fn relevant_set(scene: &GalaxyScene, selected: usize) -> HashSet<usize> {
    let mut relevant = HashSet::new();
    relevant.insert(selected);

    let mut current = scene.nodes[selected].parent;
    while let Some(index) = current {
        relevant.insert(index);
        current = scene.nodes[index].parent;
    }

    let mut queue = scene.nodes[selected].children.clone();
    while let Some(index) = queue.pop() {
        if relevant.insert(index) {
            queue.extend(scene.nodes[index].children.iter().copied());
        }
    }

    relevant
}

impl ViewModel {
    fn update_screen_space(
        rect: Rect,
        pan: Vec2,
        zoom: f32,
        time: f64,
        selected: Option<usize>,
        hovered: Option<usize>,
        reveal_times: &HashMap<String, f64>,
        scene: &mut GalaxyScene,
    ) {
        let scratch = &mut scene.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        scratch.reveal_progress.clear();

        for (index, node) in scene.nodes.iter().enumerate() {
            let progress = reveal_times
                .get(&node.id)
                .map(|revealed| (((time - revealed) / ENTRANCE_SECS).clamp(0.0, 1.0)) as f32)
                .unwrap_or(0.0);

            let breathing = 1.0 + 0.06 * (time * 2.4 + node.depth as f64 * 0.7).sin() as f32;
            let interaction = if selected == Some(index) {
                SELECTED_RADIUS_SCALE
            } else if hovered == Some(index) {
                HOVERED_RADIUS_SCALE
            } else {
                1.0
            };

            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, node.pos));
            scratch
                .screen_radii
                .push(node.base_radius * breathing * interaction * progress * zoom);
            scratch.reveal_progress.push(progress);
        }
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.scene_revision == self.scene_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let scene = self.scene.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = scene
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.title, query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            scene_revision: self.scene_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_galaxy(&mut self, ui: &mut Ui) {
        let time = ui.input(|input| input.time);
        if self.scene_dirty {
            self.rebuild_scene(time);
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let painter = ui.painter_at(rect);

        draw_background(
            &painter,
            rect,
            self.camera.offset,
            time,
            self.theme.background(),
            self.theme.star_color(),
        );

        self.handle_wheel_zoom(ui, &response);

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);

        // Drag-start disambiguation uses last frame's hit data: a press on
        // a node is a click, not the start of a pan.
        let pressed_node = self.scene.as_ref().and_then(|scene| {
            if scene.view_scratch.screen_positions.len() != scene.nodes.len() {
                return None;
            }
            pointer.and_then(|pos| {
                hit_test(
                    &scene.draw_order,
                    &scene.view_scratch.screen_positions,
                    &scene.view_scratch.screen_radii,
                    pos,
                )
            })
        });
        self.handle_drag(&response, pressed_node);
        self.camera.tick(time);

        let pan = self.camera.offset;
        let zoom = self.camera.scale;
        let theme = self.theme;
        let focus_mode = self.focus_mode;
        let selected_id = self.selected.clone();
        let hovered_id = self.hovered.clone();
        let search_matches = self.cached_search_matches();
        let dragging = response.dragged();
        let clicked = response.clicked_by(egui::PointerButton::Primary);

        let mut pending_selection = None;
        let mut pending_focus = None;
        let mut hover_change = None;
        let mut visible_nodes = 0usize;
        let mut visible_connections = 0usize;

        {
            let Some(scene) = self.scene.as_mut() else {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "Waiting for the first notes to arrive...",
                    FontId::proportional(14.0),
                    Color32::from_gray(180),
                );
                ui.ctx().request_repaint();
                return;
            };

            let selected_index = selected_id
                .as_ref()
                .and_then(|id| scene.index_by_id.get(id))
                .copied();
            let hovered_index = hovered_id
                .as_ref()
                .and_then(|id| scene.index_by_id.get(id))
                .copied();

            Self::update_screen_space(
                rect,
                pan,
                zoom,
                time,
                selected_index,
                hovered_index,
                &self.reveal_times,
                scene,
            );

            let fresh_hover = if dragging {
                None
            } else {
                pointer.and_then(|pos| {
                    hit_test(
                        &scene.draw_order,
                        &scene.view_scratch.screen_positions,
                        &scene.view_scratch.screen_radii,
                        pos,
                    )
                })
            };

            if clicked {
                match fresh_hover {
                    Some(index) => {
                        let node = &scene.nodes[index];
                        pending_selection = Some(Some(node.id.clone()));
                        pending_focus = Some((node.pos, node.base_radius));
                    }
                    None => pending_selection = Some(None),
                }
            }

            let fresh_hover_id = fresh_hover.map(|index| scene.nodes[index].id.clone());
            if fresh_hover_id != hovered_id {
                let ripple = fresh_hover
                    .map(|index| (scene.nodes[index].pos, scene.nodes[index].base_radius));
                hover_change = Some((fresh_hover_id, ripple));
            }

            let focus_set = if focus_mode {
                selected_index.map(|index| relevant_set(scene, index))
            } else {
                None
            };

            // Connections first so nodes draw on top.
            let connection_base = theme.connection_color();
            let max_bulge = MAX_CONNECTION_BULGE * zoom;
            for (index, node) in scene.nodes.iter().enumerate() {
                let Some(parent) = node.parent else { continue };

                let progress = scene.view_scratch.reveal_progress[index]
                    .min(scene.view_scratch.reveal_progress[parent]);
                if progress <= 0.0 {
                    continue;
                }

                let start = scene.view_scratch.screen_positions[parent];
                let end = scene.view_scratch.screen_positions[index];
                if !connection_visible(rect, start, end, max_bulge + 4.0) {
                    continue;
                }

                let endpoint_active = [Some(index), Some(parent)].iter().any(|endpoint| {
                    *endpoint == selected_index || *endpoint == hovered_index
                });

                let pulse = ((time * 2.0 + index as f64 * 0.35).sin() * 0.5 + 0.5) as f32;
                let alpha = (0.22 + 0.30 * pulse) * progress;
                let dimmed = focus_set.as_ref().is_some_and(|set| {
                    !(set.contains(&index) && set.contains(&parent))
                });

                let (width, color) = if endpoint_active {
                    (
                        (2.2 * zoom.sqrt()).clamp(1.0, 4.2),
                        blend_color(connection_base, theme.accent(), 0.65),
                    )
                } else if dimmed {
                    ((0.8 * zoom.sqrt()).clamp(0.4, 2.0), dim_color(connection_base, 0.4))
                } else {
                    ((1.2 * zoom.sqrt()).clamp(0.5, 3.2), connection_base)
                };

                let control = connection_control_point(start, end, max_bulge);
                painter.add(QuadraticBezierShape::from_points_stroke(
                    [start, control, end],
                    false,
                    Color32::TRANSPARENT,
                    Stroke::new(width, with_alpha(color, alpha)),
                ));

                if endpoint_active {
                    let t = (time * 0.45 + index as f64 * 0.13).fract() as f32;
                    let dot = quad_bezier_point(start, control, end, t);
                    painter.circle_filled(
                        dot,
                        (2.4 * zoom.sqrt()).clamp(1.5, 4.0),
                        with_alpha(theme.accent(), 0.9),
                    );
                }
                visible_connections += 1;
            }

            for &index in &scene.draw_order {
                let radius = scene.view_scratch.screen_radii[index];
                if radius <= 0.0 {
                    continue;
                }

                let position = scene.view_scratch.screen_positions[index];
                if !circle_visible(rect, position, radius * 2.0) {
                    continue;
                }
                visible_nodes += 1;

                let node = &scene.nodes[index];
                let progress = scene.view_scratch.reveal_progress[index];
                let is_selected = selected_index == Some(index);
                let is_hovered = hovered_index == Some(index);
                let is_search_match = search_matches
                    .as_ref()
                    .is_some_and(|matches| matches.contains(&index));

                let mut color = theme.depth_color(node.depth);
                let mut label_color = Color32::from_gray(235);
                if focus_set.as_ref().is_some_and(|set| !set.contains(&index)) {
                    color = dim_color(color, 0.35);
                    label_color = Color32::from_gray(120);
                }

                // Layered fills stand in for a radial gradient: wide glow,
                // halo, body, bright core.
                painter.circle_filled(position, radius * 1.7, with_alpha(color, 0.08 * progress));
                painter.circle_filled(position, radius * 1.25, with_alpha(color, 0.20 * progress));
                painter.circle_filled(position, radius, with_alpha(color, 0.92 * progress));
                painter.circle_filled(
                    position,
                    radius * 0.45,
                    with_alpha(blend_color(color, Color32::WHITE, 0.55), progress),
                );
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(10, 10, 16, 190)),
                );

                if is_selected {
                    let ring_pulse = ((time * 3.0).sin() * 0.5 + 0.5) as f32;
                    painter.circle_stroke(
                        position,
                        radius * 1.45 + ring_pulse * 4.0,
                        Stroke::new(1.8, with_alpha(theme.accent(), 0.8 - ring_pulse * 0.3)),
                    );
                    painter.circle_stroke(
                        position,
                        radius * 1.85 + ring_pulse * 7.0,
                        Stroke::new(1.1, with_alpha(theme.accent(), 0.45 - ring_pulse * 0.25)),
                    );
                } else if is_hovered {
                    painter.circle_stroke(
                        position,
                        radius * 1.35,
                        Stroke::new(1.4, with_alpha(theme.accent(), 0.65)),
                    );
                }

                if is_search_match {
                    painter.circle_stroke(
                        position,
                        radius * 1.55,
                        Stroke::new(1.6, with_alpha(theme.search_highlight(), 0.85)),
                    );
                }

                let should_label = zoom >= LABEL_MIN_SCALE
                    && (radius > 6.0 || is_selected || is_hovered || is_search_match);
                if should_label {
                    painter.text(
                        position + vec2(radius + 6.0, 0.0),
                        Align2::LEFT_CENTER,
                        truncate_label(&node.title, 28),
                        FontId::proportional(12.0),
                        label_color,
                    );
                }
            }

            if let Some(index) = hovered_index {
                let node = &scene.nodes[index];
                let readout = format!(
                    "{}  |  depth {}  |  {} children{}",
                    node.title,
                    node.depth,
                    node.children.len(),
                    if node.tags.is_empty() {
                        String::new()
                    } else {
                        format!("  |  {}", node.tags.join(", "))
                    }
                );
                painter.text(
                    rect.left_top() + vec2(10.0, 10.0),
                    Align2::LEFT_TOP,
                    readout,
                    FontId::proportional(13.0),
                    Color32::from_gray(240),
                );
            }
        }

        self.visible_node_count = visible_nodes;
        self.visible_connection_count = visible_connections;

        if let Some(selection) = pending_selection {
            self.set_selected(selection);
            if let Some((world_pos, base_radius)) = pending_focus {
                self.camera.focus_on(world_pos, time);
                self.effects.spawn_burst(world_pos, base_radius);
                log::debug!("focusing camera on selected node");
            }
        }

        if let Some((new_hover, ripple)) = hover_change {
            match &new_hover {
                Some(id) => log::trace!("node hovered: {id}"),
                None => log::trace!("hover cleared"),
            }
            if let Some((world_pos, base_radius)) = ripple {
                self.effects.spawn_ripple(world_pos, base_radius);
            }
            self.hovered = new_hover;
        }

        if self.hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        self.effects.step(delta_seconds);
        for particle in self.effects.iter() {
            painter.circle_filled(
                world_to_screen(rect, pan, zoom, particle.pos),
                (particle.size * zoom.sqrt()).max(0.8),
                with_alpha(theme.accent(), particle.alpha() * 0.8),
            );
        }

        self.draw_minimap(ui, rect, &painter);
        self.draw_overlay(ui.ctx(), rect);

        // Breathing, pulses, and the starfield animate continuously, so
        // the loop stays hot like a canvas requestAnimationFrame driver.
        ui.ctx().request_repaint();
    }
}
