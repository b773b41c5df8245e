use eframe::egui::{self, Context, RichText};

use crate::notes::forest_node_count;

use super::super::ViewModel;

const FPS_WINDOW: usize = 180;

impl ViewModel {
    /// Selection changes funnel through here so the overlay anchor resets
    /// and the change is logged exactly once.
    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        match &selected {
            Some(id) => log::debug!("node selected: {id}"),
            None => log::debug!("selection cleared"),
        }
        self.overlay_anchor.clear();
        self.selected = selected;
    }

    pub(in crate::app) fn update_fps_counter(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt).max(1e-6);
        self.fps_current = 1.0 / dt;
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    fn fps_average(&self) -> f32 {
        if self.fps_samples.is_empty() {
            return 0.0;
        }
        self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32
    }

    pub(in crate::app) fn draw_top_bar(&mut self, ctx: &Context, streaming: bool) {
        egui::TopBottomPanel::top("galaxy_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Knowledge Galaxy");
                ui.separator();

                ui.label("Search:");
                let search_box = ui.add(
                    egui::TextEdit::singleline(&mut self.search)
                        .desired_width(170.0)
                        .hint_text("filter by title"),
                );
                if search_box.changed() {
                    log::trace!("search query: {:?}", self.search.trim());
                }
                if !self.search.is_empty() && ui.small_button("✕").clicked() {
                    self.search.clear();
                }

                ui.separator();
                if ui
                    .button(format!("Theme: {}", self.theme.label()))
                    .clicked()
                {
                    self.theme = self.theme.next();
                    log::debug!("theme switched to {}", self.theme.label());
                }
                ui.checkbox(&mut self.focus_mode, "Focus mode");
                ui.checkbox(&mut self.show_minimap, "Mini-map");
                if ui.button("Reset view").clicked() {
                    let time = ctx.input(|input| input.time);
                    self.camera.reset(time, true);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.show_fps {
                        ui.label(
                            RichText::new(format!(
                                "{:>5.1} fps (avg {:>5.1})",
                                self.fps_current,
                                self.fps_average()
                            ))
                            .monospace()
                            .weak(),
                        );
                        ui.separator();
                    }
                    ui.label(
                        RichText::new(format!(
                            "{} notes | {} drawn | {} links",
                            forest_node_count(&self.notes),
                            self.visible_node_count,
                            self.visible_connection_count
                        ))
                        .weak(),
                    );
                    if streaming {
                        ui.separator();
                        ui.spinner();
                        ui.label(RichText::new("streaming").weak());
                    }
                });
            });
        });
    }
}
