use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

use eframe::egui::{self, Context, Pos2, Rect};

use crate::layout::PositionedNode;
use crate::notes::{NoteNode, forest_node_count, spawn_note_stream};

mod camera;
mod effects;
mod galaxy;
mod render_utils;
mod theme;
mod ui;

pub use theme::Theme;

use camera::Camera;
use effects::EffectBuffer;
use ui::OverlayAnchor;

type SnapshotReceiver = Receiver<Result<Vec<NoteNode>, String>>;

pub struct GalaxyApp {
    notes_path: String,
    replay: bool,
    initial_theme: Theme,
    state: AppState,
    // Stays alive after the first snapshot so streaming updates keep
    // arriving while the galaxy is already on screen.
    stream_rx: Option<SnapshotReceiver>,
}

enum AppState {
    Loading,
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    notes: Vec<NoteNode>,
    theme: Theme,
    focus_mode: bool,
    show_minimap: bool,
    show_fps: bool,
    search: String,
    selected: Option<String>,
    hovered: Option<String>,
    camera: Camera,
    scene: Option<GalaxyScene>,
    scene_dirty: bool,
    scene_revision: u64,
    search_match_cache: Option<SearchMatchCache>,
    // Wall-clock second each node first showed non-empty content; drives
    // the entrance animation and survives scene rebuilds.
    reveal_times: HashMap<String, f64>,
    effects: EffectBuffer,
    drag_on_node: bool,
    overlay_anchor: OverlayAnchor,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    visible_node_count: usize,
    visible_connection_count: usize,
}

struct SearchMatchCache {
    query: String,
    scene_revision: u64,
    matches: Arc<HashSet<usize>>,
}

struct GalaxyScene {
    nodes: Vec<PositionedNode>,
    index_by_id: HashMap<String, usize>,
    draw_order: Vec<usize>,
    world_bounds: Rect,
    view_scratch: ViewScratch,
}

/// Per-frame screen-space buffers, reused across frames to avoid
/// reallocating every repaint.
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    reveal_progress: Vec<f32>,
}

impl ViewModel {
    fn new(notes: Vec<NoteNode>, theme: Theme) -> Self {
        Self {
            notes,
            theme,
            focus_mode: false,
            show_minimap: true,
            show_fps: true,
            search: String::new(),
            selected: None,
            hovered: None,
            camera: Camera::new(),
            scene: None,
            scene_dirty: true,
            scene_revision: 0,
            search_match_cache: None,
            reveal_times: HashMap::new(),
            effects: EffectBuffer::new(),
            drag_on_node: false,
            overlay_anchor: OverlayAnchor::new(),
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            visible_node_count: 0,
            visible_connection_count: 0,
        }
    }

    /// Replace the note forest with a newer streamed snapshot. The scene
    /// is rebuilt lazily on the next frame; selection, camera, and reveal
    /// bookkeeping all carry over by node id.
    fn apply_snapshot(&mut self, notes: Vec<NoteNode>) {
        self.notes = notes;
        self.scene_dirty = true;
    }

    fn show(&mut self, ctx: &Context, streaming: bool) {
        self.update_fps_counter(ctx);
        self.draw_top_bar(ctx, streaming);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_galaxy(ui));
    }
}

impl GalaxyApp {
    pub fn new(notes_path: String, replay: bool, initial_theme: Theme) -> Self {
        let stream_rx = Some(spawn_note_stream(notes_path.clone(), replay));
        Self {
            notes_path,
            replay,
            initial_theme,
            state: AppState::Loading,
            stream_rx,
        }
    }

    fn restart_stream(&mut self) {
        log::info!("reloading notes from {}", self.notes_path);
        self.stream_rx = Some(spawn_note_stream(self.notes_path.clone(), self.replay));
        self.state = AppState::Loading;
    }

    /// Drain everything the loader thread has queued up. Later snapshots
    /// supersede earlier ones, but each is applied in order so reveal
    /// timestamps are recorded for every newly arrived node.
    fn poll_stream(&mut self) {
        let Some(rx) = &self.stream_rx else { return };

        let mut snapshots = Vec::new();
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(message) => snapshots.push(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        for message in snapshots {
            match message {
                Ok(roots) => match &mut self.state {
                    AppState::Ready(model) => model.apply_snapshot(roots),
                    _ => {
                        log::info!("first snapshot received: {} notes", forest_node_count(&roots));
                        self.state =
                            AppState::Ready(Box::new(ViewModel::new(roots, self.initial_theme)));
                    }
                },
                Err(error) => match &self.state {
                    AppState::Ready(_) => log::warn!("note stream error: {error}"),
                    _ => self.state = AppState::Error(error),
                },
            }
        }

        if disconnected {
            self.stream_rx = None;
            if matches!(self.state, AppState::Loading) {
                self.state =
                    AppState::Error("Note stream ended before delivering a snapshot".to_owned());
            } else {
                log::debug!("note stream finished");
            }
        }
    }
}

impl eframe::App for GalaxyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_stream();

        let streaming = self.stream_rx.is_some();
        let mut retry = false;

        match &mut self.state {
            AppState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading notes...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load notes");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        retry = true;
                    }
                });
            }
            AppState::Ready(model) => {
                model.show(ctx, streaming);
            }
        }

        if retry {
            self.restart_stream();
        }
    }
}
