mod app;
mod layout;
mod notes;
mod util;

use clap::Parser;

use app::{GalaxyApp, Theme};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Notes file: a JSON tree object, or an array of trees.
    notes: String,

    /// Replay the finished tree as a simulated stream, revealing one note
    /// at a time.
    #[arg(long)]
    replay_stream: bool,

    /// Starting color theme: cosmos, nebula, or ember.
    #[arg(long, default_value = "cosmos")]
    theme: String,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let theme = Theme::from_name(&args.theme).unwrap_or_else(|| {
        log::warn!("unknown theme {:?}, falling back to cosmos", args.theme);
        Theme::default()
    });

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Knowledge Galaxy",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(GalaxyApp::new(
                args.notes.clone(),
                args.replay_stream,
                theme,
            )))
        }),
    )
}
