use std::path::PathBuf;

use eframe::egui;
use scatter_label::app::ScatterLabelApp;
use scatter_label::config::LabelOptions;
use scatter_label::state::AppState;

/// Usage: `scatter-label [TABLE] [OPTIONS.json]`
fn main() -> eframe::Result {
    env_logger::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let table_path = args.next();
    let options = match args.next() {
        Some(path) => LabelOptions::from_json_file(&path).unwrap_or_else(|e| {
            log::error!("{e:#}; using default options");
            LabelOptions::default()
        }),
        None => LabelOptions::default(),
    };

    let mut state = AppState::with_options(options);
    if let Some(path) = table_path {
        state.open_path(&path);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Scatter Label",
        native_options,
        Box::new(|_cc| Ok(Box::new(ScatterLabelApp::new(state)))),
    )
}
