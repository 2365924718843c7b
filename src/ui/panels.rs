use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Local};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::loader;
use crate::data::model::UploadSession;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – upload controls and file metadata
// ---------------------------------------------------------------------------

/// Render the left controls panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(8.0);
    ui.heading("Dataglance");
    ui.label("Perform a first-pass exploration of your tabular data.");
    ui.add_space(8.0);

    if ui.button("Open files…").clicked() {
        open_files(state);
    }
    ui.add_space(4.0);
    ui.separator();

    let Some(session) = state.current() else {
        ui.label("No file loaded.");
        return;
    };

    ui.strong("File name");
    ui.label(&session.filename);
    ui.add_space(4.0);

    ui.strong("Last modified");
    match &session.modified {
        Some(ts) => ui.label(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => ui.label("unknown"),
    };
    ui.add_space(4.0);

    ui.strong("Shape");
    ui.label(format!(
        "{} rows, {} columns",
        session.dataset.row_count(),
        session.dataset.len()
    ));

    if state.sessions.len() > 1 {
        ui.add_space(4.0);
        ui.label(format!(
            "{} files loaded, showing the first",
            state.sessions.len()
        ));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_files(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = state.current() {
            ui.label(format!(
                "{}: {} rows, {} columns",
                session.filename,
                session.dataset.row_count(),
                session.dataset.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Let the user pick one or more files, parse them all, and replace the
/// session list. A file that fails to parse contributes no session; the
/// failure is logged and surfaced as an inline message.
pub fn open_files(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "xlsx", "xls", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .add_filter("JSON", &["json"])
        .pick_files();

    let Some(paths) = files else { return };

    state.loading = true;
    let mut sessions = Vec::with_capacity(paths.len());
    let mut failed = false;

    for path in &paths {
        match read_session(path) {
            Ok(session) => {
                log::info!(
                    "Loaded {} with {} rows, {} columns",
                    session.filename,
                    session.dataset.row_count(),
                    session.dataset.len()
                );
                sessions.push(session);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                failed = true;
            }
        }
    }

    state.set_sessions(sessions);
    if failed {
        state.status_message = Some("There was an error processing this file.".to_string());
    }
}

/// Read a file from disk and parse it into an [`UploadSession`].
fn read_session(path: &Path) -> anyhow::Result<UploadSession> {
    let bytes = std::fs::read(path).context("reading file")?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let dataset = loader::parse_bytes(&bytes, &filename)?;

    let modified = std::fs::metadata(path)
        .ok()
        .and_then(|m| m.modified().ok())
        .map(DateTime::<Local>::from);

    Ok(UploadSession {
        filename,
        modified,
        dataset,
    })
}
