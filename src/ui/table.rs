use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Dataset;
use crate::data::summary::{self, ColumnSummary};
use crate::state::{AppState, ROWS_PER_PAGE};

// ---------------------------------------------------------------------------
// Central panel – raw data table and summary table
// ---------------------------------------------------------------------------

/// Render the data views: the paginated raw table on top, the per-column
/// summary table below. Summaries are derived fresh every frame from the
/// current dataset, never cached.
pub fn data_panel(ui: &mut Ui, state: &mut AppState) {
    if state.sessions.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view data  (File → Open…)");
        });
        return;
    }

    let pages = state.page_count();
    let page = state.page.min(pages - 1);
    let mut goto = page;

    let session = &state.sessions[0];

    ui.push_id("raw_table", |ui| {
        raw_table(ui, &session.dataset, page);
    });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("◀").clicked() {
            goto = page.saturating_sub(1);
        }
        ui.label(format!("page {} / {pages}", page + 1));
        if ui.button("▶").clicked() {
            goto = (page + 1).min(pages - 1);
        }
    });

    ui.separator();
    ui.heading("Summary statistics");

    match summary::summarize(&session.dataset) {
        Ok(summaries) => {
            ui.push_id("summary_table", |ui| {
                summary_table(ui, &summaries);
            });
        }
        Err(e) => {
            log::error!("Failed to summarize dataset: {e}");
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
    }

    state.page = goto;
}

/// One page of raw rows.
fn raw_table(ui: &mut Ui, dataset: &Dataset, page: usize) {
    let start = page * ROWS_PER_PAGE;
    let end = (start + ROWS_PER_PAGE).min(dataset.row_count());

    TableBuilder::new(ui)
        .striped(true)
        .columns(TableColumn::auto().resizable(true), dataset.len())
        .header(20.0, |mut header| {
            for col in &dataset.columns {
                header.col(|ui| {
                    ui.strong(&col.name);
                });
            }
        })
        .body(|mut body| {
            for row_idx in start..end {
                body.row(18.0, |mut row| {
                    for col in &dataset.columns {
                        row.col(|ui| {
                            ui.label(col.values[row_idx].to_string());
                        });
                    }
                });
            }
        });
}

const SUMMARY_HEADERS: [&str; 9] = [
    "column", "dtype", "count", "mean", "min", "25%", "50%", "75%", "max",
];

/// Per-column summary rows; absent numeric fields render as "n/a".
fn summary_table(ui: &mut Ui, summaries: &[ColumnSummary]) {
    TableBuilder::new(ui)
        .striped(true)
        .columns(TableColumn::auto().resizable(true), SUMMARY_HEADERS.len())
        .header(20.0, |mut header| {
            for title in SUMMARY_HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for s in summaries {
                let num = s.numeric.as_ref();
                let fields = [
                    num.map(|n| n.mean),
                    num.map(|n| n.min),
                    num.map(|n| n.p25),
                    num.map(|n| n.p50),
                    num.map(|n| n.p75),
                    num.map(|n| n.max),
                ];
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&s.name);
                    });
                    row.col(|ui| {
                        ui.label(s.dtype.to_string());
                    });
                    row.col(|ui| {
                        ui.label(s.count.to_string());
                    });
                    for field in fields {
                        row.col(|ui| {
                            ui.label(match field {
                                Some(x) => format!("{x:.2}"),
                                None => "n/a".to_string(),
                            });
                        });
                    }
                });
            }
        });
}
