use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color;
use crate::config::ProjectConfig;
use crate::state::AppState;
use crate::trace::graph::{TraceGraph, Verdict};
use crate::trace::layout::{head_line, meta_lines};
use crate::ui::export;

// ---------------------------------------------------------------------------
// Left side panel – limits, summary, points, trace
// ---------------------------------------------------------------------------

/// Render the left analysis panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Spec limits");
            ui.separator();
            limits_editor(ui, state);

            ui.add_space(8.0);
            ui.heading("Analysis");
            ui.separator();
            summary(ui, state);

            if state.report.is_some() {
                egui::CollapsingHeader::new(RichText::new("Points").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| points_table(ui, state));
            }

            ui.add_space(8.0);
            ui.heading("Traceability");
            ui.separator();
            match &state.trace_view {
                Some(graph) => trace_browser(ui, graph),
                None => {
                    ui.label("No trace records loaded.");
                }
            }
        });
}

fn limits_editor(ui: &mut Ui, state: &mut AppState) {
    let analysis = &state.config.analysis;
    let unit = analysis.unit.clone();
    match (analysis.spec_min.as_scalar(), analysis.spec_max.as_scalar()) {
        (Some(mut min), Some(mut max)) => {
            let mut changed = false;
            egui::Grid::new("limits_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Min");
                changed |= ui
                    .add(egui::DragValue::new(&mut min).speed(0.1).suffix(format!(" {unit}")))
                    .changed();
                ui.end_row();
                ui.label("Max");
                changed |= ui
                    .add(egui::DragValue::new(&mut max).speed(0.1).suffix(format!(" {unit}")))
                    .changed();
                ui.end_row();
            });
            if changed {
                state.set_scalar_limits(min, max);
            }
        }
        _ => {
            ui.label(format!(
                "Point-wise limits from config: min {}, max {}",
                analysis.spec_min, analysis.spec_max
            ));
        }
    }
}

fn summary(ui: &mut Ui, state: &AppState) {
    let (Some(series), Some(report)) = (&state.series, &state.report) else {
        ui.label("No analysis yet.");
        return;
    };

    if let Some(source) = &series.source {
        ui.label(format!("Source: {}", source.display()));
    }
    ui.label(format!(
        "{} points ({} vs {})",
        series.len(),
        series.y_column,
        series.x_column
    ));
    if let Some(annotation) = state.annotation() {
        for (i, line) in annotation.lines.iter().enumerate() {
            if i == 0 {
                ui.label(
                    RichText::new(line)
                        .strong()
                        .color(color::status_color(annotation.status)),
                );
            } else {
                ui.label(line.as_str());
            }
        }
    }
    if report.violations() > 0 {
        ui.label(
            RichText::new(format!("{} point(s) out of spec", report.violations()))
                .color(color::status_color(report.status)),
        );
    }
}

fn points_table(ui: &mut Ui, state: &AppState) {
    let (Some(series), Some(report)) = (&state.series, &state.report) else {
        return;
    };

    ui.push_id("points_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(true)
            .max_scroll_height(240.0)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for title in ["#", series.x_column.as_str(), series.y_column.as_str(), "Margin"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, series.len(), |mut row| {
                    let i = row.index();
                    let margin = report.margins[i];
                    row.col(|ui: &mut Ui| {
                        ui.label(i.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.4}", series.x[i]));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.3}", series.y[i]));
                    });
                    row.col(|ui: &mut Ui| {
                        let mut text = RichText::new(format!("{margin:.3}"));
                        if margin < 0.0 {
                            text = text.color(color::status_color(report.status));
                        }
                        if i == report.worst.index {
                            text = text.strong();
                        }
                        ui.label(text);
                    });
                });
            });
    });
}

fn trace_browser(ui: &mut Ui, graph: &TraceGraph) {
    if graph.is_empty() {
        ui.label("Trace file has no records.");
        return;
    }
    let dead = graph.dead_links().len();
    if dead > 0 {
        ui.label(RichText::new(format!("{dead} dead link(s)")).color(Color32::YELLOW));
    }

    ui.strong("Requirement coverage");
    for row in graph.coverage() {
        let label = match row.verdict {
            Verdict::Uncovered => "uncovered",
            Verdict::Unverified => "not verified",
            Verdict::Passed => "passed",
            Verdict::Failed => "failed",
        };
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new(label).color(color::verdict_color(row.verdict)));
            ui.label(format!("{} {}", row.id, row.title));
        })
        .response
        .on_hover_text(format!(
            "Covered by: {}\nValidated by: {}",
            row.covered_by.join(", "),
            row.results.join(", ")
        ));
    }
    ui.separator();

    for need in graph.needs() {
        egui::CollapsingHeader::new(head_line(need))
            .id_salt(&need.id)
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                egui::Grid::new(("need_meta", &need.id))
                    .num_columns(2)
                    .show(ui, |ui: &mut Ui| {
                        for (label, value) in meta_lines(graph, need) {
                            ui.strong(label);
                            ui.label(value);
                            ui.end_row();
                        }
                    });
            });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open measurements…").clicked() {
                open_series_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open config…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open trace records…").clicked() {
                open_trace_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_report = state.report.is_some();
            if ui
                .add_enabled(has_report, egui::Button::new("Save plot as PNG…"))
                .clicked()
            {
                export::request_screenshot(ui.ctx(), state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_report, egui::Button::new("Export report JSON…"))
                .clicked()
            {
                export_report_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(report) = &state.report {
            ui.label(
                RichText::new(report.status.to_string())
                    .strong()
                    .color(color::status_color(report.status)),
            );
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        } else if let Some(msg) = &state.info_message {
            ui.label(msg.as_str());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_series_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open measurements")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_series(&path, &state.config.analysis.columns) {
            Ok(series) => {
                log::info!(
                    "Loaded {} points ({} vs {}) from {:?}",
                    series.len(),
                    series.y_column,
                    series.x_column,
                    path
                );
                state.set_series(series);
            }
            Err(e) => state.fail(format!("Error: {e:#}")),
        }
    }
}

pub fn open_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open config")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match ProjectConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                state.set_config(config);
            }
            Err(e) => state.fail(format!("Error: {e:#}")),
        }
    }
}

pub fn open_trace_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open trace records")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match crate::trace::loader::load_graph(&path, &state.config.trace) {
            Ok(graph) => state.set_trace(graph),
            Err(e) => state.fail(format!("Error: {e:#}")),
        }
    }
}

pub fn export_report_dialog(state: &mut AppState) {
    let Some(record) = state.report_record() else {
        return;
    };
    let default_name = format!("{}.json", export::file_stem(&record.title));
    if let Some(path) = rfd::FileDialog::new()
        .set_title("Export report")
        .set_file_name(&default_name)
        .add_filter("JSON", &["json"])
        .save_file()
    {
        if let Err(e) = record.write_json(&path) {
            state.fail(format!("Error: {e:#}"));
        }
    }
}
