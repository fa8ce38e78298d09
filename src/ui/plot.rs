use eframe::egui::{self, Align2, RichText, Ui};
use egui_plot::{HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::color;
use crate::data::model::SpecLimit;
use crate::report::limit_label;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Report plot (central panel)
// ---------------------------------------------------------------------------

/// Render the measured curve, spec limits and worst-case point.
pub fn margin_plot(ui: &mut Ui, state: &AppState) {
    let series = match &state.series {
        Some(s) => s,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a measurement file to analyze  (File → Open measurements…)");
            });
            return;
        }
    };

    let analysis = &state.config.analysis;
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(analysis.title.as_str());
    });

    let response = Plot::new("margin_plot")
        .legend(Legend::default())
        .x_axis_label(analysis.x_label.clone())
        .y_axis_label(analysis.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = series.points().collect();
            plot_ui.line(
                Line::new(points)
                    .name(format!("Measured {}", series.y_column))
                    .color(color::series_color())
                    .width(1.5),
            );

            for (kind, limit) in [("Min", &analysis.spec_min), ("Max", &analysis.spec_max)] {
                let name = limit_label(kind, limit, &analysis.unit);
                match limit {
                    SpecLimit::Scalar(y) => plot_ui.hline(
                        HLine::new(*y)
                            .name(name)
                            .color(color::limit_color())
                            .style(LineStyle::dashed_loose()),
                    ),
                    // Point-wise limits only line up with a series of the same length.
                    SpecLimit::PerPoint(values) if values.len() == series.len() => {
                        let limit_points: PlotPoints = series
                            .x
                            .iter()
                            .zip(values.iter())
                            .map(|(&x, &y)| [x, y])
                            .collect();
                        plot_ui.line(
                            Line::new(limit_points)
                                .name(name)
                                .color(color::limit_color())
                                .style(LineStyle::dashed_loose()),
                        );
                    }
                    SpecLimit::PerPoint(_) => {}
                }
            }

            if let Some(report) = &state.report {
                plot_ui.points(
                    Points::new(vec![[report.worst.x, report.worst_y]])
                        .name("Critical Point")
                        .color(color::status_color(report.status))
                        .radius(6.0),
                );
            }
        });

    // ---- Analysis annotation (top-left corner of the plot) ----
    if let Some(annotation) = state.annotation() {
        let rect = response.response.rect;
        egui::Area::new(egui::Id::new("margin_annotation"))
            .fixed_pos(rect.left_top() + egui::vec2(12.0, 12.0))
            .pivot(Align2::LEFT_TOP)
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ui.ctx(), |ui: &mut Ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui: &mut Ui| {
                    ui.label(RichText::new("Analysis:").strong());
                    for (i, line) in annotation.lines.iter().enumerate() {
                        let mut text = RichText::new(line);
                        if i == 0 {
                            text = text.color(color::status_color(annotation.status)).strong();
                        }
                        ui.label(text);
                    }
                });
            });
    }
}
