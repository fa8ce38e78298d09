use eframe::egui;

use crate::state::AppState;
use crate::ui::{export, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MarginViewApp {
    pub state: AppState,
}

impl eframe::App for MarginViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: limits, summary, trace ----
        egui::SidePanel::left("analysis_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: report plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::margin_plot(ui, &self.state);
        });

        export::handle_screenshot(ctx, &mut self.state);
    }
}
