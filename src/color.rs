use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::margin::Status;
use crate::trace::graph::Verdict;

// ---------------------------------------------------------------------------
// HSL helpers
// ---------------------------------------------------------------------------

/// Convert an HSL triple (hue in degrees) to an egui colour.
pub fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl: Hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

const GREEN_HUE: f32 = 120.0;
const RED_HUE: f32 = 0.0;
const BLUE_HUE: f32 = 215.0;
const AMBER_HUE: f32 = 40.0;

// ---------------------------------------------------------------------------
// Chart colours
// ---------------------------------------------------------------------------

/// Measured curve.
pub fn series_color() -> Color32 {
    hsl_color(BLUE_HUE, 0.75, 0.55)
}

/// Spec limit lines.
pub fn limit_color() -> Color32 {
    hsl_color(RED_HUE, 0.75, 0.55)
}

/// Worst-case marker and status text.
pub fn status_color(status: Status) -> Color32 {
    match status {
        Status::Pass => hsl_color(GREEN_HUE, 0.75, 0.40),
        Status::Fail => hsl_color(RED_HUE, 0.85, 0.50),
    }
}

/// Requirement verdict in the trace browser.
pub fn verdict_color(verdict: Verdict) -> Color32 {
    match verdict {
        Verdict::Passed => status_color(Status::Pass),
        Verdict::Failed => status_color(Status::Fail),
        Verdict::Unverified => hsl_color(AMBER_HUE, 0.85, 0.50),
        Verdict::Uncovered => Color32::GRAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_hues() {
        let red = hsl_color(RED_HUE, 1.0, 0.5);
        assert!(red.r() >= 254 && red.g() <= 1 && red.b() <= 1);
        let green = hsl_color(GREEN_HUE, 1.0, 0.5);
        assert!(green.g() >= 254 && green.r() <= 1 && green.b() <= 1);
    }

    #[test]
    fn test_status_colors_differ() {
        let pass = status_color(Status::Pass);
        let fail = status_color(Status::Fail);
        assert_ne!(pass, fail);
        assert!(pass.g() > pass.r());
        assert!(fail.r() > fail.g());
        assert_eq!(verdict_color(Verdict::Failed), fail);
    }
}
