use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, ColorImage};
use image::{Rgba, RgbaImage};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// PNG export of the rendered report
// ---------------------------------------------------------------------------

/// Ask for a target file and request a viewport screenshot for the next frame.
pub fn request_screenshot(ctx: &egui::Context, state: &mut AppState) {
    let default_name = format!("{}.png", file_stem(&state.config.analysis.title));
    if let Some(path) = rfd::FileDialog::new()
        .set_title("Save plot as PNG")
        .set_file_name(&default_name)
        .add_filter("PNG", &["png"])
        .save_file()
    {
        state.screenshot_path = Some(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(Default::default()));
    }
}

/// Write a pending screenshot once egui delivers it.
pub fn handle_screenshot(ctx: &egui::Context, state: &mut AppState) {
    if state.screenshot_path.is_none() {
        return;
    }
    let Some(image) = ctx.input(|i| {
        i.events.iter().rev().find_map(|e| {
            if let egui::Event::Screenshot { image, .. } = e {
                Some(image.clone())
            } else {
                None
            }
        })
    }) else {
        return;
    };

    if let Some(path) = state.screenshot_path.take() {
        match save_png(&image, &path) {
            Ok(()) => state.notify(format!("Saved {}", path.display())),
            Err(e) => state.fail(format!("Failed to save plot: {e:#}")),
        }
    }
}

/// Encode an egui image as PNG.
pub fn save_png(image: &ColorImage, path: &Path) -> Result<()> {
    let [w, h] = image.size;
    let mut out = RgbaImage::new(w as u32, h as u32);
    for y in 0..h {
        for x in 0..w {
            let p = image.pixels[y * w + x];
            out.put_pixel(x as u32, y as u32, Rgba([p.r(), p.g(), p.b(), p.a()]));
        }
    }
    out.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

/// Title reduced to something safe for a file name.
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "report".to_string()
    } else {
        stem.to_string()
    }
}
