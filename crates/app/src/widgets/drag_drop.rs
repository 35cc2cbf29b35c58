//! Drag and drop of image files onto the window.
//!
//! Uses egui's dropped_files; anything that is not an image is ignored.

use egui::{Context, DroppedFile, Id, Rect, Vec2};
use shared::image::{is_image_path, mime_for_path};
use shared::{ImageBlob, Result};
use std::path::Path;

/// Collects image drops between frames.
pub struct DragDropHandler {
    /// Most recent image drop not yet taken
    dropped: Option<DroppedFile>,
    /// Files are being dragged over the window
    hovering: bool,
    id: Id,
}

impl DragDropHandler {
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            dropped: None,
            hovering: false,
            id: Id::new(id),
        }
    }

    /// Call once per frame.
    pub fn update(&mut self, ctx: &Context) {
        ctx.input(|i| {
            self.hovering = !i.raw.hovered_files.is_empty();
            if let Some(file) = last_image(&i.raw.dropped_files) {
                self.dropped = Some(file.clone());
            }
        });
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Load the pending drop, if any.
    pub fn take_image(&mut self) -> Option<Result<ImageBlob>> {
        self.dropped.take().map(|file| load_dropped(&file))
    }

    /// Overlay shown while files hover over the window.
    pub fn show_drag_overlay(&self, ctx: &Context) {
        if !self.hovering {
            return;
        }

        egui::Area::new(self.id.with("overlay"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let screen_rect = ctx.screen_rect();

                ui.painter().rect_filled(
                    screen_rect,
                    0.0,
                    egui::Color32::from_black_alpha(100),
                );

                let indicator_rect = Rect::from_center_size(screen_rect.center(), Vec2::new(300.0, 150.0));
                ui.painter().rect(
                    indicator_rect,
                    8.0,
                    ui.visuals().extreme_bg_color,
                    egui::Stroke::new(3.0, ui.visuals().selection.bg_fill),
                );
                ui.painter().text(
                    indicator_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "📥 Drop an image to analyze",
                    egui::FontId::proportional(18.0),
                    ui.visuals().strong_text_color(),
                );
            });
    }
}

fn is_image(file: &DroppedFile) -> bool {
    match &file.path {
        Some(path) => is_image_path(path),
        None => file.mime.starts_with("image/") || is_image_path(Path::new(&file.name)),
    }
}

/// The last image among `files`
fn last_image(files: &[DroppedFile]) -> Option<&DroppedFile> {
    files.iter().rev().find(|f| is_image(f))
}

fn load_dropped(file: &DroppedFile) -> Result<ImageBlob> {
    if let Some(path) = &file.path {
        return ImageBlob::from_path(path);
    }

    // Backends without paths hand us the bytes instead
    let bytes = file.bytes.clone().unwrap_or_else(|| Vec::new().into());
    let mime = if file.mime.is_empty() {
        mime_for_path(Path::new(&file.name))
    } else {
        file.mime.clone()
    };
    Ok(ImageBlob::new(file.name.clone(), mime, bytes))
}
