//! Left-hand panel: the selected image, or the upload card when there is none.

use anyhow::Result;
use eframe::egui;
use shared::ImageBlob;

/// What the user asked for this frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    None,
    Upload,
    Remove,
}

enum Preview {
    Texture(egui::TextureHandle),
    /// Bytes the decoder could not read. The image stays selected.
    Undecodable(String),
}

struct Loaded {
    image: ImageBlob,
    preview: Preview,
}

#[derive(Default)]
pub struct ImagePanel {
    loaded: Option<Loaded>,
}

impl ImagePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the texture in step with the session's image.
    pub fn sync(&mut self, image: Option<&ImageBlob>, ctx: &egui::Context) {
        let Some(image) = image else {
            self.loaded = None;
            return;
        };
        if let Some(loaded) = &self.loaded {
            if loaded.image.same_upload(image) {
                return;
            }
        }

        let preview = match decode(image, ctx) {
            Ok(texture) => Preview::Texture(texture),
            Err(e) => {
                tracing::warn!(file = image.name(), "cannot preview image: {}", e);
                Preview::Undecodable(e.to_string())
            }
        };
        self.loaded = Some(Loaded {
            image: image.clone(),
            preview,
        });
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, dark: bool, drop_hovering: bool) -> PanelAction {
        match &self.loaded {
            Some(loaded) => show_loaded(ui, loaded, dark),
            None => show_upload_card(ui, dark, drop_hovering),
        }
    }
}

fn decode(blob: &ImageBlob, ctx: &egui::Context) -> Result<egui::TextureHandle> {
    let decoded = image::load_from_memory(blob.bytes())?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &rgba);

    Ok(ctx.load_texture(blob.name(), color_image, egui::TextureOptions::LINEAR))
}

fn show_loaded(ui: &mut egui::Ui, loaded: &Loaded, dark: bool) -> PanelAction {
    let mut action = PanelAction::None;

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(loaded.image.name())
                .strong()
                .color(if dark {
                    egui::Color32::from_rgb(220, 220, 230)
                } else {
                    egui::Color32::from_rgb(40, 40, 50)
                }),
        );
        if let Preview::Texture(texture) = &loaded.preview {
            let size = texture.size();
            ui.label(egui::RichText::new(format!("{}x{}", size[0], size[1])).weak());
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add(
                    egui::Button::new(egui::RichText::new("Remove image").color(egui::Color32::WHITE))
                        .fill(egui::Color32::from_rgb(200, 70, 70))
                        .rounding(egui::Rounding::same(6.0)),
                )
                .clicked()
            {
                action = PanelAction::Remove;
            }
        });
    });

    ui.separator();

    match &loaded.preview {
        Preview::Texture(texture) => {
            let available = ui.available_size();
            let image_size = texture.size_vec2();
            let scale = (available.x / image_size.x)
                .min(available.y / image_size.y)
                .min(1.0);
            let display_size = image_size * scale;

            ui.centered_and_justified(|ui| {
                ui.image((texture.id(), display_size));
            });
        }
        Preview::Undecodable(reason) => {
            ui.centered_and_justified(|ui| {
                ui.label(format!("Preview unavailable ({}). You can still ask about it.", reason));
            });
        }
    }

    action
}

fn show_upload_card(ui: &mut egui::Ui, dark: bool, drop_hovering: bool) -> PanelAction {
    let mut action = PanelAction::None;

    ui.centered_and_justified(|ui| {
        egui::Frame::none()
            .fill(if dark {
                egui::Color32::from_rgb(45, 45, 52)
            } else {
                egui::Color32::from_rgb(239, 246, 255)
            })
            .stroke(egui::Stroke::new(
                2.0,
                if drop_hovering {
                    egui::Color32::from_rgb(59, 130, 246)
                } else if dark {
                    egui::Color32::from_rgb(70, 70, 80)
                } else {
                    egui::Color32::from_rgb(191, 219, 254)
                },
            ))
            .rounding(egui::Rounding::same(12.0))
            .inner_margin(egui::Margin::same(24.0))
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Welcome to Vizion");
                    ui.add_space(8.0);
                    ui.label("Upload an image and ask anything about it.");
                    ui.add_space(16.0);
                    if ui
                        .add(
                            egui::Button::new(
                                egui::RichText::new("📁 Upload Image")
                                    .size(15.0)
                                    .color(egui::Color32::WHITE),
                            )
                            .fill(egui::Color32::from_rgb(59, 130, 246))
                            .rounding(egui::Rounding::same(8.0)),
                        )
                        .clicked()
                    {
                        action = PanelAction::Upload;
                    }
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new("or drop an image file here").weak());
                });
            });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> ImageBlob {
        let mut bytes = Vec::new();
        image::DynamicImage::new_rgba8(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        ImageBlob::new("tiny.png", "image/png", bytes)
    }

    fn texture_size(panel: &ImagePanel) -> Option<[usize; 2]> {
        match &panel.loaded.as_ref()?.preview {
            Preview::Texture(texture) => Some(texture.size()),
            Preview::Undecodable(_) => None,
        }
    }

    #[test]
    fn test_sync_loads_and_clears() {
        let ctx = egui::Context::default();
        let mut panel = ImagePanel::new();
        let blob = png(3, 2);

        panel.sync(Some(&blob), &ctx);
        assert_eq!(texture_size(&panel), Some([3, 2]));

        panel.sync(None, &ctx);
        assert!(panel.loaded.is_none());
    }

    #[test]
    fn test_sync_keeps_texture_for_same_upload() {
        let ctx = egui::Context::default();
        let mut panel = ImagePanel::new();
        let blob = png(1, 1);

        panel.sync(Some(&blob), &ctx);
        let first = match &panel.loaded.as_ref().unwrap().preview {
            Preview::Texture(texture) => texture.id(),
            Preview::Undecodable(_) => panic!("expected a texture"),
        };

        panel.sync(Some(&blob.clone()), &ctx);
        let second = match &panel.loaded.as_ref().unwrap().preview {
            Preview::Texture(texture) => texture.id(),
            Preview::Undecodable(_) => panic!("expected a texture"),
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_undecodable_bytes_stay_selected() {
        let ctx = egui::Context::default();
        let mut panel = ImagePanel::new();
        let blob = ImageBlob::new("photo.heic", "image/heic", vec![0u8, 1, 2, 3]);

        panel.sync(Some(&blob), &ctx);
        let loaded = panel.loaded.as_ref().unwrap();
        assert!(matches!(loaded.preview, Preview::Undecodable(_)));
        assert_eq!(loaded.image.name(), "photo.heic");
    }
}
