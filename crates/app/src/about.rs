//! About page

use chrono::Datelike;
use eframe::egui;

const INSTITUTION_URL: &str = "https://gatesit.ac.in/";

struct Feature {
    icon: &'static str,
    title: &'static str,
    body: &'static str,
}

const CORE_FEATURES: [Feature; 3] = [
    Feature {
        icon: "🖼",
        title: "Image Analysis",
        body: "Upload any image and get detailed analysis through natural conversation",
    },
    Feature {
        icon: "🧠",
        title: "AI Powered",
        body: "Leveraging Google's Generative AI for accurate and detailed insights",
    },
    Feature {
        icon: "🔒",
        title: "Secure",
        body: "Your uploads are processed securely and not stored permanently",
    },
];

const ACCESSIBILITY_FEATURES: [Feature; 2] = [
    Feature {
        icon: "🎤",
        title: "Voice Input",
        body: "Speak your questions naturally using the built-in speech recognition feature",
    },
    Feature {
        icon: "🔊",
        title: "Text-to-Speech",
        body: "Listen to AI responses with high-quality text-to-speech synthesis",
    },
];

const LANGUAGE_NOTES: [&str; 4] = [
    "Process queries in multiple languages",
    "Provide detailed analysis in the user's preferred language",
    "Handle complex visual concepts across cultural contexts",
    "Support voice input in various languages and accents",
];

pub fn footer_text(year: i32) -> String {
    format!("© {} Vizion by Gen Hacktivists. All rights reserved.", year)
}

pub fn render_about(ui: &mut egui::Ui, dark: bool) {
    let heading_color = if dark {
        egui::Color32::from_rgb(243, 244, 246)
    } else {
        egui::Color32::from_rgb(31, 41, 55)
    };
    let body_color = if dark {
        egui::Color32::from_rgb(180, 180, 190)
    } else {
        egui::Color32::from_rgb(75, 85, 99)
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.set_max_width(760.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("About Vizion")
                        .size(28.0)
                        .strong()
                        .color(egui::Color32::from_rgb(59, 130, 246)),
                );
            });
            ui.add_space(16.0);

            section(ui, dark, egui::Color32::from_rgb(59, 130, 246), |ui| {
                ui.label(egui::RichText::new("What is Vizion?").size(18.0).strong().color(heading_color));
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(
                        "Vizion is an AI-powered image analysis tool that combines Google's Generative AI \
                         with an intuitive interface. Ask questions about an image in plain language and \
                         get detailed insights back, with voice input and read-aloud for a more inclusive experience.",
                    )
                    .color(body_color),
                );
                ui.add_space(10.0);
                feature_row(ui, &CORE_FEATURES, heading_color, body_color);
            });

            section(ui, dark, egui::Color32::from_rgb(34, 197, 94), |ui| {
                ui.label(egui::RichText::new("Accessibility Features").size(18.0).strong().color(heading_color));
                ui.add_space(6.0);
                feature_row(ui, &ACCESSIBILITY_FEATURES, heading_color, body_color);
            });

            section(ui, dark, egui::Color32::from_rgb(168, 85, 247), |ui| {
                ui.label(egui::RichText::new("🌐 Multilingual Support").size(18.0).strong().color(heading_color));
                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(
                        "The model understands and analyzes images across many languages. It can:",
                    )
                    .color(body_color),
                );
                for note in LANGUAGE_NOTES {
                    ui.label(egui::RichText::new(format!("• {}", note)).color(body_color));
                }
            });

            ui.add_space(8.0);
            ui.label(egui::RichText::new("👥 Team Gen Hacktivists").size(18.0).strong().color(heading_color));
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("🏫").size(16.0));
                if ui.link("GATES Institute of Technology").clicked() {
                    if let Err(e) = open::that(INSTITUTION_URL) {
                        tracing::warn!("could not open browser: {}", e);
                    }
                }
            });

            ui.add_space(16.0);
            ui.separator();
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(footer_text(chrono::Local::now().year()))
                        .size(12.0)
                        .color(body_color),
                );
            });
        });
}

fn section(ui: &mut egui::Ui, dark: bool, accent: egui::Color32, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(if dark {
            accent.gamma_multiply(0.15)
        } else {
            accent.gamma_multiply(0.08)
        })
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(18.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui);
        });
    ui.add_space(14.0);
}

fn feature_row(ui: &mut egui::Ui, features: &[Feature], heading: egui::Color32, body: egui::Color32) {
    ui.columns(features.len(), |columns| {
        for (column, feature) in columns.iter_mut().zip(features) {
            column.label(egui::RichText::new(feature.icon).size(20.0));
            column.label(egui::RichText::new(feature.title).strong().color(heading));
            column.label(egui::RichText::new(feature.body).size(12.0).color(body));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_carries_year() {
        assert_eq!(
            footer_text(2031),
            "© 2031 Vizion by Gen Hacktivists. All rights reserved."
        );
    }
}
