use anyhow::Context as _;
use eframe::egui;
use services::speech::SpeechState;
use services::{PreferenceStore, SpeechCapabilities};
use shared::Message;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod about;
mod controller;
mod onboarding;
mod state;
mod types;
mod utils;
mod widgets;

use controller::SessionSnapshot;
use onboarding::TourAction;
use types::*;
use widgets::PanelAction;

const EMPTY_CHAT: &str = "No messages yet. Upload an image to start the conversation!";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = utils::load_settings_or_default();
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    let analyzer = providers::analyzer_from_settings(&settings.gemini);
    let speech = SpeechCapabilities::detect(&settings.speech);
    let store = PreferenceStore::default_location().map(PreferenceStore::open);
    if store.is_none() {
        tracing::warn!("no config directory; preferences will not be saved");
    }
    let state = AppState::new(&settings, store, analyzer, speech, runtime.handle().clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "Vizion",
        options,
        Box::new(move |_cc| {
            Box::new(VizionApp {
                state,
                _runtime: runtime,
            })
        }),
    )
    .map_err(|e| anyhow::anyhow!("window closed with error: {}", e))
}

struct VizionApp {
    state: AppState,
    /// Owns the worker threads behind `state.runtime`
    _runtime: tokio::runtime::Runtime,
}

impl eframe::App for VizionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let s = &mut self.state;

        s.poll_transcript();
        s.drag_drop.update(ctx);
        if let Some(image) = s.drag_drop.take_image() {
            s.accept_image(image);
            s.go_home();
        }

        let snapshot = s.conversation.snapshot();
        s.image_panel.sync(snapshot.selected_image.as_ref(), ctx);
        let speech = s.speech.state();
        let dark = s.preferences.dark_mode;
        apply_theme(ctx, dark);

        // Keep polling while background work can change what we draw
        if snapshot.pending || s.is_listening() || speech.speaking.is_some() {
            ctx.request_repaint_after(Duration::from_millis(150));
        }

        render_header(s, ctx, dark);

        match s.view {
            View::Home => render_home(s, ctx, dark, &snapshot, speech),
            View::About => {
                egui::CentralPanel::default().show(ctx, |ui| about::render_about(ui, dark));
            }
        }

        if s.show_tour && s.tour.ui(ctx, dark) == TourAction::Completed {
            s.complete_tour();
        }

        s.drag_drop.show_drag_overlay(ctx);
    }
}

fn apply_theme(ctx: &egui::Context, dark: bool) {
    let mut style = (*ctx.style()).clone();
    style.visuals = if dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    style.visuals.window_rounding = egui::Rounding::same(12.0);
    style.spacing.item_spacing = egui::vec2(8.0, 8.0);

    // Visible focus rings
    let focus = if dark {
        egui::Color32::from_rgb(100, 180, 255)
    } else {
        egui::Color32::from_rgb(50, 100, 200)
    };
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(2.0, focus);
    style.visuals.selection.stroke = egui::Stroke::new(2.0, focus);
    if dark {
        style.visuals.panel_fill = egui::Color32::from_rgb(17, 24, 39);
    } else {
        style.visuals.panel_fill = egui::Color32::from_rgb(243, 244, 246);
    }
    ctx.set_style(style);
}

fn render_header(s: &mut AppState, ctx: &egui::Context, dark: bool) {
    egui::TopBottomPanel::top("header")
        .frame(
            egui::Frame::none()
                .fill(if dark {
                    egui::Color32::from_rgb(31, 41, 55)
                } else {
                    egui::Color32::WHITE
                })
                .inner_margin(egui::Margin::symmetric(16.0, 12.0)),
        )
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(
                    egui::RichText::new("Vizion")
                        .size(24.0)
                        .strong()
                        .color(egui::Color32::from_rgb(59, 130, 246)),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let dark_icon = if dark { "☀" } else { "🌙" };
                    if ui
                        .add(egui::Button::new(egui::RichText::new(dark_icon).size(18.0)).frame(false))
                        .on_hover_text(if dark {
                            "Switch to light mode"
                        } else {
                            "Switch to dark mode"
                        })
                        .clicked()
                    {
                        s.toggle_dark_mode();
                    }

                    ui.add_space(8.0);
                    if ui
                        .selectable_label(s.view == View::About, "ℹ About")
                        .clicked()
                    {
                        s.toggle_about();
                    }
                    if ui
                        .selectable_label(s.view == View::Home, "🏠 Home")
                        .clicked()
                    {
                        s.go_home();
                    }
                });
            });
        });
}

fn render_home(
    s: &mut AppState,
    ctx: &egui::Context,
    dark: bool,
    snapshot: &SessionSnapshot,
    speech: SpeechState,
) {
    egui::SidePanel::left("image_panel")
        .resizable(true)
        .default_width(480.0)
        .min_width(320.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            if let Some(err) = &s.upload_error {
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), err);
            }
            let hovering = s.drag_drop.is_hovering();
            let action = s.image_panel.ui(ui, dark, hovering);
            match action {
                PanelAction::Upload => s.pick_image(),
                PanelAction::Remove => s.remove_image(),
                PanelAction::None => {}
            }
        });

    egui::TopBottomPanel::bottom("input_bar")
        .frame(
            egui::Frame::none()
                .fill(if dark {
                    egui::Color32::from_rgb(31, 41, 55)
                } else {
                    egui::Color32::WHITE
                })
                .inner_margin(egui::Margin::same(12.0)),
        )
        .show(ctx, |ui| render_input_bar(s, ui, ctx, snapshot));

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Conversation").size(16.0).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!snapshot.messages.is_empty(), egui::Button::new("🗑 Clear Chat"))
                    .on_hover_text("Remove the image and all messages")
                    .clicked()
                {
                    s.clear_chat();
                }
            });
        });
        ui.separator();

        let can_speak = s.speech.capabilities().can_speak();
        let mut speak_request: Option<&Message> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if snapshot.messages.is_empty() {
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new(EMPTY_CHAT).weak());
                    });
                }

                for msg in &snapshot.messages {
                    ui.add_space(6.0);
                    let speaking = speech.speaking == Some(msg.id());
                    if render_message(ui, msg, dark, can_speak, speaking) {
                        speak_request = Some(msg);
                    }
                }

                if snapshot.pending {
                    ui.add_space(6.0);
                    render_thinking(ui, dark);
                }
            });

        if let Some(msg) = speak_request {
            s.speech.toggle_speak(msg.id(), msg.text());
        }
    });
}

/// Returns true when the read-aloud toggle was clicked.
fn render_message(ui: &mut egui::Ui, msg: &Message, dark: bool, can_speak: bool, speaking: bool) -> bool {
    let mut toggled = false;

    if !msg.is_assistant() {
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            ui.add_space(8.0);
            egui::Frame::none()
                .fill(egui::Color32::from_rgb(59, 130, 246))
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::same(12.0))
                .show(ui, |ui| {
                    ui.set_max_width(460.0);
                    ui.label(
                        egui::RichText::new(msg.text())
                            .color(egui::Color32::WHITE)
                            .size(15.0),
                    );
                });
        });
        return toggled;
    }

    egui::Frame::none()
        .fill(if dark {
            egui::Color32::from_rgb(55, 65, 81)
        } else {
            egui::Color32::WHITE
        })
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_max_width(520.0);
            ui.label(
                egui::RichText::new(msg.text())
                    .size(15.0)
                    .color(if dark {
                        egui::Color32::from_rgb(229, 231, 235)
                    } else {
                        egui::Color32::from_rgb(31, 41, 55)
                    }),
            );

            if can_speak {
                ui.add_space(4.0);
                let (label, hover) = if speaking {
                    ("🔇 Stop speaking", "Stop reading this message")
                } else {
                    ("🔊 Read aloud", "Read this message aloud")
                };
                if ui.small_button(label).on_hover_text(hover).clicked() {
                    toggled = true;
                }
            }
        });

    toggled
}

fn render_thinking(ui: &mut egui::Ui, dark: bool) {
    egui::Frame::none()
        .fill(if dark {
            egui::Color32::from_rgb(55, 65, 81)
        } else {
            egui::Color32::from_rgb(229, 231, 235)
        })
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            let time = ui.input(|i| i.time);
            let dots = match ((time * 2.0) as i32) % 4 {
                0 => "   ",
                1 => ".  ",
                2 => ".. ",
                _ => "...",
            };
            ui.label(egui::RichText::new(format!("Analyzing{}", dots)).italics());
        });
}

/// Text box width left over after the mic and Send buttons.
fn input_width(available: f32, can_listen: bool) -> f32 {
    let reserved = if can_listen { 170.0 } else { 130.0 };
    (available - reserved).max(0.0)
}

fn render_input_bar(s: &mut AppState, ui: &mut egui::Ui, ctx: &egui::Context, snapshot: &SessionSnapshot) {
    let enabled = snapshot.can_send();
    let listening = s.is_listening();
    let can_listen = s.speech.capabilities().can_listen();

    ui.horizontal(|ui| {
        let hint = if enabled {
            "Ask me about the image..."
        } else {
            "Upload an image to start the conversation..."
        };

        let width = input_width(ui.available_width(), can_listen);
        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(&mut s.input_text)
                .hint_text(hint)
                .desired_width(width)
                .font(egui::FontId::new(15.0, egui::FontFamily::Proportional)),
        );
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) && s.submit(ctx) {
            response.request_focus();
        }

        if can_listen {
            let mic = if listening { "🎙…" } else { "🎤" };
            if ui
                .add_enabled(enabled && !listening, egui::Button::new(mic).min_size(egui::vec2(36.0, 36.0)))
                .on_hover_text(if listening { "Listening..." } else { "Click to speak" })
                .clicked()
            {
                s.start_listening(ctx);
            }
        }

        let label = if enabled { "➤ Send" } else { "Processing..." };
        let send = egui::Button::new(egui::RichText::new(label).color(egui::Color32::WHITE))
            .fill(egui::Color32::from_rgb(59, 130, 246))
            .min_size(egui::vec2(110.0, 36.0));
        if ui
            .add_enabled(enabled && !s.input_text.trim().is_empty(), send)
            .clicked()
        {
            s.submit(ctx);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_width_never_negative() {
        assert_eq!(input_width(600.0, false), 470.0);
        assert_eq!(input_width(600.0, true), 430.0);
        assert_eq!(input_width(100.0, true), 0.0);
        assert_eq!(input_width(0.0, false), 0.0);
    }
}
