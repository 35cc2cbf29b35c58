//! First-run tour.
//!
//! Four informational steps shown over the home view until the user closes
//! the window or presses "Get Started" on the last step.

use eframe::egui;

/// One page of the tour
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TourStep {
    pub title: &'static str,
    pub content: &'static str,
}

pub const TOUR_STEPS: [TourStep; 4] = [
    TourStep {
        title: "Welcome to Vizion! 👋",
        content: "Let's take a quick tour to help you get started with our AI-powered image analysis tool.",
    },
    TourStep {
        title: "Upload Your Image 📸",
        content: "Start by uploading an image you'd like to analyze. You can drag and drop or click to select.",
    },
    TourStep {
        title: "Chat with AI 💬",
        content: "Ask questions about your image and get detailed insights using natural language.",
    },
    TourStep {
        title: "Accessibility Features 🎯",
        content: "Use voice input to ask questions and listen to AI responses with our text-to-speech feature.",
    },
];

/// What the user did with the tour window this frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TourAction {
    None,
    /// Closed early or finished the last step
    Completed,
}

#[derive(Debug, Default)]
pub struct OnboardingTour {
    step: usize,
}

impl OnboardingTour {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &'static TourStep {
        &TOUR_STEPS[self.step]
    }

    pub fn is_last(&self) -> bool {
        self.step + 1 == TOUR_STEPS.len()
    }

    /// Advance one step. Returns `Completed` when called on the last step.
    pub fn next(&mut self) -> TourAction {
        if self.is_last() {
            TourAction::Completed
        } else {
            self.step += 1;
            TourAction::None
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context, dark: bool) -> TourAction {
        let mut action = TourAction::None;
        let step = *self.current();

        egui::Window::new("tour")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .fixed_size([420.0, 180.0])
            .frame(
                egui::Frame::window(&ctx.style())
                    .fill(if dark {
                        egui::Color32::from_rgb(31, 41, 55)
                    } else {
                        egui::Color32::WHITE
                    })
                    .rounding(egui::Rounding::same(12.0))
                    .inner_margin(egui::Margin::same(24.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(step.title)
                            .size(20.0)
                            .strong()
                            .color(if dark {
                                egui::Color32::WHITE
                            } else {
                                egui::Color32::from_rgb(31, 41, 55)
                            }),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(egui::Button::new("✕").frame(false))
                            .on_hover_text("Close tour")
                            .clicked()
                        {
                            action = TourAction::Completed;
                        }
                    });
                });

                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new(step.content)
                        .size(15.0)
                        .color(if dark {
                            egui::Color32::from_rgb(209, 213, 219)
                        } else {
                            egui::Color32::from_rgb(75, 85, 99)
                        }),
                );
                ui.add_space(20.0);

                ui.horizontal(|ui| {
                    // Step dots
                    for i in 0..TOUR_STEPS.len() {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
                        let color = if i == self.step {
                            egui::Color32::from_rgb(59, 130, 246)
                        } else if dark {
                            egui::Color32::from_rgb(75, 85, 99)
                        } else {
                            egui::Color32::from_rgb(209, 213, 219)
                        };
                        ui.painter().circle_filled(rect.center(), 4.0, color);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = if self.is_last() { "Get Started" } else { "Next" };
                        let button = egui::Button::new(
                            egui::RichText::new(label).color(egui::Color32::WHITE),
                        )
                        .fill(egui::Color32::from_rgb(59, 130, 246))
                        .rounding(egui::Rounding::same(8.0));
                        if ui.add(button).clicked() && self.next() == TourAction::Completed {
                            action = TourAction::Completed;
                        }
                    });
                });
            });

        action
    }
}
