//! Core types for the Vizion app

use services::{PreferenceStore, SpeechController};
use shared::settings::Preferences;
use std::sync::mpsc::Receiver;
use tokio::runtime::Handle;

use crate::controller::ConversationController;
use crate::onboarding::OnboardingTour;
use crate::widgets::{DragDropHandler, ImagePanel, ImagePicker};

/// Which page the main area shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    About,
}

pub struct AppState {
    pub preferences: Preferences,
    /// `None` when the platform has no config directory; preferences then
    /// last for the session only.
    pub preference_store: Option<PreferenceStore>,

    pub view: View,
    pub show_tour: bool,
    pub tour: OnboardingTour,

    pub conversation: ConversationController,
    pub speech: SpeechController,
    pub runtime: Handle,

    pub input_text: String,
    /// Transcript of the recognition pass in flight
    pub transcript_rx: Option<Receiver<Option<String>>>,
    /// Last upload problem, shown under the image panel
    pub upload_error: Option<String>,

    pub image_panel: ImagePanel,
    pub image_picker: ImagePicker,
    pub drag_drop: DragDropHandler,
}
