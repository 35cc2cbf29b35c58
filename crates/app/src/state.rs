//! State management for the Vizion app
//!
//! AppState methods called from the UI. Anything slow (analysis, speech)
//! runs on the tokio runtime and reports back through shared state or a
//! channel polled each frame.

use eframe::egui;
use providers::ImageAnalyzer;
use services::{PreferenceStore, SpeechCapabilities, SpeechController};
use shared::settings::AppSettings;
use shared::{ImageBlob, Result};
use std::path::Path;
use std::sync::mpsc::{channel, TryRecvError};
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::controller::ConversationController;
use crate::onboarding::OnboardingTour;
use crate::types::*;
use crate::widgets::{DragDropHandler, ImagePanel, ImagePicker};

impl AppState {
    pub fn new(
        settings: &AppSettings,
        preference_store: Option<PreferenceStore>,
        analyzer: Arc<dyn ImageAnalyzer>,
        speech: SpeechCapabilities,
        runtime: Handle,
    ) -> Self {
        let preferences = preference_store
            .as_ref()
            .map(|store| store.load_preferences())
            .unwrap_or_default();
        let speech = SpeechController::new(speech, settings.speech.locale.clone(), runtime.clone());

        Self {
            preferences,
            preference_store,
            view: View::Home,
            show_tour: !preferences.tour_completed,
            tour: OnboardingTour::new(),
            conversation: ConversationController::new(analyzer),
            speech,
            runtime,
            input_text: String::new(),
            transcript_rx: None,
            upload_error: None,
            image_panel: ImagePanel::new(),
            image_picker: ImagePicker::new(),
            drag_drop: DragDropHandler::new("image_drop"),
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.preferences.dark_mode = !self.preferences.dark_mode;
        if let Some(store) = &self.preference_store {
            if let Err(e) = store.set_dark_mode(self.preferences.dark_mode) {
                tracing::warn!("could not save dark mode preference: {}", e);
            }
        }
    }

    /// Close the tour for good
    pub fn complete_tour(&mut self) {
        self.show_tour = false;
        self.preferences.tour_completed = true;
        if let Some(store) = &self.preference_store {
            if let Err(e) = store.mark_tour_completed() {
                tracing::warn!("could not save tour preference: {}", e);
            }
        }
    }

    pub fn go_home(&mut self) {
        self.view = View::Home;
    }

    /// The About button flips between About and Home.
    pub fn toggle_about(&mut self) {
        self.view = match self.view {
            View::About => View::Home,
            View::Home => View::About,
        };
    }

    pub fn pick_image(&mut self) {
        if let Some(path) = self.image_picker.pick() {
            self.load_image(&path);
        }
    }

    pub fn load_image(&mut self, path: &Path) {
        self.accept_image(ImageBlob::from_path(path));
    }

    /// Start a new conversation with an uploaded image, or report why it
    /// could not be read.
    pub fn accept_image(&mut self, image: Result<ImageBlob>) {
        match image {
            Ok(image) => {
                self.upload_error = None;
                self.speech.stop();
                self.conversation.select_image(image);
            }
            Err(e) => {
                tracing::warn!("upload failed: {}", e);
                self.upload_error = Some(e.to_string());
            }
        }
    }

    pub fn remove_image(&mut self) {
        self.conversation.remove_image();
    }

    pub fn clear_chat(&mut self) {
        self.speech.stop();
        self.conversation.clear_conversation();
    }

    /// Send the input text. The input is cleared only if the message was
    /// accepted.
    pub fn submit(&mut self, ctx: &egui::Context) -> bool {
        if !self.conversation.can_send() {
            return false;
        }
        if self.input_text.trim().is_empty() {
            return false;
        }
        let text = std::mem::take(&mut self.input_text);

        let conversation = self.conversation.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            conversation.send_user_message(&text).await;
            ctx.request_repaint();
        });
        true
    }

    pub fn is_listening(&self) -> bool {
        self.transcript_rx.is_some() || self.speech.listening()
    }

    /// Begin one recognition pass; the transcript lands in the input box.
    pub fn start_listening(&mut self, ctx: &egui::Context) {
        if self.is_listening() || !self.speech.capabilities().can_listen() {
            return;
        }

        let (tx, rx) = channel();
        self.transcript_rx = Some(rx);

        let speech = self.speech.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let transcript = speech.listen().await;
            let _ = tx.send(transcript);
            ctx.request_repaint();
        });
    }

    pub fn poll_transcript(&mut self) {
        let Some(rx) = &self.transcript_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(transcript) => {
                if let Some(text) = transcript {
                    self.input_text = text;
                }
                self.transcript_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.transcript_rx = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::speech::SpeechRecognizer;
    use shared::chat::FALLBACK_REPLY;
    use std::time::Duration;
    use tempfile::TempDir;

    struct EchoAnalyzer;

    #[async_trait::async_trait]
    impl ImageAnalyzer for EchoAnalyzer {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn analyze(&self, image: &ImageBlob, prompt: &str) -> Result<String> {
            Ok(format!("{}: {}", image.name(), prompt))
        }
    }

    struct FixedRecognizer(Option<&'static str>);

    #[async_trait::async_trait]
    impl SpeechRecognizer for FixedRecognizer {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn recognize(&self, _locale: &str) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    fn state_in(dir: &TempDir, speech: SpeechCapabilities) -> AppState {
        AppState::new(
            &AppSettings::default(),
            Some(PreferenceStore::open(dir.path().join("preferences.json"))),
            Arc::new(EchoAnalyzer),
            speech,
            Handle::current(),
        )
    }

    fn blob() -> Result<ImageBlob> {
        Ok(ImageBlob::new("cat.png", "image/png", vec![1u8, 2, 3]))
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        for _ in 0..200 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_first_run_shows_tour_until_completed() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir, SpeechCapabilities::none());
        assert!(state.show_tour);

        state.complete_tour();
        assert!(!state.show_tour);

        let reopened = state_in(&dir, SpeechCapabilities::none());
        assert!(!reopened.show_tour);
    }

    #[tokio::test]
    async fn test_dark_mode_persists() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir, SpeechCapabilities::none());
        assert!(!state.preferences.dark_mode);

        state.toggle_dark_mode();
        assert!(state.preferences.dark_mode);
        assert!(state_in(&dir, SpeechCapabilities::none()).preferences.dark_mode);

        state.toggle_dark_mode();
        assert!(!state_in(&dir, SpeechCapabilities::none()).preferences.dark_mode);
    }

    #[tokio::test]
    async fn test_about_toggles() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir, SpeechCapabilities::none());
        state.toggle_about();
        assert_eq!(state.view, View::About);
        state.toggle_about();
        assert_eq!(state.view, View::Home);
        state.toggle_about();
        state.go_home();
        assert_eq!(state.view, View::Home);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_submit_clears_input_and_gets_reply() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir, SpeechCapabilities::none());
        let ctx = egui::Context::default();

        state.input_text = "What is this?".into();
        assert!(!state.submit(&ctx));
        assert_eq!(state.input_text, "What is this?");

        state.accept_image(blob());
        assert!(state.submit(&ctx));
        assert!(state.input_text.is_empty());

        let conversation = state.conversation.clone();
        wait_until(|| conversation.snapshot().messages.len() == 3).await;
        let snapshot = conversation.snapshot();
        assert_eq!(snapshot.messages[1].text(), "What is this?");
        assert_eq!(snapshot.messages[2].text(), "cat.png: What is this?");
        assert!(!snapshot.pending);
    }

    #[tokio::test]
    async fn test_blank_submit_keeps_input() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir, SpeechCapabilities::none());
        let ctx = egui::Context::default();
        state.accept_image(blob());

        state.input_text = "   ".into();
        assert!(!state.submit(&ctx));
        assert_eq!(state.input_text, "   ");
        assert_eq!(state.conversation.snapshot().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_image() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir, SpeechCapabilities::none());
        state.accept_image(blob());

        state.load_image(&dir.path().join("missing.png"));
        assert!(state.upload_error.is_some());
        let snapshot = state.conversation.snapshot();
        assert_eq!(snapshot.selected_image.unwrap().name(), "cat.png");

        state.accept_image(blob());
        assert!(state.upload_error.is_none());
    }

    #[tokio::test]
    async fn test_clear_chat_drops_everything() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir, SpeechCapabilities::none());
        state.accept_image(blob());
        state.clear_chat();

        let snapshot = state.conversation.snapshot();
        assert!(snapshot.selected_image.is_none());
        assert!(snapshot.messages.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_transcript_replaces_input() {
        let dir = TempDir::new().unwrap();
        let capabilities = SpeechCapabilities {
            recognizer: Some(Arc::new(FixedRecognizer(Some("what colour is it")))),
            synthesizer: None,
        };
        let mut state = state_in(&dir, capabilities);
        let ctx = egui::Context::default();
        state.input_text = "old text".into();

        state.start_listening(&ctx);
        assert!(state.is_listening());
        for _ in 0..200 {
            state.poll_transcript();
            if state.transcript_rx.is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(state.input_text, "what colour is it");
        assert!(!state.is_listening());
        // Not sent automatically
        assert!(state.conversation.snapshot().messages.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_silence_keeps_input() {
        let dir = TempDir::new().unwrap();
        let capabilities = SpeechCapabilities {
            recognizer: Some(Arc::new(FixedRecognizer(None))),
            synthesizer: None,
        };
        let mut state = state_in(&dir, capabilities);
        let ctx = egui::Context::default();
        state.input_text = "typed".into();

        state.start_listening(&ctx);
        for _ in 0..200 {
            state.poll_transcript();
            if state.transcript_rx.is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(state.input_text, "typed");
    }

    #[tokio::test]
    async fn test_listen_without_recognizer_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir, SpeechCapabilities::none());
        state.start_listening(&egui::Context::default());
        assert!(!state.is_listening());
    }

    #[tokio::test]
    async fn test_unconfigured_analyzer_yields_fallback() {
        let conversation =
            ConversationController::new(Arc::new(providers::UnconfiguredAnalyzer::new("no key")));
        conversation.select_image(blob().unwrap());
        conversation.send_user_message("hi").await;

        let snapshot = conversation.snapshot();
        assert_eq!(snapshot.messages.last().unwrap().text(), FALLBACK_REPLY);
        assert!(!snapshot.pending);
    }
}
