//! Conversation controller
//!
//! Owns the shared [`ConversationSession`] and drives the single analysis call
//! per user turn. The UI thread reads snapshots; turns complete on the tokio
//! runtime and write their reply back through the same lock.

use parking_lot::Mutex;
use providers::ImageAnalyzer;
use shared::chat::FALLBACK_REPLY;
use shared::{ConversationSession, ImageBlob, Message, Origin};
use std::sync::Arc;

/// Copy of the session taken once per frame
#[derive(Clone, Debug, Default)]
pub struct SessionSnapshot {
    pub selected_image: Option<ImageBlob>,
    pub messages: Vec<Message>,
    pub pending: bool,
}

impl SessionSnapshot {
    pub fn can_send(&self) -> bool {
        self.selected_image.is_some() && !self.pending
    }
}

#[derive(Clone)]
pub struct ConversationController {
    session: Arc<Mutex<ConversationSession>>,
    analyzer: Arc<dyn ImageAnalyzer>,
}

impl ConversationController {
    pub fn new(analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        Self {
            session: Arc::new(Mutex::new(ConversationSession::new())),
            analyzer,
        }
    }

    /// Start a fresh conversation about `image`.
    pub fn select_image(&self, image: ImageBlob) {
        tracing::info!(file = image.name(), mime = image.mime_type(), bytes = image.len(), "image selected");
        self.session.lock().select_image(image);
    }

    pub fn remove_image(&self) {
        self.session.lock().remove_image();
    }

    pub fn clear_conversation(&self) {
        self.session.lock().clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock();
        SessionSnapshot {
            selected_image: session.selected_image().cloned(),
            messages: session.messages().to_vec(),
            pending: session.is_pending(),
        }
    }

    pub fn can_send(&self) -> bool {
        let session = self.session.lock();
        session.selected_image().is_some() && !session.is_pending()
    }

    /// Record the user's message and mark the session pending.
    ///
    /// Returns `None` without touching the session when there is no image or
    /// the text is blank. The returned turn must be driven to completion with
    /// [`PendingTurn::complete`]; dropping it early still clears `pending`.
    pub fn begin_turn(&self, text: &str) -> Option<PendingTurn> {
        if text.trim().is_empty() {
            return None;
        }

        let image = {
            let mut session = self.session.lock();
            let image = session.selected_image()?.clone();
            session.push(Origin::User, text);
            session.set_pending(true);
            image
        };

        Some(PendingTurn {
            image,
            prompt: text.to_string(),
            analyzer: self.analyzer.clone(),
            guard: PendingGuard {
                session: self.session.clone(),
            },
        })
    }

    /// Submit `text` about the current image and wait for the reply.
    pub async fn send_user_message(&self, text: &str) {
        if let Some(turn) = self.begin_turn(text) {
            turn.complete().await;
        }
    }
}

/// One outstanding analysis call
pub struct PendingTurn {
    image: ImageBlob,
    prompt: String,
    analyzer: Arc<dyn ImageAnalyzer>,
    guard: PendingGuard,
}

impl PendingTurn {
    /// Ask the analyzer and append its reply, or the fallback text on failure.
    pub async fn complete(self) {
        let reply = match self.analyzer.analyze(&self.image, &self.prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(provider = self.analyzer.name(), "image analysis failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        };
        // A reset while we were waiting is not detected; the reply lands in
        // whatever history is current.
        self.guard.session.lock().push(Origin::Assistant, reply);
    }
}

/// Clears `pending` however the turn ends.
struct PendingGuard {
    session: Arc<Mutex<ConversationSession>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.session.lock().set_pending(false);
    }
}
