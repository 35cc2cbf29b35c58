//! Conversation data model: messages and the single upload-and-chat session.

use serde::{Deserialize, Serialize};

use crate::image::ImageBlob;

/// Assistant message seeded whenever a new image is selected.
pub const GREETING: &str =
    "Hi! I'm Vizion. I've received your image. What would you like to know about it?";

/// Assistant message shown when the analysis call fails.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I encountered an error analyzing the image. Please try again.";

/// Identifier of a message, monotonic within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Who wrote a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    User,
    Assistant,
}

/// A chat message. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    text: String,
    origin: Origin,
}

impl Message {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_assistant(&self) -> bool {
        self.origin == Origin::Assistant
    }
}

/// State of one upload-and-chat interaction.
///
/// `messages` is append-only between resets; `pending` marks the single
/// outstanding analysis call.
#[derive(Clone, Debug, Default)]
pub struct ConversationSession {
    selected_image: Option<ImageBlob>,
    messages: Vec<Message>,
    pending: bool,
    next_id: u64,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_image(&self) -> Option<&ImageBlob> {
        self.selected_image.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    /// Append a message and return its id. Ids keep increasing across resets.
    pub fn push(&mut self, origin: Origin, text: impl Into<String>) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            text: text.into(),
            origin,
        });
        id
    }

    /// Replace the image and restart the history with the greeting.
    ///
    /// `pending` is cleared even if a turn is still in flight. That turn's
    /// reply still lands here, and when it finishes it clears `pending` again,
    /// possibly under a newer turn.
    pub fn select_image(&mut self, image: ImageBlob) {
        self.selected_image = Some(image);
        self.messages.clear();
        self.push(Origin::Assistant, GREETING);
        self.pending = false;
    }

    /// Drop the image but keep the history.
    pub fn remove_image(&mut self) {
        self.selected_image = None;
    }

    /// Drop both the image and the history.
    pub fn clear(&mut self) {
        self.selected_image = None;
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImageBlob {
        ImageBlob::new(name, "image/png", vec![0u8; 8])
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = ConversationSession::new();
        assert!(session.selected_image().is_none());
        assert!(session.messages().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_select_image_seeds_single_greeting() {
        let mut session = ConversationSession::new();
        for name in ["a.png", "b.png", "c.png"] {
            session.push(Origin::User, "leftover");
            session.select_image(image(name));

            assert_eq!(session.selected_image().map(|i| i.name()), Some(name));
            assert_eq!(session.messages().len(), 1);
            assert_eq!(session.messages()[0].origin(), Origin::Assistant);
            assert_eq!(session.messages()[0].text(), GREETING);
        }
    }

    #[test]
    fn test_select_image_clears_pending() {
        let mut session = ConversationSession::new();
        session.set_pending(true);
        session.select_image(image("a.png"));
        assert!(!session.is_pending());
    }

    #[test]
    fn test_remove_image_keeps_history() {
        let mut session = ConversationSession::new();
        session.select_image(image("a.png"));
        session.push(Origin::User, "What is this?");

        session.remove_image();
        assert!(session.selected_image().is_none());
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_clear_drops_image_and_messages() {
        let mut session = ConversationSession::new();
        session.select_image(image("a.png"));
        session.push(Origin::User, "hello");

        session.clear();
        assert!(session.selected_image().is_none());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_ids_are_monotonic_across_resets() {
        let mut session = ConversationSession::new();
        let first = session.push(Origin::User, "one");
        session.clear();
        session.select_image(image("a.png"));
        let greeting = session.messages()[0].id();
        let next = session.push(Origin::User, "two");

        assert!(first < greeting);
        assert!(greeting < next);
    }
}
