//! Local services for Vizion: persisted preferences and host speech engines.

pub mod preferences;
pub mod speech;

pub use preferences::PreferenceStore;
pub use speech::{SpeechCapabilities, SpeechController, SpeechState};
