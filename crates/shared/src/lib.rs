pub mod chat;
pub mod error;
pub mod image;

pub use chat::{ConversationSession, Message, MessageId, Origin};
pub use error::{Result, VizionError};
pub use image::ImageBlob;

pub mod settings {
    use serde::{Deserialize, Serialize};

    fn default_true() -> bool {
        true
    }

    fn default_gemini_model() -> String {
        "gemini-1.5-flash".into()
    }

    fn default_gemini_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".into()
    }

    fn default_timeout_secs() -> u64 {
        45
    }

    fn default_locale() -> String {
        "en-US".into()
    }

    /// Connection settings for the Gemini image analysis endpoint
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GeminiSettings {
        #[serde(default = "default_gemini_model")]
        pub model: String, // e.g., "gemini-1.5-flash"
        /// Falls back to GEMINI_API_KEY when unset
        #[serde(default)]
        pub api_key: Option<String>,
        #[serde(default = "default_gemini_base_url")]
        pub base_url: String,
        #[serde(default = "default_timeout_secs")]
        pub timeout_secs: u64,
    }

    impl Default for GeminiSettings {
        fn default() -> Self {
            Self {
                model: default_gemini_model(),
                api_key: None,
                base_url: default_gemini_base_url(),
                timeout_secs: default_timeout_secs(),
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SpeechSettings {
        /// Recognition locale (BCP-47)
        #[serde(default = "default_locale")]
        pub locale: String,
        /// Set to false to hide voice input and read-aloud even when the host supports them
        #[serde(default = "default_true")]
        pub enabled: bool,
        /// External recognizer, e.g. ["vosk-transcribe", "--lang", "{locale}"].
        /// Prints the transcript on stdout. Voice input is hidden when empty.
        #[serde(default)]
        pub recognizer_command: Vec<String>,
    }

    impl Default for SpeechSettings {
        fn default() -> Self {
            Self {
                locale: default_locale(),
                enabled: true,
                recognizer_command: Vec::new(),
            }
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct AppSettings {
        #[serde(default)]
        pub gemini: GeminiSettings,
        #[serde(default)]
        pub speech: SpeechSettings,
    }

    /// Persisted UI preferences. Absent values read back as `false`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Preferences {
        pub dark_mode: bool,
        /// `false` means the onboarding tour is shown
        pub tour_completed: bool,
    }

}
