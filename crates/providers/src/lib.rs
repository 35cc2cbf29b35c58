//! Remote AI providers for image analysis.

pub mod analyzer;
pub mod gemini;

pub use analyzer::{analyzer_from_settings, ImageAnalyzer, UnconfiguredAnalyzer};
pub use gemini::GeminiClient;
