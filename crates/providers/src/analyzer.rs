use shared::settings::GeminiSettings;
use shared::{ImageBlob, Result, VizionError};
use std::sync::Arc;

use crate::gemini::GeminiClient;

/// A remote service that answers a prompt about an image.
///
/// Implementations make exactly one attempt per call; callers decide what to
/// show when it fails.
#[async_trait::async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    async fn analyze(&self, image: &ImageBlob, prompt: &str) -> Result<String>;
}

/// Stands in when no usable provider could be built. Every call fails with
/// the reason captured at startup.
pub struct UnconfiguredAnalyzer {
    reason: String,
}

impl UnconfiguredAnalyzer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl ImageAnalyzer for UnconfiguredAnalyzer {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn analyze(&self, _image: &ImageBlob, _prompt: &str) -> Result<String> {
        Err(VizionError::Unavailable(self.reason.clone()))
    }
}

/// Build the Gemini analyzer, or a placeholder that fails every call when the
/// client cannot be constructed (usually a missing key).
pub fn analyzer_from_settings(settings: &GeminiSettings) -> Arc<dyn ImageAnalyzer> {
    match GeminiClient::from_settings(settings) {
        Ok(client) => {
            tracing::info!(model = client.model(), "gemini analyzer ready");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!("image analysis disabled: {}", e);
            Arc::new(UnconfiguredAnalyzer::new(e.to_string()))
        }
    }
}
