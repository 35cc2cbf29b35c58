use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::settings::GeminiSettings;
use shared::{ImageBlob, Result, VizionError};
use std::env;
use std::time::Duration;

use crate::analyzer::ImageAnalyzer;

/// Longest error body kept from a failed response
const MAX_ERROR_BODY_CHARS: usize = 800;

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    InlineData { inline_data: GeminiBlob },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

pub struct GeminiClient {
    http: Client,
    auth_token: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &GeminiSettings) -> Result<Self> {
        let auth_token = match settings.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            // Try environment variable as fallback
            _ => env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or(VizionError::MissingApiKey)?,
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(http_error)?;

        Ok(Self {
            http,
            auth_token,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, image: &ImageBlob, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let req = build_request(image, prompt);
        tracing::debug!(model = %self.model, image_bytes = image.len(), "sending gemini request");

        let resp = self
            .http
            .post(url)
            .query(&[("key", self.auth_token.as_str())])
            .json(&req)
            .send()
            .await
            .map_err(http_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(VizionError::Status {
                status: status.as_u16(),
                body: truncate_body(body.trim()),
            });
        }

        let body: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| VizionError::MalformedResponse(e.to_string()))?;
        extract_text(body)
    }
}

#[async_trait::async_trait]
impl ImageAnalyzer for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn analyze(&self, image: &ImageBlob, prompt: &str) -> Result<String> {
        self.generate(image, prompt).await
    }
}

fn http_error(e: reqwest::Error) -> VizionError {
    VizionError::Http(e.to_string())
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let kept: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", kept)
    } else {
        body.to_string()
    }
}

/// Single-turn request: the image followed by the user's text.
fn build_request(image: &ImageBlob, prompt: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_string(),
            parts: vec![
                GeminiPart::InlineData {
                    inline_data: GeminiBlob {
                        mime_type: image.mime_type().to_string(),
                        data: STANDARD.encode(image.bytes()),
                    },
                },
                GeminiPart::Text {
                    text: prompt.to_string(),
                },
            ],
        }],
    }
}

fn extract_text(body: GeminiResponse) -> Result<String> {
    let text: String = body
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if !text.trim().is_empty() {
        return Ok(text);
    }

    match body.prompt_feedback.and_then(|f| f.block_reason) {
        Some(reason) => Err(VizionError::MalformedResponse(format!(
            "prompt blocked: {}",
            reason
        ))),
        None => Err(VizionError::MalformedResponse(
            "no candidate text in response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample_image() -> ImageBlob {
        ImageBlob::new("apple.png", "image/png", vec![1u8, 2, 3])
    }

    fn settings_for(base_url: &str) -> GeminiSettings {
        GeminiSettings {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..GeminiSettings::default()
        }
    }

    /// Serve exactly one request, handing back what was received.
    fn serve_once(
        status: u16,
        body: &'static str,
    ) -> (String, std::thread::JoinHandle<(String, String)>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = std::thread::spawn(move || {
            let mut request = server.recv().unwrap();
            let url = request.url().to_string();
            let mut received = String::new();
            request.as_reader().read_to_string(&mut received).unwrap();
            let response = tiny_http::Response::from_string(body).with_status_code(status);
            request.respond(response).unwrap();
            (url, received)
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_request_shape() {
        let req = build_request(&sample_image(), "What is this?");
        let json = serde_json::to_value(&req).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], "AQID");
        assert_eq!(parts[1]["text"], "What is this?");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"A red "},{"text":"apple."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(body).unwrap(), "A red apple.");
    }

    #[test]
    fn test_extract_text_without_candidates_fails() {
        let body: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            extract_text(body),
            Err(VizionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_extract_text_reports_block_reason() {
        let body: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = extract_text(body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(1000);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), MAX_ERROR_BODY_CHARS + 3);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn test_explicit_key_wins() {
        let client = GeminiClient::from_settings(&settings_for("http://localhost/")).unwrap();
        assert_eq!(client.auth_token, "test-key");
        assert_eq!(client.base_url, "http://localhost");
    }

    #[tokio::test]
    async fn test_generate_success() {
        let (base_url, handle) = serve_once(
            200,
            r#"{"candidates":[{"content":{"parts":[{"text":"A red apple."}]}}]}"#,
        );
        let client = GeminiClient::from_settings(&settings_for(&base_url)).unwrap();

        let text = client.analyze(&sample_image(), "What is this?").await.unwrap();
        assert_eq!(text, "A red apple.");

        let (url, body) = handle.join().unwrap();
        assert_eq!(url, "/models/gemini-1.5-flash:generateContent?key=test-key");
        assert!(body.contains("What is this?"));
        assert!(body.contains("AQID"));
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let (base_url, handle) = serve_once(500, "backend exploded");
        let client = GeminiClient::from_settings(&settings_for(&base_url)).unwrap();

        let err = client.analyze(&sample_image(), "hi").await.unwrap_err();
        match err {
            VizionError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "backend exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_generate_malformed_payload() {
        let (base_url, handle) = serve_once(200, "not json");
        let client = GeminiClient::from_settings(&settings_for(&base_url)).unwrap();

        let err = client.analyze(&sample_image(), "hi").await.unwrap_err();
        assert!(matches!(err, VizionError::MalformedResponse(_)));
        handle.join().unwrap();
    }
}
