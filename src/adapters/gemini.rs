//! Live adapter for the Gemini image generation API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::error::AtelierError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, GenerationRequest, ImageGenerator,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live Gemini image generator that calls the Google AI API.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    /// Create a new Gemini generator with the given API key and model.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self { client: Client::new(), api_key, model }
    }
}

impl ImageGenerator for GeminiGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);

            // Reference images precede the prompt text.
            let mut parts = Vec::with_capacity(request.reference_images.len() + 1);
            for reference in &request.reference_images {
                let encoded =
                    base64::engine::general_purpose::STANDARD.encode(&reference.data);
                parts.push(serde_json::json!({
                    "inlineData": {
                        "mimeType": reference.mime_type,
                        "data": encoded,
                    }
                }));
            }
            parts.push(serde_json::json!({ "text": request.prompt }));

            let mut generation_config = serde_json::json!({
                "responseModalities": ["IMAGE"],
            });
            // With reference images attached the API infers the output
            // shape from them; sending a ratio alongside is rejected.
            if request.reference_images.is_empty() {
                generation_config["imageConfig"] = serde_json::json!({
                    "aspectRatio": request.aspect_ratio.as_str(),
                });
            }

            let body = serde_json::json!({
                "contents": [{ "parts": parts }],
                "generationConfig": generation_config,
            });

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(AtelierError::Api { status: status.as_u16(), message: response_text });
            }

            let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
                AtelierError::Api { status: 200, message: format!("Failed to parse response: {e}") }
            })?;

            for candidate in parsed.candidates {
                for part in candidate.content.parts {
                    if let Some(inline) = part.inline_data {
                        let data = base64::engine::general_purpose::STANDARD
                            .decode(&inline.data)
                            .map_err(|e| AtelierError::Api {
                                status: 200,
                                message: format!("Failed to decode base64: {e}"),
                            })?;
                        return Ok(GeneratedImage { data, mime_type: inline.mime_type });
                    }
                }
            }

            let truncated = if response_text.len() > 500 {
                format!("{}...", &response_text[..500])
            } else {
                response_text
            };
            Err(AtelierError::Api {
                status: 200,
                message: format!("No image in response. Body: {truncated}"),
            })
        })
    }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[allow(dead_code)]
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_takes_first_inline_image() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "here you go" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "AQID" } },
                        { "inlineData": { "mimeType": "image/png", "data": "BAUG" } }
                    ]
                }
            }]
        });
        let parsed: GeminiResponse = serde_json::from_value(body).unwrap();
        let inline = parsed.candidates[0]
            .content
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .unwrap();
        assert_eq!(inline.mime_type, "image/jpeg");
        assert_eq!(inline.data, "AQID");
    }

    #[test]
    fn response_without_images_parses_cleanly() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "sorry, no image" }] }
            }]
        });
        let parsed: GeminiResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.candidates[0].content.parts[0].inline_data.is_none());
    }
}
