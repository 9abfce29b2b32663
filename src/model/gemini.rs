use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::backend::{ModelBackend, ModelError, ModelRequest, non_empty_text};

// ============================================================================
// Gemini Backend
// ============================================================================

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiBackend {
    pub endpoint: String,
    pub model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiBlob,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiBackend {
    pub fn new(endpoint: Option<&str>, model: &str, api_key: &str) -> Result<Self, ModelError> {
        if api_key.trim().is_empty() {
            return Err(ModelError::Config(
                "a Gemini API key is required (set GEMINI_API_KEY or --api-key)".into(),
            ));
        }
        Ok(Self {
            endpoint: endpoint
                .unwrap_or(DEFAULT_GEMINI_ENDPOINT)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn build_body(request: &ModelRequest) -> GeminiRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &request.image {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiBlob {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }
        parts.push(GeminiPart::Text {
            text: request.prompt.clone(),
        });

        GeminiRequest {
            contents: vec![GeminiContent { parts }],
        }
    }

    /// Join the text parts of the first candidate.
    fn response_text(body: &str) -> Result<String, ModelError> {
        let parsed: GeminiResponse = serde_json::from_str(body)
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        non_empty_text(&text)
    }
}

impl ModelBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let url = self.url();
        let body = Self::build_body(request);

        // No overall timeout: a generation call runs until the API answers.
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ModelError::Http {
                endpoint: url.clone(),
                source: e,
            })?;

        let response = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| ModelError::Http {
                endpoint: url.clone(),
                source: e,
            })?;

        let status = response.status();
        let text = response.text().map_err(|e| ModelError::Http {
            endpoint: url.clone(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Self::response_text(&text)
    }
}
