use base64::Engine;
use serde::{Deserialize, Serialize};

use super::backend::{ModelBackend, ModelError, ModelRequest, non_empty_text};

// ============================================================================
// Ollama Backend
// ============================================================================

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5vl:3b";

pub struct OllamaBackend {
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }

    fn build_body(&self, request: &ModelRequest) -> OllamaRequest {
        let images = request
            .image
            .iter()
            .map(|img| base64::engine::general_purpose::STANDARD.encode(&img.data))
            .collect();

        OllamaRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
            images,
        }
    }
}

impl ModelBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let body = self.build_body(request);

        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| ModelError::Http {
                endpoint: self.endpoint.clone(),
                source: e,
            })?;

        let response = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| ModelError::Http {
                endpoint: self.endpoint.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let ollama_response: OllamaResponse = response
            .json()
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;
        non_empty_text(&ollama_response.response)
    }
}
