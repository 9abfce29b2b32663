use thiserror::Error;

// ============================================================================
// ModelBackend trait: the generative model as a fallible capability
// ============================================================================

/// A prompt, optionally accompanied by one image.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    pub image: Option<ImagePayload>,
}

impl ModelRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: ImagePayload) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// Encoded image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model backend misconfigured: {0}")]
    Config(String),
}

/// Sends a request to a generative model and returns its text.
///
/// Implementations must be shareable across threads; the web front-end
/// holds one backend for the whole process.
pub trait ModelBackend: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, request: &ModelRequest) -> Result<String, ModelError>;
}

impl<T: ModelBackend + ?Sized> ModelBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        (**self).generate(request)
    }
}

impl<T: ModelBackend + ?Sized> ModelBackend for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        (**self).generate(request)
    }
}

/// Trim a model answer; whitespace-only text counts as no answer.
pub fn non_empty_text(text: &str) -> Result<String, ModelError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ModelError::EmptyResponse)
    } else {
        Ok(trimmed.to_string())
    }
}
