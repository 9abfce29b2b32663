use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;
use tracing::info;

use super::element_model::{ElementDescription, Source};
use super::extractor::{ElementExtractor, ExtractError};
use crate::model::backend::{ImagePayload, ModelBackend, ModelRequest, non_empty_text};

// ============================================================================
// Image extraction: ask the model to read a screenshot
// ============================================================================

pub const IMAGE_ANALYSIS_PROMPT: &str = r#"Analyze the provided webpage screenshot and identify the following:

1. Every discernible UI element: buttons, input fields, dropdowns, checkboxes, radio buttons, links, etc.
2. The label, placeholder text, or content of each element.
3. The intended function of each element.

Format:
--------------------
UI Elements:
- Button: "Login" (Function: Submits user login credentials)
- Text Field: "Email Address" (Function: Allows user to input email)
- Checkbox: "Remember me" (Function: Saves login session)
--------------------
Provide clean, structured output."#;

pub struct ImageExtractor {
    backend: Arc<dyn ModelBackend>,
}

impl ImageExtractor {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }
}

impl ElementExtractor for ImageExtractor {
    fn extract(&self, source: &Source) -> Result<ElementDescription, ExtractError> {
        let Source::ImageFile(path) = source else {
            return Err(ExtractError::UnsupportedSource {
                extractor: "image",
                requested: source.display_name(),
            });
        };

        let payload = load_image(path)?;
        info!(image = %source.display_name(), bytes = payload.data.len(), "analyzing screenshot");

        let text = self
            .backend
            .generate(&ModelRequest::with_image(IMAGE_ANALYSIS_PROMPT, payload))?;
        let text = non_empty_text(&text)?;

        let description = ElementDescription::from_text(&text);
        if description.is_empty() {
            return Err(ExtractError::NoElements);
        }
        Ok(description)
    }
}

/// Read and decode an image, re-encoded as PNG for the model.
pub fn load_image(path: &Path) -> Result<ImagePayload, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::ImageRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let decoded = image::load_from_memory(&bytes).map_err(|e| ExtractError::ImageDecode {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ExtractError::ImageDecode {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(ImagePayload {
        mime_type: "image/png".into(),
        data: png,
    })
}
