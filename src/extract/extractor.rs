use std::path::PathBuf;

use thiserror::Error;

use super::element_model::{ElementDescription, Source};
use crate::browser::error::BrowserError;
use crate::model::backend::ModelError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{extractor} extractor cannot read {requested}")]
    UnsupportedSource {
        extractor: &'static str,
        requested: String,
    },

    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("could not read image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not decode image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("no UI elements found")]
    NoElements,
}

/// Produces a textual description of the UI elements found in a source.
pub trait ElementExtractor: Send + Sync {
    fn extract(&self, source: &Source) -> Result<ElementDescription, ExtractError>;
}
