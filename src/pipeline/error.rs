use thiserror::Error;

use crate::export::workbook::ExportError;

/// Everything a pipeline run can fail with.
///
/// In batch mode the per-item kinds (`ExtractionFailure`,
/// `GenerationFailure`, `EmptyResult`, `NoContentFound` for one image) skip
/// that item; everything else ends the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInputFormat(String),

    #[error("no content: {0}")]
    NoContentFound(String),

    #[error("extraction failed for {source_name}: {reason}")]
    ExtractionFailure { source_name: String, reason: String },

    #[error("generation failed for {source_name} after {attempts} attempt(s): {reason}")]
    GenerationFailure {
        source_name: String,
        attempts: u32,
        reason: String,
    },

    #[error("no test cases generated for {what}")]
    EmptyResult { what: String },

    #[error("export failed: {0}")]
    ExportFailure(#[from] ExportError),
}

impl PipelineError {
    /// Message shown to the user; causes stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::InvalidInputFormat(msg) | PipelineError::NoContentFound(msg) => {
                msg.clone()
            }
            PipelineError::ExtractionFailure { source_name, .. } => {
                format!("Failed to extract UI elements from {}.", source_name)
            }
            PipelineError::GenerationFailure { source_name, .. } => {
                format!("Failed to generate test cases for {}.", source_name)
            }
            PipelineError::EmptyResult { what } => format!("No test cases generated for {}.", what),
            PipelineError::ExportFailure(_) => "Error generating Excel file.".to_string(),
        }
    }

    /// Short stable name of the error kind, for logs and the web view.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInputFormat(_) => "InvalidInputFormat",
            PipelineError::NoContentFound(_) => "NoContentFound",
            PipelineError::ExtractionFailure { .. } => "ExtractionFailure",
            PipelineError::GenerationFailure { .. } => "GenerationFailure",
            PipelineError::EmptyResult { .. } => "EmptyResult",
            PipelineError::ExportFailure(_) => "ExportFailure",
        }
    }
}
