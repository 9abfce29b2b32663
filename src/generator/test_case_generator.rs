use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::retry::RetryPolicy;
use crate::extract::element_model::ElementDescription;
use crate::model::backend::{ModelBackend, ModelRequest, non_empty_text};
use crate::table::table_model::COLUMNS;

// ============================================================================
// Test-case generation
// ============================================================================

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Nothing to send; no model call was made.
    #[error("element description is empty")]
    EmptyDescription,

    #[error("all {attempts} attempt(s) failed: {reason}")]
    Exhausted { attempts: u32, reason: String },
}

/// Turns an element description into raw markdown table text.
pub struct TestCaseGenerator {
    backend: Arc<dyn ModelBackend>,
    policy: RetryPolicy,
}

impl TestCaseGenerator {
    pub fn new(backend: Arc<dyn ModelBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn generate(&self, description: &ElementDescription) -> Result<String, GenerationError> {
        self.generate_with(description, &self.policy)
    }

    /// Same as `generate` with an explicit retry policy.
    pub fn generate_with(
        &self,
        description: &ElementDescription,
        policy: &RetryPolicy,
    ) -> Result<String, GenerationError> {
        if description.is_empty() {
            return Err(GenerationError::EmptyDescription);
        }

        let request = ModelRequest::text(build_prompt(description));

        policy
            .run(|attempt| {
                debug!(
                    attempt = attempt + 1,
                    backend = self.backend.name(),
                    "requesting test cases"
                );
                let text = self.backend.generate(&request)?;
                non_empty_text(&text)
            })
            .map_err(|exhausted| GenerationError::Exhausted {
                attempts: exhausted.attempts,
                reason: exhausted
                    .last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no attempts were made".into()),
            })
    }
}

/// The generation prompt: role, the description between rulers, the table
/// header to follow, and an instruction to answer with the table only.
pub fn build_prompt(description: &ElementDescription) -> String {
    let header = format!("| {} |", COLUMNS.join(" | "));
    let separator = format!(
        "|{}|",
        COLUMNS
            .iter()
            .map(|c| "-".repeat(c.len() + 2))
            .collect::<Vec<_>>()
            .join("|")
    );

    format!(
        r#"You are a QA expert. Using the UI elements described below, write prioritized test scenarios and test cases.

--------------------
{}
--------------------

Format:
{}
{}

Only return the table."#,
        description.to_text(),
        header,
        separator
    )
}
