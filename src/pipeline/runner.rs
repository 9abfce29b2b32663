use std::sync::Arc;

use tracing::{debug, info};

use super::error::PipelineError;
use crate::browser::session::BrowserDriver;
use crate::extract::element_model::Source;
use crate::extract::extractor::ElementExtractor;
use crate::extract::image_extractor::ImageExtractor;
use crate::extract::url_extractor::UrlExtractor;
use crate::generator::retry::RetryPolicy;
use crate::generator::test_case_generator::{GenerationError, TestCaseGenerator};
use crate::model::backend::ModelBackend;
use crate::table::parser::parse_table;
use crate::table::table_model::TestCaseTable;

// ============================================================================
// Pipeline: extract -> generate -> parse, once per source
// ============================================================================

pub struct Pipeline {
    url_extractor: Box<dyn ElementExtractor>,
    image_extractor: Box<dyn ElementExtractor>,
    generator: TestCaseGenerator,
}

impl Pipeline {
    pub fn new(
        url_extractor: Box<dyn ElementExtractor>,
        image_extractor: Box<dyn ElementExtractor>,
        generator: TestCaseGenerator,
    ) -> Self {
        Self {
            url_extractor,
            image_extractor,
            generator,
        }
    }

    /// Standard wiring: one model backend shared by the image extractor and
    /// the generator, and a browser driver for URLs.
    pub fn with_backend(
        backend: Arc<dyn ModelBackend>,
        driver: Box<dyn BrowserDriver>,
        max_links: usize,
        policy: RetryPolicy,
    ) -> Self {
        Self::new(
            Box::new(UrlExtractor::new(driver, max_links)),
            Box::new(ImageExtractor::new(backend.clone())),
            TestCaseGenerator::new(backend, policy),
        )
    }

    /// Run one source through every stage. Any stage failure short-circuits.
    pub fn process(&self, source: &Source) -> Result<TestCaseTable, PipelineError> {
        let name = source.display_name();
        let extractor = match source {
            Source::Url(_) => &self.url_extractor,
            Source::ImageFile(_) => &self.image_extractor,
        };

        let description = extractor
            .extract(source)
            .map_err(|e| PipelineError::ExtractionFailure {
                source_name: name.clone(),
                reason: e.to_string(),
            })?;
        debug!(source = %name, lines = description.lines().len(), "elements extracted");

        let text = self.generator.generate(&description).map_err(|e| match e {
            GenerationError::EmptyDescription => {
                PipelineError::NoContentFound(format!("No UI elements described for {}.", name))
            }
            GenerationError::Exhausted { attempts, reason } => PipelineError::GenerationFailure {
                source_name: name.clone(),
                attempts,
                reason,
            },
        })?;

        let table = parse_table(Some(&text));
        if table.is_empty() {
            return Err(PipelineError::EmptyResult { what: name });
        }

        info!(source = %name, rows = table.len(), "test cases generated");
        Ok(table)
    }
}
