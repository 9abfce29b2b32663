use std::path::{Path, PathBuf};

use tracing::info;

use super::error::PipelineError;
use super::runner::Pipeline;
use crate::export::workbook::{ResultSet, URL_SHEET_NAME, export_single};
use crate::extract::element_model::Source;

/// Result of a single-URL run.
#[derive(Debug)]
pub struct UrlOutcome {
    pub url: String,
    pub results: ResultSet,
    pub workbook: PathBuf,
}

/// Crawl one URL, generate its test cases, and write a one-sheet workbook.
pub fn process_url(
    pipeline: &Pipeline,
    url: &str,
    output: &Path,
) -> Result<UrlOutcome, PipelineError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(PipelineError::InvalidInputFormat("Please enter a URL.".into()));
    }

    info!(%url, "processing URL");
    let table = pipeline.process(&Source::url(url))?;

    let workbook = export_single(&table, URL_SHEET_NAME, output)?;

    let mut results = ResultSet::new();
    results.insert(URL_SHEET_NAME, url, table);

    Ok(UrlOutcome {
        url: url.to_string(),
        results,
        workbook,
    })
}
