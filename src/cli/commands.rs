use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::cli::config::Settings;
use crate::cli::interactive::run_interactive;
use crate::export::workbook::{BATCH_WORKBOOK_NAME, URL_WORKBOOK_NAME};
use crate::pipeline::batch::{process_archive, validate_archive_name};
use crate::pipeline::error::PipelineError;
use crate::pipeline::runner::Pipeline;
use crate::pipeline::single::process_url;
use crate::report::console::format_console_report;
use crate::server::routes::{AppState, serve};

// ============================================================================
// url subcommand
// ============================================================================

/// Returns whether a workbook was produced.
pub fn cmd_url(settings: &Settings, url: &str, output: Option<&str>) -> anyhow::Result<bool> {
    let pipeline = settings.build_pipeline()?;
    let output = output_path(settings, output, URL_WORKBOOK_NAME);

    match process_url(&pipeline, url, &output) {
        Ok(outcome) => {
            print!(
                "{}",
                format_console_report(&outcome.results, &[], Some(&outcome.workbook))
            );
            Ok(true)
        }
        Err(e) => Ok(report_failure(&e)),
    }
}

// ============================================================================
// batch subcommand
// ============================================================================

pub fn cmd_batch(settings: &Settings, archive: &str, output: Option<&str>) -> anyhow::Result<bool> {
    let pipeline = settings.build_pipeline()?;
    let output = output_path(settings, output, BATCH_WORKBOOK_NAME);
    Ok(run_batch(&pipeline, Path::new(archive), &output))
}

pub(crate) fn run_batch(pipeline: &Pipeline, archive: &Path, output: &Path) -> bool {
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let result = validate_archive_name(&file_name)
        .and_then(|_| process_archive(pipeline, archive, output));

    match result {
        Ok(outcome) => {
            print!(
                "{}",
                format_console_report(&outcome.results, &outcome.skipped, Some(&outcome.workbook))
            );
            for collision in &outcome.collisions {
                eprintln!(
                    "Warning: sheet '{}' from {} was overwritten by {}",
                    collision.sheet_name, collision.replaced_source, collision.kept_source
                );
            }
            true
        }
        Err(e) => report_failure(&e),
    }
}

// ============================================================================
// serve subcommand
// ============================================================================

pub fn cmd_serve(settings: Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let pipeline = settings.build_pipeline()?;
    let addr = bind.unwrap_or(settings.bind.as_str()).to_string();

    std::fs::create_dir_all(&settings.upload_dir).with_context(|| {
        format!("could not create upload directory {}", settings.upload_dir.display())
    })?;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        upload_dir: settings.upload_dir.clone(),
    };

    let runtime = tokio::runtime::Runtime::new().context("could not start async runtime")?;
    info!(%addr, "starting web server");
    runtime.block_on(serve(&addr, state))
}

// ============================================================================
// interactive subcommand
// ============================================================================

pub fn cmd_interactive(settings: &Settings) -> anyhow::Result<bool> {
    let pipeline = settings.build_pipeline()?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_interactive(&pipeline, settings, stdin.lock(), stdout.lock())
}

// ============================================================================
// Helpers
// ============================================================================

fn output_path(settings: &Settings, output: Option<&str>, default_name: &str) -> PathBuf {
    output
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.upload_dir.join(default_name))
}

/// Print the user-facing message; the cause goes to the log.
fn report_failure(error: &PipelineError) -> bool {
    tracing::error!(kind = error.kind(), error = %error, "run failed");
    eprintln!("{}", error.user_message());
    false
}
