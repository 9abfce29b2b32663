use std::io::{BufRead, Write};
use std::path::Path;

use crate::cli::config::Settings;
use crate::export::workbook::{BATCH_WORKBOOK_NAME, URL_WORKBOOK_NAME};
use crate::pipeline::batch::{process_archive, validate_archive_name};
use crate::pipeline::runner::Pipeline;
use crate::pipeline::single::process_url;
use crate::report::console::format_console_report;

// ============================================================================
// Prompt-driven front-end
// ============================================================================

/// Ask for an input method and its input, run it, and show the tables.
///
/// Returns whether a workbook was produced. Pipeline failures are shown
/// as messages; only I/O on the terminal itself is an error.
pub fn run_interactive<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    settings: &Settings,
    mut input: R,
    mut out: W,
) -> anyhow::Result<bool> {
    writeln!(out, "Choose an input method:")?;
    writeln!(out, "  1) ZIP archive of screenshots")?;
    writeln!(out, "  2) Website URL")?;

    let choice = loop {
        let Some(answer) = prompt(&mut input, &mut out, "> ")? else {
            return Ok(false);
        };
        match answer.as_str() {
            "1" | "zip" => break Method::Zip,
            "2" | "url" => break Method::Url,
            _ => writeln!(out, "Please enter 1 or 2.")?,
        }
    };

    let produced = match choice {
        Method::Zip => {
            let Some(path) = prompt(&mut input, &mut out, "Path to ZIP archive: ")? else {
                return Ok(false);
            };
            let output = settings.upload_dir.join(BATCH_WORKBOOK_NAME);
            let archive = Path::new(&path);
            let file_name = archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match validate_archive_name(&file_name)
                .and_then(|_| process_archive(pipeline, archive, &output))
            {
                Ok(outcome) => {
                    let report = format_console_report(
                        &outcome.results,
                        &outcome.skipped,
                        Some(&outcome.workbook),
                    );
                    write!(out, "{}", report)?;
                    true
                }
                Err(e) => {
                    writeln!(out, "{}", e.user_message())?;
                    false
                }
            }
        }
        Method::Url => {
            let Some(url) = prompt(&mut input, &mut out, "URL: ")? else {
                return Ok(false);
            };
            let output = settings.upload_dir.join(URL_WORKBOOK_NAME);
            match process_url(pipeline, &url, &output) {
                Ok(outcome) => {
                    write!(
                        out,
                        "{}",
                        format_console_report(&outcome.results, &[], Some(&outcome.workbook))
                    )?;
                    true
                }
                Err(e) => {
                    writeln!(out, "{}", e.user_message())?;
                    false
                }
            }
        }
    };

    out.flush()?;
    Ok(produced)
}

enum Method {
    Zip,
    Url,
}

/// `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> anyhow::Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
