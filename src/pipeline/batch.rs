use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use zip::ZipArchive;

use super::error::PipelineError;
use super::runner::Pipeline;
use crate::export::workbook::{ResultSet, SheetCollision, export_result_set, sheet_key_for_file};
use crate::extract::element_model::Source;

pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff"];

/// An archive entry that produced no test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub name: String,
    pub kind: &'static str,
    pub reason: String,
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: ResultSet,
    pub workbook: PathBuf,
    pub skipped: Vec<SkippedItem>,
    pub collisions: Vec<SheetCollision>,
}

/// An image entry found in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub index: usize,
    /// Base file name, e.g. `login.png`.
    pub file_name: String,
    /// Sanitized relative path used when unpacking.
    pub relative_path: PathBuf,
}

/// Case-insensitive check against the supported image extensions.
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Uploads must carry a `.zip` extension.
pub fn validate_archive_name(file_name: &str) -> Result<(), PipelineError> {
    let is_zip = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        Ok(())
    } else {
        Err(PipelineError::InvalidInputFormat(
            "Invalid file type. Please upload a ZIP file.".into(),
        ))
    }
}

fn invalid_zip() -> PipelineError {
    PipelineError::InvalidInputFormat("Invalid ZIP file.".into())
}

/// Open an archive, rejecting anything that is not a readable zip.
pub fn open_archive<R: Read + Seek>(reader: R) -> Result<ZipArchive<R>, PipelineError> {
    ZipArchive::new(reader).map_err(|e| {
        warn!(error = %e, "rejecting archive");
        invalid_zip()
    })
}

/// Image entries in archive order. Directories and entries whose names
/// would escape the extraction directory are ignored.
pub fn list_image_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<ImageEntry>, PipelineError> {
    let mut images = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| {
            warn!(index, error = %e, "corrupt archive entry");
            invalid_zip()
        })?;

        if entry.is_dir() || !is_image_name(entry.name()) {
            continue;
        }
        let Some(relative_path) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping entry with unsafe path");
            continue;
        };
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.name().to_string());

        images.push(ImageEntry {
            index,
            file_name,
            relative_path,
        });
    }
    Ok(images)
}

fn unpack_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry: &ImageEntry,
    dir: &Path,
) -> std::io::Result<PathBuf> {
    let target = dir.join(&entry.relative_path);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = archive.by_index(entry.index).map_err(std::io::Error::other)?;
    let mut out = File::create(&target)?;
    std::io::copy(&mut file, &mut out)?;
    Ok(target)
}

/// Run every image in the archive at `archive_path` through the pipeline
/// and write the combined workbook to `output`.
pub fn process_archive(
    pipeline: &Pipeline,
    archive_path: &Path,
    output: &Path,
) -> Result<BatchOutcome, PipelineError> {
    let file = File::open(archive_path).map_err(|e| {
        warn!(path = %archive_path.display(), error = %e, "cannot open archive");
        invalid_zip()
    })?;
    process_archive_reader(pipeline, file, output)
}

pub fn process_archive_reader<R: Read + Seek>(
    pipeline: &Pipeline,
    reader: R,
    output: &Path,
) -> Result<BatchOutcome, PipelineError> {
    let mut archive = open_archive(reader)?;
    let images = list_image_entries(&mut archive)?;
    if images.is_empty() {
        return Err(PipelineError::NoContentFound(
            "No images found in the ZIP file.".into(),
        ));
    }
    info!(images = images.len(), "processing archive");

    // Unpacked images live only as long as this call.
    let scratch = tempfile::TempDir::new().map_err(|e| PipelineError::ExtractionFailure {
        source_name: "archive".into(),
        reason: format!("could not create temporary directory: {}", e),
    })?;

    let mut results = ResultSet::new();
    let mut skipped = Vec::new();
    let mut collisions = Vec::new();

    for entry in &images {
        let outcome = unpack_entry(&mut archive, entry, scratch.path())
            .map_err(|e| PipelineError::ExtractionFailure {
                source_name: entry.file_name.clone(),
                reason: format!("could not unpack: {}", e),
            })
            .and_then(|path| pipeline.process(&Source::image(path)));

        match outcome {
            Ok(table) => {
                let key = sheet_key_for_file(&entry.file_name);
                if let Some(collision) = results.insert(&key, entry.file_name.clone(), table) {
                    collisions.push(collision);
                }
            }
            Err(e) => {
                warn!(image = %entry.file_name, kind = e.kind(), error = %e, "skipping image");
                skipped.push(SkippedItem {
                    name: entry.file_name.clone(),
                    kind: e.kind(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if results.is_empty() {
        return Err(PipelineError::EmptyResult {
            what: "any item".into(),
        });
    }

    let workbook = export_result_set(&results, output)?;
    Ok(BatchOutcome {
        results,
        workbook,
        skipped,
        collisions,
    })
}
