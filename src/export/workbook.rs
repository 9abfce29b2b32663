use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;
use tracing::{info, warn};

use crate::table::table_model::{COLUMNS, TestCaseTable};

/// Excel's limit on worksheet name length.
pub const MAX_SHEET_NAME_LEN: usize = 31;

pub const BATCH_WORKBOOK_NAME: &str = "Generated_UI_Test_Cases.xlsx";
pub const URL_WORKBOOK_NAME: &str = "UI_Test_Cases.xlsx";
/// Sheet label used for the single-URL export.
pub const URL_SHEET_NAME: &str = "Generated_UI_Test_Cases";

const COLUMN_WIDTHS: [f64; 4] = [10.0, 36.0, 60.0, 48.0];

// ============================================================================
// Sheet naming
// ============================================================================

/// Make `key` a legal worksheet name: forbidden characters become `_`,
/// the result is cut to 31 chars, then surrounding apostrophes are dropped.
pub fn sheet_name_for(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cut: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();

    // Excel rejects names that start or end with an apostrophe.
    let name = cut.trim_matches('\'').to_string();
    if name.trim().is_empty() {
        "Sheet".to_string()
    } else {
        name
    }
}

/// Sheet key for an image file: its base name without extension.
pub fn sheet_key_for_file(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    sheet_name_for(&stem)
}

// ============================================================================
// Result set
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub sheet_name: String,
    pub source_name: String,
    pub table: TestCaseTable,
}

/// Two sources mapped to the same sheet name; the later one was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetCollision {
    pub sheet_name: String,
    pub replaced_source: String,
    pub kept_source: String,
}

/// Tables keyed by sheet name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    entries: Vec<ResultEntry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `table` under the sheet name derived from `key`.
    ///
    /// Sheet names compare case-insensitively, as Excel does. On a clash the
    /// new table replaces the old one in place and the clash is returned.
    pub fn insert(
        &mut self,
        key: &str,
        source_name: impl Into<String>,
        table: TestCaseTable,
    ) -> Option<SheetCollision> {
        let sheet_name = sheet_name_for(key);
        let source_name = source_name.into();

        let folded = sheet_name.to_lowercase();
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.sheet_name.to_lowercase() == folded)
        {
            let collision = SheetCollision {
                sheet_name: existing.sheet_name.clone(),
                replaced_source: std::mem::replace(&mut existing.source_name, source_name.clone()),
                kept_source: source_name,
            };
            existing.table = table;
            warn!(
                sheet = %collision.sheet_name,
                replaced = %collision.replaced_source,
                kept = %collision.kept_source,
                "sheet name collision; earlier results overwritten"
            );
            return Some(collision);
        }

        self.entries.push(ResultEntry {
            sheet_name,
            source_name,
            table,
        });
        None
    }

    pub fn get(&self, sheet_name: &str) -> Option<&TestCaseTable> {
        self.entries
            .iter()
            .find(|e| e.sheet_name == sheet_name)
            .map(|e| &e.table)
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.sheet_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.entries.iter().map(|e| e.table.len()).sum()
    }
}

// ============================================================================
// Workbook export
// ============================================================================

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,

    #[error("could not write sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        source: XlsxError,
    },

    #[error("could not save workbook {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        source: XlsxError,
    },

    #[error("could not create directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write one sheet per entry to `path`. On failure the file is removed;
/// a half-written workbook is never left behind.
pub fn export_result_set(results: &ResultSet, path: &Path) -> Result<PathBuf, ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut workbook = build_workbook(results)?;
    if let Err(e) = workbook.save(path) {
        let _ = std::fs::remove_file(path);
        return Err(ExportError::Save {
            path: path.to_path_buf(),
            source: e,
        });
    }

    info!(
        path = %path.display(),
        sheets = results.len(),
        rows = results.total_rows(),
        "workbook written"
    );
    Ok(path.to_path_buf())
}

/// Single-sheet export, used for the URL flow.
pub fn export_single(
    table: &TestCaseTable,
    sheet_key: &str,
    path: &Path,
) -> Result<PathBuf, ExportError> {
    let mut results = ResultSet::new();
    results.insert(sheet_key, sheet_key, table.clone());
    export_result_set(&results, path)
}

fn build_workbook(results: &ResultSet) -> Result<Workbook, ExportError> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x2563EB))
        .set_font_color(Color::RGB(0xFFFFFF));
    let text_format = Format::new().set_text_wrap();

    let mut workbook = Workbook::new();
    for entry in results.entries() {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, entry, &header_format, &text_format).map_err(|e| {
            ExportError::Sheet {
                sheet: entry.sheet_name.clone(),
                source: e,
            }
        })?;
    }
    Ok(workbook)
}

/// Header row, then one row per test case. No index column.
fn write_sheet(
    worksheet: &mut Worksheet,
    entry: &ResultEntry,
    header_format: &Format,
    text_format: &Format,
) -> Result<(), XlsxError> {
    worksheet.set_name(&entry.sheet_name)?;

    for (col, (header, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        worksheet.set_column_width(col as u16, width)?;
        worksheet.write_string_with_format(0, col as u16, *header, header_format)?;
    }

    for (i, case) in entry.table.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in case.cells().iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, strip_control(cell), text_format)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Control characters (other than tab and newlines) corrupt sheet XML.
fn strip_control(s: &str) -> String {
    s.chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || !c.is_control())
        .collect()
}
