use std::path::Path;

use crate::export::workbook::ResultSet;
use crate::pipeline::batch::SkippedItem;
use crate::table::table_model::{COLUMNS, TestCaseTable};

// ============================================================================
// Console reporter: generated tables as terminal text
// ============================================================================

const MAX_CELL_WIDTH: usize = 48;

/// Format results for terminal output.
///
/// Produces output like:
/// ```text
/// === login (login.png): 2 test cases ===
/// | Priority | Scenario     | Test Case  | Expected Result |
/// |----------|--------------|------------|-----------------|
/// | High     | Valid login  | Enter a... | User is logge...|
///
/// Skipped: broken.png (ExtractionFailure)
/// === 1 sheet, 2 test cases -> out/Generated_UI_Test_Cases.xlsx ===
/// ```
pub fn format_console_report(
    results: &ResultSet,
    skipped: &[SkippedItem],
    workbook: Option<&Path>,
) -> String {
    let mut out = String::new();

    for entry in results.entries() {
        let heading = if entry.source_name == entry.sheet_name {
            entry.sheet_name.clone()
        } else {
            format!("{} ({})", entry.sheet_name, entry.source_name)
        };
        out.push_str(&format!(
            "=== {}: {} test cases ===\n",
            heading,
            entry.table.len()
        ));
        out.push_str(&format_table(&entry.table));
        out.push('\n');
    }

    for item in skipped {
        out.push_str(&format!("Skipped: {} ({})\n", item.name, item.kind));
    }

    out.push_str(&format!(
        "=== {} sheet{}, {} test cases",
        results.len(),
        if results.len() == 1 { "" } else { "s" },
        results.total_rows()
    ));
    if let Some(path) = workbook {
        out.push_str(&format!(" -> {}", path.display()));
    }
    out.push_str(" ===\n");

    out
}

/// Render one table with padded columns; long cells are cut with `...`.
pub fn format_table(table: &TestCaseTable) -> String {
    let rows: Vec<[String; 4]> = table
        .iter()
        .map(|case| case.cells().map(clip))
        .collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_row(&COLUMNS.map(String::from), &widths));
    out.push_str(&format!(
        "|{}|\n",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in &rows {
        out.push_str(&format_row(row, &widths));
    }
    out
}

fn format_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, w)| format!(" {:<width$} ", cell, width = *w))
        .collect();
    format!("|{}|\n", padded.join("|"))
}

fn clip(cell: &str) -> String {
    let flat = cell.replace(['\n', '\r'], " ");
    if flat.chars().count() <= MAX_CELL_WIDTH {
        flat
    } else {
        let head: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", head)
    }
}
