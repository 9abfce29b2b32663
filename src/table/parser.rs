use super::table_model::{COLUMNS, TestCase, TestCaseTable};

// ============================================================================
// Markdown table parser
// ============================================================================

pub const DELIMITER: char = '|';

/// Parse the model's markdown table into rows of four cells.
///
/// A line is a row candidate when it starts with `|` and is not a header
/// separator. Candidates that do not split into exactly four cells are
/// dropped. Missing or empty input yields an empty table; this never fails.
pub fn parse_table(text: Option<&str>) -> TestCaseTable {
    let Some(text) = text else {
        return TestCaseTable::default();
    };

    let rows = text
        .lines()
        .filter(|line| is_candidate_row(line))
        .filter_map(parse_row)
        .filter(|row| !is_header_echo(row))
        .collect();

    TestCaseTable::new(rows)
}

/// `|---` after trimming: the markdown header/body separator.
pub fn is_separator_line(line: &str) -> bool {
    line.trim().starts_with("|---")
}

fn is_candidate_row(line: &str) -> bool {
    line.starts_with(DELIMITER) && !is_separator_line(line)
}

fn parse_row(line: &str) -> Option<TestCase> {
    let segments: Vec<&str> = line.split(DELIMITER).collect();
    if segments.len() < 2 {
        return None;
    }

    // First and last segments sit outside the outer pipes.
    let inner = &segments[1..segments.len() - 1];
    let cells: [String; 4] = match inner {
        [a, b, c, d] => [a, b, c, d].map(|s| s.trim().to_string()),
        _ => return None,
    };

    // `| :--- | --- | ---: | --- |` style separators
    if cells.iter().all(|c| is_alignment_marker(c)) {
        return None;
    }

    Some(TestCase::from_cells(cells))
}

fn is_alignment_marker(cell: &str) -> bool {
    let dashes = cell.strip_prefix(':').unwrap_or(cell);
    let dashes = dashes.strip_suffix(':').unwrap_or(dashes);
    dashes.len() >= 3 && dashes.chars().all(|c| c == '-')
}

fn is_header_echo(row: &TestCase) -> bool {
    row.cells()
        .iter()
        .zip(COLUMNS.iter())
        .all(|(cell, column)| cell.eq_ignore_ascii_case(column))
}
