mod common;

use std::path::Path;

use common::fakes::TWO_ROW_TABLE;
use ui_testgen::export::workbook::ResultSet;
use ui_testgen::pipeline::batch::SkippedItem;
use ui_testgen::report::console::{format_console_report, format_table};
use ui_testgen::report::html::{escape_html, render_error, render_home, render_results};
use ui_testgen::table::parser::parse_table;
use ui_testgen::table::table_model::{TestCase, TestCaseTable};

// ============================================================================
// Helper builders
// ============================================================================

fn results() -> ResultSet {
    let mut results = ResultSet::new();
    results.insert("login", "login.png", parse_table(Some(TWO_ROW_TABLE)));
    results
}

fn skipped() -> Vec<SkippedItem> {
    vec![SkippedItem {
        name: "broken.png".into(),
        kind: "ExtractionFailure",
        reason: "could not decode image".into(),
    }]
}

// ============================================================================
// Console
// ============================================================================

#[test]
fn console_report_lists_tables_skips_and_summary() {
    let report = format_console_report(&results(), &skipped(), Some(Path::new("out/book.xlsx")));

    assert!(report.contains("=== login (login.png): 2 test cases ==="));
    assert!(report.contains("Login with valid credentials"));
    assert!(report.contains("Skipped: broken.png (ExtractionFailure)"));
    assert!(report.ends_with("=== 1 sheet, 2 test cases -> out/book.xlsx ===\n"));
}

#[test]
fn console_summary_pluralizes_and_omits_missing_path() {
    let mut results = results();
    results.insert("home", "home", parse_table(Some(TWO_ROW_TABLE)));

    let report = format_console_report(&results, &[], None);
    assert!(report.contains("=== home: 2 test cases ==="));
    assert!(report.ends_with("=== 2 sheets, 4 test cases ===\n"));
}

#[test]
fn console_table_pads_columns_and_clips_long_cells() {
    let long = "x".repeat(80);
    let table = TestCaseTable::new(vec![TestCase::from_cells([
        "High".into(),
        "Short".into(),
        long,
        "line one\nline two".into(),
    ])]);

    let text = format_table(&table);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("| Priority |"));
    assert!(lines[1].starts_with("|----------|"));
    assert!(lines[2].contains(&format!("{}...", "x".repeat(45))));
    assert!(lines[2].contains("line one line two"));
    // Every line has the same width.
    assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
}

// ============================================================================
// HTML
// ============================================================================

#[test]
fn home_page_offers_both_input_methods() {
    let html = render_home();
    assert!(html.contains("action=\"/test_cases\""));
    assert!(html.contains("enctype=\"multipart/form-data\""));
    assert!(html.contains("name=\"zip_file\""));
    assert!(html.contains("name=\"url\""));
}

#[test]
fn results_page_renders_tables_and_download_link() {
    let href = "/download/0123456789abcdef/Generated_UI_Test_Cases.xlsx";
    let html = render_results(&results(), href, &skipped());

    assert!(html.contains("<h2>login</h2>"));
    assert!(html.contains("<th>Expected Result</th>"));
    assert!(html.contains("<td>Session persists</td>"));
    assert!(html.contains("href=\"/download/0123456789abcdef/Generated_UI_Test_Cases.xlsx\""));
    assert!(html.contains("Skipped broken.png: ExtractionFailure"));
}

#[test]
fn model_text_is_escaped() {
    let mut results = ResultSet::new();
    results.insert(
        "xss",
        "xss.png",
        TestCaseTable::new(vec![TestCase::from_cells([
            "High".into(),
            "<script>alert(1)</script>".into(),
            "a & b".into(),
            "\"quoted\"".into(),
        ])]),
    );

    let html = render_results(&results, "/download/x/y", &[]);
    assert!(!html.contains("<script>alert"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("a &amp; b"));
    assert!(!html.contains("class=\"skipped\""));
}

#[test]
fn error_page_shows_message() {
    let html = render_error("No images found in the ZIP file.");
    assert!(html.contains("<p class=\"error\">No images found in the ZIP file.</p>"));
}

#[test]
fn escape_handles_all_special_characters() {
    assert_eq!(
        escape_html("<a href='x'>&\"</a>"),
        "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;"
    );
}
