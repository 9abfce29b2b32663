mod common;

use std::io::Cursor;

use calamine::{Reader, open_workbook_auto};
use common::archives::{png_bytes, zip_bytes};
use common::fakes::{
    FakeDriver, ScriptedBackend, TWO_ROW_TABLE, login_page, mock_pipeline, pipeline_with,
};
use ui_testgen::export::workbook::URL_SHEET_NAME;
use ui_testgen::extract::element_model::Source;
use ui_testgen::pipeline::batch::{
    is_image_name, process_archive, process_archive_reader, validate_archive_name,
};
use ui_testgen::pipeline::error::PipelineError;
use ui_testgen::pipeline::single::process_url;

// ============================================================================
// Archive validation
// ============================================================================

#[test]
fn archive_without_images_has_no_content() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = zip_bytes(&[("notes.txt", b"hello".to_vec()), ("assets/", vec![])]);
    let output = dir.path().join("out.xlsx");

    let pipeline = mock_pipeline(FakeDriver::failing());
    let err = process_archive_reader(&pipeline, Cursor::new(bytes), &output).unwrap_err();

    assert!(matches!(err, PipelineError::NoContentFound(_)));
    assert_eq!(err.user_message(), "No images found in the ZIP file.");
    assert!(!output.exists());
}

#[test]
fn non_zip_bytes_are_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.xlsx");

    let err = process_archive_reader(
        &mock_pipeline(FakeDriver::failing()),
        Cursor::new(b"PK? not really".to_vec()),
        &output,
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInputFormat(_)));
    assert_eq!(err.user_message(), "Invalid ZIP file.");
}

#[test]
fn missing_archive_file_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_archive(
        &mock_pipeline(FakeDriver::failing()),
        &dir.path().join("absent.zip"),
        &dir.path().join("out.xlsx"),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInputFormat(_)));
}

#[test]
fn archive_names_must_end_in_zip() {
    assert!(validate_archive_name("shots.zip").is_ok());
    assert!(validate_archive_name("SHOTS.ZIP").is_ok());
    let err = validate_archive_name("shots.rar").unwrap_err();
    assert_eq!(err.user_message(), "Invalid file type. Please upload a ZIP file.");
}

#[test]
fn image_extensions_match_case_insensitively() {
    for name in ["a.png", "b.JPG", "c.jpeg", "d.Gif", "e.bmp", "f.tiff"] {
        assert!(is_image_name(name), "{name}");
    }
    assert!(!is_image_name("g.webp"));
    assert!(!is_image_name("readme"));
}

// ============================================================================
// Batch runs
// ============================================================================

#[test]
fn batch_writes_one_sheet_per_image_and_skips_failures() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("shots.zip");
    std::fs::write(
        &archive,
        zip_bytes(&[
            ("screens/login.png", png_bytes()),
            ("screens/broken.png", b"garbage".to_vec()),
            ("home.PNG", png_bytes()),
            ("readme.md", b"# shots".to_vec()),
        ]),
    )
    .unwrap();
    let output = dir.path().join("out").join("Generated_UI_Test_Cases.xlsx");

    let pipeline = mock_pipeline(FakeDriver::failing());
    let outcome = process_archive(&pipeline, &archive, &output).unwrap();

    assert_eq!(outcome.results.sheet_names(), vec!["login", "home"]);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].name, "broken.png");
    assert_eq!(outcome.skipped[0].kind, "ExtractionFailure");
    assert!(outcome.collisions.is_empty());
    assert_eq!(outcome.workbook, output);

    let mut workbook = open_workbook_auto(&output).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["login".to_string(), "home".to_string()]);
}

#[test]
fn duplicate_stems_are_reported_as_collisions() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = zip_bytes(&[("a/login.png", png_bytes()), ("b/login.png", png_bytes())]);
    let output = dir.path().join("out.xlsx");

    let pipeline = mock_pipeline(FakeDriver::failing());
    let outcome = process_archive_reader(&pipeline, Cursor::new(bytes), &output).unwrap();
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.collisions.len(), 1);
    assert_eq!(outcome.collisions[0].sheet_name, "login");
}

#[test]
fn batch_with_no_successful_image_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = zip_bytes(&[("one.png", b"bad".to_vec()), ("two.jpg", b"worse".to_vec())]);
    let output = dir.path().join("out.xlsx");

    let pipeline = mock_pipeline(FakeDriver::failing());
    let err = process_archive_reader(&pipeline, Cursor::new(bytes), &output).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyResult { .. }));
    assert_eq!(err.user_message(), "No test cases generated for any item.");
    assert!(!output.exists());
}

// ============================================================================
// Single URL
// ============================================================================

#[test]
fn url_run_writes_the_generated_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("UI_Test_Cases.xlsx");

    let outcome = process_url(
        &mock_pipeline(FakeDriver::returning(login_page())),
        "  https://example.com/login ",
        &output,
    )
    .unwrap();

    assert_eq!(outcome.url, "https://example.com/login");
    let table = outcome.results.get(URL_SHEET_NAME).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.rows[0].priority, "High");

    let mut workbook = open_workbook_auto(&output).unwrap();
    assert_eq!(workbook.sheet_names(), vec![URL_SHEET_NAME.to_string()]);
    let sheet = workbook.worksheet_range(URL_SHEET_NAME).unwrap();
    assert_eq!(sheet.height(), 1 + table.len());
    assert_eq!(
        sheet.get_value((1, 0)).map(|v| v.to_string()).as_deref(),
        Some("High")
    );
}

#[test]
fn blank_url_is_rejected_before_crawling() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_url(
        &mock_pipeline(FakeDriver::returning(login_page())),
        "   ",
        &dir.path().join("out.xlsx"),
    )
    .unwrap_err();
    assert_eq!(err.user_message(), "Please enter a URL.");
}

#[test]
fn unreachable_url_reports_extraction_failure() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_url(
        &mock_pipeline(FakeDriver::failing()),
        "https://nowhere.invalid",
        &dir.path().join("out.xlsx"),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::ExtractionFailure { .. }));
    assert_eq!(
        err.user_message(),
        "Failed to extract UI elements from https://nowhere.invalid."
    );
}

#[test]
fn generation_failure_carries_attempt_count() {
    let pipeline = pipeline_with(
        ScriptedBackend::always_failing(),
        FakeDriver::returning(login_page()),
    );
    let err = pipeline.process(&Source::url("https://example.com")).unwrap_err();
    match err {
        PipelineError::GenerationFailure { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected GenerationFailure, got {other:?}"),
    }
}

#[test]
fn answer_without_table_rows_is_an_empty_result() {
    let pipeline = pipeline_with(
        ScriptedBackend::new(vec![Ok("Sorry, I cannot help with that.".into())]),
        FakeDriver::returning(login_page()),
    );
    let err = pipeline.process(&Source::url("https://example.com")).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyResult { .. }));
}

#[test]
fn scripted_table_passes_through_unchanged() {
    let pipeline = pipeline_with(
        ScriptedBackend::new(vec![Ok(TWO_ROW_TABLE.into())]),
        FakeDriver::returning(login_page()),
    );
    let table = pipeline.process(&Source::url("https://example.com")).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[1].priority, "Low");
}
