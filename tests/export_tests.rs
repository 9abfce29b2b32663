mod common;

use calamine::{Reader, open_workbook_auto};
use common::fakes::TWO_ROW_TABLE;
use ui_testgen::export::workbook::{
    ExportError, MAX_SHEET_NAME_LEN, ResultSet, export_result_set, export_single,
    sheet_key_for_file, sheet_name_for,
};
use ui_testgen::table::parser::parse_table;
use ui_testgen::table::table_model::{TestCase, TestCaseTable};

fn one_row(priority: &str) -> TestCaseTable {
    TestCaseTable::new(vec![TestCase::from_cells([
        priority.to_string(),
        "Scenario".into(),
        "Steps".into(),
        "Outcome".into(),
    ])])
}

fn cell(range: &calamine::Range<calamine::Data>, row: u32, col: u32) -> String {
    range
        .get_value((row, col))
        .map(|v| v.to_string())
        .unwrap_or_default()
}

// ============================================================================
// Sheet names
// ============================================================================

#[test]
fn long_keys_are_cut_to_the_excel_limit() {
    let key = "checkout_page_with_promotional_banner_v2";
    let name = sheet_name_for(key);
    assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);
    assert_eq!(name, &key[..31]);
}

#[test]
fn sheet_key_is_the_file_stem() {
    assert_eq!(sheet_key_for_file("login.png"), "login");
    assert_eq!(sheet_key_for_file("Signup.Page.JPEG"), "Signup.Page");
}

#[test]
fn forbidden_characters_are_replaced() {
    assert_eq!(sheet_name_for("a/b:c*d?e[f]g\\h"), "a_b_c_d_e_f_g_h");
    assert_eq!(sheet_name_for("'quoted'"), "quoted");
    assert_eq!(sheet_name_for("''"), "Sheet");
}

#[test]
fn cut_landing_on_an_apostrophe_is_trimmed_in_one_pass() {
    let file_name = format!("{}'s_dashboard.png", "a".repeat(30));

    let key = sheet_key_for_file(&file_name);
    assert_eq!(key, "a".repeat(30));
    assert_eq!(sheet_name_for(&key), key);

    let quoted = sheet_name_for(&format!("'{}", "b".repeat(40)));
    assert_eq!(quoted, "b".repeat(30));
}

#[test]
fn apostrophe_inside_a_name_is_kept() {
    assert_eq!(sheet_name_for("user's profile"), "user's profile");
}

// ============================================================================
// Result set
// ============================================================================

#[test]
fn keeps_insertion_order() {
    let mut results = ResultSet::new();
    assert!(results.insert("home", "home.png", one_row("High")).is_none());
    assert!(results.insert("about", "about.png", one_row("Low")).is_none());
    assert_eq!(results.sheet_names(), vec!["home", "about"]);
    assert_eq!(results.total_rows(), 2);
}

#[test]
fn colliding_names_keep_the_later_table_and_report_it() {
    let long_a = "registration_form_step_one_final.png";
    let long_b = "registration_form_step_one_final_v2.png";

    let mut results = ResultSet::new();
    results.insert(&sheet_key_for_file(long_a), long_a, one_row("High"));
    let collision = results
        .insert(&sheet_key_for_file(long_b), long_b, one_row("Low"))
        .expect("truncated names should collide");

    assert_eq!(collision.replaced_source, long_a);
    assert_eq!(collision.kept_source, long_b);
    assert_eq!(results.len(), 1);
    let kept = results.get(&collision.sheet_name).unwrap();
    assert_eq!(kept.rows[0].priority, "Low");
}

#[test]
fn collisions_ignore_case() {
    let mut results = ResultSet::new();
    results.insert("Login", "Login.png", one_row("High"));
    assert!(results.insert("login", "login.jpg", one_row("Low")).is_some());
    assert_eq!(results.len(), 1);
}

// ============================================================================
// Workbook
// ============================================================================

#[test]
fn writes_one_sheet_per_entry_with_header_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out.xlsx");

    let mut results = ResultSet::new();
    results.insert("login", "login.png", parse_table(Some(TWO_ROW_TABLE)));
    results.insert("home", "home.png", one_row("Medium"));

    let written = export_result_set(&results, &path).unwrap();
    assert_eq!(written, path);

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["login".to_string(), "home".to_string()]);

    let login = workbook.worksheet_range("login").unwrap();
    assert_eq!(login.height(), 3);
    assert_eq!(login.width(), 4);
    assert_eq!(cell(&login, 0, 0), "Priority");
    assert_eq!(cell(&login, 0, 3), "Expected Result");
    assert_eq!(cell(&login, 1, 0), "High");
    assert_eq!(cell(&login, 2, 2), "Check the box and submit");

    let home = workbook.worksheet_range("home").unwrap();
    assert_eq!(cell(&home, 1, 0), "Medium");
}

#[test]
fn single_sheet_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("UI_Test_Cases.xlsx");
    export_single(&one_row("High"), "Generated_UI_Test_Cases", &path).unwrap();

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Generated_UI_Test_Cases".to_string()]);
}

#[test]
fn empty_result_set_is_not_exported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    let err = export_result_set(&ResultSet::new(), &path).unwrap_err();
    assert!(matches!(err, ExportError::Empty));
    assert!(!path.exists());
}

#[test]
fn unwritable_target_is_a_save_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut results = ResultSet::new();
    results.insert("home", "home.png", one_row("High"));

    // The target is an existing directory.
    let err = export_result_set(&results, dir.path()).unwrap_err();
    assert!(matches!(err, ExportError::Save { .. }));
    assert!(dir.path().is_dir());
}
