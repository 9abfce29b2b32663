use serde::{Deserialize, Serialize};

/// Column names, in sheet order.
pub const COLUMNS: [&str; 4] = ["Priority", "Scenario", "Test Case", "Expected Result"];

/// One generated QA test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub priority: String,
    pub scenario: String,
    pub test_case: String,
    pub expected_result: String,
}

impl TestCase {
    /// Build a row from exactly four cells, in column order.
    pub fn from_cells(cells: [String; 4]) -> Self {
        let [priority, scenario, test_case, expected_result] = cells;
        Self {
            priority,
            scenario,
            test_case,
            expected_result,
        }
    }

    pub fn cells(&self) -> [&str; 4] {
        [
            &self.priority,
            &self.scenario,
            &self.test_case,
            &self.expected_result,
        ]
    }
}

/// Ordered rows parsed from one model response. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseTable {
    pub rows: Vec<TestCase>,
}

impl TestCaseTable {
    pub fn new(rows: Vec<TestCase>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.rows.iter()
    }
}
