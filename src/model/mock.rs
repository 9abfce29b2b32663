use super::backend::{ModelBackend, ModelError, ModelRequest};

// ============================================================================
// Mock Backend (offline runs without any model service)
// ============================================================================

const PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];

/// Deterministic backend: echoes element lines from the prompt back as a
/// test-case table, and answers image requests with a fixed listing.
pub struct MockBackend;

impl MockBackend {
    fn describe_image() -> String {
        [
            "UI Elements:",
            "- Text Field: \"Email Address\" (Function: Allows user to input email)",
            "- Button: \"Login\" (Function: Submits user login credentials)",
        ]
        .join("\n")
    }

    fn table_for(prompt: &str) -> String {
        let mut out = String::from(
            "| Priority | Scenario | Test Case | Expected Result |\n\
             |----------|----------|-----------|-----------------|\n",
        );

        let elements = prompt
            .lines()
            .map(|l| l.trim().trim_start_matches("- "))
            .filter(|l| l.contains("(Function:"));

        for (i, element) in elements.enumerate() {
            let (subject, function) = element
                .split_once(" (Function: ")
                .map(|(s, f)| (s, f.trim_end_matches(')')))
                .unwrap_or((element, "Works as labelled"));
            let subject = subject.replace('|', "/");
            let function = function.replace('|', "/");
            out.push_str(&format!(
                "| {} | Verify {} | Interact with {} | {} |\n",
                PRIORITIES[i % PRIORITIES.len()],
                subject,
                subject,
                function
            ));
        }

        out
    }
}

impl ModelBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        if request.image.is_some() {
            return Ok(Self::describe_image());
        }
        Ok(Self::table_for(&request.prompt))
    }
}
