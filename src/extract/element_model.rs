use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Sources
// ============================================================================

/// Where UI elements are read from. Consumed once by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    ImageFile(PathBuf),
}

impl Source {
    pub fn url(url: impl Into<String>) -> Self {
        Source::Url(url.into())
    }

    pub fn image(path: impl AsRef<Path>) -> Self {
        Source::ImageFile(path.as_ref().to_path_buf())
    }

    /// Identifier used in logs: the URL, or the image's file name.
    pub fn display_name(&self) -> String {
        match self {
            Source::Url(url) => url.clone(),
            Source::ImageFile(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

// ============================================================================
// Element descriptions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    TextField,
    Button,
    Checkbox,
    RadioButton,
    Dropdown,
    Link,
}

impl ElementKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::TextField => "Text Field",
            ElementKind::Button => "Button",
            ElementKind::Checkbox => "Checkbox",
            ElementKind::RadioButton => "Radio Button",
            ElementKind::Dropdown => "Dropdown",
            ElementKind::Link => "Link",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single described control: `Kind: "label" (Function: ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiElement {
    pub kind: ElementKind,
    pub label: String,
    pub function: String,
}

impl fmt::Display for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: \"{}\" (Function: {})",
            self.kind, self.label, self.function
        )
    }
}

/// Ordered free-text lines, one per UI element. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDescription {
    lines: Vec<String>,
}

impl ElementDescription {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn from_elements(elements: &[UiElement]) -> Self {
        Self::from_lines(elements.iter().map(|e| e.to_string()).collect())
    }

    /// Wrap free text (e.g. a model's element listing), one line per entry.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines().map(str::to_string).collect())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when there is no line with visible content.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}
