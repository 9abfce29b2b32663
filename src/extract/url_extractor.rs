use tracing::{debug, info};

use super::element_model::{ElementDescription, ElementKind, Source, UiElement};
use super::extractor::{ElementExtractor, ExtractError};
use crate::browser::dom_model::{PageSnapshot, RawElement};
use crate::browser::session::BrowserDriver;

pub const UNNAMED: &str = "Unnamed";

// ============================================================================
// URL extraction: crawl a live page
// ============================================================================

pub struct UrlExtractor {
    driver: Box<dyn BrowserDriver>,
    max_links: usize,
}

impl UrlExtractor {
    pub fn new(driver: Box<dyn BrowserDriver>, max_links: usize) -> Self {
        Self { driver, max_links }
    }
}

impl ElementExtractor for UrlExtractor {
    fn extract(&self, source: &Source) -> Result<ElementDescription, ExtractError> {
        let Source::Url(url) = source else {
            return Err(ExtractError::UnsupportedSource {
                extractor: "url",
                requested: source.display_name(),
            });
        };

        info!(%url, "loading page");
        let snapshot = self.driver.snapshot(url)?;
        debug!(%url, elements = snapshot.element_count(), "page queried");

        let elements = describe_snapshot(&snapshot, self.max_links);
        if elements.is_empty() {
            return Err(ExtractError::NoElements);
        }
        Ok(ElementDescription::from_elements(&elements))
    }
}

/// Map queried DOM elements to described UI elements, in query order:
/// text fields, buttons, checkboxes, radios, dropdowns, then links.
pub fn describe_snapshot(snapshot: &PageSnapshot, max_links: usize) -> Vec<UiElement> {
    let mut out = Vec::with_capacity(snapshot.element_count());

    for el in &snapshot.text_inputs {
        out.push(ui(
            ElementKind::TextField,
            first_label(&[&el.placeholder, &el.name]),
            "User input".into(),
        ));
    }

    for el in &snapshot.buttons {
        out.push(ui(
            ElementKind::Button,
            first_label(&[&el.text, &el.value]),
            "Triggers an action".into(),
        ));
    }

    for el in &snapshot.checkboxes {
        out.push(ui(
            ElementKind::Checkbox,
            first_label(&[&el.name]),
            "Toggle option".into(),
        ));
    }

    for el in &snapshot.radios {
        out.push(ui(
            ElementKind::RadioButton,
            first_label(&[&el.name]),
            "Select one option".into(),
        ));
    }

    for el in &snapshot.selects {
        out.push(ui(
            ElementKind::Dropdown,
            first_label(&[&el.name]),
            "Choose from list".into(),
        ));
    }

    for el in snapshot.links.iter().take(max_links) {
        out.push(ui(ElementKind::Link, first_label(&[&el.text]), link_function(el)));
    }

    out
}

fn ui(kind: ElementKind, label: String, function: String) -> UiElement {
    UiElement {
        kind,
        label,
        function,
    }
}

/// First attribute with visible content, else `Unnamed`.
fn first_label(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNNAMED)
        .to_string()
}

fn link_function(el: &RawElement) -> String {
    match el.href.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        Some(href) => format!("Navigates to {}", href),
        None => "Navigates to an unknown target".into(),
    }
}
