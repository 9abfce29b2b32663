use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Attributes read from one matched DOM element. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawElement {
    #[serde(default)]
    pub tag: String,
    #[serde(rename = "type", default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

/// Interactive elements of a loaded page, grouped by query, in DOM order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// `input[type=text|email|password]`
    #[serde(default)]
    pub text_inputs: Vec<RawElement>,
    /// `button`, `input[type=submit]`, `input[type=button]`
    #[serde(default)]
    pub buttons: Vec<RawElement>,
    #[serde(default)]
    pub checkboxes: Vec<RawElement>,
    #[serde(default)]
    pub radios: Vec<RawElement>,
    #[serde(default)]
    pub selects: Vec<RawElement>,
    /// Anchors, already capped to the requested count.
    #[serde(default)]
    pub links: Vec<RawElement>,
}

impl PageSnapshot {
    pub fn element_count(&self) -> usize {
        self.text_inputs.len()
            + self.buttons.len()
            + self.checkboxes.len()
            + self.radios.len()
            + self.selects.len()
            + self.links.len()
    }
}

/// How the headless browser is launched and how long a page may settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub node_binary: String,
    pub script: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub settle_delay: Duration,
    pub max_links: usize,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            node_binary: "node".into(),
            script: PathBuf::from("node/browser_server.js"),
            viewport_width: 1920,
            viewport_height: 1080,
            settle_delay: Duration::from_secs(2),
            max_links: 5,
        }
    }
}
