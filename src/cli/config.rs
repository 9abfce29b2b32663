use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::browser::dom_model::BrowserOptions;
use crate::browser::session::PlaywrightDriver;
use crate::generator::retry::RetryPolicy;
use crate::model::backend::{ModelBackend, ModelError};
use crate::model::gemini::{DEFAULT_GEMINI_MODEL, GeminiBackend};
use crate::model::mock::MockBackend;
use crate::model::ollama::{DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL, OllamaBackend};
use crate::pipeline::runner::Pipeline;

pub const DEFAULT_CONFIG_FILE: &str = "ui-testgen.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "ui-testgen",
    version,
    about = "Generate prioritized UI test cases from screenshots or a live page"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: ui-testgen.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Model provider
    #[arg(long, value_enum, global = true)]
    pub provider: Option<Provider>,

    /// Model identifier, e.g. gemini-1.5-flash
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// API key for the model provider
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Override the model API endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Directory for uploads and generated workbooks
    #[arg(long, global = true)]
    pub upload_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl one page and generate its test cases
    Url {
        /// Page to crawl
        #[arg(long)]
        url: String,

        /// Output workbook (default: <upload-dir>/UI_Test_Cases.xlsx)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate test cases for every screenshot in a ZIP archive
    Batch {
        /// ZIP archive of screenshots
        #[arg(long)]
        archive: String,

        /// Output workbook (default: <upload-dir>/Generated_UI_Test_Cases.xlsx)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Serve the web form
    Serve {
        /// Address to listen on (default from config: 127.0.0.1:5000)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Answer prompts instead of passing arguments
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Ollama,
    Mock,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `ui-testgen.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: Option<Provider>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_two")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_unit_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_unit_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_node")]
    pub node: String,
    #[serde(default = "default_script")]
    pub script: String,
    #[serde(default = "default_width")]
    pub viewport_width: u32,
    #[serde(default = "default_height")]
    pub viewport_height: u32,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_max_links")]
    pub max_links: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node: default_node(),
            script: default_script(),
            viewport_width: default_width(),
            viewport_height: default_height(),
            settle_ms: default_settle_ms(),
            max_links: default_max_links(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

// Serde default helpers
fn default_two() -> u32 { 2 }
fn default_backoff_ms() -> u64 { 1000 }
fn default_node() -> String { "node".to_string() }
fn default_script() -> String { "node/browser_server.js".to_string() }
fn default_width() -> u32 { 1920 }
fn default_height() -> u32 { 1080 }
fn default_settle_ms() -> u64 { 2000 }
fn default_max_links() -> usize { 5 }
fn default_bind() -> String { "127.0.0.1:5000".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "malformed config file; using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Settings: resolved once at startup, read-only afterwards
// ============================================================================

#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub retry: RetryPolicy,
    pub browser: BrowserOptions,
    pub upload_dir: PathBuf,
    pub bind: String,
}

impl Settings {
    /// Merge sources: CLI > config file > environment > defaults.
    ///
    /// `env` looks up environment variables; `main` passes `std::env::var`,
    /// tests pass a fixed map.
    pub fn resolve<F>(cli: &Cli, config: &AppConfig, env: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = cli
            .provider
            .or(config.model.provider)
            .or_else(|| env("UI_TESTGEN_PROVIDER").and_then(|p| Provider::from_str(&p, true).ok()))
            .unwrap_or_default();

        let model = cli
            .model
            .clone()
            .or_else(|| config.model.model.clone())
            .or_else(|| env("UI_TESTGEN_MODEL"))
            .unwrap_or_else(|| default_model(provider).to_string());

        let api_key = cli
            .api_key
            .clone()
            .or_else(|| config.model.api_key.clone())
            .or_else(|| env("GEMINI_API_KEY"))
            .or_else(|| env("GOOGLE_API_KEY"));

        let endpoint = cli.endpoint.clone().or_else(|| config.model.endpoint.clone());

        let upload_dir = cli
            .upload_dir
            .clone()
            .or_else(|| config.storage.upload_dir.clone())
            .or_else(|| env("UI_TESTGEN_UPLOAD_DIR"))
            .unwrap_or_else(|| "uploads".to_string());

        let browser = BrowserOptions {
            node_binary: config.browser.node.clone(),
            script: PathBuf::from(&config.browser.script),
            viewport_width: config.browser.viewport_width,
            viewport_height: config.browser.viewport_height,
            settle_delay: Duration::from_millis(config.browser.settle_ms),
            max_links: config.browser.max_links,
        };

        Settings {
            provider,
            model,
            api_key,
            endpoint,
            retry: RetryPolicy::new(
                config.generation.max_attempts.max(1),
                Duration::from_millis(config.generation.backoff_unit_ms),
            ),
            browser,
            upload_dir: PathBuf::from(upload_dir),
            bind: config.server.bind.clone(),
        }
    }

    /// Build the configured model backend.
    pub fn build_backend(&self) -> Result<Arc<dyn ModelBackend>, ModelError> {
        match self.provider {
            Provider::Gemini => {
                let key = self.api_key.as_deref().unwrap_or_default();
                let backend = GeminiBackend::new(self.endpoint.as_deref(), &self.model, key)?;
                Ok(Arc::new(backend))
            }
            Provider::Ollama => {
                let endpoint = self.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
                Ok(Arc::new(OllamaBackend::new(endpoint, &self.model)))
            }
            Provider::Mock => Ok(Arc::new(MockBackend)),
        }
    }

    /// Wire the full pipeline from these settings.
    pub fn build_pipeline(&self) -> Result<Pipeline, ModelError> {
        let backend = self.build_backend()?;
        Ok(Pipeline::with_backend(
            backend,
            Box::new(PlaywrightDriver::new(self.browser.clone())),
            self.browser.max_links,
            self.retry,
        ))
    }
}

pub fn default_model(provider: Provider) -> &'static str {
    match provider {
        Provider::Gemini => DEFAULT_GEMINI_MODEL,
        Provider::Ollama => DEFAULT_OLLAMA_MODEL,
        Provider::Mock => "mock",
    }
}
