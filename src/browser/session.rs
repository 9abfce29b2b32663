use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::browser::dom_model::{BrowserOptions, PageSnapshot};
use crate::browser::error::BrowserError;

/// Request sent to browser_server.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Wait {
        cmd: &'static str,
        duration_ms: u64,
    },
    QueryElements {
        cmd: &'static str,
        max_links: usize,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn wait(duration_ms: u64) -> Self {
        BrowserRequest::Wait {
            cmd: "wait",
            duration_ms,
        }
    }

    pub fn query_elements(max_links: usize) -> Self {
        BrowserRequest::QueryElements {
            cmd: "query_elements",
            max_links,
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response received from browser_server.js over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// A headless Chromium session owned by a browser_server.js child process.
///
/// Commands are NDJSON over stdin, responses NDJSON over stdout. The process
/// is told to quit and reaped on `Drop`, so a session never outlives the
/// scope that launched it.
pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    closed: bool,
}

impl BrowserSession {
    /// Spawn browser_server.js and wait for its ready signal.
    pub fn launch(options: &BrowserOptions) -> Result<Self, BrowserError> {
        let script = options.script.display().to_string();
        let mut child = Command::new(&options.node_binary)
            .arg(&options.script)
            .arg(format!("--width={}", options.viewport_width))
            .arg(format!("--height={}", options.viewport_height))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BrowserError::SubprocessSpawn {
                script: script.clone(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            BrowserError::SessionIO(format!("failed to capture stdin of {}", script))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            BrowserError::SessionIO(format!("failed to capture stdout of {}", script))
        })?;

        if let Some(stderr) = child.stderr.take() {
            std::thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    debug!(target: "browser_server", "{}", line);
                }
            });
        }

        let mut session = BrowserSession {
            child,
            stdin,
            reader: BufReader::new(stdout),
            closed: false,
        };

        // Any early return from here on still reaps the child via Drop.
        let response = session.read_response("ready signal")?;
        if !response.ok || response.ready != Some(true) {
            return Err(BrowserError::SessionProtocol {
                command: "launch".into(),
                error: response
                    .error
                    .unwrap_or_else(|| "did not receive ready signal".into()),
            });
        }

        Ok(session)
    }

    fn read_response(&mut self, context: &str) -> Result<BrowserResponse, BrowserError> {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| BrowserError::SessionIO(format!("failed to read {}: {}", context, e)))?;

        if line.trim().is_empty() {
            return Err(BrowserError::SessionIO(format!(
                "empty {} from browser server (process may have died)",
                context
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| BrowserError::JsonParse {
            context: context.into(),
            source: e,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, BrowserError> {
        let json = serde_json::to_string(request).map_err(|e| BrowserError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| BrowserError::SessionIO(format!("failed to write command: {}", e)))?;

        self.read_response("response")
    }

    /// Send a request and verify it succeeded.
    fn send_ok(
        &mut self,
        request: &BrowserRequest,
        command_name: &str,
    ) -> Result<BrowserResponse, BrowserError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(BrowserError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    pub fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.send_ok(&BrowserRequest::navigate(url), "navigate")?;
        Ok(())
    }

    /// Let dynamic content render before querying.
    pub fn wait_idle(&mut self, ms: u64) -> Result<(), BrowserError> {
        self.send_ok(&BrowserRequest::wait(ms), "wait")?;
        Ok(())
    }

    pub fn query_elements(&mut self, max_links: usize) -> Result<PageSnapshot, BrowserError> {
        let response = self.send_ok(&BrowserRequest::query_elements(max_links), "query_elements")?;
        let data = response.data.ok_or_else(|| BrowserError::SessionProtocol {
            command: "query_elements".into(),
            error: "no data in response".into(),
        })?;
        serde_json::from_value(data).map_err(|e| BrowserError::JsonParse {
            context: "query_elements data".into(),
            source: e,
        })
    }

    /// Quit the browser. Safe to call more than once.
    pub fn quit(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Best-effort: the process may already be gone
        if self.send(&BrowserRequest::quit()).is_err() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.quit();
    }
}

// ============================================================================
// BrowserDriver: given a URL, return its interactive elements
// ============================================================================

pub trait BrowserDriver: Send + Sync {
    fn snapshot(&self, url: &str) -> Result<PageSnapshot, BrowserError>;
}

/// Drives a fresh Playwright session per snapshot.
pub struct PlaywrightDriver {
    pub options: BrowserOptions,
}

impl PlaywrightDriver {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

impl BrowserDriver for PlaywrightDriver {
    fn snapshot(&self, url: &str) -> Result<PageSnapshot, BrowserError> {
        let mut session = BrowserSession::launch(&self.options)?;
        session.navigate(url)?;
        session.wait_idle(self.options.settle_delay.as_millis() as u64)?;
        session.query_elements(self.options.max_links)
    }
}
