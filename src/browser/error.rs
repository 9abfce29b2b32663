use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// Node.js browser server failed to spawn
    #[error("failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the browser server failed
    #[error("browser session I/O: {0}")]
    SessionIO(String),

    /// Browser server answered a command with ok=false, or an unexpected shape
    #[error("browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
