use thiserror::Error as ThisError;

/// Failures talking to the exchange. These never reach a caller directly:
/// each gateway operation turns them into its fallback value, except for the
/// listing scan which feeds symbol resolution.
#[derive(ThisError, Debug)]
pub enum UpstreamError {
    #[error("HTTP error on {endpoint}: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Undecodable body from {endpoint}: {reason}")]
    Decode { endpoint: &'static str, reason: String },

    #[error("Unexpected response shape from {endpoint}: {reason}")]
    Shape { endpoint: &'static str, reason: String },
}

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Upstream failure: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Symbol {0} not found on CSE")]
    SymbolNotFound(String),

    #[error("Missing required argument '{argument}' for {tool}")]
    MissingArgument {
        tool: &'static str,
        argument: &'static str,
    },

    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for BridgeError {
    fn from(err: config::ConfigError) -> Self {
        BridgeError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
