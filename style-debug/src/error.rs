use thiserror::Error;

/// Errors produced while building or injecting debug style blocks.
#[derive(Debug, Error)]
pub enum DebugError {
    /// The source map could not be serialized or parsed as JSON.
    #[error("source map json: {0}")]
    Json(#[from] serde_json::Error),
    /// A base64 payload in a `sourceMappingURL` comment was malformed.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The `sourcemap` crate rejected a map while writing or parsing it.
    #[error("source map: {0}")]
    SourceMap(#[from] sourcemap::Error),
    /// A `sourceMappingURL` comment or data URL was malformed.
    #[error("malformed inline source map: {0}")]
    InlineMap(String),
    /// The style sink refused the block.
    #[error("failed to inject style block: {0}")]
    Inject(String),
    /// A required host capability (window, document) is missing.
    #[error("host environment: {0}")]
    Host(String),
    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Reasons a stack trace could not be turned into frames. These never
/// leave the annotation path; they are logged and the entry is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The resolver produced no usable frames.
    #[error("no frames could be resolved")]
    NoFrames,
    /// The resolver backend reported a failure (network, parse, ...).
    #[error("{0}")]
    Backend(String),
    /// The resolution was abandoned before it completed.
    #[error("resolution cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DebugError>;

/// Shorthand constructors.
impl DebugError {
    pub fn inline_map(message: &str) -> Self {
        Self::InlineMap(message.to_string())
    }

    pub fn inject(message: impl Into<String>) -> Self {
        Self::Inject(message.into())
    }
}

impl TraceError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}
