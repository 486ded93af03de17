/*
[INPUT]:  Error sources (handshake, frame decoding, transport, URL building)
[OUTPUT]: Structured error types with the attempted endpoint as context
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Main error type for the kline stream adapter
#[derive(Error, Debug)]
pub enum StreamError {
    /// Handshake or dial failed; no session was created
    #[error("failed to connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// Inbound frame did not decode as a kline event
    #[error("failed to decode kline event: {0}")]
    Decode(#[from] serde_json::Error),

    /// Connection dropped, reset or closed during the session
    #[error("websocket transport error: {0}")]
    Transport(String),

    /// Base URL or stream path did not form a valid URL
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid local input
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StreamError {
    /// Build a connection error for the attempted endpoint
    pub fn connection(url: impl Into<String>, source: tungstenite::Error) -> Self {
        StreamError::Connection {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Check if the error happened while opening the session
    pub fn is_connection_error(&self) -> bool {
        matches!(self, StreamError::Connection { .. })
    }

    /// Check if the error ended a session that was already running
    pub fn is_session_error(&self) -> bool {
        matches!(self, StreamError::Decode(_) | StreamError::Transport(_))
    }
}

impl From<tungstenite::Error> for StreamError {
    fn from(err: tungstenite::Error) -> Self {
        StreamError::Transport(err.to_string())
    }
}

/// Result type alias for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;
