/*
[INPUT]:  Stream base URL and a symbol/interval subscription target
[OUTPUT]: A connected StreamSession or a ConnectionError
[POS]:    WebSocket layer - endpoint construction and handshake
[UPDATE]: When adding connection options or changing endpoint layout
*/

use tokio_tungstenite::connect_async;
use tracing::{debug, info};
use url::Url;

use super::session::{self, StreamSession};
use crate::error::{Result, StreamError};
use crate::types::SubscriptionTarget;

/// Public Binance spot stream endpoint
pub const DEFAULT_BASE_URL: &str = "wss://stream.binance.com:9443";

/// WebSocket stream configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub base_url: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Kline stream client
#[derive(Debug, Clone, Default)]
pub struct KlineWebSocket {
    config: StreamConfig,
}

impl KlineWebSocket {
    /// Create a client for the public endpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client with custom configuration
    pub fn with_config(config: StreamConfig) -> Self {
        Self { config }
    }

    /// Full endpoint URL for a target: base address followed by the stream path
    pub fn endpoint(&self, target: &SubscriptionTarget) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let url = Url::parse(&format!("{}{}", base, target.stream_path()))?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(StreamError::Config(format!(
                "unsupported stream scheme '{other}', expected ws or wss"
            ))),
        }
    }

    /// Connect to the kline stream for `target` and start decoding.
    ///
    /// Fails without starting anything if the handshake does not succeed.
    /// No retry is attempted.
    pub async fn open(&self, target: &SubscriptionTarget) -> Result<StreamSession> {
        let url = self.endpoint(target)?;
        ensure_crypto_provider();

        info!(url = %url, "connecting to kline stream");
        let (ws, response) = connect_async(url.as_str())
            .await
            .map_err(|err| StreamError::connection(url.as_str(), err))?;
        info!(url = %url, status = %response.status(), "connected to kline stream");

        Ok(session::spawn(ws, url.to_string()))
    }
}

fn ensure_crypto_provider() {
    // Fails only when a provider is already installed.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}
