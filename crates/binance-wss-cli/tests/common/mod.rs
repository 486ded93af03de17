/*
[INPUT]:  Driver and binary test scenarios
[OUTPUT]: Mock kline stream server, recording sinks and frame fixtures
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for binance-wss-cli tests

#![allow(dead_code)]

use std::io;
use std::time::Duration;

use binance_wss_adapter::{
    KlineEvent, KlineWebSocket, StreamConfig, StreamSession, SubscriptionTarget,
};
use binance_wss_cli::EventSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What the mock server does after sending its frames
#[derive(Debug, Clone, Copy)]
pub enum Then {
    Close,
    Hold,
}

/// Serve one client: send `frames`, then close or hold.
///
/// The returned receiver reports whether the client sent a close frame.
pub async fn spawn_stream_server(
    frames: Vec<Message>,
    then: Then,
) -> (String, oneshot::Receiver<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept client");
        let mut ws = accept_async(stream).await.expect("websocket handshake");
        for frame in frames {
            if ws.send(frame).await.is_err() {
                let _ = closed_tx.send(false);
                return;
            }
        }
        if let Then::Close = then {
            let _ = ws.close(None).await;
            let _ = closed_tx.send(false);
            return;
        }
        let mut client_closed = false;
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                client_closed = true;
                break;
            }
        }
        let _ = closed_tx.send(client_closed);
    });

    (format!("ws://{addr}"), closed_rx)
}

pub async fn open_session(base_url: String) -> StreamSession {
    let target = SubscriptionTarget::new("btcusdt", "1m").expect("valid target");
    KlineWebSocket::with_config(StreamConfig { base_url })
        .open(&target)
        .await
        .expect("open session")
}

pub fn kline_frame(seq: i64) -> Message {
    let payload = json!({
        "e": "kline",
        "E": 1_700_000_000_000_i64 + seq,
        "s": "BTCUSDT",
        "k": {
            "t": 1_700_000_000_000_i64,
            "T": 1_700_000_059_999_i64,
            "s": "BTCUSDT",
            "i": "1m",
            "f": seq,
            "L": seq,
            "o": "37000.00",
            "c": "37010.50",
            "h": "37020.00",
            "l": "36990.00",
            "v": "12.345",
            "n": 42,
            "x": false,
            "q": "456789.01",
            "V": "6.1",
            "Q": "225000.00"
        }
    });
    Message::Text(payload.to_string().into())
}

/// Records event sequence numbers and fires `reached` once `notify_at` events arrived
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub seen: Vec<i64>,
    notify_at: usize,
    reached: Option<oneshot::Sender<()>>,
}

impl RecordingSink {
    pub fn notify_after(count: usize) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            seen: Vec::new(),
            notify_at: count,
            reached: Some(tx),
        };
        (sink, rx)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &KlineEvent) -> io::Result<()> {
        self.seen.push(event.event_time - 1_700_000_000_000);
        if self.seen.len() >= self.notify_at {
            if let Some(tx) = self.reached.take() {
                let _ = tx.send(());
            }
        }
        Ok(())
    }
}

/// Rejects every event like a closed stdout pipe
#[derive(Debug, Default)]
pub struct BrokenPipeSink;

impl EventSink for BrokenPipeSink {
    fn emit(&mut self, _event: &KlineEvent) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }
}
