/*
[INPUT]:  Test scenarios needing a stream endpoint
[OUTPUT]: In-process mock WebSocket servers and kline frame fixtures
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for binance-wss-adapter tests

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use binance_wss_adapter::{KlineWebSocket, StreamConfig, SubscriptionTarget};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

/// Upper bound for any single wait in a test
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Accept one WebSocket client on a random local port and hand it to `handler`.
///
/// Returns the base URL to configure the client with.
pub async fn spawn_ws_server<F, Fut>(handler: F) -> String
where
    F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept client");
        let ws = accept_async(stream).await.expect("websocket handshake");
        handler(ws).await;
    });
    format!("ws://{addr}")
}

/// Send `frames`, then close the connection from the server side
pub async fn spawn_sending_then_closing(frames: Vec<Message>) -> String {
    spawn_ws_server(|mut ws| async move {
        for frame in frames {
            if ws.send(frame).await.is_err() {
                return;
            }
        }
        let _ = ws.close(None).await;
    })
    .await
}

/// Send `frames`, then keep the connection open until the client leaves
pub async fn spawn_sending_then_holding(frames: Vec<Message>) -> String {
    spawn_ws_server(|mut ws| async move {
        for frame in frames {
            if ws.send(frame).await.is_err() {
                return;
            }
        }
        hold_until_client_leaves(ws).await;
    })
    .await
}

pub async fn hold_until_client_leaves(mut ws: WebSocketStream<TcpStream>) {
    while let Some(Ok(message)) = ws.next().await {
        if message.is_close() {
            break;
        }
    }
}

/// Answer the upgrade request with a plain HTTP error status
pub async fn spawn_rejecting_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let addr = listener.local_addr().expect("mock server address");
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept client");
        let mut buf = vec![0u8; 4096];
        let mut read = 0;
        while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") && read < buf.len() {
            match stream.read(&mut buf[read..]).await {
                Ok(0) | Err(_) => break,
                Ok(n) => read += n,
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    });
    format!("ws://{addr}")
}

/// Base URL of a local port nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("ws://{addr}")
}

pub fn client_for(base_url: String) -> KlineWebSocket {
    KlineWebSocket::with_config(StreamConfig { base_url })
}

pub fn btcusdt_1m() -> SubscriptionTarget {
    SubscriptionTarget::new("btcusdt", "1m").expect("valid target")
}

/// A well-formed kline event payload; `seq` goes into the event time and trade ids
pub fn kline_payload(seq: i64) -> serde_json::Value {
    json!({
        "e": "kline",
        "E": 1_700_000_000_000_i64 + seq,
        "s": "BTCUSDT",
        "k": {
            "t": 1_700_000_000_000_i64,
            "T": 1_700_000_059_999_i64,
            "s": "BTCUSDT",
            "i": "1m",
            "f": 100 + seq,
            "L": 200 + seq,
            "o": "0.0010",
            "c": "0.0020",
            "h": "0.0025",
            "l": "0.0015",
            "v": "1000",
            "n": 100,
            "x": false,
            "q": "1.0000",
            "V": "500",
            "Q": "0.500",
            "B": "123456"
        }
    })
}

pub fn kline_frame(seq: i64) -> Message {
    Message::Text(kline_payload(seq).to_string().into())
}
