/*
[INPUT]:  An established WebSocket connection to one kline stream
[OUTPUT]: Message, error and stop-control flows backed by a single decode task
[POS]:    WebSocket layer - session lifetime and shutdown coordination
[UPDATE]: When changing flow semantics, decode loop or shutdown path
*/

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::message::{Frame, decode_frame};
use crate::error::StreamError;
use crate::types::KlineEvent;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// A live kline stream.
///
/// Split it with [`StreamSession::into_parts`] to drive it.
#[derive(Debug)]
pub struct StreamSession {
    url: String,
    messages: MessageSource,
    errors: ErrorSource,
    stop: StopControl,
}

impl StreamSession {
    /// Endpoint the session is connected to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Handle that requests a stop from outside whoever drives the flows
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.stop.token.clone(),
        }
    }

    pub fn into_parts(self) -> (MessageSource, ErrorSource, StopControl) {
        (self.messages, self.errors, self.stop)
    }
}

/// Decoded events in receipt order.
///
/// Yields `None` once the decode task has ended or a stop was requested.
/// An event already handed off but not yet received is dropped on stop.
#[derive(Debug)]
pub struct MessageSource {
    rx: mpsc::Receiver<KlineEvent>,
    stop: CancellationToken,
}

impl MessageSource {
    pub async fn recv(&mut self) -> Option<KlineEvent> {
        if self.stop.is_cancelled() {
            return None;
        }
        let event = self.rx.recv().await?;
        (!self.stop.is_cancelled()).then_some(event)
    }
}

impl Stream for MessageSource {
    type Item = KlineEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.stop.is_cancelled() {
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(_)) if self.stop.is_cancelled() => Poll::Ready(None),
            other => other,
        }
    }
}

/// The error that ended the session, if it ended on one.
#[derive(Debug)]
pub struct ErrorSource {
    rx: Option<oneshot::Receiver<StreamError>>,
}

impl ErrorSource {
    /// Wait for the session-ending error.
    ///
    /// Resolves with `Some` at most once. Resolves with `None` when the decode
    /// task stopped without an error, and on every call after the first
    /// resolution. Cancel safe.
    pub async fn recv(&mut self) -> Option<StreamError> {
        let rx = self.rx.as_mut()?;
        let result = rx.await;
        self.rx = None;
        result.ok()
    }

    /// True once `recv` has resolved
    pub fn is_terminated(&self) -> bool {
        self.rx.is_none()
    }
}

/// Stop request plus shutdown acknowledgment.
///
/// The acknowledgment is a single buffered slot filled by the decode task's
/// shutdown path, so it is observable even if the task exited before the
/// request was made. Dropping the control requests a stop without waiting.
#[derive(Debug)]
pub struct StopControl {
    token: CancellationToken,
    ack: oneshot::Receiver<()>,
}

impl StopControl {
    /// Ask the decode task to shut down. Idempotent.
    pub fn request(&self) {
        self.token.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the connection is closed and no further events will be
    /// produced.
    pub async fn closed(mut self) {
        if (&mut self.ack).await.is_err() {
            warn!("decode task ended without acknowledging shutdown");
        }
    }

    /// Request a stop and wait for the acknowledgment
    pub async fn stop(self) {
        self.request();
        self.closed().await;
    }
}

impl Drop for StopControl {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Clonable stop request without the acknowledgment
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn request(&self) {
        self.token.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
enum LoopExit {
    Stopped,
    Failed(StreamError),
    ConsumerGone,
}

/// Sole owner of the connection for the lifetime of the session
struct DecodeTask {
    ws: WsStream,
    url: String,
    message_tx: mpsc::Sender<KlineEvent>,
    stop: CancellationToken,
}

/// Hand the connection to a new decode task and return the caller's flows
pub(crate) fn spawn(ws: WsStream, url: String) -> StreamSession {
    // Capacity 1 is the closest tokio gets to a rendezvous handoff.
    let (message_tx, message_rx) = mpsc::channel(1);
    let (error_tx, error_rx) = oneshot::channel();
    let (ack_tx, ack_rx) = oneshot::channel();
    let token = CancellationToken::new();

    let task = DecodeTask {
        ws,
        url: url.clone(),
        message_tx,
        stop: token.clone(),
    };
    tokio::spawn(task.run(error_tx, ack_tx));

    StreamSession {
        url,
        messages: MessageSource {
            rx: message_rx,
            stop: token.clone(),
        },
        errors: ErrorSource { rx: Some(error_rx) },
        stop: StopControl { token, ack: ack_rx },
    }
}

impl DecodeTask {
    async fn run(mut self, error_tx: oneshot::Sender<StreamError>, ack_tx: oneshot::Sender<()>) {
        match self.read_loop().await {
            LoopExit::Stopped => {
                info!(url = %self.url, "kline stream stop requested");
            }
            LoopExit::ConsumerGone => {
                debug!(url = %self.url, "kline stream consumer dropped");
            }
            LoopExit::Failed(err) => {
                warn!(url = %self.url, error = %err, "kline stream failed");
                // Nobody listening is not an error.
                let _ = error_tx.send(err);
            }
        }

        self.shutdown(ack_tx).await;
    }

    async fn read_loop(&mut self) -> LoopExit {
        loop {
            let incoming = tokio::select! {
                biased;
                _ = self.stop.cancelled() => return LoopExit::Stopped,
                incoming = self.ws.next() => incoming,
            };

            let event = match incoming {
                Some(Ok(message)) => match decode_frame(message) {
                    Ok(Frame::Event(event)) => event,
                    Ok(Frame::Skip) => continue,
                    Err(err) => return LoopExit::Failed(err),
                },
                Some(Err(err)) => return LoopExit::Failed(err.into()),
                None => {
                    return LoopExit::Failed(StreamError::Transport(
                        "connection closed".to_string(),
                    ));
                }
            };

            // An event still waiting for the consumer is discarded on stop.
            tokio::select! {
                biased;
                _ = self.stop.cancelled() => return LoopExit::Stopped,
                sent = self.message_tx.send(event) => {
                    if sent.is_err() {
                        return LoopExit::ConsumerGone;
                    }
                }
            }
        }
    }

    async fn shutdown(self, ack_tx: oneshot::Sender<()>) {
        let DecodeTask {
            mut ws,
            url,
            message_tx,
            ..
        } = self;
        drop(message_tx);

        match tokio::time::timeout(CLOSE_TIMEOUT, ws.close(None)).await {
            Ok(Ok(())) => debug!(url = %url, "kline stream connection closed"),
            Ok(Err(err)) => debug!(url = %url, error = %err, "kline stream close returned error"),
            Err(_) => warn!(url = %url, "kline stream close timed out"),
        }
        drop(ws);

        let _ = ack_tx.send(());
    }
}
