/*
[INPUT]:  Raw WebSocket frames
[OUTPUT]: Decoded KlineEvent values or session-ending errors
[POS]:    WebSocket layer - frame classification and JSON decoding
[UPDATE]: When adding new frame handling or changing payload format
*/

use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::error::{Result, StreamError};
use crate::types::KlineEvent;

/// What the decode loop should do with one inbound frame
#[derive(Debug)]
pub(crate) enum Frame {
    Event(KlineEvent),
    /// Control frame handled by the transport itself
    Skip,
}

/// Classify and decode a single frame.
///
/// A close frame is reported as a transport error: the stream has no
/// orderly end from the remote side.
pub(crate) fn decode_frame(message: WsMessage) -> Result<Frame> {
    match message {
        WsMessage::Text(text) => decode_event(text.as_bytes()).map(Frame::Event),
        WsMessage::Binary(bytes) => decode_event(&bytes).map(Frame::Event),
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => Ok(Frame::Skip),
        WsMessage::Close(frame) => {
            let reason = match frame {
                Some(frame) => format!(
                    "connection closed by peer ({} {})",
                    u16::from(frame.code),
                    frame.reason
                ),
                None => "connection closed by peer".to_string(),
            };
            Err(StreamError::Transport(reason))
        }
    }
}

/// Decode a JSON payload as a kline event
pub fn decode_event(payload: &[u8]) -> Result<KlineEvent> {
    Ok(serde_json::from_slice(payload)?)
}
