/*
[INPUT]:  Stream configuration and subscription target
[OUTPUT]: Live kline sessions exposed as message/error/stop flows
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When changing connection logic or flow semantics
*/

pub mod client;
pub mod message;
pub mod session;

pub use client::{DEFAULT_BASE_URL, KlineWebSocket, StreamConfig};
pub use message::decode_event;
pub use session::{ErrorSource, MessageSource, StopControl, StopHandle, StreamSession};
