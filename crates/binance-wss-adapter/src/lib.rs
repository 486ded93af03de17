/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Binance kline stream adapter surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

mod error;
pub mod types;
pub mod ws;

pub use error::{Result, StreamError};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    DEFAULT_BASE_URL,
    ErrorSource,
    KlineWebSocket,
    MessageSource,
    StopControl,
    StopHandle,
    StreamConfig,
    StreamSession,
    decode_event,
};
