/*
[INPUT]:  Kline stream schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - subscription target and decoded stream events
[UPDATE]: When stream schema changes or new types added
*/

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamError};

/// Symbol/interval pair identifying one kline stream.
///
/// Both values are passed to the endpoint verbatim; the remote side rejects
/// unknown pairs during the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionTarget {
    symbol: String,
    interval: String,
}

impl SubscriptionTarget {
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>) -> Result<Self> {
        let symbol = symbol.into();
        let interval = interval.into();
        if symbol.is_empty() {
            return Err(StreamError::Config("symbol must not be empty".to_string()));
        }
        if interval.is_empty() {
            return Err(StreamError::Config("interval must not be empty".to_string()));
        }
        Ok(Self { symbol, interval })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }

    /// Path appended to the stream base address
    pub fn stream_path(&self) -> String {
        format!("/ws/{}@kline_{}", self.symbol, self.interval)
    }
}

impl fmt::Display for SubscriptionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@kline_{}", self.symbol, self.interval)
    }
}

/// One kline update as pushed by the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    /// Epoch milliseconds
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: Kline,
}

impl KlineEvent {
    pub fn event_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.event_time)
    }
}

impl fmt::Display for KlineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self
            .event_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| self.event_time.to_string());
        write!(f, "{} {} {} {}", time, self.event_type, self.symbol, self.kline)
    }
}

/// Candlestick payload of a [`KlineEvent`].
///
/// Prices and volumes are the exact decimal strings from the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    #[serde(rename = "t")]
    pub start_time: i64,
    #[serde(rename = "T")]
    pub end_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "f")]
    pub first_trade_id: i64,
    #[serde(rename = "L")]
    pub last_trade_id: i64,
    #[serde(rename = "o")]
    pub open: String,
    #[serde(rename = "c")]
    pub close: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "v")]
    pub volume: String,
    #[serde(rename = "n")]
    pub trade_count: i64,
    /// Set on the last update of a candle
    #[serde(rename = "x")]
    pub is_final: bool,
    #[serde(rename = "q")]
    pub quote_volume: String,
    #[serde(rename = "V")]
    pub active_buy_volume: String,
    #[serde(rename = "Q")]
    pub active_buy_quote_volume: String,
}

impl Kline {
    /// Open price as a `Decimal`, `None` when it is not representable exactly
    pub fn open_decimal(&self) -> Option<Decimal> {
        parse_decimal(&self.open)
    }

    /// Close price as a `Decimal`, `None` when it is not representable exactly
    pub fn close_decimal(&self) -> Option<Decimal> {
        parse_decimal(&self.close)
    }

    pub fn change(&self) -> Option<Decimal> {
        self.close_decimal()?.checked_sub(self.open_decimal()?)
    }

    /// Close-over-open change in percent, `None` when the candle opened at zero
    pub fn change_percent(&self) -> Option<Decimal> {
        self.change()?
            .checked_mul(Decimal::ONE_HUNDRED)?
            .checked_div(self.open_decimal()?)
    }
}

// Decimal holds 28 fractional digits; anything finer is refused, not rounded.
fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str_exact(value).ok()
}

impl fmt::Display for Kline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] o={} h={} l={} c={} v={} n={}",
            self.interval, self.open, self.high, self.low, self.close, self.volume, self.trade_count
        )?;
        if let Some(mut percent) = self.change_percent().map(|p| p.round_dp(2)) {
            percent.rescale(2);
            write!(f, " chg={percent}%")?;
        }
        if self.is_final {
            write!(f, " final")?;
        }
        Ok(())
    }
}
