/*
[INPUT]:  Decoded kline events from the session driver
[OUTPUT]: One line per event on a writer (stdout in the binary)
[POS]:    Output layer - event rendering
[UPDATE]: When adding output formats or changing line layout
*/

use std::io::{self, Write};

use binance_wss_adapter::KlineEvent;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Receives every event the driver reads from the stream
pub trait EventSink {
    fn emit(&mut self, event: &KlineEvent) -> io::Result<()>;
}

/// Event line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary line
    #[default]
    Text,
    /// Raw event as a JSON object with the stream's field keys
    Json,
}

impl OutputFormat {
    pub fn sink<W>(self, writer: W) -> Box<dyn EventSink>
    where
        W: Write + 'static,
    {
        match self {
            OutputFormat::Text => Box::new(TextSink::new(writer)),
            OutputFormat::Json => Box::new(JsonSink::new(writer)),
        }
    }
}

#[derive(Debug)]
pub struct TextSink<W> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for TextSink<W> {
    fn emit(&mut self, event: &KlineEvent) -> io::Result<()> {
        writeln!(self.writer, "{event}")?;
        self.writer.flush()
    }
}

#[derive(Debug)]
pub struct JsonSink<W> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonSink<W> {
    fn emit(&mut self, event: &KlineEvent) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
