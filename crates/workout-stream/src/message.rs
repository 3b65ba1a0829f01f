//! Outbound message envelope and sinks.
//!
//! Every message is one JSON line: `{"type": "VIDEO_FRAME", "payload": {...}}`
//! for a processed frame or `{"type": "ERROR", "payload": {"message": "..."}}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use workout_core::Result;
use workout_tracker::FrameReport;

/// Payload of an `ERROR` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Envelope {
    VideoFrame(FrameReport),
    Error(ErrorPayload),
}

impl Envelope {
    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error(ErrorPayload {
            message: message.into(),
        })
    }

    pub fn to_json_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Destination for published messages
#[async_trait]
pub trait FrameSink: Send {
    async fn publish(&mut self, envelope: &Envelope) -> Result<()>;
}

/// Writes one JSON line per message and flushes after each
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> FrameSink for JsonLinesSink<W> {
    async fn publish(&mut self, envelope: &Envelope) -> Result<()> {
        let line = envelope.to_json_line()?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Keeps every published message in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub envelopes: Vec<Envelope>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame reports in publication order, skipping errors
    pub fn reports(&self) -> impl Iterator<Item = &FrameReport> {
        self.envelopes.iter().filter_map(|e| match e {
            Envelope::VideoFrame(report) => Some(report),
            Envelope::Error(_) => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.envelopes.iter().filter_map(|e| match e {
            Envelope::Error(payload) => Some(payload.message.as_str()),
            Envelope::VideoFrame(_) => None,
        })
    }
}

#[async_trait]
impl FrameSink for CollectingSink {
    async fn publish(&mut self, envelope: &Envelope) -> Result<()> {
        self.envelopes.push(envelope.clone());
        Ok(())
    }
}
