//! Frame sources feeding landmark frames into a session.
//!
//! The pose model runs out of process and writes one JSON document per
//! frame. Each line is either a bare landmark array or an object:
//!
//! ```json
//! [{"x": 0.5, "y": 0.2, "z": -0.1, "visibility": 0.98}, [0.48, 0.3, 0.0, 0.9]]
//! {"landmarks": [...], "timestamp_ms": 1718000000123}
//! ```
//!
//! An empty array, `null` or `{"landmarks": null}` means no person was
//! detected in that frame.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use workout_core::{Error, Landmark, Result, Timestamp};

/// One decoded frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Position of the frame in the stream, starting at 1
    pub sequence: u64,
    pub landmarks: Vec<Landmark>,
    /// Capture time reported by the producer, if any
    pub timestamp: Option<Timestamp>,
}

/// Trait for landmark frame backends
#[async_trait]
pub trait FrameSource: Send {
    /// Prepare the source; failure here ends the session
    async fn open(&mut self) -> Result<()>;

    /// Next frame, `Ok(None)` once the stream is exhausted.
    ///
    /// Decode failures are returned as non-fatal errors and the source
    /// stays usable for the following frame. Read failures are fatal.
    async fn next_frame(&mut self) -> Result<Option<FrameRecord>>;

    /// Release the source
    async fn close(&mut self) -> Result<()>;

    /// Human-readable origin for logs
    fn describe(&self) -> String;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireLandmark {
    Object(Landmark),
    Array(Vec<f64>),
}

impl WireLandmark {
    fn into_landmark(self, index: usize) -> Result<Landmark> {
        match self {
            WireLandmark::Object(landmark) => Ok(landmark),
            WireLandmark::Array(values) => match values.as_slice() {
                [x, y] => Ok(Landmark::new(*x, *y, 0.0, 0.0)),
                [x, y, z] => Ok(Landmark::new(*x, *y, *z, 0.0)),
                [x, y, z, visibility] => Ok(Landmark::new(*x, *y, *z, *visibility)),
                _ => Err(Error::FrameDecode(format!(
                    "landmark {} has {} values, expected 2 to 4",
                    index,
                    values.len()
                ))),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireFrame {
    Bare(Vec<WireLandmark>),
    Object {
        landmarks: Option<Vec<WireLandmark>>,
        #[serde(default)]
        timestamp_ms: Option<i64>,
    },
    Null,
}

/// Decode one line of the landmark stream
pub fn decode_frame(line: &str, sequence: u64) -> Result<FrameRecord> {
    let wire: WireFrame = serde_json::from_str(line)
        .map_err(|e| Error::FrameDecode(format!("frame {}: {}", sequence, e)))?;

    let (wire_landmarks, timestamp) = match wire {
        WireFrame::Bare(landmarks) => (landmarks, None),
        WireFrame::Object {
            landmarks,
            timestamp_ms,
        } => (landmarks.unwrap_or_default(), timestamp_ms.map(Timestamp::from_millis)),
        WireFrame::Null => (Vec::new(), None),
    };

    let landmarks = wire_landmarks
        .into_iter()
        .enumerate()
        .map(|(i, l)| l.into_landmark(i))
        .collect::<Result<Vec<_>>>()
        .map_err(|e| Error::FrameDecode(format!("frame {}: {}", sequence, e)))?;

    Ok(FrameRecord {
        sequence,
        landmarks,
        timestamp,
    })
}

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;

enum Input {
    Path(PathBuf),
    Stdin,
    Reader(Option<BoxedReader>),
}

/// Landmark frames read as JSON lines from a file, stdin or any reader
pub struct JsonLinesSource {
    input: Input,
    camera_index: u32,
    lines: Option<Lines<BufReader<BoxedReader>>>,
    sequence: u64,
}

impl JsonLinesSource {
    /// Read from `path`, or stdin when `None`
    pub fn new(path: Option<PathBuf>, camera_index: u32) -> Self {
        let input = match path {
            Some(path) => Input::Path(path),
            None => Input::Stdin,
        };
        Self {
            input,
            camera_index,
            lines: None,
            sequence: 0,
        }
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            input: Input::Reader(Some(Box::new(reader))),
            camera_index: 0,
            lines: None,
            sequence: 0,
        }
    }

    /// Frames decoded so far, including rejected ones
    pub fn frames_read(&self) -> u64 {
        self.sequence
    }
}

#[async_trait]
impl FrameSource for JsonLinesSource {
    async fn open(&mut self) -> Result<()> {
        if self.lines.is_some() {
            return Ok(());
        }

        let reader: BoxedReader = match &mut self.input {
            Input::Path(path) => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    Error::SourceUnavailable(format!("{}: {}", path.display(), e))
                })?;
                Box::new(file)
            }
            Input::Stdin => Box::new(tokio::io::stdin()),
            Input::Reader(reader) => reader
                .take()
                .ok_or_else(|| Error::SourceUnavailable("reader already consumed".into()))?,
        };

        self.lines = Some(BufReader::new(reader).lines());
        tracing::debug!(source = %self.describe(), "Frame source opened");
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<FrameRecord>> {
        let lines = self
            .lines
            .as_mut()
            .ok_or_else(|| Error::Source("source not opened".into()))?;

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                // The offending line is consumed, so the stream stays usable
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    self.sequence += 1;
                    return Err(Error::FrameDecode(format!("frame {}: {}", self.sequence, e)));
                }
                Err(e) => return Err(e.into()),
            };
            if line.trim().is_empty() {
                continue;
            }
            self.sequence += 1;
            return decode_frame(&line, self.sequence).map(Some);
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.lines = None;
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.input {
            Input::Path(path) => format!("camera {} via {}", self.camera_index, path.display()),
            Input::Stdin => format!("camera {} via stdin", self.camera_index),
            Input::Reader(_) => "in-memory reader".to_string(),
        }
    }
}

/// Replays a fixed list of frames
pub struct ReplaySource {
    frames: VecDeque<Vec<Landmark>>,
    opened: bool,
    sequence: u64,
}

impl ReplaySource {
    pub fn new(frames: Vec<Vec<Landmark>>) -> Self {
        Self {
            frames: frames.into(),
            opened: false,
            sequence: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl FrameSource for ReplaySource {
    async fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<FrameRecord>> {
        if !self.opened {
            return Err(Error::Source("source not opened".into()));
        }
        Ok(self.frames.pop_front().map(|landmarks| {
            self.sequence += 1;
            FrameRecord {
                sequence: self.sequence,
                landmarks,
                timestamp: None,
            }
        }))
    }

    async fn close(&mut self) -> Result<()> {
        self.opened = false;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("replay of {} frames", self.frames.len())
    }
}
