//! Frame-synchronous session runner.
//!
//! Pulls frames from a [`FrameSource`], runs each through the
//! [`ExercisePredictor`] and publishes the resulting report before the next
//! frame is read. Undecodable frames are reported and skipped; only a source
//! that cannot be opened or stops being available ends the session early.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::Instrument;

use workout_core::{ExerciseKind, Result, SessionId, Timestamp};
use workout_tracker::{ExercisePredictor, PredictorConfig, SessionStats};

use crate::config::SessionConfig;
use crate::message::{Envelope, FrameSink};
use crate::source::{FrameRecord, FrameSource};

/// Outcome of a completed session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub frames_processed: u64,
    pub frames_rejected: u64,
    pub rep_count: u32,
    pub final_label: String,
    pub stats: SessionStats,
    pub completed_exercises: Vec<ExerciseKind>,
}

/// Drives one predictor over one frame stream
pub struct SessionRunner {
    session_id: SessionId,
    predictor: ExercisePredictor,
    frame_interval: Duration,
    frames_processed: u64,
    frames_rejected: u64,
    started: Option<Instant>,
    first_timestamp: Option<Timestamp>,
    elapsed_secs: f64,
}

impl SessionRunner {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        Ok(Self::with_predictor(
            config.predictor_config()?,
            config.frame_interval(),
        ))
    }

    pub fn with_predictor(predictor_config: PredictorConfig, frame_interval: Duration) -> Self {
        Self {
            session_id: SessionId::new(),
            predictor: ExercisePredictor::new(predictor_config),
            frame_interval,
            frames_processed: 0,
            frames_rejected: 0,
            started: None,
            first_timestamp: None,
            elapsed_secs: 0.0,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn predictor(&self) -> &ExercisePredictor {
        &self.predictor
    }

    /// Run until the source is exhausted.
    ///
    /// A fatal source error is published as an `ERROR` message and returned.
    pub async fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<SessionSummary>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        let span = tracing::info_span!("session", id = %self.session_id);
        self.drive(source, sink).instrument(span).await
    }

    async fn drive<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<SessionSummary>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        if let Err(e) = source.open().await {
            tracing::error!(source = %source.describe(), error = %e, "Could not open frame source");
            sink.publish(&Envelope::error(e.to_string())).await?;
            return Err(e);
        }
        tracing::info!(source = %source.describe(), "Session started");
        self.started = Some(Instant::now());

        loop {
            match source.next_frame().await {
                Ok(Some(record)) => {
                    let envelope = self.process(&record);
                    sink.publish(&envelope).await?;
                }
                Ok(None) => break,
                Err(e) if e.is_fatal() => {
                    tracing::error!(error = %e, "Frame source failed");
                    sink.publish(&Envelope::error(e.to_string())).await?;
                    source.close().await?;
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected frame");
                    self.frames_rejected += 1;
                    sink.publish(&Envelope::error(e.to_string())).await?;
                }
            }

            if !self.frame_interval.is_zero() {
                tokio::time::sleep(self.frame_interval).await;
            }
        }

        source.close().await?;
        let summary = self.summary();
        tracing::info!(
            frames = summary.frames_processed,
            rejected = summary.frames_rejected,
            reps = summary.rep_count,
            "Session finished"
        );
        Ok(summary)
    }

    fn process(&mut self, record: &FrameRecord) -> Envelope {
        self.frames_processed += 1;
        self.elapsed_secs = self.elapsed_since_start(record.timestamp);
        let report = self.predictor.process_frame(&record.landmarks, self.elapsed_secs);
        tracing::debug!(
            sequence = record.sequence,
            exercise = %report.exercise,
            reps = report.rep_count,
            "Frame processed"
        );
        Envelope::VideoFrame(report)
    }

    /// Producer timestamps take precedence over the wall clock
    fn elapsed_since_start(&mut self, timestamp: Option<Timestamp>) -> f64 {
        match timestamp {
            Some(ts) => {
                let first = *self.first_timestamp.get_or_insert_with(|| {
                    tracing::debug!(at = %ts.to_datetime(), "Using producer timestamps");
                    ts
                });
                ts.secs_since(first)
            }
            None => self
                .started
                .map(|start| start.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let rep_count = self.predictor.rep_count();
        SessionSummary {
            session_id: self.session_id,
            frames_processed: self.frames_processed,
            frames_rejected: self.frames_rejected,
            rep_count,
            final_label: self.predictor.label().to_string(),
            stats: SessionStats::compute(rep_count, self.elapsed_secs),
            completed_exercises: self.predictor.completed_exercises().to_vec(),
        }
    }
}
