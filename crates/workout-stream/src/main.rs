//! Workout assistant entry point.
//!
//! Reads landmark frames, writes one JSON message per frame to stdout and
//! logs to stderr.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use workout_stream::{Cli, Envelope, FrameSink, JsonLinesSink, JsonLinesSource, SessionRunner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout carries the message stream
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let mut sink = JsonLinesSink::stdout();

    let config = match cli.session_config() {
        Ok(config) => config,
        Err(e) => {
            sink.publish(&Envelope::error(e.to_string())).await?;
            return Err(e).context("invalid configuration");
        }
    };

    let mut runner = SessionRunner::new(&config)?;
    let mut source = JsonLinesSource::new(config.input.clone(), config.camera_index);
    tracing::info!(
        session = %runner.session_id(),
        exercise_type = %config.exercise_type,
        "Starting workout session"
    );

    let summary = runner
        .run(&mut source, &mut sink)
        .await
        .context("workout session aborted")?;

    tracing::info!(
        reps = summary.rep_count,
        calories = summary.stats.calories,
        completed = ?summary.completed_exercises,
        "Workout complete"
    );

    Ok(())
}
