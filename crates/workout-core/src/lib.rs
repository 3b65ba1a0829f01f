//! # Workout-Core
//!
//! Core types and utilities for turning per-frame body landmarks into
//! exercise classification, repetition counts and form feedback.
//!
//! The landmark stream itself comes from an external pose-estimation model.
//! This crate only fixes the input contract (an ordered list of
//! `{x, y, z, visibility}` records in MediaPipe Pose topology) and the
//! geometry used on top of it:
//!
//! - **Types**: landmarks, named joints, exercise kinds and display labels
//! - **Geometry**: joint angles and named-joint extraction with midpoints
//! - **Error**: the shared error type and `Result` alias

pub mod error;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
