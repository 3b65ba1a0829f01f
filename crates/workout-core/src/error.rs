//! Error types for the workout assistant.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Joint {joint} unavailable: landmark index {index} out of range for {available} landmarks")]
    MissingJoint {
        joint: &'static str,
        index: usize,
        available: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Frame decode error: {0}")]
    FrameDecode(String),

    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Frame source error: {0}")]
    Source(String),

    #[error("Unknown exercise type: {0}")]
    UnknownExercise(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Session-level errors end the session; everything else is absorbed
    /// at the frame boundary.
    ///
    /// A source that fails to read is as dead as one that never opened.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable(_) | Error::Source(_) | Error::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Source(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::SourceUnavailable("camera 0".into()).is_fatal());
        assert!(Error::Source("Broken pipe".into()).is_fatal());
        assert!(!Error::FrameDecode("bad json".into()).is_fatal());
        assert!(!Error::MissingJoint {
            joint: "left_knee",
            index: 25,
            available: 10
        }
        .is_fatal());
    }

    #[test]
    fn test_io_error_is_fatal() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "device gone").into();
        assert!(matches!(err, Error::Source(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_joint_message() {
        let err = Error::MissingJoint {
            joint: "right_ankle",
            index: 28,
            available: 17,
        };
        assert_eq!(
            err.to_string(),
            "Joint right_ankle unavailable: landmark index 28 out of range for 17 landmarks"
        );
    }
}
