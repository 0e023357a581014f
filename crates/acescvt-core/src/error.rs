//! Error types for texture scanning and conversion.
//!
//! A single [`Error`] enum covers directory validation, the external
//! converter, settings persistence and the background worker. Per-file
//! conversion failures inside a batch are *not* surfaced as errors; they are
//! collected into a [`crate::BatchReport`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by acescvt operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Directory does not exist or is not a directory.
    #[error("invalid directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    /// Converted files cannot be placed next to their sources.
    #[error("directory is not writable: {}", .0.display())]
    NotWritable(PathBuf),

    /// Another scan or conversion is still running.
    #[error("an operation is already running")]
    Busy,

    /// Conversion requested with an empty selection.
    #[error("nothing selected")]
    NothingSelected,

    /// Unrecognized map type label.
    #[error("unknown map type: {0}")]
    UnknownMapType(String),

    /// Unrecognized extension filter name.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// Group key or id not present in the session.
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    /// External converter could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// External converter exited unsuccessfully.
    #[error("converter exited with {status}: {stderr}")]
    ConverterFailed {
        /// Exit status description.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// Converter reported success but produced no file.
    #[error("converter produced no output: {}", .0.display())]
    MissingOutput(PathBuf),

    /// Settings file could not be parsed or written.
    #[error("settings error: {0}")]
    Settings(String),

    /// Background worker thread is gone.
    #[error("worker thread terminated")]
    WorkerGone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = Error::InvalidDirectory(PathBuf::from("/no/such"));
        assert!(err.to_string().contains("/no/such"));

        let err = Error::ConverterFailed {
            status: "exit status: 2".into(),
            stderr: "bad colorspace".into(),
        };
        assert_eq!(err.to_string(), "converter exited with exit status: 2: bad colorspace");
    }

    #[test]
    fn io_converts() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
