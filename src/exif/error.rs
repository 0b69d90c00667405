use std::process::ExitStatus;
use thiserror::Error;

/// Why a decode produced no record.
///
/// Coordinate values that fail to parse are not errors; they leave the field
/// at its default (see [`parse_report`](super::parse_report)).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The executable could not be started (not on `PATH`, not executable, ...).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A stdio pipe to the child was not available after spawning.
    #[error("failed to capture {0} of exiftool process")]
    Pipe(&'static str),

    /// Waiting on the child or draining its output failed.
    #[error("exiftool I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The output drain task panicked or was cancelled.
    #[error("exiftool output reader did not finish: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// exiftool ran but exited unsuccessfully; `stderr` holds its diagnostic.
    #[error("exiftool exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },
}
