//! Fatal error kinds for one invocation.

use crate::cache::CacheError;
use crate::exit_codes;
use std::io;
use thiserror::Error;

/// Errors that abort the current invocation.
///
/// Each kind maps to a fixed exit code via [`ExecutorError::exit_code`].
/// Non-fatal conditions (see [`crate::env::EnvironmentWarning`]) are
/// not errors; they travel alongside still-valid results.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The cached legacy binary could not be resolved.
    #[error(transparent)]
    CacheResolution(#[from] CacheError),

    /// The legacy child process could not be started.
    #[error("failed to spawn legacy binary: {0}")]
    Spawn(#[source] io::Error),

    /// Waiting on the legacy child process failed.
    #[error("failed to wait for legacy binary: {0}")]
    Wait(#[source] io::Error),

    /// The legacy child process exceeded its timeout and was killed.
    #[error("legacy binary timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

impl ExecutorError {
    /// The fixed exit code this error translates to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Timeout { .. } => exit_codes::TIMEOUT,
            Self::CacheResolution(_) | Self::Spawn(_) | Self::Wait(_) => exit_codes::FATAL,
        }
    }
}
