use std::time::Duration;
use thiserror::Error;

/// Errors reported while waiting on a [`Probe`](crate::probe::Probe).
///
/// Sending never fails; only the blocking side of a probe can observe that
/// the probed operation will not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The operation was dropped without finishing: it panicked, or its inbox
    /// was dropped while the operation was still queued. Also returned by a
    /// second wait after the result has already been handed out.
    #[error("probed operation was dropped before it completed")]
    Abandoned,
    /// The caller-supplied timeout elapsed first. The operation stays queued
    /// and will still run.
    #[error("probed operation did not complete within {0:?}")]
    Timeout(Duration),
}

/// Errors related to inbox configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroThreshold { field: &'static str },
    #[error("inbox name must not be empty")]
    EmptyName,
}
