//! Error type definitions for the avatar proxy
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that keeps startup failures,
//! upstream fetch failures and cache conflicts apart.

use std::time::Duration;
use thiserror::Error;

/// Top-level application error type
///
/// Used for wiring and startup paths (configuration, client construction). Request-path failures never surface as `AppError`;
/// the avatar service turns them into the placeholder image instead.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors produced by a single upstream fetch cycle
#[derive(Error, Debug)]
pub enum FetchError {
    /// The primary image request answered with something other than 200
    #[error("Upstream returned status {status} for {hash}")]
    UpstreamStatus { hash: String, status: u16 },

    /// DNS, connect, read or client timeout failures
    #[error("Upstream unreachable for {hash}: {source}")]
    Transport {
        hash: String,
        #[source]
        source: reqwest::Error,
    },

    /// The worker pool has shut down or the worker dropped the task
    #[error("Fetch worker unavailable for {hash}")]
    WorkerUnavailable { hash: String },

    /// The caller's wait budget elapsed before the task completed
    #[error("Timed out after {waited_ms}ms waiting for {hash}")]
    Timeout { hash: String, waited_ms: u64 },
}

/// Cache store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A live entry already exists under this key
    #[error("Cache entry already exists: {key}")]
    AlreadyExists { key: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl FetchError {
    /// Create a transport error for a hash
    pub fn transport<H: Into<String>>(hash: H, source: reqwest::Error) -> Self {
        Self::Transport {
            hash: hash.into(),
            source,
        }
    }

    /// Create a timeout error, saturating waits too long for milliseconds
    pub fn timeout<H: Into<String>>(hash: H, waited: Duration) -> Self {
        Self::Timeout {
            hash: hash.into(),
            waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Short label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::UpstreamStatus { .. } => "upstream_status",
            FetchError::Transport { .. } => "transport",
            FetchError::WorkerUnavailable { .. } => "worker_unavailable",
            FetchError::Timeout { .. } => "timeout",
        }
    }
}
