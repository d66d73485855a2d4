//! Centralized error handling for the avatar proxy
//!
//! # Error Categories
//!
//! - **Application Errors**: configuration and client construction at startup
//! - **Fetch Errors**: upstream status, transport, worker and wait-budget failures
//! - **Cache Errors**: conflicting inserts into the cache store
//!
//! # Usage
//!
//! ```rust
//! use avatar_proxy::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for upstream fetch Results
pub type FetchResult<T> = Result<T, FetchError>;

/// Convenience type alias for cache store Results
pub type CacheResult<T> = Result<T, CacheError>;
