//! Core components for the jsonlog setup layer.
//!
//! ## Core Components
//!
//! ### [`error`] - Error handling
//! A single [`LogError`] enum for every setup failure. All of them are raised
//! synchronously while configuring or registering categories, never while an
//! event is being written.
//!
//! ### [`result`] - Result types
//! Extension traits for turning foreign errors into [`LogResult`].

pub mod error;
pub mod result;

// Re-export core types
pub use error::{LogError, LogResult};
pub use result::LogResultExt;
