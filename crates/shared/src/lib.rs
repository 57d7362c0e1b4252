//! # groundwork shared
//!
//! Primitives used by every contract crate: the error taxonomy, the
//! cancellation [`Context`] and the [`Settings`] document.

pub mod config;
pub mod context;
pub mod error;

// Re-exports
pub use config::*;
pub use context::*;
pub use error::*;
