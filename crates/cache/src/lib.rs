//! # groundwork cache
//!
//! Key-value cache contract with expiration and pattern operations.
//!
//! A missing key and a key holding the nil sentinel are different outcomes:
//!
//! | Stored            | `get` returns                     |
//! |-------------------|-----------------------------------|
//! | nothing           | `Err(Error::NotFound { .. })`     |
//! | `CacheValue::Nil` | `Ok(CacheValue::Nil)`             |
//! | text              | `Ok(CacheValue::Text(..))`        |

pub mod cache;
pub mod pattern;
pub mod value;

pub use cache::{Cache, CacheExt};
pub use pattern::KeyPattern;
pub use value::CacheValue;
