//! # groundwork logger
//!
//! Leveled logging contract with three call shapes per level:
//!
//! ```ignore
//! logger.info(&[&"user", &id, &"logged in"]);            // unformatted
//! logger.infof(format_args!("user {} logged in", id));   // template
//! logger.infow("user logged in", fields! { "id" => id }); // structured
//! ```
//!
//! `panic*` unwind the calling stack after recording the line; `fatal*`
//! terminate the process. Both are explicit escalations.

pub mod fields;
pub mod level;
pub mod logger;
pub mod memory;
pub mod subscriber;
pub mod tracing_logger;

pub use fields::Fields;
pub use level::Level;
pub use logger::{Logger, NullLogger};
pub use memory::{LogEntry, MemoryLogger};
pub use tracing_logger::TracingLogger;
