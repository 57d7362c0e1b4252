//! # groundwork lifecycle
//!
//! Start/stop contract for a long-running process.
//!
//! ```text
//! serve(app, ctx)
//!   ├── app.run()        acquire resources, start background work
//!   ├── ctx.done()       wait until cancelled (skipped if run failed)
//!   └── app.shutdown()   always called, releases whatever run acquired
//! ```

pub mod app;
pub mod group;
pub mod signal;

pub use app::{serve, App};
pub use group::AppGroup;
pub use signal::{cancel_on_signal, shutdown_signal};
