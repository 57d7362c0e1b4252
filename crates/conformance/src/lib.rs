//! # groundwork conformance
//!
//! Behavioural checks a backend runs against itself to prove it honours a
//! contract. Each suite takes the backend under test and returns a
//! [`Report`]; nothing panics on a failed check.
//!
//! ```ignore
//! let report = conformance::cache::run(&my_cache, &HarnessConfig::default()).await;
//! report.assert_passed();
//! ```
//!
//! Suites mutate the backend (the cache suite deletes every key), so run
//! them against a dedicated instance.

/// Fail the current check unless `cond` holds
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(format!($($arg)+));
        }
    };
}
pub(crate) use ensure;

/// Attach the name of the failed step to a contract error
pub(crate) trait Step<T> {
    fn step(self, what: &str) -> CheckResult<T>;
}

impl<T> Step<T> for shared::Result<T> {
    fn step(self, what: &str) -> CheckResult<T> {
        self.map_err(|e| format!("{}: {}", what, e))
    }
}

/// Contexts no operation may run under: one cancelled, one past its deadline
pub(crate) fn dead_contexts() -> [(&'static str, shared::Context); 2] {
    let (cancelled, handle) = shared::Context::background().with_cancel();
    handle.cancel();
    let expired = shared::Context::background().with_timeout(std::time::Duration::ZERO);
    [("cancelled", cancelled), ("expired", expired)]
}

/// Pass only if `result` failed with kind `Cancellation`
pub(crate) fn expect_cancellation<T>(result: shared::Result<T>, what: &str) -> CheckResult {
    match result {
        Err(e) if e.is_cancellation() => Ok(()),
        Err(e) => Err(format!("{}: expected cancellation, got {}", what, e)),
        Ok(_) => Err(format!("{}: succeeded under a dead context", what)),
    }
}

pub mod bucket;
pub mod cache;
pub mod orm;
pub mod pubsub;
mod report;

pub use report::{CheckResult, HarnessConfig, Outcome, Report};
