//! Report - Outcome of a conformance run

use std::fmt;
use std::time::Duration;

/// Result of one check; the error is a human-readable reason
pub type CheckResult<T = ()> = std::result::Result<T, String>;

/// Timing knobs of the harness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Expiration used by the TTL scenario
    pub ttl: Duration,
    /// How long the TTL scenario waits before expecting the key gone
    pub ttl_wait: Duration,
    /// Upper bound for a message that must arrive
    pub receive_timeout: Duration,
    /// How long to listen for a message that must not arrive
    pub quiet_period: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(2),
            ttl_wait: Duration::from_secs(3),
            receive_timeout: Duration::from_secs(5),
            quiet_period: Duration::from_millis(500),
        }
    }
}

impl HarnessConfig {
    /// Short timings for in-process backends
    pub fn fast() -> Self {
        Self {
            ttl: Duration::from_millis(50),
            ttl_wait: Duration::from_millis(120),
            receive_timeout: Duration::from_secs(1),
            quiet_period: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub suite: &'static str,
    pub check: &'static str,
    /// `None` when the check passed
    pub failure: Option<String>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    outcomes: Vec<Outcome>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, suite: &'static str, check: &'static str, result: CheckResult) {
        match &result {
            Ok(()) => tracing::debug!(suite, check, "check passed"),
            Err(reason) => tracing::warn!(suite, check, %reason, "check failed"),
        }
        self.outcomes.push(Outcome {
            suite,
            check,
            failure: result.err(),
        });
    }

    pub fn merge(&mut self, other: Report) {
        self.outcomes.extend(other.outcomes);
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Panic with every failure listed; for use in tests
    pub fn assert_passed(&self) {
        if !self.is_success() {
            panic!("conformance failures:\n{}", self);
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.failure {
                None => writeln!(f, "  ok    {}::{}", outcome.suite, outcome.check)?,
                Some(reason) => writeln!(
                    f,
                    "  FAIL  {}::{}: {}",
                    outcome.suite, outcome.check, reason
                )?,
            }
        }
        write!(
            f,
            "{} passed, {} failed",
            self.passed_count(),
            self.outcomes.len() - self.passed_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let mut report = Report::new();
        report.record("cache", "set_then_get", Ok(()));
        let mut other = Report::new();
        other.record("bucket", "round_trip", Err("size mismatch".to_string()));
        report.merge(other);

        assert!(!report.is_success());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failures().count(), 1);

        let text = report.to_string();
        assert!(text.contains("ok    cache::set_then_get"));
        assert!(text.contains("FAIL  bucket::round_trip: size mismatch"));
        assert!(text.ends_with("1 passed, 1 failed"));
    }

    #[test]
    #[should_panic(expected = "conformance failures")]
    fn test_assert_passed_panics() {
        let mut report = Report::new();
        report.record("orm", "soft_delete", Err("created_at changed".to_string()));
        report.assert_passed();
    }
}
