//! Logger - Leveled logging sink
//!
//! Implementors supply [`Logger::log`]; the eighteen call shapes are
//! provided on top of it, so the panic and fatal escalations cannot be
//! forgotten by an implementation.

use crate::fields::Fields;
use crate::level::Level;
use serde_json::Value;
use std::fmt;

/// Join unformatted arguments with single spaces
fn join(args: &[&dyn fmt::Display]) -> String {
    args.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Logger interface for dependency injection
pub trait Logger: Send + Sync {
    /// Record one line. Must not escalate; escalation is handled by the
    /// provided `panic*` and `fatal*` methods.
    fn log(&self, level: Level, message: &str, fields: &Fields);

    /// Flush buffered output. Called before the process exits on fatal.
    fn flush(&self) {}

    /// Terminate the process. Only reached from the `fatal*` methods.
    fn exit(&self, code: i32) -> ! {
        std::process::exit(code)
    }

    /// Record a line from a flat `key, value, ...` list.
    ///
    /// An odd-length list (or a non-string key) is reported with a separate
    /// warning naming the problem; the line itself is still recorded with
    /// the well-formed pairs.
    fn logkv(&self, level: Level, message: &str, key_values: Vec<Value>) {
        match Fields::from_key_values(key_values.clone()) {
            Ok(fields) => self.log(level, message, &fields),
            Err(e) => {
                self.log(
                    Level::Warn,
                    "malformed structured log",
                    &Fields::new()
                        .with("error", e.to_string())
                        .with("arguments", Value::Array(key_values.clone())),
                );
                let usable: Vec<(String, Value)> = key_values
                    .chunks_exact(2)
                    .filter_map(|pair| match &pair[0] {
                        Value::String(k) => Some((k.clone(), pair[1].clone())),
                        _ => None,
                    })
                    .collect();
                let fields: Fields = usable.into_iter().collect();
                self.log(level, message, &fields);
            }
        }
    }

    // ========== Debug ==========

    fn debug(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Debug, &join(args), &Fields::new());
    }

    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, &args.to_string(), &Fields::new());
    }

    fn debugw(&self, msg: &str, fields: Fields) {
        self.log(Level::Debug, msg, &fields);
    }

    // ========== Info ==========

    fn info(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Info, &join(args), &Fields::new());
    }

    fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, &args.to_string(), &Fields::new());
    }

    fn infow(&self, msg: &str, fields: Fields) {
        self.log(Level::Info, msg, &fields);
    }

    // ========== Warn ==========

    fn warn(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Warn, &join(args), &Fields::new());
    }

    fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, &args.to_string(), &Fields::new());
    }

    fn warnw(&self, msg: &str, fields: Fields) {
        self.log(Level::Warn, msg, &fields);
    }

    // ========== Error ==========

    fn error(&self, args: &[&dyn fmt::Display]) {
        self.log(Level::Error, &join(args), &Fields::new());
    }

    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, &args.to_string(), &Fields::new());
    }

    fn errorw(&self, msg: &str, fields: Fields) {
        self.log(Level::Error, msg, &fields);
    }

    // ========== Panic: record, then unwind ==========

    fn panic(&self, args: &[&dyn fmt::Display]) -> ! {
        let message = join(args);
        self.log(Level::Panic, &message, &Fields::new());
        panic!("{}", message)
    }

    fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        self.log(Level::Panic, &message, &Fields::new());
        panic!("{}", message)
    }

    fn panicw(&self, msg: &str, fields: Fields) -> ! {
        self.log(Level::Panic, msg, &fields);
        panic!("{} {}", msg, fields)
    }

    // ========== Fatal: record, then exit the process ==========

    fn fatal(&self, args: &[&dyn fmt::Display]) -> ! {
        self.log(Level::Fatal, &join(args), &Fields::new());
        self.flush();
        self.exit(1)
    }

    fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.log(Level::Fatal, &args.to_string(), &Fields::new());
        self.flush();
        self.exit(1)
    }

    fn fatalw(&self, msg: &str, fields: Fields) -> ! {
        self.log(Level::Fatal, msg, &fields);
        self.flush();
        self.exit(1)
    }
}

/// No-op logger for testing
#[derive(Debug, Clone, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str, _fields: &Fields) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLogger;
    use serde_json::json;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_call_shapes() {
        let logger = MemoryLogger::new();

        logger.info(&[&"user", &42, &"logged in"]);
        logger.warnf(format_args!("retry {} of {}", 1, 3));
        logger.errorw("upload failed", crate::fields! { "object" => "a.png" });

        let entries = logger.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "user 42 logged in");
        assert_eq!(entries[1].level, Level::Warn);
        assert_eq!(entries[1].message, "retry 1 of 3");
        assert_eq!(entries[2].fields.get("object"), Some(&json!("a.png")));
    }

    #[test]
    fn test_panic_records_then_unwinds() {
        let logger = MemoryLogger::new();

        let result = catch_unwind(AssertUnwindSafe(|| {
            logger.panicw("invariant broken", crate::fields! { "id" => 9 });
        }));

        assert!(result.is_err());
        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::Panic);
    }

    #[test]
    fn test_error_returns_control() {
        let logger = MemoryLogger::new();
        logger.error(&[&"recoverable"]);
        logger.debugf(format_args!("still running"));
        assert_eq!(logger.entries().len(), 2);
    }

    /// Logger whose exit unwinds with the code instead of stopping the test
    /// process
    struct ExitProbe(MemoryLogger);

    impl Logger for ExitProbe {
        fn log(&self, level: Level, message: &str, fields: &Fields) {
            self.0.log(level, message, fields);
        }

        fn exit(&self, code: i32) -> ! {
            std::panic::panic_any(code)
        }
    }

    #[test]
    fn test_fatal_records_then_exits() {
        let probe = ExitProbe(MemoryLogger::new());

        let payload = catch_unwind(AssertUnwindSafe(|| {
            probe.fatalf(format_args!("cannot bind port {}", 8080));
        }))
        .unwrap_err();

        assert_eq!(payload.downcast_ref::<i32>(), Some(&1));
        let entries = probe.0.entries();
        assert_eq!(entries[0].level, Level::Fatal);
        assert_eq!(entries[0].message, "cannot bind port 8080");
    }

    #[test]
    fn test_logkv_odd_length_warns() {
        let logger = MemoryLogger::new();
        logger.logkv(Level::Info, "request", vec![json!("path"), json!("/"), json!("status")]);

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Level::Warn);
        assert_eq!(entries[0].message, "malformed structured log");
        assert_eq!(entries[1].message, "request");
        assert_eq!(entries[1].fields.get("path"), Some(&json!("/")));
        assert_eq!(entries[1].fields.len(), 1);
    }

    #[test]
    fn test_null_logger_is_object_safe() {
        let logger: Box<dyn Logger> = Box::new(NullLogger);
        logger.infow("ignored", Fields::new());
    }
}
