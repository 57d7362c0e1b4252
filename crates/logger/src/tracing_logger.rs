//! TracingLogger - Logger backed by `tracing` events

use crate::fields::Fields;
use crate::level::Level;
use crate::logger::Logger;
use shared::LogSettings;

/// Forwards every line to the `tracing` dispatcher.
///
/// Panic and fatal lines are emitted at ERROR with a `severity` field, since
/// `tracing` has no levels above ERROR. Structured fields travel as one JSON
/// object in the `fields` field.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: String,
}

impl TracingLogger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn from_settings(settings: &LogSettings) -> Self {
        Self::new(settings.name.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::from_settings(&LogSettings::default())
    }
}

macro_rules! emit {
    ($macro:ident, $logger:expr, $severity:expr, $message:expr, $fields:expr) => {
        if $fields.is_empty() {
            tracing::$macro!(logger = %$logger, severity = $severity, "{}", $message)
        } else {
            tracing::$macro!(
                logger = %$logger,
                severity = $severity,
                fields = %$fields.to_json(),
                "{}",
                $message
            )
        }
    };
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, fields: &Fields) {
        let severity = level.as_str();
        match level {
            Level::Debug => emit!(debug, self.name, severity, message, fields),
            Level::Info => emit!(info, self.name, severity, message, fields),
            Level::Warn => emit!(warn, self.name, severity, message, fields),
            Level::Error | Level::Panic | Level::Fatal => {
                emit!(error, self.name, severity, message, fields)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_forwards_to_tracing() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let logger = TracingLogger::new("orders");
            logger.infow("order placed", crate::fields! { "id" => 17 });
            logger.debugf(format_args!("cache {}", "miss"));
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("order placed"));
        assert!(output.contains("logger=orders"));
        assert!(output.contains(r#"fields={"id":17}"#));
        assert!(output.contains("cache miss"));
    }
}
