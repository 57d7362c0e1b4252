//! MemoryLogger - Keeps every line for later assertions

use crate::fields::Fields;
use crate::level::Level;
use crate::logger::Logger;
use std::sync::{Arc, Mutex};

/// One recorded line
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    pub fields: Fields,
}

/// Logger that records lines in memory.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Entries at `level` or above
    pub fn at_least(&self, level: Level) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level >= level)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, message: &str, fields: &Fields) {
        // A poisoned buffer means a panic-level line already unwound through
        // a holder; keep recording.
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push(LogEntry {
            level,
            message: message.to_string(),
            fields: fields.clone(),
        });
    }
}
