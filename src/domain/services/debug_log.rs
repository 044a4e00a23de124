#[cfg(test)]
#[path = "debug_log_test.rs"]
mod tests;

use std::collections::VecDeque;
use std::fmt;

use chrono::DateTime;
use chrono::Local;

pub const MAX_DEBUG_LOG_ENTRIES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLogEntry {
    pub timestamp: DateTime<Local>,
    pub line: String,
}

impl fmt::Display for DebugLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(
            f,
            "[{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.line
        );
    }
}

/// Rolling transport diagnostics. Oldest entries are evicted once the log is
/// full.
#[derive(Default, Debug, Clone)]
pub struct DebugLog {
    entries: VecDeque<DebugLogEntry>,
}

impl DebugLog {
    pub fn push(&mut self, line: &str) {
        tracing::debug!(line, "rpc");

        if self.entries.len() >= MAX_DEBUG_LOG_ENTRIES {
            self.entries.pop_front();
        }

        self.entries.push_back(DebugLogEntry {
            timestamp: Local::now(),
            line: line.to_string(),
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    pub fn lines(&self) -> Vec<String> {
        return self
            .entries
            .iter()
            .map(|entry| return entry.line.to_string())
            .collect();
    }

    pub fn entries(&self) -> impl Iterator<Item = &DebugLogEntry> {
        return self.entries.iter();
    }
}
