//! Reporting collaborator for recovered and non-fatal problems.
//!
//! The numeric core never logs through a global. Anything that needs to
//! surface a warning takes a `&dyn Reporter` instead, so callers decide
//! where messages end up (tracing in the CLI, a vector in tests).

use std::cell::RefCell;

/// Receives warnings and errors that do not abort a run.
pub trait Reporter {
    /// Report a recovered problem.
    fn warn(&self, msg: &str);

    /// Report a problem that dropped part of the output.
    fn error(&self, msg: &str);
}

/// Forwards reports to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }
}

/// Severity of a recorded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Recovered problem.
    Warn,
    /// Part of the output was dropped.
    Error,
}

/// Collects reports in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: RefCell<Vec<(Level, String)>>,
}

impl MemoryReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    /// Messages recorded at the given level.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Check whether nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Reporter for MemoryReporter {
    fn warn(&self, msg: &str) {
        self.entries.borrow_mut().push((Level::Warn, msg.to_string()));
    }

    fn error(&self, msg: &str) {
        self.entries.borrow_mut().push((Level::Error, msg.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_levels() {
        let reporter = MemoryReporter::new();
        assert!(reporter.is_empty());

        reporter.warn("first");
        reporter.error("second");
        reporter.warn("third");

        assert_eq!(reporter.messages(Level::Warn), vec!["first", "third"]);
        assert_eq!(reporter.messages(Level::Error), vec!["second"]);
        assert_eq!(reporter.entries().len(), 3);
    }
}
