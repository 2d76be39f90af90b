//! Per-tick records and the sinks that consume them.
//!
//! Every tick that does work produces exactly one [`TickRecord`]. Where it
//! goes is decided by the caller: [`Fsm::tick`](crate::runtime::Fsm::tick)
//! drops it into a [`NullLogger`],
//! [`Fsm::tick_with_logger`](crate::runtime::Fsm::tick_with_logger) hands it to
//! any [`Logger`].
//!
//! A logger is a plain mutable sink with no internal locking. Agents ticked
//! on different threads need their own logger or external synchronisation.

mod csv;
mod trace;

pub use csv::{CsvLogger, CSV_HEADER};
pub use trace::TracingLogger;

use crate::runtime::TickBranch;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord<'a> {
    /// Id of the compiled machine that ran the tick.
    pub machine_id: Uuid,
    /// Address of the ticked blackboard, distinguishing agents.
    pub blackboard_id: usize,
    /// Full name of the state that was ticked.
    pub current_state: &'a str,
    /// [`Blackboard::snapshot`](crate::core::Blackboard::snapshot) taken after the tick.
    pub blackboard: Option<String>,
    pub branch: TickBranch,
    /// State the agent will tick next, or `"Finishing"` when it finished.
    pub target_state: &'a str,
    pub duration: Duration,
}

impl TickRecord<'_> {
    /// Human readable description of the branch taken.
    pub fn message(&self) -> String {
        self.branch.to_string()
    }
}

/// Sink for tick records.
pub trait Logger {
    fn log(&mut self, record: &TickRecord<'_>);
}

impl<L: Logger + ?Sized> Logger for &mut L {
    fn log(&mut self, record: &TickRecord<'_>) {
        (**self).log(record);
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(&mut self, record: &TickRecord<'_>) {
        (**self).log(record);
    }
}

/// Logger that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&mut self, _record: &TickRecord<'_>) {}
}

/// Logger that keeps every record in memory.
///
/// Useful in tests and for post-mortem inspection of a short run.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    entries: Vec<LogEntry>,
}

/// Owned copy of a [`TickRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub machine_id: Uuid,
    pub blackboard_id: usize,
    pub current_state: String,
    pub blackboard: Option<String>,
    pub branch: TickBranch,
    pub target_state: String,
    pub duration: Duration,
}

impl From<&TickRecord<'_>> for LogEntry {
    fn from(record: &TickRecord<'_>) -> Self {
        Self {
            machine_id: record.machine_id,
            blackboard_id: record.blackboard_id,
            current_state: record.current_state.to_string(),
            blackboard: record.blackboard.clone(),
            branch: record.branch,
            target_state: record.target_state.to_string(),
            duration: record.duration,
        }
    }
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Logger for MemoryLogger {
    fn log(&mut self, record: &TickRecord<'_>) {
        self.entries.push(LogEntry::from(record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(branch: TickBranch) -> TickRecord<'static> {
        TickRecord {
            machine_id: Uuid::nil(),
            blackboard_id: 0x10,
            current_state: "__main__:Start",
            blackboard: None,
            branch,
            target_state: "__main__:End",
            duration: Duration::from_micros(3),
        }
    }

    #[test]
    fn message_describes_branch() {
        assert_eq!(
            record(TickBranch::Condition(0)).message(),
            "Condition 0 hit"
        );
        assert_eq!(record(TickBranch::Default).message(), "Behavior executed");
    }

    #[test]
    fn memory_logger_keeps_owned_copies() {
        let mut logger = MemoryLogger::new();
        logger.log(&record(TickBranch::Default));
        logger.log(&record(TickBranch::GlobalError));

        assert_eq!(logger.len(), 2);
        assert_eq!(logger.entries()[1].branch, TickBranch::GlobalError);
        assert_eq!(logger.entries()[0].target_state, "__main__:End");

        logger.clear();
        assert!(logger.is_empty());
    }

    #[test]
    fn loggers_work_through_references_and_boxes() {
        fn log_one<L: Logger>(mut logger: L) {
            logger.log(&record(TickBranch::Default));
        }

        let mut memory = MemoryLogger::new();
        log_one(&mut memory);
        log_one(Box::new(NullLogger) as Box<dyn Logger>);

        assert_eq!(memory.len(), 1);
    }
}
