//! Forward tick records to the `tracing` facade.

use super::{Logger, TickRecord};
use tracing::Level;

/// Emits one `tracing` event per tick at a configurable level.
///
/// Events carry the record's fields as structured values, so a subscriber
/// can filter on `current_state` or `machine_id`.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    level: Level,
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
        }
    }
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

macro_rules! tick_event {
    ($level:expr, $record:ident) => {
        tracing::event!(
            $level,
            machine_id = %$record.machine_id,
            blackboard_id = $record.blackboard_id,
            current_state = $record.current_state,
            target_state = $record.target_state,
            blackboard = $record.blackboard.as_deref(),
            duration_us = $record.duration.as_micros() as u64,
            "{}",
            $record.branch
        )
    };
}

impl Logger for TracingLogger {
    fn log(&mut self, record: &TickRecord<'_>) {
        // tracing::event! needs a const level, so each level gets its own call.
        if self.level == Level::ERROR {
            tick_event!(Level::ERROR, record);
        } else if self.level == Level::WARN {
            tick_event!(Level::WARN, record);
        } else if self.level == Level::INFO {
            tick_event!(Level::INFO, record);
        } else if self.level == Level::DEBUG {
            tick_event!(Level::DEBUG, record);
        } else {
            tick_event!(Level::TRACE, record);
        }
    }
}
