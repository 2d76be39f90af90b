//! Loggable Blackboard
//!
//! This example runs a small patrol agent with an error machine and writes
//! every tick to CSV on stdout.
//!
//! Key concepts:
//! - `Blackboard::snapshot` to describe the agent in tick logs
//! - A global error condition that interrupts any state
//! - `restart()` from the error machine back to the main entry state
//! - `CsvLogger` as a tick sink
//!
//! Run with: cargo run --example loggable_blackboard

use hfsm::{Blackboard, Builder, CsvLogger, StateStack};
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Guard {
    stack: StateStack,
    health: i32,
    waypoint: usize,
    healed: u32,
}

impl Blackboard for Guard {
    fn state_stack(&self) -> &StateStack {
        &self.stack
    }

    fn state_stack_mut(&mut self) -> &mut StateStack {
        &mut self.stack
    }

    fn snapshot(&self) -> Option<String> {
        Some(format!(
            "health={} waypoint={} healed={}",
            self.health, self.waypoint, self.healed
        ))
    }
}

const WAYPOINTS: usize = 3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let fsm = Builder::<Guard>::new()
        .with_error_machine()
        .use_global_entry_condition(|guard: &Guard| guard.health <= 0)
        .with_entry_state("Heal")?
        .when(|guard: &Guard| guard.health >= 10)
        .restart()
        .otherwise_exec(|guard: &mut Guard| {
            guard.health += 5;
            guard.healed += 1;
        })
        .and_loop()
        .done()
        .with_submachine("Patrol")?
        .with_entry_state("Walk")?
        .when(|guard: &Guard| guard.waypoint == WAYPOINTS)
        .finish()
        .otherwise_exec(|guard: &mut Guard| {
            guard.waypoint += 1;
            guard.health -= 4;
        })
        .and_loop()
        .done()
        .with_main_machine()
        .with_entry_state("Idle")?
        .when(|guard: &Guard| guard.healed > 0 && guard.waypoint == WAYPOINTS)
        .go_to_state("Rest")?
        .otherwise_exec(|guard: &mut Guard| guard.waypoint = 0)
        .and_go_to_machine("Patrol")?
        .then_go_to_state("Idle")?
        .with_state("Rest")?
        .exec(|_| {})
        .and_finish()
        .done()
        .build()?;

    let mut guard = Guard {
        health: 10,
        ..Guard::default()
    };
    let mut logger = CsvLogger::new(io::stdout().lock())?;

    while !fsm.is_finished(&guard) {
        fsm.tick_with_logger(&mut guard, &mut logger);
    }
    logger.flush()?;

    Ok(())
}
