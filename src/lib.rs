//! hfsm: hierarchical finite state machines for many agents
//!
//! A machine is declared once with a phased builder, compiled into a flat,
//! index-addressed form, and then ticked against any number of per-agent
//! blackboards. The compiled [`Fsm`] is immutable and holds no progress of
//! its own; each agent carries a [`StateStack`] in its [`Blackboard`].
//!
//! # Core Concepts
//!
//! - **Machines**: a main machine, optional submachines called like
//!   functions, and an optional error machine
//! - **States**: ordered conditional transitions, then a default action and
//!   a default transition
//! - **Blackboard**: per-agent data plus the stack of state indices
//! - **Tick**: one evaluation of the state on top of the stack
//!
//! # Example
//!
//! ```rust
//! use hfsm::{Blackboard, Builder, StateStack};
//!
//! #[derive(Default)]
//! struct Counter {
//!     stack: StateStack,
//!     count: u32,
//! }
//!
//! impl Blackboard for Counter {
//!     fn state_stack(&self) -> &StateStack {
//!         &self.stack
//!     }
//!
//!     fn state_stack_mut(&mut self) -> &mut StateStack {
//!         &mut self.stack
//!     }
//! }
//!
//! let fsm = Builder::<Counter>::new()
//!     .with_no_error_machine()
//!     .with_main_machine()
//!     .with_entry_state("Count")?
//!     .when(|counter| counter.count == 3)
//!     .finish()
//!     .otherwise_exec(|counter| counter.count += 1)
//!     .and_loop()
//!     .done()
//!     .build()?;
//!
//! let mut counter = Counter::default();
//! while !fsm.is_finished(&counter) {
//!     fsm.tick(&mut counter);
//! }
//! assert_eq!(counter.count, 3);
//! # Ok::<(), hfsm::BuildError>(())
//! ```

pub mod builder;
pub mod compiler;
pub mod core;
pub mod export;
pub mod ir;
pub mod loader;
pub mod logging;
pub mod runtime;

// Re-export commonly used types
pub use builder::{BuildError, Builder};
pub use core::{Action, Blackboard, Condition, MachineId, StateId, StateStack};
pub use export::{Exporter, MermaidExporter};
pub use loader::{FsmDefinition, LoadError, Registry};
pub use logging::{CsvLogger, Logger, NullLogger, TickRecord, TracingLogger};
pub use runtime::{Fsm, TickBranch};
