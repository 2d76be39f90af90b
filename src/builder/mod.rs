//! Phased builder for hierarchical machines.
//!
//! Every phase is a separate type that consumes itself and returns the next
//! phase, so the grammar of a machine declaration is checked by the
//! compiler:
//!
//! ```text
//! Builder ─┬─ with_error_machine ─ (no_global_entry_condition | use_global_entry_condition)
//!          │      └─ error machine ─ done ─┐
//!          └─ with_no_error_machine ───────┴─ MainBuilder
//! MainBuilder ─ with_submachine(name)* ─ with_main_machine ─ done ─ build
//! ```
//!
//! Inside a machine, `with_entry_state` opens the first state, and every
//! state body is `when(..)` transitions followed by `exec(..)` and a default
//! destination. Mistakes that the types cannot rule out (duplicate names,
//! calls to undeclared machines, unknown target states) are returned as
//! [`BuildError`] from the call that detects them.
//!
//! # Example
//!
//! ```
//! use hfsm::builder::Builder;
//! use hfsm::core::StateStack;
//!
//! let fsm = Builder::<StateStack>::new()
//!     .with_no_error_machine()
//!     .with_main_machine()
//!     .with_entry_state("Start")?
//!     .exec(|_| {})
//!     .and_go_to_state("End")?
//!     .with_state("End")?
//!     .exec(|_| {})
//!     .and_finish()
//!     .done()
//!     .build()?;
//!
//! let mut stack = StateStack::new();
//! fsm.tick(&mut stack);
//! fsm.tick(&mut stack);
//! assert!(fsm.is_finished(&stack));
//! # Ok::<(), hfsm::builder::BuildError>(())
//! ```

pub mod error;
pub mod kind;
pub mod machine;
pub mod macros;
pub mod state;
pub mod transition;

pub use error::BuildError;
pub use kind::{CallerKind, ErrorMachine, MachineKind, MainMachine, Submachine};
pub use machine::{MachineBuilder, MachineEntryBuilder};
pub use state::{ConditionalStateBuilder, StateBuilder};
pub use transition::{
    ConditionBuilder, ConditionalCallBuilder, DefaultCallBuilder, DefaultTransitionBuilder,
};

use crate::core::{Blackboard, Condition, IntoMachineId, ERROR_MACHINE_NAME, MAIN_MACHINE_NAME};
use crate::export::Exporter;
use crate::ir::BuilderContext;
use crate::runtime::Fsm;

/// Entry point of a machine declaration.
pub struct Builder<B> {
    context: BuilderContext<B>,
}

impl<B: Blackboard> Builder<B> {
    pub fn new() -> Self {
        Self {
            context: BuilderContext::new(),
        }
    }

    /// Declare a machine without an error machine. `error()` transitions
    /// will be rejected.
    pub fn with_no_error_machine(self) -> MainBuilder<B> {
        MainBuilder::new(self.context)
    }

    /// Declare the error machine first. It may restart into the main
    /// machine, which is resolved when the machine is built.
    pub fn with_error_machine(mut self) -> GlobalErrorPolicyBuilder<B> {
        self.context.begin_machine(ERROR_MACHINE_NAME);
        GlobalErrorPolicyBuilder {
            context: self.context,
        }
    }
}

impl<B: Blackboard> Default for Builder<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Choose whether the error machine is entered automatically.
pub struct GlobalErrorPolicyBuilder<B> {
    context: BuilderContext<B>,
}

impl<B: Blackboard> GlobalErrorPolicyBuilder<B> {
    /// The error machine is only reachable through `error()` transitions.
    pub fn no_global_entry_condition(self) -> MachineEntryBuilder<B, ErrorMachine> {
        MachineEntryBuilder::new(self.context)
    }

    /// Evaluate `condition` at the start of every tick outside the error
    /// machine. When it holds, the agent's stack is dropped and it enters
    /// the error machine.
    pub fn use_global_entry_condition<F>(
        mut self,
        condition: F,
    ) -> MachineEntryBuilder<B, ErrorMachine>
    where
        F: Fn(&B) -> bool + Send + Sync + 'static,
    {
        self.context
            .set_global_error_condition(Condition::new(condition));
        MachineEntryBuilder::new(self.context)
    }
}

/// Declare submachines, then the main machine.
pub struct MainBuilder<B> {
    context: BuilderContext<B>,
}

impl<B: Blackboard> MainBuilder<B> {
    pub(crate) fn new(context: BuilderContext<B>) -> Self {
        Self { context }
    }

    /// Declare a named submachine. Only machines declared after it may call
    /// it, which rules out recursion.
    pub fn with_submachine(
        mut self,
        name: impl IntoMachineId,
    ) -> Result<MachineEntryBuilder<B, Submachine>, BuildError> {
        let name = name.into_machine_id()?;
        self.context.insert_machine(name.as_str())?;
        Ok(MachineEntryBuilder::new(self.context))
    }

    /// Start the main machine, which must be declared last.
    pub fn with_main_machine(mut self) -> MachineEntryBuilder<B, MainMachine> {
        self.context.begin_machine(MAIN_MACHINE_NAME);
        MachineEntryBuilder::new(self.context)
    }
}

/// Every machine is declared; export or compile.
pub struct FinalBuilder<B> {
    context: BuilderContext<B>,
}

impl<B: Blackboard> FinalBuilder<B> {
    pub(crate) fn new(context: BuilderContext<B>) -> Self {
        Self { context }
    }

    /// Read-only view of everything declared so far.
    pub fn context(&self) -> &BuilderContext<B> {
        &self.context
    }

    /// Hand the declaration to an exporter before building.
    pub fn export_diagram<E>(self, exporter: &mut E) -> Result<Self, E::Error>
    where
        E: Exporter<B>,
    {
        exporter.export_diagram(&self.context)?;
        Ok(self)
    }

    /// Resolve names, index every state and compile the machine.
    pub fn build(self) -> Result<Fsm<B>, BuildError> {
        Fsm::from_context(self.context)
    }
}
