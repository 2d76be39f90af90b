//! Core types shared by the builder, the compiler and the runtime.
//!
//! This module contains the pieces every other layer speaks in:
//! - Validated machine and state identifiers
//! - Conditions and actions evaluated against a blackboard
//! - The blackboard contract and its state stack
//!
//! Nothing in here performs I/O.

mod blackboard;
mod guard;
mod id;

pub use blackboard::{Blackboard, StateStack, ENTRY_STATE_INDEX};
pub use guard::{and, merge, not, or, Action, Condition};
pub use id::{
    full_state_name, identifier_violation, split_full_state_name, IdentifierViolation,
    IntoMachineId, IntoStateId, MachineId, StateId, ERROR_MACHINE_NAME, FULL_NAME_SEPARATOR,
    MAIN_MACHINE_NAME, RESTART_STATE_NAME,
};

pub(crate) use id::RESTART_PLACEHOLDER;
