//! Errors raised while declaring and compiling a machine.

use thiserror::Error;

/// Errors that can occur while building an [`Fsm`](crate::runtime::Fsm).
///
/// Every error is returned by the builder call that detects it. `build()`
/// never hands out a partially compiled machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Identifier is empty")]
    EmptyIdentifier,

    #[error("Identifier '{name}' contains the ':' separator")]
    InvalidIdentifier { name: String },

    #[error("Identifier '{name}' is reserved. Names starting with '__' belong to the library")]
    ReservedIdentifier { name: String },

    #[error("Machine '{machine}' is declared twice")]
    RedeclaredMachine { machine: String },

    #[error("State '{state}' is declared twice in machine '{machine}'")]
    RedeclaredState { machine: String, state: String },

    #[error("Machine '{machine}' is not declared. Declare submachines before the machines that call them")]
    UndeclaredMachine { machine: String },

    #[error("Machine '{machine}' invokes itself")]
    SelfInvocation { machine: String },

    #[error("Transition to the error machine, but no error machine was declared. Call .with_error_machine()")]
    NoErrorMachine,

    #[error("No main machine declared. Call .with_main_machine()")]
    MissingMainMachine,

    #[error("Transition target '{state}' is not a declared state")]
    UndefinedState { state: String },

    #[error("State '{state}' is indexed twice")]
    DuplicateIndexEntry { state: String },

    #[error("'{name}' is not a full state name of the form machine:state")]
    InvalidFullStateName { name: String },
}
