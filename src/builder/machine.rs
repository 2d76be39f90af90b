//! Machine-level phases: declaring the entry state, adding further states,
//! and closing the machine.

use crate::builder::error::BuildError;
use crate::builder::kind::{ErrorMachine, MachineKind, MainMachine, Submachine};
use crate::builder::state::StateBuilder;
use crate::builder::{FinalBuilder, MainBuilder};
use crate::core::{Blackboard, IntoStateId};
use crate::ir::BuilderContext;
use std::marker::PhantomData;

/// A machine was opened; its entry state comes next.
pub struct MachineEntryBuilder<B, K> {
    context: BuilderContext<B>,
    _kind: PhantomData<K>,
}

impl<B: Blackboard, K: MachineKind> MachineEntryBuilder<B, K> {
    pub(crate) fn new(context: BuilderContext<B>) -> Self {
        Self {
            context,
            _kind: PhantomData,
        }
    }

    /// Declare the state entered whenever this machine is invoked.
    pub fn with_entry_state(
        mut self,
        name: impl IntoStateId,
    ) -> Result<StateBuilder<B, K>, BuildError> {
        let name = name.into_state_id()?;
        self.context.set_entry_state(name.as_str())?;
        Ok(StateBuilder::new(self.context))
    }
}

/// A state body was completed; declare another state or close the machine.
pub struct MachineBuilder<B, K> {
    context: BuilderContext<B>,
    _kind: PhantomData<K>,
}

impl<B: Blackboard, K: MachineKind> MachineBuilder<B, K> {
    pub(crate) fn new(context: BuilderContext<B>) -> Self {
        Self {
            context,
            _kind: PhantomData,
        }
    }

    /// Declare another state of this machine.
    pub fn with_state(mut self, name: impl IntoStateId) -> Result<StateBuilder<B, K>, BuildError> {
        let name = name.into_state_id()?;
        self.context.insert_state(name.as_str())?;
        Ok(StateBuilder::new(self.context))
    }
}

impl<B: Blackboard> MachineBuilder<B, MainMachine> {
    /// Close the main machine. Nothing else can be declared after it.
    pub fn done(self) -> FinalBuilder<B> {
        FinalBuilder::new(self.context)
    }
}

impl<B: Blackboard> MachineBuilder<B, Submachine> {
    /// Close the submachine; it can now be called by later machines.
    pub fn done(self) -> MainBuilder<B> {
        MainBuilder::new(self.context)
    }
}

impl<B: Blackboard> MachineBuilder<B, ErrorMachine> {
    /// Close the error machine and continue with submachines.
    pub fn done(self) -> MainBuilder<B> {
        MainBuilder::new(self.context)
    }
}
