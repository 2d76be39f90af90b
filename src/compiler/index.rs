//! Dense indexing of full state names.
//!
//! Index 0 always belongs to the main machine's entry state, so a fresh
//! [`StateStack`](crate::core::StateStack) of `[0]` starts every agent there.
//! The error machine's states follow as one contiguous block, which turns
//! "is this agent in the error machine" into a range check.

use crate::builder::BuildError;
use crate::core::{full_state_name, ERROR_MACHINE_NAME, MAIN_MACHINE_NAME};
use crate::ir::{BuilderContext, MachineBuilderContext};
use std::collections::HashMap;

/// Bijection between full state names and indices in `[0, len)`.
#[derive(Debug, Clone, Default)]
pub struct StateIndex {
    name_to_id: HashMap<String, usize>,
    names: Vec<String>,
}

impl StateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next free index to `name`.
    pub fn add_name_to_index(&mut self, name: impl Into<String>) -> Result<usize, BuildError> {
        let name = name.into();
        if self.name_to_id.contains_key(&name) {
            return Err(BuildError::DuplicateIndexEntry { state: name });
        }

        let id = self.names.len();
        self.name_to_id.insert(name.clone(), id);
        self.names.push(name);
        Ok(id)
    }

    pub fn get_state_index(&self, name: &str) -> Result<usize, BuildError> {
        self.name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UndefinedState {
                state: name.to_string(),
            })
    }

    /// Full state names ordered by index.
    pub fn indexed_state_names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    /// Index every state of a declaration.
    ///
    /// Order: main entry state, then the error machine's states, then every
    /// other machine's states. Machines and states are visited in name order,
    /// so the same declaration always produces the same index.
    pub fn from_context<B>(context: &BuilderContext<B>) -> Result<Self, BuildError> {
        let main_entry = context
            .main_entry_state()
            .ok_or(BuildError::MissingMainMachine)?;

        let mut index = Self::new();
        index.add_name_to_index(full_state_name(MAIN_MACHINE_NAME, main_entry))?;

        if let Some(error_machine) = context.machine(ERROR_MACHINE_NAME) {
            index.add_machine(ERROR_MACHINE_NAME, error_machine)?;
        }

        for (name, machine) in context.machines() {
            if name != ERROR_MACHINE_NAME {
                index.add_machine(name, machine)?;
            }
        }

        Ok(index)
    }

    fn add_machine<B>(
        &mut self,
        machine_name: &str,
        machine: &MachineBuilderContext<B>,
    ) -> Result<(), BuildError> {
        for (state_name, _) in machine.states() {
            if machine_name == MAIN_MACHINE_NAME && state_name == machine.entry_state() {
                continue;
            }
            self.add_name_to_index(full_state_name(machine_name, state_name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateStack;

    #[test]
    fn indices_follow_insertion_order() {
        let mut index = StateIndex::new();
        assert_eq!(index.add_name_to_index("a:x").unwrap(), 0);
        assert_eq!(index.add_name_to_index("a:y").unwrap(), 1);

        assert_eq!(index.get_state_index("a:y").unwrap(), 1);
        assert_eq!(index.indexed_state_names(), &["a:x", "a:y"]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut index = StateIndex::new();
        index.add_name_to_index("a:x").unwrap();

        assert_eq!(
            index.add_name_to_index("a:x"),
            Err(BuildError::DuplicateIndexEntry {
                state: "a:x".to_string()
            })
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        let index = StateIndex::new();
        assert!(index.is_empty());
        assert!(matches!(
            index.get_state_index("a:x"),
            Err(BuildError::UndefinedState { .. })
        ));
    }

    #[test]
    fn main_entry_first_then_error_states() {
        let mut context = BuilderContext::<StateStack>::new();
        context.insert_machine(ERROR_MACHINE_NAME).unwrap();
        context.set_entry_state("Recover").unwrap();
        context.insert_state("Alarm").unwrap();
        context.insert_machine("Sub").unwrap();
        context.set_entry_state("Work").unwrap();
        context.insert_machine(MAIN_MACHINE_NAME).unwrap();
        context.set_entry_state("Start").unwrap();
        context.insert_state("Aaa").unwrap();

        let index = StateIndex::from_context(&context).unwrap();

        assert_eq!(
            index.indexed_state_names(),
            &[
                "__main__:Start",
                "__error__:Alarm",
                "__error__:Recover",
                "Sub:Work",
                "__main__:Aaa",
            ]
        );
    }

    #[test]
    fn missing_main_machine_is_reported() {
        let context = BuilderContext::<StateStack>::new();
        assert_eq!(
            StateIndex::from_context(&context).err(),
            Some(BuildError::MissingMainMachine)
        );
    }
}
