//! Name-addressed intermediate representation filled in by the builder.
//!
//! Machines map to states, states hold ordered conditional transitions plus
//! a default action and a default transition. Destinations are recorded as
//! full state names (`machine:state`) and only resolved to indices when the
//! whole context is compiled, so a machine may name states it has not
//! declared yet.
//!
//! The public surface is read-only: exporters walk it through
//! [`FinalBuilder::context`](crate::builder::FinalBuilder::context). Only the
//! builder and the loader mutate it.

use crate::builder::BuildError;
use crate::core::{
    full_state_name, Action, Condition, ERROR_MACHINE_NAME, MAIN_MACHINE_NAME, RESTART_PLACEHOLDER,
};
use std::collections::BTreeMap;

/// Destination of a transition, by full state name.
///
/// No primary means "finish the current machine". A secondary is the
/// return address pushed beneath a submachine call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionContext {
    pub(crate) primary: Option<String>,
    pub(crate) secondary: Option<String>,
}

impl TransitionContext {
    pub fn finish() -> Self {
        Self::default()
    }

    pub fn to(target: impl Into<String>) -> Self {
        Self {
            primary: Some(target.into()),
            secondary: None,
        }
    }

    pub fn call(target: impl Into<String>, return_to: impl Into<String>) -> Self {
        Self {
            primary: Some(target.into()),
            secondary: Some(return_to.into()),
        }
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn secondary(&self) -> Option<&str> {
        self.secondary.as_deref()
    }

    pub fn is_finish(&self) -> bool {
        self.primary.is_none()
    }

    pub(crate) fn is_restart(&self) -> bool {
        self.primary.as_deref() == Some(RESTART_PLACEHOLDER)
    }
}

/// A condition paired with the destination taken when it holds.
#[derive(Debug)]
pub struct ConditionalTransitionContext<B> {
    pub(crate) condition: Condition<B>,
    pub(crate) destination: TransitionContext,
}

impl<B> ConditionalTransitionContext<B> {
    pub fn destination(&self) -> &TransitionContext {
        &self.destination
    }
}

#[derive(Debug)]
pub struct StateBuilderContext<B> {
    pub(crate) conditions: Vec<ConditionalTransitionContext<B>>,
    pub(crate) action: Action<B>,
    pub(crate) destination: TransitionContext,
}

impl<B: 'static> Default for StateBuilderContext<B> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            action: Action::noop(),
            destination: TransitionContext::finish(),
        }
    }
}

impl<B> StateBuilderContext<B> {
    /// Conditional transitions in evaluation order.
    pub fn conditions(&self) -> &[ConditionalTransitionContext<B>] {
        &self.conditions
    }

    /// Destination taken after the default action.
    pub fn destination(&self) -> &TransitionContext {
        &self.destination
    }
}

#[derive(Debug)]
pub struct MachineBuilderContext<B> {
    pub(crate) entry_state: String,
    pub(crate) current_state: String,
    pub(crate) states: BTreeMap<String, StateBuilderContext<B>>,
}

impl<B> Default for MachineBuilderContext<B> {
    fn default() -> Self {
        Self {
            entry_state: String::new(),
            current_state: String::new(),
            states: BTreeMap::new(),
        }
    }
}

impl<B> MachineBuilderContext<B> {
    pub fn entry_state(&self) -> &str {
        &self.entry_state
    }

    /// States sorted by name.
    pub fn states(&self) -> impl Iterator<Item = (&str, &StateBuilderContext<B>)> {
        self.states
            .iter()
            .map(|(name, state)| (name.as_str(), state))
    }

    pub fn state(&self, name: &str) -> Option<&StateBuilderContext<B>> {
        self.states.get(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Everything declared so far, plus the construction cursor.
#[derive(Debug)]
pub struct BuilderContext<B> {
    pub(crate) current_machine: String,
    pub(crate) machines: BTreeMap<String, MachineBuilderContext<B>>,
    pub(crate) error_condition: Option<Condition<B>>,
    pub(crate) error_destination: TransitionContext,
}

impl<B> Default for BuilderContext<B> {
    fn default() -> Self {
        Self {
            current_machine: String::new(),
            machines: BTreeMap::new(),
            error_condition: None,
            error_destination: TransitionContext::finish(),
        }
    }
}

impl<B> BuilderContext<B> {
    /// Machines sorted by name. Reserved machines are included under their
    /// reserved names.
    pub fn machines(&self) -> impl Iterator<Item = (&str, &MachineBuilderContext<B>)> {
        self.machines
            .iter()
            .map(|(name, machine)| (name.as_str(), machine))
    }

    pub fn machine(&self, name: &str) -> Option<&MachineBuilderContext<B>> {
        self.machines.get(name)
    }

    pub fn has_error_machine(&self) -> bool {
        self.machines.contains_key(ERROR_MACHINE_NAME)
    }

    pub fn has_global_error_condition(&self) -> bool {
        self.error_condition.is_some()
    }

    /// Where the global error condition sends an agent: the error machine's
    /// entry state.
    pub fn error_destination(&self) -> &TransitionContext {
        &self.error_destination
    }

    pub fn main_entry_state(&self) -> Option<&str> {
        self.machines
            .get(MAIN_MACHINE_NAME)
            .map(|machine| machine.entry_state.as_str())
    }

    pub fn current_machine(&self) -> &str {
        &self.current_machine
    }

    /// Number of states in the error machine, zero when there is none.
    pub fn error_state_count(&self) -> usize {
        self.machines
            .get(ERROR_MACHINE_NAME)
            .map_or(0, MachineBuilderContext::len)
    }
}

impl<B: 'static> BuilderContext<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a machine and move the cursor to it, replacing any previous
    /// declaration under the same name.
    pub(crate) fn begin_machine(&mut self, name: &str) {
        self.current_machine = name.to_string();
        self.machines
            .insert(name.to_string(), MachineBuilderContext::default());
    }

    pub(crate) fn insert_machine(&mut self, name: &str) -> Result<(), BuildError> {
        if self.machines.contains_key(name) {
            return Err(BuildError::RedeclaredMachine {
                machine: name.to_string(),
            });
        }

        self.begin_machine(name);
        Ok(())
    }

    pub(crate) fn insert_state(&mut self, name: &str) -> Result<(), BuildError> {
        let machine_name = self.current_machine.clone();
        let machine = self.current_machine_mut();

        if machine.states.contains_key(name) {
            return Err(BuildError::RedeclaredState {
                machine: machine_name,
                state: name.to_string(),
            });
        }

        machine.current_state = name.to_string();
        machine
            .states
            .insert(name.to_string(), StateBuilderContext::default());
        Ok(())
    }

    pub(crate) fn set_entry_state(&mut self, name: &str) -> Result<(), BuildError> {
        self.insert_state(name)?;
        self.current_machine_mut().entry_state = name.to_string();

        if self.current_machine == ERROR_MACHINE_NAME {
            self.error_destination =
                TransitionContext::to(full_state_name(ERROR_MACHINE_NAME, name));
        }

        Ok(())
    }

    fn current_machine_mut(&mut self) -> &mut MachineBuilderContext<B> {
        self.machines
            .entry(self.current_machine.clone())
            .or_default()
    }

    fn current_state_mut(&mut self) -> &mut StateBuilderContext<B> {
        let machine = self.current_machine_mut();
        machine
            .states
            .entry(machine.current_state.clone())
            .or_default()
    }

    pub(crate) fn set_action(&mut self, action: Action<B>) {
        self.current_state_mut().action = action;
    }

    pub(crate) fn set_default_destination(&mut self, destination: TransitionContext) {
        self.current_state_mut().destination = destination;
    }

    pub(crate) fn add_conditional_transition(
        &mut self,
        condition: Condition<B>,
        destination: TransitionContext,
    ) {
        self.current_state_mut()
            .conditions
            .push(ConditionalTransitionContext {
                condition,
                destination,
            });
    }

    pub(crate) fn set_global_error_condition(&mut self, condition: Condition<B>) {
        self.error_condition = Some(condition);
    }

    /// Full name of `state` inside the machine under construction.
    pub(crate) fn local_state(&self, state: &str) -> String {
        full_state_name(&self.current_machine, state)
    }

    /// Full name of the current machine's state under construction.
    pub(crate) fn current_state_full_name(&self) -> String {
        let state = self
            .machines
            .get(&self.current_machine)
            .map_or("", |machine| machine.current_state.as_str());
        full_state_name(&self.current_machine, state)
    }

    /// Full name of the entry state of an already declared submachine.
    pub(crate) fn submachine_entry(&self, machine: &str) -> Result<String, BuildError> {
        if machine == self.current_machine {
            return Err(BuildError::SelfInvocation {
                machine: machine.to_string(),
            });
        }

        self.machines
            .get(machine)
            .map(|target| full_state_name(machine, &target.entry_state))
            .ok_or_else(|| BuildError::UndeclaredMachine {
                machine: machine.to_string(),
            })
    }

    pub(crate) fn error_entry_destination(&self) -> Result<TransitionContext, BuildError> {
        self.machines
            .get(ERROR_MACHINE_NAME)
            .map(|machine| {
                TransitionContext::to(full_state_name(ERROR_MACHINE_NAME, &machine.entry_state))
            })
            .ok_or(BuildError::NoErrorMachine)
    }

    /// Point every restart placeholder at the main machine's entry state.
    pub(crate) fn resolve_restart_placeholders(&mut self) -> Result<(), BuildError> {
        let entry = self
            .main_entry_state()
            .map(|state| full_state_name(MAIN_MACHINE_NAME, state))
            .ok_or(BuildError::MissingMainMachine)?;

        let mut rewritten = 0usize;
        for machine in self.machines.values_mut() {
            for state in machine.states.values_mut() {
                let destinations = state
                    .conditions
                    .iter_mut()
                    .map(|conditional| &mut conditional.destination)
                    .chain(std::iter::once(&mut state.destination));

                for destination in destinations {
                    if destination.is_restart() {
                        destination.primary = Some(entry.clone());
                        rewritten += 1;
                    }
                }
            }
        }

        tracing::trace!(rewritten, entry = %entry, "Resolved restart placeholders");
        Ok(())
    }

    /// Move a state's callables out of the context for compilation.
    pub(crate) fn take_state(
        &mut self,
        machine: &str,
        state: &str,
    ) -> Result<StateBuilderContext<B>, BuildError> {
        self.machines
            .get_mut(machine)
            .and_then(|machine| machine.states.remove(state))
            .ok_or_else(|| BuildError::UndefinedState {
                state: full_state_name(machine, state),
            })
    }

    pub(crate) fn take_error_condition(&mut self) -> Option<Condition<B>> {
        self.error_condition.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Context = BuilderContext<crate::core::StateStack>;

    fn context_with_main() -> Context {
        let mut context = Context::new();
        context.insert_machine(MAIN_MACHINE_NAME).unwrap();
        context.set_entry_state("Start").unwrap();
        context
    }

    #[test]
    fn transition_constructors() {
        assert!(TransitionContext::finish().is_finish());
        assert_eq!(TransitionContext::to("m:a").primary(), Some("m:a"));

        let call = TransitionContext::call("m:a", "n:b");
        assert_eq!(call.primary(), Some("m:a"));
        assert_eq!(call.secondary(), Some("n:b"));
        assert!(!call.is_finish());
    }

    #[test]
    fn redeclared_machine_is_rejected() {
        let mut context = context_with_main();
        assert_eq!(
            context.insert_machine(MAIN_MACHINE_NAME),
            Err(BuildError::RedeclaredMachine {
                machine: MAIN_MACHINE_NAME.to_string()
            })
        );
    }

    #[test]
    fn redeclared_state_is_rejected() {
        let mut context = context_with_main();
        assert!(matches!(
            context.insert_state("Start"),
            Err(BuildError::RedeclaredState { state, .. }) if state == "Start"
        ));
    }

    #[test]
    fn same_state_name_in_two_machines_is_allowed() {
        let mut context = Context::new();
        context.insert_machine("Sub").unwrap();
        context.set_entry_state("Start").unwrap();
        context.insert_machine(MAIN_MACHINE_NAME).unwrap();
        assert!(context.set_entry_state("Start").is_ok());
    }

    #[test]
    fn entry_state_of_error_machine_becomes_error_destination() {
        let mut context = Context::new();
        context.insert_machine(ERROR_MACHINE_NAME).unwrap();
        context.set_entry_state("Recover").unwrap();

        assert_eq!(
            context.error_destination().primary(),
            Some("__error__:Recover")
        );
        assert_eq!(
            context.error_entry_destination().unwrap(),
            TransitionContext::to("__error__:Recover")
        );
        assert_eq!(context.error_state_count(), 1);
    }

    #[test]
    fn error_entry_requires_error_machine() {
        let context = context_with_main();
        assert_eq!(
            context.error_entry_destination(),
            Err(BuildError::NoErrorMachine)
        );
    }

    #[test]
    fn submachine_entry_checks_declaration_order() {
        let mut context = Context::new();
        context.insert_machine("Sub").unwrap();
        context.set_entry_state("Begin").unwrap();

        assert!(matches!(
            context.submachine_entry("Sub"),
            Err(BuildError::SelfInvocation { .. })
        ));
        assert!(matches!(
            context.submachine_entry("Later"),
            Err(BuildError::UndeclaredMachine { machine }) if machine == "Later"
        ));

        context.insert_machine(MAIN_MACHINE_NAME).unwrap();
        assert_eq!(context.submachine_entry("Sub").unwrap(), "Sub:Begin");
    }

    #[test]
    fn conditions_keep_declaration_order() {
        let mut context = context_with_main();
        context.add_conditional_transition(Condition::never(), TransitionContext::to("__main__:A"));
        context.add_conditional_transition(Condition::never(), TransitionContext::to("__main__:B"));

        let state = context
            .machine(MAIN_MACHINE_NAME)
            .unwrap()
            .state("Start")
            .unwrap();
        let targets: Vec<_> = state
            .conditions()
            .iter()
            .map(|c| c.destination().primary())
            .collect();
        assert_eq!(targets, vec![Some("__main__:A"), Some("__main__:B")]);
    }

    #[test]
    fn restart_placeholders_point_at_main_entry() {
        let mut context = Context::new();
        context.insert_machine(ERROR_MACHINE_NAME).unwrap();
        context.set_entry_state("Recover").unwrap();
        context.add_conditional_transition(
            Condition::never(),
            TransitionContext::to(RESTART_PLACEHOLDER),
        );
        context.set_default_destination(TransitionContext::to(RESTART_PLACEHOLDER));
        context.insert_machine(MAIN_MACHINE_NAME).unwrap();
        context.set_entry_state("Start").unwrap();

        context.resolve_restart_placeholders().unwrap();

        let state = context
            .machine(ERROR_MACHINE_NAME)
            .unwrap()
            .state("Recover")
            .unwrap();
        assert_eq!(state.destination().primary(), Some("__main__:Start"));
        assert_eq!(
            state.conditions()[0].destination().primary(),
            Some("__main__:Start")
        );
    }

    #[test]
    fn restart_resolution_requires_main_machine() {
        let mut context = Context::new();
        assert_eq!(
            context.resolve_restart_placeholders(),
            Err(BuildError::MissingMainMachine)
        );
    }

    #[test]
    fn take_state_moves_state_out() {
        let mut context = context_with_main();
        assert!(context.take_state(MAIN_MACHINE_NAME, "Start").is_ok());
        assert_eq!(
            context.take_state(MAIN_MACHINE_NAME, "Start").err(),
            Some(BuildError::UndefinedState {
                state: "__main__:Start".to_string()
            })
        );
    }
}
