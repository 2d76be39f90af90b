//! Machines defined as data.
//!
//! A [`FsmDefinition`] describes the same shape the builder declares, with
//! conditions and actions referred to by name. Names are resolved against a
//! [`Registry`], the result goes through the same declaration rules as the
//! builder, and it is compiled by the same pipeline.
//!
//! The first state listed for a machine is its entry state. Submachines are
//! declared in list order, so a submachine may only call the ones listed
//! before it.
//!
//! ```json
//! {
//!   "main_machine": {
//!     "states": [
//!       {
//!         "name": "Start",
//!         "conditions": [
//!           { "when": "isEof", "then": { "kind": "state", "state": "End" } }
//!         ],
//!         "action": "advance",
//!         "default": { "kind": "loop" }
//!       },
//!       { "name": "End", "default": { "kind": "finish" } }
//!     ]
//!   }
//! }
//! ```

mod error;
mod registry;

pub use error::LoadError;
pub use registry::Registry;

use crate::core::{
    Blackboard, Condition, MachineId, StateId, ERROR_MACHINE_NAME, MAIN_MACHINE_NAME,
    RESTART_PLACEHOLDER,
};
use crate::ir::{BuilderContext, TransitionContext};
use crate::runtime::Fsm;
use serde::{Deserialize, Serialize};
use std::io::Read;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FsmDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_machine: Option<ErrorMachineDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submachines: Vec<SubmachineDefinition>,
    pub main_machine: MachineDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorMachineDefinition {
    /// Name of the condition checked at the start of every tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_condition: Option<String>,
    pub states: Vec<StateDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmachineDefinition {
    pub name: String,
    pub states: Vec<StateDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineDefinition {
    pub states: Vec<StateDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionalDefinition>,
    /// Name of the default action. No action leaves the blackboard untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub default: TargetDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionalDefinition {
    pub when: String,
    pub then: TargetDefinition,
}

/// Where a transition leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetDefinition {
    /// A state of the same machine.
    State {
        state: String,
    },
    /// Call a submachine, then resume at `then` or finish.
    Machine {
        machine: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        then: Option<String>,
    },
    Loop,
    Finish,
    Error,
    Restart,
}

impl TargetDefinition {
    fn label(&self) -> &'static str {
        match self {
            TargetDefinition::State { .. } => "state",
            TargetDefinition::Machine { .. } => "machine",
            TargetDefinition::Loop => "loop",
            TargetDefinition::Finish => "finish",
            TargetDefinition::Error => "error",
            TargetDefinition::Restart => "restart",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum MachineRole {
    Main,
    Sub,
    Error,
}

impl FsmDefinition {
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, LoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_string(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compile the definition with callables from `registry`.
    pub fn build<B: Blackboard>(&self, registry: &Registry<B>) -> Result<Fsm<B>, LoadError> {
        let context = self.to_context(registry)?;
        Ok(Fsm::from_context(context)?)
    }

    /// Resolve the definition into a builder context, the same value a
    /// [`FinalBuilder`](crate::builder::FinalBuilder) holds.
    ///
    /// Every unknown condition or action name is reported at once.
    pub fn to_context<B: Blackboard>(
        &self,
        registry: &Registry<B>,
    ) -> Result<BuilderContext<B>, LoadError> {
        if let Validation::Failure(unknown) = self.check_callables(registry) {
            return Err(LoadError::UnknownCallables(
                unknown.iter().cloned().collect(),
            ));
        }

        let mut context = BuilderContext::new();

        if let Some(error_machine) = &self.error_machine {
            context.begin_machine(ERROR_MACHINE_NAME);
            if let Some(name) = &error_machine.global_condition {
                context.set_global_error_condition(lookup_condition(registry, name)?);
            }
            load_machine(
                &mut context,
                registry,
                ERROR_MACHINE_NAME,
                &error_machine.states,
                MachineRole::Error,
            )?;
        }

        for submachine in &self.submachines {
            let name = MachineId::new(submachine.name.as_str())?;
            context.insert_machine(name.as_str())?;
            load_machine(
                &mut context,
                registry,
                name.as_str(),
                &submachine.states,
                MachineRole::Sub,
            )?;
        }

        context.begin_machine(MAIN_MACHINE_NAME);
        load_machine(
            &mut context,
            registry,
            MAIN_MACHINE_NAME,
            &self.main_machine.states,
            MachineRole::Main,
        )?;

        Ok(context)
    }

    fn states(&self) -> impl Iterator<Item = &StateDefinition> {
        self.error_machine
            .iter()
            .flat_map(|machine| machine.states.iter())
            .chain(
                self.submachines
                    .iter()
                    .flat_map(|machine| machine.states.iter()),
            )
            .chain(self.main_machine.states.iter())
    }

    fn check_callables<B: Blackboard>(
        &self,
        registry: &Registry<B>,
    ) -> Validation<(), NonEmptyVec<String>> {
        let condition_names = self
            .error_machine
            .iter()
            .filter_map(|machine| machine.global_condition.as_deref())
            .chain(
                self.states()
                    .flat_map(|state| state.conditions.iter().map(|c| c.when.as_str())),
            );
        let action_names = self.states().filter_map(|state| state.action.as_deref());

        let checks: Vec<Validation<(), NonEmptyVec<String>>> = condition_names
            .map(|name| known(registry.has_condition(name), "condition", name))
            .chain(action_names.map(|name| known(registry.has_action(name), "action", name)))
            .collect();

        Validation::all_vec(checks).map(|_| ())
    }
}

fn known(found: bool, kind: &str, name: &str) -> Validation<(), NonEmptyVec<String>> {
    if found {
        Validation::success(())
    } else {
        Validation::fail(format!("{kind} '{name}'"))
    }
}

fn lookup_condition<B: Blackboard>(
    registry: &Registry<B>,
    name: &str,
) -> Result<Condition<B>, LoadError> {
    registry
        .condition(name)
        .ok_or_else(|| LoadError::UnknownCallables(vec![format!("condition '{name}'")]))
}

fn load_machine<B: Blackboard>(
    context: &mut BuilderContext<B>,
    registry: &Registry<B>,
    machine: &str,
    states: &[StateDefinition],
    role: MachineRole,
) -> Result<(), LoadError> {
    let Some((entry, rest)) = states.split_first() else {
        return Err(LoadError::EmptyMachine {
            machine: machine.to_string(),
        });
    };

    let entry_name = StateId::new(entry.name.as_str())?;
    context.set_entry_state(entry_name.as_str())?;
    load_state_body(context, registry, machine, entry, role)?;

    for state in rest {
        let name = StateId::new(state.name.as_str())?;
        context.insert_state(name.as_str())?;
        load_state_body(context, registry, machine, state, role)?;
    }

    Ok(())
}

fn load_state_body<B: Blackboard>(
    context: &mut BuilderContext<B>,
    registry: &Registry<B>,
    machine: &str,
    state: &StateDefinition,
    role: MachineRole,
) -> Result<(), LoadError> {
    for conditional in &state.conditions {
        let condition = lookup_condition(registry, &conditional.when)?;
        let destination = resolve_target(context, machine, &conditional.then, role)?;
        context.add_conditional_transition(condition, destination);
    }

    if let Some(name) = &state.action {
        let action = registry
            .action(name)
            .ok_or_else(|| LoadError::UnknownCallables(vec![format!("action '{name}'")]))?;
        context.set_action(action);
    }

    let destination = resolve_target(context, machine, &state.default, role)?;
    context.set_default_destination(destination);
    Ok(())
}

fn resolve_target<B: Blackboard>(
    context: &BuilderContext<B>,
    machine: &str,
    target: &TargetDefinition,
    role: MachineRole,
) -> Result<TransitionContext, LoadError> {
    let not_allowed = || LoadError::TargetNotAllowed {
        machine: machine.to_string(),
        target: target.label().to_string(),
    };

    match (target, role) {
        (TargetDefinition::State { state }, _) => {
            let state = StateId::new(state.as_str())?;
            Ok(TransitionContext::to(context.local_state(state.as_str())))
        }
        (TargetDefinition::Loop, _) => Ok(TransitionContext::to(context.current_state_full_name())),
        (TargetDefinition::Restart, MachineRole::Error) => {
            Ok(TransitionContext::to(RESTART_PLACEHOLDER))
        }
        (TargetDefinition::Restart, _) => Err(not_allowed()),
        (_, MachineRole::Error) => Err(not_allowed()),
        (TargetDefinition::Machine { machine, then }, _) => {
            let machine = MachineId::new(machine.as_str())?;
            let entry = context.submachine_entry(machine.as_str())?;
            match then {
                Some(state) => {
                    let state = StateId::new(state.as_str())?;
                    Ok(TransitionContext::call(
                        entry,
                        context.local_state(state.as_str()),
                    ))
                }
                None => Ok(TransitionContext::to(entry)),
            }
        }
        (TargetDefinition::Finish, _) => Ok(TransitionContext::finish()),
        (TargetDefinition::Error, _) => Ok(context.error_entry_destination()?),
    }
}
