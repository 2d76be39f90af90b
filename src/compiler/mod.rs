//! Translation of the name-addressed declaration into index-addressed states.
//!
//! The compiler is pure: it takes ownership of the [`BuilderContext`], moves
//! each state's callables out of it and replaces every destination name with
//! its index from the [`StateIndex`].

pub mod index;

pub use index::StateIndex;

use crate::builder::BuildError;
use crate::core::{split_full_state_name, Action, Condition};
use crate::ir::{
    BuilderContext, ConditionalTransitionContext, StateBuilderContext, TransitionContext,
};

/// Destination resolved to indices.
///
/// Zero indices finish the current machine, one is a jump, two are a
/// submachine call followed by its return address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompiledTransition {
    indices: [usize; 2],
    len: usize,
}

impl CompiledTransition {
    pub const fn finish() -> Self {
        Self {
            indices: [0, 0],
            len: 0,
        }
    }

    pub const fn jump(target: usize) -> Self {
        Self {
            indices: [target, 0],
            len: 1,
        }
    }

    pub const fn call(target: usize, return_to: usize) -> Self {
        Self {
            indices: [target, return_to],
            len: 2,
        }
    }

    /// Indices in push order: the state to run next comes first.
    pub fn as_slice(&self) -> &[usize] {
        &self.indices[..self.len]
    }

    /// State run right after this transition, if any.
    pub fn target(&self) -> Option<usize> {
        self.as_slice().first().copied()
    }

    pub fn is_finish(&self) -> bool {
        self.len == 0
    }
}

pub struct CompiledConditionalTransition<B> {
    pub condition: Condition<B>,
    pub transition: CompiledTransition,
}

pub struct CompiledState<B> {
    pub conditional_transitions: Vec<CompiledConditionalTransition<B>>,
    pub action: Action<B>,
    pub default_transition: CompiledTransition,
}

/// Resolve a destination against the index.
///
/// # Panics
///
/// If the destination has a return address but no target. The builder and
/// the loader never produce one.
pub fn compile_transition(
    destination: &TransitionContext,
    index: &StateIndex,
) -> Result<CompiledTransition, BuildError> {
    match (destination.primary(), destination.secondary()) {
        (None, None) => Ok(CompiledTransition::finish()),
        (Some(target), None) => Ok(CompiledTransition::jump(index.get_state_index(target)?)),
        (Some(target), Some(return_to)) => Ok(CompiledTransition::call(
            index.get_state_index(target)?,
            index.get_state_index(return_to)?,
        )),
        (None, Some(return_to)) => {
            unreachable!("return address '{return_to}' recorded without a call target")
        }
    }
}

fn compile_conditional_transition<B>(
    conditional: ConditionalTransitionContext<B>,
    index: &StateIndex,
) -> Result<CompiledConditionalTransition<B>, BuildError> {
    Ok(CompiledConditionalTransition {
        transition: compile_transition(&conditional.destination, index)?,
        condition: conditional.condition,
    })
}

pub fn compile_state<B>(
    state: StateBuilderContext<B>,
    index: &StateIndex,
) -> Result<CompiledState<B>, BuildError> {
    let default_transition = compile_transition(&state.destination, index)?;
    let conditional_transitions = state
        .conditions
        .into_iter()
        .map(|conditional| compile_conditional_transition(conditional, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompiledState {
        conditional_transitions,
        action: state.action,
        default_transition,
    })
}

/// Compile every indexed state. Position `i` of the result is the state with
/// index `i`.
pub fn compile_machine<B: 'static>(
    context: &mut BuilderContext<B>,
    index: &StateIndex,
) -> Result<Vec<CompiledState<B>>, BuildError> {
    index
        .indexed_state_names()
        .iter()
        .map(|full_name| {
            let (machine, state) = split_full_state_name(full_name)?;
            let state = context.take_state(machine, state)?;
            compile_state(state, index)
        })
        .collect()
}

/// Compile the global error condition, or a condition that never holds when
/// none was declared.
pub fn compile_global_error_transition<B: 'static>(
    context: &mut BuilderContext<B>,
    index: &StateIndex,
) -> Result<CompiledConditionalTransition<B>, BuildError> {
    match context.take_error_condition() {
        Some(condition) => Ok(CompiledConditionalTransition {
            condition,
            transition: compile_transition(context.error_destination(), index)?,
        }),
        None => Ok(CompiledConditionalTransition {
            condition: Condition::never(),
            transition: CompiledTransition::finish(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StateStack, ERROR_MACHINE_NAME, MAIN_MACHINE_NAME};

    fn index_of(names: &[&str]) -> StateIndex {
        let mut index = StateIndex::new();
        for name in names {
            index.add_name_to_index(*name).unwrap();
        }
        index
    }

    #[test]
    fn transitions_resolve_to_indices() {
        let index = index_of(&["m:a", "m:b", "n:c"]);

        assert_eq!(
            compile_transition(&TransitionContext::finish(), &index).unwrap(),
            CompiledTransition::finish()
        );
        assert_eq!(
            compile_transition(&TransitionContext::to("m:b"), &index)
                .unwrap()
                .as_slice(),
            &[1]
        );
        assert_eq!(
            compile_transition(&TransitionContext::call("n:c", "m:a"), &index)
                .unwrap()
                .as_slice(),
            &[2, 0]
        );
    }

    #[test]
    fn unknown_destination_is_an_error() {
        let index = index_of(&["m:a"]);
        assert!(matches!(
            compile_transition(&TransitionContext::to("m:zzz"), &index),
            Err(BuildError::UndefinedState { state }) if state == "m:zzz"
        ));
    }

    #[test]
    #[should_panic(expected = "without a call target")]
    fn return_address_without_target_is_an_invariant_violation() {
        let index = index_of(&["m:a"]);
        let destination = TransitionContext {
            primary: None,
            secondary: Some("m:a".to_string()),
        };
        let _ = compile_transition(&destination, &index);
    }

    #[test]
    fn compiled_transition_accessors() {
        assert_eq!(CompiledTransition::finish().target(), None);
        assert!(CompiledTransition::finish().is_finish());
        assert_eq!(CompiledTransition::call(3, 1).target(), Some(3));
        assert!(!CompiledTransition::jump(0).is_finish());
    }

    #[test]
    fn machine_is_compiled_in_index_order() {
        let mut context = BuilderContext::<StateStack>::new();
        context.insert_machine(MAIN_MACHINE_NAME).unwrap();
        context.set_entry_state("Start").unwrap();
        context.set_default_destination(TransitionContext::to("__main__:Alpha"));
        context.insert_state("Alpha").unwrap();
        context.add_conditional_transition(Condition::never(), TransitionContext::finish());
        context.set_default_destination(TransitionContext::to("__main__:Start"));

        let index = StateIndex::from_context(&context).unwrap();
        let states = compile_machine(&mut context, &index).unwrap();

        assert_eq!(states.len(), index.len());
        assert_eq!(states[0].default_transition.as_slice(), &[1]);
        assert!(states[0].conditional_transitions.is_empty());
        assert_eq!(states[1].default_transition.as_slice(), &[0]);
        assert_eq!(states[1].conditional_transitions.len(), 1);
    }

    #[test]
    fn missing_global_condition_never_fires() {
        let mut context = BuilderContext::<StateStack>::new();
        context.insert_machine(MAIN_MACHINE_NAME).unwrap();
        context.set_entry_state("Start").unwrap();
        let index = StateIndex::from_context(&context).unwrap();

        let global = compile_global_error_transition(&mut context, &index).unwrap();

        assert!(!global.condition.check(&StateStack::new()));
        assert!(global.transition.is_finish());
    }

    #[test]
    fn global_condition_targets_error_entry() {
        let mut context = BuilderContext::<StateStack>::new();
        context.insert_machine(ERROR_MACHINE_NAME).unwrap();
        context.set_entry_state("Recover").unwrap();
        context.set_global_error_condition(Condition::new(|_: &StateStack| true));
        context.insert_machine(MAIN_MACHINE_NAME).unwrap();
        context.set_entry_state("Start").unwrap();
        let index = StateIndex::from_context(&context).unwrap();

        let global = compile_global_error_transition(&mut context, &index).unwrap();

        assert!(global.condition.check(&StateStack::new()));
        assert_eq!(global.transition.as_slice(), &[1]);
    }
}
