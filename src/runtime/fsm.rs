//! Compiled machine and its tick interpreter.

use crate::builder::BuildError;
use crate::compiler::{
    compile_global_error_transition, compile_machine, CompiledConditionalTransition, CompiledState,
    CompiledTransition, StateIndex,
};
use crate::core::{Blackboard, ENTRY_STATE_INDEX};
use crate::ir::BuilderContext;
use crate::logging::{Logger, NullLogger, TickRecord};
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Target name reported when a tick empties the agent's stack.
pub const FINISHING_TARGET_NAME: &str = "Finishing";

/// Which part of a state decided the outcome of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickBranch {
    /// The global error condition held.
    GlobalError,
    /// The conditional transition at this position held.
    Condition(usize),
    /// No condition held; the default action ran.
    Default,
}

impl fmt::Display for TickBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickBranch::GlobalError => write!(f, "Global error condition hit"),
            TickBranch::Condition(index) => write!(f, "Condition {index} hit"),
            TickBranch::Default => write!(f, "Behavior executed"),
        }
    }
}

/// Compiled hierarchical state machine.
///
/// An `Fsm` is immutable once built and holds no per-agent data: progress
/// lives in each agent's [`Blackboard`]. One machine can therefore tick any
/// number of blackboards, from any number of threads.
///
/// State indices are laid out so that index 0 is the main entry state and
/// indices `1..error_state_end` are the error machine's states.
pub struct Fsm<B> {
    id: Uuid,
    state_names: Vec<String>,
    states: Vec<CompiledState<B>>,
    error_state_end: usize,
    global_error: CompiledConditionalTransition<B>,
}

impl<B: Blackboard> Fsm<B> {
    /// Resolve placeholders, index and compile a declaration.
    pub fn from_context(mut context: BuilderContext<B>) -> Result<Self, BuildError> {
        context.resolve_restart_placeholders()?;

        let index = StateIndex::from_context(&context)?;
        let error_state_end = context.error_state_count() + 1;
        let states = compile_machine(&mut context, &index)?;
        let global_error = compile_global_error_transition(&mut context, &index)?;

        let fsm = Self {
            id: Uuid::new_v4(),
            state_names: index.into_names(),
            states,
            error_state_end,
            global_error,
        };

        tracing::debug!(
            machine_id = %fsm.id,
            states = fsm.states.len(),
            error_states = error_state_end - 1,
            "Compiled state machine"
        );

        Ok(fsm)
    }

    /// Run one step for `blackboard` without logging.
    pub fn tick(&self, blackboard: &mut B) {
        self.tick_with_logger(blackboard, &mut NullLogger);
    }

    /// Run one step for `blackboard` and report it to `logger`.
    ///
    /// Does nothing once the agent has finished. Otherwise the state on top
    /// of the stack is popped and exactly one of these happens:
    ///
    /// 1. Outside the error machine, the global error condition holds: the
    ///    stack is cleared and the error machine's entry state is pushed.
    /// 2. The first conditional transition that holds is taken. Entering the
    ///    error machine this way clears the stack first.
    /// 3. The default action runs and the default transition is taken.
    ///
    /// A transition with no target pushes nothing, so the agent resumes its
    /// caller's return address or finishes.
    ///
    /// # Panics
    ///
    /// If the top of the stack is not an index of this machine.
    pub fn tick_with_logger(&self, blackboard: &mut B, logger: &mut dyn Logger) {
        let started = Instant::now();
        let Some(current) = blackboard.state_stack_mut().pop() else {
            return;
        };

        assert!(
            current < self.states.len(),
            "state index {current} out of bounds for a machine with {} states",
            self.states.len()
        );
        let state = &self.states[current];

        let (branch, transition) = self.select_transition(state, current, blackboard);
        blackboard
            .state_stack_mut()
            .push_transition(transition.as_slice());

        let target_state = match transition.target() {
            Some(target) => self.name_of(target),
            None => blackboard
                .state_stack()
                .top()
                .map_or(FINISHING_TARGET_NAME, |resumed| self.name_of(resumed)),
        };

        logger.log(&TickRecord {
            machine_id: self.id,
            blackboard_id: blackboard as *const B as usize,
            current_state: self.name_of(current),
            blackboard: blackboard.snapshot(),
            branch,
            target_state,
            duration: started.elapsed(),
        });
    }

    fn select_transition(
        &self,
        state: &CompiledState<B>,
        current: usize,
        blackboard: &mut B,
    ) -> (TickBranch, CompiledTransition) {
        if !self.is_error_index(current) && self.global_error.condition.check(blackboard) {
            blackboard.state_stack_mut().clear();
            return (TickBranch::GlobalError, self.global_error.transition);
        }

        let hit = state
            .conditional_transitions
            .iter()
            .position(|conditional| conditional.condition.check(blackboard));

        if let Some(position) = hit {
            let transition = state.conditional_transitions[position].transition;
            if let [target] = transition.as_slice() {
                if self.is_error_index(*target) {
                    blackboard.state_stack_mut().clear();
                }
            }
            return (TickBranch::Condition(position), transition);
        }

        state.action.run(blackboard);
        (TickBranch::Default, state.default_transition)
    }

    /// The agent's stack is empty.
    pub fn is_finished(&self, blackboard: &B) -> bool {
        blackboard.state_stack().is_empty()
    }

    /// The agent is in one of the error machine's states.
    pub fn is_errored(&self, blackboard: &B) -> bool {
        blackboard
            .state_stack()
            .top()
            .is_some_and(|top| self.is_error_index(top))
    }

    /// Full name of the state on top of the agent's stack.
    pub fn current_state_name(&self, blackboard: &B) -> Option<&str> {
        blackboard
            .state_stack()
            .top()
            .and_then(|top| self.state_name(top))
    }
}

impl<B> Fsm<B> {
    /// Random id of this compiled machine, reported in tick records.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of compiled states across all machines.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Full name (`machine:state`) of a compiled state.
    pub fn state_name(&self, index: usize) -> Option<&str> {
        self.state_names.get(index).map(String::as_str)
    }

    /// Full state names ordered by index.
    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    fn name_of(&self, index: usize) -> &str {
        self.state_name(index).unwrap_or_default()
    }

    fn is_error_index(&self, index: usize) -> bool {
        index > ENTRY_STATE_INDEX && index < self.error_state_end
    }
}

impl<B> fmt::Debug for Fsm<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fsm")
            .field("id", &self.id)
            .field("states", &self.state_names)
            .field("error_state_end", &self.error_state_end)
            .finish_non_exhaustive()
    }
}
