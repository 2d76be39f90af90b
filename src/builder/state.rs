//! State body phases: conditions first, then the default behavior.

use crate::builder::kind::MachineKind;
use crate::builder::transition::{ConditionBuilder, DefaultTransitionBuilder};
use crate::core::{Action, Blackboard, Condition};
use crate::ir::BuilderContext;
use std::marker::PhantomData;

/// A state was just declared and has no conditions yet.
pub struct StateBuilder<B, K> {
    context: BuilderContext<B>,
    _kind: PhantomData<K>,
}

impl<B: Blackboard, K: MachineKind> StateBuilder<B, K> {
    pub(crate) fn new(context: BuilderContext<B>) -> Self {
        Self {
            context,
            _kind: PhantomData,
        }
    }

    /// Add a conditional transition. Conditions are evaluated in the order
    /// they are declared and the first one that holds wins.
    pub fn when<F>(self, condition: F) -> ConditionBuilder<B, K>
    where
        F: Fn(&B) -> bool + Send + Sync + 'static,
    {
        ConditionBuilder::new(self.context, Condition::new(condition))
    }

    /// Set the action run when no condition holds.
    pub fn exec<F>(mut self, action: F) -> DefaultTransitionBuilder<B, K>
    where
        F: Fn(&mut B) + Send + Sync + 'static,
    {
        self.context.set_action(Action::new(action));
        DefaultTransitionBuilder::new(self.context)
    }
}

/// At least one conditional transition was declared for the state.
pub struct ConditionalStateBuilder<B, K> {
    context: BuilderContext<B>,
    _kind: PhantomData<K>,
}

impl<B: Blackboard, K: MachineKind> ConditionalStateBuilder<B, K> {
    pub(crate) fn new(context: BuilderContext<B>) -> Self {
        Self {
            context,
            _kind: PhantomData,
        }
    }

    pub fn or_when<F>(self, condition: F) -> ConditionBuilder<B, K>
    where
        F: Fn(&B) -> bool + Send + Sync + 'static,
    {
        ConditionBuilder::new(self.context, Condition::new(condition))
    }

    pub fn otherwise_exec<F>(mut self, action: F) -> DefaultTransitionBuilder<B, K>
    where
        F: Fn(&mut B) + Send + Sync + 'static,
    {
        self.context.set_action(Action::new(action));
        DefaultTransitionBuilder::new(self.context)
    }
}
