//! Destination phases for conditional and default transitions.

use crate::builder::error::BuildError;
use crate::builder::kind::{CallerKind, ErrorMachine, MachineKind};
use crate::builder::machine::MachineBuilder;
use crate::builder::state::ConditionalStateBuilder;
use crate::core::{Blackboard, Condition, IntoMachineId, IntoStateId, RESTART_PLACEHOLDER};
use crate::ir::{BuilderContext, TransitionContext};
use std::marker::PhantomData;

/// A condition was given; choose where it leads.
pub struct ConditionBuilder<B, K> {
    context: BuilderContext<B>,
    condition: Condition<B>,
    _kind: PhantomData<K>,
}

impl<B: Blackboard, K: MachineKind> ConditionBuilder<B, K> {
    pub(crate) fn new(context: BuilderContext<B>, condition: Condition<B>) -> Self {
        Self {
            context,
            condition,
            _kind: PhantomData,
        }
    }

    fn to(mut self, destination: TransitionContext) -> ConditionalStateBuilder<B, K> {
        self.context
            .add_conditional_transition(self.condition, destination);
        ConditionalStateBuilder::new(self.context)
    }

    /// Jump to a state of the machine being declared.
    ///
    /// The state does not need to be declared yet. Unknown names are
    /// reported by `build()`.
    pub fn go_to_state(
        self,
        name: impl IntoStateId,
    ) -> Result<ConditionalStateBuilder<B, K>, BuildError> {
        let name = name.into_state_id()?;
        let destination = TransitionContext::to(self.context.local_state(name.as_str()));
        Ok(self.to(destination))
    }
}

impl<B: Blackboard, K: CallerKind> ConditionBuilder<B, K> {
    /// Call a submachine declared earlier. The return address is chosen on
    /// the returned builder.
    pub fn go_to_machine(
        self,
        name: impl IntoMachineId,
    ) -> Result<ConditionalCallBuilder<B, K>, BuildError> {
        let name = name.into_machine_id()?;
        let target = self.context.submachine_entry(name.as_str())?;
        Ok(ConditionalCallBuilder {
            context: self.context,
            condition: self.condition,
            target,
            _kind: PhantomData,
        })
    }

    /// Finish the current machine.
    ///
    /// Inside a submachine this resumes the caller's return address; in the
    /// main machine the agent is done.
    pub fn finish(self) -> ConditionalStateBuilder<B, K> {
        self.to(TransitionContext::finish())
    }

    /// Enter the error machine, dropping every pending return address.
    pub fn error(self) -> Result<ConditionalStateBuilder<B, K>, BuildError> {
        let destination = self.context.error_entry_destination()?;
        Ok(self.to(destination))
    }
}

impl<B: Blackboard> ConditionBuilder<B, ErrorMachine> {
    /// Leave the error machine and start over from the main entry state.
    pub fn restart(self) -> ConditionalStateBuilder<B, ErrorMachine> {
        self.to(TransitionContext::to(RESTART_PLACEHOLDER))
    }
}

/// A conditional submachine call waiting for its return address.
pub struct ConditionalCallBuilder<B, K> {
    context: BuilderContext<B>,
    condition: Condition<B>,
    target: String,
    _kind: PhantomData<K>,
}

impl<B: Blackboard, K: CallerKind> ConditionalCallBuilder<B, K> {
    /// Resume at `name` in the current machine once the submachine finishes.
    pub fn then_go_to_state(
        mut self,
        name: impl IntoStateId,
    ) -> Result<ConditionalStateBuilder<B, K>, BuildError> {
        let name = name.into_state_id()?;
        let destination =
            TransitionContext::call(self.target, self.context.local_state(name.as_str()));
        self.context
            .add_conditional_transition(self.condition, destination);
        Ok(ConditionalStateBuilder::new(self.context))
    }

    /// Finish the current machine together with the submachine.
    pub fn then_finish(mut self) -> ConditionalStateBuilder<B, K> {
        self.context
            .add_conditional_transition(self.condition, TransitionContext::to(self.target));
        ConditionalStateBuilder::new(self.context)
    }
}

/// The default action was given; choose where the state goes next.
pub struct DefaultTransitionBuilder<B, K> {
    context: BuilderContext<B>,
    _kind: PhantomData<K>,
}

impl<B: Blackboard, K: MachineKind> DefaultTransitionBuilder<B, K> {
    pub(crate) fn new(context: BuilderContext<B>) -> Self {
        Self {
            context,
            _kind: PhantomData,
        }
    }

    fn to(mut self, destination: TransitionContext) -> MachineBuilder<B, K> {
        self.context.set_default_destination(destination);
        MachineBuilder::new(self.context)
    }

    /// Continue with a state of the machine being declared.
    pub fn and_go_to_state(
        self,
        name: impl IntoStateId,
    ) -> Result<MachineBuilder<B, K>, BuildError> {
        let name = name.into_state_id()?;
        let destination = TransitionContext::to(self.context.local_state(name.as_str()));
        Ok(self.to(destination))
    }

    /// Stay in the current state.
    pub fn and_loop(self) -> MachineBuilder<B, K> {
        let destination = TransitionContext::to(self.context.current_state_full_name());
        self.to(destination)
    }
}

impl<B: Blackboard, K: CallerKind> DefaultTransitionBuilder<B, K> {
    /// Call a submachine declared earlier. The return address is chosen on
    /// the returned builder.
    pub fn and_go_to_machine(
        self,
        name: impl IntoMachineId,
    ) -> Result<DefaultCallBuilder<B, K>, BuildError> {
        let name = name.into_machine_id()?;
        let target = self.context.submachine_entry(name.as_str())?;
        Ok(DefaultCallBuilder {
            context: self.context,
            target,
            _kind: PhantomData,
        })
    }

    /// Finish the current machine.
    pub fn and_finish(self) -> MachineBuilder<B, K> {
        self.to(TransitionContext::finish())
    }
}

impl<B: Blackboard> DefaultTransitionBuilder<B, ErrorMachine> {
    /// Leave the error machine and start over from the main entry state.
    pub fn and_restart(self) -> MachineBuilder<B, ErrorMachine> {
        self.to(TransitionContext::to(RESTART_PLACEHOLDER))
    }
}

/// A default submachine call waiting for its return address.
pub struct DefaultCallBuilder<B, K> {
    context: BuilderContext<B>,
    target: String,
    _kind: PhantomData<K>,
}

impl<B: Blackboard, K: CallerKind> DefaultCallBuilder<B, K> {
    /// Resume at `name` in the current machine once the submachine finishes.
    pub fn then_go_to_state(
        mut self,
        name: impl IntoStateId,
    ) -> Result<MachineBuilder<B, K>, BuildError> {
        let name = name.into_state_id()?;
        let destination =
            TransitionContext::call(self.target, self.context.local_state(name.as_str()));
        self.context.set_default_destination(destination);
        Ok(MachineBuilder::new(self.context))
    }

    /// Finish the current machine together with the submachine.
    pub fn then_finish(mut self) -> MachineBuilder<B, K> {
        self.context
            .set_default_destination(TransitionContext::to(self.target));
        MachineBuilder::new(self.context)
    }
}
