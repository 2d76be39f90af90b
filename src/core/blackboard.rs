//! The blackboard contract: per-agent state carried between ticks.
//!
//! A compiled [`Fsm`](crate::runtime::Fsm) holds no progress of its own.
//! Each agent owns a blackboard, and the blackboard owns a [`StateStack`]
//! of compiled state indices. The top of the stack is the state ticked next;
//! entries below it are return addresses of submachine calls.

use serde::{Deserialize, Serialize};

/// Index of the main machine's entry state in every compiled machine.
pub const ENTRY_STATE_INDEX: usize = 0;

/// Stack of compiled state indices.
///
/// A fresh stack is `[0]`, the main machine's entry state. An empty stack
/// means the agent finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateStack(Vec<usize>);

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStack {
    pub fn new() -> Self {
        Self(vec![ENTRY_STATE_INDEX])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the state that will be ticked next.
    pub fn top(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Indices from bottom (outermost caller) to top.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Put the agent back at the main machine's entry state.
    pub fn reset(&mut self) {
        self.0.clear();
        self.0.push(ENTRY_STATE_INDEX);
    }

    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    /// Push a compiled destination so that its first index ends on top.
    pub(crate) fn push_transition(&mut self, indices: &[usize]) {
        self.0.extend(indices.iter().rev().copied());
    }
}

/// Per-agent value ticked by an [`Fsm`](crate::runtime::Fsm).
///
/// Implementors embed a [`StateStack`] and hand it out. Everything else on
/// the blackboard is opaque to the engine and only seen by conditions and
/// actions.
///
/// # Example
///
/// ```rust
/// use hfsm::core::{Blackboard, StateStack};
///
/// #[derive(Default)]
/// struct Agent {
///     stack: StateStack,
///     health: u32,
/// }
///
/// impl Blackboard for Agent {
///     fn state_stack(&self) -> &StateStack {
///         &self.stack
///     }
///
///     fn state_stack_mut(&mut self) -> &mut StateStack {
///         &mut self.stack
///     }
///
///     fn snapshot(&self) -> Option<String> {
///         Some(format!("health: {}", self.health))
///     }
/// }
///
/// let agent = Agent::default();
/// assert_eq!(agent.state_stack().top(), Some(0));
/// ```
pub trait Blackboard: 'static {
    fn state_stack(&self) -> &StateStack;

    fn state_stack_mut(&mut self) -> &mut StateStack;

    /// Human readable dump of the blackboard for tick logs.
    ///
    /// Default implementation returns `None`, and loggers only record the
    /// blackboard's address.
    fn snapshot(&self) -> Option<String> {
        None
    }
}

impl Blackboard for StateStack {
    fn state_stack(&self) -> &StateStack {
        self
    }

    fn state_stack_mut(&mut self) -> &mut StateStack {
        self
    }
}

// Several context values ticked together: the stack lives in the first one,
// callables receive the whole tuple.
macro_rules! tuple_blackboard {
    ($($rest:ident),+) => {
        impl<B: Blackboard, $($rest: 'static),+> Blackboard for (B, $($rest),+) {
            fn state_stack(&self) -> &StateStack {
                self.0.state_stack()
            }

            fn state_stack_mut(&mut self) -> &mut StateStack {
                self.0.state_stack_mut()
            }

            fn snapshot(&self) -> Option<String> {
                self.0.snapshot()
            }
        }
    };
}

tuple_blackboard!(C);
tuple_blackboard!(C, D);
