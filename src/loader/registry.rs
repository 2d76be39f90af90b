//! Named conditions and actions referenced by loaded definitions.

use crate::core::{Action, Blackboard, Condition};
use std::collections::HashMap;
use std::fmt;

/// Lookup table from names used in a definition to callables.
///
/// # Example
///
/// ```
/// use hfsm::core::StateStack;
/// use hfsm::loader::Registry;
///
/// let registry = Registry::<StateStack>::new()
///     .with_condition("isDeep", |stack: &StateStack| stack.len() > 3)
///     .with_action("noop", |_: &mut StateStack| {});
///
/// assert!(registry.condition("isDeep").is_some());
/// assert!(registry.action("missing").is_none());
/// ```
pub struct Registry<B> {
    conditions: HashMap<String, Condition<B>>,
    actions: HashMap<String, Action<B>>,
}

impl<B: Blackboard> Registry<B> {
    pub fn new() -> Self {
        Self {
            conditions: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    /// Register a condition under `name`, replacing any previous one.
    pub fn with_condition<F>(mut self, name: impl Into<String>, condition: F) -> Self
    where
        F: Fn(&B) -> bool + Send + Sync + 'static,
    {
        self.conditions
            .insert(name.into(), Condition::new(condition));
        self
    }

    /// Register an action under `name`, replacing any previous one.
    pub fn with_action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut B) + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Action::new(action));
        self
    }

    pub fn condition(&self, name: &str) -> Option<Condition<B>> {
        self.conditions.get(name).cloned()
    }

    pub fn action(&self, name: &str) -> Option<Action<B>> {
        self.actions.get(name).cloned()
    }

    pub fn has_condition(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }
}

impl<B: Blackboard> Default for Registry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Registry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut conditions: Vec<_> = self.conditions.keys().collect();
        let mut actions: Vec<_> = self.actions.keys().collect();
        conditions.sort();
        actions.sort();

        f.debug_struct("Registry")
            .field("conditions", &conditions)
            .field("actions", &actions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateStack;

    #[test]
    fn lookups_return_shared_callables() {
        let registry = Registry::<StateStack>::new()
            .with_condition("empty", |stack: &StateStack| stack.is_empty())
            .with_action("reset", |stack: &mut StateStack| stack.reset());

        let condition = registry.condition("empty").unwrap();
        assert!(!condition.check(&StateStack::new()));

        let mut stack = StateStack::new();
        stack.push_transition(&[4]);
        registry.action("reset").unwrap().run(&mut stack);
        assert_eq!(stack.as_slice(), &[0]);
    }

    #[test]
    fn conditions_and_actions_live_in_separate_namespaces() {
        let registry = Registry::<StateStack>::new().with_condition("x", |_: &StateStack| true);

        assert!(registry.has_condition("x"));
        assert!(!registry.has_action("x"));
        assert_eq!(
            format!("{registry:?}"),
            "Registry { conditions: [\"x\"], actions: [] }"
        );
    }
}
