//! Conditions and actions evaluated against a blackboard.
//!
//! Conditions are pure predicates: they see the blackboard read-only and
//! decide whether a transition fires. Actions are the only place where a
//! state's behavior mutates the blackboard.

use std::fmt;
use std::sync::Arc;

/// Pure predicate that decides whether a conditional transition is taken.
///
/// Conditions are shared (cheap to clone) so that one compiled machine can be
/// ticked from several threads at once.
///
/// # Example
///
/// ```rust
/// use hfsm::core::{Condition, StateStack};
///
/// let is_empty = Condition::new(|stack: &StateStack| stack.is_empty());
///
/// assert!(!is_empty.check(&StateStack::new()));
/// ```
pub struct Condition<B> {
    predicate: Arc<dyn Fn(&B) -> bool + Send + Sync>,
}

impl<B: 'static> Condition<B> {
    /// Create a condition from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&B) -> bool + Send + Sync + 'static,
    {
        Condition {
            predicate: Arc::new(predicate),
        }
    }

    /// Condition that never fires.
    pub fn never() -> Self {
        Self::new(|_| false)
    }

    pub fn check(&self, blackboard: &B) -> bool {
        (self.predicate)(blackboard)
    }
}

impl<B> Clone for Condition<B> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<B> fmt::Debug for Condition<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

/// State behavior executed when no condition of the state fires.
pub struct Action<B> {
    behavior: Arc<dyn Fn(&mut B) + Send + Sync>,
}

impl<B: 'static> Action<B> {
    pub fn new<F>(behavior: F) -> Self
    where
        F: Fn(&mut B) + Send + Sync + 'static,
    {
        Action {
            behavior: Arc::new(behavior),
        }
    }

    /// Action that leaves the blackboard untouched.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn run(&self, blackboard: &mut B) {
        (self.behavior)(blackboard)
    }
}

impl<B> Clone for Action<B> {
    fn clone(&self) -> Self {
        Self {
            behavior: Arc::clone(&self.behavior),
        }
    }
}

impl<B> fmt::Debug for Action<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

/// Both predicates hold. The second is not evaluated when the first fails.
pub fn and<B, L, R>(left: L, right: R) -> impl Fn(&B) -> bool + Send + Sync + 'static
where
    B: 'static,
    L: Fn(&B) -> bool + Send + Sync + 'static,
    R: Fn(&B) -> bool + Send + Sync + 'static,
{
    move |blackboard| left(blackboard) && right(blackboard)
}

/// Either predicate holds. The second is not evaluated when the first holds.
pub fn or<B, L, R>(left: L, right: R) -> impl Fn(&B) -> bool + Send + Sync + 'static
where
    B: 'static,
    L: Fn(&B) -> bool + Send + Sync + 'static,
    R: Fn(&B) -> bool + Send + Sync + 'static,
{
    move |blackboard| left(blackboard) || right(blackboard)
}

pub fn not<B, F>(predicate: F) -> impl Fn(&B) -> bool + Send + Sync + 'static
where
    B: 'static,
    F: Fn(&B) -> bool + Send + Sync + 'static,
{
    move |blackboard| !predicate(blackboard)
}

/// Run two behaviors in sequence as a single action.
pub fn merge<B, F, G>(first: F, second: G) -> impl Fn(&mut B) + Send + Sync + 'static
where
    B: 'static,
    F: Fn(&mut B) + Send + Sync + 'static,
    G: Fn(&mut B) + Send + Sync + 'static,
{
    move |blackboard| {
        first(blackboard);
        second(blackboard);
    }
}
