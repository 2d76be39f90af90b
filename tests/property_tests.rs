//! Property-based tests for the tick interpreter.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated machine shapes and tick counts.

use hfsm::builder::MainBuilder;
use hfsm::core::{and, not, or, Blackboard, Condition, StateStack};
use hfsm::logging::MemoryLogger;
use hfsm::{BuildError, Builder, Fsm, TickBranch};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Agent {
    stack: StateStack,
    fail: bool,
    actions: usize,
}

impl Blackboard for Agent {
    fn state_stack(&self) -> &StateStack {
        &self.stack
    }

    fn state_stack_mut(&mut self) -> &mut StateStack {
        &mut self.stack
    }
}

fn count_action(agent: &mut Agent) {
    agent.actions += 1;
}

fn noop(_: &mut Agent) {}

/// Main machine that calls `Level{depth-1}`, which calls `Level{depth-2}`
/// and so on; the innermost level loops. Every call records a return
/// address, so the stack grows by one per tick until the innermost level.
fn nested_machine(depth: usize) -> Result<Fsm<Agent>, BuildError> {
    let mut main: MainBuilder<Agent> = Builder::new()
        .with_error_machine()
        .use_global_entry_condition(|agent: &Agent| agent.fail)
        .with_entry_state("Recover")?
        .exec(|agent: &mut Agent| agent.fail = false)
        .and_restart()
        .done();

    for level in 0..depth {
        let entry = main
            .with_submachine(format!("Level{level}"))?
            .with_entry_state("Enter")?
            .exec(noop);
        main = if level == 0 {
            entry.and_loop().done()
        } else {
            entry
                .and_go_to_machine(format!("Level{}", level - 1))?
                .then_go_to_state("Enter")?
                .done()
        };
    }

    let start = main
        .with_main_machine()
        .with_entry_state("Start")?
        .exec(noop);
    let machine = if depth == 0 {
        start.and_loop()
    } else {
        start
            .and_go_to_machine(format!("Level{}", depth - 1))?
            .then_go_to_state("Start")?
    };

    machine.done().build()
}

proptest! {
    #[test]
    fn combinators_follow_boolean_logic(left in any::<bool>(), right in any::<bool>()) {
        let both = Condition::new(and(move |_: &StateStack| left, move |_: &StateStack| right));
        let either = Condition::new(or(move |_: &StateStack| left, move |_: &StateStack| right));
        let inverted = Condition::new(not(move |_: &StateStack| left));
        let stack = StateStack::new();

        prop_assert_eq!(both.check(&stack), left && right);
        prop_assert_eq!(either.check(&stack), left || right);
        prop_assert_eq!(inverted.check(&stack), !left);
    }

    #[test]
    fn default_loop_runs_action_once_per_tick(ticks in 1usize..200) {
        let fsm = Builder::<Agent>::new()
            .with_no_error_machine()
            .with_main_machine()
            .with_entry_state("Loop")?
            .exec(count_action)
            .and_loop()
            .done()
            .build()?;
        let mut agent = Agent::default();

        for _ in 0..ticks {
            fsm.tick(&mut agent);
        }

        prop_assert_eq!(agent.actions, ticks);
        prop_assert_eq!(agent.stack.len(), 1);
        prop_assert!(!fsm.is_finished(&agent));
    }

    #[test]
    fn false_conditions_are_each_evaluated_once(count in 1usize..12) {
        let evaluations = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&evaluations);
        let mut state = Builder::<Agent>::new()
            .with_no_error_machine()
            .with_main_machine()
            .with_entry_state("Start")?
            .when(move |_: &Agent| {
                seen.fetch_add(1, Ordering::SeqCst);
                false
            })
            .finish();
        for _ in 1..count {
            let seen = Arc::clone(&evaluations);
            state = state
                .or_when(move |_: &Agent| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    false
                })
                .finish();
        }
        let fsm = state.otherwise_exec(count_action).and_loop().done().build()?;
        let mut agent = Agent::default();

        fsm.tick(&mut agent);

        prop_assert_eq!(evaluations.load(Ordering::SeqCst), count);
        prop_assert_eq!(agent.actions, 1);
    }

    #[test]
    fn first_true_condition_wins(count in 1usize..10, hit in 0usize..10) {
        let hit = hit % count;
        let evaluations = Arc::new(AtomicUsize::new(0));

        let condition = |index: usize| {
            let seen = Arc::clone(&evaluations);
            move |_: &Agent| {
                seen.fetch_add(1, Ordering::SeqCst);
                index == hit
            }
        };

        let mut state = Builder::<Agent>::new()
            .with_no_error_machine()
            .with_main_machine()
            .with_entry_state("Start")?
            .when(condition(0))
            .go_to_state("Start")?;
        for index in 1..count {
            state = state.or_when(condition(index)).go_to_state("Start")?;
        }
        let fsm = state.otherwise_exec(count_action).and_finish().done().build()?;
        let mut agent = Agent::default();
        let mut logger = MemoryLogger::new();

        fsm.tick_with_logger(&mut agent, &mut logger);

        prop_assert_eq!(evaluations.load(Ordering::SeqCst), hit + 1);
        prop_assert_eq!(agent.actions, 0);
        prop_assert_eq!(logger.entries()[0].branch, TickBranch::Condition(hit));
    }

    #[test]
    fn nested_calls_grow_stack_by_one_per_level(depth in 0usize..8) {
        let fsm = nested_machine(depth)?;
        let mut agent = Agent::default();

        for _ in 0..depth {
            fsm.tick(&mut agent);
        }

        prop_assert_eq!(agent.stack.len(), depth + 1);
        prop_assert!(!fsm.is_errored(&agent));
    }

    #[test]
    fn global_error_collapses_any_depth(depth in 0usize..8) {
        let fsm = nested_machine(depth)?;
        let mut agent = Agent::default();
        for _ in 0..depth {
            fsm.tick(&mut agent);
        }

        agent.fail = true;
        fsm.tick(&mut agent);

        prop_assert_eq!(agent.stack.len(), 1);
        prop_assert!(fsm.is_errored(&agent));
        prop_assert_eq!(fsm.current_state_name(&agent), Some("__error__:Recover"));

        fsm.tick(&mut agent);
        prop_assert_eq!(agent.stack.as_slice(), &[0]);
        prop_assert!(!fsm.is_errored(&agent));
    }

    #[test]
    fn finished_and_errored_are_exclusive(ticks in 0usize..20, fail_at in 0usize..20) {
        let fsm = nested_machine(3)?;
        let mut agent = Agent::default();

        for tick in 0..ticks {
            agent.fail = tick == fail_at;
            fsm.tick(&mut agent);
            prop_assert!(!(fsm.is_finished(&agent) && fsm.is_errored(&agent)));
        }
    }

    #[test]
    fn every_declared_state_is_indexed(extra in 0usize..16) {
        let mut machine = Builder::<Agent>::new()
            .with_no_error_machine()
            .with_main_machine()
            .with_entry_state("Start")?
            .exec(noop)
            .and_finish();
        for index in 0..extra {
            machine = machine
                .with_state(format!("State{index}"))?
                .exec(noop)
                .and_loop();
        }
        let fsm = machine.done().build()?;

        prop_assert_eq!(fsm.state_count(), extra + 1);
        prop_assert_eq!(fsm.state_name(0), Some("__main__:Start"));
    }

    #[test]
    fn stack_roundtrip_serialization(indices in prop::collection::vec(0usize..64, 0..8)) {
        let json = serde_json::to_string(&indices).unwrap();
        let stack: StateStack = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(stack.as_slice(), indices.as_slice());
        prop_assert_eq!(serde_json::to_string(&stack).unwrap(), json);
    }
}
