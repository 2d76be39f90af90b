//! JSON Loader
//!
//! This example loads a machine definition from JSON and binds its
//! condition and action names through a `Registry`.
//!
//! Run with: RUST_LOG=hfsm=debug cargo run --example json_loader

use hfsm::{Blackboard, FsmDefinition, Registry, StateStack};
use tracing_subscriber::EnvFilter;

const DEFINITION: &str = r#"{
    "error_machine": {
        "global_condition": "overheated",
        "states": [
            { "name": "CoolDown", "action": "cool",
              "conditions": [ { "when": "cooled", "then": { "kind": "restart" } } ],
              "default": { "kind": "loop" } }
        ]
    },
    "main_machine": {
        "states": [
            { "name": "Heat",
              "conditions": [ { "when": "batchDone", "then": { "kind": "finish" } } ],
              "action": "heat",
              "default": { "kind": "loop" } }
        ]
    }
}"#;

#[derive(Default)]
struct Oven {
    stack: StateStack,
    temperature: u32,
    batches: u32,
}

impl Blackboard for Oven {
    fn state_stack(&self) -> &StateStack {
        &self.stack
    }

    fn state_stack_mut(&mut self) -> &mut StateStack {
        &mut self.stack
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Registry::<Oven>::new()
        .with_condition("overheated", |oven: &Oven| oven.temperature > 250)
        .with_condition("cooled", |oven: &Oven| oven.temperature < 150)
        .with_condition("batchDone", |oven: &Oven| oven.batches == 5)
        .with_action("heat", |oven: &mut Oven| {
            oven.temperature += 60;
            oven.batches += 1;
        })
        .with_action("cool", |oven: &mut Oven| oven.temperature -= 40);

    let definition = FsmDefinition::from_json_str(DEFINITION)?;
    let fsm = definition.build(&registry)?;

    let mut oven = Oven::default();
    while !fsm.is_finished(&oven) {
        fsm.tick(&mut oven);
        println!(
            "{:<20} temperature={:>3} batches={}",
            fsm.current_state_name(&oven).unwrap_or("(finished)"),
            oven.temperature,
            oven.batches
        );
    }

    Ok(())
}
