//! Export Diagram
//!
//! This example renders a machine declaration as a Mermaid flowchart before
//! building it.
//!
//! Run with: cargo run --example export_diagram > machine.mmd

use hfsm::{Blackboard, Builder, MermaidExporter, StateStack};

#[derive(Default)]
struct Door {
    stack: StateStack,
    locked: bool,
    jammed: bool,
}

impl Blackboard for Door {
    fn state_stack(&self) -> &StateStack {
        &self.stack
    }

    fn state_stack_mut(&mut self) -> &mut StateStack {
        &mut self.stack
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut exporter = MermaidExporter::new(Vec::new());

    let fsm = Builder::<Door>::new()
        .with_error_machine()
        .use_global_entry_condition(|door: &Door| door.jammed)
        .with_entry_state("Repair")?
        .exec(|door: &mut Door| door.jammed = false)
        .and_restart()
        .done()
        .with_submachine("Unlock")?
        .with_entry_state("Turn")?
        .exec(|door: &mut Door| door.locked = false)
        .and_finish()
        .done()
        .with_main_machine()
        .with_entry_state("Closed")?
        .when(|door: &Door| door.locked)
        .go_to_machine("Unlock")?
        .then_go_to_state("Open")?
        .otherwise_exec(|_| {})
        .and_go_to_state("Open")?
        .with_state("Open")?
        .exec(|_| {})
        .and_finish()
        .done()
        .export_diagram(&mut exporter)?
        .build()?;

    print!("{}", String::from_utf8(exporter.into_inner())?);
    eprintln!("{fsm:?}");

    Ok(())
}
