//! CSV Parser
//!
//! This example splits CSV text into records, one character per tick.
//!
//! Key concepts:
//! - Conditional transitions checked in order (`when` / `or_when`)
//! - A submachine that collects one field and returns to its caller
//! - Tick records forwarded to `tracing`
//!
//! Run with: RUST_LOG=debug cargo run --example csv_parser

use hfsm::{Blackboard, Builder, StateStack, TracingLogger};
use tracing_subscriber::EnvFilter;

const INPUT: &str = "name,role\nada,engineer\ngrace,admiral";

#[derive(Default)]
struct Parser {
    stack: StateStack,
    input: Vec<char>,
    position: usize,
    field: String,
    record: Vec<String>,
    records: Vec<Vec<String>>,
}

impl Blackboard for Parser {
    fn state_stack(&self) -> &StateStack {
        &self.stack
    }

    fn state_stack_mut(&mut self) -> &mut StateStack {
        &mut self.stack
    }

    fn snapshot(&self) -> Option<String> {
        Some(format!("position={} field={:?}", self.position, self.field))
    }
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }
}

// Pure conditions
fn is_eof(parser: &Parser) -> bool {
    parser.peek().is_none()
}

fn is_comma(parser: &Parser) -> bool {
    parser.peek() == Some(',')
}

fn is_newline(parser: &Parser) -> bool {
    parser.peek() == Some('\n')
}

fn at_separator(parser: &Parser) -> bool {
    is_eof(parser) || is_comma(parser) || is_newline(parser)
}

// Actions
fn consume(parser: &mut Parser) {
    if let Some(c) = parser.peek() {
        parser.field.push(c);
        parser.position += 1;
    }
}

fn store_field(parser: &mut Parser) {
    let field = std::mem::take(&mut parser.field);
    parser.record.push(field);
}

fn skip_comma(parser: &mut Parser) {
    parser.position += 1;
}

fn end_record(parser: &mut Parser) {
    let record = std::mem::take(&mut parser.record);
    parser.records.push(record);
    parser.position += 1;
}

fn end_input(parser: &mut Parser) {
    let record = std::mem::take(&mut parser.record);
    parser.records.push(record);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== CSV Parser Example ===\n");

    let fsm = Builder::<Parser>::new()
        .with_no_error_machine()
        .with_submachine("Field")?
        .with_entry_state("Read")?
        .when(at_separator)
        .finish()
        .otherwise_exec(consume)
        .and_loop()
        .done()
        .with_main_machine()
        .with_entry_state("Start")?
        .exec(|_| {})
        .and_go_to_machine("Field")?
        .then_go_to_state("Store")?
        .with_state("Store")?
        .exec(store_field)
        .and_go_to_state("Separator")?
        .with_state("Separator")?
        .when(is_eof)
        .go_to_state("End")?
        .or_when(is_newline)
        .go_to_state("NewRecord")?
        .otherwise_exec(skip_comma)
        .and_go_to_state("Start")?
        .with_state("NewRecord")?
        .exec(end_record)
        .and_go_to_state("Start")?
        .with_state("End")?
        .exec(end_input)
        .and_finish()
        .done()
        .build()?;

    println!("Compiled {} states:", fsm.state_count());
    for name in fsm.state_names() {
        println!("  {name}");
    }

    let mut parser = Parser {
        input: INPUT.chars().collect(),
        ..Parser::default()
    };
    let mut logger = TracingLogger::new();
    let mut ticks = 0;

    while !fsm.is_finished(&parser) {
        fsm.tick_with_logger(&mut parser, &mut logger);
        ticks += 1;
    }

    println!("\nParsed in {ticks} ticks:");
    for record in &parser.records {
        println!("  {}", record.join(" | "));
    }

    Ok(())
}
