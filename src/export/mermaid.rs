//! Mermaid flowchart rendering.

use super::Exporter;
use crate::core::{full_state_name, split_full_state_name, ERROR_MACHINE_NAME, MAIN_MACHINE_NAME};
use crate::ir::{BuilderContext, TransitionContext};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes a declaration as a Mermaid `flowchart TD`.
///
/// The output can be pasted into any Mermaid renderer. Self loops are left
/// out; finishing transitions point at a synthetic `__finish__<state>( )`
/// node.
///
/// # Example
///
/// ```
/// use hfsm::builder::Builder;
/// use hfsm::core::StateStack;
/// use hfsm::export::MermaidExporter;
///
/// let mut exporter = MermaidExporter::new(Vec::new());
/// Builder::<StateStack>::new()
///     .with_no_error_machine()
///     .with_main_machine()
///     .with_entry_state("Start")?
///     .exec(|_| {})
///     .and_finish()
///     .done()
///     .export_diagram(&mut exporter)?;
///
/// let diagram = String::from_utf8(exporter.into_inner())?;
/// assert!(diagram.starts_with("flowchart TD\n"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct MermaidExporter<W: Write> {
    writer: W,
}

impl<W: Write> MermaidExporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header<B>(&mut self, context: &BuilderContext<B>) -> io::Result<()> {
        writeln!(self.writer, "flowchart TD")?;
        if let Some(entry) = context.main_entry_state() {
            writeln!(
                self.writer,
                "  _( ) -->|entry| {}",
                full_state_name(MAIN_MACHINE_NAME, entry)
            )?;
        }
        Ok(())
    }

    fn write_error_entry<B>(&mut self, context: &BuilderContext<B>) -> io::Result<()> {
        let Some(error_machine) = context.machine(ERROR_MACHINE_NAME) else {
            return Ok(());
        };

        let label = if context.has_global_error_condition() {
            "with global entry condition"
        } else {
            "no global entry condition"
        };
        writeln!(
            self.writer,
            "  __( ) -->|error: {label}| {}",
            full_state_name(ERROR_MACHINE_NAME, error_machine.entry_state())
        )
    }

    fn write_transition(
        &mut self,
        source: &str,
        source_machine: &str,
        destination: &TransitionContext,
        main_entry: &str,
    ) -> io::Result<()> {
        let Some(target) = destination.primary() else {
            return writeln!(self.writer, "  {source} -->|finish| __finish__{source}( )");
        };

        if destination.is_restart() {
            return writeln!(self.writer, "  {source} -->|restart| {main_entry}");
        }

        let target_machine = split_full_state_name(target)
            .map(|(machine, _)| machine)
            .unwrap_or(source_machine);

        if target_machine == source_machine {
            if source != target {
                writeln!(self.writer, "  {source} --> {target}")?;
            }
            return Ok(());
        }

        if target_machine == ERROR_MACHINE_NAME {
            return writeln!(self.writer, "  {source} -->|error| {target}");
        }

        match destination.secondary() {
            Some(return_to) => writeln!(
                self.writer,
                "  {source} -->|submachine: {target_machine}| {return_to}"
            ),
            None => writeln!(
                self.writer,
                "  {source} -->|submachine: {target_machine}| __finish__{source}( )"
            ),
        }
    }
}

impl MermaidExporter<BufWriter<File>> {
    /// Export into a file at `path`, created or truncated.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<B, W: Write> Exporter<B> for MermaidExporter<W> {
    type Error = io::Error;

    fn export_diagram(&mut self, context: &BuilderContext<B>) -> Result<(), Self::Error> {
        self.write_header(context)?;
        self.write_error_entry(context)?;

        let main_entry = context
            .main_entry_state()
            .map(|entry| full_state_name(MAIN_MACHINE_NAME, entry))
            .unwrap_or_default();

        for (machine_name, machine) in context.machines() {
            for (state_name, state) in machine.states() {
                let source = full_state_name(machine_name, state_name);
                for conditional in state.conditions() {
                    self.write_transition(
                        &source,
                        machine_name,
                        conditional.destination(),
                        &main_entry,
                    )?;
                }
                self.write_transition(&source, machine_name, state.destination(), &main_entry)?;
            }
        }

        self.writer.flush()
    }
}
