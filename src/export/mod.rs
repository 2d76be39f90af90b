//! Consumers of a machine declaration before it is compiled.
//!
//! Exporters see the name-addressed [`BuilderContext`] through
//! [`FinalBuilder::export_diagram`](crate::builder::FinalBuilder::export_diagram)
//! and never affect the compiled machine.

mod mermaid;

pub use mermaid::MermaidExporter;

use crate::ir::BuilderContext;

/// Renders a declaration into some external format.
pub trait Exporter<B> {
    type Error;

    fn export_diagram(&mut self, context: &BuilderContext<B>) -> Result<(), Self::Error>;
}
