//! The author-facing builder. A thin wrapper
//! over [`flowcore_ir::GraphBuilder`] that additionally wires in the analysis pipeline at
//! `compile` time, so a host never touches `flowcore-ir`/`flowcore-analysis` directly.

use flowcore_diagnostics::{CompileMode, Report};
use flowcore_ir::{GraphBuilder, IrError, NodeDescriptor, NodeId, PortId, ReactionDescriptor, ReactionId, VariableDescriptor, VariableId};

use crate::compiled::CompiledPipeline;

/// An in-progress graph, before it has been checked against the analysis pipeline.
pub struct Pipeline {
    builder: GraphBuilder,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            builder: GraphBuilder::new(),
        }
    }

    pub fn with_builtins(registry: flowcore_ir::BuiltinRegistry) -> Self {
        Self {
            builder: GraphBuilder::with_builtins(registry),
        }
    }

    pub fn add_node(&mut self, descriptor: NodeDescriptor) -> Result<NodeId, IrError> {
        self.builder.add_node(descriptor)
    }

    pub fn add_variable(&mut self, descriptor: VariableDescriptor) -> Result<VariableId, IrError> {
        self.builder.add_variable(descriptor)
    }

    pub fn add_reaction(&mut self, node: NodeId, descriptor: ReactionDescriptor) -> Result<ReactionId, IrError> {
        self.builder.add_reaction(node, descriptor)
    }

    pub fn connect(&mut self, from: PortId, to: PortId) -> Result<(), IrError> {
        self.builder.connect(from, to)
    }

    pub fn port_id(&self, node: NodeId, port_name: &str) -> Result<PortId, IrError> {
        self.builder.port_id(node, port_name)
    }

    pub fn variable_id(&self, name: &str) -> Result<VariableId, IrError> {
        self.builder.variable_id(name)
    }

    /// Runs the fixed-order analysis pipeline and freezes the graph. On
    /// success the report may still carry warnings; on failure the
    /// report is returned instead of a pipeline, since an errored compile never produces
    /// something runnable.
    pub fn compile(self, mode: CompileMode) -> Result<CompiledPipeline, Report> {
        let mut ir = self.builder.build();
        let report = flowcore_analysis::analyze(&mut ir, mode);
        if report.has_errors() {
            return Err(report);
        }
        Ok(CompiledPipeline::new(ir, report))
    }
}
