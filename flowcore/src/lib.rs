//! The public facade: `add_node`/`connect` build a graph, `compile` runs the
//! fixed-order analysis pipeline and hands back either a runnable pipeline or a
//! diagnostics report, and the compiled pipeline exposes `run`/`step`/`events_in` over
//! the three-phase tick scheduler. This is the only crate a host embeds — everything
//! else in the workspace is wired together here.

pub mod compiled;
pub mod pipeline;

pub use compiled::CompiledPipeline;
pub use pipeline::Pipeline;

pub use flowcore_diagnostics::{CompileMode, DiagCode, Diagnostic, EntityRef, Report, Severity};
pub use flowcore_ir::{
    BinOp, BuiltinRegistry, CmpOp, ContractFlags, Direction, ElementType, Expr, ExprError, IrError,
    LatticeDescriptor, LatticeHeight, LogicOp, MonoidOp, NodeDescriptor, NodeId, NodeKind, OrderedFloat,
    PortDescriptor, PortId, ReactionDescriptor, ReactionId, RefTarget, StateId, TriValue, Value, VariableDescriptor,
    VariableId, WritePolicy,
};
pub use flowcore_runtime::{EnvSnapshot, EventTagError, RuntimeError, Tag, TickMetrics, WritePolicyError, ZenoRuntimeError};
