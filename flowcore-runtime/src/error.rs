//! Runtime error types. Distinct from `flowcore_diagnostics::Diagnostic`: these
//! are raised by `run`/`step`/`events_in` against an already-compiled graph, not accumulated
//! during compilation — grounded on `langgraph-core::error::GraphError`'s flat, per-call
//! `thiserror` enum shape rather than a diagnostic sink.

use flowcore_ir::{ReactionId, VariableId};

use crate::tag::Tag;

#[derive(Debug, thiserror::Error)]
pub enum ZenoRuntimeError {
    /// A specific algebraic cycle never stabilized within its declared budget — the
    /// tightest `max_microsteps` among its own members, per spec.
    #[error("tick {tick} exceeded SCC microstep budget ({budget}) without reaching quiescence; members: {scc_members:?}")]
    MicrostepBudgetExceeded {
        tick: u64,
        budget: u32,
        scc_members: Vec<ReactionId>,
    },
    /// The tick never quiesced and no admitted SCC was still active — an implementation
    /// safety net, not a condition a causality-accepted graph should ever reach.
    #[error("tick {tick} exceeded the scheduler's absolute safety bound ({budget} microsteps) without reaching quiescence, and no admitted SCC was active")]
    SafetyBoundExceeded { tick: u64, budget: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum WritePolicyError {
    #[error("variable {variable:?} received {writers} concurrent writers under ErrorPolicy in the same microstep")]
    MultipleWriters { variable: VariableId, writers: usize },
    #[error("variable {variable:?} has LastWriterWins writers not covered by its producer priority list")]
    UncoveredWriter { variable: VariableId, writer: ReactionId },
}

#[derive(Debug, thiserror::Error)]
pub enum EventTagError {
    #[error("event tag {given:?} is not after the scheduler's current tag {current:?}")]
    PastTag { given: Tag, current: Tag },
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Zeno(#[from] ZenoRuntimeError),
    #[error(transparent)]
    WritePolicy(#[from] WritePolicyError),
    #[error(transparent)]
    EventTag(#[from] EventTagError),
}
