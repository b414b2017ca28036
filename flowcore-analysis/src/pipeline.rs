//! Fixed-order analysis pipeline: structural, write-conflict, causality,
//! initialization, SDF, continuous-boundary. A pass that finds an error-severity problem
//! stops the passes after it from running, since their invariants depend on the earlier
//! ones holding.

use flowcore_diagnostics::{CompileMode, DiagnosticSink, Report};
use flowcore_ir::Ir;

use crate::{causality, continuous, init, sdf, structural, write_conflict};

/// Runs every analysis pass over `ir` in the fixed order above and returns the accumulated report.
/// Takes `ir` mutably: the causality and SDF passes record their solved SCC groups and static
/// firing schedules back onto the IR for the scheduler to consume.
pub fn analyze(ir: &mut Ir, mode: CompileMode) -> Report {
    let span = tracing::info_span!("analysis_pipeline", ?mode);
    let _enter = span.enter();
    let mut sink = DiagnosticSink::new(mode);

    if !structural::run(ir, &mut sink) {
        return sink.into_report();
    }
    if !write_conflict::run(ir, &mut sink) {
        return sink.into_report();
    }
    if !causality::run(ir, &mut sink) {
        return sink.into_report();
    }
    if !init::run(ir, &mut sink) {
        return sink.into_report();
    }
    if !sdf::run(ir, &mut sink) {
        return sink.into_report();
    }
    continuous::run(ir, &mut sink);

    sink.into_report()
}
