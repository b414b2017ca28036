//! Initialization pass. Strict-mode only: `INIT001` and `INIT003` are
//! demoted below `Error` outside [`flowcore_diagnostics::CompileMode::Strict`],
//! so this pass only needs to run there — `structural::run` already covers `INIT002`
//! unconditionally since a mistyped hidden state is a bug regardless of mode.

use std::collections::{HashMap, HashSet, VecDeque};

use flowcore_diagnostics::{CompileMode, DiagCode, DiagnosticSink};
use flowcore_ir::{Ir, ReactionId, RefTarget, VariableId};

/// Runs `INIT001` (missing initial value) and `INIT003` (no happens-before path to a first
/// read) when `sink.mode()` is [`CompileMode::Strict`]; a no-op report otherwise.
pub fn run(ir: &Ir, sink: &mut DiagnosticSink) -> bool {
    if sink.mode() != CompileMode::Strict {
        return true;
    }
    let span = tracing::debug_span!("init_pass");
    let _enter = span.enter();
    let before = sink.len();

    for variable in ir.variables.values() {
        if variable.initial_value.is_none() {
            sink.emit(
                DiagCode::Init001,
                format!("variable `{}` has no initial value (required under strict mode)", variable.name),
            )
            .with_ref(ir.ref_name(RefTarget::Variable(variable.id)))
            .with_fix_hint("declare an initial value, or relax to pragmatic/best-effort mode");
        }
    }

    check_happens_before(ir, sink);

    !sink.diagnostics()[before..].iter().any(|d| d.is_error())
}

/// A variable is read-before-write (`INIT003`) if some reaction reads it with no
/// topological guarantee that a writer of it has already run earlier in the same tick's
/// reaction order — approximated here via the instantaneous dependency graph: a variable
/// with an initial value is always safe; one without must have every reader reachable
/// from every one of its writers.
fn check_happens_before(ir: &Ir, sink: &mut DiagnosticSink) {
    let mut writers_of: HashMap<VariableId, Vec<ReactionId>> = HashMap::new();
    let mut readers_of: HashMap<VariableId, Vec<ReactionId>> = HashMap::new();
    for (id, reaction) in ir.reactions.iter() {
        for target in reaction.write_targets() {
            if let RefTarget::Variable(v) = target {
                writers_of.entry(v).or_default().push(id);
            }
        }
        for target in &reaction.reads {
            if let RefTarget::Variable(v) = target {
                readers_of.entry(v).or_default().push(id);
            }
        }
    }

    let mut forward_edges: HashMap<ReactionId, Vec<ReactionId>> = HashMap::new();
    let mut writers_by_target: HashMap<RefTarget, Vec<ReactionId>> = HashMap::new();
    for (id, reaction) in ir.reactions.iter() {
        for target in reaction.write_targets() {
            writers_by_target.entry(target).or_default().push(id);
        }
    }
    for (reader_id, reaction) in ir.reactions.iter() {
        for read in &reaction.reads {
            if let Some(writers) = writers_by_target.get(read) {
                for &writer_id in writers {
                    forward_edges.entry(writer_id).or_default().push(reader_id);
                }
            }
        }
    }

    for variable in ir.variables.values() {
        if variable.initial_value.is_some() {
            continue;
        }
        let Some(readers) = readers_of.get(&variable.id) else {
            continue;
        };
        let Some(writers) = writers_of.get(&variable.id) else {
            // No static writer and no initial value: already an unreachable-ever-present
            // read, reported structurally; skip here to avoid double-reporting.
            continue;
        };
        for &reader in readers {
            let reachable = writers.iter().any(|&w| w == reader || reaches(ir, &forward_edges, w, reader));
            if !reachable {
                sink.emit(
                    DiagCode::Init003,
                    format!(
                        "reaction `{}` may read variable `{}` before any writer has run this tick",
                        ir.reactions[reader].name, variable.name
                    ),
                )
                .with_ref(ir.reaction_ref(reader))
                .with_ref(ir.ref_name(RefTarget::Variable(variable.id)))
                .with_fix_hint("declare an initial value, or ensure a writer always precedes this read");
            }
        }
    }
}

fn reaches(
    _ir: &Ir,
    forward_edges: &HashMap<ReactionId, Vec<ReactionId>>,
    from: ReactionId,
    to: ReactionId,
) -> bool {
    let mut visited: HashSet<ReactionId> = HashSet::new();
    let mut queue: VecDeque<ReactionId> = VecDeque::new();
    queue.push_back(from);
    visited.insert(from);
    while let Some(current) = queue.pop_front() {
        if current == to {
            return true;
        }
        if let Some(next) = forward_edges.get(&current) {
            for &n in next {
                if visited.insert(n) {
                    queue.push_back(n);
                }
            }
        }
    }
    false
}
