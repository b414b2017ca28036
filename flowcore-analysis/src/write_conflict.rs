//! Write-conflict pass.

use std::collections::{HashMap, HashSet};

use flowcore_diagnostics::{DiagCode, DiagnosticSink, EntityRef};
use flowcore_ir::{Ir, RefTarget, VariableId, WritePolicy};

/// For each `Variable`, collects its static writers and checks them against its
/// [`WritePolicy`]. Hidden delay `State`s are exempt, so only `RefTarget::Variable` targets are considered.
pub fn run(ir: &Ir, sink: &mut DiagnosticSink) -> bool {
    let span = tracing::debug_span!("write_conflict_pass");
    let _enter = span.enter();
    let before = sink.len();

    let mut writers: HashMap<VariableId, Vec<flowcore_ir::ReactionId>> = HashMap::new();
    for (reaction_id, reaction) in ir.reactions.iter() {
        for target in reaction.write_targets() {
            if let RefTarget::Variable(var_id) = target {
                writers.entry(var_id).or_default().push(reaction_id);
            }
        }
    }

    for variable in ir.variables.values() {
        let Some(var_writers) = writers.get(&variable.id) else {
            continue;
        };
        match &variable.policy {
            WritePolicy::Error => {
                if var_writers.len() > 1 {
                    sink.emit(
                        DiagCode::Write001,
                        format!(
                            "variable `{}` has {} static writers under ErrorPolicy (at most 1 allowed)",
                            variable.name,
                            var_writers.len()
                        ),
                    )
                    .with_refs(var_writers.iter().map(|r| ir.reaction_ref(*r)))
                    .with_ref(EntityRef::Variable(variable.name.clone()))
                    .with_fix_hint("switch to a monoidal or last-writer-wins policy, or remove a writer");
                }
            }
            WritePolicy::LastWriterWins { priority } => {
                if var_writers.len() <= 1 {
                    continue;
                }
                let priority_set: HashSet<_> = priority.iter().collect();
                let has_duplicates = priority_set.len() != priority.len();
                let missing_writer = var_writers.iter().any(|w| !priority_set.contains(w));
                if priority.is_empty() || has_duplicates || missing_writer {
                    sink.emit(
                        DiagCode::Write002,
                        format!(
                            "variable `{}` has {} writers under LastWriterWins without an unambiguous producer priority",
                            variable.name,
                            var_writers.len()
                        ),
                    )
                    .with_refs(var_writers.iter().map(|r| ir.reaction_ref(*r)))
                    .with_ref(EntityRef::Variable(variable.name.clone()))
                    .with_fix_hint("declare a complete, duplicate-free producer priority list");
                }
            }
            WritePolicy::Monoid { descriptor } => {
                // Any number of writers accepted, but a custom op has no generic merge
                // implementation in the runtime regardless of writer count.
                if matches!(descriptor.op, flowcore_ir::MonoidOp::Custom(_)) {
                    sink.emit(
                        DiagCode::Write003,
                        format!(
                            "variable `{}` declares a custom monoid op, which the core cannot resolve",
                            variable.name
                        ),
                    )
                    .with_ref(EntityRef::Variable(variable.name.clone()))
                    .with_fix_hint("use Max/Min/Sum, or merge the value yourself in a reaction instead of WritePolicy::Monoid");
                }
            }
        }
    }

    !sink.diagnostics()[before..].iter().any(|d| d.is_error())
}
