//! Structural & type pass.

use flowcore_diagnostics::{DiagCode, DiagnosticSink, EntityRef};
use flowcore_ir::{Direction, Ir};

/// Runs `STRUCT001`, `STRUCT002`, `TYPE001`, and `INIT002`.
///
/// "No unknown references in ASTs" is enforced structurally by
/// [`flowcore_ir::GraphBuilder`] instead of diagnosed here — an `Ir` built through the
/// builder cannot contain a dangling reference, so there is nothing for this pass to find
/// without first bypassing construction (see `DESIGN.md`).
///
/// Returns `true` if downstream passes may proceed.
pub fn run(ir: &Ir, sink: &mut DiagnosticSink) -> bool {
    let span = tracing::debug_span!("structural_pass");
    let _enter = span.enter();
    let before = sink.len();

    for port in ir.ports.values() {
        if port.direction != Direction::Input {
            continue;
        }
        let edge_sources = ir.edges.iter().filter(|e| e.to == port.id).count();
        let subscription_source = usize::from(port.variable_subscription.is_some());
        let total_sources = edge_sources + subscription_source;

        if total_sources == 0 && port.default.is_none() {
            sink.emit(
                DiagCode::Struct001,
                format!("input port `{}` has no default, no connected output, and no variable subscription", port.name),
            )
            .with_ref(EntityRef::Port(port.name.clone()))
            .with_ref(ir.node_ref(port.owner))
            .with_fix_hint("provide a default, connect an output, or subscribe to a variable");
        }
        if total_sources > 1 {
            sink.emit(
                DiagCode::Struct002,
                format!("input port `{}` has fan-in {total_sources} (must be <= 1)", port.name),
            )
            .with_ref(EntityRef::Port(port.name.clone()))
            .with_ref(ir.node_ref(port.owner));
        }
    }

    for edge in &ir.edges {
        let (Some(from), Some(to)) = (ir.ports.get(edge.from), ir.ports.get(edge.to)) else {
            continue;
        };
        if from.element_type != to.element_type {
            sink.emit(
                DiagCode::Type001,
                format!(
                    "edge from `{}` ({}) to `{}` ({}) widens type",
                    from.name, from.element_type, to.name, to.element_type
                ),
            )
            .with_ref(EntityRef::Port(from.name.clone()))
            .with_ref(EntityRef::Port(to.name.clone()));
        }
    }

    for state in ir.states.values() {
        if state.initial_value.element_type() != state.element_type {
            sink.emit(
                DiagCode::Init002,
                format!(
                    "hidden delay state `{}` initial value type {} does not match declared type {}",
                    state.name,
                    state.initial_value.element_type(),
                    state.element_type
                ),
            )
            .with_ref(EntityRef::State(state.name.clone()));
        }
    }

    !sink.diagnostics()[before..].iter().any(|d| d.is_error())
}
