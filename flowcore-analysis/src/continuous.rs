//! Continuous-time boundary pass.
//!
//! A [`flowcore_ir::NodeKind::ContinuousWrapper`] node is the one place the core touches
//! continuous time: it must expose exactly the four ports the scheduler's hybrid
//! time-advance hook expects (`u`, `state`, `y`, `dt`), correctly typed and directed.

use flowcore_diagnostics::{DiagCode, DiagnosticSink};
use flowcore_ir::{Direction, ElementType, Ir, NodeKind};

const EXPECTED: &[(&str, Direction, ElementType)] = &[
    ("u", Direction::Input, ElementType::Float),
    ("state", Direction::Output, ElementType::Float),
    ("y", Direction::Output, ElementType::Float),
    ("dt", Direction::Input, ElementType::Float),
];

/// Runs `CT001`-`CT004`. Returns `true` if downstream passes may proceed.
pub fn run(ir: &Ir, sink: &mut DiagnosticSink) -> bool {
    let span = tracing::debug_span!("continuous_pass");
    let _enter = span.enter();
    let before = sink.len();

    for node in ir.nodes.values() {
        if node.kind != NodeKind::ContinuousWrapper {
            continue;
        }
        for (name, expected_dir, expected_ty) in EXPECTED {
            let Some(port) = node.port_named(&ir.ports, name) else {
                sink.emit(
                    DiagCode::Ct001,
                    format!("ContinuousWrapper node `{}` is missing required port `{name}`", node.name),
                )
                .with_ref(ir.node_ref(node.id));
                continue;
            };
            if port.direction != *expected_dir {
                sink.emit(
                    DiagCode::Ct002,
                    format!(
                        "ContinuousWrapper node `{}` port `{name}` has direction {:?}, expected {expected_dir:?}",
                        node.name, port.direction
                    ),
                )
                .with_ref(ir.node_ref(node.id));
            }
            if port.element_type != *expected_ty {
                sink.emit(
                    DiagCode::Ct003,
                    format!(
                        "ContinuousWrapper node `{}` port `{name}` has type {}, expected {expected_ty}",
                        node.name, port.element_type
                    ),
                )
                .with_ref(ir.node_ref(node.id));
            }
            if *name == "dt" {
                let positive = matches!(port.default, Some(flowcore_ir::Value::Float(x)) if x > 0.0);
                if !positive {
                    sink.emit(
                        DiagCode::Ct004,
                        format!(
                            "ContinuousWrapper node `{}` port `dt` must have a positive default, found {:?}",
                            node.name, port.default
                        ),
                    )
                    .with_ref(ir.node_ref(node.id));
                }
            }
        }
    }

    !sink.diagnostics()[before..].iter().any(|d| d.is_error())
}
