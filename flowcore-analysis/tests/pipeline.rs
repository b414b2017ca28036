use flowcore_diagnostics::{CompileMode, DiagCode};
use flowcore_ir::{
    ContractFlags, ElementType, Expr, GraphBuilder, LatticeDescriptor, MonoidOp,
    NodeDescriptor, NodeKind, PortDescriptor, ReactionDescriptor, RefTarget, Value, VariableDescriptor,
    WritePolicy,
};

fn codes(report: &flowcore_diagnostics::Report) -> Vec<String> {
    report.diagnostics.iter().map(|d| d.code.to_string()).collect()
}

#[test]
fn simple_chain_compiles_clean() {
    let mut builder = GraphBuilder::new();
    let source = builder
        .add_node(
            NodeDescriptor::new("source", NodeKind::Core)
                .with_port(PortDescriptor::output("out", ElementType::Int)),
        )
        .unwrap();
    let sink = builder
        .add_node(
            NodeDescriptor::new("sink", NodeKind::Core)
                .with_port(PortDescriptor::input("in", ElementType::Int).with_default(Value::Int(0))),
        )
        .unwrap();

    let source_out = builder.port_id(source, "out").unwrap();
    let sink_in = builder.port_id(sink, "in").unwrap();
    builder.connect(source_out, sink_in).unwrap();

    builder
        .add_reaction(
            source,
            ReactionDescriptor::new("emit").writing(RefTarget::Port(source_out), Expr::constant(Value::Int(1))),
        )
        .unwrap();
    builder
        .add_reaction(
            sink,
            ReactionDescriptor::new("consume").reading(RefTarget::Port(sink_in)),
        )
        .unwrap();

    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(!report.has_errors(), "unexpected diagnostics: {}", report.to_pretty_string());
}

#[test]
fn missing_default_and_unconnected_input_is_struct001() {
    let mut builder = GraphBuilder::new();
    builder
        .add_node(
            NodeDescriptor::new("lonely", NodeKind::Core)
                .with_port(PortDescriptor::input("in", ElementType::Int)),
        )
        .unwrap();
    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(codes(&report).contains(&"STRUCT001".to_string()));
}

#[test]
fn two_writers_under_error_policy_is_write001() {
    let mut builder = GraphBuilder::new();
    let counter = builder
        .add_variable(VariableDescriptor::new("counter", ElementType::Int, WritePolicy::Error))
        .unwrap();
    let a = builder.add_node(NodeDescriptor::new("a", NodeKind::Core)).unwrap();
    let b = builder.add_node(NodeDescriptor::new("b", NodeKind::Core)).unwrap();
    builder
        .add_reaction(
            a,
            ReactionDescriptor::new("write_a").writing(RefTarget::Variable(counter), Expr::constant(Value::Int(1))),
        )
        .unwrap();
    builder
        .add_reaction(
            b,
            ReactionDescriptor::new("write_b").writing(RefTarget::Variable(counter), Expr::constant(Value::Int(2))),
        )
        .unwrap();

    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(codes(&report).contains(&"WRITE001".to_string()));
}

#[test]
fn monoid_sum_variable_accepts_many_writers() {
    let mut builder = GraphBuilder::new();
    let total = builder
        .add_variable(VariableDescriptor::new(
            "total",
            ElementType::Int,
            WritePolicy::Monoid {
                descriptor: LatticeDescriptor::sum_int(),
            },
        ))
        .unwrap();
    let a = builder.add_node(NodeDescriptor::new("a", NodeKind::Core)).unwrap();
    let b = builder.add_node(NodeDescriptor::new("b", NodeKind::Core)).unwrap();
    builder
        .add_reaction(
            a,
            ReactionDescriptor::new("write_a").writing(RefTarget::Variable(total), Expr::constant(Value::Int(1))),
        )
        .unwrap();
    builder
        .add_reaction(
            b,
            ReactionDescriptor::new("write_b").writing(RefTarget::Variable(total), Expr::constant(Value::Int(2))),
        )
        .unwrap();

    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(!report.has_errors(), "{}", report.to_pretty_string());
}

/// An instantaneous self-loop through a non-Core (`Raw`) node is never eligible for a
/// constructive cycle regardless of policy (`CAUS001`).
#[test]
fn raw_node_in_algebraic_cycle_is_caus001() {
    let mut builder = GraphBuilder::new();
    let shared = builder
        .add_variable(VariableDescriptor::new(
            "shared",
            ElementType::Int,
            WritePolicy::Monoid {
                descriptor: LatticeDescriptor::max_int(),
            },
        ))
        .unwrap();
    let raw = builder
        .add_node(
            NodeDescriptor::new("raw_actor", NodeKind::Raw).with_contract(
                ContractFlags {
                    unsafe_reason: Some("legacy FFI bridge".to_string()),
                    ..Default::default()
                },
            ),
        )
        .unwrap();
    builder
        .add_reaction(
            raw,
            ReactionDescriptor::new("self_loop")
                .reading(RefTarget::Variable(shared))
                .writing(
                    RefTarget::Variable(shared),
                    Expr::binary(
                        flowcore_ir::BinOp::Max,
                        Expr::reference(RefTarget::Variable(shared), ElementType::Int),
                        Expr::constant(Value::Int(1)),
                    )
                    .unwrap(),
                )
                .with_rank(Expr::constant(Value::Int(0)), 8),
        )
        .unwrap();

    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(codes(&report).contains(&"CAUS001".to_string()));
}

/// A two-reaction cycle over a bounded monoid (saturating max, height 4) reaches a
/// constructive fixed point and is accepted.
#[test]
fn bounded_monoid_cycle_is_constructive() {
    let mut builder = GraphBuilder::new();
    let shared = builder
        .add_variable(
            VariableDescriptor::new(
                "level",
                ElementType::Int,
                WritePolicy::Monoid {
                    descriptor: LatticeDescriptor::bounded(MonoidOp::Max, Value::Int(0), 4),
                },
            )
            .with_initial(Value::Int(0)),
        )
        .unwrap();
    let a = builder.add_node(NodeDescriptor::new("a", NodeKind::Core)).unwrap();
    let b = builder.add_node(NodeDescriptor::new("b", NodeKind::Core)).unwrap();
    builder
        .add_reaction(
            a,
            ReactionDescriptor::new("bump_a")
                .reading(RefTarget::Variable(shared))
                .writing(RefTarget::Variable(shared), Expr::constant(Value::Int(1)))
                .with_rank(Expr::constant(Value::Int(0)), 4),
        )
        .unwrap();
    builder
        .add_reaction(
            b,
            ReactionDescriptor::new("bump_b")
                .reading(RefTarget::Variable(shared))
                .writing(RefTarget::Variable(shared), Expr::constant(Value::Int(2)))
                .with_rank(Expr::constant(Value::Int(1)), 4),
        )
        .unwrap();

    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(!report.has_errors(), "{}", report.to_pretty_string());
}

#[test]
fn algebraic_cycle_without_rank_is_zen001() {
    let mut builder = GraphBuilder::new();
    let shared = builder
        .add_variable(
            VariableDescriptor::new(
                "level",
                ElementType::Int,
                WritePolicy::Monoid {
                    descriptor: LatticeDescriptor::bounded(MonoidOp::Max, Value::Int(0), 4),
                },
            )
            .with_initial(Value::Int(0)),
        )
        .unwrap();
    let a = builder.add_node(NodeDescriptor::new("a", NodeKind::Core)).unwrap();
    builder
        .add_reaction(
            a,
            ReactionDescriptor::new("bump")
                .reading(RefTarget::Variable(shared))
                .writing(RefTarget::Variable(shared), Expr::constant(Value::Int(1))),
        )
        .unwrap();

    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(codes(&report).contains(&"ZEN001".to_string()));
}

/// A simple two-node rated chain always has a consistent minimal firing vector
/// (`q_producer=3, q_consumer=2` for rates 2 and 3), so this must compile clean.
#[test]
fn rated_chain_has_a_solution() {
    let mut builder = GraphBuilder::new();
    let producer = builder
        .add_node(
            NodeDescriptor::new("producer", NodeKind::Core)
                .with_port(PortDescriptor::output("out", ElementType::Int).with_rate(2)),
        )
        .unwrap();
    let consumer = builder
        .add_node(
            NodeDescriptor::new("consumer", NodeKind::Core)
                .with_port(PortDescriptor::input("in", ElementType::Int).with_rate(3)),
        )
        .unwrap();
    let out = builder.port_id(producer, "out").unwrap();
    let inp = builder.port_id(consumer, "in").unwrap();
    builder.connect(out, inp).unwrap();

    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(!report.diagnostics.iter().any(|d| d.code == DiagCode::Sdf001));
}

#[test]
fn continuous_wrapper_missing_port_is_ct001() {
    let mut builder = GraphBuilder::new();
    builder
        .add_node(
            NodeDescriptor::new("integrator", NodeKind::ContinuousWrapper)
                .with_port(PortDescriptor::input("u", ElementType::Float).with_default(Value::Float(0.0)))
                .with_port(PortDescriptor::output("y", ElementType::Float)),
        )
        .unwrap();
    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(codes(&report).contains(&"CT001".to_string()));
}

#[test]
fn strict_mode_requires_initial_value() {
    let mut builder = GraphBuilder::new();
    builder
        .add_variable(VariableDescriptor::new("v", ElementType::Int, WritePolicy::Error))
        .unwrap();
    let mut ir = builder.build();
    let report = flowcore_analysis::analyze(&mut ir, CompileMode::Strict);
    assert!(codes(&report).contains(&"INIT001".to_string()));

    let report_pragmatic = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert!(!codes(&report_pragmatic).contains(&"INIT001".to_string()));
}

/// Compiling the same IR twice, with no mutation between runs, produces byte-for-byte
/// identical diagnostics in the same order — the pipeline carries no hidden iteration-order
/// or timing dependence.
#[test]
fn analyzing_the_same_ir_twice_is_idempotent() {
    let mut builder = GraphBuilder::new();
    let shared = builder
        .add_variable(
            VariableDescriptor::new(
                "level",
                ElementType::Int,
                WritePolicy::Monoid {
                    descriptor: LatticeDescriptor::bounded(MonoidOp::Max, Value::Int(0), 4),
                },
            )
            .with_initial(Value::Int(0)),
        )
        .unwrap();
    let a = builder.add_node(NodeDescriptor::new("a", NodeKind::Core)).unwrap();
    let b = builder.add_node(NodeDescriptor::new("b", NodeKind::Core)).unwrap();
    builder
        .add_reaction(
            a,
            ReactionDescriptor::new("bump_a")
                .reading(RefTarget::Variable(shared))
                .writing(RefTarget::Variable(shared), Expr::constant(Value::Int(1)))
                .with_rank(Expr::constant(Value::Int(0)), 4),
        )
        .unwrap();
    builder
        .add_reaction(
            b,
            ReactionDescriptor::new("bump_b")
                .reading(RefTarget::Variable(shared))
                .writing(RefTarget::Variable(shared), Expr::constant(Value::Int(2)))
                .with_rank(Expr::constant(Value::Int(1)), 4),
        )
        .unwrap();

    let mut ir = builder.build();
    let first = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    let second = flowcore_analysis::analyze(&mut ir, CompileMode::Pragmatic);
    assert_eq!(codes(&first), codes(&second));
    assert_eq!(first.has_errors(), second.has_errors());
    assert_eq!(
        first.diagnostics.iter().map(|d| d.message.clone()).collect::<Vec<_>>(),
        second.diagnostics.iter().map(|d| d.message.clone()).collect::<Vec<_>>(),
    );
}
