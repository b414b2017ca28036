use flowcore_ir::{
    ElementType, Expr, GraphBuilder, LatticeDescriptor, NodeDescriptor, NodeKind, PortDescriptor,
    ReactionDescriptor, RefTarget, Value, VariableDescriptor, WritePolicy,
};
use flowcore_runtime::Scheduler;

#[test]
fn simple_chain_propagates_within_one_tick() {
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
                .with_port(PortDescriptor::input("in", ElementType::Int).with_default(Value::Int(0)))
                .with_port(PortDescriptor::output("doubled", ElementType::Int)),
        )
        .unwrap();

    let source_out = builder.port_id(source, "out").unwrap();
    let sink_in = builder.port_id(sink, "in").unwrap();
    let sink_doubled = builder.port_id(sink, "doubled").unwrap();
    builder.connect(source_out, sink_in).unwrap();

    builder
        .add_reaction(
            source,
            ReactionDescriptor::new("emit").writing(RefTarget::Port(source_out), Expr::constant(Value::Int(21))),
        )
        .unwrap();
    builder
        .add_reaction(
            sink,
            ReactionDescriptor::new("double").reading(RefTarget::Port(sink_in)).writing(
                RefTarget::Port(sink_doubled),
                Expr::binary(
                    flowcore_ir::BinOp::Mul,
                    Expr::reference(RefTarget::Port(sink_in), ElementType::Int),
                    Expr::constant(Value::Int(2)),
                )
                .unwrap(),
            ),
        )
        .unwrap();

    let ir = builder.build();
    let mut scheduler = Scheduler::new(ir);
    scheduler.run(1, None).unwrap();

    assert_eq!(scheduler.read(RefTarget::Port(sink_doubled)), Some(Value::Int(42)));
    assert_eq!(scheduler.metrics().ticks_completed, 1);
}

#[test]
fn concurrent_writers_merge_via_monoid_policy() {
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
            ReactionDescriptor::new("add_a").writing(RefTarget::Variable(total), Expr::constant(Value::Int(5))),
        )
        .unwrap();
    builder
        .add_reaction(
            b,
            ReactionDescriptor::new("add_b").writing(RefTarget::Variable(total), Expr::constant(Value::Int(7))),
        )
        .unwrap();

    let ir = builder.build();
    let mut scheduler = Scheduler::new(ir);
    scheduler.run(1, None).unwrap();
    assert_eq!(scheduler.read(RefTarget::Variable(total)), Some(Value::Int(12)));

    scheduler.run(1, None).unwrap();
    assert_eq!(scheduler.read(RefTarget::Variable(total)), Some(Value::Int(24)));
}

#[test]
fn delay_materializes_the_prior_tick_value() {
    let mut builder = GraphBuilder::new();
    let node = builder
        .add_node(
            NodeDescriptor::new("counter", NodeKind::Core)
                .with_port(PortDescriptor::output("prev_plus_one", ElementType::Int)),
        )
        .unwrap();
    let out = builder.port_id(node, "prev_plus_one").unwrap();
    let delayed = Expr::delay(
        Expr::reference(RefTarget::Port(out), ElementType::Int),
        Value::Int(0),
    )
    .unwrap();
    let bump = Expr::binary(flowcore_ir::BinOp::Add, delayed, Expr::constant(Value::Int(1))).unwrap();
    builder
        .add_reaction(node, ReactionDescriptor::new("bump").writing(RefTarget::Port(out), bump))
        .unwrap();

    let ir = builder.build();
    let mut scheduler = Scheduler::new(ir);
    scheduler.run(1, None).unwrap();
    assert_eq!(scheduler.read(RefTarget::Port(out)), Some(Value::Int(1)));
    scheduler.run(1, None).unwrap();
    assert_eq!(scheduler.read(RefTarget::Port(out)), Some(Value::Int(2)));
    scheduler.run(1, None).unwrap();
    assert_eq!(scheduler.read(RefTarget::Port(out)), Some(Value::Int(3)));
}

#[test]
fn events_in_rejects_a_non_monotonic_tag() {
    let mut builder = GraphBuilder::new();
    let v = builder
        .add_variable(VariableDescriptor::new("v", ElementType::Int, WritePolicy::Error))
        .unwrap();
    let ir = builder.build();
    let mut scheduler = Scheduler::new(ir);
    scheduler.run(3, None).unwrap();

    let past = flowcore_runtime::Tag { t: 0, microstep: 0 };
    let err = scheduler.events_in(past, RefTarget::Variable(v), Value::Int(1)).unwrap_err();
    assert!(matches!(err, flowcore_runtime::EventTagError::PastTag { .. }));
}
