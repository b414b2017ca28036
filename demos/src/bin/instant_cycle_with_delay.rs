//! `x := Delay(x + 1, 0)`, initial `x = 0`. `Delay` lowers to a hidden state read/write
//! pair, so the causality pass sees no instantaneous self-loop: after N ticks, `x = N`.

use flowcore::{BinOp, ElementType, Expr, NodeDescriptor, NodeKind, Pipeline, PortDescriptor, ReactionDescriptor, RefTarget, Value};

fn main() {
    tracing_subscriber::fmt::init();

    let mut pipeline = Pipeline::new();
    let counter = pipeline
        .add_node(
            NodeDescriptor::new("counter", NodeKind::Core)
                .with_port(PortDescriptor::output("x", ElementType::Int)),
        )
        .unwrap();
    let x = pipeline.port_id(counter, "x").unwrap();

    let delayed = Expr::delay(Expr::reference(RefTarget::Port(x), ElementType::Int), Value::Int(0)).unwrap();
    let bump = Expr::binary(BinOp::Add, delayed, Expr::constant(Value::Int(1))).unwrap();
    pipeline
        .add_reaction(counter, ReactionDescriptor::new("bump").writing(RefTarget::Port(x), bump))
        .unwrap();

    let mut compiled = pipeline.compile(flowcore::CompileMode::Pragmatic).expect("delay breaks the instantaneous loop");

    for n in 1..=5i64 {
        compiled.run(1, None).expect("tick");
        let current = compiled.read(RefTarget::Port(x));
        println!("tick {n}: x={current:?}");
        assert_eq!(current, Some(Value::Int(n)));
    }
}
