//! A (`x` = constant 3) feeds B (`y := x + 1`) feeds C (`z := y * 2`). One tick should
//! leave `x=3, y=4, z=8`.

use flowcore::{BinOp, ElementType, Expr, NodeDescriptor, NodeKind, Pipeline, PortDescriptor, RefTarget, Value};

fn main() {
    tracing_subscriber::fmt::init();

    let mut pipeline = Pipeline::new();
    let a = pipeline
        .add_node(NodeDescriptor::new("a", NodeKind::Core).with_port(PortDescriptor::output("x", ElementType::Int)))
        .unwrap();
    let b = pipeline
        .add_node(
            NodeDescriptor::new("b", NodeKind::Core)
                .with_port(PortDescriptor::input("x", ElementType::Int).with_default(Value::Int(0)))
                .with_port(PortDescriptor::output("y", ElementType::Int)),
        )
        .unwrap();
    let c = pipeline
        .add_node(
            NodeDescriptor::new("c", NodeKind::Core)
                .with_port(PortDescriptor::input("y", ElementType::Int).with_default(Value::Int(0)))
                .with_port(PortDescriptor::output("z", ElementType::Int)),
        )
        .unwrap();

    let a_x = pipeline.port_id(a, "x").unwrap();
    let b_x = pipeline.port_id(b, "x").unwrap();
    let b_y = pipeline.port_id(b, "y").unwrap();
    let c_y = pipeline.port_id(c, "y").unwrap();
    let c_z = pipeline.port_id(c, "z").unwrap();
    pipeline.connect(a_x, b_x).unwrap();
    pipeline.connect(b_y, c_y).unwrap();

    pipeline
        .add_reaction(
            a,
            flowcore::ReactionDescriptor::new("emit").writing(RefTarget::Port(a_x), Expr::constant(Value::Int(3))),
        )
        .unwrap();
    pipeline
        .add_reaction(
            b,
            flowcore::ReactionDescriptor::new("bump").reading(RefTarget::Port(b_x)).writing(
                RefTarget::Port(b_y),
                Expr::binary(BinOp::Add, Expr::reference(RefTarget::Port(b_x), ElementType::Int), Expr::constant(Value::Int(1))).unwrap(),
            ),
        )
        .unwrap();
    pipeline
        .add_reaction(
            c,
            flowcore::ReactionDescriptor::new("double").reading(RefTarget::Port(c_y)).writing(
                RefTarget::Port(c_z),
                Expr::binary(BinOp::Mul, Expr::reference(RefTarget::Port(c_y), ElementType::Int), Expr::constant(Value::Int(2))).unwrap(),
            ),
        )
        .unwrap();

    let mut compiled = pipeline.compile(flowcore::CompileMode::Pragmatic).expect("clean compile");
    compiled.run(1, None).expect("tick");

    let x = compiled.read(RefTarget::Port(a_x));
    let y = compiled.read(RefTarget::Port(b_y));
    let z = compiled.read(RefTarget::Port(c_z));
    println!("x={x:?} y={y:?} z={z:?}");
    assert_eq!(x, Some(Value::Int(3)));
    assert_eq!(y, Some(Value::Int(4)));
    assert_eq!(z, Some(Value::Int(8)));
}
