//! A diamond `A -> {B, C} -> D` with rated ports. The first attempt gives the two paths
//! into `D` conflicting implied firing ratios: no consistent vector exists, so compile
//! rejects with `SDF001`. Correcting `D`'s second input rate resolves the conflict and the
//! graph compiles clean.

use flowcore::{DiagCode, ElementType, NodeDescriptor, NodeKind, Pipeline, PortDescriptor};

fn build(d_in_c_rate: u32) -> Pipeline {
    let mut pipeline = Pipeline::new();
    let a = pipeline
        .add_node(NodeDescriptor::new("a", NodeKind::Core).with_port(PortDescriptor::output("out", ElementType::Int).with_rate(1)))
        .unwrap();
    let b = pipeline
        .add_node(
            NodeDescriptor::new("b", NodeKind::Core)
                .with_port(PortDescriptor::input("in", ElementType::Int).with_rate(2).with_default(flowcore::Value::Int(0)))
                .with_port(PortDescriptor::output("out", ElementType::Int).with_rate(1)),
        )
        .unwrap();
    let c = pipeline
        .add_node(
            NodeDescriptor::new("c", NodeKind::Core)
                .with_port(PortDescriptor::input("in", ElementType::Int).with_rate(1).with_default(flowcore::Value::Int(0)))
                .with_port(PortDescriptor::output("out", ElementType::Int).with_rate(1)),
        )
        .unwrap();
    let d = pipeline
        .add_node(
            NodeDescriptor::new("d", NodeKind::Core)
                .with_port(PortDescriptor::input("in_b", ElementType::Int).with_rate(1).with_default(flowcore::Value::Int(0)))
                .with_port(PortDescriptor::input("in_c", ElementType::Int).with_rate(d_in_c_rate).with_default(flowcore::Value::Int(0))),
        )
        .unwrap();

    let a_out = pipeline.port_id(a, "out").unwrap();
    let b_in = pipeline.port_id(b, "in").unwrap();
    let b_out = pipeline.port_id(b, "out").unwrap();
    let c_in = pipeline.port_id(c, "in").unwrap();
    let c_out = pipeline.port_id(c, "out").unwrap();
    let d_in_b = pipeline.port_id(d, "in_b").unwrap();
    let d_in_c = pipeline.port_id(d, "in_c").unwrap();

    pipeline.connect(a_out, b_in).unwrap();
    pipeline.connect(a_out, c_in).unwrap();
    pipeline.connect(b_out, d_in_b).unwrap();
    pipeline.connect(c_out, d_in_c).unwrap();
    pipeline
}

fn main() {
    tracing_subscriber::fmt::init();

    let broken = build(1);
    let report = broken.compile(flowcore::CompileMode::Pragmatic).expect_err("conflicting firing ratios into d must not compile");
    println!("broken: {}", report.to_pretty_string());
    assert!(report.diagnostics.iter().any(|d| d.code == DiagCode::Sdf001));

    let fixed = build(2);
    let compiled = fixed.compile(flowcore::CompileMode::Pragmatic).expect("matching firing ratios into d compile clean");
    println!("fixed: no diagnostics ({} warnings)", compiled.diagnostics().diagnostics.len());
}
