//! Two reactions write to a variable under `WritePolicy::Error`. Compile rejects the graph
//! with `WRITE001` before the runtime ever sees it.

use flowcore::{DiagCode, ElementType, Expr, NodeDescriptor, NodeKind, Pipeline, ReactionDescriptor, RefTarget, Value, VariableDescriptor, WritePolicy};

fn main() {
    tracing_subscriber::fmt::init();

    let mut pipeline = Pipeline::new();
    let v = pipeline.add_variable(VariableDescriptor::new("v", ElementType::Int, WritePolicy::Error)).unwrap();
    let a = pipeline.add_node(NodeDescriptor::new("a", NodeKind::Core)).unwrap();
    let b = pipeline.add_node(NodeDescriptor::new("b", NodeKind::Core)).unwrap();
    pipeline
        .add_reaction(a, ReactionDescriptor::new("write_a").writing(RefTarget::Variable(v), Expr::constant(Value::Int(1))))
        .unwrap();
    pipeline
        .add_reaction(b, ReactionDescriptor::new("write_b").writing(RefTarget::Variable(v), Expr::constant(Value::Int(2))))
        .unwrap();

    let report = pipeline.compile(flowcore::CompileMode::Pragmatic).expect_err("two writers under Error policy must not compile");
    println!("{}", report.to_pretty_string());
    assert!(report.diagnostics.iter().any(|d| d.code == DiagCode::Write001));
}
