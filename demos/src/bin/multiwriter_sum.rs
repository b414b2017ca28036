//! Two reactions write `+2` and `+5` to a `sum`-policy variable `v` starting at `0`. After
//! one tick `v = 7`, regardless of which reaction proposed first.

use flowcore::{ElementType, Expr, LatticeDescriptor, NodeDescriptor, NodeKind, Pipeline, ReactionDescriptor, RefTarget, Value, VariableDescriptor, WritePolicy};

fn main() {
    tracing_subscriber::fmt::init();

    let mut pipeline = Pipeline::new();
    let v = pipeline
        .add_variable(VariableDescriptor::new(
            "v",
            ElementType::Int,
            WritePolicy::Monoid {
                descriptor: LatticeDescriptor::sum_int(),
            },
        ))
        .unwrap();
    let adder_a = pipeline.add_node(NodeDescriptor::new("adder_a", NodeKind::Core)).unwrap();
    let adder_b = pipeline.add_node(NodeDescriptor::new("adder_b", NodeKind::Core)).unwrap();
    pipeline
        .add_reaction(adder_a, ReactionDescriptor::new("add_two").writing(RefTarget::Variable(v), Expr::constant(Value::Int(2))))
        .unwrap();
    pipeline
        .add_reaction(adder_b, ReactionDescriptor::new("add_five").writing(RefTarget::Variable(v), Expr::constant(Value::Int(5))))
        .unwrap();

    let mut compiled = pipeline.compile(flowcore::CompileMode::Pragmatic).expect("clean compile");
    compiled.run(1, None).expect("tick");

    let total = compiled.read(RefTarget::Variable(v));
    println!("v={total:?}");
    assert_eq!(total, Some(Value::Int(7)));
}
