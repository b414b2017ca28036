//! R1: `a := if b then 0 else 1`; R2: `b := (a = 1)`. Neither reaction's output can be
//! decided starting from `Bottom`, so the constructive fixed point never gets off the
//! ground and compile rejects the graph with `CAUS003`.

use flowcore::{
    CmpOp, DiagCode, ElementType, Expr, LatticeDescriptor, MonoidOp, NodeDescriptor, NodeKind,
    Pipeline, ReactionDescriptor, RefTarget, Value, VariableDescriptor, WritePolicy,
};

fn main() {
    tracing_subscriber::fmt::init();

    let mut pipeline = Pipeline::new();
    let a = pipeline
        .add_variable(VariableDescriptor::new(
            "a",
            ElementType::Int,
            WritePolicy::Monoid {
                descriptor: LatticeDescriptor::bounded(MonoidOp::Max, Value::Int(0), 2),
            },
        ))
        .unwrap();
    let b = pipeline
        .add_variable(VariableDescriptor::new(
            "b",
            ElementType::Bool,
            WritePolicy::Monoid {
                descriptor: LatticeDescriptor::max_bool(),
            },
        ))
        .unwrap();

    let node_a = pipeline.add_node(NodeDescriptor::new("compute_a", NodeKind::Core)).unwrap();
    let node_b = pipeline.add_node(NodeDescriptor::new("compute_b", NodeKind::Core)).unwrap();

    let a_expr = Expr::if_then_else(
        Expr::reference(RefTarget::Variable(b), ElementType::Bool),
        Expr::constant(Value::Int(0)),
        Expr::constant(Value::Int(1)),
    )
    .unwrap();
    pipeline
        .add_reaction(
            node_a,
            ReactionDescriptor::new("decide_a").reading(RefTarget::Variable(b)).writing(RefTarget::Variable(a), a_expr),
        )
        .unwrap();

    let b_expr = Expr::compare(CmpOp::Eq, Expr::reference(RefTarget::Variable(a), ElementType::Int), Expr::constant(Value::Int(1))).unwrap();
    pipeline
        .add_reaction(
            node_b,
            ReactionDescriptor::new("decide_b").reading(RefTarget::Variable(a)).writing(RefTarget::Variable(b), b_expr),
        )
        .unwrap();

    let report = pipeline.compile(flowcore::CompileMode::Pragmatic).expect_err("non-constructive cycle must not compile");
    println!("{}", report.to_pretty_string());
    assert!(report.diagnostics.iter().any(|d| d.code == DiagCode::Caus003));
}
