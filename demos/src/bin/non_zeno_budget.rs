//! A single reaction reads and writes the same `Sum`-policy variable `total`, forming a
//! genuine algebraic self-loop: `total := if seed then total + 1 else 0`, `seed` a `Bool`
//! input port whose real default is `true`.
//!
//! The causality pass only asks whether the cycle is *constructively decidable* in the
//! abstract, three-valued domain, where every externally-decided `Bool` is probed as
//! `false` — that sends the abstract check down the `else` branch (the constant `0`,
//! independent of `total`), so it reaches a fixed point in one round and accepts the cycle
//! as long as `total`'s write policy declares some bounded height, here a deliberately
//! inflated one since a running sum has no real bound. At runtime `seed` is actually
//! `true`, so every microstep instead takes the `total + 1` branch, and `total` grows by
//! one forever. `add_one`'s `max_microsteps=4` becomes the tick's budget: the scheduler
//! raises `ZenoRuntimeError` once the fifth microstep is reached.

use flowcore::{
    BinOp, ElementType, Expr, LatticeDescriptor, MonoidOp, NodeDescriptor, NodeKind, Pipeline, PortDescriptor, ReactionDescriptor,
    RefTarget, RuntimeError, Value, VariableDescriptor, WritePolicy, ZenoRuntimeError,
};

fn main() {
    tracing_subscriber::fmt::init();

    let mut pipeline = Pipeline::new();
    let total = pipeline
        .add_variable(
            VariableDescriptor::new(
                "total",
                ElementType::Int,
                WritePolicy::Monoid {
                    descriptor: LatticeDescriptor::bounded(MonoidOp::Sum, Value::Int(0), 8),
                },
            )
            .with_initial(Value::Int(0)),
        )
        .unwrap();
    let node = pipeline
        .add_node(
            NodeDescriptor::new("accumulator", NodeKind::Core)
                .with_port(PortDescriptor::input("seed", ElementType::Bool).with_default(Value::Bool(true))),
        )
        .unwrap();
    let seed = pipeline.port_id(node, "seed").unwrap();

    let step = Expr::if_then_else(
        Expr::reference(RefTarget::Port(seed), ElementType::Bool),
        Expr::binary(
            BinOp::Add,
            Expr::reference(RefTarget::Variable(total), ElementType::Int),
            Expr::constant(Value::Int(1)),
        )
        .unwrap(),
        Expr::constant(Value::Int(0)),
    )
    .unwrap();
    pipeline
        .add_reaction(
            node,
            ReactionDescriptor::new("add_one")
                .reading(RefTarget::Port(seed))
                .reading(RefTarget::Variable(total))
                .writing(RefTarget::Variable(total), step)
                .with_rank(Expr::constant(Value::Int(0)), 4),
        )
        .unwrap();

    let mut compiled = pipeline
        .compile(flowcore::CompileMode::Pragmatic)
        .expect("constructively decidable: the else branch is the one the abstract check probes");

    let err = compiled.run(1, None).expect_err("total grows without bound within the tick");
    println!("{err}");
    assert!(matches!(err, RuntimeError::Zeno(ZenoRuntimeError::MicrostepBudgetExceeded { budget: 4, .. })));
}
