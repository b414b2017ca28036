//! Property-based tests for the concrete evaluator.

use proptest::prelude::*;

use flowcore_ir::eval::{eval_concrete, ConcreteEnv};
use flowcore_ir::{BinOp, BuiltinRegistry, CmpOp, ElementType, Expr, RefTarget, Value};

struct OneRefEnv {
    target: RefTarget,
    value: Option<Value>,
}

impl ConcreteEnv for OneRefEnv {
    fn lookup(&self, target: RefTarget) -> Option<Value> {
        if target == self.target {
            self.value.clone()
        } else {
            None
        }
    }
}

fn ref_target() -> RefTarget {
    // The concrete id doesn't matter to `eval_concrete`, only that it's a stable key the
    // test's `OneRefEnv` can recognize; a `PortId` default is as good as any other target
    // kind here.
    RefTarget::Port(flowcore_ir::PortId::default())
}

fn bin_ops() -> impl Strategy<Value = BinOp> {
    prop_oneof![
        Just(BinOp::Add),
        Just(BinOp::Sub),
        Just(BinOp::Mul),
        Just(BinOp::Min),
        Just(BinOp::Max),
    ]
}

fn cmp_ops() -> impl Strategy<Value = CmpOp> {
    prop_oneof![
        Just(CmpOp::Lt),
        Just(CmpOp::Le),
        Just(CmpOp::Eq),
        Just(CmpOp::Ge),
        Just(CmpOp::Gt),
    ]
}

proptest! {
    /// Binary arithmetic with an ABSENT left operand is always ABSENT, whatever the right
    /// operand and whichever side of the tree the reference sits on.
    #[test]
    fn absent_propagates_through_binary(op in bin_ops(), other in any::<i32>()) {
        let target = ref_target();
        let absent_ref = Expr::reference(target, ElementType::Int);
        let constant = Expr::constant(Value::Int(i64::from(other)));

        let lhs_absent = Expr::binary(op, absent_ref.clone(), constant.clone()).unwrap();
        let rhs_absent = Expr::binary(op, constant, absent_ref).unwrap();

        let env = OneRefEnv { target, value: None };
        let registry = BuiltinRegistry::with_defaults();
        prop_assert_eq!(eval_concrete(&lhs_absent, &env, &registry), None);
        prop_assert_eq!(eval_concrete(&rhs_absent, &env, &registry), None);
    }

    /// Same property for comparisons: an ABSENT operand makes the whole comparison ABSENT,
    /// never a concrete `false`.
    #[test]
    fn absent_propagates_through_comparison(op in cmp_ops(), other in any::<i32>()) {
        let target = ref_target();
        let expr = Expr::compare(op, Expr::reference(target, ElementType::Int), Expr::constant(Value::Int(i64::from(other)))).unwrap();
        let env = OneRefEnv { target, value: None };
        let registry = BuiltinRegistry::with_defaults();
        prop_assert_eq!(eval_concrete(&expr, &env, &registry), None);
    }

    /// When the reference is actually present, the same binary tree is total and matches
    /// plain integer arithmetic — a sanity companion to the absence properties above.
    #[test]
    fn present_binary_matches_integer_arithmetic(a in any::<i16>(), b in any::<i16>()) {
        let target = ref_target();
        let expr = Expr::binary(
            BinOp::Add,
            Expr::reference(target, ElementType::Int),
            Expr::constant(Value::Int(i64::from(b))),
        )
        .unwrap();
        let env = OneRefEnv {
            target,
            value: Some(Value::Int(i64::from(a))),
        };
        let registry = BuiltinRegistry::with_defaults();
        prop_assert_eq!(eval_concrete(&expr, &env, &registry), Some(Value::Int(i64::from(a) + i64::from(b))));
    }
}
