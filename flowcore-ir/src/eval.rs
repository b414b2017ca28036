//! Two evaluators over the same [`Expr`] tree: a total concrete evaluator used at
//! runtime, and a total, monotone three-valued evaluator used only by the causality
//! pass's constructive fixed-point iteration. Neither can be called on a tree that
//! still contains a `Delay` node.

use crate::builtins::BuiltinRegistry;
use crate::expr::{BinOp, CmpOp, Expr, LogicOp};
use crate::reaction::RefTarget;
use crate::value::{TriValue, Value};

/// Maps a reference to its current concrete value, or `None` for `ABSENT`.
pub trait ConcreteEnv {
    fn lookup(&self, target: RefTarget) -> Option<Value>;
}

/// Maps a reference to its current three-valued value during constructive iteration.
pub trait TriEnv {
    fn lookup(&self, target: RefTarget) -> TriValue;
}

fn apply_bin(op: BinOp, a: &Value, b: &Value) -> Value {
    match (op, a, b) {
        (BinOp::Add, Value::Int(x), Value::Int(y)) => Value::Int(x + y),
        (BinOp::Add, Value::Float(x), Value::Float(y)) => Value::Float(x + y),
        (BinOp::Sub, Value::Int(x), Value::Int(y)) => Value::Int(x - y),
        (BinOp::Sub, Value::Float(x), Value::Float(y)) => Value::Float(x - y),
        (BinOp::Mul, Value::Int(x), Value::Int(y)) => Value::Int(x * y),
        (BinOp::Mul, Value::Float(x), Value::Float(y)) => Value::Float(x * y),
        (BinOp::Div, Value::Int(x), Value::Int(y)) => Value::Int(x.checked_div(*y).unwrap_or(0)),
        (BinOp::Div, Value::Float(x), Value::Float(y)) => Value::Float(x / y),
        (BinOp::Min, Value::Int(x), Value::Int(y)) => Value::Int(*x.min(y)),
        (BinOp::Min, Value::Float(x), Value::Float(y)) => Value::Float(x.min(*y)),
        (BinOp::Max, Value::Int(x), Value::Int(y)) => Value::Int(*x.max(y)),
        (BinOp::Max, Value::Float(x), Value::Float(y)) => Value::Float(x.max(*y)),
        _ => unreachable!("binary operand types were checked at Expr construction"),
    }
}

fn apply_cmp(op: CmpOp, a: &Value, b: &Value) -> bool {
    let ord = match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.partial_cmp(y),
        (Value::Str(x), Value::Str(y)) => x.partial_cmp(y),
        _ => unreachable!("comparison operand types were checked at Expr construction"),
    };
    let Some(ord) = ord else { return false };
    match op {
        CmpOp::Lt => ord.is_lt(),
        CmpOp::Le => ord.is_le(),
        CmpOp::Eq => ord.is_eq(),
        CmpOp::Ge => ord.is_ge(),
        CmpOp::Gt => ord.is_gt(),
    }
}

/// Evaluate `expr` to a concrete value or `ABSENT` (`None`). Total: every well-formed,
/// delay-free `Expr` produces a result.
pub fn eval_concrete(expr: &Expr, env: &dyn ConcreteEnv, registry: &BuiltinRegistry) -> Option<Value> {
    match expr {
        Expr::Const(v) => Some(v.clone()),
        Expr::Ref { target, .. } => env.lookup(*target),
        Expr::Binary { op, lhs, rhs, .. } => {
            let a = eval_concrete(lhs, env, registry)?;
            let b = eval_concrete(rhs, env, registry)?;
            Some(apply_bin(*op, &a, &b))
        }
        Expr::Compare { op, lhs, rhs } => {
            let a = eval_concrete(lhs, env, registry)?;
            let b = eval_concrete(rhs, env, registry)?;
            Some(Value::Bool(apply_cmp(*op, &a, &b)))
        }
        Expr::Logic { op, lhs, rhs } => {
            let a = eval_concrete(lhs, env, registry)?;
            let b = eval_concrete(rhs, env, registry)?;
            let (Value::Bool(a), Value::Bool(b)) = (a, b) else {
                unreachable!("logic operand types were checked at Expr construction")
            };
            Some(Value::Bool(match op {
                LogicOp::And => a && b,
                LogicOp::Or => a || b,
            }))
        }
        Expr::Not(inner) => {
            let Value::Bool(v) = eval_concrete(inner, env, registry)? else {
                unreachable!("not() operand type was checked at Expr construction")
            };
            Some(Value::Bool(!v))
        }
        Expr::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            let Value::Bool(cond) = eval_concrete(cond, env, registry)? else {
                unreachable!("if condition type was checked at Expr construction")
            };
            if cond {
                eval_concrete(then_branch, env, registry)
            } else {
                eval_concrete(else_branch, env, registry)
            }
        }
        Expr::Builtin { name, args, .. } => {
            let sig = registry.get(name).expect("builtin was validated at construction");
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                values.push(eval_concrete(a, env, registry)?);
            }
            (sig.apply)(&values)
        }
        Expr::Delay { .. } => {
            unreachable!("Delay must be lowered before evaluation (flowcore_ir::delay)")
        }
    }
}

fn tri_bin(op: BinOp, a: TriValue, b: TriValue) -> TriValue {
    match (a, b) {
        (TriValue::Bottom, _) | (_, TriValue::Bottom) => TriValue::Bottom,
        (TriValue::Absent, _) | (_, TriValue::Absent) => TriValue::Absent,
        (TriValue::Present(a), TriValue::Present(b)) => TriValue::Present(apply_bin(op, &a, &b)),
    }
}

fn tri_cmp(op: CmpOp, a: TriValue, b: TriValue) -> TriValue {
    match (a, b) {
        (TriValue::Bottom, _) | (_, TriValue::Bottom) => TriValue::Bottom,
        (TriValue::Absent, _) | (_, TriValue::Absent) => TriValue::Absent,
        (TriValue::Present(a), TriValue::Present(b)) => TriValue::Present(Value::Bool(apply_cmp(op, &a, &b))),
    }
}

/// Evaluate `expr` in the three-valued domain. Total and monotone in `⊥ ⊑ Absent`,
/// `⊥ ⊑ Present(v)` — every case below only ever *raises* the result along
/// that order as its operands do, never lowers it.
pub fn eval_three_valued(expr: &Expr, env: &dyn TriEnv, registry: &BuiltinRegistry) -> TriValue {
    match expr {
        Expr::Const(v) => TriValue::Present(v.clone()),
        Expr::Ref { target, .. } => env.lookup(*target),
        Expr::Binary { op, lhs, rhs, .. } => {
            tri_bin(*op, eval_three_valued(lhs, env, registry), eval_three_valued(rhs, env, registry))
        }
        Expr::Compare { op, lhs, rhs } => {
            tri_cmp(*op, eval_three_valued(lhs, env, registry), eval_three_valued(rhs, env, registry))
        }
        Expr::Logic { op, lhs, rhs } => {
            let a = eval_three_valued(lhs, env, registry);
            let b = eval_three_valued(rhs, env, registry);
            match (a, b) {
                (TriValue::Bottom, _) | (_, TriValue::Bottom) => TriValue::Bottom,
                (TriValue::Absent, _) | (_, TriValue::Absent) => TriValue::Absent,
                (TriValue::Present(Value::Bool(a)), TriValue::Present(Value::Bool(b))) => {
                    TriValue::Present(Value::Bool(match op {
                        LogicOp::And => a && b,
                        LogicOp::Or => a || b,
                    }))
                }
                _ => unreachable!("logic operand types were checked at Expr construction"),
            }
        }
        Expr::Not(inner) => match eval_three_valued(inner, env, registry) {
            TriValue::Bottom => TriValue::Bottom,
            TriValue::Absent => TriValue::Absent,
            TriValue::Present(Value::Bool(v)) => TriValue::Present(Value::Bool(!v)),
            TriValue::Present(_) => unreachable!("not() operand type was checked at Expr construction"),
        },
        Expr::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => match eval_three_valued(cond, env, registry) {
            TriValue::Bottom => TriValue::Bottom,
            TriValue::Absent => TriValue::Absent,
            TriValue::Present(Value::Bool(true)) => eval_three_valued(then_branch, env, registry),
            TriValue::Present(Value::Bool(false)) => eval_three_valued(else_branch, env, registry),
            TriValue::Present(_) => unreachable!("if condition type was checked at Expr construction"),
        },
        Expr::Builtin { name, args, .. } => {
            let mut any_bottom = false;
            let mut any_absent = false;
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                match eval_three_valued(a, env, registry) {
                    TriValue::Bottom => any_bottom = true,
                    TriValue::Absent => any_absent = true,
                    TriValue::Present(v) => values.push(v),
                }
            }
            if any_bottom {
                return TriValue::Bottom;
            }
            if any_absent {
                return TriValue::Absent;
            }
            let sig = registry.get(name).expect("builtin was validated at construction");
            match (sig.apply)(&values) {
                Some(v) => TriValue::Present(v),
                None => TriValue::Absent,
            }
        }
        Expr::Delay { .. } => {
            unreachable!("Delay must be lowered before evaluation (flowcore_ir::delay)")
        }
    }
}
