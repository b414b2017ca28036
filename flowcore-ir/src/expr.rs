use crate::reaction::RefTarget;
use crate::value::{ElementType, Value};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LogicOp {
    And,
    Or,
}

/// Errors raised while *constructing* an [`Expr`] node. Distinct from runtime evaluation, which never fails —
/// `ABSENT`/`⊥` propagation takes the place of a construction-time type error at runtime.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ExprError {
    #[error("operand types {0} and {1} are incompatible for this operator")]
    TypeMismatch(ElementType, ElementType),
    #[error("expected element type {expected}, found {found}")]
    WrongType {
        expected: ElementType,
        found: ElementType,
    },
    #[error("unknown builtin `{0}`")]
    UnknownBuiltin(String),
    #[error("builtin `{name}` expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// The typed expression tree. Every node carries a result
/// [`ElementType`] assigned at construction; comparisons and logical combinators always
/// evaluate to `Bool`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Expr {
    Const(Value),
    Ref {
        target: RefTarget,
        ty: ElementType,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        ty: ElementType,
    },
    Compare {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Logic {
        op: LogicOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        ty: ElementType,
    },
    /// An opaque builtin, declared with a fixed signature.
    Builtin {
        name: String,
        args: Vec<Expr>,
        ty: ElementType,
    },
    /// Lowered away before any pass runs past `flowcore-ir::delay`.
    Delay { inner: Box<Expr>, default: Value },
}

impl Expr {
    /// The result type, as assigned at construction. Panics only on a `Delay` node that
    /// has not yet been lowered, which is a programmer error (an un-lowered `Delay` must
    /// never reach a pass) rather than a user-graph error.
    pub fn result_type(&self) -> ElementType {
        match self {
            Self::Const(v) => v.element_type(),
            Self::Ref { ty, .. } => *ty,
            Self::Binary { ty, .. } => *ty,
            Self::Compare { .. } | Self::Logic { .. } | Self::Not(_) => ElementType::Bool,
            Self::If { ty, .. } => *ty,
            Self::Builtin { ty, .. } => *ty,
            Self::Delay { inner, .. } => inner.result_type(),
        }
    }

    pub fn constant(value: Value) -> Self {
        Self::Const(value)
    }

    pub fn reference(target: RefTarget, ty: ElementType) -> Self {
        Self::Ref { target, ty }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Result<Self, ExprError> {
        let (lt, rt) = (lhs.result_type(), rhs.result_type());
        if lt != rt {
            return Err(ExprError::TypeMismatch(lt, rt));
        }
        if lt == ElementType::Str || lt == ElementType::Bool {
            return Err(ExprError::WrongType {
                expected: ElementType::Int,
                found: lt,
            });
        }
        Ok(Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            ty: lt,
        })
    }

    pub fn compare(op: CmpOp, lhs: Expr, rhs: Expr) -> Result<Self, ExprError> {
        let (lt, rt) = (lhs.result_type(), rhs.result_type());
        if lt != rt {
            return Err(ExprError::TypeMismatch(lt, rt));
        }
        Ok(Self::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn logic(op: LogicOp, lhs: Expr, rhs: Expr) -> Result<Self, ExprError> {
        for operand in [&lhs, &rhs] {
            let t = operand.result_type();
            if t != ElementType::Bool {
                return Err(ExprError::WrongType {
                    expected: ElementType::Bool,
                    found: t,
                });
            }
        }
        Ok(Self::Logic {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn not(operand: Expr) -> Result<Self, ExprError> {
        let t = operand.result_type();
        if t != ElementType::Bool {
            return Err(ExprError::WrongType {
                expected: ElementType::Bool,
                found: t,
            });
        }
        Ok(Self::Not(Box::new(operand)))
    }

    pub fn if_then_else(cond: Expr, then_branch: Expr, else_branch: Expr) -> Result<Self, ExprError> {
        let ct = cond.result_type();
        if ct != ElementType::Bool {
            return Err(ExprError::WrongType {
                expected: ElementType::Bool,
                found: ct,
            });
        }
        let (tt, et) = (then_branch.result_type(), else_branch.result_type());
        if tt != et {
            return Err(ExprError::TypeMismatch(tt, et));
        }
        Ok(Self::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            ty: tt,
        })
    }

    pub fn builtin(
        registry: &crate::builtins::BuiltinRegistry,
        name: impl Into<String>,
        args: Vec<Expr>,
    ) -> Result<Self, ExprError> {
        let name = name.into();
        let sig = registry
            .get(&name)
            .ok_or_else(|| ExprError::UnknownBuiltin(name.clone()))?;
        if sig.params.len() != args.len() {
            return Err(ExprError::ArityMismatch {
                name,
                expected: sig.params.len(),
                found: args.len(),
            });
        }
        for (param_ty, arg) in sig.params.iter().zip(&args) {
            let arg_ty = arg.result_type();
            if *param_ty != arg_ty {
                return Err(ExprError::WrongType {
                    expected: *param_ty,
                    found: arg_ty,
                });
            }
        }
        Ok(Self::Builtin {
            name,
            args,
            ty: sig.result,
        })
    }

    pub fn delay(inner: Expr, default: Value) -> Result<Self, ExprError> {
        let it = inner.result_type();
        let dt = default.element_type();
        if it != dt {
            return Err(ExprError::TypeMismatch(it, dt));
        }
        Ok(Self::Delay {
            inner: Box::new(inner),
            default,
        })
    }

    /// Visits every `Delay` subtree, innermost first is not required — order is irrelevant
    /// since each occurrence is independent.
    pub fn for_each_delay<'a>(&'a self, visit: &mut impl FnMut(&'a Expr, &'a Value)) {
        match self {
            Self::Const(_) | Self::Ref { .. } => {}
            Self::Binary { lhs, rhs, .. } | Self::Compare { lhs, rhs, .. } | Self::Logic { lhs, rhs, .. } => {
                lhs.for_each_delay(visit);
                rhs.for_each_delay(visit);
            }
            Self::Not(inner) => inner.for_each_delay(visit),
            Self::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                cond.for_each_delay(visit);
                then_branch.for_each_delay(visit);
                else_branch.for_each_delay(visit);
            }
            Self::Builtin { args, .. } => {
                for a in args {
                    a.for_each_delay(visit);
                }
            }
            Self::Delay { inner, default } => {
                inner.for_each_delay(visit);
                visit(inner, default);
            }
        }
    }

    /// True iff no `Delay` subtree remains anywhere in this expression.
    pub fn is_delay_free(&self) -> bool {
        let mut found = false;
        self.for_each_delay(&mut |_, _| found = true);
        !found
    }

    /// Every [`RefTarget`] this expression reads, including inside `Delay` (the `Delay`'s
    /// own internal state reference is added during lowering, not here).
    pub fn collect_refs(&self, out: &mut Vec<RefTarget>) {
        match self {
            Self::Const(_) => {}
            Self::Ref { target, .. } => out.push(*target),
            Self::Binary { lhs, rhs, .. } | Self::Compare { lhs, rhs, .. } | Self::Logic { lhs, rhs, .. } => {
                lhs.collect_refs(out);
                rhs.collect_refs(out);
            }
            Self::Not(inner) => inner.collect_refs(out),
            Self::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                cond.collect_refs(out);
                then_branch.collect_refs(out);
                else_branch.collect_refs(out);
            }
            Self::Builtin { args, .. } => {
                for a in args {
                    a.collect_refs(out);
                }
            }
            Self::Delay { inner, .. } => inner.collect_refs(out),
        }
    }
}
