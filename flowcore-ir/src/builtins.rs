use std::collections::HashMap;

use crate::value::{ElementType, Value};

/// A builtin's declared signature: argument types and a result type.
#[derive(Clone)]
pub struct BuiltinSignature {
    pub params: Vec<ElementType>,
    pub result: ElementType,
    pub apply: fn(&[Value]) -> Option<Value>,
}

/// A table of builtins consulted at [`crate::expr::Expr::Builtin`] construction time,
/// in the same table-of-operators style as `dfir_lang::graph::ops`'s static
/// `OperatorConstraints` registry, minus its `syn`/proc-macro machinery, which has no
/// counterpart in a runtime-built, non-macro IR.
#[derive(Clone, Default)]
pub struct BuiltinRegistry {
    table: HashMap<String, BuiltinSignature>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, sig: BuiltinSignature) {
        self.table.insert(name.into(), sig);
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinSignature> {
        self.table.get(name)
    }

    /// A registry with a couple of representative numeric builtins (`abs`, `clamp`) so the
    /// extension point is exercised end to end without requiring every host to populate it.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register(
            "abs",
            BuiltinSignature {
                params: vec![ElementType::Int],
                result: ElementType::Int,
                apply: |args| match args {
                    [Value::Int(v)] => Some(Value::Int(v.abs())),
                    _ => None,
                },
            },
        );
        reg.register(
            "clamp",
            BuiltinSignature {
                params: vec![ElementType::Int, ElementType::Int, ElementType::Int],
                result: ElementType::Int,
                apply: |args| match args {
                    [Value::Int(v), Value::Int(lo), Value::Int(hi)] => {
                        Some(Value::Int((*v).clamp(*lo, *hi)))
                    }
                    _ => None,
                },
            },
        );
        reg
    }
}
