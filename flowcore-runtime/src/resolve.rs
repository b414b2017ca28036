//! Write-policy resolution: folds every reaction's proposed
//! intent for a target into the single value that gets committed this microstep.
//!
//! `ABSENT` proposals never conflict — they carry no information, so they are filtered out
//! before a policy ever sees them. Under a monoidal policy, ABSENT behaves as the monoid's
//! identity element; generalized here to every policy, since a reaction proposing
//! ABSENT is indistinguishable at resolve time from one that simply didn't fire.

use flowcore_ir::{ReactionId, Value, VariableId, WritePolicy};
use lattices::Merge;

use crate::error::WritePolicyError;

/// `existing` is the variable's value as of the start of this microstep (or `None` before
/// any write has ever committed); `proposals` is every `(writer, Some(value))` pair from
/// this microstep's propose phase, already filtered of `ABSENT`s by the caller.
pub fn resolve_variable(
    variable: VariableId,
    policy: &WritePolicy,
    existing: Option<&Value>,
    proposals: &[(ReactionId, Value)],
) -> Result<Option<Value>, WritePolicyError> {
    if proposals.is_empty() {
        return Ok(existing.cloned());
    }
    match policy {
        WritePolicy::Error => {
            if proposals.len() > 1 {
                return Err(WritePolicyError::MultipleWriters {
                    variable,
                    writers: proposals.len(),
                });
            }
            Ok(Some(proposals[0].1.clone()))
        }
        WritePolicy::LastWriterWins { priority } => {
            for candidate in priority {
                if let Some((_, value)) = proposals.iter().find(|(r, _)| r == candidate) {
                    return Ok(Some(value.clone()));
                }
            }
            // No proposer appears in the priority list: static analysis (WRITE002) should
            // already have flagged this graph; fall back to the first proposal by id order
            // for a well-defined runtime result instead of panicking.
            Ok(proposals.first().map(|(_, v)| v.clone()))
        }
        WritePolicy::Monoid { descriptor } => {
            let mut acc = existing.cloned().unwrap_or_else(|| descriptor.identity.clone());
            for (_, value) in proposals {
                acc = merge_monoid(&descriptor.op, acc, value.clone());
            }
            Ok(Some(acc))
        }
    }
}

fn merge_monoid(op: &flowcore_ir::MonoidOp, a: Value, b: Value) -> Value {
    use flowcore_ir::MonoidOp;
    match (op, &a, &b) {
        (MonoidOp::Max, Value::Int(x), Value::Int(y)) => {
            let mut lhs = lattices::Max::new(*x);
            lhs.merge(lattices::Max::new(*y));
            Value::Int(lhs.into_reveal())
        }
        (MonoidOp::Max, Value::Float(x), Value::Float(y)) => {
            let mut lhs = lattices::Max::new(flowcore_ir::OrderedFloat(*x));
            lhs.merge(lattices::Max::new(flowcore_ir::OrderedFloat(*y)));
            Value::Float(lhs.into_reveal().0)
        }
        (MonoidOp::Max, Value::Bool(x), Value::Bool(y)) => Value::Bool(*x || *y),
        (MonoidOp::Min, Value::Int(x), Value::Int(y)) => {
            let mut lhs = lattices::Min::new(*x);
            lhs.merge(lattices::Min::new(*y));
            Value::Int(lhs.into_reveal())
        }
        (MonoidOp::Min, Value::Float(x), Value::Float(y)) => {
            let mut lhs = lattices::Min::new(flowcore_ir::OrderedFloat(*x));
            lhs.merge(lattices::Min::new(flowcore_ir::OrderedFloat(*y)));
            Value::Float(lhs.into_reveal().0)
        }
        (MonoidOp::Min, Value::Bool(x), Value::Bool(y)) => Value::Bool(*x && *y),
        (MonoidOp::Sum, Value::Int(x), Value::Int(y)) => Value::Int(x + y),
        (MonoidOp::Sum, Value::Float(x), Value::Float(y)) => Value::Float(x + y),
        (MonoidOp::Custom(_), _, _) => {
            unreachable!("WRITE003 rejects MonoidOp::Custom at compile time; no graph reaching the runtime declares one")
        }
        _ => b,
    }
}
