//! Delay lowering: the one transform that runs on the frozen [`Ir`] before any
//! analysis pass. After it returns, [`Ir::is_delay_free`] holds.

use crate::expr::Expr;
use crate::ids::{NodeId, ReactionId};
use crate::ir::{DelayedWrite, Ir};
use crate::reaction::RefTarget;
use crate::value::Value;
use crate::variable::State;

/// Rewrite every `Delay(e, d)` reachable from `expr` into a reference to a freshly
/// allocated hidden state, recording a [`DelayedWrite`] of `e` for each occurrence.
fn lower_expr(
    expr: Expr,
    owner: NodeId,
    reaction: ReactionId,
    reaction_name: &str,
    occurrence: &mut usize,
    ir: &mut Ir,
) -> Expr {
    match expr {
        Expr::Const(_) | Expr::Ref { .. } => expr,
        Expr::Binary { op, lhs, rhs, ty } => Expr::Binary {
            op,
            lhs: Box::new(lower_expr(*lhs, owner, reaction, reaction_name, occurrence, ir)),
            rhs: Box::new(lower_expr(*rhs, owner, reaction, reaction_name, occurrence, ir)),
            ty,
        },
        Expr::Compare { op, lhs, rhs } => Expr::Compare {
            op,
            lhs: Box::new(lower_expr(*lhs, owner, reaction, reaction_name, occurrence, ir)),
            rhs: Box::new(lower_expr(*rhs, owner, reaction, reaction_name, occurrence, ir)),
        },
        Expr::Logic { op, lhs, rhs } => Expr::Logic {
            op,
            lhs: Box::new(lower_expr(*lhs, owner, reaction, reaction_name, occurrence, ir)),
            rhs: Box::new(lower_expr(*rhs, owner, reaction, reaction_name, occurrence, ir)),
        },
        Expr::Not(inner) => Expr::Not(Box::new(lower_expr(
            *inner,
            owner,
            reaction,
            reaction_name,
            occurrence,
            ir,
        ))),
        Expr::If {
            cond,
            then_branch,
            else_branch,
            ty,
        } => Expr::If {
            cond: Box::new(lower_expr(*cond, owner, reaction, reaction_name, occurrence, ir)),
            then_branch: Box::new(lower_expr(
                *then_branch,
                owner,
                reaction,
                reaction_name,
                occurrence,
                ir,
            )),
            else_branch: Box::new(lower_expr(
                *else_branch,
                owner,
                reaction,
                reaction_name,
                occurrence,
                ir,
            )),
            ty,
        },
        Expr::Builtin { name, args, ty } => Expr::Builtin {
            name,
            args: args
                .into_iter()
                .map(|a| lower_expr(a, owner, reaction, reaction_name, occurrence, ir))
                .collect(),
            ty,
        },
        Expr::Delay { inner, default } => {
            // Lower the inner expression first in case it itself contains nested delays.
            let inner = lower_expr(*inner, owner, reaction, reaction_name, occurrence, ir);
            let ty = inner.result_type();
            let state_name = format!("{reaction_name}$delay{occurrence}");
            *occurrence += 1;
            let state_id = ir.states.insert_with_key(|id| State {
                id,
                name: state_name,
                element_type: ty,
                initial_value: default,
                owner,
            });
            ir.delayed_writes.push(DelayedWrite {
                state: state_id,
                owner_reaction: reaction,
                occurrence: *occurrence - 1,
                expr: inner,
            });
            Expr::Ref {
                target: RefTarget::State(state_id),
                ty,
            }
        }
    }
}

/// Run delay lowering over every reaction's outputs and rank expression.
pub fn lower_delays(ir: &mut Ir) {
    let reaction_ids: Vec<ReactionId> = ir.reactions.keys().collect();
    for reaction_id in reaction_ids {
        let (owner, name, outputs, rank) = {
            let r = &ir.reactions[reaction_id];
            (r.owner, r.name.clone(), r.outputs.clone(), r.rank.clone())
        };
        let mut occurrence = 0usize;
        let new_outputs: Vec<_> = outputs
            .into_iter()
            .map(|(target, expr)| {
                (
                    target,
                    lower_expr(expr, owner, reaction_id, &name, &mut occurrence, ir),
                )
            })
            .collect();
        let new_rank = rank.map(|expr| lower_expr(expr, owner, reaction_id, &name, &mut occurrence, ir));
        let r = &mut ir.reactions[reaction_id];
        r.outputs = new_outputs;
        r.rank = new_rank;
    }
    debug_assert!(ir.is_delay_free());
}
