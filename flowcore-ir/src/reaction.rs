use crate::expr::Expr;
use crate::ids::{NodeId, PortId, ReactionId, StateId, VariableId};
use crate::node::ContractFlags;

/// A resolved reference to something a [`Reaction`] reads or writes. Carries an id,
/// never a name — an AST reference resolves to `(kind, id)`, not a string lookup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RefTarget {
    Port(PortId),
    Variable(VariableId),
    State(StateId),
}

/// A reaction: identity, owner, reads, one AST per write, and optional rank/microstep
/// budget used by the non-Zeno check.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Reaction {
    pub id: ReactionId,
    pub name: String,
    pub owner: NodeId,
    pub reads: Vec<RefTarget>,
    pub outputs: Vec<(RefTarget, Expr)>,
    pub rank: Option<Expr>,
    pub max_microsteps: Option<u32>,
    pub contract: ContractFlags,
}

impl Reaction {
    /// Static writers: every target this reaction's outputs possibly write.
    pub fn write_targets(&self) -> impl Iterator<Item = RefTarget> + '_ {
        self.outputs.iter().map(|(target, _)| *target)
    }
}

/// Author-facing description of a reaction, consumed by [`crate::builder::GraphBuilder::add_node`].
#[derive(Debug, Clone, Default)]
pub struct ReactionDescriptor {
    pub name: String,
    pub reads: Vec<RefTarget>,
    pub outputs: Vec<(RefTarget, Expr)>,
    pub rank: Option<Expr>,
    pub max_microsteps: Option<u32>,
    pub contract: ContractFlags,
}

impl ReactionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn reading(mut self, target: RefTarget) -> Self {
        self.reads.push(target);
        self
    }

    pub fn writing(mut self, target: RefTarget, expr: Expr) -> Self {
        self.outputs.push((target, expr));
        self
    }

    pub fn with_rank(mut self, rank: Expr, max_microsteps: u32) -> Self {
        self.rank = Some(rank);
        self.max_microsteps = Some(max_microsteps);
        self
    }

    pub fn with_contract(mut self, contract: ContractFlags) -> Self {
        self.contract = contract;
        self
    }
}
