use crate::ids::{ReactionId, VariableId};
use crate::value::{ElementType, Value};

/// A monoidal merge operator for [`WritePolicy::Monoid`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MonoidOp {
    /// Idempotent, bounded only by the domain — `Value::Int`/`Value::Float`/`Value::Bool`.
    Max,
    /// Idempotent, same caveats as `Max`.
    Min,
    /// Not a join-semilattice merge in the strict sense (it isn't idempotent), but
    /// accepted as a monoid anyway. Always [`LatticeHeight::Unbounded`] for numeric
    /// domains since there is no finite bound on a running sum.
    Sum,
    /// An author-supplied monoid, identified by name only; the core cannot check its
    /// algebraic laws and trusts the declared [`LatticeHeight`].
    Custom(String),
}

/// Whether a policy's value domain has a known bound on the number of distinct values
/// reachable by repeated merge from the identity — used by the causality pass to bound
/// constructive fixed-point iteration: total iterations cannot exceed the sum of every
/// SCC member's declared height.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LatticeHeight {
    Bounded(u32),
    Unbounded,
}

/// Describes a [`WritePolicy::Monoid`] instance fully enough for the causality pass to
/// reason about eligibility for constructive evaluation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LatticeDescriptor {
    pub op: MonoidOp,
    pub identity: Value,
    pub height: LatticeHeight,
}

impl LatticeDescriptor {
    pub fn max_bool() -> Self {
        Self {
            op: MonoidOp::Max,
            identity: Value::Bool(false),
            height: LatticeHeight::Bounded(1),
        }
    }

    pub fn min_bool() -> Self {
        Self {
            op: MonoidOp::Min,
            identity: Value::Bool(true),
            height: LatticeHeight::Bounded(1),
        }
    }

    pub fn max_int() -> Self {
        Self {
            op: MonoidOp::Max,
            identity: Value::Int(i64::MIN),
            height: LatticeHeight::Unbounded,
        }
    }

    pub fn min_int() -> Self {
        Self {
            op: MonoidOp::Min,
            identity: Value::Int(i64::MAX),
            height: LatticeHeight::Unbounded,
        }
    }

    pub fn sum_int() -> Self {
        Self {
            op: MonoidOp::Sum,
            identity: Value::Int(0),
            height: LatticeHeight::Unbounded,
        }
    }

    pub fn sum_float() -> Self {
        Self {
            op: MonoidOp::Sum,
            identity: Value::Float(0.0),
            height: LatticeHeight::Unbounded,
        }
    }

    /// A bounded-height domain declared by the author (e.g. a saturating counter capped
    /// at `n`), which is what makes a monoid eligible for a constructive SCC in practice.
    pub fn bounded(op: MonoidOp, identity: Value, height: u32) -> Self {
        Self {
            op,
            identity,
            height: LatticeHeight::Bounded(height),
        }
    }
}

/// How concurrent writers to a [`Variable`] in the same tick are resolved.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum WritePolicy {
    /// More than one concrete writer per tick is a runtime [`WritePolicyError`]
    /// (`flowcore-runtime`) and, statically, `WRITE001`.
    Error,
    /// Last-writer-wins, tie-broken by a declared producer priority list (earlier entries
    /// win). An empty or tied priority list is `WRITE002`.
    LastWriterWins { priority: Vec<ReactionId> },
    /// Any number of writers accepted; resolved by repeatedly merging intents with
    /// `descriptor.op` starting from `descriptor.identity`.
    Monoid { descriptor: LatticeDescriptor },
}

impl WritePolicy {
    /// Only a monoidal policy is monotone in the sense the causality pass requires for an
    /// algebraic cycle to be constructively eligible.
    pub fn is_monotone(&self) -> bool {
        matches!(self, Self::Monoid { .. })
    }

    pub fn lattice_height(&self) -> Option<LatticeHeight> {
        match self {
            Self::Monoid { descriptor } => Some(descriptor.height),
            _ => None,
        }
    }
}

/// A shared, pipeline-scoped variable. A [`crate::node::State`] is a `Variable`
/// whose scope is a single node — the core represents both with this type and
/// distinguishes scope at the [`crate::node::Node`] level.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub element_type: ElementType,
    pub initial_value: Option<Value>,
    pub policy: WritePolicy,
}

/// A node-scoped `State`. In this core, every `State` is a hidden delay state,
/// allocated in an arena keyed by `(reaction, occurrence index)` and
/// never exposed through the public API — authors never construct a `StateId` directly.
///
/// `State` has no [`WritePolicy`]: it has exactly one writer by construction (the
/// deferred post-commit write recorded alongside it), so the multi-writer conflict
/// machinery `Variable` needs does not apply.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct State {
    pub id: crate::ids::StateId,
    pub name: String,
    pub element_type: ElementType,
    pub initial_value: Value,
    pub owner: crate::ids::NodeId,
}

/// Author-facing description of a variable, consumed by [`crate::builder::GraphBuilder`].
#[derive(Debug, Clone)]
pub struct VariableDescriptor {
    pub name: String,
    pub element_type: ElementType,
    pub initial_value: Option<Value>,
    pub policy: WritePolicy,
}

impl VariableDescriptor {
    pub fn new(name: impl Into<String>, element_type: ElementType, policy: WritePolicy) -> Self {
        Self {
            name: name.into(),
            element_type,
            initial_value: None,
            policy,
        }
    }

    pub fn with_initial(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }
}
