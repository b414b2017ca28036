use std::collections::HashMap;

use slotmap::SlotMap;

use flowcore_diagnostics::EntityRef;

use crate::builtins::BuiltinRegistry;
use crate::edge::Edge;
use crate::ids::{NodeId, PortId, ReactionId, StateId, VariableId};
use crate::node::Node;
use crate::port::Port;
use crate::reaction::{Reaction, RefTarget};
use crate::value::ElementType;
use crate::variable::{State, Variable};

/// A static per-tick firing schedule for one synchronous-dataflow component, computed by
/// the SDF pass (`flowcore-analysis::sdf`) and consumed by the scheduler to drive its inner
/// loop directly instead of the generic dirty-propagation loop, per the rate-balanced
/// schedule the pass solved for.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SdfSchedule {
    /// How many times each node in the component fires per macro-period (one tick).
    pub firings: HashMap<NodeId, u64>,
}

impl SdfSchedule {
    /// The component's nodes, firing-count descending then by a stable id-derived order —
    /// the sequence the scheduler actually drives: every node with a remaining firing in
    /// round-robin order until every node has fired its declared count.
    pub fn sequence(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.firings.keys().copied().collect();
        nodes.sort_by_key(|n| format!("{n:?}"));
        let max = self.firings.values().copied().max().unwrap_or(0);
        let mut out = Vec::new();
        for round in 0..max {
            for &node in &nodes {
                if self.firings[&node] > round {
                    out.push(node);
                }
            }
        }
        out
    }
}

/// One admitted algebraic cycle: reactions mutually reachable along instantaneous
/// dependency edges, recorded by the causality pass after it proved the cycle
/// constructively eligible. The scheduler scopes its microstep budget to these groups
/// rather than the whole tick.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SccGroup {
    pub members: Vec<ReactionId>,
}

/// A post-commit write recorded by delay lowering: evaluating `expr` over the
/// tick's *just-committed* environment, then storing the result into `state` — visible
/// only starting the next tick's propose phase.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DelayedWrite {
    pub state: StateId,
    pub owner_reaction: ReactionId,
    pub occurrence: usize,
    pub expr: crate::expr::Expr,
}

/// The frozen, canonical IR. Built once per compile by
/// [`crate::builder::GraphBuilder::build`]; the analysis pipeline and the scheduler both
/// read it, and delay lowering is the one pass that mutates it before any
/// other pass runs.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Ir {
    pub nodes: SlotMap<NodeId, Node>,
    pub ports: SlotMap<PortId, Port>,
    pub variables: SlotMap<VariableId, Variable>,
    pub reactions: SlotMap<ReactionId, Reaction>,
    pub states: SlotMap<StateId, State>,
    pub edges: Vec<Edge>,
    pub delayed_writes: Vec<DelayedWrite>,
    /// Admitted algebraic cycles, populated by the causality pass. Empty until
    /// `flowcore_analysis::causality::run` has executed.
    pub scc_groups: Vec<SccGroup>,
    /// Static SDF firing schedules, populated by the SDF pass for every rated component
    /// whose firing vector is both consistent and boundedly bufferable. Empty until
    /// `flowcore_analysis::sdf::run` has executed.
    pub sdf_schedules: Vec<SdfSchedule>,
    #[serde(skip)]
    pub builtins: BuiltinRegistry,
}

impl Ir {
    /// True once [`crate::delay::lower_delays`] has run: no reaction output or rank
    /// expression contains a `Delay` subtree anymore.
    pub fn is_delay_free(&self) -> bool {
        self.reactions.values().all(|r| {
            r.outputs.iter().all(|(_, e)| e.is_delay_free())
                && r.rank.as_ref().is_none_or(crate::expr::Expr::is_delay_free)
        })
    }

    pub fn element_type_of(&self, target: RefTarget) -> Option<ElementType> {
        match target {
            RefTarget::Port(id) => self.ports.get(id).map(|p| p.element_type),
            RefTarget::Variable(id) => self.variables.get(id).map(|v| v.element_type),
            RefTarget::State(id) => self.states.get(id).map(|s| s.element_type),
        }
    }

    pub fn ref_name(&self, target: RefTarget) -> EntityRef {
        match target {
            RefTarget::Port(id) => EntityRef::Port(
                self.ports
                    .get(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "<unknown port>".to_string()),
            ),
            RefTarget::Variable(id) => EntityRef::Variable(
                self.variables
                    .get(id)
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| "<unknown variable>".to_string()),
            ),
            RefTarget::State(id) => EntityRef::State(
                self.states
                    .get(id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| "<unknown state>".to_string()),
            ),
        }
    }

    pub fn node_ref(&self, id: NodeId) -> EntityRef {
        EntityRef::Node(
            self.nodes
                .get(id)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| "<unknown node>".to_string()),
        )
    }

    pub fn reaction_ref(&self, id: ReactionId) -> EntityRef {
        EntityRef::Reaction(
            self.reactions
                .get(id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "<unknown reaction>".to_string()),
        )
    }

    /// All reactions, grouped by owning node.
    pub fn reactions_by_node(&self) -> std::collections::BTreeMap<NodeId, Vec<ReactionId>> {
        let mut map: std::collections::BTreeMap<NodeId, Vec<ReactionId>> = Default::default();
        for (id, reaction) in self.reactions.iter() {
            map.entry(reaction.owner).or_default().push(id);
        }
        map
    }

    pub fn reaction(&self, id: ReactionId) -> &Reaction {
        &self.reactions[id]
    }
}
