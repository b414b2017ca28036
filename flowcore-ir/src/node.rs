use smallvec::SmallVec;

use crate::ids::{NodeId, PortId, ReactionId};

/// Dispatch tag for a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    /// Pure, side-effect-free, deterministic. May participate in constructive cycles.
    Core,
    /// Sandboxed; may participate in constructive cycles only if `contract.monotone`.
    Ext,
    /// Unrestricted/unsafe. Never eligible for an algebraic cycle.
    Raw,
    /// Hybrid boundary to a continuous-time integrator.
    ContinuousWrapper,
}

/// Contract flags a node's author declares and the causality/init passes trust.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ContractFlags {
    pub deterministic: bool,
    pub side_effect_free: bool,
    /// Required for an `Ext` node to participate in an algebraic cycle (`CAUS002` otherwise).
    pub monotone: bool,
    /// Breaks an otherwise-instantaneous dependency edge even without a `Delay`, e.g. a
    /// node whose author asserts it never closes a loop within one tick.
    pub no_instant_loop: bool,
    /// Present only on `Raw` nodes claiming to do something the core cannot verify is safe;
    /// documents *why*, it does not suppress any check.
    pub unsafe_reason: Option<String>,
}

/// A node: identity, kind, owned ports and reactions, and contract flags.
/// Most nodes carry a handful of ports/reactions, so both are inlined up to 4 entries
/// rather than heap-allocated per node, the same small-collection tradeoff
/// `dfir_rs::compiled::pull::half_join_state` makes with `SmallVec`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub ports: SmallVec<[PortId; 4]>,
    pub reactions: SmallVec<[ReactionId; 4]>,
    pub contract: ContractFlags,
}

impl Node {
    pub fn port_named<'a>(
        &self,
        ports: &'a slotmap::SlotMap<PortId, crate::port::Port>,
        name: &str,
    ) -> Option<&'a crate::port::Port> {
        self.ports
            .iter()
            .filter_map(|id| ports.get(*id))
            .find(|p| p.name == name)
    }
}
