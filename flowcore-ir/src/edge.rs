use crate::ids::PortId;

/// A directed connection from one output port to one input port. Fan-out (one
/// output feeding several inputs) is simply several `Edge`s sharing the same `from`;
/// fan-in greater than one on an `Input` is rejected (`STRUCT002`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Edge {
    pub from: PortId,
    pub to: PortId,
}
