use crate::ids::{NodeId, PortId, VariableId};
use crate::value::{ElementType, Value};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Input,
    Output,
}

/// A typed port belonging to a [`crate::node::Node`].
///
/// `rate`, if set, is tokens-per-firing for the synchronous-dataflow pass;
/// an unset rate means event-driven.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub owner: NodeId,
    pub direction: Direction,
    pub element_type: ElementType,
    pub default: Option<Value>,
    pub rate: Option<u32>,
    /// Set only for `Input` ports that subscribe directly to a shared [`crate::variable::Variable`]
    /// rather than (or in addition to, which is a fan-in violation) an output-port edge.
    pub variable_subscription: Option<VariableId>,
}

/// Author-facing description of a port, consumed by [`crate::builder::GraphBuilder::add_node`].
#[derive(Debug, Clone)]
pub struct PortDescriptor {
    pub name: String,
    pub direction: Direction,
    pub element_type: ElementType,
    pub default: Option<Value>,
    pub rate: Option<u32>,
    pub variable_subscription: Option<VariableId>,
}

impl PortDescriptor {
    pub fn input(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Input,
            element_type,
            default: None,
            rate: None,
            variable_subscription: None,
        }
    }

    pub fn output(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Output,
            element_type,
            default: None,
            rate: None,
            variable_subscription: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn subscribing(mut self, variable: VariableId) -> Self {
        self.variable_subscription = Some(variable);
        self
    }
}
