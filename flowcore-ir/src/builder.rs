use std::collections::HashMap;

use crate::builtins::BuiltinRegistry;
use crate::error::IrError;
use crate::ids::{NodeId, PortId, ReactionId, VariableId};
use crate::ir::Ir;
use crate::node::{ContractFlags, Node, NodeKind};
use crate::port::{Direction, Port, PortDescriptor};
use crate::reaction::{Reaction, ReactionDescriptor, RefTarget};
use crate::value::ElementType;
use crate::variable::{Variable, VariableDescriptor};

/// Author-facing description of a node's identity, kind, ports and contract. Reactions are registered separately via
/// [`GraphBuilder::add_reaction`] once the node's ports exist and their ids are known —
/// see `DESIGN.md` for why node registration is split into two calls here instead of one.
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    pub name: String,
    pub kind: NodeKind,
    pub ports: Vec<PortDescriptor>,
    pub contract: ContractFlags,
}

impl NodeDescriptor {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ports: Vec::new(),
            contract: ContractFlags::default(),
        }
    }

    pub fn with_port(mut self, port: PortDescriptor) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_contract(mut self, contract: ContractFlags) -> Self {
        self.contract = contract;
        self
    }
}

fn types_compatible(from: ElementType, to: ElementType) -> bool {
    from == to || (from == ElementType::Int && to == ElementType::Float)
}

/// Accumulates nodes, variables, ports, reactions and edges into a frozen [`Ir`] via
/// `add_node`/`connect`/`compile`. Failures here are host/programmer mistakes
/// (duplicate identity, dangling reference, gross type mismatch) — not semantic findings
/// about an otherwise well-formed graph, which is what the analysis pipeline in
/// `flowcore-analysis` is for.
pub struct GraphBuilder {
    ir: Ir,
    node_names: HashMap<String, NodeId>,
    variable_names: HashMap<String, VariableId>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            ir: Ir {
                builtins: BuiltinRegistry::with_defaults(),
                ..Default::default()
            },
            node_names: HashMap::new(),
            variable_names: HashMap::new(),
        }
    }

    pub fn with_builtins(registry: BuiltinRegistry) -> Self {
        let mut builder = Self::new();
        builder.ir.builtins = registry;
        builder
    }

    pub fn add_variable(&mut self, descriptor: VariableDescriptor) -> Result<VariableId, IrError> {
        if self.variable_names.contains_key(&descriptor.name) {
            return Err(IrError::DuplicateVariable(descriptor.name));
        }
        let name = descriptor.name.clone();
        let id = self.ir.variables.insert_with_key(|id| Variable {
            id,
            name: descriptor.name,
            element_type: descriptor.element_type,
            initial_value: descriptor.initial_value,
            policy: descriptor.policy,
        });
        self.variable_names.insert(name, id);
        Ok(id)
    }

    pub fn add_node(&mut self, descriptor: NodeDescriptor) -> Result<NodeId, IrError> {
        if self.node_names.contains_key(&descriptor.name) {
            return Err(IrError::DuplicateNode(descriptor.name));
        }
        let node_id = self.ir.nodes.insert_with_key(|id| Node {
            id,
            name: descriptor.name.clone(),
            kind: descriptor.kind,
            ports: smallvec::SmallVec::new(),
            reactions: smallvec::SmallVec::new(),
            contract: descriptor.contract,
        });
        let mut port_ids: smallvec::SmallVec<[PortId; 4]> = smallvec::SmallVec::with_capacity(descriptor.ports.len());
        for port_desc in descriptor.ports {
            let port_id = self.ir.ports.insert_with_key(|id| Port {
                id,
                name: port_desc.name,
                owner: node_id,
                direction: port_desc.direction,
                element_type: port_desc.element_type,
                default: port_desc.default,
                rate: port_desc.rate,
                variable_subscription: port_desc.variable_subscription,
            });
            port_ids.push(port_id);
        }
        self.ir.nodes[node_id].ports = port_ids;
        self.node_names.insert(descriptor.name, node_id);
        Ok(node_id)
    }

    pub fn port_id(&self, node: NodeId, port_name: &str) -> Result<PortId, IrError> {
        let node_record = self
            .ir
            .nodes
            .get(node)
            .ok_or_else(|| IrError::UnknownNode(format!("{node:?}")))?;
        node_record
            .port_named(&self.ir.ports, port_name)
            .map(|p| p.id)
            .ok_or_else(|| IrError::UnknownPort(port_name.to_string(), node_record.name.clone()))
    }

    pub fn variable_id(&self, name: &str) -> Result<VariableId, IrError> {
        self.variable_names
            .get(name)
            .copied()
            .ok_or_else(|| IrError::UnknownVariable(name.to_string()))
    }

    /// Register a reaction on an already-added node. Every [`RefTarget::Port`] it reads
    /// or writes must belong to `node`; every [`RefTarget::Variable`] must already exist.
    pub fn add_reaction(
        &mut self,
        node: NodeId,
        descriptor: ReactionDescriptor,
    ) -> Result<ReactionId, IrError> {
        let node_record = self
            .ir
            .nodes
            .get(node)
            .ok_or_else(|| IrError::UnknownNode(format!("{node:?}")))?
            .clone();

        for read in &descriptor.reads {
            self.validate_read(&node_record, *read)?;
        }
        for (target, _) in &descriptor.outputs {
            self.validate_write(&node_record, *target)?;
        }

        let reaction_id = self.ir.reactions.insert_with_key(|id| Reaction {
            id,
            name: descriptor.name,
            owner: node,
            reads: descriptor.reads,
            outputs: descriptor.outputs,
            rank: descriptor.rank,
            max_microsteps: descriptor.max_microsteps,
            contract: descriptor.contract,
        });
        self.ir.nodes[node].reactions.push(reaction_id);
        Ok(reaction_id)
    }

    fn validate_read(&self, node: &Node, target: RefTarget) -> Result<(), IrError> {
        match target {
            RefTarget::Port(id) => {
                let port = self
                    .ir
                    .ports
                    .get(id)
                    .ok_or_else(|| IrError::UnknownPort(format!("{id:?}"), node.name.clone()))?;
                if port.owner != node.id {
                    return Err(IrError::UnknownPort(port.name.clone(), node.name.clone()));
                }
                Ok(())
            }
            RefTarget::Variable(id) => self
                .ir
                .variables
                .get(id)
                .map(|_| ())
                .ok_or_else(|| IrError::UnknownVariable(format!("{id:?}"))),
            RefTarget::State(_) => Ok(()),
        }
    }

    fn validate_write(&self, node: &Node, target: RefTarget) -> Result<(), IrError> {
        match target {
            RefTarget::Port(id) => {
                let port = self
                    .ir
                    .ports
                    .get(id)
                    .ok_or_else(|| IrError::UnknownPort(format!("{id:?}"), node.name.clone()))?;
                if port.owner != node.id {
                    return Err(IrError::UnknownPort(port.name.clone(), node.name.clone()));
                }
                if port.direction != Direction::Output {
                    return Err(IrError::NotAnInput(port.name.clone()));
                }
                Ok(())
            }
            RefTarget::Variable(id) => self
                .ir
                .variables
                .get(id)
                .map(|_| ())
                .ok_or_else(|| IrError::UnknownVariable(format!("{id:?}"))),
            RefTarget::State(_) => Ok(()),
        }
    }

    /// Create an edge from `from` (must be an `Output`) to `to` (must be an `Input` with
    /// no existing source — fan-in > 1 is rejected immediately). Gross type mismatches
    /// (anything but an exact match or an `Int -> Float` widening) are rejected here;
    /// the widening case itself is re-flagged as `TYPE001` by the structural pass.
    pub fn connect(&mut self, from: PortId, to: PortId) -> Result<(), IrError> {
        let from_port = self
            .ir
            .ports
            .get(from)
            .ok_or_else(|| IrError::UnknownPort(format!("{from:?}"), String::new()))?;
        if from_port.direction != Direction::Output {
            return Err(IrError::NotAnOutput(from_port.name.clone()));
        }
        let to_port = self
            .ir
            .ports
            .get(to)
            .ok_or_else(|| IrError::UnknownPort(format!("{to:?}"), String::new()))?;
        if to_port.direction != Direction::Input {
            return Err(IrError::NotAnInput(to_port.name.clone()));
        }
        if !types_compatible(from_port.element_type, to_port.element_type) {
            return Err(IrError::TypeMismatch {
                from: from_port.name.clone(),
                from_ty: from_port.element_type,
                to: to_port.name.clone(),
                to_ty: to_port.element_type,
            });
        }
        let already_fed = to_port.variable_subscription.is_some()
            || self.ir.edges.iter().any(|e| e.to == to);
        if already_fed {
            return Err(IrError::FanInViolation(to_port.name.clone()));
        }
        self.ir.edges.push(crate::edge::Edge { from, to });
        Ok(())
    }

    /// Freeze the accumulated graph. Delay lowering runs immediately so every
    /// downstream consumer — analysis passes and the scheduler alike — only ever sees a
    /// delay-free IR.
    pub fn build(mut self) -> Ir {
        crate::delay::lower_delays(&mut self.ir);
        self.ir
    }
}
