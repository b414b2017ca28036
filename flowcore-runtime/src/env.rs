//! The scheduler's working environment: every port, variable, and hidden delay state's
//! current value. `None` is `ABSENT`; this is the same convention
//! [`flowcore_ir::eval::eval_concrete`] expects from its [`flowcore_ir::eval::ConcreteEnv`].

use std::collections::HashMap;

use flowcore_ir::{Ir, PortId, RefTarget, StateId, Value, VariableId};

#[derive(Debug, Clone)]
pub struct Env {
    pub ports: HashMap<PortId, Option<Value>>,
    pub variables: HashMap<VariableId, Option<Value>>,
    pub states: HashMap<StateId, Value>,
}

impl Env {
    pub fn seeded(ir: &Ir) -> Self {
        let variables = ir
            .variables
            .iter()
            .map(|(id, v)| (id, v.initial_value.clone()))
            .collect();
        let states = ir.states.iter().map(|(id, s)| (id, s.initial_value.clone())).collect();
        Self {
            ports: HashMap::new(),
            variables,
            states,
        }
    }

    /// Resets every port to `ABSENT`, or its declared default, at the start of a tick.
    /// Variables and hidden states persist across ticks by definition.
    pub fn start_tick(&mut self, ir: &Ir) {
        self.ports.clear();
        for port in ir.ports.values() {
            self.ports.insert(port.id, port.default.clone());
        }
    }

    pub fn get(&self, target: RefTarget) -> Option<Value> {
        match target {
            RefTarget::Port(id) => self.ports.get(&id).cloned().flatten(),
            RefTarget::Variable(id) => self.variables.get(&id).cloned().flatten(),
            RefTarget::State(id) => self.states.get(&id).cloned(),
        }
    }

    pub fn set(&mut self, target: RefTarget, value: Option<Value>) {
        match target {
            RefTarget::Port(id) => {
                self.ports.insert(id, value);
            }
            RefTarget::Variable(id) => {
                self.variables.insert(id, value);
            }
            RefTarget::State(id) => {
                if let Some(v) = value {
                    self.states.insert(id, v);
                }
            }
        }
    }
}

pub struct EnvView<'a>(pub &'a Env);

impl flowcore_ir::eval::ConcreteEnv for EnvView<'_> {
    fn lookup(&self, target: RefTarget) -> Option<Value> {
        self.0.get(target)
    }
}
