//! Port classification of one primitive.

use udpc_ir::{Direction, Netlist, NodeId, NodeKind};

/// Per-primitive state of the traversal. A fresh context is created at
/// every primitive, so nothing leaks from one primitive into the next.
#[derive(Debug, Clone)]
pub struct PortContext {
    pub primitive: NodeId,
    pub name: String,
    /// Input ports in declaration order
    pub inputs: Vec<NodeId>,
    /// Every other port in declaration order
    pub outputs: Vec<NodeId>,
    /// The first output was declared before any input
    pub first_is_output: bool,
}

impl PortContext {
    pub fn new(primitive: NodeId, name: impl Into<String>) -> Self {
        Self {
            primitive,
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            first_is_output: false,
        }
    }

    /// Records `var` if it is a port. Non-port variables are ignored.
    pub fn classify(&mut self, netlist: &Netlist, var: NodeId) {
        let NodeKind::Var { direction, .. } = netlist.kind(var) else {
            return;
        };
        match direction {
            Direction::None => {}
            Direction::Input => self.inputs.push(var),
            Direction::Output | Direction::Inout => {
                self.outputs.push(var);
                if self.outputs.len() == 1 && self.inputs.is_empty() {
                    self.first_is_output = true;
                }
            }
        }
    }

    /// Location of `node` for a diagnostic about this primitive.
    pub fn location(&self, netlist: &Netlist, node: NodeId) -> String {
        format!("{} in primitive `{}`", netlist.location(node), self.name)
    }
}
