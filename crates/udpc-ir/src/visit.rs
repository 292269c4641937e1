//! Read-only visitor over the IR tree
//!
//! [`Visitor::visit_node`] dispatches on the node kind to the specific
//! `visit_*` hook. Every hook defaults to [`walk_children`], so an
//! implementation only overrides the kinds it cares about and everything else
//! is forwarded to the children.

use crate::netlist::Netlist;
use crate::node::{NodeId, NodeKind};

pub trait Visitor {
    fn visit_node(&mut self, netlist: &Netlist, id: NodeId) {
        match netlist.kind(id) {
            NodeKind::Primitive { .. } => self.visit_primitive(netlist, id),
            NodeKind::Module { .. } => self.visit_module(netlist, id),
            NodeKind::Var { .. } => self.visit_var(netlist, id),
            NodeKind::UdpTable { .. } => self.visit_udp_table(netlist, id),
            NodeKind::UdpTableLine { .. } => self.visit_udp_table_line(netlist, id),
            NodeKind::Always { .. } => self.visit_always(netlist, id),
            NodeKind::If { .. } => self.visit_if(netlist, id),
            kind if kind.is_expr() => self.visit_expr(netlist, id),
            _ => walk_children(self, netlist, id),
        }
    }

    fn visit_module(&mut self, netlist: &Netlist, id: NodeId) {
        walk_children(self, netlist, id);
    }

    fn visit_primitive(&mut self, netlist: &Netlist, id: NodeId) {
        walk_children(self, netlist, id);
    }

    fn visit_var(&mut self, netlist: &Netlist, id: NodeId) {
        walk_children(self, netlist, id);
    }

    fn visit_udp_table(&mut self, netlist: &Netlist, id: NodeId) {
        walk_children(self, netlist, id);
    }

    fn visit_udp_table_line(&mut self, netlist: &Netlist, id: NodeId) {
        walk_children(self, netlist, id);
    }

    fn visit_always(&mut self, netlist: &Netlist, id: NodeId) {
        walk_children(self, netlist, id);
    }

    fn visit_if(&mut self, netlist: &Netlist, id: NodeId) {
        walk_children(self, netlist, id);
    }

    fn visit_expr(&mut self, netlist: &Netlist, id: NodeId) {
        walk_children(self, netlist, id);
    }
}

pub fn walk_children<V: Visitor + ?Sized>(visitor: &mut V, netlist: &Netlist, id: NodeId) {
    for child in netlist.children(id) {
        visitor.visit_node(netlist, child);
    }
}

/// Counts nodes per kind name; mostly useful in tests and debug logging.
#[derive(Debug, Default)]
pub struct KindCounter {
    pub counts: fxhash::FxHashMap<&'static str, usize>,
}

impl KindCounter {
    pub fn count(netlist: &Netlist, root: NodeId) -> Self {
        let mut counter = Self::default();
        counter.visit_node(netlist, root);
        counter
    }

    pub fn get(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }
}

impl Visitor for KindCounter {
    fn visit_node(&mut self, netlist: &Netlist, id: NodeId) {
        *self.counts.entry(netlist.kind(id).type_name()).or_insert(0) += 1;
        walk_children(self, netlist, id);
    }
}
