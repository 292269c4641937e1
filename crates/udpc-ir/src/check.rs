//! Consistency check of the whole tree.
//!
//! Run after a pass has spliced the tree to catch construction bugs early:
//! broken parent links, references to freed or non-variable nodes, operands
//! of mismatched widths and statements outside procedural context.

use crate::error::{IrError, IrResult};
use crate::netlist::Netlist;
use crate::node::{Access, NodeId, NodeKind};
use crate::visit::{walk_children, Visitor};

/// Checks the tree below the root. Returns the first problem found.
pub fn check_tree(netlist: &Netlist) -> IrResult<()> {
    let mut checker = TreeChecker { error: None };
    checker.visit_node(netlist, netlist.root());
    match checker.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

struct TreeChecker {
    error: Option<IrError>,
}

impl Visitor for TreeChecker {
    fn visit_node(&mut self, netlist: &Netlist, id: NodeId) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = check_node(netlist, id) {
            self.error = Some(error);
            return;
        }
        walk_children(self, netlist, id);
    }
}

fn check_node(netlist: &Netlist, id: NodeId) -> IrResult<()> {
    let node = netlist.try_node(id)?;
    for child in node.kind.children() {
        let linked = netlist.try_node(child)?.parent();
        if linked != Some(id) {
            return Err(IrError::BrokenParentLink { node: child, owner: id, linked });
        }
    }

    match &node.kind {
        NodeKind::VarRef { .. } => {
            netlist.width_of(id)?;
        }
        NodeKind::AssignW { lhs, rhs } | NodeKind::Assign { lhs, rhs } => {
            check_target(netlist, *lhs)?;
            check_same_width(netlist, id, *lhs, *rhs)?;
        }
        NodeKind::And { lhs, rhs } | NodeKind::Eq { lhs, rhs } => {
            check_same_width(netlist, id, *lhs, *rhs)?;
        }
        NodeKind::Concat { msb, lsb } => {
            netlist.width_of(*msb)?;
            netlist.width_of(*lsb)?;
        }
        NodeKind::If { cond, then_stmts, else_stmts } => {
            netlist.width_of(*cond)?;
            for stmt in then_stmts.iter().chain(else_stmts) {
                check_procedural(netlist, *stmt, "If")?;
            }
        }
        NodeKind::Always { stmts } => {
            for stmt in stmts {
                check_procedural(netlist, *stmt, "Always")?;
            }
        }
        NodeKind::UdpTable { lines } => {
            for line in lines {
                let child = netlist.node(*line);
                if !matches!(child.kind, NodeKind::UdpTableLine { .. }) {
                    return Err(IrError::MisplacedNode {
                        kind: child.kind.type_name(),
                        context: "UdpTable",
                        span: child.span,
                    });
                }
            }
        }
        NodeKind::Netlist { items } | NodeKind::Module { items, .. } | NodeKind::Primitive { items, .. } => {
            for item in items {
                let child = netlist.node(*item);
                if child.kind.is_expr() || child.kind.is_procedural_stmt() {
                    return Err(IrError::MisplacedNode {
                        kind: child.kind.type_name(),
                        context: node.kind.type_name(),
                        span: child.span,
                    });
                }
            }
        }
        NodeKind::Var { .. } | NodeKind::UdpTableLine { .. } | NodeKind::Const(_) => {}
    }
    Ok(())
}

fn check_target(netlist: &Netlist, lhs: NodeId) -> IrResult<()> {
    match netlist.try_node(lhs)?.kind {
        NodeKind::VarRef { access: Access::Write, .. } => Ok(()),
        _ => Err(IrError::BadAssignmentTarget { span: netlist.span(lhs) }),
    }
}

fn check_same_width(netlist: &Netlist, id: NodeId, lhs: NodeId, rhs: NodeId) -> IrResult<()> {
    let (lhs, rhs) = (netlist.width_of(lhs)?, netlist.width_of(rhs)?);
    if lhs != rhs {
        return Err(IrError::WidthMismatch {
            kind: netlist.kind(id).type_name(),
            lhs,
            rhs,
            span: netlist.span(id),
        });
    }
    Ok(())
}

fn check_procedural(netlist: &Netlist, stmt: NodeId, context: &'static str) -> IrResult<()> {
    let node = netlist.try_node(stmt)?;
    if node.kind.is_procedural_stmt() {
        Ok(())
    } else {
        Err(IrError::MisplacedNode { kind: node.kind.type_name(), context, span: node.span })
    }
}
