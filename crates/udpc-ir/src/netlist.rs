//! The node arena and tree editing operations.
//!
//! All nodes of a program live in one [`Slab`]. Children are owned through
//! the lists and operand slots of their parent's [`NodeKind`]; each node also
//! records its parent so splices can find the list a node sits in.
//!
//! Editing follows a detach/attach discipline: a node is attached to at most
//! one parent, [`Netlist::replace_with`] detaches the old subtree before the
//! new nodes take its place, and detached subtrees are reclaimed with
//! [`Netlist::delete_subtree`].

use crate::error::{IrError, IrResult};
use crate::node::{Node, NodeId, NodeKind};
use log::trace;
use miette::SourceSpan;
use slab::Slab;
use udpc_source::SourceFile;

#[derive(Debug, Clone)]
pub struct Netlist {
    nodes: Slab<Node>,
    root: NodeId,
    file: Option<SourceFile>,
}

impl Default for Netlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Netlist {
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let root = NodeId(nodes.insert(Node {
            kind: NodeKind::Netlist { items: Vec::new() },
            span: SourceSpan::from((0, 0)),
            parent: None,
        }));
        Self { nodes, root, file: None }
    }

    /// A netlist whose spans refer to `file`.
    pub fn with_file(file: SourceFile) -> Self {
        let mut netlist = Self::new();
        netlist.file = Some(file);
        netlist
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn file(&self) -> Option<&SourceFile> {
        self.file.as_ref()
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    /// Allocates a node. Children named by `kind` become owned by the new
    /// node; they must not be attached anywhere else.
    pub fn alloc(&mut self, kind: NodeKind, span: SourceSpan) -> NodeId {
        let children = kind.children();
        let id = NodeId(self.nodes.insert(Node { kind, span, parent: None }));
        for child in children {
            debug_assert!(
                self.nodes.get(child.0).is_some_and(|n| n.parent.is_none()),
                "child {:?} of new node is dangling or already attached",
                child
            );
            if let Some(node) = self.nodes.get_mut(child.0) {
                node.parent = Some(id);
            }
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn try_node(&self, id: NodeId) -> IrResult<&Node> {
        self.nodes.get(id.0).ok_or(IrError::DanglingNode(id))
    }

    /// The node behind `id`. Panics on a dangling id, which is a pass bug.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn span(&self, id: NodeId) -> SourceSpan {
        self.nodes[id.0].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Snapshot of the owned children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id.0)
            .map(|n| n.kind.children())
            .unwrap_or_default()
    }

    /// Pre-order list of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) {
                continue;
            }
            out.push(next);
            let mut children = self.children(next);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Source location of a node for diagnostics.
    pub fn location(&self, id: NodeId) -> String {
        let span = self.span(id);
        match &self.file {
            Some(file) => file.location(span),
            None => format!("offset {}", span.offset()),
        }
    }

    fn ensure_detached(&self, child: NodeId) -> IrResult<()> {
        match self.try_node(child)?.parent {
            Some(parent) => Err(IrError::AlreadyAttached { node: child, parent }),
            None => Ok(()),
        }
    }

    /// Appends `child` to the main list of `parent`: items of a netlist,
    /// module or primitive, lines of a table, statements of an always block,
    /// the then-branch of an if.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) -> IrResult<()> {
        self.ensure_detached(child)?;
        let node = self.nodes.get_mut(parent.0).ok_or(IrError::DanglingNode(parent))?;
        let kind = node.kind.type_name();
        let list = node
            .kind
            .primary_list_mut()
            .ok_or(IrError::NotAContainer { node: parent, kind })?;
        list.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Appends `child` to the else-branch of the `If` node `if_node`.
    pub fn push_else(&mut self, if_node: NodeId, child: NodeId) -> IrResult<()> {
        self.ensure_detached(child)?;
        let node = self.nodes.get_mut(if_node.0).ok_or(IrError::DanglingNode(if_node))?;
        match &mut node.kind {
            NodeKind::If { else_stmts, .. } => else_stmts.push(child),
            other => {
                return Err(IrError::NotAContainer { node: if_node, kind: other.type_name() });
            }
        }
        self.nodes[child.0].parent = Some(if_node);
        Ok(())
    }

    /// Finds the list holding `id` in its parent and the position in it.
    fn list_position(&self, id: NodeId) -> IrResult<(NodeId, usize, usize)> {
        let parent = self.try_node(id)?.parent.ok_or(IrError::NotInList(id))?;
        self.try_node(parent)?
            .kind
            .lists()
            .iter()
            .enumerate()
            .find_map(|(which, list)| list.iter().position(|c| *c == id).map(|pos| (which, pos)))
            .map(|(which, pos)| (parent, which, pos))
            .ok_or(IrError::NotInList(id))
    }

    fn splice(&mut self, parent: NodeId, which: usize, range: std::ops::Range<usize>, new: &[NodeId]) {
        if let Some(list) = self.nodes[parent.0].kind.lists_mut().into_iter().nth(which) {
            let _removed: Vec<NodeId> = list.splice(range, new.iter().copied()).collect();
        }
        for child in new {
            self.nodes[child.0].parent = Some(parent);
        }
    }

    /// Inserts the detached node `new` right after `anchor` in `anchor`'s list.
    pub fn insert_after(&mut self, anchor: NodeId, new: NodeId) -> IrResult<()> {
        self.ensure_detached(new)?;
        let (parent, which, pos) = self.list_position(anchor)?;
        self.splice(parent, which, pos + 1..pos + 1, &[new]);
        Ok(())
    }

    /// Puts `replacements` where `old` was and reclaims the `old` subtree.
    /// Returns the number of arena slots reclaimed.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) -> IrResult<usize> {
        for new in replacements {
            self.ensure_detached(*new)?;
        }
        let (parent, which, pos) = self.list_position(old)?;
        self.splice(parent, which, pos..pos + 1, replacements);
        self.nodes[old.0].parent = None;
        let freed = self.delete_subtree(old)?;
        trace!("replaced {:?} with {:?} in {:?}, {} nodes freed", old, replacements, parent, freed);
        Ok(freed)
    }

    /// Removes `id` from its parent's list, leaving it detached.
    pub fn detach(&mut self, id: NodeId) -> IrResult<()> {
        let (parent, which, pos) = self.list_position(id)?;
        self.splice(parent, which, pos..pos + 1, &[]);
        self.nodes[id.0].parent = None;
        Ok(())
    }

    /// Frees a detached subtree. Returns the number of nodes freed.
    pub fn delete_subtree(&mut self, id: NodeId) -> IrResult<usize> {
        self.ensure_detached(id)?;
        let doomed = self.descendants(id);
        for node in &doomed {
            self.nodes.remove(node.0);
        }
        Ok(doomed.len())
    }

    /// Width in bits of an expression node.
    pub fn width_of(&self, expr: NodeId) -> IrResult<u32> {
        let node = self.try_node(expr)?;
        match &node.kind {
            NodeKind::Const(number) => Ok(number.width()),
            NodeKind::VarRef { var, .. } => match self.get(*var).map(|n| &n.kind) {
                Some(NodeKind::Var { dtype, .. }) => Ok(dtype.width),
                _ => Err(IrError::BadReference { node: expr, span: node.span }),
            },
            NodeKind::Concat { msb, lsb } => Ok(self.width_of(*msb)? + self.width_of(*lsb)?),
            NodeKind::And { lhs, rhs } => Ok(self.width_of(*lhs)?.max(self.width_of(*rhs)?)),
            NodeKind::Eq { .. } => Ok(1),
            other => Err(IrError::NotAnExpression { kind: other.type_name(), span: node.span }),
        }
    }

    /// All primitives directly under the root, in order.
    pub fn primitives(&self) -> Vec<NodeId> {
        self.children(self.root)
            .into_iter()
            .filter(|id| matches!(self.kind(*id), NodeKind::Primitive { .. }))
            .collect()
    }

    /// The variable called `name` declared directly in `scope`.
    pub fn find_var(&self, scope: NodeId, name: &str) -> Option<NodeId> {
        self.children(scope).into_iter().find(|id| {
            matches!(self.kind(*id), NodeKind::Var { name: var_name, .. } if var_name == name)
        })
    }

    /// Every live node of the given kind name below `id`, in pre-order.
    pub fn find_kind(&self, id: NodeId, type_name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.kind(*n).type_name() == type_name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Access, DataType, Direction, VarType};
    use crate::number::Number;

    fn span() -> SourceSpan {
        SourceSpan::from((0, 0))
    }

    fn var(nl: &mut Netlist, name: &str) -> NodeId {
        nl.alloc(
            NodeKind::Var {
                name: name.to_string(),
                direction: Direction::Input,
                var_type: VarType::Port,
                dtype: DataType::wire(1),
            },
            span(),
        )
    }

    fn module(nl: &mut Netlist) -> NodeId {
        let module = nl.alloc(NodeKind::Module { name: "m".to_string(), items: Vec::new() }, span());
        nl.push_child(nl.root(), module).unwrap();
        module
    }

    #[test]
    fn test_push_and_insert_after_keep_order() {
        let mut nl = Netlist::new();
        let m = module(&mut nl);
        let a = var(&mut nl, "a");
        let c = var(&mut nl, "c");
        nl.push_child(m, a).unwrap();
        nl.push_child(m, c).unwrap();
        let b = var(&mut nl, "b");
        nl.insert_after(a, b).unwrap();

        assert_eq!(nl.children(m), vec![a, b, c]);
        assert_eq!(nl.parent(b), Some(m));
        assert_eq!(nl.find_var(m, "c"), Some(c));
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let mut nl = Netlist::new();
        let m = module(&mut nl);
        let a = var(&mut nl, "a");
        nl.push_child(m, a).unwrap();
        assert_eq!(nl.push_child(m, a), Err(IrError::AlreadyAttached { node: a, parent: m }));
    }

    #[test]
    fn test_push_into_leaf_is_rejected() {
        let mut nl = Netlist::new();
        let a = var(&mut nl, "a");
        let b = var(&mut nl, "b");
        assert_eq!(nl.push_child(a, b), Err(IrError::NotAContainer { node: a, kind: "Var" }));
    }

    #[test]
    fn test_replace_with_reclaims_old_subtree() {
        let mut nl = Netlist::new();
        let m = module(&mut nl);
        let a = var(&mut nl, "a");
        nl.push_child(m, a).unwrap();

        let lhs = nl.alloc(NodeKind::VarRef { var: a, access: Access::Write }, span());
        let rhs = nl.alloc(NodeKind::Const(Number::from_u64(1, 1)), span());
        let assign = nl.alloc(NodeKind::AssignW { lhs, rhs }, span());
        nl.push_child(m, assign).unwrap();
        let before = nl.len();

        let always = nl.alloc(NodeKind::Always { stmts: Vec::new() }, span());
        let freed = nl.replace_with(assign, &[always]).unwrap();

        assert_eq!(freed, 3);
        assert_eq!(nl.len(), before - 3 + 1);
        assert!(!nl.contains(assign) && !nl.contains(lhs) && !nl.contains(rhs));
        assert_eq!(nl.children(m), vec![a, always]);
        assert_eq!(nl.parent(always), Some(m));
    }

    #[test]
    fn test_replace_with_several_nodes() {
        let mut nl = Netlist::new();
        let m = module(&mut nl);
        let a = var(&mut nl, "a");
        let old = var(&mut nl, "old");
        let z = var(&mut nl, "z");
        for id in [a, old, z] {
            nl.push_child(m, id).unwrap();
        }
        let x = var(&mut nl, "x");
        let y = var(&mut nl, "y");
        nl.replace_with(old, &[x, y]).unwrap();
        assert_eq!(nl.children(m), vec![a, x, y, z]);
    }

    #[test]
    fn test_else_chain() {
        let mut nl = Netlist::new();
        let c1 = nl.alloc(NodeKind::Const(Number::from_u64(1, 1)), span());
        let first = nl.alloc(NodeKind::If { cond: c1, then_stmts: vec![], else_stmts: vec![] }, span());
        let c2 = nl.alloc(NodeKind::Const(Number::from_u64(1, 0)), span());
        let second = nl.alloc(NodeKind::If { cond: c2, then_stmts: vec![], else_stmts: vec![] }, span());
        nl.push_else(first, second).unwrap();
        assert_eq!(nl.children(first), vec![c1, second]);
        assert_eq!(nl.parent(second), Some(first));
        assert_eq!(nl.parent(c1), Some(first));
    }

    #[test]
    fn test_width_of_expressions() {
        let mut nl = Netlist::new();
        let a = var(&mut nl, "a");
        let b = var(&mut nl, "b");
        let ra = nl.alloc(NodeKind::VarRef { var: a, access: Access::Read }, span());
        let rb = nl.alloc(NodeKind::VarRef { var: b, access: Access::Read }, span());
        let cat = nl.alloc(NodeKind::Concat { msb: rb, lsb: ra }, span());
        let mask = nl.alloc(NodeKind::Const(Number::from_u64(2, 3)), span());
        let and = nl.alloc(NodeKind::And { lhs: cat, rhs: mask }, span());
        let cmp = nl.alloc(NodeKind::Const(Number::from_u64(2, 1)), span());
        let eq = nl.alloc(NodeKind::Eq { lhs: and, rhs: cmp }, span());

        assert_eq!(nl.width_of(cat), Ok(2));
        assert_eq!(nl.width_of(and), Ok(2));
        assert_eq!(nl.width_of(eq), Ok(1));
        assert!(matches!(nl.width_of(a), Err(IrError::NotAnExpression { kind: "Var", .. })));
    }

    #[test]
    fn test_detach_then_delete() {
        let mut nl = Netlist::new();
        let m = module(&mut nl);
        let a = var(&mut nl, "a");
        nl.push_child(m, a).unwrap();
        assert!(nl.delete_subtree(a).is_err());
        nl.detach(a).unwrap();
        assert_eq!(nl.delete_subtree(a), Ok(1));
        assert!(nl.children(m).is_empty());
    }
}
