//! Node kinds of the udpc IR.
//!
//! The IR is a tree of [`Node`]s stored in the [`Netlist`](crate::Netlist)
//! arena. Every kind is a variant of the closed [`NodeKind`] enumeration;
//! child links are [`NodeId`]s into the same arena.

use crate::number::Number;
use miette::SourceSpan;

/// Handle of a node in the netlist arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Port direction of a variable. `None` for internal variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
    Inout,
    None,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
            Direction::None => "var",
        }
    }
}

/// Role of a variable in its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    /// Declared port of a module or primitive
    Port,
    /// Declared internal net or variable
    Signal,
    /// Compiler generated temporary, scoped to its module
    ModuleTemp,
}

/// Net kind of a data type. `Reg` holds its value between assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetKind {
    Wire,
    Reg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signing {
    Unsigned,
    Signed,
    /// No signedness attached; arithmetic context decides
    NoSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    pub net: NetKind,
    pub width: u32,
    pub signing: Signing,
}

impl DataType {
    pub fn wire(width: u32) -> Self {
        Self { net: NetKind::Wire, width, signing: Signing::Unsigned }
    }

    pub fn reg(width: u32) -> Self {
        Self { net: NetKind::Reg, width, signing: Signing::Unsigned }
    }

    /// Bit vector of `width` bits with no signedness attached.
    pub fn bits(width: u32) -> Self {
        Self { net: NetKind::Wire, width, signing: Signing::NoSign }
    }

    /// Whether storage of this type is latched or registered.
    pub fn is_stateful(&self) -> bool {
        self.net == NetKind::Reg
    }
}

/// Read or write use of a variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

/// One symbol of a table row, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSymbol {
    pub text: String,
    pub span: SourceSpan,
}

impl TableSymbol {
    pub fn new(text: impl Into<String>, span: SourceSpan) -> Self {
        Self { text: text.into(), span }
    }

    /// The leading character, which is all the table semantics look at.
    pub fn head(&self) -> Option<char> {
        self.text.chars().next()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of the whole program.
    Netlist { items: Vec<NodeId> },
    Module { name: String, items: Vec<NodeId> },
    /// Table-driven primitive; items are port declarations and its table.
    Primitive { name: String, items: Vec<NodeId> },
    Var {
        name: String,
        direction: Direction,
        var_type: VarType,
        dtype: DataType,
    },
    UdpTable { lines: Vec<NodeId> },
    UdpTableLine {
        inputs: Vec<TableSymbol>,
        outputs: Vec<TableSymbol>,
    },
    /// Continuous assignment at module scope.
    AssignW { lhs: NodeId, rhs: NodeId },
    /// Procedural block triggered on any change of what it reads.
    Always { stmts: Vec<NodeId> },
    If {
        cond: NodeId,
        then_stmts: Vec<NodeId>,
        else_stmts: Vec<NodeId>,
    },
    /// Procedural assignment.
    Assign { lhs: NodeId, rhs: NodeId },
    /// Reference to a `Var`. The target is not a child of the reference.
    VarRef { var: NodeId, access: Access },
    Const(Number),
    /// `{msb, lsb}`
    Concat { msb: NodeId, lsb: NodeId },
    /// Bitwise AND
    And { lhs: NodeId, rhs: NodeId },
    /// Logical equality, one bit wide
    Eq { lhs: NodeId, rhs: NodeId },
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Netlist { .. } => "Netlist",
            NodeKind::Module { .. } => "Module",
            NodeKind::Primitive { .. } => "Primitive",
            NodeKind::Var { .. } => "Var",
            NodeKind::UdpTable { .. } => "UdpTable",
            NodeKind::UdpTableLine { .. } => "UdpTableLine",
            NodeKind::AssignW { .. } => "AssignW",
            NodeKind::Always { .. } => "Always",
            NodeKind::If { .. } => "If",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::VarRef { .. } => "VarRef",
            NodeKind::Const(_) => "Const",
            NodeKind::Concat { .. } => "Concat",
            NodeKind::And { .. } => "And",
            NodeKind::Eq { .. } => "Eq",
        }
    }

    pub fn is_expr(&self) -> bool {
        matches!(
            self,
            NodeKind::VarRef { .. }
                | NodeKind::Const(_)
                | NodeKind::Concat { .. }
                | NodeKind::And { .. }
                | NodeKind::Eq { .. }
        )
    }

    pub fn is_procedural_stmt(&self) -> bool {
        matches!(self, NodeKind::If { .. } | NodeKind::Assign { .. })
    }

    /// Owned children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Netlist { items }
            | NodeKind::Module { items, .. }
            | NodeKind::Primitive { items, .. } => items.clone(),
            NodeKind::UdpTable { lines } => lines.clone(),
            NodeKind::Always { stmts } => stmts.clone(),
            NodeKind::If { cond, then_stmts, else_stmts } => std::iter::once(*cond)
                .chain(then_stmts.iter().copied())
                .chain(else_stmts.iter().copied())
                .collect(),
            NodeKind::AssignW { lhs, rhs }
            | NodeKind::Assign { lhs, rhs }
            | NodeKind::And { lhs, rhs }
            | NodeKind::Eq { lhs, rhs } => vec![*lhs, *rhs],
            NodeKind::Concat { msb, lsb } => vec![*msb, *lsb],
            NodeKind::Var { .. }
            | NodeKind::UdpTableLine { .. }
            | NodeKind::VarRef { .. }
            | NodeKind::Const(_) => Vec::new(),
        }
    }

    /// The child lists of this node, in the order [`Self::lists_mut`] yields them.
    pub(crate) fn lists(&self) -> Vec<&Vec<NodeId>> {
        match self {
            NodeKind::Netlist { items }
            | NodeKind::Module { items, .. }
            | NodeKind::Primitive { items, .. } => vec![items],
            NodeKind::UdpTable { lines } => vec![lines],
            NodeKind::Always { stmts } => vec![stmts],
            NodeKind::If { then_stmts, else_stmts, .. } => vec![then_stmts, else_stmts],
            _ => Vec::new(),
        }
    }

    /// The child lists of this node that can be spliced into.
    pub(crate) fn lists_mut(&mut self) -> Vec<&mut Vec<NodeId>> {
        match self {
            NodeKind::Netlist { items }
            | NodeKind::Module { items, .. }
            | NodeKind::Primitive { items, .. } => vec![items],
            NodeKind::UdpTable { lines } => vec![lines],
            NodeKind::Always { stmts } => vec![stmts],
            NodeKind::If { then_stmts, else_stmts, .. } => vec![then_stmts, else_stmts],
            _ => Vec::new(),
        }
    }

    /// The list [`Netlist::push_child`](crate::Netlist::push_child) appends to.
    pub(crate) fn primary_list_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            NodeKind::Netlist { items }
            | NodeKind::Module { items, .. }
            | NodeKind::Primitive { items, .. } => Some(items),
            NodeKind::UdpTable { lines } => Some(lines),
            NodeKind::Always { stmts } => Some(stmts),
            NodeKind::If { then_stmts, .. } => Some(then_stmts),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: SourceSpan,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}
