use crate::node::NodeId;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Structural errors of the IR tree.
///
/// These are never caused by user input alone: they mean a pass built or
/// spliced the tree incorrectly.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum IrError {
    /// A `NodeId` whose arena slot has been reclaimed or never existed.
    #[error("Dangling node reference: {0:?}")]
    #[diagnostic(code(udpc_ir::dangling_node))]
    DanglingNode(NodeId),

    /// Attempted to add a child to a node without a statement or item list.
    #[error("`{kind}` node {node:?} has no child list")]
    #[diagnostic(code(udpc_ir::not_a_container))]
    NotAContainer { node: NodeId, kind: &'static str },

    /// Attempted a list splice around a node that is not in a parent list.
    #[error("Node {0:?} is not an element of its parent's child list")]
    #[diagnostic(code(udpc_ir::not_in_list))]
    NotInList(NodeId),

    /// Attempted to attach a node that already has a parent.
    #[error("Node {node:?} is already attached to {parent:?}")]
    #[diagnostic(code(udpc_ir::already_attached))]
    AlreadyAttached { node: NodeId, parent: NodeId },

    /// A child's parent link disagrees with the node that owns it.
    #[error("Node {node:?} is owned by {owner:?} but links to {linked:?}")]
    #[diagnostic(code(udpc_ir::broken_parent_link))]
    BrokenParentLink {
        node: NodeId,
        owner: NodeId,
        linked: Option<NodeId>,
    },

    /// A `VarRef` whose target is not a live `Var`.
    #[error("Reference {node:?} does not point at a variable")]
    #[diagnostic(code(udpc_ir::bad_reference))]
    BadReference {
        node: NodeId,
        #[label("reference here")]
        span: SourceSpan,
    },

    /// A node in an expression slot that is not an expression.
    #[error("`{kind}` is not an expression")]
    #[diagnostic(code(udpc_ir::not_an_expression))]
    NotAnExpression {
        kind: &'static str,
        #[label("expected an expression")]
        span: SourceSpan,
    },

    /// A node in a position its kind is not allowed in.
    #[error("`{kind}` is not allowed inside `{context}`")]
    #[diagnostic(code(udpc_ir::misplaced_node))]
    MisplacedNode {
        kind: &'static str,
        context: &'static str,
        #[label("misplaced here")]
        span: SourceSpan,
    },

    /// Operands of different widths where equal widths are required.
    #[error("Width mismatch in `{kind}`: {lhs} bits vs {rhs} bits")]
    #[diagnostic(code(udpc_ir::width_mismatch))]
    WidthMismatch {
        kind: &'static str,
        lhs: u32,
        rhs: u32,
        #[label("operands differ in width")]
        span: SourceSpan,
    },

    /// Assignment target that is not a write reference.
    #[error("Assignment target is not a writable variable reference")]
    #[diagnostic(code(udpc_ir::bad_assignment_target))]
    BadAssignmentTarget {
        #[label("assigned here")]
        span: SourceSpan,
    },
}

pub type IrResult<T> = Result<T, IrError>;
