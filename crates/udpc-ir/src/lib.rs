//! udpc IR
//!
//! The tree every udpc pass reads and rewrites. Nodes live in one arena
//! owned by a [`Netlist`]; passes address them through [`NodeId`]s and edit
//! the tree with the splice operations on [`Netlist`].
//!
//! Besides the tree itself this crate provides:
//! - [`builder`]: building primitives the way the front-end delivers them
//! - [`visit`]: a read-only visitor with default traversal
//! - [`check`]: the consistency check run after a pass
//! - [`dump`]: a Verilog-like rendering for logs and snapshots
//! - [`eval`]: a four-state interpreter for procedural IR

mod error;
mod netlist;
mod node;
mod number;

pub mod builder;
pub mod check;
pub mod dump;
pub mod eval;
pub mod visit;

pub use check::check_tree;
pub use error::{IrError, IrResult};
pub use netlist::Netlist;
pub use node::{Access, DataType, Direction, NetKind, Node, NodeId, NodeKind, Signing, TableSymbol, VarType};
pub use number::{Bit, Number};
