//! Reference interpreter for lowered, procedural IR.
//!
//! Values are four-state [`Number`]s kept per variable. A variable that was
//! never written reads as all `x`. [`Evaluator::settle`] runs the continuous
//! assignments of a scope in order, then each always block once; values not
//! written by a block keep what they held before, which is how latches
//! behave.

use crate::error::{IrError, IrResult};
use crate::netlist::Netlist;
use crate::node::{NodeId, NodeKind};
use crate::number::Number;
use fxhash::FxHashMap;

pub struct Evaluator<'a> {
    netlist: &'a Netlist,
    values: FxHashMap<NodeId, Number>,
}

impl<'a> Evaluator<'a> {
    pub fn new(netlist: &'a Netlist) -> Self {
        Self { netlist, values: FxHashMap::default() }
    }

    /// Drives `var` with `value`.
    pub fn set(&mut self, var: NodeId, value: Number) {
        self.values.insert(var, value);
    }

    /// Drives the variable called `name` in `scope`. Returns false when
    /// there is no such variable.
    pub fn set_named(&mut self, scope: NodeId, name: &str, value: Number) -> bool {
        match self.netlist.find_var(scope, name) {
            Some(var) => {
                self.set(var, value);
                true
            }
            None => false,
        }
    }

    /// Current value of `var`.
    pub fn get(&self, var: NodeId) -> IrResult<Number> {
        if let Some(value) = self.values.get(&var) {
            return Ok(value.clone());
        }
        match self.netlist.try_node(var)?.kind {
            NodeKind::Var { dtype, .. } => Ok(Number::unknown(dtype.width)),
            _ => Err(IrError::BadReference { node: var, span: self.netlist.span(var) }),
        }
    }

    pub fn get_named(&self, scope: NodeId, name: &str) -> Option<Number> {
        self.netlist.find_var(scope, name).and_then(|var| self.get(var).ok())
    }

    /// Runs every continuous assignment of `scope`, then every always block.
    pub fn settle(&mut self, scope: NodeId) -> IrResult<()> {
        let netlist = self.netlist;
        let items = netlist.children(scope);
        for item in &items {
            if let NodeKind::AssignW { lhs, rhs } = netlist.kind(*item) {
                self.assign(*lhs, *rhs)?;
            }
        }
        for item in &items {
            if let NodeKind::Always { stmts } = netlist.kind(*item) {
                for stmt in stmts {
                    self.exec(*stmt)?;
                }
            }
        }
        Ok(())
    }

    fn exec(&mut self, stmt: NodeId) -> IrResult<()> {
        let netlist = self.netlist;
        match netlist.kind(stmt) {
            NodeKind::Assign { lhs, rhs } => self.assign(*lhs, *rhs),
            NodeKind::If { cond, then_stmts, else_stmts } => {
                // An unknown condition takes the else-branch.
                let branch = match self.eval(*cond)?.truth() {
                    Some(true) => then_stmts,
                    _ => else_stmts,
                };
                for stmt in branch {
                    self.exec(*stmt)?;
                }
                Ok(())
            }
            other => Err(IrError::MisplacedNode {
                kind: other.type_name(),
                context: "Always",
                span: netlist.span(stmt),
            }),
        }
    }

    fn assign(&mut self, lhs: NodeId, rhs: NodeId) -> IrResult<()> {
        let value = self.eval(rhs)?;
        match self.netlist.kind(lhs) {
            NodeKind::VarRef { var, .. } => {
                self.values.insert(*var, value);
                Ok(())
            }
            _ => Err(IrError::BadAssignmentTarget { span: self.netlist.span(lhs) }),
        }
    }

    /// Evaluates an expression.
    pub fn eval(&self, expr: NodeId) -> IrResult<Number> {
        let node = self.netlist.try_node(expr)?;
        match &node.kind {
            NodeKind::Const(number) => Ok(number.clone()),
            NodeKind::VarRef { var, .. } => self.get(*var),
            NodeKind::Concat { msb, lsb } => Ok(Number::concat(&self.eval(*msb)?, &self.eval(*lsb)?)),
            NodeKind::And { lhs, rhs } => Ok(self.eval(*lhs)?.and(&self.eval(*rhs)?)),
            NodeKind::Eq { lhs, rhs } => Ok(self.eval(*lhs)?.logical_eq(&self.eval(*rhs)?)),
            other => Err(IrError::NotAnExpression { kind: other.type_name(), span: node.span }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Access, DataType, Direction, VarType};
    use miette::SourceSpan;

    fn span() -> SourceSpan {
        SourceSpan::from((0, 0))
    }

    #[test]
    fn test_unwritten_var_reads_unknown_and_latches() {
        let mut nl = Netlist::new();
        let module = nl.alloc(NodeKind::Module { name: "m".to_string(), items: vec![] }, span());
        nl.push_child(nl.root(), module).unwrap();
        let var = |nl: &mut Netlist, name: &str, direction| {
            let id = nl.alloc(
                NodeKind::Var {
                    name: name.to_string(),
                    direction,
                    var_type: VarType::Port,
                    dtype: DataType::wire(1),
                },
                span(),
            );
            nl.push_child(module, id).unwrap();
            id
        };
        let en = var(&mut nl, "en", Direction::Input);
        let q = var(&mut nl, "q", Direction::Output);

        // always @* if (en) q = 1'b1;
        let cond = nl.alloc(NodeKind::VarRef { var: en, access: Access::Read }, span());
        let lhs = nl.alloc(NodeKind::VarRef { var: q, access: Access::Write }, span());
        let rhs = nl.alloc(NodeKind::Const(Number::from_u64(1, 1)), span());
        let assign = nl.alloc(NodeKind::Assign { lhs, rhs }, span());
        let if_node = nl.alloc(NodeKind::If { cond, then_stmts: vec![assign], else_stmts: vec![] }, span());
        let always = nl.alloc(NodeKind::Always { stmts: vec![if_node] }, span());
        nl.push_child(module, always).unwrap();

        let mut eval = Evaluator::new(&nl);
        assert_eq!(eval.get(q), Ok(Number::unknown(1)));

        eval.set(en, Number::unknown(1));
        eval.settle(module).unwrap();
        assert_eq!(eval.get(q), Ok(Number::unknown(1)));

        eval.set(en, Number::from_u64(1, 1));
        eval.settle(module).unwrap();
        assert_eq!(eval.get_named(module, "q"), Some(Number::from_u64(1, 1)));

        // No branch taken: q holds.
        assert!(eval.set_named(module, "en", Number::from_u64(1, 0)));
        eval.settle(module).unwrap();
        assert_eq!(eval.get(q), Ok(Number::from_u64(1, 1)));
        assert!(!eval.set_named(module, "nope", Number::new(1)));
    }
}
