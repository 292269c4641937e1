//! Verilog-like textual rendering of the IR, used in debug logs and test
//! snapshots. Every line, including the last, ends with a newline.

use crate::netlist::Netlist;
use crate::node::{DataType, Direction, NetKind, NodeId, NodeKind, Signing};
use std::fmt::Write;

const INDENT: &str = "  ";

/// Renders the whole tree.
pub fn dump_tree(netlist: &Netlist) -> String {
    dump_node(netlist, netlist.root())
}

/// Renders `id` and everything below it.
pub fn dump_node(netlist: &Netlist, id: NodeId) -> String {
    let mut printer = Printer { netlist, out: String::new(), depth: 0 };
    printer.item(id);
    printer.out
}

/// Renders a single expression on one line.
pub fn dump_expr(netlist: &Netlist, id: NodeId) -> String {
    let mut out = String::new();
    write_expr(netlist, id, false, &mut out);
    out
}

struct Printer<'a> {
    netlist: &'a Netlist,
    out: String,
    depth: usize,
}

impl Printer<'_> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn expr(&self, id: NodeId) -> String {
        dump_expr(self.netlist, id)
    }

    fn nested(&mut self, items: &[NodeId]) {
        self.depth += 1;
        for item in items {
            self.item(*item);
        }
        self.depth -= 1;
    }

    fn item(&mut self, id: NodeId) {
        let netlist = self.netlist;
        let Some(node) = netlist.get(id) else {
            self.line(&format!("<dangling {:?}>", id));
            return;
        };
        match &node.kind {
            NodeKind::Netlist { items } => {
                for item in items {
                    self.item(*item);
                }
            }
            NodeKind::Module { name, items } => {
                self.line(&format!("module {};", name));
                self.nested(items);
                self.line("endmodule");
            }
            NodeKind::Primitive { name, items } => {
                self.line(&format!("primitive {};", name));
                self.nested(items);
                self.line("endprimitive");
            }
            NodeKind::Var { name, direction, dtype, .. } => {
                let decl = match direction {
                    Direction::None => format!("{} {};", data_type(dtype), name),
                    dir => format!("{} {} {};", dir.keyword(), data_type(dtype), name),
                };
                self.line(&decl);
            }
            NodeKind::UdpTable { lines } => {
                self.line("table");
                self.nested(lines);
                self.line("endtable");
            }
            NodeKind::UdpTableLine { inputs, outputs } => {
                let join = |symbols: &[crate::node::TableSymbol]| {
                    symbols.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
                };
                self.line(&format!("{} : {};", join(inputs), join(outputs)));
            }
            NodeKind::AssignW { lhs, rhs } => {
                let text = format!("assign {} = {};", self.expr(*lhs), self.expr(*rhs));
                self.line(&text);
            }
            NodeKind::Always { stmts } => {
                self.line("always @* begin");
                self.nested(stmts);
                self.line("end");
            }
            NodeKind::If { .. } => self.if_chain(id, ""),
            NodeKind::Assign { lhs, rhs } => {
                let text = format!("{} = {};", self.expr(*lhs), self.expr(*rhs));
                self.line(&text);
            }
            NodeKind::VarRef { .. }
            | NodeKind::Const(_)
            | NodeKind::Concat { .. }
            | NodeKind::And { .. }
            | NodeKind::Eq { .. } => {
                let text = self.expr(id);
                self.line(&text);
            }
        }
    }

    /// Prints an if and flattens a lone nested if in its else-branch into
    /// `end else if`.
    fn if_chain(&mut self, id: NodeId, prefix: &str) {
        let netlist = self.netlist;
        let NodeKind::If { cond, then_stmts, else_stmts } = netlist.kind(id) else {
            return;
        };
        let header = format!("{}if ({}) begin", prefix, self.expr(*cond));
        self.line(&header);
        self.nested(then_stmts);
        match else_stmts.as_slice() {
            [] => self.line("end"),
            [only] if matches!(netlist.kind(*only), NodeKind::If { .. }) => {
                self.if_chain(*only, "end else ");
            }
            stmts => {
                self.line("end else begin");
                self.nested(stmts);
                self.line("end");
            }
        }
    }
}

fn data_type(dtype: &DataType) -> String {
    let mut text = String::from(match dtype.net {
        NetKind::Wire => "wire",
        NetKind::Reg => "reg",
    });
    if dtype.signing == Signing::Signed {
        text.push_str(" signed");
    }
    if dtype.width > 1 {
        let _ = write!(text, " [{}:0]", dtype.width - 1);
    }
    text
}

fn write_expr(netlist: &Netlist, id: NodeId, nested: bool, out: &mut String) {
    let Some(node) = netlist.get(id) else {
        let _ = write!(out, "<dangling {:?}>", id);
        return;
    };
    match &node.kind {
        NodeKind::VarRef { var, .. } => match netlist.get(*var).map(|n| &n.kind) {
            Some(NodeKind::Var { name, .. }) => out.push_str(name),
            _ => {
                let _ = write!(out, "<bad ref {:?}>", var);
            }
        },
        NodeKind::Const(number) => {
            let _ = write!(out, "{}", number);
        }
        NodeKind::Concat { msb, lsb } => {
            out.push('{');
            write_expr(netlist, *msb, false, out);
            out.push_str(", ");
            write_expr(netlist, *lsb, false, out);
            out.push('}');
        }
        NodeKind::And { lhs, rhs } | NodeKind::Eq { lhs, rhs } => {
            let op = if matches!(node.kind, NodeKind::And { .. }) { "&" } else { "==" };
            if nested {
                out.push('(');
            }
            write_expr(netlist, *lhs, true, out);
            let _ = write!(out, " {} ", op);
            write_expr(netlist, *rhs, true, out);
            if nested {
                out.push(')');
            }
        }
        other => {
            let _ = write!(out, "<{}>", other.type_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Access, VarType};
    use crate::number::Number;
    use expect_test::expect;
    use miette::SourceSpan;

    fn span() -> SourceSpan {
        SourceSpan::from((0, 0))
    }

    #[test]
    fn test_dump_flattens_else_if() {
        let mut nl = Netlist::new();
        let module = nl.alloc(NodeKind::Module { name: "m".to_string(), items: vec![] }, span());
        nl.push_child(nl.root(), module).unwrap();
        let q = nl.alloc(
            NodeKind::Var {
                name: "q".to_string(),
                direction: Direction::None,
                var_type: VarType::Signal,
                dtype: DataType::reg(2),
            },
            span(),
        );
        nl.push_child(module, q).unwrap();

        let mut ifs = Vec::new();
        for value in 0..2 {
            let r = nl.alloc(NodeKind::VarRef { var: q, access: Access::Read }, span());
            let c = nl.alloc(NodeKind::Const(Number::from_u64(2, value)), span());
            let cond = nl.alloc(NodeKind::Eq { lhs: r, rhs: c }, span());
            let lhs = nl.alloc(NodeKind::VarRef { var: q, access: Access::Write }, span());
            let rhs = nl.alloc(NodeKind::Const(Number::unknown(2)), span());
            let assign = nl.alloc(NodeKind::Assign { lhs, rhs }, span());
            ifs.push(nl.alloc(NodeKind::If { cond, then_stmts: vec![assign], else_stmts: vec![] }, span()));
        }
        nl.push_else(ifs[0], ifs[1]).unwrap();
        let always = nl.alloc(NodeKind::Always { stmts: vec![ifs[0]] }, span());
        nl.push_child(module, always).unwrap();

        expect![[r#"
            module m;
              reg [1:0] q;
              always @* begin
                if (q == 2'b00) begin
                  q = 2'bxx;
                end else if (q == 2'b01) begin
                  q = 2'bxx;
                end
              end
            endmodule
        "#]]
        .assert_eq(&dump_tree(&nl));
    }

    #[test]
    fn test_nested_operators_are_parenthesized() {
        let mut nl = Netlist::new();
        let a = nl.alloc(NodeKind::Const(Number::from_u64(2, 1)), span());
        let b = nl.alloc(NodeKind::Const(Number::from_u64(2, 3)), span());
        let and = nl.alloc(NodeKind::And { lhs: a, rhs: b }, span());
        let c = nl.alloc(NodeKind::Const(Number::from_u64(2, 1)), span());
        let eq = nl.alloc(NodeKind::Eq { lhs: and, rhs: c }, span());
        assert_eq!(dump_expr(&nl, eq), "(2'b01 & 2'b11) == 2'b01");
    }
}
