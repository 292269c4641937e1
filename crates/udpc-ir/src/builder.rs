//! Building primitive definitions the way the front-end hands them over.
//!
//! ```ignore
//! let and2 = netlist
//!     .primitive("and2", span)
//!     .output("q")
//!     .input("a")
//!     .input("b")
//!     .row("0 ?", "0")
//!     .row("1 1", "1")
//!     .finish()?;
//! ```
//!
//! Ports and the table are appended in call order. The table is created by
//! the first row (or by [`PrimitiveBuilder::table`]), so ports declared
//! after it come after it in the item list.

use crate::error::{IrError, IrResult};
use crate::netlist::Netlist;
use crate::node::{DataType, Direction, NodeId, NodeKind, TableSymbol, VarType};
use miette::SourceSpan;

impl Netlist {
    /// Starts a primitive called `name`. It is attached to the root by
    /// [`PrimitiveBuilder::finish`].
    pub fn primitive(&mut self, name: impl Into<String>, span: SourceSpan) -> PrimitiveBuilder<'_> {
        let id = self.alloc(NodeKind::Primitive { name: name.into(), items: Vec::new() }, span);
        PrimitiveBuilder {
            netlist: self,
            id,
            span,
            next_span: None,
            table: None,
            error: None,
        }
    }
}

pub struct PrimitiveBuilder<'a> {
    netlist: &'a mut Netlist,
    id: NodeId,
    span: SourceSpan,
    next_span: Option<SourceSpan>,
    table: Option<NodeId>,
    error: Option<IrError>,
}

impl PrimitiveBuilder<'_> {
    /// Span of the next port or row. Without it the primitive's span is used.
    pub fn at(mut self, span: SourceSpan) -> Self {
        self.next_span = Some(span);
        self
    }

    fn take_span(&mut self) -> SourceSpan {
        self.next_span.take().unwrap_or(self.span)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if self.error.is_none() {
            if let Err(error) = self.netlist.push_child(parent, child) {
                self.error = Some(error);
            }
        }
    }

    /// One-bit input port.
    pub fn input(self, name: &str) -> Self {
        self.port(name, Direction::Input, DataType::wire(1))
    }

    /// One-bit output port.
    pub fn output(self, name: &str) -> Self {
        self.port(name, Direction::Output, DataType::wire(1))
    }

    /// One-bit output port holding state, as declared by `output reg`.
    pub fn output_reg(self, name: &str) -> Self {
        self.port(name, Direction::Output, DataType::reg(1))
    }

    pub fn port(mut self, name: &str, direction: Direction, dtype: DataType) -> Self {
        let span = self.take_span();
        let var = self.netlist.alloc(
            NodeKind::Var {
                name: name.to_string(),
                direction,
                var_type: VarType::Port,
                dtype,
            },
            span,
        );
        self.attach(self.id, var);
        self
    }

    /// Internal variable that is not a port.
    pub fn signal(mut self, name: &str, dtype: DataType) -> Self {
        let span = self.take_span();
        let var = self.netlist.alloc(
            NodeKind::Var {
                name: name.to_string(),
                direction: Direction::None,
                var_type: VarType::Signal,
                dtype,
            },
            span,
        );
        self.attach(self.id, var);
        self
    }

    /// Creates the table if no row has created it yet.
    pub fn table(mut self) -> Self {
        self.ensure_table();
        self
    }

    fn ensure_table(&mut self) -> NodeId {
        if let Some(table) = self.table {
            return table;
        }
        let span = self.take_span();
        let table = self.netlist.alloc(NodeKind::UdpTable { lines: Vec::new() }, span);
        self.attach(self.id, table);
        self.table = Some(table);
        table
    }

    /// Appends a row. `inputs` and `outputs` are written as in the source:
    /// one symbol per non-blank character, parenthesized groups such as
    /// `(01)` kept whole.
    pub fn row(mut self, inputs: &str, outputs: &str) -> Self {
        let span = self.take_span();
        let table = self.ensure_table();
        let start = span.offset();
        let line = self.netlist.alloc(
            NodeKind::UdpTableLine {
                inputs: split_symbols(inputs, start),
                outputs: split_symbols(outputs, start + inputs.len()),
            },
            span,
        );
        self.attach(table, line);
        self
    }

    /// Appends a row written as one line of table text, e.g. `0 1 : 1;`.
    /// Symbol spans are offsets into `text` shifted by the row's span, so
    /// with [`Self::at`] pointing at the line in the source they land on the
    /// source symbols.
    pub fn line(mut self, text: &str) -> Self {
        let span = self.take_span();
        let table = self.ensure_table();
        let start = span.offset();
        let (inputs, outputs) = match text.find(':') {
            Some(colon) => (
                split_symbols(&text[..colon], start),
                split_symbols(&text[colon + 1..], start + colon + 1),
            ),
            None => (split_symbols(text, start), Vec::new()),
        };
        let line = self.netlist.alloc(NodeKind::UdpTableLine { inputs, outputs }, span);
        self.attach(table, line);
        self
    }

    /// Attaches the primitive to the netlist root.
    pub fn finish(mut self) -> IrResult<NodeId> {
        let root = self.netlist.root();
        self.attach(root, self.id);
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.id),
        }
    }
}

/// Splits row text into symbols. Each symbol's span is its byte range in
/// `text`, shifted by `base`.
pub fn split_symbols(text: &str, base: usize) -> Vec<TableSymbol> {
    let mut symbols = Vec::new();
    let mut chars = text.char_indices();
    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() || c == ':' || c == ';' {
            continue;
        }
        let mut end = start + c.len_utf8();
        if c == '(' {
            for (i, inner) in chars.by_ref() {
                end = i + inner.len_utf8();
                if inner == ')' {
                    break;
                }
            }
        }
        symbols.push(TableSymbol::new(&text[start..end], SourceSpan::from((base + start, end - start))));
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let mut nl = Netlist::new();
        let prim = nl
            .primitive("and2", SourceSpan::from((0, 10)))
            .output("q")
            .input("a")
            .input("b")
            .row("0 ?", "0")
            .row("1 1", "1")
            .finish()
            .unwrap();

        assert_eq!(nl.primitives(), vec![prim]);
        let kinds: Vec<_> = nl.children(prim).iter().map(|c| nl.kind(*c).type_name()).collect();
        assert_eq!(kinds, vec!["Var", "Var", "Var", "UdpTable"]);
        let table = nl.children(prim)[3];
        assert_eq!(nl.children(table).len(), 2);
        match nl.kind(nl.children(table)[0]) {
            NodeKind::UdpTableLine { inputs, outputs } => {
                assert_eq!(inputs.iter().map(|s| s.text.as_str()).collect::<Vec<_>>(), vec!["0", "?"]);
                assert_eq!(outputs[0].text, "0");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_split_symbols_keeps_groups_and_offsets() {
        let symbols = split_symbols("0(01) 1", 100);
        let texts: Vec<_> = symbols.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["0", "(01)", "1"]);
        assert_eq!(symbols[1].span, SourceSpan::from((101, 4)));
        assert_eq!(symbols[2].span, SourceSpan::from((106, 1)));
        assert!(split_symbols("  ", 0).is_empty());
    }

    #[test]
    fn test_line_splits_at_colon() {
        let mut nl = Netlist::new();
        let prim = nl
            .primitive("p", SourceSpan::from((0, 1)))
            .output("q")
            .input("a")
            .input("b")
            .at(SourceSpan::from((40, 8)))
            .line("0 1 : 1;")
            .line("1 1")
            .finish()
            .unwrap();
        let table = nl.children(prim)[3];
        let rows = nl.children(table);
        match nl.kind(rows[0]) {
            NodeKind::UdpTableLine { inputs, outputs } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(inputs[1].span, SourceSpan::from((42, 1)));
                assert_eq!(outputs, &vec![TableSymbol::new("1", SourceSpan::from((46, 1)))]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(nl.kind(rows[1]), NodeKind::UdpTableLine { outputs, .. } if outputs.is_empty()));
    }

    #[test]
    fn test_explicit_spans() {
        let mut nl = Netlist::new();
        let prim = nl
            .primitive("p", SourceSpan::from((0, 1)))
            .at(SourceSpan::from((20, 6)))
            .output("q")
            .input("a")
            .finish()
            .unwrap();
        let ports = nl.children(prim);
        assert_eq!(nl.span(ports[0]), SourceSpan::from((20, 6)));
        assert_eq!(nl.span(ports[1]), SourceSpan::from((0, 1)));
    }
}
