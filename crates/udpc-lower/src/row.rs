//! Compilation of a single table row into a masked compare.

use crate::config::LowerConfig;
use crate::error::UdpError;
use crate::table::TableLowering;
use log::trace;
use udpc_ir::{Access, Bit, IrResult, NodeId, NodeKind, Number, TableSymbol};

/// The bits a row looks at and the values it expects there.
///
/// Bit `i` corresponds to the `i`-th input port. A row matches an input field
/// value `f` when `f & mask == compare`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPattern {
    pub mask: Number,
    pub compare: Number,
}

impl RowPattern {
    /// Builds the pattern of a row over `width` input ports. Positions with
    /// no symbol are don't-care and symbols past `width` are ignored.
    /// Returns the symbols that were neither a level nor a don't-care.
    pub fn from_symbols<'s>(
        symbols: &'s [TableSymbol],
        width: u32,
        config: &LowerConfig,
    ) -> (Self, Vec<&'s TableSymbol>) {
        let mut mask = Number::new(width);
        let mut compare = Number::new(width);
        let mut unrecognized = Vec::new();
        for (i, symbol) in symbols.iter().take(width as usize).enumerate() {
            let i = i as u32;
            match symbol.head() {
                Some('0') => mask.set_bit(i, Bit::One),
                Some('1') => {
                    mask.set_bit(i, Bit::One);
                    compare.set_bit(i, Bit::One);
                }
                Some(c) if config.is_dont_care(c) => {}
                _ => unrecognized.push(symbol),
            }
        }
        (Self { mask, compare }, unrecognized)
    }

    /// Whether a fully known input field value selects this row.
    pub fn matches(&self, field: &Number) -> bool {
        field.and(&self.mask) == self.compare
    }
}

/// Value assigned by a row with output symbol `symbol`, `width` bits wide.
pub fn output_value(symbol: Option<&TableSymbol>, width: u32) -> Number {
    match symbol.and_then(TableSymbol::head) {
        Some('0') => Number::from_u64(width, 0),
        Some('1') => Number::from_u64(width, 1),
        _ => Number::unknown(width),
    }
}

impl TableLowering<'_> {
    /// Appends the `If` for `line` to the chain.
    pub(crate) fn compile_row(&mut self, line: NodeId) -> IrResult<()> {
        let span = self.netlist.span(line);
        let (inputs, outputs) = match self.netlist.kind(line) {
            NodeKind::UdpTableLine { inputs, outputs } => (inputs.clone(), outputs.clone()),
            _ => return Ok(()),
        };

        let ports = self.ports.inputs.len();
        if inputs.len() != ports {
            self.report(line, UdpError::RowArity { symbols: inputs.len(), ports, span });
        }
        let (pattern, unrecognized) = RowPattern::from_symbols(&inputs, ports as u32, self.config);
        for symbol in unrecognized {
            self.report(
                line,
                UdpError::UnrecognizedSymbol { symbol: symbol.text.clone(), span: symbol.span },
            );
        }

        // Only the first output symbol is read.
        let out_symbol = outputs.first();
        match out_symbol {
            None => self.report(line, UdpError::MissingOutputSymbol { span }),
            Some(symbol) => match symbol.head() {
                Some('0' | '1') => {}
                Some(c) if self.config.is_unknown_output(c) => {}
                _ => self.report(
                    line,
                    UdpError::UnrecognizedOutput { symbol: symbol.text.clone(), span: symbol.span },
                ),
            },
        }

        let cond = match self.field {
            Some(field) => {
                let field_ref = self.netlist.alloc(NodeKind::VarRef { var: field, access: Access::Read }, span);
                let mask = self.netlist.alloc(NodeKind::Const(pattern.mask.clone()), span);
                let masked = self.netlist.alloc(NodeKind::And { lhs: field_ref, rhs: mask }, span);
                let compare = self.netlist.alloc(NodeKind::Const(pattern.compare.clone()), span);
                self.netlist.alloc(NodeKind::Eq { lhs: masked, rhs: compare }, span)
            }
            None => self.netlist.alloc(NodeKind::Const(Number::from_u64(1, 1)), span),
        };

        let mut then_stmts = Vec::new();
        if let Some(output) = self.ports.outputs.first().copied() {
            let width = match self.netlist.kind(output) {
                NodeKind::Var { dtype, .. } => dtype.width,
                _ => 1,
            };
            let value = output_value(out_symbol, width);
            trace!(
                "row {:?}: mask {} compare {} -> {}",
                line,
                pattern.mask,
                pattern.compare,
                value
            );
            let lhs = self.netlist.alloc(NodeKind::VarRef { var: output, access: Access::Write }, span);
            let rhs = self.netlist.alloc(NodeKind::Const(value), span);
            then_stmts.push(self.netlist.alloc(NodeKind::Assign { lhs, rhs }, span));
        }

        let if_node = self.netlist.alloc(
            NodeKind::If { cond, then_stmts, else_stmts: Vec::new() },
            span,
        );
        match self.tail {
            None => self.netlist.push_child(self.always, if_node)?,
            Some(tail) => self.netlist.push_else(tail, if_node)?,
        }
        self.tail = Some(if_node);
        Ok(())
    }
}
