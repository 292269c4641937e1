//! Lowering of one table into an input field and a latch block.
//!
//! For a primitive `p(q, a, b)` the table is replaced by
//!
//! ```text
//! wire [1:0] tableline__ifield__udptmp;      // after the last input
//! assign tableline__ifield__udptmp = {b, a};
//! always @* begin
//!   if ((tableline__ifield__udptmp & mask0) == cmp0) begin q = out0; end
//!   else if ((tableline__ifield__udptmp & mask1) == cmp1) begin q = out1; end
//!   ...
//! end
//! ```
//!
//! Rows keep their source order, so an earlier row wins over a later one
//! that matches the same inputs. When no row matches, the output is not
//! written and keeps its value.

use crate::config::LowerConfig;
use crate::error::UdpError;
use crate::ports::PortContext;
use log::debug;
use udpc_ir::{Access, DataType, Direction, IrResult, Netlist, NodeId, NodeKind, Number, VarType};
use udpc_source::{report_error, DiagnosticSink, SourceSpan};

/// State of one table while its rows are compiled.
pub(crate) struct TableLowering<'a> {
    pub(crate) netlist: &'a mut Netlist,
    pub(crate) config: &'a LowerConfig,
    pub(crate) sink: &'a mut dyn DiagnosticSink,
    pub(crate) ports: &'a PortContext,
    /// The input field, absent when the primitive has no inputs
    pub(crate) field: Option<NodeId>,
    pub(crate) always: NodeId,
    /// Last `If` of the chain so far
    pub(crate) tail: Option<NodeId>,
}

impl TableLowering<'_> {
    pub(crate) fn report(&mut self, node: NodeId, error: UdpError) {
        let location = self.ports.location(self.netlist, node);
        report_error(self.sink, location, error);
    }
}

/// Checks the ports of the table's primitive, then replaces `table` with the
/// field assignment and the always block. Returns the number of rows.
pub(crate) fn lower_table(
    netlist: &mut Netlist,
    config: &LowerConfig,
    sink: &mut dyn DiagnosticSink,
    ports: &PortContext,
    table: NodeId,
) -> IrResult<usize> {
    let span = netlist.span(table);
    debug!(
        "lowering table of `{}`: {} inputs, {} outputs",
        ports.name,
        ports.inputs.len(),
        ports.outputs.len()
    );

    let mut report = |node: NodeId, error: UdpError| {
        report_error(sink, ports.location(netlist, node), error);
    };
    if ports.outputs.len() != 1 {
        let at = ports.outputs.last().copied().unwrap_or(table);
        report(at, UdpError::OutputCount { count: ports.outputs.len(), span: netlist.span(at) });
    }
    if ports.inputs.is_empty() {
        report(table, UdpError::NoInputPorts { span });
    }
    if !ports.first_is_output && !ports.outputs.is_empty() {
        let at = ports.inputs.first().copied().unwrap_or(table);
        report(at, UdpError::FirstPortNotOutput { span: netlist.span(at) });
    }
    for input in &ports.inputs {
        let width = port_width(netlist, *input);
        if width != 1 {
            report(*input, UdpError::NonScalarPort { width, span: netlist.span(*input) });
        }
    }
    if let Some(output) = ports.outputs.first().copied() {
        if let NodeKind::Var { dtype, .. } = netlist.kind(output) {
            if dtype.is_stateful() {
                report(output, UdpError::SequentialTable { span: netlist.span(output) });
            }
        }
    }

    let (field, assign) = match ports.inputs.last().copied() {
        Some(last_input) => {
            let width = ports.inputs.len() as u32;
            let field = netlist.alloc(
                NodeKind::Var {
                    name: config.ifield_name.clone(),
                    direction: Direction::None,
                    var_type: VarType::ModuleTemp,
                    dtype: DataType::bits(width),
                },
                span,
            );
            netlist.insert_after(last_input, field)?;
            let packed = pack_inputs(netlist, &ports.inputs, span);
            let lhs = netlist.alloc(NodeKind::VarRef { var: field, access: Access::Write }, span);
            let assign = netlist.alloc(NodeKind::AssignW { lhs, rhs: packed }, span);
            (Some(field), Some(assign))
        }
        None => (None, None),
    };

    let always = netlist.alloc(NodeKind::Always { stmts: Vec::new() }, span);
    let lines = netlist.children(table);
    let mut lowering = TableLowering {
        netlist,
        config,
        sink,
        ports,
        field,
        always,
        tail: None,
    };
    let mut rows = 0;
    for line in lines {
        if matches!(lowering.netlist.kind(line), NodeKind::UdpTableLine { .. }) {
            lowering.compile_row(line)?;
            rows += 1;
        }
    }

    let replacements: Vec<NodeId> = assign.into_iter().chain(Some(always)).collect();
    lowering.netlist.replace_with(table, &replacements)?;
    debug!("lowered table of `{}`: {} rows", ports.name, rows);
    Ok(rows)
}

/// `{in[n-1], ... {in[1], in[0]}}`: the first input lands in bit 0.
fn pack_inputs(netlist: &mut Netlist, inputs: &[NodeId], span: SourceSpan) -> NodeId {
    let mut packed = input_bit(netlist, inputs[0], span);
    for input in &inputs[1..] {
        let msb = input_bit(netlist, *input, span);
        packed = netlist.alloc(NodeKind::Concat { msb, lsb: packed }, span);
    }
    packed
}

/// One field bit for `input`. A non-scalar port has already been reported
/// and contributes a constant x, so the field keeps one bit per port.
fn input_bit(netlist: &mut Netlist, input: NodeId, span: SourceSpan) -> NodeId {
    if port_width(netlist, input) == 1 {
        netlist.alloc(NodeKind::VarRef { var: input, access: Access::Read }, span)
    } else {
        netlist.alloc(NodeKind::Const(Number::unknown(1)), span)
    }
}

fn port_width(netlist: &Netlist, port: NodeId) -> u32 {
    match netlist.kind(port) {
        NodeKind::Var { dtype, .. } => dtype.width,
        _ => 1,
    }
}
