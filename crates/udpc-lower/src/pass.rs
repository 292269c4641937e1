//! The traversal driving the lowering.

use crate::config::LowerConfig;
use crate::error::UdpError;
use crate::ports::PortContext;
use crate::table::lower_table;
use crate::LowerStats;
use log::debug;
use udpc_ir::{IrResult, Netlist, NodeId, NodeKind};
use udpc_source::{report_error, DiagnosticSink};

pub(crate) struct UdpLowering<'a> {
    netlist: &'a mut Netlist,
    config: &'a LowerConfig,
    sink: &'a mut dyn DiagnosticSink,
    pub(crate) stats: LowerStats,
}

impl<'a> UdpLowering<'a> {
    pub(crate) fn new(netlist: &'a mut Netlist, config: &'a LowerConfig, sink: &'a mut dyn DiagnosticSink) -> Self {
        Self { netlist, config, sink, stats: LowerStats::default() }
    }

    /// Visits `id`. `ports` is the context of the enclosing primitive, if
    /// any. Children are visited from a snapshot of the child list, so the
    /// splices made while lowering a table do not disturb the iteration.
    pub(crate) fn visit(&mut self, id: NodeId, mut ports: Option<&mut PortContext>) -> IrResult<()> {
        match self.netlist.kind(id) {
            NodeKind::Primitive { name, .. } => {
                let mut ctx = PortContext::new(id, name.clone());
                self.stats.primitives += 1;
                for child in self.netlist.children(id) {
                    self.visit(child, Some(&mut ctx))?;
                }
            }
            NodeKind::Var { .. } => {
                if let Some(ctx) = ports {
                    ctx.classify(self.netlist, id);
                }
            }
            NodeKind::UdpTable { .. } => match ports {
                Some(ctx) => {
                    self.stats.rows += lower_table(self.netlist, self.config, self.sink, ctx, id)?;
                    self.stats.tables += 1;
                }
                None => self.drop_stray_table(id)?,
            },
            _ => {
                for child in self.netlist.children(id) {
                    self.visit(child, ports.as_deref_mut())?;
                }
            }
        }
        Ok(())
    }

    fn drop_stray_table(&mut self, table: NodeId) -> IrResult<()> {
        let location = self.netlist.location(table);
        report_error(self.sink, location, UdpError::TableOutsidePrimitive { span: self.netlist.span(table) });
        self.netlist.detach(table)?;
        let freed = self.netlist.delete_subtree(table)?;
        debug!("dropped table {:?} outside of any primitive, {} nodes freed", table, freed);
        self.stats.removed_tables += 1;
        Ok(())
    }
}
