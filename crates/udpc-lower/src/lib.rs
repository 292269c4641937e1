//! Lowering of truth-table primitives
//!
//! A table primitive describes a combinational function as rows of input
//! symbols and one output symbol:
//!
//! ```text
//! primitive and2 (q, a, b);
//!   output q;
//!   input a, b;
//!   table
//!     0 ? : 0;
//!     1 1 : 1;
//!   endtable
//! endprimitive
//! ```
//!
//! [`udp_resolve`] replaces every such table by procedural IR that later
//! passes understand: the inputs are packed into one variable, and an always
//! block tests each row in order with `(field & mask) == compare` and
//! assigns the row's output. Problems with a table are reported to the
//! diagnostic sink and never stop the pass.

mod config;
mod error;
mod pass;
mod ports;
mod row;
mod table;

pub use config::LowerConfig;
pub use error::{ConfigError, LowerError, UdpError};
pub use ports::PortContext;
pub use row::{output_value, RowPattern};

use log::{debug, log_enabled, trace, Level};
use pass::UdpLowering;
use udpc_ir::{check_tree, dump::dump_tree, visit::KindCounter, Netlist};
use udpc_source::DiagnosticSink;

/// What one run of [`udp_resolve`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowerStats {
    pub primitives: usize,
    pub tables: usize,
    pub rows: usize,
    /// Tables found outside a primitive and removed
    pub removed_tables: usize,
}

/// Lowers every table of `netlist` in place.
///
/// User errors go to `sink`. An `Err` means the pass produced a malformed
/// tree, which is a compiler bug.
pub fn udp_resolve(
    netlist: &mut Netlist,
    config: &LowerConfig,
    sink: &mut dyn DiagnosticSink,
) -> Result<LowerStats, LowerError> {
    debug!("udp_resolve: {} nodes", netlist.len());
    let root = netlist.root();
    let mut lowering = UdpLowering::new(netlist, config, sink);
    lowering.visit(root, None)?;
    let stats = lowering.stats;

    if log_enabled!(Level::Trace) {
        trace!("after udp_resolve:\n{}", dump_tree(netlist));
    }
    if config.verify {
        verify(netlist)?;
    }
    debug!(
        "udp_resolve: {} primitives, {} tables, {} rows lowered",
        stats.primitives, stats.tables, stats.rows
    );
    Ok(stats)
}

fn verify(netlist: &Netlist) -> Result<(), LowerError> {
    check_tree(netlist)?;
    let counts = KindCounter::count(netlist, netlist.root());
    let count = counts.get("UdpTable") + counts.get("UdpTableLine");
    if count > 0 {
        return Err(LowerError::ResidualTables { count });
    }
    Ok(())
}
