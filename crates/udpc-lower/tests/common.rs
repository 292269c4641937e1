// Shared helpers for the table lowering integration tests
#![allow(dead_code)]

use udpc_ir::{Netlist, NodeId, NodeKind, Number};
use udpc_lower::{udp_resolve, LowerConfig, LowerStats};
use udpc_source::{Diagnostics, SourceSpan};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn dummy_span() -> SourceSpan {
    SourceSpan::from((0, 0))
}

/// Runs the pass with the default configuration.
pub fn lower(netlist: &mut Netlist) -> (LowerStats, Diagnostics) {
    lower_with(netlist, &LowerConfig::default())
}

pub fn lower_with(netlist: &mut Netlist, config: &LowerConfig) -> (LowerStats, Diagnostics) {
    init_logger();
    let mut diags = Diagnostics::new();
    let stats = udp_resolve(netlist, config, &mut diags).expect("lowering produced a malformed tree");
    (stats, diags)
}

/// Builds `name` with output `q` first, then one input per entry of
/// `inputs`, and the given rows.
pub fn primitive(netlist: &mut Netlist, name: &str, inputs: &[&str], rows: &[(&str, &str)]) -> NodeId {
    let mut builder = netlist.primitive(name, dummy_span()).output("q");
    for input in inputs {
        builder = builder.input(input);
    }
    builder = builder.table();
    for (ins, out) in rows {
        builder = builder.row(ins, out);
    }
    builder.finish().expect("primitive builds")
}

/// The `If` nodes of the single always block of `prim`, in chain order.
pub fn if_chain(netlist: &Netlist, prim: NodeId) -> Vec<NodeId> {
    let always: Vec<NodeId> = netlist
        .children(prim)
        .into_iter()
        .filter(|id| matches!(netlist.kind(*id), NodeKind::Always { .. }))
        .collect();
    assert_eq!(always.len(), 1, "expected exactly one always block");

    let mut chain = Vec::new();
    let mut next = match netlist.kind(always[0]) {
        NodeKind::Always { stmts } => stmts.first().copied(),
        _ => None,
    };
    while let Some(id) = next {
        chain.push(id);
        next = match netlist.kind(id) {
            NodeKind::If { else_stmts, .. } => else_stmts.first().copied(),
            other => panic!("chain contains {:?}", other),
        };
    }
    chain
}

/// Mask and compare numbers of a row condition `(field & mask) == compare`.
pub fn mask_compare(netlist: &Netlist, if_node: NodeId) -> (Number, Number) {
    let NodeKind::If { cond, .. } = netlist.kind(if_node) else {
        panic!("not an if");
    };
    let NodeKind::Eq { lhs, rhs } = netlist.kind(*cond) else {
        panic!("condition is not an equality: {:?}", netlist.kind(*cond));
    };
    let NodeKind::And { rhs: mask, .. } = netlist.kind(*lhs) else {
        panic!("equality lhs is not a mask");
    };
    (constant(netlist, *mask), constant(netlist, *rhs))
}

/// The value assigned in the then-branch of `if_node`, if any.
pub fn assigned_value(netlist: &Netlist, if_node: NodeId) -> Option<Number> {
    let NodeKind::If { then_stmts, .. } = netlist.kind(if_node) else {
        panic!("not an if");
    };
    then_stmts.first().map(|stmt| match netlist.kind(*stmt) {
        NodeKind::Assign { rhs, .. } => constant(netlist, *rhs),
        other => panic!("then-branch holds {:?}", other),
    })
}

pub fn constant(netlist: &Netlist, id: NodeId) -> Number {
    match netlist.kind(id) {
        NodeKind::Const(number) => number.clone(),
        other => panic!("expected a constant, found {:?}", other),
    }
}

pub fn bit(value: u64) -> Number {
    Number::from_u64(1, value)
}
