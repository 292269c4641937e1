use expect_test::expect;
use udpc_ir::dump::dump_tree;
use udpc_ir::visit::KindCounter;
use udpc_ir::{check_tree, Access, IrError, Netlist, NodeKind, Number};
use udpc_source::{SourceFile, SourceSpan};

fn span() -> SourceSpan {
    SourceSpan::from((0, 0))
}

#[test]
fn test_built_primitive_dumps_as_table() {
    let mut nl = Netlist::new();
    nl.primitive("or2", span())
        .output("q")
        .input("a")
        .input("b")
        .row("1 ?", "1")
        .row("? 1", "1")
        .row("0 0", "0")
        .finish()
        .unwrap();

    assert_eq!(check_tree(&nl), Ok(()));
    expect![[r#"
        primitive or2;
          output wire q;
          input wire a;
          input wire b;
          table
            1 ? : 1;
            ? 1 : 1;
            0 0 : 0;
          endtable
        endprimitive
    "#]]
    .assert_eq(&dump_tree(&nl));

    let counts = KindCounter::count(&nl, nl.root());
    assert_eq!(counts.get("Var"), 3);
    assert_eq!(counts.get("UdpTableLine"), 3);
    assert_eq!(counts.get("If"), 0);
}

#[test]
fn test_replace_table_with_assignment_keeps_tree_consistent() {
    let mut nl = Netlist::new();
    let prim = nl
        .primitive("buf1", span())
        .output("q")
        .input("a")
        .row("1", "1")
        .finish()
        .unwrap();
    let items = nl.children(prim);
    let (q, a, table) = (items[0], items[1], items[2]);
    let before = nl.len();

    let lhs = nl.alloc(NodeKind::VarRef { var: q, access: Access::Write }, span());
    let rhs = nl.alloc(NodeKind::VarRef { var: a, access: Access::Read }, span());
    let assign = nl.alloc(NodeKind::AssignW { lhs, rhs }, span());
    let freed = nl.replace_with(table, &[assign]).unwrap();

    assert_eq!(freed, 2);
    assert_eq!(nl.len(), before - 2 + 3);
    assert_eq!(check_tree(&nl), Ok(()));
    assert!(nl.find_kind(nl.root(), "UdpTable").is_empty());
    assert_eq!(nl.replace_with(table, &[]), Err(IrError::DanglingNode(table)));
}

#[test]
fn test_reinserting_an_attached_node_fails() {
    let mut nl = Netlist::new();
    let prim = nl.primitive("p", span()).output("q").input("a").finish().unwrap();
    let items = nl.children(prim);
    assert_eq!(
        nl.insert_after(items[0], items[1]),
        Err(IrError::AlreadyAttached { node: items[1], parent: prim })
    );
}

#[test]
fn test_locations_use_the_attached_file() {
    let file = SourceFile::new("buf.v", "primitive buf1;\n  output q;\n");
    let mut nl = Netlist::with_file(file);
    let prim = nl
        .primitive("buf1", SourceSpan::from((0, 15)))
        .at(SourceSpan::from((18, 9)))
        .output("q")
        .finish()
        .unwrap();
    let q = nl.children(prim)[0];
    assert_eq!(nl.location(prim), "buf.v:1:1");
    assert_eq!(nl.location(q), "buf.v:2:3");

    let c = nl.alloc(NodeKind::Const(Number::from_u64(1, 0)), SourceSpan::from((4, 1)));
    assert_eq!(nl.location(c), "buf.v:1:5");
}
