// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parent, ancestor and descendant queries over parsed sources.

use stacklint_ast::expr::ExprKind;
use stacklint_ast::stmt::StmtKind;
use stacklint_ast::{NodeRef, SyntaxTree};
use stacklint_parser::parse_source;

const SOURCE: &str = "\
namespace Demo
{
    class Worker
    {
        void Run(int n)
        {
            for (int i = 0; i < n; i++)
            {
                var b = new byte[1];
            }
            var c = new int[n];
        }
    }
}
";

#[test]
fn array_creations_in_source_order() {
    let result = parse_source(SOURCE);
    assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
    let tree = SyntaxTree::new(&result.unit);

    let creations: Vec<_> = tree.array_creations().collect();
    assert_eq!(creations.len(), 2);
    assert!(creations[0].span.start < creations[1].span.start);
}

#[test]
fn parent_of_creation_is_declarator() {
    let result = parse_source(SOURCE);
    let tree = SyntaxTree::new(&result.unit);
    let creation = tree.array_creations().next().expect("array creation");

    let parent = tree.parent(creation.id).expect("parent");
    let declarator = parent.as_declarator().expect("declarator parent");
    assert_eq!(declarator.name, "b");
}

#[test]
fn ancestors_reach_loop_and_function() {
    let result = parse_source(SOURCE);
    let tree = SyntaxTree::new(&result.unit);
    let creation = tree.array_creations().next().expect("array creation");

    let in_loop = tree
        .first_ancestor(creation.id, |n| {
            matches!(n.as_stmt().map(|s| &s.kind), Some(StmtKind::For { .. }))
        })
        .is_some();
    assert!(in_loop);

    let function = tree
        .ancestors(creation.id)
        .find_map(|n| n.as_function())
        .expect("enclosing function");
    assert_eq!(function.name, "Run");

    // The top of the chain is the namespace declaration.
    let last = tree.ancestors(creation.id).last().expect("root");
    assert!(matches!(last, NodeRef::Decl(_)));
    assert!(tree.parent(last.id()).is_none());
}

#[test]
fn second_creation_is_outside_the_loop() {
    let result = parse_source(SOURCE);
    let tree = SyntaxTree::new(&result.unit);
    let creation = tree.array_creations().nth(1).expect("second creation");

    let in_loop = tree
        .ancestors(creation.id)
        .any(|n| matches!(n.as_stmt().map(|s| &s.kind), Some(StmtKind::For { .. })));
    assert!(!in_loop);
}

#[test]
fn descendants_exclude_self_and_restart() {
    let result = parse_source(SOURCE);
    let tree = SyntaxTree::new(&result.unit);
    let creation = tree.array_creations().nth(1).expect("second creation");
    let node = tree.node(creation.id).expect("indexed");

    let first: Vec<_> = SyntaxTree::descendants(node).map(|n| n.id()).collect();
    assert!(!first.contains(&creation.id));
    // `n` is the only descendant of `new int[n]`
    assert_eq!(first.len(), 1);
    let size = tree.node(first[0]).and_then(|n| n.as_expr()).expect("size expr");
    assert!(matches!(size.kind, ExprKind::Ident(ref name) if name == "n"));

    let second: Vec<_> = SyntaxTree::descendants(node).map(|n| n.id()).collect();
    assert_eq!(first, second);
}

#[test]
fn every_walked_node_is_indexed() {
    let result = parse_source(SOURCE);
    let tree = SyntaxTree::new(&result.unit);
    let walked = tree.walk().count();
    assert_eq!(walked, tree.len());
    for node in tree.walk() {
        assert!(tree.node(node.id()).is_some());
    }
}
