// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the C# subset analyzed by stacklint.
//!
//! Transforms a token stream into a [`CompilationUnit`](stacklint_ast::decl::CompilationUnit).
//! Errors are collected rather than fatal; the parser resynchronizes at
//! statement, member and declaration boundaries.

mod hints;
mod parser;

pub use parser::{ParseError, ParseResult, Parser};

/// Lex and parse `source` in one step. Lex errors are folded into the
/// returned error list.
pub fn parse_source(source: &str) -> ParseResult {
    let lexed = stacklint_lexer::Lexer::new(source).tokenize();
    let mut result = Parser::new(lexed.tokens).parse();
    if !lexed.errors.is_empty() {
        let mut errors: Vec<ParseError> = lexed
            .errors
            .into_iter()
            .map(|e| ParseError { span: e.span, message: e.message, hint: e.hint })
            .collect();
        errors.append(&mut result.errors);
        result.errors = errors;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacklint_ast::decl::{DeclKind, MemberKind, TypeDecl, TypeKind};
    use stacklint_ast::expr::{ArraySize, BinOp, ExprKind};
    use stacklint_ast::stmt::StmtKind;
    use stacklint_ast::decl::FnBody;
    use stacklint_ast::types::TypeRefKind;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> ParseResult {
        let lex_result = stacklint_lexer::Lexer::new(src).tokenize();
        assert!(lex_result.is_ok(), "Lex errors: {:?}", lex_result.errors);
        Parser::new(lex_result.tokens).parse()
    }

    fn first_type(result: &ParseResult) -> &TypeDecl {
        for decl in &result.unit.decls {
            match &decl.kind {
                DeclKind::Type(t) => return t,
                DeclKind::Namespace(ns) => {
                    for inner in &ns.decls {
                        if let DeclKind::Type(t) = &inner.kind {
                            return t;
                        }
                    }
                }
                DeclKind::Using(_) => {}
            }
        }
        panic!("no type declaration");
    }

    /// Body statements of the first method in the first type.
    fn method_body(result: &ParseResult) -> &[stacklint_ast::stmt::Stmt] {
        let ty = first_type(result);
        for member in &ty.members {
            if let MemberKind::Method(m) = &member.kind {
                if let Some(FnBody::Block(stmts)) = &m.body {
                    return stmts;
                }
            }
        }
        panic!("no method with a block body");
    }

    fn in_method(body: &str) -> String {
        format!("class C {{ void M() {{ {body} }} }}")
    }

    #[test]
    fn parse_usings_and_namespace() {
        let result = parse(
            "using System;\nusing static System.Math;\nusing IO = System.IO;\nnamespace A.B { class C { } }",
        );
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        assert_eq!(result.unit.decls.len(), 4);

        if let DeclKind::Using(ref u) = result.unit.decls[1].kind {
            assert!(u.is_static);
            assert_eq!(u.path, vec!["System", "Math"]);
        } else {
            panic!("Expected using directive");
        }
        if let DeclKind::Using(ref u) = result.unit.decls[2].kind {
            assert_eq!(u.alias.as_deref(), Some("IO"));
        } else {
            panic!("Expected using alias");
        }
        if let DeclKind::Namespace(ref ns) = result.unit.decls[3].kind {
            assert_eq!(ns.name, vec!["A", "B"]);
            assert!(!ns.file_scoped);
            assert_eq!(ns.decls.len(), 1);
        } else {
            panic!("Expected namespace");
        }
    }

    #[test]
    fn parse_file_scoped_namespace() {
        let result = parse("namespace App;\nclass A { }\nstruct B { }");
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        assert_eq!(result.unit.decls.len(), 1);
        if let DeclKind::Namespace(ref ns) = result.unit.decls[0].kind {
            assert!(ns.file_scoped);
            assert_eq!(ns.decls.len(), 2);
        } else {
            panic!("Expected namespace");
        }
    }

    #[test]
    fn parse_type_kinds() {
        let result = parse(
            "public sealed class A : Base, IFoo { }
             internal struct B { }
             interface I { void M(); }
             enum E { X, Y = 2, }
             public record R(int X, int Y);
             partial class P<T> where T : class, new() { }",
        );
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let kinds: Vec<TypeKind> = result
            .unit
            .decls
            .iter()
            .filter_map(|d| match &d.kind {
                DeclKind::Type(t) => Some(t.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                TypeKind::Class,
                TypeKind::Struct,
                TypeKind::Interface,
                TypeKind::Enum,
                TypeKind::Record,
                TypeKind::Class
            ]
        );
    }

    #[test]
    fn parse_members() {
        let result = parse(
            "class C {
                private const int Size = 16;
                static readonly byte[] table = new byte[4], other;
                public C(int x) : base(x) { }
                public int Count { get; private set; } = 0;
                public int Twice => Count * 2;
                [Obsolete] public static T Get<T>(T[] items, int i = 0) where T : struct => items[i];
                void IDisposable.Dispose() { }
            }",
        );
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let ty = first_type(&result);
        assert_eq!(ty.members.len(), 7);

        match &ty.members[1].kind {
            MemberKind::Field(f) => {
                assert_eq!(f.declarators.len(), 2);
                assert!(f.declarators[0].init.is_some());
                assert!(f.declarators[1].init.is_none());
            }
            other => panic!("Expected field, got {:?}", other),
        }
        match &ty.members[2].kind {
            MemberKind::Constructor(c) => {
                assert_eq!(c.params.len(), 1);
                assert!(c.chain.as_ref().map(|ch| ch.is_base).unwrap_or(false));
            }
            other => panic!("Expected constructor, got {:?}", other),
        }
        match &ty.members[3].kind {
            MemberKind::Property(p) => {
                assert_eq!(p.accessors.len(), 2);
                assert!(p.init.is_some());
            }
            other => panic!("Expected property, got {:?}", other),
        }
        match &ty.members[5].kind {
            MemberKind::Method(m) => {
                assert_eq!(m.type_params, vec!["T"]);
                assert_eq!(m.params.len(), 2);
                assert!(matches!(m.body, Some(FnBody::Expr(_))));
            }
            other => panic!("Expected method, got {:?}", other),
        }
        match &ty.members[6].kind {
            MemberKind::Method(m) => assert_eq!(m.name, "IDisposable.Dispose"),
            other => panic!("Expected method, got {:?}", other),
        }
    }

    #[test]
    fn parse_array_creation_shapes() {
        let result = parse(&in_method(
            "var a = new byte[1];
             int[] b = new int[] { 1, 2, 3 };
             var c = new int[2, 3];
             var d = new int[3][];
             var e = new[] { 1, 2 };
             int[] f = { 1, 2 };",
        ));
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let body = method_body(&result);
        assert_eq!(body.len(), 6);

        let init = |i: usize| match &body[i].kind {
            StmtKind::Local(decl) => &decl.declarators[0].init.as_ref().expect("initializer").value,
            other => panic!("Expected local, got {:?}", other),
        };

        match &init(0).kind {
            ExprKind::ArrayCreation { ranks, initializer, .. } => {
                assert_eq!(ranks.len(), 1);
                assert!(matches!(ranks[0].sizes[0], ArraySize::Expr(_)));
                assert!(initializer.is_none());
            }
            other => panic!("Expected array creation, got {:?}", other),
        }
        match &init(1).kind {
            ExprKind::ArrayCreation { ranks, initializer, .. } => {
                assert!(matches!(ranks[0].sizes[0], ArraySize::Omitted));
                assert_eq!(initializer.as_ref().map(Vec::len), Some(3));
            }
            other => panic!("Expected array creation, got {:?}", other),
        }
        match &init(2).kind {
            ExprKind::ArrayCreation { ranks, .. } => assert_eq!(ranks[0].sizes.len(), 2),
            other => panic!("Expected array creation, got {:?}", other),
        }
        match &init(3).kind {
            ExprKind::ArrayCreation { ranks, .. } => assert_eq!(ranks.len(), 2),
            other => panic!("Expected array creation, got {:?}", other),
        }
        assert!(matches!(init(4).kind, ExprKind::ImplicitArrayCreation { .. }));
        assert!(matches!(init(5).kind, ExprKind::ArrayInitializer(_)));
    }

    #[test]
    fn parse_initializer_span_is_equals_sign() {
        let src = in_method("var b = new byte[1];");
        let result = parse(&src);
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        match &method_body(&result)[0].kind {
            StmtKind::Local(decl) => {
                let eq = decl.declarators[0].init.as_ref().expect("initializer").eq_span;
                assert_eq!(eq.text(&src), Some("="));
            }
            other => panic!("Expected local, got {:?}", other),
        }
    }

    #[test]
    fn parse_nested_generics() {
        let result = parse(&in_method(
            "List<List<int>> xs = new List<List<int>>();
             Dictionary<string, int[]> map = null;",
        ));
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let body = method_body(&result);
        match &body[0].kind {
            StmtKind::Local(decl) => match &decl.ty.kind {
                TypeRefKind::Named { path, args } => {
                    assert_eq!(path, &vec!["List".to_string()]);
                    assert_eq!(args.len(), 1);
                }
                other => panic!("Expected named type, got {:?}", other),
            },
            other => panic!("Expected local, got {:?}", other),
        }
        assert_eq!(
            match &body[1].kind {
                StmtKind::Local(decl) => decl.ty.to_string(),
                _ => String::new(),
            },
            "Dictionary<string, int[]>"
        );
    }

    #[test]
    fn parse_casts_and_parens() {
        let result = parse(&in_method(
            "var a = (int)x;
             var b = (x) + 1;
             var c = (byte)(n >> 2);
             var d = (Foo)y;",
        ));
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let body = method_body(&result);
        let kinds: Vec<&ExprKind> = body
            .iter()
            .map(|s| match &s.kind {
                StmtKind::Local(decl) => &decl.declarators[0].init.as_ref().expect("initializer").value.kind,
                other => panic!("Expected local, got {:?}", other),
            })
            .collect();
        assert!(matches!(kinds[0], ExprKind::Cast { .. }));
        assert!(matches!(kinds[1], ExprKind::Binary { op: BinOp::Add, .. }));
        assert!(matches!(kinds[2], ExprKind::Cast { .. }));
        assert!(matches!(kinds[3], ExprKind::Cast { .. }));
    }

    #[test]
    fn parse_precedence() {
        let result = parse(&in_method("x = a + b * c ?? d;"));
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        match &method_body(&result)[0].kind {
            StmtKind::Expr(e) => match &e.kind {
                ExprKind::Assign { value, .. } => match &value.kind {
                    ExprKind::Binary { op: BinOp::Coalesce, left, .. } => {
                        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Add, .. }));
                    }
                    other => panic!("Expected coalesce, got {:?}", other),
                },
                other => panic!("Expected assignment, got {:?}", other),
            },
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn parse_is_null_patterns() {
        let result = parse(&in_method("if (a is null) { } if (b is not null) { }"));
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let body = method_body(&result);
        let ops: Vec<BinOp> = body
            .iter()
            .filter_map(|s| match &s.kind {
                StmtKind::If { cond, .. } => match &cond.kind {
                    ExprKind::Binary { op, .. } => Some(*op),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec![BinOp::Eq, BinOp::Ne]);
    }

    #[test]
    fn parse_statements() {
        let result = parse(&in_method(
            "for (int i = 0; i < 10; i++) { var t = new int[4]; }
             foreach (var x in xs) continue;
             while (true) break;
             do { n--; } while (n > 0);
             try { Run(); } catch (Exception e) when (e != null) { throw; } finally { }
             switch (k) { case 1: case 2: return; default: break; }
             using (var s = Open()) { }
             using var r = Open();
             lock (gate) { }
             unsafe { int* p = stackalloc int[4]; }
             const int N = 8;
             yield return N;
             yield break;",
        ));
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let body = method_body(&result);
        assert_eq!(body.len(), 13);
        match &body[0].kind {
            StmtKind::For { init, body, .. } => {
                assert!(matches!(init[0].kind, StmtKind::Local(_)));
                assert!(matches!(body.kind, StmtKind::Block(_)));
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
        assert!(matches!(body[4].kind, StmtKind::Try { ref catches, .. } if catches.len() == 1));
        assert!(matches!(body[5].kind, StmtKind::Switch { ref sections, .. } if sections.len() == 2));
        assert!(matches!(body[7].kind, StmtKind::Local(_)));
        assert!(matches!(body[10].kind, StmtKind::Local(ref d) if d.is_const));
        assert!(matches!(body[11].kind, StmtKind::YieldReturn(_)));
    }

    #[test]
    fn parse_invocations_and_arguments() {
        let result = parse(&in_method(
            "Consume(buffer, count: 2, ref x, out var y, out int z);
             var s = obj?.Name.ToString();
             var m = Enumerable.Empty<int>();
             var v = int.MaxValue;",
        ));
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        match &method_body(&result)[0].kind {
            StmtKind::Expr(e) => match &e.kind {
                ExprKind::Invocation { args, .. } => {
                    assert_eq!(args.len(), 5);
                    assert_eq!(args[1].name.as_deref(), Some("count"));
                    assert!(matches!(args[3].expr.kind, ExprKind::Ident(ref n) if n == "y"));
                }
                other => panic!("Expected invocation, got {:?}", other),
            },
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn parse_error_recovery_in_block() {
        let result = parse(&in_method("var a = ; var b = new byte[1];"));
        assert_eq!(result.errors.len(), 1);
        let body = method_body(&result);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn parse_error_missing_semicolon() {
        let result = parse("class C { void M() { var a = 1 } }");
        assert!(!result.is_ok());
        assert!(result.errors[0].message.contains("Expected ';'"));
        assert!(result.errors[0].hint.is_some());
    }

    #[test]
    fn parse_error_array_without_size() {
        let result = parse(&in_method("var a = new int[];"));
        assert!(!result.is_ok());
        assert_eq!(result.errors[0].message, "Array creation needs a size or an initializer");
    }

    #[test]
    fn parse_unsupported_members_recover() {
        let result = parse("class C { ~C() { } void M() { } }");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("Finalizers"));
        let ty = first_type(&result);
        assert!(ty.members.iter().any(|m| matches!(&m.kind, MemberKind::Method(m) if m.name == "M")));
    }

    #[test]
    fn parse_source_reports_lex_errors() {
        let result = parse_source("class C { void M() { var s = \"open; } }");
        assert!(!result.is_ok());
    }

    #[test]
    fn node_ids_are_unique() {
        let result = parse(&in_method("var a = new int[1]; var b = a[0] + 1;"));
        assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
        let tree = stacklint_ast::SyntaxTree::new(&result.unit);
        let mut ids: Vec<u32> = tree.walk().map(|n| n.id().0).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
