// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Semantic queries over parsed sources.

use pretty_assertions::assert_eq;
use stacklint_ast::expr::{ArraySize, Expr, ExprKind};
use stacklint_ast::SyntaxTree;
use stacklint_parser::parse_source;
use stacklint_semantic::{ConstError, ConstValue, SemanticModel, SpecialType, SymbolKind, TypeSymbol};

/// Run `check` against the semantic model of `source`.
fn with_model(source: &str, check: impl FnOnce(&SemanticModel<'_>)) {
    let result = parse_source(source);
    assert!(result.is_ok(), "Parse errors: {:?}", result.errors);
    let tree = SyntaxTree::new(&result.unit);
    let model = SemanticModel::new(&tree);
    check(&model);
}

/// Size expression of the `n`th array creation.
fn size_expr<'a>(model: &SemanticModel<'a>, n: usize) -> &'a Expr {
    let creation = model.tree().array_creations().nth(n).expect("array creation");
    match &creation.kind {
        ExprKind::ArrayCreation { ranks, .. } => match &ranks[0].sizes[0] {
            ArraySize::Expr(e) => e,
            ArraySize::Omitted => panic!("size omitted"),
        },
        _ => unreachable!(),
    }
}

#[test]
fn array_type_of_creations() {
    let src = "class C { void M() {
        var a = new byte[1];
        var b = new System.Int32[2];
        var c = new int[2, 3];
        var d = new int[3][];
        var e = new Widget[4];
        var f = new Guid[4];
    } }
    struct Widget { }";
    with_model(src, |model| {
        let types: Vec<_> = model
            .tree()
            .array_creations()
            .map(|e| model.array_type(e).expect("array type"))
            .collect();

        assert_eq!(types[0].element, TypeSymbol::Special(SpecialType::Byte));
        assert_eq!(types[0].rank, 1);
        assert_eq!(types[1].element, TypeSymbol::Special(SpecialType::Int32));
        assert_eq!(types[2].rank, 2);
        assert_eq!(types[3].rank, 1);
        assert!(types[3].is_jagged());
        assert_eq!(types[4].element, TypeSymbol::Named("Widget".to_string()));
        assert_eq!(types[5].element, TypeSymbol::Unknown);
    });
}

#[test]
fn declared_type_shadows_runtime_name() {
    let src = "namespace App { struct Byte { } class C { void M() { var a = new Byte[1]; } } }";
    with_model(src, |model| {
        let creation = model.tree().array_creations().next().expect("array creation");
        let ty = model.array_type(creation).expect("array type");
        assert_eq!(ty.element, TypeSymbol::Named("App.Byte".to_string()));
    });
}

#[test]
fn literal_and_const_local_sizes() {
    let src = "class C { void M() {
        const int i = 1;
        var a = new byte[1];
        var b = new byte[i];
    } }";
    with_model(src, |model| {
        let literal = size_expr(model, 0);
        assert_eq!(model.constant_value(literal), Some(ConstValue::Int(1)));
        assert!(!model.is_constant_reference(literal));

        let named = size_expr(model, 1);
        assert!(model.is_constant_reference(named));
        assert_eq!(model.constant_value(named), Some(ConstValue::Int(1)));
    });
}

#[test]
fn const_fields_fold_through_other_constants() {
    let src = "class Sizes {
        public const int Small = Base * 2;
        const int Base = 8;
    }
    class C {
        const int Local = Sizes.Small + 1;
        void M() {
            var a = new byte[Sizes.Small];
            var b = new byte[Local];
        }
    }";
    with_model(src, |model| {
        let qualified = size_expr(model, 0);
        assert!(model.is_constant_reference(qualified));
        assert_eq!(model.constant_value(qualified), Some(ConstValue::Int(16)));

        let simple = size_expr(model, 1);
        assert_eq!(model.constant_value(simple), Some(ConstValue::Int(17)));
    });
}

#[test]
fn locals_and_parameters_are_not_constants() {
    let src = "class C {
        const int n = 4;
        static readonly int r = 4;
        void M(int p) {
            int n = 2;
            var a = new byte[n];
            var b = new byte[p];
            var c = new byte[r];
            var d = new byte[Count()];
        }
    }";
    with_model(src, |model| {
        for i in 0..4 {
            let size = size_expr(model, i);
            assert!(!model.is_constant_reference(size), "size {} resolved as constant", i);
            assert_eq!(model.constant_value(size), None);
        }
    });
}

#[test]
fn constant_cycles_are_detected() {
    let src = "class C {
        const int A = B;
        const int B = A;
        void M() { var a = new byte[A]; }
    }";
    with_model(src, |model| {
        let size = size_expr(model, 0);
        assert!(model.is_constant_reference(size));
        assert!(matches!(model.evaluate_constant(size), Err(ConstError::Cycle { .. })));
        assert_eq!(model.constant_value(size), None);
    });
}

#[test]
fn casts_and_negative_constants() {
    let src = "class C {
        const int Neg = -1;
        const byte Wide = (byte)300;
        void M() {
            var a = new byte[Neg];
            var b = new byte[Wide];
        }
    }";
    with_model(src, |model| {
        assert_eq!(model.constant_value(size_expr(model, 0)), Some(ConstValue::Int(-1)));
        assert!(matches!(
            model.evaluate_constant(size_expr(model, 1)),
            Err(ConstError::OutOfRange { value: 300, .. })
        ));
    });
}

#[test]
fn symbol_table_records_members() {
    let src = "namespace N {
        class Outer {
            const int K = 1;
            int x, y;
            Outer() { }
            async void Run() { }
            class Inner { }
        }
    }";
    with_model(src, |model| {
        let symbols = model.symbols();
        let outer = symbols.types_named("Outer").next().expect("Outer");
        assert_eq!(outer.qualified_name, "N.Outer");

        let k = symbols.member(outer.id, "K").expect("K");
        assert!(matches!(k.kind, SymbolKind::Field { is_const: true, .. }));
        assert!(symbols.member(outer.id, "y").is_some());
        let run = symbols.member(outer.id, "Run").expect("Run");
        assert!(matches!(run.kind, SymbolKind::Method { is_async: true, .. }));

        let inner = symbols.types_named("Inner").next().expect("Inner");
        assert_eq!(inner.qualified_name, "N.Outer.Inner");
        assert_eq!(symbols.by_node(inner.node).map(|s| s.id), Some(inner.id));
    });
}
