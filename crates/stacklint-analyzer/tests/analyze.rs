// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! End-to-end classification over small C# programs.

use pretty_assertions::assert_eq;
use stacklint_analyzer::{
    analyze_source, AllocationSite, AnalyzeOpts, Analyzer, CompilationOptions, Diagnostic,
    EscapeProver, EscapeVerdict, Severity, SyntacticEscapeProver, RULE,
};
use stacklint_ast::{NodeRef, SyntaxTree};
use stacklint_semantic::SemanticModel;

/// Wrap class members in the same layout for every test, so the first
/// statement of a method declared on line 8 sits on line 10.
fn program(members: &str) -> String {
    format!(
        "\n    using System;\n\n    namespace ConsoleApplication1\n    {{\n        class TypeName\n        {{   \n{}        }}\n    }}",
        members
    )
}

fn method(body: &str) -> String {
    program(&format!(
        "            public unsafe void Test()\n            {{\n{}            }}\n",
        body
    ))
}

fn unsafe_opts() -> AnalyzeOpts {
    AnalyzeOpts {
        compilation: CompilationOptions { allow_unsafe: true },
        ..Default::default()
    }
}

fn check_with(source: &str, opts: &AnalyzeOpts) -> Vec<Diagnostic> {
    let report = analyze_source(source, "Test0.cs", opts);
    assert!(
        report.success,
        "lex errors: {:?}\nparse errors: {:?}",
        report.lex_errors, report.parse_errors
    );
    report.diagnostics
}

fn check(source: &str) -> Vec<Diagnostic> {
    check_with(source, &unsafe_opts())
}

fn messages(source: &str) -> Vec<String> {
    check(source).into_iter().map(|d| d.message).collect()
}

// =============================================================================
// Reported
// =============================================================================

#[test]
fn small_byte_array() {
    let found = check(&method("                var b = new byte[1];\n"));
    assert_eq!(found.len(), 1);
    let d = &found[0];
    assert_eq!(d.rule, RULE.id);
    assert_eq!(d.severity, Severity::Warning);
    assert_eq!(d.message, "Array 'new byte[1]' can be allocated on the stack");
    assert_eq!(d.allocation, "new byte[1]");
    assert_eq!((d.location.line, d.location.column), (10, 23));
    assert_eq!(d.location.source_line, "                var b = new byte[1];");
}

#[test]
fn column_counts_utf16_units() {
    let found = check(&method("                /*é😀*/ var b = new byte[1];\n"));
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].location.line, found[0].location.column), (10, 31));
}

#[test]
fn const_member_size() {
    let source = program(
        "            const int i = 1;\n            public unsafe void Test()\n            {\n                var b = new byte[i];\n            }\n",
    );
    let found = check(&source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Array 'new byte[i]' can be allocated on the stack");
    assert_eq!((found[0].location.line, found[0].location.column), (11, 23));
}

#[test]
fn initializer_without_size() {
    let found = check(&method("                var b = new byte[]{1};\n"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Array 'new byte[]{1}' can be allocated on the stack");
    assert_eq!((found[0].location.line, found[0].location.column), (10, 23));
}

#[test]
fn explicit_size_with_initializer() {
    assert_eq!(
        messages(&method("                byte[] b = new byte[2] { 1, 2 };\n")),
        vec!["Array 'new byte[2] { 1, 2 }' can be allocated on the stack"]
    );
}

#[test]
fn const_local_size() {
    let body = "                const int n = 8;\n                var b = new long[n];\n";
    assert_eq!(messages(&method(body)).len(), 1);
}

#[test]
fn qualified_const_size() {
    let source = format!(
        "{}\n    static class Sizes {{ public const int Small = 4 * 4; }}",
        method("                var b = new int[Sizes.Small];\n")
    );
    assert_eq!(messages(&source), vec!["Array 'new int[Sizes.Small]' can be allocated on the stack"]);
}

#[test]
fn exactly_at_threshold() {
    assert_eq!(messages(&method("                var b = new int[256];\n")).len(), 1);
    assert_eq!(messages(&method("                var b = new decimal[64];\n")).len(), 1);
    assert!(messages(&method("                var b = new int[257];\n")).is_empty());
}

#[test]
fn system_qualified_and_keyword_names_agree() {
    let body = "                var a = new System.Int16[4];\n                var b = new Char[4];\n                var c = new bool[0];\n";
    assert_eq!(check(&method(body)).len(), 3);
}

#[test]
fn local_only_read_and_written_by_index() {
    let body = "                var b = new byte[4];\n                b[0] = 1;\n                var x = b[0] + b.Length;\n";
    assert_eq!(check(&method(body)).len(), 1);
}

#[test]
fn constructor_body() {
    let source = program("            public TypeName()\n            {\n                var b = new byte[3];\n            }\n");
    assert_eq!(check(&source).len(), 1);
}

#[test]
fn results_ordered_by_position() {
    let body = "                var a = new byte[1];\n                var b = new short[2];\n                var c = new int[3];\n";
    let lines: Vec<u32> = check(&method(body)).iter().map(|d| d.location.line).collect();
    assert_eq!(lines, vec![10, 11, 12]);
}

#[test]
fn analysis_is_repeatable() {
    let source = method("                var a = new byte[1];\n                var b = new int[2];\n");
    assert_eq!(check(&source), check(&source));
}

// =============================================================================
// Size rejections
// =============================================================================

#[test]
fn large_arrays() {
    for ty in ["byte", "short", "int", "long", "object"] {
        let source = method(&format!("                var b = new {}[1111];\n", ty));
        assert!(check(&source).is_empty(), "{} was reported", ty);
    }
}

#[test]
fn runtime_size() {
    assert!(check(&method("                var b = new byte[new Random().Next(9,11)];\n")).is_empty());
}

#[test]
fn local_variable_size() {
    let body = "                int n = 4;\n                var b = new byte[n];\n";
    assert!(check(&method(body)).is_empty());
}

#[test]
fn negative_constant_size() {
    let body = "                const int n = -1;\n                var b = new byte[n];\n";
    assert!(check(&method(body)).is_empty());
}

#[test]
fn const_in_sibling_block_does_not_size_runtime_local() {
    let body = "                { const int n = 4; }\n                { int n = Rand(); var b = new byte[n]; }\n";
    assert!(check(&method(body)).is_empty());
}

#[test]
fn out_variable_shadows_const_field() {
    let source = program(
        "            const int n = 4;\n            public unsafe void Test()\n            {\n                P(s, out int n);\n                var b = new byte[n];\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn pattern_variable_shadows_const_field() {
    let source = program(
        "            const int n = 4;\n            public unsafe void Test()\n            {\n                if (o is int n) { var b = new byte[n]; }\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn const_from_enclosing_block() {
    let body = "                const int n = 4;\n                {\n                    var b = new byte[n];\n                }\n";
    assert_eq!(check(&method(body)).len(), 1);
}

#[test]
fn size_product_never_wraps() {
    // 8 * 2305843009213693953 wraps to 8 in 64 bits
    let literal = "                var b = new long[2305843009213693953UL];\n";
    assert!(check(&method(literal)).is_empty());

    let folded = "                const ulong n = 2305843009213693953UL;\n                var b = new long[n];\n";
    assert!(check(&method(folded)).is_empty());

    let max = "                var b = new short[18446744073709551615UL];\n";
    assert!(check(&method(max)).is_empty());
}

#[test]
fn unknown_element_types() {
    let source = program(
        "            struct Pair { int a; int b; }\n            public unsafe void Test()\n            {\n                var p = new Pair[1];\n                var s = new string[0];\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn declared_type_shadows_runtime_name() {
    let source = program(
        "            class Byte { }\n            public unsafe void Test()\n            {\n                var b = new Byte[1];\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn multi_dimensional_and_jagged() {
    let body = "                var a = new byte[2, 2];\n                var b = new byte[2][];\n";
    assert!(check(&method(body)).is_empty());
}

// =============================================================================
// Context rejections
// =============================================================================

#[test]
fn for_loop() {
    let body = "                for(int i = 0; i < 100; i++)\n                    var b = new byte[1];\n";
    assert!(check(&method(body)).is_empty());
}

#[test]
fn other_loops() {
    let bodies = [
        "                foreach (var x in xs) { var b = new byte[1]; }\n",
        "                while (true) { var b = new byte[1]; }\n",
        "                do { if (x) { var b = new byte[1]; } } while (false);\n",
    ];
    for body in bodies {
        assert!(check(&method(body)).is_empty(), "reported inside: {}", body);
    }
}

#[test]
fn async_method() {
    let source = program(
        "            public unsafe async Task Test()\n            {\n                var b = new byte[1];\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn field_initializer() {
    assert!(check(&program("            byte[] b = new byte[1];\n")).is_empty());
}

#[test]
fn property_accessor() {
    let source = program(
        "            int P\n            {\n                get { var b = new byte[1]; return 0; }\n            }\n",
    );
    assert!(check(&source).is_empty());
}

// =============================================================================
// Escape rejections
// =============================================================================

#[test]
fn returned() {
    let source = program(
        "            public unsafe byte[] Test()\n            {\n                var b = new byte[1];\n                return b;\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn returned_directly() {
    let source = program("            public unsafe byte[] Test()\n            {\n                return new byte[1];\n            }\n");
    assert!(check(&source).is_empty());
}

#[test]
fn passed_to_method() {
    let source = program(
        "            public void TestEscape(byte[] b) {}\n            public unsafe void Test()\n            {\n                    var b = new byte[1];\n                    TestEscape(b);\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn passed_to_constructor() {
    let source = program(
        "            class TestEscape{ public TestEscape(byte[] b) {}}\n            public unsafe void Test()\n            {\n                    var b = new byte[1];\n                    new TestEscape(b);\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn assigned_to_static_field() {
    let source = program(
        "            class TestEscape{ public static byte[] b;}\n            public unsafe void Test()\n            {\n                    var b = new byte[1];\n                    TestEscape.b = b;\n            }\n",
    );
    assert!(check(&source).is_empty());
}

#[test]
fn parenthesized_argument_escapes() {
    let body = "                var b = new byte[1];\n                Use((b));\n";
    assert!(check(&method(body)).is_empty());
}

#[test]
fn not_bound_to_local() {
    let body = "                byte[] b;\n                b = new byte[1];\n                Use(new byte[2]);\n";
    assert!(check(&method(body)).is_empty());
}

// =============================================================================
// Aliasing through larger expressions is not followed
// =============================================================================

#[test]
fn aliases_through_larger_expressions_are_reported() {
    let uses = [
        "F = c ? b : null;",
        "F = (object)b;",
        "var c = b;",
        "F = new[] { b };",
        "Use(flag ? b : null);",
    ];
    for use_ in uses {
        let body = format!("                var b = new byte[1];\n                {}\n", use_);
        assert_eq!(
            messages(&method(&body)),
            vec!["Array 'new byte[1]' can be allocated on the stack"],
            "after: {}",
            use_
        );
    }
}

#[test]
fn syntactic_prover_ignores_aliases() {
    let source = method("                var b = new byte[1];\n                var c = b;\n                F = c;\n");
    let parsed = stacklint_parser::parse_source(&source);
    let tree = SyntaxTree::new(&parsed.unit);
    let model = SemanticModel::new(&tree);
    let expr = tree.array_creations().next().unwrap();
    let site = AllocationSite::new(&model, expr).unwrap();
    assert_eq!(SyntacticEscapeProver.prove(&site), EscapeVerdict::Confined);
}

// =============================================================================
// Options
// =============================================================================

#[test]
fn inert_without_unsafe() {
    let source = method("                var b = new byte[1];\n");
    assert!(check_with(&source, &AnalyzeOpts::default()).is_empty());
}

#[test]
fn rule_can_be_excluded() {
    let source = method("                var b = new byte[1];\n");
    let opts = AnalyzeOpts { excludes: vec!["perf/*".into()], ..unsafe_opts() };
    assert!(check_with(&source, &opts).is_empty());
}

#[test]
fn severity_override() {
    let source = method("                var b = new byte[1];\n");
    let mut opts = unsafe_opts();
    opts.severity.insert(RULE.id.into(), Severity::Note);
    let found = check_with(&source, &opts);
    assert_eq!(found[0].severity, Severity::Note);
}

#[test]
fn empty_source() {
    assert!(check("").is_empty());
}

#[test]
fn parse_errors_are_reported_not_analyzed() {
    let report = analyze_source("class C { void M() { var b = new byte[1] } }", "bad.cs", &unsafe_opts());
    assert!(!report.success);
    assert!(!report.parse_errors.is_empty());
    assert_eq!(report.error_count(), report.parse_errors.len());
    assert!(report.diagnostics.is_empty());
}

#[test]
fn lambda_capture_is_not_reported() {
    let source = method("                var b = new byte[1];\n                F = () => b;\n");
    let report = analyze_source(&source, "Test0.cs", &unsafe_opts());
    assert!(!report.success);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn local_function_use_is_not_reported() {
    let source = method("                var b = new byte[1];\n                void Keep() { G = b; }\n");
    let report = analyze_source(&source, "Test0.cs", &unsafe_opts());
    assert!(!report.success);
    assert!(report.diagnostics.is_empty());
}

// =============================================================================
// Analyzer API
// =============================================================================

struct AlwaysConfined;

impl EscapeProver for AlwaysConfined {
    fn prove(&self, _site: &AllocationSite<'_>) -> EscapeVerdict {
        EscapeVerdict::Confined
    }
}

#[test]
fn prover_is_pluggable() {
    let source = program(
        "            public unsafe byte[] Test()\n            {\n                var b = new byte[1];\n                return b;\n            }\n",
    );
    let parsed = stacklint_parser::parse_source(&source);
    assert!(parsed.is_ok());
    let tree = SyntaxTree::new(&parsed.unit);
    let model = SemanticModel::new(&tree);
    let options = CompilationOptions { allow_unsafe: true };

    assert!(Analyzer::new(&model, &source, options).analyze_tree().is_empty());
    let found = Analyzer::new(&model, &source, options).with_prover(AlwaysConfined).analyze_tree();
    assert_eq!(found.len(), 1);
}

#[test]
fn analyze_ignores_other_nodes() {
    let source = method("                var b = new byte[1];\n");
    let parsed = stacklint_parser::parse_source(&source);
    let tree = SyntaxTree::new(&parsed.unit);
    let model = SemanticModel::new(&tree);
    let analyzer = Analyzer::new(&model, &source, CompilationOptions { allow_unsafe: true });

    let reported: Vec<_> = tree.walk().filter_map(|node| analyzer.analyze(node)).collect();
    assert_eq!(reported.len(), 1);
    let creation = tree.array_creations().next().map(NodeRef::Expr);
    assert_eq!(creation.and_then(|n| analyzer.analyze(n)), reported.into_iter().next());
}
