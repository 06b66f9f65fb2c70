use dingo::config::{Config, MatchSyntax};
use dingo::driver::compile_source;

/// Integration tests for the complete pipeline: preprocess -> parse -> plugin
/// pipeline -> print, exercised through `compile_source` end to end.

#[test]
fn compiles_plain_go_through_untouched() {
    let src = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n";
    let out = compile_source("main.dingo", src, &Config::default()).expect("compiles");
    assert!(out.go_source.contains("package main"));
    assert!(out.go_source.contains("fmt.Println(\"hi\")"));
    assert!(out.errors.is_empty());
}

#[test]
fn error_propagation_hoists_try_and_injects_result_helpers() {
    let src = "package main\n\nfunc parse(s string) Result[int, error] {\n\treturn Ok(1)\n}\n\nfunc run(s string) Result[int, error] {\n\tn := parse(s)?\n\treturn Ok(n * 2)\n}\n";
    let out = compile_source("main.dingo", src, &Config::default()).expect("compiles");
    assert!(out.go_source.contains("type Result_int_error struct"));
    assert!(out.go_source.contains("if err != nil"));
    assert!(out.go_source.contains("return Result_int_error_Err(err)"));
    assert!(out.errors.is_empty());
}

#[test]
fn error_propagation_in_nested_call_argument() {
    let src = "package main\n\nfunc read() Result[string, error] {\n\treturn Ok(\"x\")\n}\n\nfunc upper(s string) string {\n\treturn s\n}\n\nfunc run() Result[string, error] {\n\treturn Ok(upper(read()?))\n}\n";
    let out = compile_source("main.dingo", src, &Config::default()).expect("compiles");
    assert!(out.go_source.contains("__dg_tmp_0"));
    assert!(out.go_source.contains("upper(__dg_tmp_0)"));
}

#[test]
fn user_enum_realizes_tag_struct_and_constructors() {
    let src = "package main\n\nenum Shape {\n\tCircle(radius float64),\n\tSquare(side float64),\n}\n\nfunc main() {\n}\n";
    let out = compile_source("main.dingo", src, &Config::default()).expect("compiles");
    assert!(out.go_source.contains("type ShapeTag int"));
    assert!(out.go_source.contains("func ShapeCircle(radius float64) Shape"));
    assert!(out.go_source.contains("func ShapeSquare(side float64) Shape"));
}

#[test]
fn pattern_match_on_user_enum_lowers_to_switch() {
    let src = concat!(
        "package main\n\n",
        "enum Shape {\n\tCircle(radius float64),\n\tSquare(side float64),\n}\n\n",
        "func area(s Shape) float64 {\n",
        "\tmatch s {\n",
        "\t\tCircle(radius) => return radius * radius * 3,\n",
        "\t\tSquare(side) => return side * side,\n",
        "\t}\n",
        "}\n",
    );
    let out = compile_source("main.dingo", src, &Config::default()).expect("compiles");
    assert!(out.go_source.contains("switch"));
    assert!(out.go_source.contains("ShapeTagCircle"));
    assert!(out.go_source.contains("ShapeTagSquare"));
}

#[test]
fn swift_match_syntax_is_accepted_when_configured() {
    let mut config = Config::default();
    config.match_config.syntax = MatchSyntax::Swift;
    let src = concat!(
        "package main\n\n",
        "enum Shape {\n\tCircle(radius float64),\n\tSquare(side float64),\n}\n\n",
        "func area(s Shape) float64 {\n",
        "\tmatch s {\n",
        "\t\tCircle(radius): return radius * radius * 3,\n",
        "\t\tSquare(side): return side * side,\n",
        "\t}\n",
        "}\n",
    );
    let out = compile_source("main.dingo", src, &config).expect("compiles");
    assert!(out.go_source.contains("switch"));
}

#[test]
fn lambda_with_inferable_signature_lowers_to_func_literal() {
    let src = "package main\n\nfunc apply(f func(int) int, x int) int {\n\treturn f(x)\n}\n\nfunc run() int {\n\treturn apply(|x| x * 2, 3)\n}\n";
    let out = compile_source("main.dingo", src, &Config::default()).expect("compiles");
    assert!(out.go_source.contains("func(x int) int"));
    assert!(out.errors.is_empty());
}

#[test]
fn parse_error_reports_original_position() {
    let src = "package main\n\nfunc f( {\n";
    let result = compile_source("main.dingo", src, &Config::default());
    assert!(result.is_err());
}

#[test]
fn sourcemap_document_carries_original_source() {
    let src = "package main\n\nfunc main() {}\n";
    let out = compile_source("main.dingo", src, &Config::default()).expect("compiles");
    assert_eq!(out.sourcemap.file, "main.dingo");
    assert_eq!(out.sourcemap.source, src);
}
