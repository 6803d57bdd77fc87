//! End-to-end scenarios: source text in, C text out.

use gullianc::compile_source;

#[test]
fn hello_world() {
    let c = compile_source(
        "extern fun puts(s: str): int\nfun main(): int { puts(\"hi\") return 0 }",
        None,
    )
    .expect("compiles");
    assert!(c.contains("int main("), "missing main in:\n{c}");
    assert!(c.contains("puts(\"hi\");"), "missing call in:\n{c}");
}

#[test]
fn struct_roundtrip() {
    let c = compile_source(
        "struct Point { x: int, y: int }\nfun main(): int { let p = Point{1, 2} return p.x }",
        None,
    )
    .expect("compiles");
    assert!(c.contains("struct Point{int x; int y; };"), "bad def in:\n{c}");
    assert!(c.contains("p.x"), "missing access in:\n{c}");
}

#[test]
fn generic_monomorphization() {
    let c = compile_source(
        "struct Box[T] { v: T }\n\
         fun id[T](b: Box[T]): T { return b.v }\n\
         fun main(): int { return id(Box[int]{7}) }",
        None,
    )
    .expect("compiles");
    assert_eq!(c.matches("_S_Box_int{int v; };").count(), 1, "in:\n{c}");
    assert!(c.contains("_S_id_int("), "missing specialization in:\n{c}");
}

#[test]
fn union_variant_guard() {
    let guarded = "union Opt[T] { some: T, none: int }\n\
                   fun main(): int { let o = Opt[int]{some: 3} if o.some? { return o.some } return 0 }";
    compile_source(guarded, None).expect("guarded read compiles");

    let unguarded = "union Opt[T] { some: T, none: int }\n\
                     fun main(): int { let o = Opt[int]{some: 3} return o.some }";
    let err = compile_source(unguarded, None).expect_err("unguarded read is rejected");
    assert!(
        err.message.contains("possibly uninitialized variant"),
        "unexpected message: {err}"
    );
}

#[test]
fn implicit_generic_inference() {
    let c = compile_source(
        "fun twice[T](x: T): T { return x }\nfun main(): int { return twice(5) }",
        None,
    )
    .expect("compiles");
    assert!(c.contains("_S_twice_int("), "missing inferred specialization in:\n{c}");
}

#[test]
fn imports_compile_into_one_unit() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("util.gullian"),
        "fun three(): int { return 3 }",
    )
    .expect("write util");

    let c = compile_source(
        "import util\nfun main(): int { return util.three() }",
        Some(dir.path().to_path_buf()),
    )
    .expect("compiles");
    assert!(c.contains("int three()"), "missing imported function in:\n{c}");
    assert!(c.contains("three()"), "missing call in:\n{c}");

    // The imported function's definition precedes main's.
    let three = c.find("int three() {").expect("three body");
    let main = c.find("int main() {").expect("main body");
    assert!(three < main, "imports emit before the root module:\n{c}");
}

#[test]
fn import_cycles_terminate() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("a.gullian"),
        "import b\nfun from_a(): int { return 1 }",
    )
    .expect("write a");
    std::fs::write(
        dir.path().join("b.gullian"),
        "import a\nfun from_b(): int { return 2 }",
    )
    .expect("write b");

    // The root imports a, a imports b, b imports a again: the second
    // import resolves to the in-progress module and compilation
    // terminates.
    let c = compile_source(
        "import a\nfun main(): int { return 0 }",
        Some(dir.path().to_path_buf()),
    )
    .expect("cycle terminates");
    assert!(c.contains("int main("), "missing main in:\n{c}");
}

#[test]
fn missing_import_names_the_hint() {
    let err = compile_source("import nowhere\nfun main(): int { return 0 }", None)
        .expect_err("missing file");
    assert!(err.message.contains("file not found"), "unexpected: {err}");
}

#[test]
fn diagnostics_carry_line_and_module() {
    let err = compile_source("fun main(): int { return missing_var }", None)
        .expect_err("unknown name");
    assert_eq!(
        err.to_string(),
        "name error: variable missing_var not found in current scope. at line 1. in module main"
    );
}
