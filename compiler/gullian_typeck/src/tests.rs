use pretty_assertions::assert_eq;

use gullian_diagnostic::{Diagnostic, ErrorKind};
use gullian_types::{Context, ModuleId, TypeId};

use crate::check_module;

fn try_check(source: &str) -> Result<(Context, ModuleId), Diagnostic> {
    let mut ctx = Context::new();
    let module = ctx.add_module("main");
    let tokens = gullian_lexer::lex(source, "main")?;
    let items = gullian_parse::parse(tokens, "main")?;
    check_module(&mut ctx, module, items)?;
    Ok((ctx, module))
}

fn check(source: &str) -> (Context, ModuleId) {
    try_check(source).expect("checks")
}

fn check_err(source: &str) -> Diagnostic {
    try_check(source).expect_err("rejects")
}

#[test]
fn hello_world_checks() {
    let (ctx, module) = check(
        "extern fun puts(s: str): int\nfun main(): int { puts(\"hi\") return 0 }",
    );
    let main = ctx.module(module).functions.keys().any(|n| *n == "main");
    assert!(main);
}

#[test]
fn struct_fields_resolve_eagerly() {
    let (ctx, module) = check(
        "struct Point { x: int, y: int }\nfun main(): int { let p = Point{1, 2} return p.x }",
    );
    let point = ctx.module(module).types.values().next().expect("type");
    let decl = ctx.pool.get(*point).decl.as_ref().expect("decl");
    let fields = decl.fields().expect("fields");
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].1.resolved(), Some(TypeId::INT));
}

#[test]
fn unknown_field_is_a_name_error() {
    let err = check_err(
        "struct Point { x: int, y: int }\nfun main(): int { let p = Point{1, 2} return p.z }",
    );
    assert_eq!(err.kind, ErrorKind::Name);
    assert!(err.message.contains("does not contain a member called z"));
    assert_eq!(err.module, "main");
}

#[test]
fn struct_literal_arity_is_enforced() {
    let err =
        check_err("struct Point { x: int, y: int }\nfun main(): int { let p = Point{1} return 0 }");
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("too few arguments for struct literal"));
}

#[test]
fn generic_struct_monomorphizes_once() {
    let (ctx, module) = check(
        "struct Box[T] { v: T }\n\
         fun id[T](b: Box[T]): T { return b.v }\n\
         fun main(): int { return id(Box[int]{7}) + id(Box[int]{8}) }",
    );
    // Two uses of Box[int] share one instantiation; two inferred calls of
    // id share one specialization.
    assert_eq!(ctx.module(module).type_specs.len(), 1);
    assert!(ctx.module(module).type_specs.contains_key("Box[int]"));
    assert_eq!(ctx.module(module).fn_specs.len(), 1);
    assert!(ctx.module(module).fn_specs.contains_key("id[int]"));
}

#[test]
fn explicit_generic_arguments_also_memoize() {
    let (ctx, module) = check(
        "fun twice[T](x: T): T { return x }\n\
         fun main(): int { return twice[int](5) + twice(6) }",
    );
    assert_eq!(ctx.module(module).fn_specs.len(), 1);
    assert!(ctx.module(module).fn_specs.contains_key("twice[int]"));
}

#[test]
fn implicit_inference_binds_from_arguments() {
    let (ctx, module) = check(
        "fun twice[T](x: T): T { return x }\nfun main(): int { return twice(5) }",
    );
    assert!(ctx.module(module).fn_specs.contains_key("twice[int]"));
}

#[test]
fn uninferable_generics_are_rejected() {
    let err = check_err(
        "fun make[T](): int { return 0 }\nfun main(): int { return make() }",
    );
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("you must specify its type parameters"));
}

#[test]
fn union_reads_require_a_guard() {
    let guarded = "union Opt[T] { some: T, none: int }\n\
                   fun main(): int { let o = Opt[int]{some: 3} if o.some? { return o.some } return 0 }";
    check(guarded);

    let unguarded = "union Opt[T] { some: T, none: int }\n\
                     fun main(): int { let o = Opt[int]{some: 3} return o.some }";
    let err = check_err(unguarded);
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("possibly uninitialized variant"));
}

#[test]
fn guards_do_not_leak_into_the_else_arm() {
    let err = "union Opt[T] { some: T, none: int }\n\
               fun main(): int { let o = Opt[int]{some: 3} if o.some? { return o.some } else { return o.some } }";
    let err = check_err(err);
    assert!(err.message.contains("possibly uninitialized variant"));
}

#[test]
fn guards_do_not_survive_the_if() {
    let source = "union Opt[T] { some: T, none: int }\n\
                  fun main(): int { let o = Opt[int]{some: 3} if o.some? { return o.some } return o.some }";
    let err = check_err(source);
    assert!(err.message.contains("possibly uninitialized variant"));
}

#[test]
fn associated_functions_become_methods() {
    let (ctx, module) = check(
        "struct Counter { n: int }\n\
         fun Counter.get(self: Counter): int { return self.n }\n\
         fun main(): int { let c = Counter{3} return c.get() }",
    );
    let counter = *ctx.module(module).types.values().next().expect("type");
    assert!(ctx
        .pool
        .get(counter)
        .assoc
        .keys()
        .any(|name| *name == "get"));
}

#[test]
fn pointer_self_autorefs() {
    check(
        "struct Counter { n: int }\n\
         fun Counter.bump(self: &Counter): int { return 0 }\n\
         fun main(): int { let c = Counter{3} return c.bump() }",
    );
}

#[test]
fn enum_variants_resolve() {
    check(
        "enum Color { red, green, blue }\n\
         fun main(): int { let c = Color.red return 0 }",
    );
}

#[test]
fn return_type_mismatch_is_rejected() {
    let err = check_err("fun main(): int { return \"hello there\" }");
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("incompatible types for return"));
}

#[test]
fn assignment_respects_declared_types() {
    let err = check_err("fun main(): int { let x = 1 x = \"not an int\" return x }");
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn char_literals_coerce_against_int() {
    check("fun first(s: str): int { if s[0] == 'a' { return 1 } return 0 }");
}

#[test]
fn subscript_indexing_types() {
    // str indexes to char, ptr[T] indexes to T.
    check(
        "fun get(s: str, p: &int): int { let c = s[0] let n = p[1] return n }",
    );
    let err = check_err("fun get(s: str): int { return s[\"zero\"] }");
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("must provide an 'int'"));
}

#[test]
fn switch_takes_default_branch_type() {
    check(
        "fun main(): int { let x = 2 return switch x { 1: 10, 2: 20, _: 0 } }",
    );
}

#[test]
fn for_loops_lower_onto_the_iterator_protocol() {
    check(
        "union Opt { ok: int, done: int }\n\
         struct Range { n: int }\n\
         fun Range.next(self: &Range): Opt { return Opt{ok: 1} }\n\
         fun main(): int { let r = Range{0} let total = 0 for x in r { total = total + x.ok } return total }",
    );
}

#[test]
fn for_over_non_iterable_is_rejected() {
    let err = check_err("fun main(): int { for x in 5 { } return 0 }");
    assert_eq!(err.kind, ErrorKind::Name);
    assert!(err.message.contains("not iterable"));
}

#[test]
fn comptime_splices_a_constant() {
    check(
        "fun two(): int { return 2 }\n\
         fun main(): int { return comptime two() }",
    );
}

#[test]
fn scope_is_restored_after_checking() {
    let (ctx, module) = check("fun main(): int { let x = 1 return x }");
    assert!(ctx.module(module).scope.variables.is_empty());
    assert!(ctx.module(module).scope.type_guards.is_empty());
}

#[test]
fn scope_is_restored_after_a_failed_check() {
    let mut ctx = Context::new();
    let module = ctx.add_module("main");
    let source = "fun main(): int { let x = 1 let y = z return x }";
    let tokens = gullian_lexer::lex(source, "main").expect("lexes");
    let items = gullian_parse::parse(tokens, "main").expect("parses");
    let err = check_module(&mut ctx, module, items).expect_err("rejects");
    assert_eq!(err.kind, ErrorKind::Name);
    // The failed function body did not leak bindings into the module
    // scope.
    assert!(ctx.module(module).scope.variables.is_empty());
}

#[test]
fn unknown_type_is_a_name_error() {
    let err = check_err("fun main(): Missing { return 0 }");
    assert_eq!(err.kind, ErrorKind::Name);
    assert!(err.message.contains("is not a type of module main"));
}

#[test]
fn extern_with_owner_is_rejected() {
    let err = check_err("extern fun int.foo(self: int): int");
    assert_eq!(err.kind, ErrorKind::Name);
    assert!(err.message.contains("flat names"));
}

#[test]
fn call_arity_is_enforced() {
    let err = check_err(
        "extern fun puts(s: str): int\nfun main(): int { puts(\"a\", \"b\") return 0 }",
    );
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("too many arguments"));
}

#[test]
fn missing_import_is_an_import_error() {
    let err = check_err("import definitely.missing\nfun main(): int { return 0 }");
    assert_eq!(err.kind, ErrorKind::Import);
    assert!(err.message.contains("file not found"));
}

#[test]
fn includes_are_harvested_from_comments() {
    let (ctx, module) = check("#include <math.h>\nfun main(): int { return 0 }");
    assert_eq!(ctx.module(module).includes, vec!["#include <math.h>".to_string()]);
}

#[test]
fn top_level_lets_become_globals() {
    let (ctx, module) = check("let answer = 42\nfun main(): int { return answer }");
    assert_eq!(ctx.module(module).globals.len(), 1);
    assert_eq!(ctx.module(module).globals[0].1, TypeId::INT);
}
