use pretty_assertions::assert_eq;

use gullian_types::Context;

use crate::emit;

fn compile(source: &str) -> String {
    let mut ctx = Context::new();
    let module = ctx.add_module("main");
    let tokens = gullian_lexer::lex(source, "main").expect("lexes");
    let items = gullian_parse::parse(tokens, "main").expect("parses");
    gullian_typeck::check_module(&mut ctx, module, items).expect("checks");
    emit(&ctx, module)
}

#[test]
fn hello_world_emits_main_and_the_call() {
    let c = compile("extern fun puts(s: str): int\nfun main(): int { puts(\"hi\") return 0 }");
    assert!(c.contains("int main("), "missing main in:\n{c}");
    assert!(c.contains("puts(\"hi\");"), "missing call in:\n{c}");
    assert!(c.contains("// extern: fun puts"), "missing extern comment in:\n{c}");
    assert!(c.contains("#include <stdio.h>"));
    assert!(c.contains("#define str char*"));
}

#[test]
fn struct_definition_and_field_access() {
    let c = compile(
        "struct Point { x: int, y: int }\nfun main(): int { let p = Point{1, 2} return p.x }",
    );
    assert!(c.contains("struct Point{int x; int y; };"), "bad def in:\n{c}");
    assert!(c.contains("struct Point p = (struct Point){1, 2};"), "bad literal in:\n{c}");
    assert!(c.contains("return p.x;"), "bad access in:\n{c}");
}

#[test]
fn monomorphization_emits_exactly_one_instance() {
    let c = compile(
        "struct Box[T] { v: T }\n\
         fun id[T](b: Box[T]): T { return b.v }\n\
         fun main(): int { return id(Box[int]{7}) + id(Box[int]{8}) }",
    );
    // One specialized struct definition.
    assert_eq!(
        c.matches("_S_Box_int{int v; };").count(),
        1,
        "expected a single Box[int] definition in:\n{c}"
    );
    // One prototype and one body for the specialized function.
    assert_eq!(
        c.matches("_S_id_int(").count(),
        4,
        "expected prototype, body and two calls of id[int] in:\n{c}"
    );
    assert!(c.contains("int I_"), "specialized function is uid-mangled:\n{c}");
    // The generic definitions themselves are not emitted.
    assert!(!c.contains("struct Box{"), "generic struct leaked into:\n{c}");
}

#[test]
fn union_defs_guards_and_literals() {
    let c = compile(
        "union Opt[T] { some: T, none: int }\n\
         fun main(): int { let o = Opt[int]{some: 3} if o.some? { return o.some } return 0 }",
    );
    assert!(c.contains("enum I_"), "missing companion enum in:\n{c}");
    assert!(c.contains("_FIELDS"), "missing companion enum in:\n{c}");
    assert!(c.contains("int tag; union {"), "missing tagged layout in:\n{c}");
    assert!(c.contains(".tag == "), "missing guard test in:\n{c}");
    assert!(c.contains("__some"), "missing variant tag in:\n{c}");
    assert!(c.contains("{.some=3}"), "missing payload initializer in:\n{c}");
    assert!(c.contains("return o.some;"), "missing payload read in:\n{c}");
}

#[test]
fn implicit_inference_emits_the_specialization() {
    let c = compile("fun twice[T](x: T): T { return x }\nfun main(): int { return twice(5) }");
    assert!(c.contains("_S_twice_int("), "missing specialization in:\n{c}");
    assert!(c.contains("twice") && c.contains("I_"), "bad mangle in:\n{c}");
}

#[test]
fn emission_is_idempotent() {
    let mut ctx = Context::new();
    let module = ctx.add_module("main");
    let source = "struct Point { x: int, y: int }\n\
                  fun main(): int { let p = Point{1, 2} return p.x }";
    let tokens = gullian_lexer::lex(source, "main").expect("lexes");
    let items = gullian_parse::parse(tokens, "main").expect("parses");
    gullian_typeck::check_module(&mut ctx, module, items).expect("checks");

    let first = emit(&ctx, module);
    let second = emit(&ctx, module);
    assert_eq!(first, second);
}

#[test]
fn switch_lifts_into_a_result_variable() {
    let c = compile("fun main(): int { let x = 2 return switch x { 1: 10, 2: 20, _: 0 } }");
    assert!(c.contains("int __switch_0;"), "missing lifted variable in:\n{c}");
    assert!(c.contains("switch (x) {"), "missing switch in:\n{c}");
    assert!(c.contains("case 1:"), "missing case in:\n{c}");
    assert!(c.contains("default:"), "missing default in:\n{c}");
    assert!(c.contains("return __switch_0;"), "missing lifted return in:\n{c}");
}

#[test]
fn enums_are_typedefs_with_prefixed_variants() {
    let c = compile(
        "enum Color { red, green, blue }\n\
         fun main(): int { let c = Color.red return 0 }",
    );
    assert!(
        c.contains("typedef enum { Color__red, Color__green, Color__blue } Color;"),
        "bad enum def in:\n{c}"
    );
    assert!(c.contains("Color c = Color__red;"), "bad variant access in:\n{c}");
}

#[test]
fn methods_mangle_with_their_owner() {
    let c = compile(
        "struct Counter { n: int }\n\
         fun Counter.get(self: Counter): int { return self.n }\n\
         fun main(): int { let c = Counter{3} return c.get() }",
    );
    assert!(c.contains("int A_Counter_get(struct Counter self)"), "bad method head in:\n{c}");
    assert!(c.contains("A_Counter_get(c)"), "bad call in:\n{c}");
}

#[test]
fn pointer_receivers_autoref_and_arrow() {
    let c = compile(
        "struct Counter { n: int }\n\
         fun Counter.get(self: &Counter): int { return self.n }\n\
         fun main(): int { let c = Counter{3} return c.get() }",
    );
    assert!(c.contains("int A_Counter_get(struct Counter* self)"), "bad head in:\n{c}");
    assert!(c.contains("A_Counter_get(&c)"), "missing autoref in:\n{c}");
    assert!(c.contains("return self->n;"), "missing arrow access in:\n{c}");
}

#[test]
fn for_loops_emit_the_lowered_while() {
    let c = compile(
        "union Step { ok: int, done: int }\n\
         struct Range { n: int }\n\
         fun Range.next(self: &Range): Step { return Step{ok: 1} }\n\
         fun main(): int { let r = Range{0} let total = 0 for x in r { total = total + x.ok } return total }",
    );
    assert!(c.contains("while ("), "missing lowered while in:\n{c}");
    assert!(c.contains("iter_"), "missing synthesized iterator binding in:\n{c}");
    assert!(c.contains(".tag == "), "missing ok guard in:\n{c}");
    assert!(c.contains("x = "), "missing loop advance in:\n{c}");
}

#[test]
fn types_as_values_emit_sizeof() {
    let c = compile("fun main(): int { let width = int return 0 }");
    assert!(c.contains("type width = sizeof(int);"), "missing sizeof in:\n{c}");
}

#[test]
fn harvested_includes_come_first() {
    let c = compile("#include <math.h>\nfun main(): int { return 0 }");
    let math = c.find("#include <math.h>").expect("harvested include");
    let stdio = c.find("#include <stdio.h>").expect("preamble include");
    assert!(math < stdio, "harvested include should precede the preamble:\n{c}");
}

#[test]
fn globals_are_emitted_before_bodies() {
    let c = compile("let answer = 42\nfun main(): int { return answer }");
    assert!(c.contains("int answer = 42;"), "missing global in:\n{c}");
    let global = c.find("int answer = 42;").expect("global");
    let body = c.find("int main() {").expect("main body");
    assert!(global < body);
}

#[test]
fn word_operators_map_to_c() {
    let c = compile("fun main(): int { if not (1 == 2) and true { return 1 } return 0 }");
    assert!(c.contains("!("), "missing ! in:\n{c}");
    assert!(c.contains("&&"), "missing && in:\n{c}");
}
