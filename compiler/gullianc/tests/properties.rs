//! Property tests over the whole pipeline.

use proptest::prelude::*;

use gullianc::compile_source;

/// Names that cannot be used as fresh identifiers in generated programs.
fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "extern"
            | "import"
            | "struct"
            | "enum"
            | "union"
            | "let"
            | "fun"
            | "return"
            | "while"
            | "for"
            | "in"
            | "break"
            | "continue"
            | "switch"
            | "if"
            | "else"
            | "elif"
            | "comptime"
            | "not"
            | "and"
            | "or"
            | "true"
            | "false"
            | "type"
            | "module"
            | "void"
            | "bool"
            | "int"
            | "u8"
            | "u16"
            | "u32"
            | "float"
            | "str"
            | "byte"
            | "char"
            | "ptr"
            | "function"
            | "any"
            | "main"
    )
}

fn identifier() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,12}")
        .expect("valid regex")
        .prop_filter("not reserved", |name| !is_reserved(name))
}

proptest! {
    /// Integer literals survive the trip from source to C text.
    #[test]
    fn int_literals_roundtrip(value in 0i64..1_000_000_000) {
        let source = format!("fun main(): int {{ return {value} }}");
        let c = compile_source(&source, None).expect("compiles");
        let needle = format!("return {};", value);
        prop_assert!(c.contains(&needle));
    }

    /// Plain string literals come out of the emitter quoted, verbatim.
    #[test]
    fn str_literals_roundtrip(text in "[a-zA-Z0-9 ,.!]{0,24}") {
        let source = format!(
            "extern fun puts(s: str): int\nfun main(): int {{ puts(\"{text}\") return 0 }}"
        );
        let c = compile_source(&source, None).expect("compiles");
        let needle = format!("puts(\"{}\");", text);
        prop_assert!(c.contains(&needle));
    }

    /// Bool literals emit as C99 `true`/`false`.
    #[test]
    fn bool_literals_roundtrip(value in any::<bool>()) {
        let source = format!("fun flag(): bool {{ return {value} }}\nfun main(): int {{ return 0 }}");
        let c = compile_source(&source, None).expect("compiles");
        let needle = format!("return {};", value);
        prop_assert!(c.contains(&needle));
    }

    /// Declared variables keep their names and initializers.
    #[test]
    fn let_bindings_roundtrip(name in identifier(), value in 0i64..100_000) {
        let source = format!("fun main(): int {{ let {name} = {value} return {name} }}");
        let c = compile_source(&source, None).expect("compiles");
        let decl_needle = format!("int {} = {};", name, value);
        let ret_needle = format!("return {};", name);
        prop_assert!(c.contains(&decl_needle));
        prop_assert!(c.contains(&ret_needle));
    }

    /// Emission is a pure function of the checked module tree.
    #[test]
    fn emission_is_deterministic(value in 0i64..1_000_000) {
        let source = format!(
            "struct Pair {{ a: int, b: int }}\n\
             fun main(): int {{ let p = Pair{{{value}, 2}} return p.a }}"
        );
        let first = compile_source(&source, None).expect("compiles");
        let second = compile_source(&source, None).expect("compiles");
        prop_assert_eq!(first, second);
    }
}
