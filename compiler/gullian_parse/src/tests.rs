use pretty_assertions::assert_eq;

use gullian_ir::ast::{
    BinaryOp, ElseArm, Expr, Item, Stmt, StructArg, SwitchPattern, TypeExpr, UnaryOp,
};
use gullian_ir::Literal;

use crate::parse;

fn parse_source(source: &str) -> Vec<Item> {
    let tokens = gullian_lexer::lex(source, "test").expect("lexes");
    parse(tokens, "test").expect("parses")
}

fn parse_err(source: &str) -> gullian_diagnostic::Diagnostic {
    let tokens = gullian_lexer::lex(source, "test").expect("lexes");
    parse(tokens, "test").expect_err("rejects")
}

#[test]
fn parses_extern_and_function() {
    let items = parse_source(
        "extern fun puts(s: str): int\nfun main(): int { puts(\"hi\") return 0 }",
    );
    assert_eq!(items.len(), 2);

    let Item::Extern(sig) = &items[0] else {
        panic!("expected extern, got {:?}", items[0]);
    };
    assert_eq!(sig.name.name, "puts");
    assert!(sig.name.owner.is_none());
    assert_eq!(sig.params.len(), 1);

    let Item::Function(function) = &items[1] else {
        panic!("expected function, got {:?}", items[1]);
    };
    assert_eq!(function.sig.name.name, "main");
    assert_eq!(function.body.stmts.len(), 2);
}

#[test]
fn parses_struct_with_generics() {
    let items = parse_source("struct Box[T] { v: T }");
    let Item::Struct(item) = &items[0] else {
        panic!("expected struct");
    };
    assert_eq!(item.name, "Box");
    assert_eq!(item.generics.len(), 1);
    assert_eq!(item.fields[0].0, "v");
    assert_eq!(item.fields[0].1, TypeExpr::Name(gullian_ir::Name::new("T", 1)));
}

#[test]
fn parses_union_and_enum() {
    let items = parse_source("union Opt[T] { some: T, none: int }\nenum Color { red, green }");
    assert!(matches!(&items[0], Item::Union(u) if u.fields.len() == 2));
    assert!(matches!(&items[1], Item::Enum(e) if e.variants.len() == 2));
}

#[test]
fn parses_associated_generic_function() {
    let items = parse_source("fun List.push[T](self: &List[T], v: T): void { return 0 }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    assert_eq!(function.sig.name.owner.as_ref().unwrap(), &"List");
    assert_eq!(function.sig.name.name, "push");
    assert_eq!(function.sig.name.generics.len(), 1);
    assert!(matches!(function.sig.params[0].1, TypeExpr::Pointer(_)));
}

#[test]
fn call_with_explicit_generics() {
    let items = parse_source("fun main(): int { return id[int](x) }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    let Stmt::Return { value, .. } = &function.body.stmts[0] else {
        panic!("expected return");
    };
    let Expr::Call(call) = value else {
        panic!("expected call, got {value:?}");
    };
    assert_eq!(call.generics.len(), 1);
    assert!(matches!(&*call.callee, Expr::Name(name) if *name == "id"));
}

#[test]
fn struct_literal_positional_and_named() {
    let items = parse_source("fun main(): int { let p = Point{1, 2} let o = Opt[int]{some: 3} }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };

    let Stmt::Let(p) = &function.body.stmts[0] else {
        panic!("expected let");
    };
    let Expr::StructLiteral(literal) = &p.value else {
        panic!("expected struct literal");
    };
    assert_eq!(literal.args.len(), 2);
    assert!(matches!(literal.args[0], StructArg::Positional(_)));

    let Stmt::Let(o) = &function.body.stmts[1] else {
        panic!("expected let");
    };
    let Expr::StructLiteral(literal) = &o.value else {
        panic!("expected struct literal");
    };
    assert!(matches!(&literal.name, TypeExpr::Apply { .. }));
    assert!(matches!(&literal.args[0], StructArg::Named(name, _) if *name == "some"));
}

#[test]
fn if_head_stops_at_brace() {
    let items = parse_source("fun main(): int { if o.some? { return o.some } return 0 }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    let Stmt::If(if_) = &function.body.stmts[0] else {
        panic!("expected if, got {:?}", function.body.stmts[0]);
    };
    let Expr::TestGuard(inner) = &if_.cond else {
        panic!("expected test guard, got {:?}", if_.cond);
    };
    assert!(matches!(&**inner, Expr::Attribute { .. }));
    assert!(if_.else_body.is_none());
}

#[test]
fn elif_chains_nest() {
    let items =
        parse_source("fun main(): int { if a { return 1 } elif b { return 2 } else { return 3 } }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    let Stmt::If(if_) = &function.body.stmts[0] else {
        panic!("expected if");
    };
    let Some(ElseArm::Elif(elif)) = &if_.else_body else {
        panic!("expected elif arm");
    };
    assert!(matches!(elif.else_body, Some(ElseArm::Else(_))));
}

#[test]
fn binary_chain_is_right_leaning() {
    let items = parse_source("fun main(): int { return 1 + 2 * 3 }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    let Stmt::Return { value, .. } = &function.body.stmts[0] else {
        panic!("expected return");
    };
    let Expr::Binary { op, right, .. } = value else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(&**right, Expr::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn word_operators() {
    let items = parse_source("fun main(): int { if not a and b { return 1 } return 0 }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    let Stmt::If(if_) = &function.body.stmts[0] else {
        panic!("expected if");
    };
    // `not` binds the whole chain: not (a and b).
    let Expr::Unary { op, operand, .. } = &if_.cond else {
        panic!("expected unary, got {:?}", if_.cond);
    };
    assert_eq!(*op, UnaryOp::WordNot);
    assert!(matches!(&**operand, Expr::Binary { op: BinaryOp::And, .. }));
}

#[test]
fn switch_with_default() {
    let items =
        parse_source("fun main(): int { return switch x { 1: 10, 2: 20, _: 0 } }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    let Stmt::Return { value, .. } = &function.body.stmts[0] else {
        panic!("expected return");
    };
    let Expr::Switch(switch) = value else {
        panic!("expected switch, got {value:?}");
    };
    assert_eq!(switch.branches.len(), 3);
    assert!(matches!(switch.branches[2].pattern, SwitchPattern::Default));
}

#[test]
fn for_loop() {
    let items = parse_source("fun main(): int { for x in range(10) { puts(\"a\") } return 0 }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    let Stmt::For(for_) = &function.body.stmts[0] else {
        panic!("expected for");
    };
    assert_eq!(for_.target, "x");
    assert!(matches!(&for_.iter, Expr::Call(_)));
}

#[test]
fn compound_assignment() {
    let items = parse_source("fun main(): int { x += 1 p.y = 2 a[0] = 3 return 0 }");
    let Item::Function(function) = &items[0] else {
        panic!("expected function");
    };
    assert!(matches!(
        &function.body.stmts[0],
        Stmt::Assign { op: gullian_ir::ast::AssignOp::Add, .. }
    ));
    assert!(matches!(
        &function.body.stmts[1],
        Stmt::Assign { target: Expr::Attribute { .. }, .. }
    ));
    assert!(matches!(
        &function.body.stmts[2],
        Stmt::Assign { target: Expr::Subscript { .. }, .. }
    ));
}

#[test]
fn import_paths() {
    let items = parse_source("import std.vec");
    let Item::Import(import) = &items[0] else {
        panic!("expected import");
    };
    assert_eq!(import.dotted(), "std.vec");
    assert_eq!(import.last(), &"vec");
}

#[test]
fn comments_survive_at_top_level() {
    let items = parse_source("#include <math.h>\nfun main(): int { return 0 }");
    assert!(matches!(&items[0], Item::Comment { text, .. } if text == "include <math.h>"));
}

#[test]
fn empty_parens_are_rejected() {
    let err = parse_err("fun main(): int { let x = () }");
    assert_eq!(err.kind, gullian_diagnostic::ErrorKind::Syntax);
    assert!(err.message.contains("empty parenthesized expression"));
}

#[test]
fn missing_colon_in_params_is_rejected() {
    let err = parse_err("fun main(a int): int { return 0 }");
    assert_eq!(err.kind, gullian_diagnostic::ErrorKind::Syntax);
}

#[test]
fn literal_int_literal_value() {
    let items = parse_source("let x = 42");
    let Item::Let(decl) = &items[0] else {
        panic!("expected let");
    };
    assert_eq!(
        decl.value,
        Expr::Literal {
            value: Literal::Int(42),
            line: 1
        }
    );
}
