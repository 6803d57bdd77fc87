//! Expression emission. Builders return the C text of the expression;
//! switch expressions write their lifted statement form into the output
//! first and return the synthetic result variable.

use gullian_ir::ast::UnaryOp;
use gullian_ir::Literal;
use gullian_types::typed::{TypedExpr, TypedExprKind, TypedSwitch};
use gullian_types::TypeId;

use crate::CGen;

impl<'ctx> CGen<'ctx> {
    pub(crate) fn emit_expr(&mut self, expr: &TypedExpr) -> String {
        match &expr.kind {
            TypedExprKind::Literal(value) => emit_literal(value),
            TypedExprKind::Var(name) => name.text().to_string(),
            TypedExprKind::TypeValue(ty) => format!("sizeof({})", self.c_type(*ty)),
            TypedExprKind::FuncRef(func) => self.mangle_fn(*func),
            TypedExprKind::Field {
                object,
                field,
                through_ptr,
            } => {
                let object_text = self.emit_operand(object);
                let sep = if *through_ptr { "->" } else { "." };
                format!("{object_text}{sep}{field}")
            }
            TypedExprKind::EnumVariant { enum_ty, variant } => {
                format!("{}__{variant}", self.mangle_type(*enum_ty))
            }
            TypedExprKind::TestGuard {
                object,
                union_ty,
                variant,
            } => {
                let object_text = self.emit_operand(object);
                let sep = if self.ctx.pool.pointee(object.ty).is_some() {
                    "->"
                } else {
                    "."
                };
                format!(
                    "{object_text}{sep}tag == {}__{variant}",
                    self.mangle_type(*union_ty)
                )
            }
            TypedExprKind::Call { func, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.emit_expr(arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({args})", self.mangle_fn(*func))
            }
            TypedExprKind::Index { head, index } => {
                let head_text = self.emit_operand(head);
                let index_text = self.emit_expr(index);
                format!("{head_text}[{index_text}]")
            }
            TypedExprKind::Unary { op, operand } => {
                let operand_text = self.emit_operand(operand);
                format!("{}{operand_text}", op.c_lexeme())
            }
            TypedExprKind::Binary { left, op, right } => {
                let left_text = self.emit_operand(left);
                let right_text = self.emit_operand(right);
                format!("{left_text} {} {right_text}", op.c_lexeme())
            }
            TypedExprKind::StructLiteral { ty, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.emit_expr(arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({}){{{args}}}", self.c_type(*ty))
            }
            TypedExprKind::UnionLiteral {
                ty,
                variant,
                variant_index,
                value,
            } => {
                let value_text = self.emit_expr(value);
                format!(
                    "({}){{ {variant_index}, {{.{variant}={value_text}}} }}",
                    self.c_type(*ty)
                )
            }
            TypedExprKind::Switch(switch) => self.emit_switch_value(switch, expr.ty),
        }
    }

    /// Like `emit_expr`, parenthesizing operator chains so the emitted C
    /// keeps the parser's right-leaning grouping.
    fn emit_operand(&mut self, expr: &TypedExpr) -> String {
        let text = self.emit_expr(expr);
        match &expr.kind {
            TypedExprKind::Binary { .. } | TypedExprKind::TestGuard { .. } => {
                format!("({text})")
            }
            _ => text,
        }
    }

    /// A switch used as a value: declare a synthetic result variable,
    /// emit the C `switch` writing into it, and hand the variable back as
    /// the expression text.
    fn emit_switch_value(&mut self, switch: &TypedSwitch, ty: TypeId) -> String {
        let result = format!("__switch_{}", self.switch_tmp);
        self.switch_tmp += 1;

        let scrutinee = self.emit_expr(&switch.scrutinee);
        let c_ty = self.c_type(ty);
        self.out.line(&format!("{c_ty} {result};"));
        self.out.line(&format!("switch ({scrutinee}) {{"));
        self.out.indent();

        for (pattern, value) in &switch.branches {
            match pattern {
                Some(pattern) => {
                    let pattern_text = self.emit_expr(pattern);
                    self.out.line(&format!("case {pattern_text}:"));
                }
                None => self.out.line("default:"),
            }
            self.out.indent();
            let value_text = self.emit_expr(value);
            self.out.line(&format!("{result} = {value_text};"));
            self.out.line("break;");
            self.out.dedent();
        }

        self.out.dedent();
        self.out.line("}");
        result
    }
}

fn emit_literal(value: &Literal) -> String {
    match value {
        Literal::Int(value) => format!("{value}"),
        Literal::Float(value) => format!("{value:?}"),
        Literal::Bool(value) => format!("{value}"),
        Literal::Str(text) => c_string(text),
    }
}

/// Quote a string for C, re-escaping what the lexer unescaped.
fn c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_requote_their_escapes() {
        assert_eq!(c_string("hi"), "\"hi\"");
        assert_eq!(c_string("a\nb"), "\"a\\nb\"");
        assert_eq!(c_string("quote\"back\\slash"), "\"quote\\\"back\\\\slash\"");
    }

    #[test]
    fn literal_forms() {
        assert_eq!(emit_literal(&Literal::Int(42)), "42");
        assert_eq!(emit_literal(&Literal::Float(3.0)), "3.0");
        assert_eq!(emit_literal(&Literal::Float(3.25)), "3.25");
        assert_eq!(emit_literal(&Literal::Bool(true)), "true");
    }
}
