//! Statement and body emission.

use gullian_types::typed::{TypedBody, TypedElse, TypedIf, TypedStmt};

use crate::CGen;

impl<'ctx> CGen<'ctx> {
    pub(crate) fn emit_body(&mut self, body: &TypedBody) {
        for stmt in &body.stmts {
            self.emit_stmt(stmt);
        }
    }

    pub(crate) fn emit_stmt(&mut self, stmt: &TypedStmt) {
        match stmt {
            TypedStmt::Let { name, ty, value } => {
                // Expression text is built first: a lifted switch writes
                // its statement form before the declaration that uses it.
                let value_text = self.emit_expr(value);
                let c_ty = self.c_type(*ty);
                self.out.line(&format!("{c_ty} {name} = {value_text};"));
            }
            TypedStmt::Assign { target, op, value } => {
                let target_text = self.emit_expr(target);
                let value_text = self.emit_expr(value);
                self.out
                    .line(&format!("{target_text} {} {value_text};", op.c_lexeme()));
            }
            TypedStmt::If(if_) => self.emit_if(if_),
            TypedStmt::While { cond, body } => {
                let cond_text = self.emit_expr(cond);
                self.out.line(&format!("while ({cond_text}) {{"));
                self.out.indent();
                self.emit_body(body);
                self.out.dedent();
                self.out.line("}");
            }
            TypedStmt::Return(value) => {
                let value_text = self.emit_expr(value);
                self.out.line(&format!("return {value_text};"));
            }
            TypedStmt::Break => self.out.line("break;"),
            TypedStmt::Continue => self.out.line("continue;"),
            TypedStmt::Expr(expr) => {
                let text = self.emit_expr(expr);
                self.out.line(&format!("{text};"));
            }
        }
    }

    fn emit_if(&mut self, if_: &TypedIf) {
        let cond_text = self.emit_expr(&if_.cond);
        self.out.line(&format!("if ({cond_text}) {{"));
        self.out.indent();
        self.emit_body(&if_.then_body);
        self.out.dedent();

        match &if_.else_body {
            None => self.out.line("}"),
            Some(TypedElse::Else(body)) => {
                self.out.line("} else {");
                self.out.indent();
                self.emit_body(body);
                self.out.dedent();
                self.out.line("}");
            }
            Some(TypedElse::Elif(elif)) => {
                self.out.line("} else {");
                self.out.indent();
                self.emit_if(elif);
                self.out.dedent();
                self.out.line("}");
            }
        }
    }
}
