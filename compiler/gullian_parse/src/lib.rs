//! Parser: token stream to untyped AST.
//!
//! Recursive descent with an explicit cursor. Expressions are parsed the
//! way the language defines them: a primary followed by postfix chains,
//! with binary operators binding right-leaning and context-dependent
//! terminal tokens (`{` in an `if` head, `:` in a switch arm) stopping the
//! chain instead of a precedence table.

mod cursor;

use tracing::trace;

use cursor::Cursor;
use gullian_diagnostic::{Diagnostic, Result};
use gullian_ir::ast::{
    AssignOp, BinaryOp, Body, Call, Comptime, ElseArm, EnumItem, Expr, For, FuncName,
    FunctionItem, FunctionSig, If, ImportDecl, Item, StructArg, StructItem, StructLiteral, Stmt,
    Switch, SwitchBranch, SwitchPattern, TypeExpr, UnaryOp, UnionItem, VarDecl,
};
use gullian_ir::{Keyword, Name, Punct, Token, TokenKind};

/// Parse a token stream into the module's top-level items.
pub fn parse(tokens: Vec<Token>, module: &str) -> Result<Vec<Item>> {
    Parser {
        cursor: Cursor::new(tokens),
        module,
    }
    .run()
}

/// Tokens that terminate the current expression chain.
type Terminals<'a> = &'a [Punct];

const NO_TERMINALS: Terminals<'static> = &[];

struct Parser<'m> {
    cursor: Cursor,
    module: &'m str,
}

impl<'m> Parser<'m> {
    fn run(mut self) -> Result<Vec<Item>> {
        let mut items = Vec::new();

        while let Some(token) = self.cursor.peek().cloned() {
            trace!(line = token.line, "parsing top-level item");
            match token.kind {
                TokenKind::Comment(text) => {
                    self.cursor.advance();
                    items.push(Item::Comment {
                        text,
                        line: token.line,
                    });
                }
                TokenKind::Keyword(Keyword::Extern) => {
                    self.cursor.advance();
                    let fun = self.cursor.next_or(self.module, "extern declaration")?;
                    if !fun.is_keyword(Keyword::Fun) {
                        return Err(self.syntax(
                            format!("missing keyword fun after extern, found '{fun}'"),
                            fun.line,
                        ));
                    }
                    items.push(Item::Extern(self.parse_function_sig()?));
                }
                TokenKind::Keyword(Keyword::Import) => {
                    self.cursor.advance();
                    items.push(Item::Import(self.parse_import(token.line)?));
                }
                TokenKind::Keyword(Keyword::Enum) => {
                    self.cursor.advance();
                    items.push(Item::Enum(self.parse_enum()?));
                }
                TokenKind::Keyword(Keyword::Struct) => {
                    self.cursor.advance();
                    let (name, generics, fields) = self.parse_fielded_declaration()?;
                    items.push(Item::Struct(StructItem {
                        name,
                        generics,
                        fields,
                    }));
                }
                TokenKind::Keyword(Keyword::Union) => {
                    self.cursor.advance();
                    let (name, generics, fields) = self.parse_fielded_declaration()?;
                    items.push(Item::Union(UnionItem {
                        name,
                        generics,
                        fields,
                    }));
                }
                TokenKind::Keyword(Keyword::Fun) => {
                    self.cursor.advance();
                    let sig = self.parse_function_sig()?;
                    let body = self.parse_body()?;
                    items.push(Item::Function(FunctionItem { sig, body }));
                }
                TokenKind::Keyword(Keyword::Let) => {
                    self.cursor.advance();
                    items.push(Item::Let(self.parse_variable_declaration()?));
                }
                TokenKind::Keyword(Keyword::Comptime) => {
                    self.cursor.advance();
                    items.push(Item::Comptime(self.parse_comptime()?));
                }
                _ => {
                    return Err(self.syntax(
                        format!("expected a declaration, found '{token}'"),
                        token.line,
                    ));
                }
            }
        }

        Ok(items)
    }

    fn syntax(&self, message: impl Into<String>, line: u32) -> Diagnostic {
        Diagnostic::syntax(message, line, self.module)
    }

    fn expect_punct(&mut self, punct: Punct, context: &str) -> Result<u32> {
        match self.cursor.peek() {
            Some(token) if token.is_punct(punct) => {
                let line = token.line;
                self.cursor.advance();
                Ok(line)
            }
            Some(token) => Err(self.syntax(
                format!("expecting '{}' {context}, found '{token}'", punct.lexeme()),
                token.line,
            )),
            None => Err(self.syntax(
                format!("expecting '{}' {context}, found end of input", punct.lexeme()),
                self.cursor.last_line(),
            )),
        }
    }

    fn expect_name(&mut self, context: &str) -> Result<Name> {
        match self.cursor.peek().cloned() {
            Some(Token {
                kind: TokenKind::Name(name),
                ..
            }) => {
                self.cursor.advance();
                Ok(name)
            }
            Some(token) => Err(self.syntax(
                format!("expecting a name {context}, found '{token}'"),
                token.line,
            )),
            None => Err(self.syntax(
                format!("expecting a name {context}, found end of input"),
                self.cursor.last_line(),
            )),
        }
    }

    // -- Type references --

    fn parse_type_expr(&mut self) -> Result<TypeExpr> {
        if let Some(token) = self.cursor.peek() {
            if token.is_punct(Punct::Ampersand) {
                self.cursor.advance();
                return Ok(TypeExpr::Pointer(Box::new(self.parse_type_expr()?)));
            }
        }

        let name = self.expect_name("in type reference")?;
        let mut type_expr = TypeExpr::Name(name);

        loop {
            match self.cursor.peek() {
                Some(token) if token.is_punct(Punct::Dot) => {
                    self.cursor.advance();
                    let right = self.expect_name("after '.' in type reference")?;
                    type_expr = TypeExpr::Attribute {
                        left: Box::new(type_expr),
                        right,
                    };
                }
                Some(token) if token.is_punct(Punct::LeftBracket) => {
                    self.cursor.advance();
                    let mut args = Vec::new();
                    loop {
                        match self.cursor.peek() {
                            Some(token) if token.is_punct(Punct::RightBracket) => {
                                self.cursor.advance();
                                break;
                            }
                            Some(token) if token.is_punct(Punct::Comma) => {
                                self.cursor.advance();
                            }
                            Some(_) => args.push(self.parse_type_expr()?),
                            None => {
                                return Err(self.syntax(
                                    "expecting ']' in type reference, found end of input",
                                    self.cursor.last_line(),
                                ));
                            }
                        }
                    }
                    type_expr = TypeExpr::Apply {
                        head: Box::new(type_expr),
                        args,
                    };
                }
                _ => break,
            }
        }

        Ok(type_expr)
    }

    /// Reinterpret an already-parsed expression as a type reference, for
    /// positions where the expression grammar got there first (generic
    /// arguments in call position, struct literal heads).
    fn expr_to_type(&self, expr: Expr) -> Result<TypeExpr> {
        let line = expr.line();
        match expr {
            Expr::Name(name) => Ok(TypeExpr::Name(name)),
            Expr::Attribute { left, right } => Ok(TypeExpr::Attribute {
                left: Box::new(self.expr_to_type(*left)?),
                right,
            }),
            Expr::Subscript { head, items } => Ok(TypeExpr::Apply {
                head: Box::new(self.expr_to_type(*head)?),
                args: items
                    .into_iter()
                    .map(|item| self.expr_to_type(item))
                    .collect::<Result<_>>()?,
            }),
            Expr::Unary {
                op: UnaryOp::AddrOf,
                operand,
                ..
            } => Ok(TypeExpr::Pointer(Box::new(self.expr_to_type(*operand)?))),
            other => Err(self.syntax(format!("expected a type reference, found '{other}'"), line)),
        }
    }

    // -- Expressions --

    fn parse_expr(&mut self, terminals: Terminals<'_>) -> Result<Expr> {
        let primary = self.parse_primary(terminals)?;
        self.parse_postfix(primary, terminals)
    }

    fn parse_primary(&mut self, terminals: Terminals<'_>) -> Result<Expr> {
        let token = self.cursor.next_or(self.module, "expression")?;

        match token.kind {
            TokenKind::Name(name) => Ok(Expr::Name(name)),
            TokenKind::Literal(value) => Ok(Expr::Literal {
                value,
                line: token.line,
            }),
            TokenKind::Punct(punct) => {
                if let Some(op) = prefix_op(punct) {
                    // A unary operator binds the whole remaining chain, so
                    // `-a + b` reads as `-(a + b)`.
                    let operand = self.parse_expr(terminals)?;
                    return Ok(Expr::Unary {
                        op,
                        operand: Box::new(operand),
                        line: token.line,
                    });
                }
                if punct == Punct::LeftParen {
                    if let Some(next) = self.cursor.peek() {
                        if next.is_punct(Punct::RightParen) {
                            return Err(self
                                .syntax("empty parenthesized expression", token.line));
                        }
                    }
                    let inner = self.parse_expr(&[Punct::RightParen])?;
                    self.expect_punct(Punct::RightParen, "to close parenthesized expression")?;
                    return Ok(inner);
                }
                Err(self.syntax(
                    format!("expression expected, found '{}'", punct.lexeme()),
                    token.line,
                ))
            }
            TokenKind::Keyword(Keyword::Not) => {
                let operand = self.parse_expr(terminals)?;
                Ok(Expr::Unary {
                    op: UnaryOp::WordNot,
                    operand: Box::new(operand),
                    line: token.line,
                })
            }
            TokenKind::Keyword(Keyword::Comptime) => {
                Ok(Expr::Comptime(Box::new(self.parse_comptime()?)))
            }
            TokenKind::Keyword(Keyword::Switch) => {
                Ok(Expr::Switch(Box::new(self.parse_switch(token.line)?)))
            }
            TokenKind::Keyword(keyword) => Err(self.syntax(
                format!("expression expected, found keyword '{keyword}'"),
                token.line,
            )),
            TokenKind::Comment(_) => Err(self.syntax(
                "expression expected, found a comment",
                token.line,
            )),
        }
    }

    fn parse_postfix(&mut self, mut expr: Expr, terminals: Terminals<'_>) -> Result<Expr> {
        loop {
            let Some(token) = self.cursor.peek().cloned() else {
                return Ok(expr);
            };

            match token.kind {
                TokenKind::Punct(punct) if terminals.contains(&punct) => return Ok(expr),
                TokenKind::Punct(punct) => {
                    if let Some(op) = binary_op(punct) {
                        self.cursor.advance();
                        let right = self.parse_expr(terminals)?;
                        return Ok(Expr::Binary {
                            left: Box::new(expr),
                            op,
                            right: Box::new(right),
                        });
                    }
                    match punct {
                        Punct::LeftParen => {
                            self.cursor.advance();
                            expr = self.parse_call(expr, token.line)?;
                        }
                        Punct::LeftBrace => {
                            self.cursor.advance();
                            return self.parse_struct_literal(expr, token.line);
                        }
                        Punct::Dot => {
                            self.cursor.advance();
                            let right = self.expect_name("after '.'")?;
                            expr = Expr::Attribute {
                                left: Box::new(expr),
                                right,
                            };
                        }
                        Punct::LeftBracket => {
                            self.cursor.advance();
                            expr = self.parse_subscript(expr)?;
                        }
                        Punct::Interrogation => {
                            self.cursor.advance();
                            expr = Expr::TestGuard(Box::new(expr));
                        }
                        _ => return Ok(expr),
                    }
                }
                TokenKind::Keyword(Keyword::And) => {
                    self.cursor.advance();
                    let right = self.parse_expr(terminals)?;
                    return Ok(Expr::Binary {
                        left: Box::new(expr),
                        op: BinaryOp::And,
                        right: Box::new(right),
                    });
                }
                TokenKind::Keyword(Keyword::Or) => {
                    self.cursor.advance();
                    let right = self.parse_expr(terminals)?;
                    return Ok(Expr::Binary {
                        left: Box::new(expr),
                        op: BinaryOp::Or,
                        right: Box::new(right),
                    });
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_call(&mut self, callee: Expr, line: u32) -> Result<Expr> {
        let mut args = Vec::new();
        loop {
            match self.cursor.peek() {
                Some(token) if token.is_punct(Punct::RightParen) => {
                    self.cursor.advance();
                    break;
                }
                Some(token) if token.is_punct(Punct::Comma) => {
                    self.cursor.advance();
                }
                Some(_) => args.push(self.parse_expr(&[Punct::Comma, Punct::RightParen])?),
                None => {
                    return Err(self.syntax(
                        "expecting ')' to close argument list, found end of input",
                        self.cursor.last_line(),
                    ));
                }
            }
        }

        // `f[int](x)` parses as a subscripted callee; the items become the
        // explicit generic arguments of the call.
        let (callee, generics) = match callee {
            Expr::Subscript { head, items } => {
                let generics = items
                    .into_iter()
                    .map(|item| self.expr_to_type(item))
                    .collect::<Result<_>>()?;
                (*head, generics)
            }
            other => (other, Vec::new()),
        };

        Ok(Expr::Call(Call {
            callee: Box::new(callee),
            args,
            generics,
            line,
        }))
    }

    fn parse_subscript(&mut self, head: Expr) -> Result<Expr> {
        let mut items = Vec::new();
        loop {
            match self.cursor.peek() {
                Some(token) if token.is_punct(Punct::RightBracket) => {
                    self.cursor.advance();
                    break;
                }
                Some(token) if token.is_punct(Punct::Comma) => {
                    self.cursor.advance();
                }
                Some(_) => items.push(self.parse_expr(&[Punct::Comma, Punct::RightBracket])?),
                None => {
                    return Err(self.syntax(
                        "expecting ']' to close subscript, found end of input",
                        self.cursor.last_line(),
                    ));
                }
            }
        }

        Ok(Expr::Subscript {
            head: Box::new(head),
            items,
        })
    }

    fn parse_struct_literal(&mut self, name: Expr, line: u32) -> Result<Expr> {
        let name = self.expr_to_type(name)?;
        let mut args = Vec::new();

        loop {
            match self.cursor.peek().cloned() {
                Some(token) if token.is_punct(Punct::RightBrace) => {
                    self.cursor.advance();
                    break;
                }
                Some(token) if token.is_punct(Punct::Comma) => {
                    self.cursor.advance();
                }
                Some(Token {
                    kind: TokenKind::Name(field),
                    ..
                }) if self.cursor.peek_at(1).is_some_and(|t| t.is_punct(Punct::Colon)) => {
                    self.cursor.advance();
                    self.cursor.advance();
                    let value = self.parse_expr(&[Punct::Comma, Punct::RightBrace])?;
                    args.push(StructArg::Named(field, value));
                }
                Some(_) => {
                    let value = self.parse_expr(&[Punct::Comma, Punct::RightBrace])?;
                    args.push(StructArg::Positional(value));
                }
                None => {
                    return Err(self.syntax(
                        "expecting '}' to close literal, found end of input",
                        self.cursor.last_line(),
                    ));
                }
            }
        }

        Ok(Expr::StructLiteral(StructLiteral { name, args, line }))
    }

    fn parse_switch(&mut self, line: u32) -> Result<Switch> {
        let scrutinee = self.parse_expr(&[Punct::LeftBrace])?;
        self.expect_punct(Punct::LeftBrace, "after switch head")?;

        let mut branches = Vec::new();
        loop {
            match self.cursor.peek().cloned() {
                Some(token) if token.is_punct(Punct::RightBrace) => {
                    self.cursor.advance();
                    break;
                }
                Some(token) if token.is_punct(Punct::Comma) => {
                    self.cursor.advance();
                }
                Some(_) => {
                    let pattern = self.parse_expr(&[Punct::Colon])?;
                    let pattern = match pattern {
                        Expr::Name(ref name) if *name == "_" => SwitchPattern::Default,
                        other => SwitchPattern::Expr(other),
                    };
                    self.expect_punct(Punct::Colon, "for branch of switch")?;
                    let value = self.parse_expr(&[Punct::Comma, Punct::RightBrace])?;
                    branches.push(SwitchBranch { pattern, value });
                }
                None => {
                    return Err(self.syntax(
                        "expecting '}' to close switch, found end of input",
                        self.cursor.last_line(),
                    ));
                }
            }
        }

        Ok(Switch {
            scrutinee,
            branches,
            line,
        })
    }

    fn parse_comptime(&mut self) -> Result<Comptime> {
        if let Some(token) = self.cursor.peek() {
            if token.is_punct(Punct::LeftBrace) {
                return Ok(Comptime::Block(self.parse_body()?));
            }
        }
        Ok(Comptime::Expr(self.parse_expr(NO_TERMINALS)?))
    }

    // -- Statements --

    fn parse_body(&mut self) -> Result<Body> {
        self.expect_punct(Punct::LeftBrace, "before body")?;

        let mut stmts = Vec::new();
        loop {
            let Some(token) = self.cursor.peek().cloned() else {
                return Err(self.syntax(
                    "expecting '}' to close body, found end of input",
                    self.cursor.last_line(),
                ));
            };

            match token.kind {
                TokenKind::Punct(Punct::RightBrace) => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Punct(Punct::Comma | Punct::Semicolon) => {
                    self.cursor.advance();
                }
                TokenKind::Comment(_) => {
                    self.cursor.advance();
                }
                TokenKind::Keyword(Keyword::Let) => {
                    self.cursor.advance();
                    stmts.push(Stmt::Let(self.parse_variable_declaration()?));
                }
                TokenKind::Keyword(Keyword::If) => {
                    self.cursor.advance();
                    stmts.push(Stmt::If(self.parse_if()?));
                }
                TokenKind::Keyword(Keyword::While) => {
                    self.cursor.advance();
                    let cond = self.parse_expr(&[Punct::LeftBrace])?;
                    let body = self.parse_body()?;
                    stmts.push(Stmt::While { cond, body });
                }
                TokenKind::Keyword(Keyword::For) => {
                    self.cursor.advance();
                    stmts.push(Stmt::For(self.parse_for(token.line)?));
                }
                TokenKind::Keyword(Keyword::Return) => {
                    self.cursor.advance();
                    let value = self.parse_expr(NO_TERMINALS)?;
                    stmts.push(Stmt::Return {
                        value,
                        line: token.line,
                    });
                }
                TokenKind::Keyword(Keyword::Break) => {
                    self.cursor.advance();
                    stmts.push(Stmt::Break { line: token.line });
                }
                TokenKind::Keyword(Keyword::Continue) => {
                    self.cursor.advance();
                    stmts.push(Stmt::Continue { line: token.line });
                }
                TokenKind::Keyword(Keyword::Comptime) => {
                    self.cursor.advance();
                    let comptime = self.parse_comptime()?;
                    stmts.push(Stmt::Expr(Expr::Comptime(Box::new(comptime))));
                }
                TokenKind::Keyword(Keyword::Switch) => {
                    self.cursor.advance();
                    let switch = self.parse_switch(token.line)?;
                    stmts.push(Stmt::Expr(Expr::Switch(Box::new(switch))));
                }
                _ => {
                    let expr = self.parse_expr(NO_TERMINALS)?;
                    if let Some(op) = self.peek_assign_op() {
                        self.cursor.advance();
                        let value = self.parse_expr(NO_TERMINALS)?;
                        stmts.push(Stmt::Assign {
                            target: expr,
                            op,
                            value,
                        });
                    } else {
                        stmts.push(Stmt::Expr(expr));
                    }
                }
            }
        }

        Ok(Body { stmts })
    }

    fn peek_assign_op(&self) -> Option<AssignOp> {
        let token = self.cursor.peek()?;
        let TokenKind::Punct(punct) = token.kind else {
            return None;
        };
        assign_op(punct)
    }

    fn parse_variable_declaration(&mut self) -> Result<VarDecl> {
        let name = self.expect_name("after let")?;

        let mut hint = None;
        if let Some(token) = self.cursor.peek() {
            if token.is_punct(Punct::Colon) {
                self.cursor.advance();
                hint = Some(self.parse_type_expr()?);
            }
        }

        self.expect_punct(Punct::Equal, &format!("in let {name}"))?;
        let value = self.parse_expr(NO_TERMINALS)?;

        Ok(VarDecl { name, hint, value })
    }

    fn parse_if(&mut self) -> Result<If> {
        let cond = self.parse_expr(&[Punct::LeftBrace])?;
        let then_body = self.parse_body()?;

        let else_body = match self.cursor.peek() {
            Some(token) if token.is_keyword(Keyword::Else) => {
                self.cursor.advance();
                Some(ElseArm::Else(self.parse_body()?))
            }
            Some(token) if token.is_keyword(Keyword::Elif) => {
                self.cursor.advance();
                Some(ElseArm::Elif(Box::new(self.parse_if()?)))
            }
            _ => None,
        };

        Ok(If {
            cond,
            then_body,
            else_body,
        })
    }

    fn parse_for(&mut self, line: u32) -> Result<For> {
        let target = self.expect_name("after for")?;

        match self.cursor.peek() {
            Some(token) if token.is_keyword(Keyword::In) => {
                self.cursor.advance();
            }
            Some(token) => {
                return Err(self.syntax(
                    format!("expecting 'in' after for target, found '{token}'"),
                    token.line,
                ));
            }
            None => {
                return Err(self.syntax(
                    "expecting 'in' after for target, found end of input",
                    self.cursor.last_line(),
                ));
            }
        }

        let iter = self.parse_expr(&[Punct::LeftBrace])?;
        let body = self.parse_body()?;

        Ok(For {
            target,
            iter,
            body,
            line,
        })
    }

    // -- Declarations --

    fn parse_import(&mut self, line: u32) -> Result<ImportDecl> {
        let mut path = vec![self.expect_name("after import")?];
        while let Some(token) = self.cursor.peek() {
            if token.is_punct(Punct::Dot) {
                self.cursor.advance();
                path.push(self.expect_name("in import path")?);
            } else {
                break;
            }
        }
        Ok(ImportDecl { path, line })
    }

    fn parse_enum(&mut self) -> Result<EnumItem> {
        let name = self.expect_name("after enum")?;
        self.expect_punct(Punct::LeftBrace, "before enum body")?;

        let mut variants = Vec::new();
        loop {
            match self.cursor.peek().cloned() {
                Some(token) if token.is_punct(Punct::RightBrace) => {
                    self.cursor.advance();
                    break;
                }
                Some(token) if token.is_punct(Punct::Comma) => {
                    self.cursor.advance();
                }
                Some(_) => variants.push(self.expect_name("in enum body")?),
                None => {
                    return Err(self.syntax(
                        "expecting '}' to close enum body, found end of input",
                        self.cursor.last_line(),
                    ));
                }
            }
        }

        Ok(EnumItem { name, variants })
    }

    /// The shared shape of struct and union declarations:
    /// `Name[G...] { field: type, ... }`.
    fn parse_fielded_declaration(&mut self) -> Result<(Name, Vec<Name>, Vec<(Name, TypeExpr)>)> {
        let name = self.expect_name("in declaration")?;
        let generics = self.parse_generic_params()?;

        self.expect_punct(Punct::LeftBrace, "before declaration body")?;

        let mut fields = Vec::new();
        loop {
            match self.cursor.peek().cloned() {
                Some(token) if token.is_punct(Punct::RightBrace) => {
                    self.cursor.advance();
                    break;
                }
                Some(token) if token.is_punct(Punct::Comma) => {
                    self.cursor.advance();
                }
                Some(_) => {
                    let field = self.expect_name("for field")?;
                    self.expect_punct(Punct::Colon, &format!("before type of field {field}"))?;
                    let hint = self.parse_type_expr()?;
                    fields.push((field, hint));
                }
                None => {
                    return Err(self.syntax(
                        "expecting '}' to close declaration body, found end of input",
                        self.cursor.last_line(),
                    ));
                }
            }
        }

        Ok((name, generics, fields))
    }

    fn parse_generic_params(&mut self) -> Result<Vec<Name>> {
        let mut generics = Vec::new();
        if let Some(token) = self.cursor.peek() {
            if token.is_punct(Punct::LeftBracket) {
                self.cursor.advance();
                loop {
                    match self.cursor.peek().cloned() {
                        Some(token) if token.is_punct(Punct::RightBracket) => {
                            self.cursor.advance();
                            break;
                        }
                        Some(token) if token.is_punct(Punct::Comma) => {
                            self.cursor.advance();
                        }
                        Some(_) => generics.push(self.expect_name("as type parameter")?),
                        None => {
                            return Err(self.syntax(
                                "expecting ']' to close type parameters, found end of input",
                                self.cursor.last_line(),
                            ));
                        }
                    }
                }
            }
        }
        Ok(generics)
    }

    fn parse_function_sig(&mut self) -> Result<FunctionSig> {
        let first = self.expect_name("for function")?;

        // `T.m` associates the function with type T.
        let (owner, name) = if self.cursor.peek().is_some_and(|t| t.is_punct(Punct::Dot)) {
            self.cursor.advance();
            let method = self.expect_name("after '.' in function name")?;
            (Some(first), method)
        } else {
            (None, first)
        };

        let generics = self.parse_generic_params()?;

        self.expect_punct(
            Punct::LeftParen,
            &format!("before argument list of function {name}"),
        )?;

        let mut params = Vec::new();
        loop {
            match self.cursor.peek().cloned() {
                Some(token) if token.is_punct(Punct::RightParen) => {
                    self.cursor.advance();
                    break;
                }
                Some(token) if token.is_punct(Punct::Comma) => {
                    self.cursor.advance();
                }
                Some(_) => {
                    let param = self.expect_name("as parameter")?;
                    self.expect_punct(Punct::Colon, &format!("before type of parameter {param}"))?;
                    let hint = self.parse_type_expr()?;
                    params.push((param, hint));
                }
                None => {
                    return Err(self.syntax(
                        "expecting ')' to close argument list, found end of input",
                        self.cursor.last_line(),
                    ));
                }
            }
        }

        self.expect_punct(Punct::Colon, &format!("before return type of function {name}"))?;
        let return_hint = self.parse_type_expr()?;

        Ok(FunctionSig {
            name: FuncName {
                owner,
                name,
                generics,
            },
            params,
            return_hint,
        })
    }
}

const fn prefix_op(punct: Punct) -> Option<UnaryOp> {
    Some(match punct {
        Punct::Minus => UnaryOp::Neg,
        Punct::Plus => UnaryOp::Pos,
        Punct::Exclamation => UnaryOp::Not,
        Punct::Star => UnaryOp::Deref,
        Punct::Ampersand => UnaryOp::AddrOf,
        _ => return None,
    })
}

const fn binary_op(punct: Punct) -> Option<BinaryOp> {
    Some(match punct {
        Punct::Plus => BinaryOp::Add,
        Punct::Minus => BinaryOp::Sub,
        Punct::Star => BinaryOp::Mul,
        Punct::StarStar => BinaryOp::Pow,
        Punct::Slash => BinaryOp::Div,
        Punct::Percent => BinaryOp::Rem,
        Punct::Ampersand => BinaryOp::BitAnd,
        Punct::Caret => BinaryOp::BitXor,
        Punct::VerticalBar => BinaryOp::BitOr,
        Punct::Shl => BinaryOp::Shl,
        Punct::Shr => BinaryOp::Shr,
        Punct::EqualEqual => BinaryOp::Eq,
        Punct::NotEqual => BinaryOp::Ne,
        Punct::GreaterThan => BinaryOp::Gt,
        Punct::LessThan => BinaryOp::Lt,
        Punct::GreaterThanEqual => BinaryOp::Ge,
        Punct::LessThanEqual => BinaryOp::Le,
        _ => return None,
    })
}

const fn assign_op(punct: Punct) -> Option<AssignOp> {
    Some(match punct {
        Punct::Equal => AssignOp::Assign,
        Punct::PlusEqual => AssignOp::Add,
        Punct::MinusEqual => AssignOp::Sub,
        Punct::StarEqual => AssignOp::Mul,
        Punct::StarStarEqual => AssignOp::Pow,
        Punct::SlashEqual => AssignOp::Div,
        Punct::PercentEqual => AssignOp::Rem,
        Punct::AmpersandEqual => AssignOp::BitAnd,
        Punct::CaretEqual => AssignOp::BitXor,
        Punct::VerticalBarEqual => AssignOp::BitOr,
        Punct::ShlEqual => AssignOp::Shl,
        Punct::ShrEqual => AssignOp::Shr,
        _ => return None,
    })
}

#[cfg(test)]
mod tests;
