//! The untyped AST produced by the parser.
//!
//! Nodes carry line numbers but no type information; the checker elaborates
//! them into the typed tree in `gullian_types::typed`.

use std::fmt;

use crate::{Literal, Name};

/// A type reference as written in source: `int`, `vec.List`, `List[int]`,
/// `&T`.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    Name(Name),
    Attribute { left: Box<TypeExpr>, right: Name },
    Apply { head: Box<TypeExpr>, args: Vec<TypeExpr> },
    Pointer(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn line(&self) -> u32 {
        match self {
            TypeExpr::Name(name) => name.line,
            TypeExpr::Attribute { left, .. } => left.line(),
            TypeExpr::Apply { head, .. } => head.line(),
            TypeExpr::Pointer(inner) => inner.line(),
        }
    }

    /// The last plain name of a dotted reference (`vec.List` -> `List`).
    pub fn rightmost(&self) -> Option<&Name> {
        match self {
            TypeExpr::Name(name) => Some(name),
            TypeExpr::Attribute { right, .. } => Some(right),
            TypeExpr::Apply { head, .. } => head.rightmost(),
            TypeExpr::Pointer(_) => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(name) => write!(f, "{name}"),
            TypeExpr::Attribute { left, right } => write!(f, "{left}.{right}"),
            TypeExpr::Apply { head, args } => {
                write!(f, "{head}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]")
            }
            TypeExpr::Pointer(inner) => write!(f, "&{inner}"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    WordNot,
    AddrOf,
    Deref,
}

impl UnaryOp {
    /// Lexeme used in C output. `not` maps onto C's `!`.
    pub const fn c_lexeme(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Not | UnaryOp::WordNot => "!",
            UnaryOp::AddrOf => "&",
            UnaryOp::Deref => "*",
        }
    }

    pub const fn lexeme(self) -> &'static str {
        match self {
            UnaryOp::WordNot => "not",
            other => other.c_lexeme(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Pow,
    Div,
    Rem,
    BitAnd,
    BitXor,
    BitOr,
    Shl,
    Shr,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    And,
    Or,
}

impl BinaryOp {
    /// Lexeme used in C output. `and`/`or` map onto `&&`/`||`.
    pub const fn c_lexeme(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Pow => "**",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// True for operators whose result is `bool` regardless of operands.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Gt
                | BinaryOp::Lt
                | BinaryOp::Ge
                | BinaryOp::Le
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Pow,
    Div,
    Rem,
    BitAnd,
    BitXor,
    BitOr,
    Shl,
    Shr,
}

impl AssignOp {
    pub const fn c_lexeme(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Pow => "**=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitXor => "^=",
            AssignOp::BitOr => "|=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub generics: Vec<TypeExpr>,
    pub line: u32,
}

/// One argument of a struct or union literal.
#[derive(Clone, Debug, PartialEq)]
pub enum StructArg {
    Positional(Expr),
    Named(Name, Expr),
}

impl StructArg {
    pub fn value(&self) -> &Expr {
        match self {
            StructArg::Positional(expr) | StructArg::Named(_, expr) => expr,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructLiteral {
    pub name: TypeExpr,
    pub args: Vec<StructArg>,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SwitchPattern {
    /// The `_` arm.
    Default,
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchBranch {
    pub pattern: SwitchPattern,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    pub scrutinee: Expr,
    pub branches: Vec<SwitchBranch>,
    pub line: u32,
}

/// A `comptime` expression or block.
#[derive(Clone, Debug, PartialEq)]
pub enum Comptime {
    Expr(Expr),
    Block(Body),
}

impl Comptime {
    pub fn line(&self) -> u32 {
        match self {
            Comptime::Expr(expr) => expr.line(),
            Comptime::Block(body) => body.line(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Name(Name),
    Literal { value: Literal, line: u32 },
    Call(Call),
    StructLiteral(StructLiteral),
    Attribute { left: Box<Expr>, right: Name },
    Subscript { head: Box<Expr>, items: Vec<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr>, line: u32 },
    Binary { left: Box<Expr>, op: BinaryOp, right: Box<Expr> },
    TestGuard(Box<Expr>),
    Switch(Box<Switch>),
    Comptime(Box<Comptime>),
}

impl Expr {
    pub fn line(&self) -> u32 {
        match self {
            Expr::Name(name) => name.line,
            Expr::Literal { line, .. } => *line,
            Expr::Call(call) => call.line,
            Expr::StructLiteral(literal) => literal.line,
            Expr::Attribute { left, .. } => left.line(),
            Expr::Subscript { head, .. } => head.line(),
            Expr::Unary { line, .. } => *line,
            Expr::Binary { left, .. } => left.line(),
            Expr::TestGuard(inner) => inner.line(),
            Expr::Switch(switch) => switch.line,
            Expr::Comptime(comptime) => comptime.line(),
        }
    }
}

impl fmt::Display for Expr {
    /// A short, single-line rendering for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Name(name) => write!(f, "{name}"),
            Expr::Literal { value, .. } => write!(f, "{value}"),
            Expr::Call(call) => {
                if call.args.is_empty() {
                    write!(f, "{}()", call.callee)
                } else {
                    write!(f, "{}(...)", call.callee)
                }
            }
            Expr::StructLiteral(literal) => write!(f, "{} {{ ... }}", literal.name),
            Expr::Attribute { left, right } => write!(f, "{left}.{right}"),
            Expr::Subscript { head, .. } => write!(f, "{head}[...]"),
            Expr::Unary { op, operand, .. } => write!(f, "{}{operand}", op.lexeme()),
            Expr::Binary { left, op, right } => {
                write!(f, "{left} {} {right}", op.c_lexeme())
            }
            Expr::TestGuard(inner) => write!(f, "{inner}?"),
            Expr::Switch(switch) => write!(f, "switch {} {{ ... }}", switch.scrutinee),
            Expr::Comptime(comptime) => match &**comptime {
                Comptime::Expr(expr) => write!(f, "comptime {expr}"),
                Comptime::Block(_) => write!(f, "comptime {{ ... }}"),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub name: Name,
    pub hint: Option<TypeExpr>,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElseArm {
    Else(Body),
    Elif(Box<If>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct If {
    pub cond: Expr,
    pub then_body: Body,
    pub else_body: Option<ElseArm>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct For {
    pub target: Name,
    pub iter: Expr,
    pub body: Body,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Let(VarDecl),
    Assign { target: Expr, op: AssignOp, value: Expr },
    If(If),
    While { cond: Expr, body: Body },
    For(For),
    Return { value: Expr, line: u32 },
    Break { line: u32 },
    Continue { line: u32 },
    Expr(Expr),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
    pub stmts: Vec<Stmt>,
}

impl Body {
    pub fn line(&self) -> u32 {
        match self.stmts.first() {
            Some(Stmt::Let(decl)) => decl.name.line,
            Some(Stmt::Assign { target, .. }) => target.line(),
            Some(Stmt::If(if_)) => if_.cond.line(),
            Some(Stmt::While { cond, .. }) => cond.line(),
            Some(Stmt::For(for_)) => for_.line,
            Some(Stmt::Return { line, .. } | Stmt::Break { line } | Stmt::Continue { line }) => {
                *line
            }
            Some(Stmt::Expr(expr)) => expr.line(),
            None => 0,
        }
    }
}

/// The name part of a function head: `main`, `List.push`, `map[T]`,
/// `List.map[T]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncName {
    pub owner: Option<Name>,
    pub name: Name,
    pub generics: Vec<Name>,
}

impl FuncName {
    pub fn line(&self) -> u32 {
        self.name.line
    }
}

impl fmt::Display for FuncName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(owner) = &self.owner {
            write!(f, "{owner}.")?;
        }
        write!(f, "{}", self.name)?;
        if !self.generics.is_empty() {
            write!(f, "[")?;
            for (i, g) in self.generics.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{g}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSig {
    pub name: FuncName,
    pub params: Vec<(Name, TypeExpr)>,
    pub return_hint: TypeExpr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionItem {
    pub sig: FunctionSig,
    pub body: Body,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportDecl {
    pub path: Vec<Name>,
    pub line: u32,
}

impl ImportDecl {
    /// Dotted module name, e.g. `std.vec`.
    pub fn dotted(&self) -> String {
        self.path
            .iter()
            .map(Name::text)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The name the module is registered under: the final path segment.
    pub fn last(&self) -> &Name {
        self.path.last().expect("import path is never empty")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumItem {
    pub name: Name,
    pub variants: Vec<Name>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructItem {
    pub name: Name,
    pub generics: Vec<Name>,
    pub fields: Vec<(Name, TypeExpr)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionItem {
    pub name: Name,
    pub generics: Vec<Name>,
    pub fields: Vec<(Name, TypeExpr)>,
}

/// A top-level declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Comment { text: String, line: u32 },
    Import(ImportDecl),
    Extern(FunctionSig),
    Enum(EnumItem),
    Struct(StructItem),
    Union(UnionItem),
    Function(FunctionItem),
    Let(VarDecl),
    Comptime(Comptime),
}
