//! The typed AST produced by elaboration.
//!
//! Each expression is a `{kind, type}` pair; the checker builds this tree
//! in parallel to the untyped AST instead of rewriting nodes in place.
//! `for` loops do not appear here: the checker lowers them to the iterator
//! protocol (two lets and a guarded `while`) before elaboration.

use gullian_ir::ast::{AssignOp, BinaryOp, UnaryOp};
use gullian_ir::{Literal, Name};

use crate::decl::FnId;
use crate::pool::TypeId;

#[derive(Clone, Debug)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: TypeId,
}

impl TypedExpr {
    pub fn new(kind: TypedExprKind, ty: TypeId) -> Self {
        TypedExpr { kind, ty }
    }
}

#[derive(Clone, Debug)]
pub enum TypedExprKind {
    Literal(Literal),
    /// A variable or argument read.
    Var(Name),
    /// A type used as a value; emits `sizeof`.
    TypeValue(TypeId),
    /// A function named as a value.
    FuncRef(FnId),
    /// Field or variant payload access.
    Field {
        object: Box<TypedExpr>,
        field: Name,
        /// True when the object is pointer-typed and C needs `->`.
        through_ptr: bool,
    },
    /// `Color.red` on an enum type.
    EnumVariant { enum_ty: TypeId, variant: Name },
    /// `u.v?` — the discriminant test authorizing a variant read.
    TestGuard {
        object: Box<TypedExpr>,
        union_ty: TypeId,
        variant: Name,
    },
    Call {
        func: FnId,
        args: Vec<TypedExpr>,
    },
    /// Non-type subscript: `h[i]`.
    Index {
        head: Box<TypedExpr>,
        index: Box<TypedExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Binary {
        left: Box<TypedExpr>,
        op: BinaryOp,
        right: Box<TypedExpr>,
    },
    StructLiteral {
        ty: TypeId,
        args: Vec<TypedExpr>,
    },
    UnionLiteral {
        ty: TypeId,
        variant: Name,
        variant_index: usize,
        value: Box<TypedExpr>,
    },
    Switch(Box<TypedSwitch>),
}

#[derive(Clone, Debug)]
pub struct TypedSwitch {
    pub scrutinee: TypedExpr,
    /// `(pattern, value)` pairs; `None` is the default arm.
    pub branches: Vec<(Option<TypedExpr>, TypedExpr)>,
}

#[derive(Clone, Debug)]
pub struct TypedIf {
    pub cond: TypedExpr,
    pub then_body: TypedBody,
    pub else_body: Option<TypedElse>,
}

#[derive(Clone, Debug)]
pub enum TypedElse {
    Else(TypedBody),
    Elif(Box<TypedIf>),
}

#[derive(Clone, Debug)]
pub enum TypedStmt {
    Let {
        name: Name,
        ty: TypeId,
        value: TypedExpr,
    },
    Assign {
        target: TypedExpr,
        op: AssignOp,
        value: TypedExpr,
    },
    If(TypedIf),
    While {
        cond: TypedExpr,
        body: TypedBody,
    },
    Return(TypedExpr),
    Break,
    Continue,
    Expr(TypedExpr),
}

#[derive(Clone, Debug, Default)]
pub struct TypedBody {
    pub stmts: Vec<TypedStmt>,
}
