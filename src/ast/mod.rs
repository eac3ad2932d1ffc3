pub mod printer;

use serde::Serialize;

pub use crate::scanner::token::Span;

/// One parsed input line. The variant set is closed: every pass over the tree
/// (resolution, the self-reference rewrite, printing) matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    Literal(LiteralExpr),
    Vector(VectorExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Variable(VariableExpr),
    Call(CallExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Vector(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Variable(e) => e.span,
            Self::Call(e) => e.span,
        }
    }

    pub fn number(value: f64, span: Span) -> Self {
        Self::Literal(LiteralExpr { value, span })
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, Self::Variable(VariableExpr { value: Some(_), .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralExpr {
    pub value: f64,
    pub span: Span,
}

/// `[a b c]` or `vec(a; b; c)`. Elements may be arbitrary expressions until
/// resolved; elided elements are already filled in with zero literals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum UnaryOp {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "?")]
    Abs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "^")]
    Power,
    #[strum(serialize = "\\")]
    Root,
}

/// A read of `name` when `value` is `None`, otherwise the assignment `name = value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableExpr {
    pub name: String,
    pub value: Option<Box<Expr>>,
    pub span: Span,
}

/// Call of a reserved function name. Parsed, never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpr {
    pub name: String,
    pub argument: Box<Expr>,
    pub span: Span,
}
