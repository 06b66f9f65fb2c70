use crate::sourcemap::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    String,
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    LAnd,
    LOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Addr,
}

/// Go-subset expressions. Go's grammar unifies expressions and type syntax
/// (a type name is just an identifier expression, `*T` a unary expression,
/// `[]T` an array-type expression); this AST follows that unification
/// rather than carrying a second parallel `Type` hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String, Position),
    BasicLit {
        kind: LitKind,
        value: String,
        pos: Position,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        pos: Position,
    },
    Selector {
        expr: Box<Expr>,
        sel: String,
        pos: Position,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        pos: Position,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        pos: Position,
    },
    /// `*T` in type position (pointer type) — kept distinct from
    /// `Unary(Addr, ..)` so the printer never confuses `&x` with `*T`.
    Star {
        expr: Box<Expr>,
        pos: Position,
    },
    Paren {
        expr: Box<Expr>,
        pos: Position,
    },
    /// `Ident[A, B, ...]`: both generic instantiation (`Result[int, error]`)
    /// and slice/array indexing (`xs[0]`) share this shape; callers
    /// disambiguate by the number/kind of indices and surrounding context.
    Index {
        expr: Box<Expr>,
        indices: Vec<Expr>,
        pos: Position,
    },
    /// `[]T` (len == None) or `[N]T` (len == Some(_)).
    ArrayType {
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
        pos: Position,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
        pos: Position,
    },
    FuncType {
        params: Vec<Field>,
        results: Vec<Field>,
        pos: Position,
    },
    FuncLit {
        params: Vec<Field>,
        results: Vec<Field>,
        body: Block,
        pos: Position,
    },
    CompositeLit {
        type_expr: Option<Box<Expr>>,
        elts: Vec<Expr>,
        pos: Position,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
        pos: Position,
    },
}

impl Expr {
    pub fn pos(&self) -> Position {
        match self {
            Expr::Ident(_, pos)
            | Expr::BasicLit { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Selector { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Star { pos, .. }
            | Expr::Paren { pos, .. }
            | Expr::Index { pos, .. }
            | Expr::ArrayType { pos, .. }
            | Expr::MapType { pos, .. }
            | Expr::FuncType { pos, .. }
            | Expr::FuncLit { pos, .. }
            | Expr::CompositeLit { pos, .. }
            | Expr::KeyValue { pos, .. } => *pos,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name, _) => Some(name),
            _ => None,
        }
    }
}

/// A parameter, result or struct-field slot: optional name plus a type
/// expression (Go allows unnamed parameters/results).
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Option<String>,
    pub type_expr: Expr,
    pub pos: Position,
}

/// A `{ ... }` block of statements. Kept as its own type (rather than
/// `Vec<Stmt>` inline) so it carries its own position for parent-map and
/// comment-window purposes.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<super::Stmt>,
    pub pos: Position,
}
