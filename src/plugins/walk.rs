//! Purpose-built AST walkers shared by the plugin pipeline.
//!
//! Not a generic visitor: each function walks exactly the shape a plugin
//! needs (every expression reachable from a function body, every
//! statement list a block/case/branch can hold), matching the scope the
//! rest of this compiler's supporting code already commits to (the parent
//! map and type checker are likewise single-purpose, not a general
//! tree-traversal framework).

use crate::goast::ast::*;

/// Visits every statement list in `file` (function bodies, nested blocks,
/// switch-case bodies), calling `f` on the list itself before descending
/// into each of its statements — so `f` can insert, remove or replace
/// entries and the walk still continues correctly through whatever is left.
pub fn for_each_stmt_list_mut(file: &mut File, f: &mut dyn FnMut(&mut Vec<Stmt>)) {
    for decl in &mut file.decls {
        if let Decl::Func(func) = decl {
            if let Some(body) = &mut func.body {
                walk_block_mut(body, f);
            }
        }
    }
}

fn walk_block_mut(block: &mut Block, f: &mut dyn FnMut(&mut Vec<Stmt>)) {
    f(&mut block.stmts);
    for stmt in &mut block.stmts {
        walk_stmt_mut(stmt, f);
    }
}

fn walk_stmt_mut(stmt: &mut Stmt, f: &mut dyn FnMut(&mut Vec<Stmt>)) {
    match stmt {
        Stmt::If { body, els, .. } => {
            walk_block_mut(body, f);
            if let Some(e) = els {
                walk_stmt_mut(e, f);
            }
        }
        Stmt::For { body, .. } => walk_block_mut(body, f),
        Stmt::Switch { cases, .. } => {
            for case in cases {
                f(&mut case.body);
                for s in &mut case.body {
                    walk_stmt_mut(s, f);
                }
            }
        }
        Stmt::Block(b) => walk_block_mut(b, f),
        _ => {}
    }
}

/// Visits every expression reachable from `file`'s function bodies and
/// top-level value declarations, innermost-first (a node's children are
/// visited, then the node itself), so a rewrite of a child is visible to
/// `f` when it is later called on the parent.
pub fn for_each_expr_mut(file: &mut File, f: &mut dyn FnMut(&mut Expr)) {
    for decl in &mut file.decls {
        match decl {
            Decl::Func(func) => {
                if let Some(body) = &mut func.body {
                    walk_block_exprs_mut(body, f);
                }
            }
            Decl::Gen(g) => {
                for spec in &mut g.specs {
                    if let Spec::Value { values, .. } = spec {
                        for v in values {
                            walk_expr_mut(v, f);
                        }
                    }
                }
            }
            Decl::Raw(_) => {}
        }
    }
}

fn walk_block_exprs_mut(block: &mut Block, f: &mut dyn FnMut(&mut Expr)) {
    for stmt in &mut block.stmts {
        walk_stmt_exprs_mut(stmt, f);
    }
}

fn walk_stmt_exprs_mut(stmt: &mut Stmt, f: &mut dyn FnMut(&mut Expr)) {
    match stmt {
        Stmt::Expr(e) => walk_expr_mut(e, f),
        Stmt::Assign { lhs, rhs, .. } => {
            for e in lhs.iter_mut().chain(rhs.iter_mut()) {
                walk_expr_mut(e, f);
            }
        }
        Stmt::Return { results, .. } => {
            for e in results {
                walk_expr_mut(e, f);
            }
        }
        Stmt::If { cond, body, els, .. } => {
            walk_expr_mut(cond, f);
            walk_block_exprs_mut(body, f);
            if let Some(e) = els {
                walk_stmt_exprs_mut(e, f);
            }
        }
        Stmt::Switch { tag, cases, .. } => {
            if let Some(t) = tag {
                walk_expr_mut(t, f);
            }
            for case in cases {
                for v in &mut case.values {
                    walk_expr_mut(v, f);
                }
                for s in &mut case.body {
                    walk_stmt_exprs_mut(s, f);
                }
            }
        }
        Stmt::For { cond, body, .. } => {
            if let Some(c) = cond {
                walk_expr_mut(c, f);
            }
            walk_block_exprs_mut(body, f);
        }
        Stmt::Block(b) => walk_block_exprs_mut(b, f),
        Stmt::Decl(Decl::Gen(g)) => {
            for spec in &mut g.specs {
                if let Spec::Value { values, .. } = spec {
                    for v in values {
                        walk_expr_mut(v, f);
                    }
                }
            }
        }
        _ => {}
    }
}

fn walk_expr_mut(expr: &mut Expr, f: &mut dyn FnMut(&mut Expr)) {
    match expr {
        Expr::Call { func, args, .. } => {
            walk_expr_mut(func, f);
            for a in args {
                walk_expr_mut(a, f);
            }
        }
        Expr::Selector { expr: e, .. } => walk_expr_mut(e, f),
        Expr::Binary { lhs, rhs, .. } => {
            walk_expr_mut(lhs, f);
            walk_expr_mut(rhs, f);
        }
        Expr::Unary { expr: e, .. } | Expr::Star { expr: e, .. } | Expr::Paren { expr: e, .. } => {
            walk_expr_mut(e, f)
        }
        Expr::Index { expr: e, indices, .. } => {
            walk_expr_mut(e, f);
            for i in indices {
                walk_expr_mut(i, f);
            }
        }
        Expr::FuncLit { body, .. } => walk_block_exprs_mut(body, f),
        Expr::CompositeLit { elts, .. } => {
            for e in elts {
                walk_expr_mut(e, f);
            }
        }
        Expr::KeyValue { key, value, .. } => {
            walk_expr_mut(key, f);
            walk_expr_mut(value, f);
        }
        Expr::Ident(..)
        | Expr::BasicLit { .. }
        | Expr::ArrayType { .. }
        | Expr::MapType { .. }
        | Expr::FuncType { .. } => {}
    }
    f(expr);
}

/// Every `Field`/`Spec` type expression reachable from top-level
/// declarations — the positions a type-position generic instantiation
/// (`Result[int, error]`) can appear, used by the Result/Option plugin's
/// Discovery phase.
pub fn collect_type_exprs(file: &File) -> Vec<&Expr> {
    let mut out = Vec::new();
    for decl in &file.decls {
        match decl {
            Decl::Func(func) => {
                out.extend(func.params.iter().map(|p| &p.type_expr));
                out.extend(func.results.iter().map(|r| &r.type_expr));
            }
            Decl::Gen(g) => {
                for spec in &g.specs {
                    match spec {
                        Spec::Type { type_expr, .. } => out.push(type_expr),
                        Spec::Value {
                            type_expr: Some(t), ..
                        } => out.push(t),
                        _ => {}
                    }
                }
            }
            Decl::Raw(_) => {}
        }
    }
    out
}
