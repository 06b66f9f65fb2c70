//! Parent pointers over a [`crate::goast::ast::File`].
//!
//! Built once, in a single pre-order traversal (`O(N)` in the number of
//! AST nodes), then queried by plugins that need to walk upward — most
//! notably None-context inference (§4.3), which needs to find the
//! enclosing assignment/return/call to decide what an untyped `None`
//! should become.

use std::collections::HashMap;

use crate::goast::ast::{Decl, Expr, File, Spec, Stmt};
use crate::sourcemap::Position;

/// Anything a parent pointer can point at. Stored by position rather than
/// by reference so the map stays owned and index-free.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    File,
    Decl(Decl),
    Stmt(Stmt),
    Expr(Expr),
}

/// Maps a node's position to its parent node. Positions are assumed
/// unique within one file, which holds for this grammar since every
/// token has a distinct line/col and every node's position is its first
/// token's position.
#[derive(Debug, Default)]
pub struct ParentMap {
    parents: HashMap<Position, Node>,
}

impl ParentMap {
    pub fn build(file: &File) -> Self {
        let mut map = ParentMap::default();
        for decl in &file.decls {
            map.walk_decl(decl, Node::File);
        }
        map
    }

    pub fn get_parent(&self, pos: Position) -> Option<&Node> {
        self.parents.get(&pos)
    }

    /// Parent nodes from `pos` outward, nearest first.
    pub fn walk_parents(&self, pos: Position) -> Vec<&Node> {
        let mut chain = Vec::new();
        let mut current = pos;
        while let Some(parent) = self.get_parent(current) {
            chain.push(parent);
            match parent {
                Node::Decl(d) => current = d.pos(),
                Node::Stmt(s) => current = s.pos(),
                Node::Expr(e) => current = e.pos(),
                Node::File => break,
            }
        }
        chain
    }

    fn insert(&mut self, pos: Position, parent: Node) {
        self.parents.insert(pos, parent);
    }

    fn walk_decl(&mut self, decl: &Decl, parent: Node) {
        self.insert(decl.pos(), parent);
        match decl {
            Decl::Func(f) => {
                if let Some(body) = &f.body {
                    for stmt in &body.stmts {
                        self.walk_stmt(stmt, Node::Decl(decl.clone()));
                    }
                }
            }
            Decl::Gen(g) => {
                for spec in &g.specs {
                    if let Spec::Value { values, .. } = spec {
                        for v in values {
                            self.walk_expr(v, Node::Decl(decl.clone()));
                        }
                    }
                }
            }
            Decl::Raw(_) => {}
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt, parent: Node) {
        self.insert(stmt.pos(), parent);
        match stmt {
            Stmt::Expr(e) => self.walk_expr(e, Node::Stmt(stmt.clone())),
            Stmt::Assign { lhs, rhs, .. } => {
                for e in lhs.iter().chain(rhs) {
                    self.walk_expr(e, Node::Stmt(stmt.clone()));
                }
            }
            Stmt::Return { results, .. } => {
                for e in results {
                    self.walk_expr(e, Node::Stmt(stmt.clone()));
                }
            }
            Stmt::If { cond, body, els, .. } => {
                self.walk_expr(cond, Node::Stmt(stmt.clone()));
                for s in &body.stmts {
                    self.walk_stmt(s, Node::Stmt(stmt.clone()));
                }
                if let Some(els) = els {
                    self.walk_stmt(els, Node::Stmt(stmt.clone()));
                }
            }
            Stmt::Switch { tag, cases, .. } => {
                if let Some(tag) = tag {
                    self.walk_expr(tag, Node::Stmt(stmt.clone()));
                }
                for case in cases {
                    for v in &case.values {
                        self.walk_expr(v, Node::Stmt(stmt.clone()));
                    }
                    for s in &case.body {
                        self.walk_stmt(s, Node::Stmt(stmt.clone()));
                    }
                }
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                if let Some(init) = init {
                    self.walk_stmt(init, Node::Stmt(stmt.clone()));
                }
                if let Some(cond) = cond {
                    self.walk_expr(cond, Node::Stmt(stmt.clone()));
                }
                if let Some(post) = post {
                    self.walk_stmt(post, Node::Stmt(stmt.clone()));
                }
                for s in &body.stmts {
                    self.walk_stmt(s, Node::Stmt(stmt.clone()));
                }
            }
            Stmt::Block(b) => {
                for s in &b.stmts {
                    self.walk_stmt(s, Node::Stmt(stmt.clone()));
                }
            }
            Stmt::Decl(d) => self.walk_decl(d, Node::Stmt(stmt.clone())),
            Stmt::Branch { .. } | Stmt::Empty => {}
        }
    }

    fn walk_expr(&mut self, expr: &Expr, parent: Node) {
        self.insert(expr.pos(), parent);
        match expr {
            Expr::Call { func, args, .. } => {
                self.walk_expr(func, Node::Expr(expr.clone()));
                for a in args {
                    self.walk_expr(a, Node::Expr(expr.clone()));
                }
            }
            Expr::Selector { expr: inner, .. } => self.walk_expr(inner, Node::Expr(expr.clone())),
            Expr::Binary { lhs, rhs, .. } => {
                self.walk_expr(lhs, Node::Expr(expr.clone()));
                self.walk_expr(rhs, Node::Expr(expr.clone()));
            }
            Expr::Unary { expr: inner, .. }
            | Expr::Star { expr: inner, .. }
            | Expr::Paren { expr: inner, .. } => self.walk_expr(inner, Node::Expr(expr.clone())),
            Expr::Index { expr: inner, indices, .. } => {
                self.walk_expr(inner, Node::Expr(expr.clone()));
                for i in indices {
                    self.walk_expr(i, Node::Expr(expr.clone()));
                }
            }
            Expr::CompositeLit { elts, .. } => {
                for e in elts {
                    self.walk_expr(e, Node::Expr(expr.clone()));
                }
            }
            Expr::KeyValue { key, value, .. } => {
                self.walk_expr(key, Node::Expr(expr.clone()));
                self.walk_expr(value, Node::Expr(expr.clone()));
            }
            Expr::FuncLit { body, .. } => {
                for s in &body.stmts {
                    self.walk_stmt(s, Node::Expr(expr.clone()));
                }
            }
            Expr::Ident(..)
            | Expr::BasicLit { .. }
            | Expr::ArrayType { .. }
            | Expr::MapType { .. }
            | Expr::FuncType { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::parse;

    #[test]
    fn finds_enclosing_return_for_a_call_argument() {
        let file = parse("package main\n\nfunc f() int {\n\treturn g(1)\n}\n").unwrap();
        let map = ParentMap::build(&file);
        let func = file.decls[0].as_func().unwrap();
        let ret_stmt = &func.body.as_ref().unwrap().stmts[0];
        let call_pos = match ret_stmt {
            Stmt::Return { results, .. } => results[0].pos(),
            _ => panic!("expected return"),
        };
        let chain = map.walk_parents(call_pos);
        assert!(matches!(chain[0], Node::Stmt(Stmt::Return { .. })));
    }
}
