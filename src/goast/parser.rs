//! Hand-written recursive-descent parser for the Go subset.
//!
//! No parser-combinator or grammar-engine crate is used here: the corpus
//! has no maintained Go-grammar crate to reach for, so this follows the
//! same "one function per production" shape the rest of the corpus uses
//! for its own hand-rolled parsers, just enumerating Go's (smaller, more
//! regular) grammar instead.

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::sourcemap::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub pos: Position,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.pos.line, self.pos.col, self.message)
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    idx: usize,
    /// Comments pulled out of the token stream as they're skipped, kept in
    /// encounter order and drained into [`File::comments`] at the end.
    comments: Vec<Comment>,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    pub fn new(source: &str) -> PResult<Self> {
        let tokens = Lexer::new(source)
            .tokenize()
            .map_err(|e| ParseError {
                message: e.message,
                pos: e.pos,
            })?;
        Ok(Self {
            tokens,
            idx: 0,
            comments: Vec::new(),
        })
    }

    pub fn parse_file(mut self) -> PResult<File> {
        let file = self.file()?;
        Ok(file)
    }

    // -- token plumbing ----------------------------------------------------

    fn peek(&mut self) -> &Token {
        self.skip_comments();
        &self.tokens[self.idx]
    }

    fn skip_comments(&mut self) {
        while let TokenKind::Comment(text) = &self.tokens[self.idx].kind {
            self.comments.push(Comment {
                text: text.clone(),
                pos: self.tokens[self.idx].pos,
            });
            self.idx += 1;
        }
    }

    /// Comments collected since the last call to this method, used to
    /// populate `leading_comments` on the construct that follows them.
    fn take_pending_comments(&mut self, since: usize) -> Vec<Comment> {
        self.comments.split_off(since).into_iter().collect()
    }

    fn comment_mark(&self) -> usize {
        self.comments.len()
    }

    fn pos(&mut self) -> Position {
        self.peek().pos
    }

    fn bump(&mut self) -> Token {
        self.skip_comments();
        let tok = self.tokens[self.idx].clone();
        self.idx += 1;
        tok
    }

    fn is_sym(&mut self, s: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Sym(sym) if *sym == s)
    }

    fn is_ident_text(&mut self, s: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(name) if name == s)
    }

    fn is_eof(&mut self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn expect_sym(&mut self, s: &str) -> PResult<Position> {
        let pos = self.pos();
        if self.is_sym(s) {
            self.bump();
            Ok(pos)
        } else {
            Err(ParseError {
                message: format!("expected '{}', found {:?}", s, self.peek().kind),
                pos,
            })
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, Position)> {
        let pos = self.pos();
        match self.bump().kind {
            TokenKind::Ident(name) => Ok((name, pos)),
            other => Err(ParseError {
                message: format!("expected identifier, found {:?}", other),
                pos,
            }),
        }
    }

    fn eat_sym(&mut self, s: &str) -> bool {
        if self.is_sym(s) {
            self.bump();
            true
        } else {
            false
        }
    }

    // -- top level -----------------------------------------------------

    fn file(&mut self) -> PResult<File> {
        self.expect_ident_text("package")?;
        let (package, _) = self.expect_ident()?;
        self.eat_sym(";");

        let mut imports = Vec::new();
        while self.is_ident_text("import") {
            self.bump();
            imports.extend(self.import_spec_group()?);
            self.eat_sym(";");
        }

        let mut decls = Vec::new();
        while !self.is_eof() {
            decls.push(self.top_level_decl()?);
            self.eat_sym(";");
        }

        let trailing = self.take_pending_comments(0);
        Ok(File {
            package,
            imports,
            decls,
            comments: trailing,
        })
    }

    fn expect_ident_text(&mut self, text: &str) -> PResult<Position> {
        let pos = self.pos();
        if self.is_ident_text(text) {
            self.bump();
            Ok(pos)
        } else {
            Err(ParseError {
                message: format!("expected '{}', found {:?}", text, self.peek().kind),
                pos,
            })
        }
    }

    fn import_spec_group(&mut self) -> PResult<Vec<ImportSpec>> {
        if self.eat_sym("(") {
            let mut specs = Vec::new();
            while !self.is_sym(")") {
                specs.push(self.import_spec()?);
                self.eat_sym(";");
            }
            self.expect_sym(")")?;
            Ok(specs)
        } else {
            Ok(vec![self.import_spec()?])
        }
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let pos = self.pos();
        let alias = if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.bump();
            Some(name)
        } else {
            None
        };
        let path = match self.bump().kind {
            TokenKind::String(s) => s,
            other => {
                return Err(ParseError {
                    message: format!("expected import path string, found {:?}", other),
                    pos,
                })
            }
        };
        Ok(ImportSpec { alias, path, pos })
    }

    fn top_level_decl(&mut self) -> PResult<Decl> {
        if self.is_ident_text("func") {
            Ok(Decl::Func(self.func_decl()?))
        } else if self.is_ident_text("type") || self.is_ident_text("var") || self.is_ident_text("const") {
            Ok(Decl::Gen(self.gen_decl()?))
        } else {
            Err(ParseError {
                message: format!("expected top-level declaration, found {:?}", self.peek().kind),
                pos: self.pos(),
            })
        }
    }

    fn gen_decl(&mut self) -> PResult<GenDecl> {
        let pos = self.pos();
        let kind = match self.bump().kind {
            TokenKind::Ident(s) if s == "type" => GenDeclKind::Type,
            TokenKind::Ident(s) if s == "var" => GenDeclKind::Var,
            TokenKind::Ident(s) if s == "const" => GenDeclKind::Const,
            other => {
                return Err(ParseError {
                    message: format!("expected 'type'/'var'/'const', found {:?}", other),
                    pos,
                })
            }
        };

        let mut specs = Vec::new();
        if self.eat_sym("(") {
            while !self.is_sym(")") {
                specs.push(self.spec(kind)?);
                self.eat_sym(";");
            }
            self.expect_sym(")")?;
        } else {
            specs.push(self.spec(kind)?);
        }
        Ok(GenDecl { kind, specs, pos })
    }

    fn spec(&mut self, kind: GenDeclKind) -> PResult<Spec> {
        let pos = self.pos();
        match kind {
            GenDeclKind::Type => {
                let (name, _) = self.expect_ident()?;
                let mut type_params = Vec::new();
                if self.eat_sym("[") {
                    loop {
                        let (p, _) = self.expect_ident()?;
                        type_params.push(p);
                        // consume the constraint expression (e.g. `any`)
                        self.type_expr()?;
                        if !self.eat_sym(",") {
                            break;
                        }
                    }
                    self.expect_sym("]")?;
                }
                self.eat_sym("=");
                let type_expr = self.type_expr()?;
                Ok(Spec::Type {
                    name,
                    type_params,
                    type_expr,
                    pos,
                })
            }
            GenDeclKind::Var | GenDeclKind::Const => {
                let mut names = vec![self.expect_ident()?.0];
                while self.eat_sym(",") {
                    names.push(self.expect_ident()?.0);
                }
                let type_expr = if !self.is_sym("=") && !self.is_sym(";") && !self.is_sym(")") {
                    Some(self.type_expr()?)
                } else {
                    None
                };
                let values = if self.eat_sym("=") {
                    let mut vs = vec![self.expr()?];
                    while self.eat_sym(",") {
                        vs.push(self.expr()?);
                    }
                    vs
                } else {
                    Vec::new()
                };
                Ok(Spec::Value {
                    names,
                    type_expr,
                    values,
                    pos,
                })
            }
        }
    }

    fn func_decl(&mut self) -> PResult<FuncDecl> {
        let pos = self.pos();
        self.bump(); // `func`

        let recv = if self.is_sym("(") {
            // disambiguate a receiver `(x T)` from a parameter list by
            // requiring exactly one field before the next top-level ident
            let save = self.idx;
            self.bump();
            let field = self.field()?;
            if self.eat_sym(")") {
                Some(field)
            } else {
                self.idx = save;
                None
            }
        } else {
            None
        };

        let (name, _) = self.expect_ident()?;

        let mut type_params = Vec::new();
        if self.is_sym("[") {
            self.bump();
            loop {
                let (p, _) = self.expect_ident()?;
                type_params.push(p);
                self.type_expr()?;
                if !self.eat_sym(",") {
                    break;
                }
            }
            self.expect_sym("]")?;
        }

        let params = self.field_list("(", ")")?;
        let results = self.func_results()?;

        let body = if self.is_sym("{") {
            Some(self.block()?)
        } else {
            None
        };

        Ok(FuncDecl {
            name,
            recv,
            type_params,
            params,
            results,
            body,
            pos,
        })
    }

    fn func_results(&mut self) -> PResult<Vec<Field>> {
        if self.is_sym("(") {
            self.field_list("(", ")")
        } else if self.is_sym("{") || self.is_sym(";") || self.is_eof() {
            Ok(Vec::new())
        } else {
            let pos = self.pos();
            let type_expr = self.type_expr()?;
            Ok(vec![Field {
                name: None,
                type_expr,
                pos,
            }])
        }
    }

    fn field_list(&mut self, open: &str, close: &str) -> PResult<Vec<Field>> {
        self.expect_sym(open)?;
        let mut fields = Vec::new();
        while !self.is_sym(close) {
            fields.push(self.field()?);
            if !self.eat_sym(",") {
                break;
            }
        }
        self.expect_sym(close)?;
        Ok(fields)
    }

    fn field(&mut self) -> PResult<Field> {
        let pos = self.pos();
        // `name Type` vs bare `Type`: peek for ident followed by something
        // that isn't `,`/close-paren, which signals a name+type pair.
        if let TokenKind::Ident(name) = self.peek().kind.clone() {
            let save = self.idx;
            self.bump();
            if self.is_sym(",") || self.is_sym(")") {
                // bare type, e.g. unnamed parameter
                self.idx = save;
                let type_expr = self.type_expr()?;
                return Ok(Field {
                    name: None,
                    type_expr,
                    pos,
                });
            }
            let type_expr = self.type_expr()?;
            return Ok(Field {
                name: Some(name),
                type_expr,
                pos,
            });
        }
        let type_expr = self.type_expr()?;
        Ok(Field {
            name: None,
            type_expr,
            pos,
        })
    }

    fn type_expr(&mut self) -> PResult<Expr> {
        self.unary_expr()
    }

    // -- statements ------------------------------------------------------

    fn block(&mut self) -> PResult<Block> {
        let pos = self.expect_sym("{")?;
        let mut stmts = Vec::new();
        while !self.is_sym("}") {
            stmts.push(self.stmt()?);
            self.eat_sym(";");
        }
        self.expect_sym("}")?;
        Ok(Block { stmts, pos })
    }

    fn stmt(&mut self) -> PResult<Stmt> {
        if self.is_ident_text("return") {
            let pos = self.pos();
            self.bump();
            let mut results = Vec::new();
            if !self.is_sym(";") && !self.is_sym("}") {
                results.push(self.expr()?);
                while self.eat_sym(",") {
                    results.push(self.expr()?);
                }
            }
            Ok(Stmt::Return { results, pos })
        } else if self.is_ident_text("if") {
            self.if_stmt()
        } else if self.is_ident_text("switch") {
            self.switch_stmt()
        } else if self.is_ident_text("for") {
            self.for_stmt()
        } else if self.is_ident_text("break") {
            let pos = self.pos();
            self.bump();
            Ok(Stmt::Branch {
                kind: BranchKind::Break,
                pos,
            })
        } else if self.is_ident_text("continue") {
            let pos = self.pos();
            self.bump();
            Ok(Stmt::Branch {
                kind: BranchKind::Continue,
                pos,
            })
        } else if self.is_ident_text("type") || self.is_ident_text("var") || self.is_ident_text("const") {
            Ok(Stmt::Decl(Decl::Gen(self.gen_decl()?)))
        } else if self.is_sym("{") {
            Ok(Stmt::Block(self.block()?))
        } else if self.is_sym(";") {
            Ok(Stmt::Empty)
        } else {
            self.simple_stmt()
        }
    }

    fn simple_stmt(&mut self) -> PResult<Stmt> {
        let pos = self.pos();
        let mut lhs = vec![self.expr()?];
        while self.eat_sym(",") {
            lhs.push(self.expr()?);
        }
        if self.is_sym(":=") || self.is_sym("=") {
            let op = if self.is_sym(":=") {
                AssignOp::Define
            } else {
                AssignOp::Assign
            };
            self.bump();
            let mut rhs = vec![self.expr()?];
            while self.eat_sym(",") {
                rhs.push(self.expr()?);
            }
            Ok(Stmt::Assign { lhs, op, rhs, pos })
        } else {
            let mut it = lhs.into_iter();
            let first = it.next().expect("at least one expr parsed above");
            Ok(Stmt::Expr(first))
        }
    }

    fn if_stmt(&mut self) -> PResult<Stmt> {
        let pos = self.pos();
        self.bump(); // `if`
        let cond = self.expr()?;
        let body = self.block()?;
        let els = if self.is_ident_text("else") {
            self.bump();
            if self.is_ident_text("if") {
                Some(Box::new(self.if_stmt()?))
            } else {
                Some(Box::new(Stmt::Block(self.block()?)))
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            body,
            els,
            pos,
        })
    }

    fn switch_stmt(&mut self) -> PResult<Stmt> {
        let mark = self.comment_mark();
        let pos = self.pos();
        self.bump(); // `switch`
        let leading_comments = self.take_pending_comments(mark);

        let tag = if !self.is_sym("{") {
            Some(self.expr()?)
        } else {
            None
        };

        self.expect_sym("{")?;
        let mut cases = Vec::new();
        while !self.is_sym("}") {
            let case_mark = self.comment_mark();
            let case_pos = self.pos();
            let values = if self.is_ident_text("default") {
                self.bump();
                Vec::new()
            } else {
                self.expect_ident_text_or_case()?;
                let mut vs = vec![self.expr()?];
                while self.eat_sym(",") {
                    vs.push(self.expr()?);
                }
                vs
            };
            let leading = self.take_pending_comments(case_mark);
            self.expect_sym(":")?;
            let mut body = Vec::new();
            while !self.is_ident_text("case") && !self.is_ident_text("default") && !self.is_sym("}") {
                body.push(self.stmt()?);
                self.eat_sym(";");
            }
            cases.push(CaseClause {
                values,
                body,
                pos: case_pos,
                leading_comments: leading,
            });
        }
        let trailing_mark = self.comment_mark();
        self.expect_sym("}")?;
        let trailing_comments = self.take_pending_comments(trailing_mark);

        Ok(Stmt::Switch {
            init: None,
            tag,
            cases,
            pos,
            leading_comments,
            trailing_comments,
        })
    }

    fn expect_ident_text_or_case(&mut self) -> PResult<()> {
        self.expect_ident_text("case").map(|_| ())
    }

    fn for_stmt(&mut self) -> PResult<Stmt> {
        let pos = self.pos();
        self.bump(); // `for`
        if self.is_sym("{") {
            let body = self.block()?;
            return Ok(Stmt::For {
                init: None,
                cond: None,
                post: None,
                body,
                pos,
            });
        }
        // `for cond { }`
        if !self.is_sym(";") {
            let save = self.idx;
            if let Ok(cond) = self.expr() {
                if self.is_sym("{") {
                    let body = self.block()?;
                    return Ok(Stmt::For {
                        init: None,
                        cond: Some(cond),
                        post: None,
                        body,
                        pos,
                    });
                }
            }
            self.idx = save;
        }
        // `for init; cond; post { }`
        let init = if self.is_sym(";") {
            None
        } else {
            Some(Box::new(self.simple_stmt()?))
        };
        self.expect_sym(";")?;
        let cond = if self.is_sym(";") {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect_sym(";")?;
        let post = if self.is_sym("{") {
            None
        } else {
            Some(Box::new(self.simple_stmt()?))
        };
        let body = self.block()?;
        Ok(Stmt::For {
            init,
            cond,
            post,
            body,
            pos,
        })
    }

    // -- expressions -------------------------------------------------------

    fn expr(&mut self) -> PResult<Expr> {
        self.binary_expr(0)
    }

    fn binary_expr(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut lhs = self.unary_expr()?;
        loop {
            let Some((op, prec)) = self.peek_binary_op() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let pos = self.pos();
            self.bump();
            let rhs = self.binary_expr(prec + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                pos,
            };
        }
        Ok(lhs)
    }

    fn peek_binary_op(&mut self) -> Option<(BinaryOp, u8)> {
        let sym = match &self.peek().kind {
            TokenKind::Sym(s) => *s,
            _ => return None,
        };
        use BinaryOp::*;
        Some(match sym {
            "||" => (LOr, 1),
            "&&" => (LAnd, 2),
            "==" => (Eq, 3),
            "!=" => (Neq, 3),
            "<" => (Lt, 3),
            "<=" => (Lte, 3),
            ">" => (Gt, 3),
            ">=" => (Gte, 3),
            "+" => (Add, 4),
            "-" => (Sub, 4),
            "*" => (Mul, 5),
            "/" => (Quo, 5),
            "%" => (Rem, 5),
            _ => return None,
        })
    }

    fn unary_expr(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        if self.is_sym("-") {
            self.bump();
            let expr = self.unary_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
                pos,
            });
        }
        if self.is_sym("!") {
            self.bump();
            let expr = self.unary_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
                pos,
            });
        }
        if self.is_sym("&") {
            self.bump();
            let expr = self.unary_expr()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Addr,
                expr: Box::new(expr),
                pos,
            });
        }
        if self.is_sym("*") {
            self.bump();
            let expr = self.unary_expr()?;
            return Ok(Expr::Star {
                expr: Box::new(expr),
                pos,
            });
        }
        if self.is_sym("[") {
            return self.array_or_slice_type();
        }
        if self.is_ident_text("map") {
            return self.map_type();
        }
        if self.is_ident_text("func") {
            return self.func_type_or_lit();
        }
        self.postfix_expr()
    }

    fn array_or_slice_type(&mut self) -> PResult<Expr> {
        let pos = self.expect_sym("[")?;
        let len = if self.is_sym("]") {
            None
        } else {
            Some(Box::new(self.expr()?))
        };
        self.expect_sym("]")?;
        let elt = self.type_expr()?;
        Ok(Expr::ArrayType {
            len,
            elt: Box::new(elt),
            pos,
        })
    }

    fn map_type(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        self.bump(); // `map`
        self.expect_sym("[")?;
        let key = self.type_expr()?;
        self.expect_sym("]")?;
        let value = self.type_expr()?;
        Ok(Expr::MapType {
            key: Box::new(key),
            value: Box::new(value),
            pos,
        })
    }

    fn func_type_or_lit(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        self.bump(); // `func`
        let params = self.field_list("(", ")")?;
        let results = self.func_results()?;
        if self.is_sym("{") {
            let body = self.block()?;
            Ok(Expr::FuncLit {
                params,
                results,
                body,
                pos,
            })
        } else {
            Ok(Expr::FuncType {
                params,
                results,
                pos,
            })
        }
    }

    fn postfix_expr(&mut self) -> PResult<Expr> {
        let mut e = self.primary_expr()?;
        loop {
            if self.is_sym(".") {
                let pos = self.pos();
                self.bump();
                let (sel, _) = self.expect_ident()?;
                e = Expr::Selector {
                    expr: Box::new(e),
                    sel,
                    pos,
                };
            } else if self.is_sym("(") {
                let pos = self.pos();
                self.bump();
                let mut args = Vec::new();
                while !self.is_sym(")") {
                    args.push(self.expr()?);
                    if !self.eat_sym(",") {
                        break;
                    }
                }
                self.expect_sym(")")?;
                e = Expr::Call {
                    func: Box::new(e),
                    args,
                    pos,
                };
            } else if self.is_sym("[") {
                let pos = self.pos();
                self.bump();
                let mut indices = vec![self.expr()?];
                while self.eat_sym(",") {
                    indices.push(self.expr()?);
                }
                self.expect_sym("]")?;
                e = Expr::Index {
                    expr: Box::new(e),
                    indices,
                    pos,
                };
            } else if self.is_sym("{") && e.as_ident().is_some() {
                e = self.composite_lit(e)?;
            } else {
                break;
            }
        }
        Ok(e)
    }

    fn composite_lit(&mut self, type_expr: Expr) -> PResult<Expr> {
        let pos = self.expect_sym("{")?;
        let mut elts = Vec::new();
        while !self.is_sym("}") {
            let first = self.expr()?;
            let first_pos = first.pos();
            let elt = if self.eat_sym(":") {
                let value = self.expr()?;
                Expr::KeyValue {
                    key: Box::new(first),
                    value: Box::new(value),
                    pos: first_pos,
                }
            } else {
                first
            };
            elts.push(elt);
            if !self.eat_sym(",") {
                break;
            }
        }
        self.expect_sym("}")?;
        Ok(Expr::CompositeLit {
            type_expr: Some(Box::new(type_expr)),
            elts,
            pos,
        })
    }

    fn primary_expr(&mut self) -> PResult<Expr> {
        let pos = self.pos();
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(Expr::Ident(name, pos))
            }
            TokenKind::Int(v) => {
                self.bump();
                Ok(Expr::BasicLit {
                    kind: LitKind::Int,
                    value: v,
                    pos,
                })
            }
            TokenKind::Float(v) => {
                self.bump();
                Ok(Expr::BasicLit {
                    kind: LitKind::Float,
                    value: v,
                    pos,
                })
            }
            TokenKind::String(v) => {
                self.bump();
                Ok(Expr::BasicLit {
                    kind: LitKind::String,
                    value: v,
                    pos,
                })
            }
            TokenKind::Char(v) => {
                self.bump();
                Ok(Expr::BasicLit {
                    kind: LitKind::Char,
                    value: v,
                    pos,
                })
            }
            TokenKind::Sym("(") => {
                self.bump();
                let inner = self.expr()?;
                self.expect_sym(")")?;
                Ok(Expr::Paren {
                    expr: Box::new(inner),
                    pos,
                })
            }
            other => Err(ParseError {
                message: format!("unexpected token in expression: {:?}", other),
                pos,
            }),
        }
    }
}

pub fn parse(source: &str) -> PResult<File> {
    Parser::new(source)?.parse_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_package() {
        let file = parse("package main\n\nfunc main() {}\n").unwrap();
        assert_eq!(file.package, "main");
        assert_eq!(file.decls.len(), 1);
        assert!(file.decls[0].as_func().is_some());
    }

    #[test]
    fn parses_generic_type_decl() {
        let file = parse("package main\n\ntype Result[T any, E any] struct {\n\tok bool\n}\n").unwrap();
        match &file.decls[0] {
            Decl::Gen(g) => match &g.specs[0] {
                Spec::Type { type_params, .. } => {
                    assert_eq!(type_params, &vec!["T".to_string(), "E".to_string()])
                }
                _ => panic!("expected type spec"),
            },
            _ => panic!("expected gen decl"),
        }
    }

    #[test]
    fn parses_switch_with_case_comments() {
        let src = "package main\n\nfunc f() {\n\tswitch x {\n\t// DINGO_PATTERN: Some(v)\n\tcase 1:\n\t\treturn\n\t}\n}\n";
        let file = parse(src).unwrap();
        let func = file.decls[0].as_func().unwrap();
        let body = func.body.as_ref().unwrap();
        match &body.stmts[0] {
            Stmt::Switch { cases, .. } => {
                assert_eq!(cases.len(), 1);
                assert!(cases[0].leading_comments[0].is_dingo_marker());
            }
            other => panic!("expected switch, got {:?}", other),
        }
    }

    #[test]
    fn parses_index_as_generic_instantiation() {
        let file = parse("package main\n\nvar x Result[int, error]\n").unwrap();
        match &file.decls[0] {
            Decl::Gen(g) => match &g.specs[0] {
                Spec::Value {
                    type_expr: Some(Expr::Index { indices, .. }),
                    ..
                } => assert_eq!(indices.len(), 2),
                other => panic!("unexpected spec: {:?}", other),
            },
            _ => panic!("expected gen decl"),
        }
    }
}
