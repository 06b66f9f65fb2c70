//! Textual re-emission of a [`File`].
//!
//! Per §4.11, the Inject phase produces a *second*, freshly built `File`
//! holding only the plugin-synthesized declarations (tagged-union structs,
//! helper functions, ...). The printer assembles output by printing that
//! injected file's declarations first, each as its own paragraph, then a
//! blank line, then the user file's declarations with their original
//! comments intact. Printing the two ASTs separately — rather than
//! splicing injected decls into the user AST before printing — is what
//! keeps a Go pretty-printer's comment-to-node association from pulling a
//! stray comment onto a declaration it was never attached to.

use super::ast::*;

pub fn print_file(user: &File, injected: &[Decl]) -> String {
    let mut out = String::new();
    out.push_str(&format!("package {}\n", user.package));

    if !user.imports.is_empty() {
        out.push('\n');
        if user.imports.len() == 1 {
            out.push_str(&format!("import {}\n", import_spec(&user.imports[0])));
        } else {
            out.push_str("import (\n");
            for imp in &user.imports {
                out.push_str(&format!("\t{}\n", import_spec(imp)));
            }
            out.push_str(")\n");
        }
    }

    if !injected.is_empty() {
        out.push('\n');
        for decl in injected {
            out.push_str(&print_decl(decl, 0));
            out.push_str("\n\n");
        }
    }

    if !user.decls.is_empty() {
        out.push('\n');
        for (i, decl) in user.decls.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&print_decl(decl, 0));
            out.push('\n');
        }
    }

    out
}

fn import_spec(spec: &ImportSpec) -> String {
    match &spec.alias {
        Some(alias) => format!("{} \"{}\"", alias, spec.path),
        None => format!("\"{}\"", spec.path),
    }
}

fn print_decl(decl: &Decl, indent: usize) -> String {
    match decl {
        Decl::Func(f) => print_func_decl(f, indent),
        Decl::Gen(g) => print_gen_decl(g, indent),
        Decl::Raw(text) => text.trim_end().to_string(),
    }
}

fn print_gen_decl(decl: &GenDecl, indent: usize) -> String {
    let keyword = match decl.kind {
        GenDeclKind::Type => "type",
        GenDeclKind::Var => "var",
        GenDeclKind::Const => "const",
    };
    let pad = tabs(indent);
    if decl.specs.len() == 1 {
        format!("{pad}{} {}", keyword, print_spec(&decl.specs[0]))
    } else {
        let mut s = format!("{pad}{} (\n", keyword);
        for spec in &decl.specs {
            s.push_str(&format!("{}{}\n", tabs(indent + 1), print_spec(spec)));
        }
        s.push_str(&format!("{pad})"));
        s
    }
}

fn print_spec(spec: &Spec) -> String {
    match spec {
        Spec::Type {
            name,
            type_params,
            type_expr,
            ..
        } => {
            if type_params.is_empty() {
                format!("{} {}", name, print_expr(type_expr))
            } else {
                format!("{}[{}] {}", name, type_params.join(", "), print_expr(type_expr))
            }
        }
        Spec::Value {
            names,
            type_expr,
            values,
            ..
        } => {
            let names = names.join(", ");
            match (type_expr, values.is_empty()) {
                (Some(t), true) => format!("{} {}", names, print_expr(t)),
                (Some(t), false) => {
                    format!("{} {} = {}", names, print_expr(t), print_expr_list(values))
                }
                (None, false) => format!("{} = {}", names, print_expr_list(values)),
                (None, true) => names,
            }
        }
    }
}

fn print_func_decl(decl: &FuncDecl, indent: usize) -> String {
    let pad = tabs(indent);
    let recv = match &decl.recv {
        Some(f) => format!("({}) ", print_field(f)),
        None => String::new(),
    };
    let type_params = if decl.type_params.is_empty() {
        String::new()
    } else {
        format!("[{}]", decl.type_params.join(", "))
    };
    let params = print_field_list(&decl.params);
    let results = print_results(&decl.results);
    let sig = format!(
        "{pad}func {}{}{}({}){}",
        recv, decl.name, type_params, params, results
    );
    match &decl.body {
        Some(body) => format!("{} {}", sig, print_block(body, indent)),
        None => sig,
    }
}

fn print_results(results: &[Field]) -> String {
    if results.is_empty() {
        String::new()
    } else if results.len() == 1 && results[0].name.is_none() {
        format!(" {}", print_expr(&results[0].type_expr))
    } else {
        format!(" ({})", print_field_list(results))
    }
}

fn print_field_list(fields: &[Field]) -> String {
    fields.iter().map(print_field).collect::<Vec<_>>().join(", ")
}

fn print_field(field: &Field) -> String {
    match &field.name {
        Some(name) => format!("{} {}", name, print_expr(&field.type_expr)),
        None => print_expr(&field.type_expr),
    }
}

fn print_block(block: &Block, indent: usize) -> String {
    if block.stmts.is_empty() {
        return "{}".to_string();
    }
    let mut s = String::from("{\n");
    for stmt in &block.stmts {
        s.push_str(&print_stmt(stmt, indent + 1));
        s.push('\n');
    }
    s.push_str(&format!("{}}}", tabs(indent)));
    s
}

fn print_stmt(stmt: &Stmt, indent: usize) -> String {
    let pad = tabs(indent);
    match stmt {
        Stmt::Expr(e) => format!("{pad}{}", print_expr(e)),
        Stmt::Assign { lhs, op, rhs, .. } => {
            let op_str = match op {
                AssignOp::Define => ":=",
                AssignOp::Assign => "=",
            };
            format!(
                "{pad}{} {} {}",
                print_expr_list(lhs),
                op_str,
                print_expr_list(rhs)
            )
        }
        Stmt::Return { results, .. } => {
            if results.is_empty() {
                format!("{pad}return")
            } else {
                format!("{pad}return {}", print_expr_list(results))
            }
        }
        Stmt::If {
            cond, body, els, ..
        } => {
            let mut s = format!("{pad}if {} {}", print_expr(cond), print_block(body, indent));
            if let Some(els) = els {
                s.push_str(" else ");
                match els.as_ref() {
                    Stmt::If { .. } => s.push_str(print_stmt(els, indent).trim_start()),
                    Stmt::Block(b) => s.push_str(&print_block(b, indent)),
                    other => s.push_str(print_stmt(other, indent).trim_start()),
                }
            }
            s
        }
        Stmt::Switch { tag, cases, .. } => {
            let mut s = match tag {
                Some(t) => format!("{pad}switch {} {{\n", print_expr(t)),
                None => format!("{pad}switch {{\n"),
            };
            for case in cases {
                if case.is_default() {
                    s.push_str(&format!("{}default:\n", tabs(indent + 1)));
                } else {
                    let vals = case
                        .values
                        .iter()
                        .map(print_expr)
                        .collect::<Vec<_>>()
                        .join(", ");
                    s.push_str(&format!("{}case {}:\n", tabs(indent + 1), vals));
                }
                for stmt in &case.body {
                    s.push_str(&print_stmt(stmt, indent + 2));
                    s.push('\n');
                }
            }
            s.push_str(&format!("{pad}}}"));
            s
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
            ..
        } => {
            let header = match (init, cond, post) {
                (None, None, None) => String::new(),
                (None, Some(c), None) => format!("{} ", print_expr(c)),
                (init, cond, post) => format!(
                    "{}; {}; {} ",
                    init.as_ref()
                        .map(|s| print_stmt(s, 0).trim().to_string())
                        .unwrap_or_default(),
                    cond.as_ref().map(print_expr).unwrap_or_default(),
                    post.as_ref()
                        .map(|s| print_stmt(s, 0).trim().to_string())
                        .unwrap_or_default(),
                ),
            };
            format!("{pad}for {}{}", header, print_block(body, indent))
        }
        Stmt::Block(b) => format!("{pad}{}", print_block(b, indent)),
        Stmt::Decl(d) => print_decl(d, indent),
        Stmt::Branch { kind, .. } => match kind {
            BranchKind::Break => format!("{pad}break"),
            BranchKind::Continue => format!("{pad}continue"),
        },
        Stmt::Empty => String::new(),
    }
}

fn print_expr_list(exprs: &[Expr]) -> String {
    exprs.iter().map(print_expr).collect::<Vec<_>>().join(", ")
}

fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name, _) => name.clone(),
        Expr::BasicLit { value, .. } => value.clone(),
        Expr::Call { func, args, .. } => {
            format!("{}({})", print_expr(func), print_expr_list(args))
        }
        Expr::Selector { expr, sel, .. } => format!("{}.{}", print_expr(expr), sel),
        Expr::Binary { op, lhs, rhs, .. } => {
            format!("{} {} {}", print_expr(lhs), binary_op_str(*op), print_expr(rhs))
        }
        Expr::Unary { op, expr, .. } => format!("{}{}", unary_op_str(*op), print_expr(expr)),
        Expr::Star { expr, .. } => format!("*{}", print_expr(expr)),
        Expr::Paren { expr, .. } => format!("({})", print_expr(expr)),
        Expr::Index { expr, indices, .. } => {
            format!("{}[{}]", print_expr(expr), print_expr_list(indices))
        }
        Expr::ArrayType { len, elt, .. } => match len {
            Some(l) => format!("[{}]{}", print_expr(l), print_expr(elt)),
            None => format!("[]{}", print_expr(elt)),
        },
        Expr::MapType { key, value, .. } => {
            format!("map[{}]{}", print_expr(key), print_expr(value))
        }
        Expr::FuncType { params, results, .. } => {
            format!("func({}){}", print_field_list(params), print_results(results))
        }
        Expr::FuncLit {
            params,
            results,
            body,
            ..
        } => format!(
            "func({}){} {}",
            print_field_list(params),
            print_results(results),
            print_block(body, 0)
        ),
        Expr::CompositeLit { type_expr, elts, .. } => {
            let ty = type_expr.as_ref().map(|t| print_expr(t)).unwrap_or_default();
            format!("{}{{{}}}", ty, print_expr_list(elts))
        }
        Expr::KeyValue { key, value, .. } => format!("{}: {}", print_expr(key), print_expr(value)),
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Quo => "/",
        Rem => "%",
        Eq => "==",
        Neq => "!=",
        Lt => "<",
        Lte => "<=",
        Gt => ">",
        Gte => ">=",
        LAnd => "&&",
        LOr => "||",
    }
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
        UnaryOp::Addr => "&",
    }
}

fn tabs(n: usize) -> String {
    "\t".repeat(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::parser::parse;

    #[test]
    fn round_trips_a_simple_function() {
        let src = "package main\n\nfunc add(a int, b int) int {\n\treturn a + b\n}\n";
        let file = parse(src).unwrap();
        let out = print_file(&file, &[]);
        assert!(out.contains("func add(a int, b int) int {"));
        assert!(out.contains("return a + b"));
    }

    #[test]
    fn injected_decls_print_before_user_decls() {
        let src = "package main\n\nfunc main() {}\n";
        let file = parse(src).unwrap();
        let injected_src = "package x\n\ntype ResultIntError struct {\n\tok bool\n}\n";
        let injected_file = parse(injected_src).unwrap();
        let out = print_file(&file, &injected_file.decls);
        let injected_idx = out.find("ResultIntError").unwrap();
        let user_idx = out.find("func main").unwrap();
        assert!(injected_idx < user_idx);
    }
}
