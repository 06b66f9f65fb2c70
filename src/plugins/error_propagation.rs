//! Error-Propagation plugin (Transform, §4.9): lowers every
//! `__dg_try_K__(EXPR)` marker call the preprocessor left behind into the
//! two-statement `tmp, err := EXPR; if err != nil { return ..., err }` form,
//! hoisted immediately before the statement that contained it.
//!
//! One pass does the work for all three syntactic contexts the spec
//! distinguishes (assignment RHS, return result, nested call/composite
//! argument): whatever expression position held the marker call is simply
//! replaced in place with the hoisted temporary's identifier, which already
//! produces the right surface form whether that position was the sole RHS
//! of a `:=`, one of several `return` results, or buried inside a call
//! argument. Markers nest innermost-first so an outer marker's argument
//! only ever sees already-rewritten identifiers, never another marker call.

use super::result_option::go_type_text;
use super::Plugin;
use crate::context::Context;
use crate::goast::ast::*;
use crate::goast::types::GoType;
use crate::sourcemap::Position;

const TRY_PREFIX: &str = "__dg_try_";

#[derive(Default)]
pub struct ErrorPropagationPlugin;

impl Plugin for ErrorPropagationPlugin {
    fn name(&self) -> &'static str {
        "error_propagation"
    }

    fn transform(&mut self, ctx: &mut Context) {
        let total = count_try_calls(&ctx.file);
        let mut temps = (0..total).map(|_| ctx.fresh_temp()).collect::<Vec<_>>().into_iter();

        for decl in &mut ctx.file.decls {
            let Decl::Func(f) = decl else { continue };
            let result_types: Vec<GoType> = f.results.iter().map(|r| ctx.type_info.resolve(&r.type_expr)).collect();
            if let Some(body) = &mut f.body {
                hoist_in_block(body, &result_types, &mut temps);
            }
        }
    }
}

fn is_try_call(expr: &Expr) -> Option<&Expr> {
    match expr {
        Expr::Call { func, args, .. } if args.len() == 1 => match func.as_ref() {
            Expr::Ident(name, _) if name.starts_with(TRY_PREFIX) => Some(&args[0]),
            _ => None,
        },
        _ => None,
    }
}

fn hoist_in_block(block: &mut Block, results: &[GoType], temps: &mut impl Iterator<Item = u32>) {
    let old = std::mem::take(&mut block.stmts);
    let mut new_stmts = Vec::with_capacity(old.len());
    for mut stmt in old {
        recurse_into_nested(&mut stmt, results, temps);
        let mut hoisted = Vec::new();
        hoist_top_level(&mut stmt, results, temps, &mut hoisted);
        new_stmts.extend(hoisted);
        new_stmts.push(stmt);
    }
    block.stmts = new_stmts;
}

/// Descends into a statement's own nested statement lists (if/for/switch/
/// block bodies) before `hoist_top_level` looks at the statement's own
/// expression fields, mirroring how [`super::walk`] separates "list of
/// statements" from "single statement" traversal.
fn recurse_into_nested(stmt: &mut Stmt, results: &[GoType], temps: &mut impl Iterator<Item = u32>) {
    match stmt {
        Stmt::If { body, els, .. } => {
            hoist_in_block(body, results, temps);
            if let Some(e) = els {
                recurse_into_nested(e, results, temps);
            }
        }
        Stmt::For { body, .. } => hoist_in_block(body, results, temps),
        Stmt::Switch { cases, .. } => {
            for case in cases {
                let old = std::mem::take(&mut case.body);
                let mut new_body = Vec::with_capacity(old.len());
                for mut s in old {
                    recurse_into_nested(&mut s, results, temps);
                    let mut hoisted = Vec::new();
                    hoist_top_level(&mut s, results, temps, &mut hoisted);
                    new_body.extend(hoisted);
                    new_body.push(s);
                }
                case.body = new_body;
            }
        }
        Stmt::Block(b) => hoist_in_block(b, results, temps),
        _ => {}
    }
}

fn hoist_top_level(stmt: &mut Stmt, results: &[GoType], temps: &mut impl Iterator<Item = u32>, hoisted: &mut Vec<Stmt>) {
    match stmt {
        Stmt::Assign { rhs, .. } => {
            for e in rhs.iter_mut() {
                hoist_in_expr(e, results, temps, hoisted);
            }
        }
        Stmt::Return { results: rs, .. } => {
            for e in rs.iter_mut() {
                hoist_in_expr(e, results, temps, hoisted);
            }
        }
        Stmt::Expr(e) => hoist_in_expr(e, results, temps, hoisted),
        Stmt::If { cond, .. } => hoist_in_expr(cond, results, temps, hoisted),
        Stmt::For { cond: Some(c), .. } => hoist_in_expr(c, results, temps, hoisted),
        Stmt::Switch { tag: Some(t), .. } => hoist_in_expr(t, results, temps, hoisted),
        _ => {}
    }
}

/// Post-order: a marker call's own argument is rewritten first, so a marker
/// nested inside another marker's argument is already a plain identifier by
/// the time the outer one is hoisted.
fn hoist_in_expr(expr: &mut Expr, results: &[GoType], temps: &mut impl Iterator<Item = u32>, hoisted: &mut Vec<Stmt>) {
    match expr {
        Expr::Call { func, args, .. } => {
            hoist_in_expr(func, results, temps, hoisted);
            for a in args.iter_mut() {
                hoist_in_expr(a, results, temps, hoisted);
            }
        }
        Expr::Selector { expr: e, .. } | Expr::Unary { expr: e, .. } | Expr::Star { expr: e, .. } | Expr::Paren { expr: e, .. } => {
            hoist_in_expr(e, results, temps, hoisted);
        }
        Expr::Binary { lhs, rhs, .. } => {
            hoist_in_expr(lhs, results, temps, hoisted);
            hoist_in_expr(rhs, results, temps, hoisted);
        }
        Expr::Index { expr: e, indices, .. } => {
            hoist_in_expr(e, results, temps, hoisted);
            for i in indices.iter_mut() {
                hoist_in_expr(i, results, temps, hoisted);
            }
        }
        Expr::CompositeLit { elts, .. } => {
            for e in elts.iter_mut() {
                hoist_in_expr(e, results, temps, hoisted);
            }
        }
        Expr::KeyValue { key, value, .. } => {
            hoist_in_expr(key, results, temps, hoisted);
            hoist_in_expr(value, results, temps, hoisted);
        }
        _ => {}
    }

    if is_try_call(expr).is_some() {
        let pos = expr.pos();
        // Safe to re-match and move out now that children have been rewritten.
        let inner = match std::mem::replace(expr, Expr::Ident(String::new(), pos)) {
            Expr::Call { mut args, .. } => args.remove(0),
            other => other,
        };
        let n = temps.next().unwrap_or(0);
        let tmp = format!("__dg_tmp_{n}");
        hoisted.push(Stmt::Assign {
            lhs: vec![Expr::Ident(tmp.clone(), pos), Expr::Ident("err".to_string(), pos)],
            op: AssignOp::Define,
            rhs: vec![inner],
            pos,
        });
        hoisted.push(Stmt::If {
            cond: Expr::Binary {
                op: BinaryOp::Neq,
                lhs: Box::new(Expr::Ident("err".to_string(), pos)),
                rhs: Box::new(Expr::Ident("nil".to_string(), pos)),
                pos,
            },
            body: Block {
                stmts: vec![Stmt::Return {
                    results: failure_results(results, pos),
                    pos,
                }],
                pos,
            },
            els: None,
            pos,
        });
        *expr = Expr::Ident(tmp, pos);
    }
}

/// The `return` produced inside the hoisted `if err != nil` block: zero
/// values for every result but the last, `err` for the last — except a
/// function whose sole declared result is a `Result[T, E]`, which instead
/// returns the qualified `Result_T_E_Err(err)` constructor (§4.9).
fn failure_results(results: &[GoType], pos: Position) -> Vec<Expr> {
    if let [GoType::Generic { name, args }] = results {
        if name == "Result" {
            let suffix = args.iter().map(go_type_text).collect::<Vec<_>>().join("_");
            return vec![Expr::Call {
                func: Box::new(Expr::Ident(format!("Result_{suffix}_Err"), pos)),
                args: vec![Expr::Ident("err".to_string(), pos)],
                pos,
            }];
        }
    }

    if results.is_empty() {
        return vec![Expr::Ident("err".to_string(), pos)];
    }

    let mut out: Vec<Expr> = results[..results.len() - 1].iter().map(|t| zero_value(t, pos)).collect();
    out.push(Expr::Ident("err".to_string(), pos));
    out
}

fn zero_value(ty: &GoType, pos: Position) -> Expr {
    match ty {
        GoType::Named(n) if n == "error" => Expr::Ident("nil".to_string(), pos),
        GoType::Named(n) if n == "string" => Expr::BasicLit {
            kind: LitKind::String,
            value: "\"\"".to_string(),
            pos,
        },
        GoType::Named(n) if n == "bool" => Expr::Ident("false".to_string(), pos),
        GoType::Named(n) if is_numeric(n) => Expr::BasicLit {
            kind: LitKind::Int,
            value: "0".to_string(),
            pos,
        },
        GoType::Generic { name, args } if name == "Result" || name == "Option" => {
            let suffix = args.iter().map(go_type_text).collect::<Vec<_>>().join("_");
            Expr::CompositeLit {
                type_expr: Some(Box::new(Expr::Ident(format!("{name}_{suffix}"), pos))),
                elts: Vec::new(),
                pos,
            }
        }
        _ => Expr::Ident("nil".to_string(), pos),
    }
}

fn is_numeric(name: &str) -> bool {
    matches!(
        name,
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32" | "uint64" | "float32" | "float64" | "byte" | "rune" | "uintptr"
    )
}

fn count_try_calls(file: &File) -> usize {
    let mut n = 0;
    for decl in &file.decls {
        if let Decl::Func(f) = decl {
            if let Some(body) = &f.body {
                count_in_block(body, &mut n);
            }
        }
    }
    n
}

fn count_in_block(block: &Block, n: &mut usize) {
    for stmt in &block.stmts {
        count_in_stmt(stmt, n);
    }
}

fn count_in_stmt(stmt: &Stmt, n: &mut usize) {
    match stmt {
        Stmt::Expr(e) => count_in_expr(e, n),
        Stmt::Assign { rhs, .. } => {
            for e in rhs {
                count_in_expr(e, n);
            }
        }
        Stmt::Return { results, .. } => {
            for e in results {
                count_in_expr(e, n);
            }
        }
        Stmt::If { cond, body, els, .. } => {
            count_in_expr(cond, n);
            count_in_block(body, n);
            if let Some(e) = els {
                count_in_stmt(e, n);
            }
        }
        Stmt::For { cond, body, .. } => {
            if let Some(c) = cond {
                count_in_expr(c, n);
            }
            count_in_block(body, n);
        }
        Stmt::Switch { tag, cases, .. } => {
            if let Some(t) = tag {
                count_in_expr(t, n);
            }
            for case in cases {
                for s in &case.body {
                    count_in_stmt(s, n);
                }
            }
        }
        Stmt::Block(b) => count_in_block(b, n),
        _ => {}
    }
}

fn count_in_expr(expr: &Expr, n: &mut usize) {
    if is_try_call(expr).is_some() {
        *n += 1;
    }
    match expr {
        Expr::Call { func, args, .. } => {
            count_in_expr(func, n);
            for a in args {
                count_in_expr(a, n);
            }
        }
        Expr::Selector { expr: e, .. } | Expr::Unary { expr: e, .. } | Expr::Star { expr: e, .. } | Expr::Paren { expr: e, .. } => {
            count_in_expr(e, n)
        }
        Expr::Binary { lhs, rhs, .. } => {
            count_in_expr(lhs, n);
            count_in_expr(rhs, n);
        }
        Expr::Index { expr: e, indices, .. } => {
            count_in_expr(e, n);
            for i in indices {
                count_in_expr(i, n);
            }
        }
        Expr::CompositeLit { elts, .. } => {
            for e in elts {
                count_in_expr(e, n);
            }
        }
        Expr::KeyValue { key, value, .. } => {
            count_in_expr(key, n);
            count_in_expr(value, n);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::parse;

    #[test]
    fn hoists_try_call_in_assignment_context() {
        let file = parse("package main\n\nfunc f() (int, error) {\n\tx := __dg_try_0__(g())\n\treturn x, nil\n}\n").unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = ErrorPropagationPlugin::default();
        plugin.transform(&mut ctx);
        let body = ctx.file.decls[0].as_func().unwrap().body.as_ref().unwrap();
        assert_eq!(body.stmts.len(), 4);
        match &body.stmts[0] {
            Stmt::Assign { lhs, rhs, op, .. } => {
                assert_eq!(*op, AssignOp::Define);
                assert_eq!(lhs.len(), 2);
                assert!(matches!(&rhs[0], Expr::Call { .. }));
            }
            _ => panic!("expected hoisted assign"),
        }
        assert!(matches!(&body.stmts[1], Stmt::If { .. }));
        match &body.stmts[2] {
            Stmt::Assign { rhs, .. } => assert!(matches!(&rhs[0], Expr::Ident(name, _) if name.starts_with("__dg_tmp_"))),
            _ => panic!("expected rewritten assign"),
        }
    }

    #[test]
    fn hoists_try_call_in_return_context() {
        let file = parse("package main\n\nfunc f() (int, error) {\n\treturn __dg_try_0__(g()), nil\n}\n").unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = ErrorPropagationPlugin::default();
        plugin.transform(&mut ctx);
        let body = ctx.file.decls[0].as_func().unwrap().body.as_ref().unwrap();
        assert_eq!(body.stmts.len(), 3);
        match &body.stmts[2] {
            Stmt::Return { results, .. } => assert!(matches!(&results[0], Expr::Ident(name, _) if name.starts_with("__dg_tmp_"))),
            _ => panic!("expected rewritten return"),
        }
    }

    #[test]
    fn uses_result_err_constructor_for_single_result_return() {
        let file = parse("package main\n\nfunc f() Result[int, error] {\n\tx := __dg_try_0__(g())\n\treturn Ok(x)\n}\n").unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = ErrorPropagationPlugin::default();
        plugin.transform(&mut ctx);
        let body = ctx.file.decls[0].as_func().unwrap().body.as_ref().unwrap();
        match &body.stmts[1] {
            Stmt::If { body, .. } => match &body.stmts[0] {
                Stmt::Return { results, .. } => match &results[0] {
                    Expr::Call { func, .. } => assert!(matches!(func.as_ref(), Expr::Ident(name, _) if name == "Result_int_error_Err")),
                    _ => panic!("expected Err constructor call"),
                },
                _ => panic!("expected return"),
            },
            _ => panic!("expected if"),
        }
    }
}
