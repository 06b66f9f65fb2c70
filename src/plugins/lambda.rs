//! Lambda plugin (Transform, §4.10): replaces every
//! `__dg_lambda_K__([]string{"x", ...}, func() any { return EXPR })` marker
//! call with a properly typed `func(x T, ...) R { return EXPR }` literal,
//! inferring the parameter and result types the marker itself couldn't
//! carry from the surrounding context — the same parent-walk the
//! None-Context Inference plugin uses (§4.6): the declared type of a
//! `var`/`:=` target, an enclosing return statement's result type, or the
//! parameter type at an enclosing call's argument position. Any of those
//! resolving to a `func(...)` type gives every piece the rewrite needs;
//! anything else reports a `CompileErrorKind::Inference` diagnostic asking
//! for an explicit typed closure instead.

use super::walk::for_each_expr_mut;
use super::Plugin;
use crate::context::{Context, Node, ParentMap};
use crate::errors::{CompileError, CompileErrorKind};
use crate::goast::ast::*;
use crate::goast::types::{GoType, TypeInfo};
use crate::sourcemap::Position;

const LAMBDA_PREFIX: &str = "__dg_lambda_";

#[derive(Default)]
pub struct LambdaPlugin;

impl Plugin for LambdaPlugin {
    fn name(&self) -> &'static str {
        "lambda"
    }

    fn transform(&mut self, ctx: &mut Context) {
        let Context {
            file,
            parent_map,
            type_info,
            errors,
            ..
        } = ctx;

        for_each_expr_mut(file, &mut |e| {
            let Some((params, body_expr)) = lambda_marker_parts(e) else {
                return;
            };
            let pos = e.pos();
            match infer_func_type(parent_map, type_info, pos) {
                Some(GoType::Func { params: param_tys, results }) if param_tys.len() == params.len() && results.len() <= 1 => {
                    *e = Expr::FuncLit {
                        params: params
                            .into_iter()
                            .zip(param_tys.iter())
                            .map(|(name, ty)| Field {
                                name: Some(name),
                                type_expr: goexpr_for_type(ty, pos),
                                pos,
                            })
                            .collect(),
                        results: results
                            .iter()
                            .map(|ty| Field {
                                name: None,
                                type_expr: goexpr_for_type(ty, pos),
                                pos,
                            })
                            .collect(),
                        body: Block {
                            stmts: vec![Stmt::Return {
                                results: vec![body_expr],
                                pos,
                            }],
                            pos,
                        },
                        pos,
                    };
                }
                _ => errors.push(
                    CompileError::new(
                        CompileErrorKind::Inference,
                        "cannot infer closure signature: add an explicit typed closure (e.g., `func(x int) int { return ... }`)",
                        pos,
                    )
                    .with_hint("annotate the target with an explicit func(...) type"),
                ),
            }
        });
    }
}

/// Recognizes `__dg_lambda_K__([]string{...}, func() any { return EXPR })`
/// and returns the captured parameter names plus the original body
/// expression, consuming the composite literal and the placeholder
/// `func() any` wrapper in the process.
fn lambda_marker_parts(expr: &mut Expr) -> Option<(Vec<String>, Expr)> {
    let Expr::Call { func, args, .. } = expr else { return None };
    let Expr::Ident(name, _) = func.as_ref() else { return None };
    if !name.starts_with(LAMBDA_PREFIX) || args.len() != 2 {
        return None;
    }
    let params = match &args[0] {
        Expr::CompositeLit { elts, .. } => elts
            .iter()
            .filter_map(|e| match e {
                Expr::BasicLit { kind: LitKind::String, value, .. } => Some(unquote(value)),
                _ => None,
            })
            .collect(),
        _ => return None,
    };
    let body_expr = match &args[1] {
        Expr::FuncLit { body, .. } => match body.stmts.first() {
            Some(Stmt::Return { results, .. }) if results.len() == 1 => results[0].clone(),
            _ => return None,
        },
        _ => return None,
    };
    Some((params, body_expr))
}

fn unquote(s: &str) -> String {
    s.trim_matches('"').to_string()
}

/// Walks upward from `pos` for the same three positions None-Context
/// Inference resolves (declared `var` type, enclosing return, enclosing
/// call argument), stopping at the first one that resolves to a
/// `func(...)` type. Unlike None-Context Inference's separate
/// `rewrite_annotated_var_decls` pre-pass, the declared-type case here
/// walks through the parent map like the other two: a lambda marker sits
/// inside the declaration's value expression, not beside it, so the
/// parent map already has to be consulted regardless.
fn infer_func_type(parent_map: &ParentMap, type_info: &TypeInfo, pos: Position) -> Option<GoType> {
    let chain = parent_map.walk_parents(pos);

    for node in &chain {
        if let Node::Decl(Decl::Gen(g)) = node {
            if g.kind == GenDeclKind::Var {
                for spec in &g.specs {
                    if let Spec::Value {
                        type_expr: Some(t),
                        values,
                        ..
                    } = spec
                    {
                        if values.iter().any(|v| v.pos() == pos) {
                            return Some(type_info.resolve(t));
                        }
                    }
                }
            }
        }
        if let Node::Stmt(Stmt::Return { results, .. }) = node {
            if let Some(idx) = results.iter().position(|r| r.pos() == pos) {
                if let Some(func) = chain.iter().find_map(|n| match n {
                    Node::Decl(Decl::Func(f)) => Some(f),
                    _ => None,
                }) {
                    if let Some(field) = func.results.get(idx) {
                        return Some(type_info.resolve(&field.type_expr));
                    }
                }
            }
        }
        if let Node::Expr(Expr::Call { func, args, .. }) = node {
            if let Some(idx) = args.iter().position(|a| a.pos() == pos) {
                if let Some(name) = func.as_ident() {
                    if let Some(sig) = type_info.func_signature(name) {
                        if let Some(param_ty) = sig.params.get(idx) {
                            return Some(param_ty.clone());
                        }
                    }
                }
            }
        }
    }

    None
}

/// The inverse of [`TypeInfo::resolve`]: renders a [`GoType`] back into the
/// `Expr` shape a `Field`'s type position expects, for the handful of
/// shapes a closure's inferred parameter/result type can take.
fn goexpr_for_type(ty: &GoType, pos: Position) -> Expr {
    match ty {
        GoType::Named(n) => Expr::Ident(n.clone(), pos),
        GoType::Pointer(inner) => Expr::Star {
            expr: Box::new(goexpr_for_type(inner, pos)),
            pos,
        },
        GoType::Slice(inner) => Expr::ArrayType {
            len: None,
            elt: Box::new(goexpr_for_type(inner, pos)),
            pos,
        },
        GoType::Array(n, inner) => Expr::ArrayType {
            len: Some(Box::new(Expr::BasicLit {
                kind: LitKind::Int,
                value: n.to_string(),
                pos,
            })),
            elt: Box::new(goexpr_for_type(inner, pos)),
            pos,
        },
        GoType::Map(k, v) => Expr::MapType {
            key: Box::new(goexpr_for_type(k, pos)),
            value: Box::new(goexpr_for_type(v, pos)),
            pos,
        },
        GoType::Func { params, results } => Expr::FuncType {
            params: params
                .iter()
                .map(|p| Field { name: None, type_expr: goexpr_for_type(p, pos), pos })
                .collect(),
            results: results
                .iter()
                .map(|r| Field { name: None, type_expr: goexpr_for_type(r, pos), pos })
                .collect(),
            pos,
        },
        GoType::Generic { name, args } => Expr::Index {
            expr: Box::new(Expr::Ident(name.clone(), pos)),
            indices: args.iter().map(|a| goexpr_for_type(a, pos)).collect(),
            pos,
        },
        GoType::Unknown => Expr::Ident("any".to_string(), pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::parse;

    #[test]
    fn infers_params_from_call_argument_position() {
        let src = "package main\n\nfunc apply(f func(int) int, x int) int {\n\treturn f(x)\n}\n\nfunc g() int {\n\treturn apply(__dg_lambda_0__([]string{\"x\"}, func() any { return x * 2 }), 3)\n}\n";
        let file = parse(src).unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = LambdaPlugin::default();
        plugin.transform(&mut ctx);
        assert!(ctx.errors.is_empty());
        let body = ctx.file.decls[1].as_func().unwrap().body.as_ref().unwrap();
        match &body.stmts[0] {
            Stmt::Return { results, .. } => match &results[0] {
                Expr::Call { args, .. } => assert!(matches!(&args[0], Expr::FuncLit { .. })),
                _ => panic!("expected call"),
            },
            _ => panic!("expected return"),
        }
    }

    #[test]
    fn infers_params_from_declared_variable_type() {
        let src = "package main\n\nfunc g() {\n\tvar double func(int) int = __dg_lambda_0__([]string{\"x\"}, func() any { return x * 2 })\n\t_ = double\n}\n";
        let file = parse(src).unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = LambdaPlugin::default();
        plugin.transform(&mut ctx);
        assert!(ctx.errors.is_empty());
        let body = ctx.file.decls[0].as_func().unwrap().body.as_ref().unwrap();
        match &body.stmts[0] {
            Stmt::Decl(Decl::Gen(g)) => match &g.specs[0] {
                Spec::Value { values, .. } => assert!(matches!(&values[0], Expr::FuncLit { .. })),
                _ => panic!("expected value spec"),
            },
            _ => panic!("expected decl stmt"),
        }
    }

    #[test]
    fn reports_inference_error_without_resolvable_context() {
        let src = "package main\n\nfunc g() {\n\th := __dg_lambda_0__([]string{\"x\"}, func() any { return x * 2 })\n\t_ = h\n}\n";
        let file = parse(src).unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = LambdaPlugin::default();
        plugin.transform(&mut ctx);
        assert_eq!(ctx.errors.len(), 1);
    }
}
