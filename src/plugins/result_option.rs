//! Result/Option plugin (Inject, §4.7): synthesizes the tag enum, payload
//! struct, constructors and helper methods for every `Result[T, E]`/
//! `Option[T]` instantiation discovered in the user file.

use std::collections::BTreeMap;

use super::walk::collect_type_exprs;
use super::Plugin;
use crate::context::Context;
use crate::goast::ast::Decl;
use crate::goast::types::GoType;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Instantiation {
    args: Vec<String>,
}

#[derive(Default)]
pub struct ResultOptionPlugin {
    results: BTreeMap<String, Instantiation>,
    options: BTreeMap<String, Instantiation>,
}

impl Plugin for ResultOptionPlugin {
    fn name(&self) -> &'static str {
        "result_option"
    }

    fn discover(&mut self, ctx: &mut Context) {
        for type_expr in collect_type_exprs(&ctx.file) {
            match ctx.type_info.resolve(type_expr) {
                GoType::Generic { name, args } if name == "Result" && args.len() == 2 => {
                    let args: Vec<String> = args.iter().map(go_type_text).collect();
                    let suffix = args.join("_");
                    self.results.insert(suffix, Instantiation { args });
                }
                GoType::Generic { name, args } if name == "Option" && args.len() == 1 => {
                    let args: Vec<String> = args.iter().map(go_type_text).collect();
                    let suffix = args.join("_");
                    self.options.insert(suffix, Instantiation { args });
                }
                _ => {}
            }
        }
    }

    fn inject(&mut self, _ctx: &mut Context) -> Vec<Decl> {
        let mut decls = Vec::new();

        if !self.results.is_empty() {
            decls.push(Decl::Raw(result_tag_enum()));
        }
        if !self.options.is_empty() {
            decls.push(Decl::Raw(option_tag_enum()));
        }

        for (suffix, inst) in &self.results {
            decls.push(Decl::Raw(render_result_struct(suffix, inst)));
            decls.push(Decl::Raw(render_result_constructors(suffix, inst)));
            decls.push(Decl::Raw(render_result_helpers(suffix, inst)));
        }
        if self.results.len() == 1 {
            let (suffix, inst) = self.results.iter().next().unwrap();
            decls.push(Decl::Raw(render_result_aliases(suffix, inst)));
        }

        for (suffix, inst) in &self.options {
            decls.push(Decl::Raw(render_option_struct(suffix, inst)));
            decls.push(Decl::Raw(render_option_constructors(suffix, inst)));
            decls.push(Decl::Raw(render_option_helpers(suffix, inst)));
        }
        if self.options.len() == 1 {
            let (suffix, inst) = self.options.iter().next().unwrap();
            decls.push(Decl::Raw(render_option_aliases(suffix, inst)));
        }

        decls
    }
}

pub(crate) fn go_type_text(t: &GoType) -> String {
    match t {
        GoType::Named(n) => n.clone(),
        GoType::Pointer(inner) => format!("*{}", go_type_text(inner)),
        GoType::Slice(inner) => format!("[]{}", go_type_text(inner)),
        GoType::Array(n, inner) => format!("[{}]{}", n, go_type_text(inner)),
        GoType::Map(k, v) => format!("map[{}]{}", go_type_text(k), go_type_text(v)),
        GoType::Func { params, results } => format!(
            "func({}) ({})",
            params.iter().map(go_type_text).collect::<Vec<_>>().join(", "),
            results.iter().map(go_type_text).collect::<Vec<_>>().join(", "),
        ),
        GoType::Generic { name, args } => format!(
            "{}_{}",
            name,
            args.iter().map(go_type_text).collect::<Vec<_>>().join("_")
        ),
        GoType::Unknown => "any".to_string(),
    }
}

fn result_tag_enum() -> String {
    "type ResultTag int\n\nconst (\n\tResultTagOk ResultTag = iota\n\tResultTagErr\n)".to_string()
}

fn option_tag_enum() -> String {
    "type OptionTag int\n\nconst (\n\tOptionTagSome OptionTag = iota\n\tOptionTagNone\n)".to_string()
}

fn render_result_struct(suffix: &str, inst: &Instantiation) -> String {
    let (t, e) = (&inst.args[0], &inst.args[1]);
    format!(
        "type Result_{suffix} struct {{\n\ttag ResultTag\n\tok_0 *{t}\n\terr_0 *{e}\n}}"
    )
}

fn render_result_constructors(suffix: &str, inst: &Instantiation) -> String {
    let (t, e) = (&inst.args[0], &inst.args[1]);
    format!(
        "func Result_{suffix}_Ok(v {t}) Result_{suffix} {{\n\treturn Result_{suffix}{{tag: ResultTagOk, ok_0: &v}}\n}}\n\nfunc Result_{suffix}_Err(err {e}) Result_{suffix} {{\n\treturn Result_{suffix}{{tag: ResultTagErr, err_0: &err}}\n}}"
    )
}

fn render_result_aliases(suffix: &str, inst: &Instantiation) -> String {
    let (t, e) = (&inst.args[0], &inst.args[1]);
    format!(
        "func Ok(v {t}) Result_{suffix} {{\n\treturn Result_{suffix}_Ok(v)\n}}\n\nfunc Err(err {e}) Result_{suffix} {{\n\treturn Result_{suffix}_Err(err)\n}}"
    )
}

fn render_result_helpers(suffix: &str, inst: &Instantiation) -> String {
    let t = &inst.args[0];
    format!(
        r#"func (r Result_{suffix}) IsOk() bool {{
	return r.tag == ResultTagOk
}}

func (r Result_{suffix}) IsErr() bool {{
	return r.tag == ResultTagErr
}}

func (r Result_{suffix}) Unwrap() {t} {{
	if r.tag != ResultTagOk {{
		panic("called Unwrap on an Err result")
	}}
	return *r.ok_0
}}

func (r Result_{suffix}) UnwrapOr(fallback {t}) {t} {{
	if r.tag == ResultTagOk {{
		return *r.ok_0
	}}
	return fallback
}}

func (r Result_{suffix}) UnwrapErr() error {{
	if r.tag != ResultTagErr {{
		panic("called UnwrapErr on an Ok result")
	}}
	return *r.err_0
}}

func (r Result_{suffix}) Map(f func({t}) {t}) Result_{suffix} {{
	if r.tag == ResultTagOk {{
		return Result_{suffix}_Ok(f(*r.ok_0))
	}}
	return r
}}

func (r Result_{suffix}) MapErr(f func(error) error) Result_{suffix} {{
	if r.tag == ResultTagErr {{
		return Result_{suffix}_Err(f(*r.err_0))
	}}
	return r
}}

func (r Result_{suffix}) AndThen(f func({t}) Result_{suffix}) Result_{suffix} {{
	if r.tag == ResultTagOk {{
		return f(*r.ok_0)
	}}
	return r
}}"#
    )
}

fn render_option_struct(suffix: &str, inst: &Instantiation) -> String {
    let t = &inst.args[0];
    format!("type Option_{suffix} struct {{\n\ttag OptionTag\n\tsome_0 *{t}\n}}")
}

fn render_option_constructors(suffix: &str, inst: &Instantiation) -> String {
    let t = &inst.args[0];
    format!(
        "func Option_{suffix}_Some(v {t}) Option_{suffix} {{\n\treturn Option_{suffix}{{tag: OptionTagSome, some_0: &v}}\n}}\n\nfunc Option_{suffix}_None() Option_{suffix} {{\n\treturn Option_{suffix}{{tag: OptionTagNone}}\n}}"
    )
}

/// Only `Some` gets an unqualified alias: a bare `None` is produced by the
/// None-Context Inference plugin rewriting the identifier directly into an
/// `Option_{suffix}{tag: OptionTagNone}` composite literal (§4.6), never by
/// calling a constructor function.
fn render_option_aliases(suffix: &str, inst: &Instantiation) -> String {
    let t = &inst.args[0];
    format!("func Some(v {t}) Option_{suffix} {{\n\treturn Option_{suffix}_Some(v)\n}}")
}

fn render_option_helpers(suffix: &str, inst: &Instantiation) -> String {
    let t = &inst.args[0];
    format!(
        r#"func (o Option_{suffix}) IsSome() bool {{
	return o.tag == OptionTagSome
}}

func (o Option_{suffix}) IsNone() bool {{
	return o.tag == OptionTagNone
}}

func (o Option_{suffix}) Unwrap() {t} {{
	if o.tag != OptionTagSome {{
		panic("called Unwrap on a None option")
	}}
	return *o.some_0
}}

func (o Option_{suffix}) UnwrapOr(fallback {t}) {t} {{
	if o.tag == OptionTagSome {{
		return *o.some_0
	}}
	return fallback
}}

func (o Option_{suffix}) Map(f func({t}) {t}) Option_{suffix} {{
	if o.tag == OptionTagSome {{
		return Option_{suffix}_Some(f(*o.some_0))
	}}
	return o
}}

func (o Option_{suffix}) Filter(pred func({t}) bool) Option_{suffix} {{
	if o.tag == OptionTagSome && pred(*o.some_0) {{
		return o
	}}
	return Option_{suffix}_None()
}}

func (o Option_{suffix}) IsSomeAnd(pred func({t}) bool) bool {{
	return o.tag == OptionTagSome && pred(*o.some_0)
}}

func (o Option_{suffix}) And(other Option_{suffix}) Option_{suffix} {{
	if o.tag == OptionTagSome {{
		return other
	}}
	return o
}}

func (o Option_{suffix}) Or(other Option_{suffix}) Option_{suffix} {{
	if o.tag == OptionTagSome {{
		return o
	}}
	return other
}}

func (o Option_{suffix}) AndThen(f func({t}) Option_{suffix}) Option_{suffix} {{
	if o.tag == OptionTagSome {{
		return f(*o.some_0)
	}}
	return o
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::goast::parse;

    #[test]
    fn discovers_result_instantiation_from_return_type() {
        let file = parse("package main\n\nfunc f() Result[int, error] {\n\treturn nil\n}\n").unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = ResultOptionPlugin::default();
        plugin.discover(&mut ctx);
        assert_eq!(plugin.results.len(), 1);
        assert!(plugin.results.contains_key("int_error"));
    }

    #[test]
    fn injects_struct_and_unqualified_aliases_for_sole_instantiation() {
        let file = parse("package main\n\nfunc f() Result[int, error] {\n\treturn nil\n}\n").unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = ResultOptionPlugin::default();
        plugin.discover(&mut ctx);
        let decls = plugin.inject(&mut ctx);
        let rendered = decls
            .iter()
            .map(|d| match d {
                Decl::Raw(s) => s.clone(),
                _ => String::new(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(rendered.contains("type Result_int_error struct"));
        assert!(rendered.contains("func Ok(v int) Result_int_error"));
    }
}
