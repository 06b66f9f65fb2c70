//! User-Enum plugin (§4.8): realizes the placeholder type and metadata
//! variable the enum preprocessor leaves behind (see
//! `context::type_info`'s module doc for the exact metadata encoding) into
//! a real tagged-union representation — a tag type with iota constants, a
//! struct with positionally-named payload pointer fields, and one
//! constructor per variant — mirroring how the Result/Option plugin
//! realizes its own generic instantiations.
//!
//! Discovery reads the variants [`TypeInfo`] already recovered from the
//! metadata variable (populated once, in `Context::new`, before any plugin
//! runs) rather than re-parsing the placeholder itself. Transform then
//! deletes the placeholder type and metadata var from the user file now
//! that their information has been captured; Inject emits the realized
//! declarations into the separate injected AST.

use super::result_option::go_type_text;
use super::Plugin;
use crate::context::type_info::ENUM_META_PREFIX;
use crate::context::Context;
use crate::goast::ast::{Decl, GenDeclKind, Spec};
use crate::goast::types::EnumInfo;

#[derive(Default)]
pub struct UserEnumPlugin {
    enums: Vec<EnumInfo>,
}

impl Plugin for UserEnumPlugin {
    fn name(&self) -> &'static str {
        "user_enum"
    }

    fn discover(&mut self, ctx: &mut Context) {
        self.enums = ctx.type_info.enums().cloned().collect();
    }

    fn transform(&mut self, ctx: &mut Context) {
        let names: std::collections::HashSet<&str> = self.enums.iter().map(|e| e.name.as_str()).collect();
        ctx.file.decls.retain(|decl| !is_consumed_placeholder(decl, &names));
    }

    fn inject(&mut self, _ctx: &mut Context) -> Vec<Decl> {
        let mut decls = Vec::new();
        for enum_info in &self.enums {
            decls.push(Decl::Raw(render_tag_type(enum_info)));
            decls.push(Decl::Raw(render_struct(enum_info)));
            decls.push(Decl::Raw(render_constructors(enum_info)));
        }
        decls
    }
}

fn is_consumed_placeholder(decl: &Decl, names: &std::collections::HashSet<&str>) -> bool {
    match decl {
        Decl::Gen(g) if g.kind == GenDeclKind::Type => g
            .specs
            .iter()
            .any(|s| matches!(s, Spec::Type { name, .. } if names.contains(name.as_str()))),
        Decl::Gen(g) if g.kind == GenDeclKind::Var => g.specs.iter().any(|s| match s {
            Spec::Value { names: vn, .. } => vn
                .first()
                .and_then(|n| n.strip_prefix(ENUM_META_PREFIX))
                .is_some_and(|enum_name| names.contains(enum_name)),
            _ => false,
        }),
        _ => false,
    }
}

fn tag_type_name(enum_info: &EnumInfo) -> String {
    format!("{}Tag", enum_info.name)
}

fn tag_ident(enum_info: &EnumInfo, variant: &str) -> String {
    format!("{}{}", tag_type_name(enum_info), variant)
}

fn render_tag_type(enum_info: &EnumInfo) -> String {
    let tag_name = tag_type_name(enum_info);
    let consts = enum_info
        .variants
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i == 0 {
                format!("\t{} {} = iota", tag_ident(enum_info, &v.name), tag_name)
            } else {
                format!("\t{}", tag_ident(enum_info, &v.name))
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("type {tag_name} int\n\nconst (\n{consts}\n)")
}

fn render_struct(enum_info: &EnumInfo) -> String {
    let mut fields = vec![format!("\ttag {}", tag_type_name(enum_info))];
    for v in &enum_info.variants {
        let lower = v.name.to_lowercase();
        for (i, (_, ty)) in v.fields.iter().enumerate() {
            fields.push(format!("\t{lower}_{i} *{}", go_type_text(ty)));
        }
    }
    format!("type {} struct {{\n{}\n}}", enum_info.name, fields.join("\n"))
}

fn render_constructors(enum_info: &EnumInfo) -> String {
    enum_info
        .variants
        .iter()
        .map(|v| render_constructor(enum_info, v))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_constructor(enum_info: &EnumInfo, v: &crate::goast::types::EnumVariant) -> String {
    let ctor_name = format!("{}{}", enum_info.name, v.name);
    let tag = tag_ident(enum_info, &v.name);
    let name = &enum_info.name;
    if v.fields.is_empty() {
        return format!("func {ctor_name}() {name} {{\n\treturn {name}{{tag: {tag}}}\n}}");
    }
    let lower = v.name.to_lowercase();
    let params = v
        .fields
        .iter()
        .map(|(n, t)| format!("{n} {}", go_type_text(t)))
        .collect::<Vec<_>>()
        .join(", ");
    let assigns = v
        .fields
        .iter()
        .enumerate()
        .map(|(i, (n, _))| format!("{lower}_{i}: &{n}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("func {ctor_name}({params}) {name} {{\n\treturn {name}{{tag: {tag}, {assigns}}}\n}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::parse;

    #[test]
    fn realizes_enum_and_removes_placeholder() {
        let src = "package main\n\ntype Shape struct{}\n\nvar __dg_enum_meta_Shape = []string{\"Circle|radius:float64\", \"Point\"}\n";
        let file = parse(src).unwrap();
        let mut ctx = Context::new(file);
        let mut plugin = UserEnumPlugin::default();
        plugin.discover(&mut ctx);
        plugin.transform(&mut ctx);
        assert!(ctx.file.decls.is_empty());
        let decls = plugin.inject(&mut ctx);
        let rendered = decls
            .iter()
            .map(|d| match d {
                Decl::Raw(s) => s.clone(),
                _ => String::new(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(rendered.contains("type ShapeTag int"));
        assert!(rendered.contains("ShapeTagCircle"));
        assert!(rendered.contains("circle_0 *float64"));
        assert!(rendered.contains("func ShapeCircle(radius float64) Shape"));
        assert!(rendered.contains("func ShapePoint() Shape"));
    }
}
