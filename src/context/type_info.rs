//! Thin adapter over [`crate::goast::types::TypeInfo`] that also recovers
//! user-enum variant metadata from the placeholder the enum preprocessor
//! (§"Enum processor") leaves behind.
//!
//! The enum preprocessor emits, alongside the placeholder Go type, a
//! companion variable:
//!
//! ```go
//! var __dg_enum_meta_Shape = []string{
//!     "Circle|radius:float64",
//!     "Square|side:float64",
//!     "Point",
//! }
//! ```
//!
//! one string per variant, `Name` or `Name|field:Type|field:Type|...`.
//! Encoding variant metadata as strings (rather than a nested struct
//! literal) keeps the enum processor's Transform-phase output trivial to
//! parse back out here, and the encoding is private to this compiler:
//! nothing about it needs to survive into the emitted `.go` file, since
//! the User-Enum plugin's Inject phase deletes the placeholder and its
//! metadata variable once it has consumed them.

use crate::goast::ast::{Decl, Expr, File, GenDeclKind, LitKind, Spec};
use crate::goast::types::{EnumInfo, EnumVariant, GoType, TypeInfo};

pub const ENUM_META_PREFIX: &str = "__dg_enum_meta_";

pub fn build_type_info(file: &File) -> TypeInfo {
    let mut info = TypeInfo::build(file);
    for decl in &file.decls {
        let Decl::Gen(g) = decl else { continue };
        if g.kind != GenDeclKind::Var {
            continue;
        }
        for spec in &g.specs {
            let Spec::Value { names, values, .. } = spec else {
                continue;
            };
            let Some(name) = names.first() else { continue };
            let Some(enum_name) = name.strip_prefix(ENUM_META_PREFIX) else {
                continue;
            };
            if let Some(Expr::CompositeLit { elts, .. }) = values.first() {
                info.register_enum(parse_enum_meta(enum_name, elts));
            }
        }
    }
    info
}

fn parse_enum_meta(enum_name: &str, elts: &[Expr]) -> EnumInfo {
    let variants = elts
        .iter()
        .filter_map(|e| match e {
            Expr::BasicLit {
                kind: LitKind::String,
                value,
                ..
            } => Some(parse_variant_entry(strip_quotes(value))),
            _ => None,
        })
        .collect();
    EnumInfo {
        name: enum_name.to_string(),
        variants,
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

fn parse_variant_entry(entry: &str) -> EnumVariant {
    let mut parts = entry.split('|');
    let name = parts.next().unwrap_or_default().to_string();
    let fields = parts
        .filter_map(|p| {
            let (field, ty) = p.split_once(':')?;
            Some((field.to_string(), GoType::Named(ty.to_string())))
        })
        .collect();
    EnumVariant { name, fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goast::parse;

    #[test]
    fn recovers_enum_variants_from_metadata_var() {
        let src = r#"package main

var __dg_enum_meta_Shape = []string{"Circle|radius:float64", "Point"}
"#;
        let file = parse(src).unwrap();
        let info = build_type_info(&file);
        let shape = info.enum_by_name("Shape").unwrap();
        assert_eq!(shape.variants.len(), 2);
        assert_eq!(shape.variants[0].name, "Circle");
        assert_eq!(shape.variants[0].fields[0].0, "radius");
        assert_eq!(shape.variants[1].name, "Point");
        assert!(shape.variants[1].fields.is_empty());
    }
}
