//! Enum-declaration processor: turns `enum Name { Variant(fields...), ... }`
//! into a minimal placeholder Go type declaration plus a companion
//! metadata variable (§4.2, "Enum processor"). The real tagged-union
//! layout — tag type, payload struct, constructors — is synthesized later
//! by the User-Enum Inject plugin; this pass only has to emit something
//! the Go parser accepts.

use super::{mapping, OutputBuilder, Preprocessor};
use crate::context::type_info::ENUM_META_PREFIX;
use crate::errors::{CompileError, CompileErrorKind};
use crate::goast::lexer::{slice, tokenize_with_chars, Token, TokenKind};
use crate::sourcemap::SourceMap;

#[derive(Default)]
pub struct EnumDeclProcessor;

struct Variant {
    name: String,
    fields: Vec<(String, String)>,
}

impl Preprocessor for EnumDeclProcessor {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn process(&mut self, source: &str) -> Result<(String, SourceMap), CompileError> {
        let (tokens, chars) = tokenize_with_chars(source)
            .map_err(|e| CompileError::new(CompileErrorKind::Syntax, e.message, e.pos))?;

        let mut out = OutputBuilder::new();
        let mut map = SourceMap::default();
        let mut emit_cursor = 0usize;
        let mut brace_depth = 0i32;
        let mut ti = 0usize;

        while ti < tokens.len() {
            let tok = &tokens[ti];
            match &tok.kind {
                TokenKind::Eof => break,
                TokenKind::Sym("{") => {
                    brace_depth += 1;
                    ti += 1;
                }
                TokenKind::Sym("}") => {
                    brace_depth -= 1;
                    ti += 1;
                }
                TokenKind::Ident(name) if name == "enum" && brace_depth == 0 => {
                    let enum_start = tok.start;
                    let enum_pos = tok.pos;
                    let (type_params, variants, end_idx) = parse_enum(&tokens, ti, &chars)
                        .ok_or_else(|| {
                            CompileError::new(
                                CompileErrorKind::Syntax,
                                "malformed `enum` declaration",
                                enum_pos,
                            )
                        })?;
                    let enum_name = match &tokens[ti + 1].kind {
                        TokenKind::Ident(n) => n.clone(),
                        _ => {
                            return Err(CompileError::new(
                                CompileErrorKind::Syntax,
                                "expected enum name after `enum`",
                                enum_pos,
                            ))
                        }
                    };
                    let enum_end = tokens[end_idx].end;

                    if enum_start > emit_cursor {
                        out.push_str(&slice(&chars, emit_cursor, enum_start));
                    }
                    let placeholder_pos = out.pos();
                    out.push_str(&render_placeholder(&enum_name, &type_params, &variants));
                    map.push(mapping("enum", placeholder_pos, enum_pos, enum_end - enum_start));

                    emit_cursor = enum_end;
                    ti = end_idx + 1;
                }
                _ => {
                    ti += 1;
                }
            }
        }

        out.push_str(&slice(&chars, emit_cursor, chars.len()));
        Ok((out.text, map))
    }
}

/// Parse `enum Name (\[T(,U)*\])? { Variant (Fields)?, ... }` starting at
/// the `enum` token, returning the type-parameter names, parsed variants,
/// and the index of the closing `}` token.
fn parse_enum(tokens: &[Token], enum_idx: usize, chars: &[char]) -> Option<(Vec<String>, Vec<Variant>, usize)> {
    let mut i = enum_idx + 1;
    // name
    if !matches!(tokens.get(i)?.kind, TokenKind::Ident(_)) {
        return None;
    }
    i += 1;

    let mut type_params = Vec::new();
    if matches!(tokens.get(i)?.kind, TokenKind::Sym("[")) {
        i += 1;
        loop {
            match &tokens.get(i)?.kind {
                TokenKind::Ident(name) => {
                    type_params.push(name.clone());
                    i += 1;
                }
                _ => return None,
            }
            match &tokens.get(i)?.kind {
                TokenKind::Sym(",") => i += 1,
                TokenKind::Sym("]") => {
                    i += 1;
                    break;
                }
                _ => return None,
            }
        }
    }

    if !matches!(tokens.get(i)?.kind, TokenKind::Sym("{")) {
        return None;
    }
    i += 1;

    let mut variants = Vec::new();
    loop {
        if matches!(tokens.get(i)?.kind, TokenKind::Sym("}")) {
            break;
        }
        let name = match &tokens.get(i)?.kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return None,
        };
        i += 1;

        let mut fields = Vec::new();
        if matches!(tokens.get(i)?.kind, TokenKind::Sym("(")) {
            i += 1;
            while !matches!(tokens.get(i)?.kind, TokenKind::Sym(")")) {
                let field_name = match &tokens.get(i)?.kind {
                    TokenKind::Ident(n) => n.clone(),
                    _ => return None,
                };
                i += 1;
                let type_start = tokens.get(i)?.start;
                let mut depth = 0i32;
                while i < tokens.len() {
                    match &tokens[i].kind {
                        TokenKind::Sym("(") | TokenKind::Sym("[") => depth += 1,
                        TokenKind::Sym(")") if depth == 0 => break,
                        TokenKind::Sym(")") | TokenKind::Sym("]") => depth -= 1,
                        TokenKind::Sym(",") if depth == 0 => break,
                        _ => {}
                    }
                    i += 1;
                }
                let type_end = tokens.get(i.saturating_sub(1))?.end;
                let type_text = slice(chars, type_start, type_end).trim().to_string();
                fields.push((field_name, type_text));
                if matches!(tokens.get(i)?.kind, TokenKind::Sym(",")) {
                    i += 1;
                }
            }
            i += 1; // consume `)`
        }

        variants.push(Variant { name, fields });

        match &tokens.get(i)?.kind {
            TokenKind::Sym(",") => {
                i += 1;
            }
            TokenKind::Sym("}") => {}
            _ => return None,
        }
    }

    Some((type_params, variants, i))
}

fn render_placeholder(name: &str, type_params: &[String], variants: &[Variant]) -> String {
    let mut s = String::new();
    if type_params.is_empty() {
        s.push_str(&format!("type {} struct{{}}\n", name));
    } else {
        let params = type_params
            .iter()
            .map(|p| format!("{} any", p))
            .collect::<Vec<_>>()
            .join(", ");
        s.push_str(&format!("type {}[{}] struct{{}}\n", name, params));
    }

    let entries = variants
        .iter()
        .map(|v| {
            let mut entry = v.name.clone();
            for (field_name, field_type) in &v.fields {
                entry.push('|');
                entry.push_str(field_name);
                entry.push(':');
                entry.push_str(field_type);
            }
            format!("\"{}\"", entry)
        })
        .collect::<Vec<_>>()
        .join(", ");
    s.push_str(&format!(
        "var {}{} = []string{{{}}}\n",
        ENUM_META_PREFIX, name, entries
    ));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_placeholder_type_and_metadata_var() {
        let mut p = EnumDeclProcessor::default();
        let (out, map) = p
            .process("package main\n\nenum Shape {\n\tCircle(radius float64),\n\tPoint,\n}\n")
            .unwrap();
        assert!(out.contains("type Shape struct{}"));
        assert!(out.contains("var __dg_enum_meta_Shape = []string{\"Circle|radius:float64\", \"Point\"}"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn emits_generic_enum_placeholder() {
        let mut p = EnumDeclProcessor::default();
        let (out, _) = p
            .process("package main\n\nenum Result[T, E] {\n\tOk(value T),\n\tErr(err E),\n}\n")
            .unwrap();
        assert!(out.contains("type Result[T any, E any] struct{}"));
        assert!(out.contains("\"Ok|value:T\", \"Err|err:E\""));
    }
}
