//! Lambda processor: lowers `|params| expr` into a
//! `__dg_lambda_K__([]string{"x","y"}, func() any { return expr })` call
//! marker (§4.2, "Lambda processor"). Type recovery for the parameter list
//! and return value is deferred to the Lambda Transform plugin, which has
//! type info available; this pass only has to preserve `expr` verbatim and
//! record what the parameter names were.

use super::{mapping, OutputBuilder, Preprocessor};
use crate::errors::{CompileError, CompileErrorKind};
use crate::goast::lexer::{slice, tokenize_with_chars, Token, TokenKind};
use crate::sourcemap::SourceMap;

#[derive(Default)]
pub struct LambdaProcessor;

impl Preprocessor for LambdaProcessor {
    fn name(&self) -> &'static str {
        "lambda"
    }

    fn process(&mut self, source: &str) -> Result<(String, SourceMap), CompileError> {
        let (tokens, chars) = tokenize_with_chars(source)
            .map_err(|e| CompileError::new(CompileErrorKind::Syntax, e.message, e.pos))?;

        let mut out = OutputBuilder::new();
        let mut map = SourceMap::default();
        let mut emit_cursor = 0usize;
        let mut counter = 0u32;
        let mut ti = 0usize;

        while ti < tokens.len() {
            if matches!(tokens[ti].kind, TokenKind::Eof) {
                break;
            }
            if matches!(tokens[ti].kind, TokenKind::Sym("|")) && starts_lambda(&tokens, ti) {
                if let Some((params, body_text, end_idx)) = parse_lambda(&tokens, ti, &chars) {
                    let start = tokens[ti].start;
                    let pos = tokens[ti].pos;
                    if start > emit_cursor {
                        out.push_str(&slice(&chars, emit_cursor, start));
                    }
                    let render_pos = out.pos();
                    let rendered = render_marker(counter, &params, &body_text);
                    out.push_str(&rendered);
                    map.push(mapping("lambda", render_pos, pos, tokens[end_idx].end - start));
                    counter += 1;
                    emit_cursor = tokens[end_idx].end;
                    ti = end_idx + 1;
                    continue;
                }
            }
            ti += 1;
        }

        out.push_str(&slice(&chars, emit_cursor, chars.len()));
        Ok((out.text, map))
    }
}

/// A leading `|` only opens a lambda when it appears where an expression
/// may start, not where it would instead be the bitwise/logical-or
/// operator (`x | y`, `x || y`).
fn starts_lambda(tokens: &[Token], idx: usize) -> bool {
    if idx == 0 {
        return true;
    }
    !matches!(
        tokens[idx - 1].kind,
        TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::String(_)
            | TokenKind::Char(_)
            | TokenKind::Sym(")")
            | TokenKind::Sym("]")
    )
}

/// Attempts to parse `| id(, id)* | expr` starting at the opening `|`.
/// Returns `None` (not a lambda — just a stray `|` token) if the
/// parameter list doesn't close cleanly.
fn parse_lambda(tokens: &[Token], pipe_idx: usize, chars: &[char]) -> Option<(Vec<String>, String, usize)> {
    let mut i = pipe_idx + 1;
    let mut params = Vec::new();

    if !matches!(tokens.get(i)?.kind, TokenKind::Sym("|")) {
        loop {
            match &tokens.get(i)?.kind {
                TokenKind::Ident(name) => {
                    params.push(name.clone());
                    i += 1;
                }
                _ => return None,
            }
            match &tokens.get(i)?.kind {
                TokenKind::Sym(",") => i += 1,
                TokenKind::Sym("|") => break,
                _ => return None,
            }
        }
    }
    // `i` now at the closing `|`.
    i += 1;

    let body_start = tokens.get(i)?.start;
    let mut depth = 0i32;
    let mut j = i;
    while j < tokens.len() {
        match &tokens[j].kind {
            TokenKind::Sym("(") | TokenKind::Sym("[") | TokenKind::Sym("{") => depth += 1,
            TokenKind::Sym(")") | TokenKind::Sym("]") | TokenKind::Sym("}") if depth == 0 => break,
            TokenKind::Sym(")") | TokenKind::Sym("]") | TokenKind::Sym("}") => depth -= 1,
            TokenKind::Sym(",") | TokenKind::Sym(";") if depth == 0 => break,
            TokenKind::Eof => break,
            _ => {}
        }
        j += 1;
    }
    if j == i {
        return None;
    }
    let body_end = tokens.get(j - 1)?.end;
    let body_text = slice(chars, body_start, body_end).trim().to_string();
    Some((params, body_text, j - 1))
}

fn render_marker(n: u32, params: &[String], body: &str) -> String {
    let quoted = params
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "__dg_lambda_{}__([]string{{{}}}, func() any {{ return {} }})",
        n, quoted, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_single_param_lambda() {
        let mut p = LambdaProcessor::default();
        let (out, map) = p.process("xs.Map(|x| x * 2)").unwrap();
        assert_eq!(
            out,
            "xs.Map(__dg_lambda_0__([]string{\"x\"}, func() any { return x * 2 }))"
        );
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn lowers_multi_param_lambda() {
        let mut p = LambdaProcessor::default();
        let (out, _) = p.process("fold(xs, |acc, x| acc + x)").unwrap();
        assert!(out.contains("[]string{\"acc\", \"x\"}"));
        assert!(out.contains("return acc + x"));
    }

    #[test]
    fn leaves_bitwise_or_alone() {
        let mut p = LambdaProcessor::default();
        let (out, map) = p.process("x := a | b").unwrap();
        assert_eq!(out, "x := a | b");
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn leaves_logical_or_alone() {
        let mut p = LambdaProcessor::default();
        let (out, _) = p.process("x := a || b").unwrap();
        assert_eq!(out, "x := a || b");
    }
}
