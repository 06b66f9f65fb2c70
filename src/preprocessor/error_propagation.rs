//! Error-propagation processor: lowers postfix `?` into `__dg_try_K__(EXPR)`
//! call markers (§4.2, "Error-propagation processor").
//!
//! Runs over the token stream left to right. Because a nested occurrence
//! like the inner `?` in `g(f()?)?` always appears earlier in the token
//! stream than the `?` that encloses it, processing `?` occurrences in
//! stream order automatically handles nesting: by the time the outer `?`
//! is reached, the inner one has already been spliced into the output
//! buffer, and the outer rewrite simply captures that already-rewritten
//! text as part of its own `EXPR`.

use super::{mapping, OutputBuilder, Preprocessor};
use crate::errors::{CompileError, CompileErrorKind};
use crate::goast::lexer::{slice, tokenize_with_chars, Token, TokenKind};
use crate::sourcemap::SourceMap;

#[derive(Default)]
pub struct ErrorPropagationProcessor;

impl Preprocessor for ErrorPropagationProcessor {
    fn name(&self) -> &'static str {
        "error_prop"
    }

    fn process(&mut self, source: &str) -> Result<(String, SourceMap), CompileError> {
        let (tokens, chars) = tokenize_with_chars(source)
            .map_err(|e| CompileError::new(CompileErrorKind::Syntax, e.message, e.pos))?;

        let mut out = OutputBuilder::new();
        let mut map = SourceMap::default();
        let mut emit_cursor = 0usize;
        let mut out_offset = vec![0usize; tokens.len()];
        let mut counter = 1u32;

        for i in 0..tokens.len() {
            if matches!(tokens[i].kind, TokenKind::Eof) {
                break;
            }
            if tokens[i].start > emit_cursor {
                out.push_str(&slice(&chars, emit_cursor, tokens[i].start));
                emit_cursor = tokens[i].start;
            }
            out_offset[i] = out.len();

            if matches!(tokens[i].kind, TokenKind::Sym("?")) {
                let expr_start_idx = scan_expr_start(&tokens, i).ok_or_else(|| {
                    CompileError::new(
                        CompileErrorKind::Syntax,
                        "`?` must follow an expression",
                        tokens[i].pos,
                    )
                })?;
                let expr_out_start = out_offset[expr_start_idx];
                let expr_text = out.text[expr_out_start..].to_string();
                out.truncate(expr_out_start);

                let marker_pos = out.pos_at(expr_out_start);
                out.push_str(&format!("__dg_try_{}__({})", counter, expr_text));
                map.push(mapping(
                    "error_prop",
                    marker_pos,
                    tokens[expr_start_idx].pos,
                    expr_text.len(),
                ));
                counter += 1;

                emit_cursor = tokens[i].end;
            } else {
                out.push_str(&slice(&chars, tokens[i].start, tokens[i].end));
                emit_cursor = tokens[i].end;
            }
        }

        Ok((out.text, map))
    }
}

/// Scan backward from the `?` token at `qm_idx`, returning the token index
/// where the preceding postfix expression begins, or `None` if `?` is not
/// preceded by anything that looks like an expression.
fn scan_expr_start(tokens: &[Token], qm_idx: usize) -> Option<usize> {
    let mut i = qm_idx;
    loop {
        if i == 0 {
            return None;
        }
        match &tokens[i - 1].kind {
            TokenKind::Ident(_) => {
                i -= 1;
                if i > 0 && matches!(tokens[i - 1].kind, TokenKind::Sym(".")) {
                    i -= 1;
                    continue;
                }
                return Some(i);
            }
            TokenKind::Sym(")") | TokenKind::Sym("]") => {
                let (open_sym, close_sym) = if matches!(tokens[i - 1].kind, TokenKind::Sym(")")) {
                    ("(", ")")
                } else {
                    ("[", "]")
                };
                let mut depth = 1i32;
                let mut k = i - 1;
                loop {
                    if k == 0 {
                        return None;
                    }
                    k -= 1;
                    match &tokens[k].kind {
                        TokenKind::Sym(s) if *s == close_sym => depth += 1,
                        TokenKind::Sym(s) if *s == open_sym => depth -= 1,
                        _ => {}
                    }
                    if depth == 0 {
                        break;
                    }
                }
                i = k;
                if i > 0 && matches!(tokens[i - 1].kind, TokenKind::Ident(_)) {
                    i -= 1;
                    if i > 0 && matches!(tokens[i - 1].kind, TokenKind::Sym(".")) {
                        i -= 1;
                        continue;
                    }
                    return Some(i);
                }
                return Some(i);
            }
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::String(_) | TokenKind::Char(_) => {
                return Some(i - 1);
            }
            _ => return if i == qm_idx { None } else { Some(i) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_simple_call_propagation() {
        let mut p = ErrorPropagationProcessor::default();
        let (out, map) = p.process("x := g()?").unwrap();
        assert_eq!(out, "x := __dg_try_1__(g())");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn lowers_nested_propagation_innermost_first() {
        let mut p = ErrorPropagationProcessor::default();
        let (out, _) = p.process("g(f()?)?").unwrap();
        assert_eq!(out, "__dg_try_2__(g(__dg_try_1__(f())))");
    }

    #[test]
    fn lowers_selector_chain_propagation() {
        let mut p = ErrorPropagationProcessor::default();
        let (out, _) = p.process("a.b()?").unwrap();
        assert_eq!(out, "__dg_try_1__(a.b())");
    }

    #[test]
    fn rejects_dangling_question_mark() {
        let mut p = ErrorPropagationProcessor::default();
        let err = p.process("x := ?").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::Syntax);
    }
}
